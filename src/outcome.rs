use crate::Error;

/// The terminal value of a promise, as delivered to a combined completion
/// callback.
///
/// `NotComputed` stands for cancellation: the promise reached a terminal state
/// without producing either a value or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Success(T),
    Failure(E),
    NotComputed,
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn is_not_computed(&self) -> bool {
        matches!(self, Outcome::NotComputed)
    }

    /// The success value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// The failure error, if any.
    pub fn error(self) -> Option<E> {
        match self {
            Outcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(err) => Outcome::Failure(err),
            Outcome::NotComputed => Outcome::NotComputed,
        }
    }

    /// Converts into a `Result` so the outcome can be propagated with `?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetch_promise::{Error, Outcome};
    ///
    /// let canceled: Outcome<u8, String> = Outcome::NotComputed;
    /// assert_eq!(canceled.into_result(), Err(Error::Canceled));
    ///
    /// let ok: Outcome<u8, String> = Outcome::Success(7);
    /// assert_eq!(ok.into_result(), Ok(7));
    /// ```
    pub fn into_result(self) -> Result<T, Error<E>> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(err) => Err(Error::Failed(err)),
            Outcome::NotComputed => Err(Error::Canceled),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err),
        }
    }
}
