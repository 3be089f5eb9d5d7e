//! Value transformation of fetchers.
//!
//! [`transform_values`] wraps a [`Fetch`] so that every value it produces is
//! run through a [`Transformer`] before reaching the caller. Each call to the
//! composed fetcher performs exactly one underlying `get`, passes the key
//! through untouched, and forwards fetch and transform errors verbatim.
//!
//! The same composition is available as a free function taking a
//! transformer, a free function taking a closure, the
//! [`FetchExt::transform_values`] method, and the `>>` operator on
//! [`Fetcher`] and [`Transformed`]. All of them build the same
//! [`Transformed`] value.
use std::ops::Shr;
use std::sync::Arc;

use log::trace;

use crate::{Fetch, Future, Transformer};

/// A fetcher whose values pass through a transformer.
pub struct Transformed<F, T> {
    fetcher: F,
    transformer: Arc<T>,
}

impl<F, T> Transformed<F, T> {
    pub fn new(fetcher: F, transformer: T) -> Self {
        Transformed {
            fetcher,
            transformer: Arc::new(transformer),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}

impl<F: Clone, T> Clone for Transformed<F, T> {
    fn clone(&self) -> Self {
        Transformed {
            fetcher: self.fetcher.clone(),
            transformer: Arc::clone(&self.transformer),
        }
    }
}

impl<K, F, T> Fetch<K> for Transformed<F, T>
where
    F: Fetch<K>,
    T: Transformer<F::Value, Error = F::Error> + Send + Sync + 'static,
{
    type Value = T::Output;
    type Error = F::Error;

    /// Fetches `key`, then transforms the value once it arrives.
    ///
    /// The returned future is pending until both steps have finished. It
    /// fails with the fetch error if the fetch fails (the transformer is
    /// then never called), with the transformer's error if the transform
    /// fails, and is canceled if either step is canceled.
    fn get(&self, key: K) -> Future<T::Output, F::Error> {
        trace!("fetching value for transformation");
        let transformer = Arc::clone(&self.transformer);
        self.fetcher
            .get(key)
            .flat_map(move |value| transformer.transform(value))
    }
}

/// Composes `fetcher` with `transformer`.
///
/// # Examples
///
/// ```
/// use fetch_promise::{transform_values, Fetch, Future, Outcome};
///
/// let fetch = |key: u32| Future::<u32, String>::succeeded(key * 100);
/// let describe = |n: u32| Future::<String, String>::succeeded(format!("{n} items"));
///
/// let composed = transform_values(fetch, describe);
/// assert_eq!(composed.get(3).outcome(), Some(Outcome::Success("300 items".into())));
/// ```
pub fn transform_values<K, F, T>(fetcher: F, transformer: T) -> Transformed<F, T>
where
    F: Fetch<K>,
    T: Transformer<F::Value, Error = F::Error> + Send + Sync + 'static,
{
    Transformed::new(fetcher, transformer)
}

/// Composes `fetcher` with a transforming closure.
pub fn transform_values_with<K, F, B, G>(fetcher: F, transform: G) -> Transformed<F, G>
where
    F: Fetch<K>,
    B: Clone + Send + 'static,
    G: Fn(F::Value) -> Future<B, F::Error> + Send + Sync + 'static,
{
    Transformed::new(fetcher, transform)
}

/// Method form of [`transform_values`], available on every fetcher.
pub trait FetchExt<K>: Fetch<K> + Sized {
    fn transform_values<T>(self, transformer: T) -> Transformed<Self, T>
    where
        T: Transformer<Self::Value, Error = Self::Error> + Send + Sync + 'static,
    {
        Transformed::new(self, transformer)
    }
}

impl<K, F: Fetch<K>> FetchExt<K> for F {}

/// Wraps a fetcher so it can be composed with `>>`.
///
/// # Examples
///
/// ```
/// use fetch_promise::{Fetch, Fetcher, Future, Outcome};
///
/// let fetch = Fetcher(|key: u8| Future::<u8, ()>::succeeded(key + 1));
/// let composed = fetch
///     >> (|n: u8| Future::<u16, ()>::succeeded(u16::from(n) * 2))
///     >> (|n: u16| Future::<String, ()>::succeeded(n.to_string()));
/// assert_eq!(composed.get(4).outcome(), Some(Outcome::Success("10".into())));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Fetcher<F>(pub F);

impl<K, F: Fetch<K>> Fetch<K> for Fetcher<F> {
    type Value = F::Value;
    type Error = F::Error;

    fn get(&self, key: K) -> Future<F::Value, F::Error> {
        self.0.get(key)
    }
}

impl<F, T> Shr<T> for Fetcher<F> {
    type Output = Transformed<F, T>;

    fn shr(self, transformer: T) -> Transformed<F, T> {
        Transformed::new(self.0, transformer)
    }
}

impl<F, T, U> Shr<U> for Transformed<F, T> {
    type Output = Transformed<Transformed<F, T>, U>;

    fn shr(self, transformer: U) -> Self::Output {
        Transformed::new(self, transformer)
    }
}

#[cfg(test)]
mod tests {
    use super::{transform_values, transform_values_with, FetchExt, Fetcher};
    use crate::{Fetch, Future, Outcome, Promise};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn plus_one(n: i32) -> Future<String, String> {
        if n > 0 {
            Future::succeeded((n + 1).to_string())
        } else {
            Future::failed(format!("{n} is not positive"))
        }
    }

    #[test]
    fn test_transform_waits_for_fetch() {
        let pending = Promise::<i32, String>::new();
        let source = pending.clone();
        let composed = transform_values(move |_: ()| source.future(), plus_one);

        let future = composed.get(());
        assert!(future.is_pending());
        pending.succeed(1);
        assert_eq!(future.outcome(), Some(Outcome::Success("2".to_string())));
    }

    #[test]
    fn test_transform_not_called_on_fetch_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let composed = transform_values_with(
            |_: ()| Future::<i32, String>::failed("offline".into()),
            move |n: i32| {
                counter.fetch_add(1, Ordering::SeqCst);
                Future::<i32, String>::succeeded(n)
            },
        );
        assert_eq!(
            composed.get(()).outcome(),
            Some(Outcome::Failure("offline".to_string()))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fetch_cancel_cancels_composed() {
        let composed = (|_: ()| Future::<i32, String>::canceled()).transform_values(plus_one);
        assert!(composed.get(()).is_canceled());
    }

    #[test]
    fn test_transform_cancel_cancels_composed() {
        let composed = Fetcher(|n: i32| Future::<i32, String>::succeeded(n))
            >> (|_: i32| Future::<i32, String>::canceled());
        assert!(composed.get(5).is_canceled());
    }

    #[test]
    fn test_composed_fetcher_is_reusable() {
        let composed = transform_values(|n: i32| Future::<i32, String>::succeeded(n), plus_one);
        let again = composed.clone();
        assert_eq!(composed.get(1).outcome(), Some(Outcome::Success("2".into())));
        assert_eq!(again.get(2).outcome(), Some(Outcome::Success("3".into())));
        assert_eq!(composed.transformer()(9).outcome(), plus_one(9).outcome());
    }
}
