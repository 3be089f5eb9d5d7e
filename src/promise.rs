use std::fmt::{self, Debug};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::{future, pin::Pin, task::{Context, Poll, Waker}};

use log::trace;
use parking_lot::Mutex;

use crate::Outcome;

/// The write side of a single-assignment asynchronous value.
///
/// A `Promise` starts out pending and is completed at most once, by
/// [`succeed`](Promise::succeed), [`fail`](Promise::fail) or
/// [`cancel`](Promise::cancel). The first completion wins; later ones are
/// ignored. Completion runs every callback registered on the bound
/// [`Future`] synchronously, on the completing thread.
///
/// Cloning a `Promise` yields another write handle to the same state.
///
/// # Examples
///
/// ```
/// use fetch_promise::Promise;
/// use std::sync::mpsc::channel;
/// use std::thread;
///
/// let promise = Promise::<String, String>::new();
/// let (tx, rx) = channel();
/// promise.future().on_success(move |value| tx.send(value).unwrap());
///
/// let producer = promise.clone();
/// thread::spawn(move || producer.succeed("🍓".into()))
///     .join()
///     .expect("The producer thread has panicked.");
///
/// assert_eq!(rx.recv().unwrap(), "🍓");
/// assert!(!promise.fail("too late".into()));
/// ```
pub struct Promise<T, E> {
    inner: Arc<Mutex<State<T, E>>>,
}

/// The read side of a [`Promise`].
///
/// A `Future` only registers callbacks; it cannot complete the promise. All
/// registration methods return the same `Future`, so chained registrations
/// are independent listeners on one value, not a pipeline.
///
/// A callback registered after the promise completed runs immediately, on
/// the registering thread, with the known outcome.
///
/// Callbacks of one kind run in registration order only among those queued
/// before completion. One registered from another thread while completion
/// is still notifying runs right away and may overtake earlier callbacks.
///
/// If a callback panics, the remaining callbacks still run and awaiting
/// tasks are still woken; the first panic is then resumed on the completing
/// thread.
///
/// `Future` also implements [`std::future::Future`], resolving to the
/// promise's [`Outcome`]. Awaiting does not consume the value.
///
/// # Examples
///
/// ```
/// use fetch_promise::{Outcome, Promise};
/// use futures::executor::block_on;
/// use std::thread;
///
/// let promise = Promise::<u32, String>::new();
/// let future = promise.future();
/// let waiter = thread::spawn(move || block_on(future));
/// promise.succeed(42);
/// assert_eq!(waiter.join().unwrap(), Outcome::Success(42));
/// ```
pub struct Future<T, E> {
    inner: Arc<Mutex<State<T, E>>>,
}

enum State<T, E> {
    Pending {
        listeners: Vec<Listener<T, E>>,
        wakers: Vec<Waker>,
    },
    Done(Outcome<T, E>),
}

enum Listener<T, E> {
    Success(Box<dyn FnOnce(T) + Send>),
    Failure(Box<dyn FnOnce(E) + Send>),
    Cancel(Box<dyn FnOnce() + Send>),
    Completion(Box<dyn FnOnce(Outcome<T, E>) + Send>),
}

impl<T: Clone, E: Clone> Listener<T, E> {
    /// Runs the callback if it listens for `outcome`'s category.
    fn fire(self, outcome: &Outcome<T, E>) {
        match (self, outcome) {
            (Listener::Success(f), Outcome::Success(value)) => f(value.clone()),
            (Listener::Failure(f), Outcome::Failure(err)) => f(err.clone()),
            (Listener::Cancel(f), Outcome::NotComputed) => f(),
            (Listener::Completion(f), outcome) => f(outcome.clone()),
            _ => {}
        }
    }
}

impl<T, E> State<T, E> {
    fn pending() -> Self {
        State::Pending {
            listeners: vec![],
            wakers: vec![],
        }
    }
}

impl<T: Debug, E: Debug> Debug for State<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Pending { listeners, wakers } => f
                .debug_struct("Pending")
                .field("listeners", &listeners.len())
                .field("wakers", &wakers.len())
                .finish(),
            State::Done(outcome) => f.debug_tuple("Done").field(outcome).finish(),
        }
    }
}

fn category<T, E>(outcome: &Outcome<T, E>) -> &'static str {
    match outcome {
        Outcome::Success(_) => "success",
        Outcome::Failure(_) => "failure",
        Outcome::NotComputed => "cancel",
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Promise {
            inner: Arc::new(Mutex::new(State::pending())),
        }
    }

    /// A promise that has already succeeded with `value`.
    pub fn succeeded(value: T) -> Self {
        Self::completed(Outcome::Success(value))
    }

    /// A promise that has already failed with `err`.
    pub fn failed(err: E) -> Self {
        Self::completed(Outcome::Failure(err))
    }

    /// A promise that has already been canceled.
    pub fn canceled() -> Self {
        Self::completed(Outcome::NotComputed)
    }

    fn completed(outcome: Outcome<T, E>) -> Self {
        Promise {
            inner: Arc::new(Mutex::new(State::Done(outcome))),
        }
    }

    /// The read side bound to this promise.
    pub fn future(&self) -> Future<T, E> {
        Future {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Completes the promise with `value`.
    ///
    /// Returns `false`, and does nothing, if the promise was already
    /// completed.
    pub fn succeed(&self, value: T) -> bool {
        self.complete(Outcome::Success(value))
    }

    /// Completes the promise with `err`. See [`succeed`](Promise::succeed).
    pub fn fail(&self, err: E) -> bool {
        self.complete(Outcome::Failure(err))
    }

    /// Cancels the promise. Only cancel callbacks run; failure callbacks
    /// never observe a cancellation.
    pub fn cancel(&self) -> bool {
        self.complete(Outcome::NotComputed)
    }

    /// Completes the promise with any outcome, `NotComputed` meaning cancel.
    pub fn complete(&self, outcome: Outcome<T, E>) -> bool {
        let (listeners, wakers) = {
            let mut state = self.inner.lock();
            if let State::Done(ref done) = *state {
                trace!(
                    "ignoring {} for promise already completed with {}",
                    category(&outcome),
                    category(done)
                );
                return false;
            }
            match std::mem::replace(&mut *state, State::Done(outcome.clone())) {
                State::Pending { listeners, wakers } => (listeners, wakers),
                State::Done(_) => return false,
            }
        };
        trace!(
            "promise completed with {}, notifying {} listener(s)",
            category(&outcome),
            listeners.len()
        );
        for waker in wakers {
            waker.wake();
        }
        // A panicking listener must not starve the ones queued after it.
        let mut panicked = None;
        for listener in listeners {
            let fired = panic::catch_unwind(AssertUnwindSafe(|| listener.fire(&outcome)));
            if let Err(payload) = fired {
                panicked.get_or_insert(payload);
            }
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        true
    }

    /// Makes this promise follow `other`: whichever way `other` completes,
    /// this promise is completed the same way, unless it was completed
    /// first.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetch_promise::{Outcome, Promise};
    ///
    /// let source = Promise::<i32, String>::new();
    /// let shadow = Promise::new();
    /// shadow.mimic(&source.future()).future().on_failure(|err| assert_eq!(err, "gone"));
    ///
    /// source.fail("gone".to_string());
    /// assert_eq!(shadow.future().outcome(), Some(Outcome::Failure("gone".into())));
    /// ```
    pub fn mimic(&self, other: &Future<T, E>) -> &Self {
        let promise = self.clone();
        other.on_completion(move |outcome| {
            promise.complete(outcome);
        });
        self
    }
}

/// A promise that succeeds with `value` if present, otherwise fails with
/// `err`.
///
/// # Examples
///
/// ```
/// use fetch_promise::{promise, Outcome};
///
/// let missing = promise::from_option(None::<u8>, "no value");
/// assert_eq!(missing.future().outcome(), Some(Outcome::Failure("no value")));
/// ```
pub fn from_option<T, E>(value: Option<T>, err: E) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    match value {
        Some(value) => Promise::succeeded(value),
        None => Promise::failed(err),
    }
}

impl<T, E> Default for Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Promise {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Debug, E: Debug> Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &*self.inner.lock())
            .finish()
    }
}

impl<T, E> Future<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub fn succeeded(value: T) -> Self {
        Promise::succeeded(value).future()
    }

    pub fn failed(err: E) -> Self {
        Promise::failed(err).future()
    }

    pub fn canceled() -> Self {
        Promise::canceled().future()
    }

    pub fn on_success<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.register(Listener::Success(Box::new(callback)))
    }

    pub fn on_failure<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(E) + Send + 'static,
    {
        self.register(Listener::Failure(Box::new(callback)))
    }

    pub fn on_cancel<F>(&self, callback: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.register(Listener::Cancel(Box::new(callback)))
    }

    /// Registers one callback for all three terminal states. It runs exactly
    /// once, with `Outcome::NotComputed` standing for cancellation.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetch_promise::{Outcome, Promise};
    /// use std::sync::mpsc::channel;
    ///
    /// let promise = Promise::<(), String>::new();
    /// let (tx, rx) = channel();
    /// promise.future().on_completion(move |outcome| tx.send(outcome).unwrap());
    /// promise.cancel();
    /// assert_eq!(rx.recv().unwrap(), Outcome::NotComputed);
    /// ```
    pub fn on_completion<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(Outcome<T, E>) + Send + 'static,
    {
        self.register(Listener::Completion(Box::new(callback)))
    }

    fn register(&self, listener: Listener<T, E>) -> &Self {
        let outcome = {
            let mut state = self.inner.lock();
            match &mut *state {
                State::Pending { listeners, .. } => {
                    listeners.push(listener);
                    return self;
                }
                State::Done(outcome) => outcome.clone(),
            }
        };
        listener.fire(&outcome);
        self
    }

    /// The outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<Outcome<T, E>> {
        match &*self.inner.lock() {
            State::Done(outcome) => Some(outcome.clone()),
            State::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(&*self.inner.lock(), State::Pending { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(&*self.inner.lock(), State::Done(Outcome::Success(_)))
    }

    pub fn is_failed(&self) -> bool {
        matches!(&*self.inner.lock(), State::Done(Outcome::Failure(_)))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(&*self.inner.lock(), State::Done(Outcome::NotComputed))
    }

    /// Transforms the success value. Failure and cancellation pass through.
    pub fn map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let promise = Promise::new();
        let mapped = promise.clone();
        self.on_completion(move |outcome| {
            mapped.complete(outcome.map(f));
        });
        promise.future()
    }

    /// Chains an asynchronous step onto the success value.
    ///
    /// `f` runs at most once, and only if this future succeeds. The returned
    /// future then follows the future produced by `f`. A failure or
    /// cancellation of this future is forwarded unchanged and `f` never
    /// runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use fetch_promise::{Future, Outcome};
    ///
    /// let parsed = Future::<&str, String>::succeeded("17").flat_map(|text| {
    ///     match text.parse::<u32>() {
    ///         Ok(n) => Future::succeeded(n),
    ///         Err(err) => Future::failed(err.to_string()),
    ///     }
    /// });
    /// assert_eq!(parsed.outcome(), Some(Outcome::Success(17)));
    /// ```
    pub fn flat_map<U, F>(&self, f: F) -> Future<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U, E> + Send + 'static,
    {
        let promise = Promise::new();
        let chained = promise.clone();
        self.on_completion(move |outcome| match outcome {
            Outcome::Success(value) => {
                chained.mimic(&f(value));
            }
            Outcome::Failure(err) => {
                chained.fail(err);
            }
            Outcome::NotComputed => {
                chained.cancel();
            }
        });
        promise.future()
    }
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Future {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Debug, E: Debug> Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("state", &*self.inner.lock())
            .finish()
    }
}

impl<T: Clone, E: Clone> future::Future for Future<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.lock();
        match &mut *state {
            State::Done(outcome) => Poll::Ready(outcome.clone()),
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}
