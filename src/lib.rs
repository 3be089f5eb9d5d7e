//! Single-assignment promises and the composition of asynchronous fetches.
//!
//! A [`Promise`] is the write side of a value that arrives later; its
//! [`Future`] is the read side, where any number of callbacks can be
//! registered before or after the value arrives. On top of that,
//! [`transform_values`] turns a keyed asynchronous lookup ([`Fetch`]) and an
//! asynchronous conversion ([`Transformer`]) into a new lookup.
//!
//! # Examples
//!
//! ```
//! use fetch_promise::{Fetch, FetchExt, Future, Outcome, Promise};
//! use std::thread;
//!
//! // A lookup that completes on another thread.
//! let fetch = |key: u32| {
//!     let promise = Promise::<u32, String>::new();
//!     let producer = promise.clone();
//!     thread::spawn(move || producer.succeed(key * 2));
//!     promise.future()
//! };
//!
//! let labels = fetch.transform_values(|n: u32| {
//!     if n > 0 {
//!         Future::succeeded(format!("#{n}"))
//!     } else {
//!         Future::failed("nothing to label".to_string())
//!     }
//! });
//!
//! let outcome = futures::executor::block_on(labels.get(21));
//! assert_eq!(outcome, Outcome::Success("#42".to_string()));
//! ```
use thiserror::Error;

pub mod compose;
pub mod fetch;
pub mod outcome;
pub mod promise;

pub use compose::{transform_values, transform_values_with, FetchExt, Fetcher, Transformed};
pub use fetch::{Fetch, Transformer};
pub use outcome::Outcome;
pub use promise::{Future, Promise};

/// Error form of a non-successful [`Outcome`], for `?` propagation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<E> {
    #[error("{0}")]
    Failed(E),
    #[error("the promise was canceled before it produced a value")]
    Canceled,
}
