//! The two capabilities the value-transformation combinator composes: a
//! keyed asynchronous lookup and an asynchronous one-way conversion.
//!
//! Both are blanket-implemented for plain closures, so a function
//! `Fn(K) -> Future<V, E>` is already a fetcher and `Fn(A) -> Future<B, E>`
//! is already a transformer.
use crate::Future;

/// Looks up a value by key.
///
/// Implementations own a [`Promise`](crate::Promise) per call, hand out its
/// future, and complete it exactly once when the lookup finishes.
///
/// # Examples
///
/// ```
/// use fetch_promise::{Fetch, Future, Outcome};
///
/// struct Lengths;
///
/// impl Fetch<&'static str> for Lengths {
///     type Value = usize;
///     type Error = String;
///
///     fn get(&self, key: &'static str) -> Future<usize, String> {
///         Future::succeeded(key.len())
///     }
/// }
///
/// assert_eq!(Lengths.get("four").outcome(), Some(Outcome::Success(4)));
/// ```
pub trait Fetch<K> {
    type Value: Clone + Send + 'static;
    type Error: Clone + Send + 'static;

    fn get(&self, key: K) -> Future<Self::Value, Self::Error>;
}

impl<K, V, E, F> Fetch<K> for F
where
    F: Fn(K) -> Future<V, E>,
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Value = V;
    type Error = E;

    fn get(&self, key: K) -> Future<V, E> {
        self(key)
    }
}

/// Converts a value into another, possibly asynchronously and possibly
/// failing.
///
/// A conversion that has no result must fail its future with an error of its
/// own choosing; there is no "empty success".
pub trait Transformer<A> {
    type Output: Clone + Send + 'static;
    type Error: Clone + Send + 'static;

    fn transform(&self, input: A) -> Future<Self::Output, Self::Error>;
}

impl<A, B, E, F> Transformer<A> for F
where
    F: Fn(A) -> Future<B, E>,
    B: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = B;
    type Error = E;

    fn transform(&self, input: A) -> Future<B, E> {
        self(input)
    }
}
