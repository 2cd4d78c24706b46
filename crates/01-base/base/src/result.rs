//! Combinator vocabulary over [`Result`].
//!
//! `Err` is the uniform channel for expected failures. Every combinator here
//! passes the non-matching branch through untouched; `un_ok` and `un_err` are
//! assertions for callers that already proved the variant locally.

use crate::either::Either;

/// Wraps `value` in the success branch.
#[inline]
pub fn ok<V, E>(value: V) -> Result<V, E> {
    Ok(value)
}

/// Wraps `error` in the failure branch.
#[inline]
pub fn err<V, E>(error: E) -> Result<V, E> {
    Err(error)
}

/// Short-circuiting combinators for [`Result`].
pub trait ResultExt<V, E>: Sized {
    /// Monadic bind on the success branch.
    fn then_ok<U>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<U, E>;

    /// Monadic bind on the failure branch.
    fn then_err<F>(self, f: impl FnOnce(E) -> Result<V, F>) -> Result<V, F>;

    /// Infallible transform of the success value.
    fn map_ok<U>(self, f: impl FnOnce(V) -> U) -> Result<U, E>;

    /// `then_err` for a transform that cannot fail itself.
    fn map_err_with<F>(self, f: impl FnOnce(E) -> F) -> Result<V, F>;

    /// Extracts the success value, panicking on `Err`.
    fn un_ok(self) -> V;

    /// Extracts the error value, panicking on `Ok`.
    fn un_err(self) -> E;

    /// Extracts the success value or returns `default`.
    fn un_ok_or(self, default: V) -> V;

    /// Extracts the error value or returns `default`.
    fn un_err_or(self, default: E) -> E;

    /// Extracts the success value or computes one from the error.
    fn un_ok_else(self, f: impl FnOnce(E) -> V) -> V;

    /// Extracts the error value or computes one from the success value.
    fn un_err_else(self, f: impl FnOnce(V) -> E) -> E;

    /// Projects onto the success branch, discarding the error.
    fn some_ok(self) -> Option<V>;

    /// Projects onto the failure branch, discarding the value.
    fn some_err(self) -> Option<E>;

    /// Converts into the symmetric encoding (`Err` left, `Ok` right).
    fn into_either(self) -> Either<E, V>;
}

impl<V, E> ResultExt<V, E> for Result<V, E> {
    #[inline]
    fn then_ok<U>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<U, E> {
        match self {
            Ok(value) => f(value),
            Err(error) => Err(error),
        }
    }

    #[inline]
    fn then_err<F>(self, f: impl FnOnce(E) -> Result<V, F>) -> Result<V, F> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => f(error),
        }
    }

    #[inline]
    fn map_ok<U>(self, f: impl FnOnce(V) -> U) -> Result<U, E> {
        self.then_ok(|value| Ok(f(value)))
    }

    #[inline]
    fn map_err_with<F>(self, f: impl FnOnce(E) -> F) -> Result<V, F> {
        self.then_err(|error| Err(f(error)))
    }

    #[inline]
    #[track_caller]
    fn un_ok(self) -> V {
        match self {
            Ok(value) => value,
            Err(_) => panic!("un_ok called on an Err value"),
        }
    }

    #[inline]
    #[track_caller]
    fn un_err(self) -> E {
        match self {
            Ok(_) => panic!("un_err called on an Ok value"),
            Err(error) => error,
        }
    }

    #[inline]
    fn un_ok_or(self, default: V) -> V {
        match self {
            Ok(value) => value,
            Err(_) => default,
        }
    }

    #[inline]
    fn un_err_or(self, default: E) -> E {
        match self {
            Ok(_) => default,
            Err(error) => error,
        }
    }

    #[inline]
    fn un_ok_else(self, f: impl FnOnce(E) -> V) -> V {
        match self {
            Ok(value) => value,
            Err(error) => f(error),
        }
    }

    #[inline]
    fn un_err_else(self, f: impl FnOnce(V) -> E) -> E {
        match self {
            Ok(value) => f(value),
            Err(error) => error,
        }
    }

    #[inline]
    fn some_ok(self) -> Option<V> {
        match self {
            Ok(value) => Some(value),
            Err(_) => None,
        }
    }

    #[inline]
    fn some_err(self) -> Option<E> {
        match self {
            Ok(_) => None,
            Err(error) => Some(error),
        }
    }

    #[inline]
    fn into_either(self) -> Either<E, V> {
        Either::from(self)
    }
}
