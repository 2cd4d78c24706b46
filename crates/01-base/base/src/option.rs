//! Combinator vocabulary over [`Option`].
//!
//! The native enum already is the tagged `None | Some(value)` union; this
//! module adds the short-circuiting names the rest of the workspace chains
//! with. The `un_some` form is an assertion and panics on `None`.

/// Wraps `value` in the present branch.
#[inline]
pub fn some<T>(value: T) -> Option<T> {
    Some(value)
}

/// Returns the absent branch.
#[inline]
pub fn none<T>() -> Option<T> {
    None
}

/// Short-circuiting combinators for [`Option`].
pub trait OptionExt<T>: Sized {
    /// Monadic bind: runs `f` on `Some`, passes `None` through untouched.
    fn then_some<U>(self, f: impl FnOnce(T) -> Option<U>) -> Option<U>;

    /// Infallible transform of the present value.
    fn map_some<U>(self, f: impl FnOnce(T) -> U) -> Option<U>;

    /// Extracts the present value, panicking on `None`.
    fn un_some(self) -> T;

    /// Extracts the present value or returns `default`.
    fn un_some_or(self, default: T) -> T;

    /// Extracts the present value or computes a fallback.
    fn un_some_else(self, f: impl FnOnce() -> T) -> T;
}

impl<T> OptionExt<T> for Option<T> {
    #[inline]
    fn then_some<U>(self, f: impl FnOnce(T) -> Option<U>) -> Option<U> {
        match self {
            Some(value) => f(value),
            None => None,
        }
    }

    #[inline]
    fn map_some<U>(self, f: impl FnOnce(T) -> U) -> Option<U> {
        self.then_some(|value| Some(f(value)))
    }

    #[inline]
    #[track_caller]
    fn un_some(self) -> T {
        match self {
            Some(value) => value,
            None => panic!("un_some called on a None value"),
        }
    }

    #[inline]
    fn un_some_or(self, default: T) -> T {
        match self {
            Some(value) => value,
            None => default,
        }
    }

    #[inline]
    fn un_some_else(self, f: impl FnOnce() -> T) -> T {
        match self {
            Some(value) => value,
            None => f(),
        }
    }
}
