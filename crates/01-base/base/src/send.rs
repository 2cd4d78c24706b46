//! Sink and done callbacks shared by producers and the fork scheduler.

use std::rc::Rc;

/// Multi-shot value sink.
pub type Sink<T> = Rc<dyn Fn(T)>;

/// One-shot "no more values" signal.
pub type DoneFn = Box<dyn FnOnce()>;

/// Boxes a closure as a [`Sink`].
pub fn sink<T>(f: impl Fn(T) + 'static) -> Sink<T> {
    Rc::new(f)
}

/// Sink that discards every value.
pub fn noop_sink<T>() -> Sink<T> {
    Rc::new(|_| {})
}
