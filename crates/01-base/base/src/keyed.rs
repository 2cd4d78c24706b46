//! Key/value carrier used to multiplex several streams onto one sink.

use crate::send::Sink;
use std::rc::Rc;

/// Payload tagged with a discriminating key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyed<K, V> {
    /// Discriminator.
    pub key: K,
    /// Carried payload.
    pub value: V,
}

/// Pairs `key` with `value`.
pub fn keyed<K, V>(key: K, value: V) -> Keyed<K, V> {
    Keyed { key, value }
}

impl<K, V> Keyed<K, V> {
    /// Transforms the payload while keeping the key.
    pub fn map_value<U>(self, f: impl FnOnce(V) -> U) -> Keyed<K, U> {
        Keyed {
            key: self.key,
            value: f(self.value),
        }
    }

    /// Splits into `(key, value)`.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Wraps `target` so every value sent through the result is tagged with `key`.
pub fn keyed_sink<K, V>(key: K, target: Sink<Keyed<K, V>>) -> Sink<V>
where
    K: Clone + 'static,
    V: 'static,
{
    Rc::new(move |value| target(keyed(key.clone(), value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn keyed_sink_tags_values() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&seen);
        let target: Sink<Keyed<&'static str, u32>> =
            Rc::new(move |k: Keyed<&'static str, u32>| out.borrow_mut().push(k));
        let left = keyed_sink("left", Rc::clone(&target));
        let right = keyed_sink("right", target);

        left(1);
        right(2);
        left(3);

        assert_eq!(
            *seen.borrow(),
            vec![keyed("left", 1), keyed("right", 2), keyed("left", 3)]
        );
    }

    #[test]
    fn map_value_keeps_key() {
        assert_eq!(keyed(7u8, "ab").map_value(str::len), keyed(7u8, 2));
        assert_eq!(keyed('k', 1).into_pair(), ('k', 1));
    }
}
