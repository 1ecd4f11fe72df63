//! Key Types Module
//!
//! Strongly-typed key descriptors and their type-erased index form.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

// == Key Type ==
/// A key descriptor binding a hashable element to the value type stored
/// under it.
///
/// Two descriptors address the same entry when their elements have the same
/// type and compare equal, whatever their `Value` types are.
pub trait KeyType: Clone {
    /// Type of the value stored under this key
    type Value: Send + Sync + 'static;
    /// Hashable element used as the actual index key
    type Element: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static;

    fn element(&self) -> &Self::Element;
}

// == String Key ==
/// Key addressed by a string.
pub struct StringKey<T> {
    element: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> StringKey<T> {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            _value: PhantomData,
        }
    }
}

impl<T> Clone for StringKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.element.clone())
    }
}

impl<T> fmt::Debug for StringKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringKey").field(&self.element).finish()
    }
}

impl<T: Send + Sync + 'static> KeyType for StringKey<T> {
    type Value = T;
    type Element = String;

    fn element(&self) -> &String {
        &self.element
    }
}

// == Hash Key ==
/// Key addressed by an integer hash.
pub struct HashKey<T> {
    element: i64,
    _value: PhantomData<fn() -> T>,
}

impl<T> HashKey<T> {
    pub fn new(element: i64) -> Self {
        Self {
            element,
            _value: PhantomData,
        }
    }
}

impl<T> Clone for HashKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.element)
    }
}

impl<T> fmt::Debug for HashKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashKey").field(&self.element).finish()
    }
}

impl<T: Send + Sync + 'static> KeyType for HashKey<T> {
    type Value = T;
    type Element = i64;

    fn element(&self) -> &i64 {
        &self.element
    }
}

// == Any Key ==
/// Object-safe view of a key element: equality and hashing without knowing
/// the concrete type.
trait ErasedElement: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn ErasedElement) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<E> ErasedElement for E
where
    E: Hash + Eq + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ErasedElement) -> bool {
        other
            .as_any()
            .downcast_ref::<E>()
            .map_or(false, |other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<E>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// Type-erased, hashable key built from any [`KeyType`].
#[derive(Clone)]
pub struct AnyKey(Arc<dyn ErasedElement>);

impl AnyKey {
    pub fn new<K: KeyType>(key: &K) -> Self {
        AnyKey(Arc::new(key.element().clone()))
    }
}

impl PartialEq for AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}

impl Eq for AnyKey {}

impl Hash for AnyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyKey").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    struct Dog;
    struct Cat;

    fn hash_of(key: &AnyKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_same_element_same_key() {
        let a = AnyKey::new(&StringKey::<Dog>::new("dog"));
        let b = AnyKey::new(&StringKey::<Dog>::new("dog"));

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_value_type_does_not_split_keys() {
        let dog = AnyKey::new(&StringKey::<Dog>::new("pet"));
        let cat = AnyKey::new(&StringKey::<Cat>::new("pet"));

        assert_eq!(dog, cat);
        assert_eq!(hash_of(&dog), hash_of(&cat));
    }

    #[test]
    fn test_different_elements_differ() {
        let a = AnyKey::new(&StringKey::<Dog>::new("a"));
        let b = AnyKey::new(&StringKey::<Dog>::new("b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_element_types_never_collide() {
        let hashed = AnyKey::new(&HashKey::<Dog>::new(1));
        let named = AnyKey::new(&StringKey::<Dog>::new("1"));
        assert_ne!(hashed, named);
    }

    #[test]
    fn test_any_key_in_hash_map() {
        let mut map = std::collections::HashMap::new();
        map.insert(AnyKey::new(&HashKey::<Cat>::new(7)), "seven");

        assert_eq!(map.get(&AnyKey::new(&HashKey::<Dog>::new(7))), Some(&"seven"));
        assert_eq!(map.get(&AnyKey::new(&HashKey::<Dog>::new(8))), None);
    }
}
