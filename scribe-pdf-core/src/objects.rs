//! The low-level PDF object types the writer serializes.

use std::fmt;

/// An indirect object number.
///
/// Generated documents never reuse or update objects, so the generation
/// number is always zero and only the object number is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 0 R", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Name(String),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Reference(ObjectId),
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Integer(i)
    }
}

impl From<f64> for Object {
    fn from(f: f64) -> Self {
        Object::Real(f)
    }
}

impl From<ObjectId> for Object {
    fn from(id: ObjectId) -> Self {
        Object::Reference(id)
    }
}

impl From<Dictionary> for Object {
    fn from(dict: Dictionary) -> Self {
        Object::Dictionary(dict)
    }
}

/// An insertion-ordered PDF dictionary.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<(String, Object)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value for it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Shorthand for a `/Name` object.
pub fn name(n: impl Into<String>) -> Object {
    Object::Name(n.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        let id = ObjectId::new(7);
        assert_eq!(id.to_string(), "7 0 R");
        assert_eq!(id.number(), 7);
    }

    #[test]
    fn test_dictionary_set_get() {
        let mut dict = Dictionary::new();
        dict.set("Type", name("Catalog"));
        dict.set("Count", 3i64);

        assert_eq!(dict.len(), 2);
        assert!(matches!(dict.get("Count"), Some(Object::Integer(3))));
        assert!(dict.get("Missing").is_none());
    }

    #[test]
    fn test_dictionary_set_replaces() {
        let mut dict = Dictionary::new();
        dict.set("Count", 1i64);
        dict.set("Count", 2i64);

        assert_eq!(dict.len(), 1);
        assert!(matches!(dict.get("Count"), Some(Object::Integer(2))));
    }

    #[test]
    fn test_dictionary_preserves_insertion_order() {
        let mut dict = Dictionary::new();
        dict.set("B", 1i64);
        dict.set("A", 2i64);

        let keys: Vec<&String> = dict.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, ["B", "A"]);
    }
}
