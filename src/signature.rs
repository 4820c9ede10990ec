//! Argument tuples and the cache keys derived from them.
//!
//! A query call is identified by its [`Signature`]: the query name plus the
//! canonical JSON rendering of its [`Args`]. Two calls with structurally equal
//! arguments produce equal signatures, so they resolve to the same cached entry.
//!
//! # Example
//!
//! ```
//! use kwery::{Args, Signature};
//!
//! let first = Args::new(("person", 1)).unwrap();
//! let second = Args::new(("person", 1)).unwrap();
//!
//! assert_eq!(
//!     Signature::derive("request", &first).unwrap(),
//!     Signature::derive("request", &second).unwrap(),
//! );
//! ```

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::KweryError;

/// The ordered argument list passed to an operation.
///
/// Any `Serialize` value converts into `Args`:
///
/// - a tuple, array or `Vec` becomes the argument list, element by element
/// - `()`, `None` and JSON `null` become the empty list
/// - any other value becomes a single argument
///
/// To pass a single sequence as one argument, wrap it in a one-element tuple: `(vec,)`.
/// The same goes for a lone null argument: `(Value::Null,)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Args(Vec<Value>);

impl Args {
    /// Creates an empty argument list.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Converts a serializable value into an argument list.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `args` cannot be represented as JSON,
    /// for example a map with non-string keys.
    pub fn new(args: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::to_value(args)? {
            Value::Null => Self::empty(),
            Value::Array(items) => Self(items),
            other => Self(vec![other]),
        })
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the argument at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Deserializes the argument at `index` into `T`.
    ///
    /// A missing argument deserializes from `null`, so `Option<T>` reads an
    /// absent trailing argument as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument does not match `T`.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T, serde_json::Error> {
        T::deserialize(self.0.get(index).unwrap_or(&Value::Null))
    }

    /// Iterates over the arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Consumes the list, returning the raw values.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The cache key of a query call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: String,
    args: String,
}

impl Signature {
    /// Derives the signature of calling `name` with `args`.
    ///
    /// Object keys are emitted in sorted order, so maps that differ only in
    /// insertion order share a signature. Argument order is significant.
    ///
    /// # Errors
    ///
    /// Returns [`KweryError::KeyDerivation`] if the arguments cannot be rendered.
    pub fn derive(name: &str, args: &Args) -> Result<Self, KweryError> {
        let rendered = serde_json::to_string(args).map_err(|e| KweryError::KeyDerivation {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            args: rendered,
        })
    }

    /// Returns the query name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the canonical JSON rendering of the arguments.
    #[must_use]
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.args)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn sig(name: &str, args: impl Serialize) -> Signature {
        let args = Args::new(args).expect("args should serialize");
        Signature::derive(name, &args).expect("signature should derive")
    }

    #[test]
    fn test_args_shapes() {
        assert!(Args::new(()).expect("unit").is_empty());

        let single = Args::new("person").expect("string");
        assert_eq!(single.len(), 1);
        assert_eq!(single.get(0), Some(&json!("person")));

        let tuple = Args::new(("id", json!({ "data": "hello" }))).expect("tuple");
        assert_eq!(tuple.len(), 2);
        assert_eq!(tuple.get(1), Some(&json!({ "data": "hello" })));

        let wrapped = Args::new((vec![1, 2, 3],)).expect("wrapped vec");
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped.get(0), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_null_means_no_arguments() {
        assert!(Args::new(None::<u32>).expect("none").is_empty());
        assert!(Args::new(Value::Null).expect("null").is_empty());
        assert_eq!(sig("request", None::<u32>), sig("request", ()));

        let lone_null = Args::new((Value::Null,)).expect("wrapped null");
        assert_eq!(lone_null.len(), 1);
        assert_eq!(lone_null.get(0), Some(&Value::Null));
        assert_ne!(sig("request", (Value::Null,)), sig("request", ()));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::new(("person", 7)).expect("tuple");
        assert_eq!(args.parse::<String>(0).expect("string"), "person");
        assert_eq!(args.parse::<u32>(1).expect("number"), 7);
        assert_eq!(args.parse::<Option<u32>>(2).expect("missing"), None);
        assert!(args.parse::<u32>(0).is_err());
    }

    #[test]
    fn test_signature_equal_for_equal_args() {
        assert_eq!(sig("request", ("person",)), sig("request", "person"));
        assert_eq!(sig("requests", ()), sig("requests", Vec::<Value>::new()));
    }

    #[test]
    fn test_signature_distinct() {
        assert_ne!(sig("request", "person"), sig("request", "place"));
        assert_ne!(sig("request", "person"), sig("requests", "person"));
        assert_ne!(sig("pair", (1, 2)), sig("pair", (2, 1)));
        assert_ne!(sig("value", 1), sig("value", "1"));
    }

    #[test]
    fn test_signature_ignores_map_insertion_order() {
        let mut first = HashMap::new();
        first.insert("b", 2);
        first.insert("a", 1);

        let mut second = BTreeMap::new();
        second.insert("a", 1);
        second.insert("b", 2);

        assert_eq!(sig("filter", (first,)), sig("filter", (second,)));
    }

    #[test]
    fn test_non_string_map_keys_fail() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");

        assert!(Args::new((map,)).is_err());
    }

    #[test]
    fn test_signature_display() {
        let signature = sig("request", ("person", 1));
        assert_eq!(signature.name(), "request");
        assert_eq!(signature.args(), r#"["person",1]"#);
        assert_eq!(signature.to_string(), r#"request["person",1]"#);
    }
}
