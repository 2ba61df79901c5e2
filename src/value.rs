//! Value representation for ROFF data.
//!
//! This module provides the [`Value`] enum which represents any value a ROFF tagkey can
//! hold, the [`Array`] enum for homogeneous arrays, and [`ElementType`], the closed set of
//! wire types.
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use roffio::{Array, Value};
//!
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let scale = Value::from(1.5f32);
//! let name = Value::from("grid");
//! let zvals = Value::from(vec![1.0f32, 2.0, 3.0]);
//!
//! assert!(zvals.is_array());
//! assert_eq!(zvals.element_type(), roffio::ElementType::Float);
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use roffio::Value;
//!
//! let value = Value::from(42);
//! assert_eq!(value.as_i32(), Some(42));
//! assert_eq!(value.as_str(), None);
//! ```
//!
//! ## Byte Values
//!
//! A single byte is a scalar ([`Value::Byte`]). Arrays of bytes are kept as a raw byte
//! run ([`Array::Bytes`]) rather than as an array of scalars.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// The wire type of a scalar value or of the elements of an array.
///
/// # Examples
///
/// ```rust
/// use roffio::ElementType;
///
/// assert_eq!(ElementType::Int.keyword(), "int");
/// assert_eq!(ElementType::Double.fixed_width(), Some(8));
/// assert_eq!(ElementType::Char.fixed_width(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Char,
    Bool,
    Byte,
    Int,
    Float,
    Double,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Char,
        ElementType::Bool,
        ElementType::Byte,
        ElementType::Int,
        ElementType::Float,
        ElementType::Double,
    ];

    /// Returns the keyword used for this type in both encodings.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            ElementType::Char => "char",
            ElementType::Bool => "bool",
            ElementType::Byte => "byte",
            ElementType::Int => "int",
            ElementType::Float => "float",
            ElementType::Double => "double",
        }
    }

    /// Returns the number of bytes used by one binary value, or `None` for `char`
    /// which is a NUL-terminated byte run.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            ElementType::Bool | ElementType::Byte => Some(1),
            ElementType::Int | ElementType::Float => Some(4),
            ElementType::Double => Some(8),
            ElementType::Char => None,
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.keyword() == keyword)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A homogeneous array of one of the scalar kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
    Bool(Vec<bool>),
    /// Raw byte run.
    Bytes(Vec<u8>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Char(Vec<String>),
}

impl Array {
    /// Creates an empty array of the given element type.
    #[must_use]
    pub fn empty(element: ElementType) -> Self {
        match element {
            ElementType::Char => Array::Char(Vec::new()),
            ElementType::Bool => Array::Bool(Vec::new()),
            ElementType::Byte => Array::Bytes(Vec::new()),
            ElementType::Int => Array::Int(Vec::new()),
            ElementType::Float => Array::Float(Vec::new()),
            ElementType::Double => Array::Double(Vec::new()),
        }
    }

    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Array::Bool(_) => ElementType::Bool,
            Array::Bytes(_) => ElementType::Byte,
            Array::Int(_) => ElementType::Int,
            Array::Float(_) => ElementType::Float,
            Array::Double(_) => ElementType::Double,
            Array::Char(_) => ElementType::Char,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Array::Bool(v) => v.len(),
            Array::Bytes(v) => v.len(),
            Array::Int(v) => v.len(),
            Array::Float(v) => v.len(),
            Array::Double(v) => v.len(),
            Array::Char(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a scalar, which must have the array's element type.
    ///
    /// Returns the scalar back if its type differs or it is itself an array.
    pub(crate) fn push(&mut self, value: Value) -> std::result::Result<(), Value> {
        match (self, value) {
            (Array::Bool(v), Value::Bool(x)) => v.push(x),
            (Array::Bytes(v), Value::Byte(x)) => v.push(x),
            (Array::Int(v), Value::Int(x)) => v.push(x),
            (Array::Float(v), Value::Float(x)) => v.push(x),
            (Array::Double(v), Value::Double(x)) => v.push(x),
            (Array::Char(v), Value::Char(x)) => v.push(x),
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

/// Name of the newtype marker [`Array`] serializes through, followed by the element
/// keyword. Lets the serializer keep the element type of empty arrays.
pub(crate) const ARRAY_MARKER: &str = "$roffio::array::";

impl Serialize for Array {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let marker = match self.element_type() {
            ElementType::Char => "$roffio::array::char",
            ElementType::Bool => "$roffio::array::bool",
            ElementType::Byte => "$roffio::array::byte",
            ElementType::Int => "$roffio::array::int",
            ElementType::Float => "$roffio::array::float",
            ElementType::Double => "$roffio::array::double",
        };
        serializer.serialize_newtype_struct(marker, &Elements(self))
    }
}

struct Elements<'a>(&'a Array);

impl Serialize for Elements<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        fn elements<S: Serializer, T: Serialize>(
            serializer: S,
            items: &[T],
        ) -> std::result::Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(items.len()))?;
            for item in items {
                seq.serialize_element(item)?;
            }
            seq.end()
        }

        match self.0 {
            Array::Bool(v) => elements(serializer, v),
            Array::Bytes(v) => elements(serializer, v),
            Array::Int(v) => elements(serializer, v),
            Array::Float(v) => elements(serializer, v),
            Array::Double(v) => elements(serializer, v),
            Array::Char(v) => elements(serializer, v),
        }
    }
}

/// Any value a ROFF tagkey can hold.
///
/// # Examples
///
/// ```rust
/// use roffio::{Array, ElementType, Value};
///
/// let value = Value::Array(Array::Int(vec![1, 2, 3]));
/// assert_eq!(value.element_type(), ElementType::Int);
/// assert_eq!(value.as_array().map(|a| a.len()), Some(3));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Int(i32),
    Float(f32),
    Double(f64),
    Char(String),
    Array(Array),
}

impl Value {
    /// Returns the wire type of the value, or of its elements for arrays.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Value::Bool(_) => ElementType::Bool,
            Value::Byte(_) => ElementType::Byte,
            Value::Int(_) => ElementType::Int,
            Value::Float(_) => ElementType::Float,
            Value::Double(_) => ElementType::Double,
            Value::Char(_) => ElementType::Char,
            Value::Array(array) => array.element_type(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_byte(&self) -> Option<u8> {
        match self {
            Value::Byte(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64` for `float` and `double` values.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Char(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Byte(b) => serializer.serialize_u8(*b),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Float(f) => serializer.serialize_f32(*f),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Char(s) => serializer.serialize_str(s),
            Value::Array(array) => array.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", u8::from(*b)),
            Value::Byte(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Double(x) => write!(f, "{:?}", x),
            Value::Char(s) => write!(f, "\"{}\"", s),
            Value::Array(array) => write!(f, "array {} [{}]", array.element_type(), array.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Byte(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Char(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Char(value.to_string())
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<bool>> for Value {
    fn from(value: Vec<bool>) -> Self {
        Value::Array(Array::Bool(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Array(Array::Bytes(value))
    }
}

impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::Array(Array::Int(value))
    }
}

impl From<Vec<f32>> for Value {
    fn from(value: Vec<f32>) -> Self {
        Value::Array(Array::Float(value))
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Array(Array::Double(value))
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Array(Array::Char(value))
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::Array(Array::Char(
            value.into_iter().map(str::to_string).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(7u8), Value::Byte(7));
        assert_eq!(Value::from(42), Value::Int(42));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from(1.5), Value::Double(1.5));
        assert_eq!(Value::from("x"), Value::Char("x".to_string()));
    }

    #[test]
    fn test_from_collections() {
        assert_eq!(
            Value::from(vec![1u8, 2]),
            Value::Array(Array::Bytes(vec![1, 2]))
        );
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::Array(Array::Char(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_array_push_enforces_homogeneity() {
        let mut array = Array::empty(ElementType::Int);
        assert!(array.push(Value::Int(1)).is_ok());
        assert_eq!(array.push(Value::Double(1.0)), Err(Value::Double(1.0)));
        assert_eq!(array, Array::Int(vec![1]));
    }

    #[test]
    fn test_element_type_keywords() {
        for element in ElementType::ALL {
            assert_eq!(ElementType::from_keyword(element.keyword()), Some(element));
        }
        assert_eq!(ElementType::from_keyword("array"), None);
    }

    #[test]
    fn test_accessors() {
        let value = Value::Float(2.5);
        assert_eq!(value.as_f64(), Some(2.5));
        assert_eq!(value.as_i32(), None);
        assert!(!value.is_array());
        assert_eq!(Value::Byte(3).as_byte(), Some(3));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
    }
}
