//! Serde front end of the writer.
//!
//! This module turns any `T: Serialize` into a [`Document`]: an ordered list of tags,
//! each an ordered list of `(key, value)` pairs whose [`Value`] already carries the
//! wire type it will be written with.
//!
//! ## Accepted shapes
//!
//! - The document is a map or struct of tag name to tag, or a sequence of
//!   `(name, tag)` pairs. The pair form allows repeated tag names.
//! - A tag is a map or struct of key name to value, or a sequence of `(name, value)`
//!   pairs.
//! - A value is a scalar or a flat, homogeneous sequence of scalars.
//!
//! ## Type inference
//!
//! | Rust type | ROFF type |
//! |---|---|
//! | `bool` | `bool` |
//! | `u8` | `byte` |
//! | `i32` | `int` |
//! | `f32` | `float` |
//! | `f64` | `double` |
//! | `&str`, `String`, `char`, unit enum variants | `char` |
//! | `i8`, `i16`, `u16` | `int`, with a [`Warning::Cast`]. `i8` keeps its sign instead of becoming `byte` |
//! | `u32`, `i64`, `u64`, `i128`, `u128` | `int` if the value fits, with a [`Warning::Cast`] |
//!
//! ```rust
//! use roffio::ser::Serializer;
//! use roffio::{Array, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Dimensions { nx: i32, ny: i32 }
//!
//! #[derive(Serialize)]
//! struct Grid { dimensions: Dimensions, zvalues: Vec<(String, Vec<f32>)> }
//!
//! let grid = Grid {
//!     dimensions: Dimensions { nx: 2, ny: 1 },
//!     zvalues: vec![("data".to_string(), vec![0.5, 1.5])],
//! };
//!
//! let mut serializer = Serializer::new();
//! let document = serializer.document(&grid).unwrap();
//! assert_eq!(document[0].1, vec![
//!     ("nx".to_string(), Value::Int(2)),
//!     ("ny".to_string(), Value::Int(1)),
//! ]);
//! assert_eq!(document[1].1[0].1, Value::Array(Array::Float(vec![0.5, 1.5])));
//! assert!(serializer.warnings().is_empty());
//! ```

use crate::error::{record_warning, Error, Result, Warning};
use crate::value::{Array, ElementType, Value, ARRAY_MARKER};
use serde::ser::{self, Impossible, Serialize};
use std::fmt::Display;

/// An ordered list of tags, each an ordered list of typed keys.
pub type Document = Vec<(String, Vec<(String, Value)>)>;

/// Infers ROFF documents and values from serde data.
///
/// Cast warnings raised by every call are collected on the serializer.
#[derive(Debug, Default)]
pub struct Serializer {
    warnings: Vec<Warning>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues collecting into warnings raised earlier.
    pub(crate) fn resume(warnings: Vec<Warning>) -> Self {
        Serializer { warnings }
    }

    /// Infers a whole document.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the data does not have the shape of a ROFF document or
    /// holds a value ROFF cannot represent.
    pub fn document<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Document> {
        let node = value.serialize(NodeSerializer {
            warnings: &mut self.warnings,
        })?;
        entries(node, "tag")?
            .into_iter()
            .map(|(name, tag)| Ok((name, tag_keys(tag)?)))
            .collect()
    }

    /// Infers a single value.
    ///
    /// # Errors
    ///
    /// [`Error::Write`] if the data is not a scalar or a flat homogeneous sequence.
    pub fn value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<Value> {
        let node = value.serialize(NodeSerializer {
            warnings: &mut self.warnings,
        })?;
        into_value(node)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// Infers the [`Value`] a piece of serde data would be written as.
///
/// # Examples
///
/// ```rust
/// use roffio::{to_value, Array, Value};
///
/// assert_eq!(to_value(&1.5f32).unwrap(), Value::Float(1.5));
/// assert_eq!(to_value(&vec!["a", "b"]).unwrap(), Value::Array(Array::Char(vec!["a".into(), "b".into()])));
/// assert!(to_value(&vec![vec![1]]).is_err());
/// ```
///
/// # Errors
///
/// [`Error::Write`] if ROFF cannot represent the data.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Serializer::new().value(value)
}

/// Serde data before it is given a place in the document.
enum Node {
    Scalar(Value),
    Seq(Vec<Node>),
    Map(Vec<(Node, Node)>),
    Typed(ElementType, Vec<Node>),
}

impl Node {
    fn describe(&self) -> &'static str {
        match self {
            Node::Scalar(Value::Array(_)) | Node::Typed(..) => "an array",
            Node::Scalar(_) => "a scalar",
            Node::Seq(_) => "a sequence",
            Node::Map(_) => "a map",
        }
    }
}

/// Splits a map, or a sequence of pairs, into named entries.
fn entries(node: Node, what: &str) -> Result<Vec<(String, Node)>> {
    match node {
        Node::Map(pairs) => pairs
            .into_iter()
            .map(|(key, value)| Ok((entry_name(key, what)?, value)))
            .collect(),
        Node::Seq(items) => items
            .into_iter()
            .map(|item| match item {
                Node::Seq(pair) if pair.len() == 2 => {
                    let mut pair = pair.into_iter();
                    match (pair.next(), pair.next()) {
                        (Some(key), Some(value)) => Ok((entry_name(key, what)?, value)),
                        _ => Err(Error::write(format!("Expected ({} name, value) pair", what))),
                    }
                }
                other => Err(Error::write(format!(
                    "Expected ({} name, value) pair, got {}",
                    what,
                    other.describe()
                ))),
            })
            .collect(),
        other => Err(Error::write(format!(
            "Expected a map of {} names, got {}",
            what,
            other.describe()
        ))),
    }
}

fn entry_name(key: Node, what: &str) -> Result<String> {
    match key {
        Node::Scalar(Value::Char(name)) => Ok(name),
        other => Err(Error::write(format!(
            "Roff {} names must be strings, got {}",
            what,
            other.describe()
        ))),
    }
}

fn tag_keys(tag: Node) -> Result<Vec<(String, Value)>> {
    entries(tag, "key")?
        .into_iter()
        .map(|(name, value)| Ok((name, into_value(value)?)))
        .collect()
}

fn into_value(node: Node) -> Result<Value> {
    match node {
        Node::Scalar(value) => Ok(value),
        Node::Seq(items) => into_array(None, items).map(Value::Array),
        Node::Typed(element, items) => into_array(Some(element), items).map(Value::Array),
        Node::Map(_) => Err(Error::write("Roff does not support maps as values")),
    }
}

/// The first element fixes the element type unless the array is typed already.
fn into_array(element: Option<ElementType>, items: Vec<Node>) -> Result<Array> {
    let mut array = element.map(Array::empty);
    for item in items {
        let value = match item {
            Node::Scalar(value) if !value.is_array() => value,
            _ => return Err(Error::write("Roff does not support nested arrays")),
        };
        let target = array.get_or_insert_with(|| Array::empty(value.element_type()));
        target
            .push(value)
            .map_err(|_| Error::write("Roff only allows homogenous arrays"))?;
    }
    Ok(array.unwrap_or(Array::Bytes(Vec::new())))
}

struct NodeSerializer<'w> {
    warnings: &'w mut Vec<Warning>,
}

impl NodeSerializer<'_> {
    /// Converts a native integer to `int`, recording the cast.
    fn cast<T>(self, from: &'static str, v: T) -> Result<Node>
    where
        T: Copy + Display,
        i32: TryFrom<T>,
    {
        let int = i32::try_from(v)
            .map_err(|_| Error::write(format!("{} value {} does not fit in a roff int", from, v)))?;
        record_warning(
            self.warnings,
            Warning::Cast {
                from,
                to: ElementType::Int,
            },
        );
        Ok(Node::Scalar(Value::Int(int)))
    }
}

fn scalar(value: impl Into<Value>) -> Result<Node> {
    Ok(Node::Scalar(value.into()))
}

impl<'w> ser::Serializer for NodeSerializer<'w> {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SeqBuilder<'w>;
    type SerializeTuple = SeqBuilder<'w>;
    type SerializeTupleStruct = SeqBuilder<'w>;
    type SerializeTupleVariant = Impossible<Node, Error>;
    type SerializeMap = MapBuilder<'w>;
    type SerializeStruct = MapBuilder<'w>;
    type SerializeStructVariant = Impossible<Node, Error>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.cast("i8", v)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.cast("i16", v)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        self.cast("i64", v)
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        self.cast("i128", v)
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.cast("u16", v)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.cast("u32", v)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        self.cast("u64", v)
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        self.cast("u128", v)
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        scalar(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        scalar(v)
    }

    /// A single byte is a scalar, anything else a byte array.
    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        match v {
            [byte] => scalar(*byte),
            _ => scalar(Array::Bytes(v.to_vec())),
        }
    }

    fn serialize_none(self) -> Result<Node> {
        Err(Error::write("Roff does not support None values"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Err(Error::write("Roff does not support unit values"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Node> {
        Err(Error::write(format!("Roff does not support unit struct {}", name)))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        scalar(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        let Some(keyword) = name.strip_prefix(ARRAY_MARKER) else {
            return value.serialize(self);
        };
        let element = ElementType::from_keyword(keyword)
            .ok_or_else(|| Error::write(format!("Unknown roff array type {}", keyword)))?;
        match value.serialize(self)? {
            Node::Seq(items) => Ok(Node::Typed(element, items)),
            other => Err(Error::write(format!(
                "Expected elements of {} array, got {}",
                keyword,
                other.describe()
            ))),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Node>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::write(format!(
            "Roff does not support enum variant {}::{} with data",
            name, variant
        )))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder<'w>> {
        Ok(SeqBuilder {
            warnings: self.warnings,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder<'w>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder<'w>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::write(format!(
            "Roff does not support enum variant {}::{} with data",
            name, variant
        )))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder<'w>> {
        Ok(MapBuilder {
            warnings: self.warnings,
            pairs: Vec::with_capacity(len.unwrap_or(0)),
            key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder<'w>> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::write(format!(
            "Roff does not support enum variant {}::{} with data",
            name, variant
        )))
    }
}

struct SeqBuilder<'w> {
    warnings: &'w mut Vec<Warning>,
    items: Vec<Node>,
}

impl SeqBuilder<'_> {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let node = value.serialize(NodeSerializer {
            warnings: &mut *self.warnings,
        })?;
        self.items.push(node);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqBuilder<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Seq(self.items))
    }
}

struct MapBuilder<'w> {
    warnings: &'w mut Vec<Warning>,
    pairs: Vec<(Node, Node)>,
    key: Option<Node>,
}

impl MapBuilder<'_> {
    fn node<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<Node> {
        value.serialize(NodeSerializer {
            warnings: &mut *self.warnings,
        })
    }
}

impl ser::SerializeMap for MapBuilder<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key = Some(self.node(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::write("serialize_value called before serialize_key"))?;
        let value = self.node(value)?;
        self.pairs.push((key, value));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.pairs))
    }
}

impl ser::SerializeStruct for MapBuilder<'_> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = self.node(value)?;
        self.pairs.push((Node::Scalar(Value::from(key)), value));
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.pairs))
    }
}
