//! MAML serialization.
//!
//! [`Serializer`] is a serde serializer that builds an
//! [`ast::Expression`](crate::ast::Expression) from any `T: Serialize`. The
//! formatter then renders the expression to text; the two stages are wired
//! together by the entry points in the crate root.
//!
//! Emission rules:
//!
//! - struct fields keep their declaration order; map entries are sorted by
//!   key so output is deterministic regardless of the map's iteration order
//! - object keys are emitted bare when they satisfy the identifier grammar
//!   (or the number grammar) and are not a keyword, and quoted otherwise
//! - floats use their shortest round-trip form with `.0` appended when
//!   needed so they re-lex as floats; non-finite floats are rejected
//! - unsigned integers above `i64::MAX` are rejected
//! - `None`, unit and unit structs become `null`
//! - enums use the conventional data-format shape: a unit variant is a
//!   string, every other variant is a single-pair object
//!
//! The serializer tracks nesting depth. Plain owned data is always finite,
//! so exhausting the budget means the value graph contains a reference
//! cycle (`Rc` loops and the like), which is reported as a cycle error
//! instead of overflowing the stack.

use serde::ser::{self, Serialize};

use crate::ast::{
    format_float, ArrayLiteral, BooleanLiteral, Expression, FloatLiteral, Identifier,
    IntegerLiteral, Key, KeyValue, NullLiteral, ObjectLiteral, StringLiteral,
};
use crate::error::{Error, Result};
use crate::options::DEFAULT_MAX_DEPTH;
use crate::token::{classify_number, is_identifier_char, lookup_ident, Kind, Token};

/// Serializes a value into a MAML expression tree.
pub(crate) fn to_expression<T>(value: &T) -> Result<Expression>
where
    T: ?Sized + Serialize,
{
    value.serialize(Serializer::new())
}

/// The MAML serializer. Produces an [`Expression`] rather than text; see the
/// crate-level functions for the text-producing entry points.
#[derive(Clone, Copy, Debug)]
pub struct Serializer {
    /// Remaining nesting budget.
    depth: usize,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer {
            depth: DEFAULT_MAX_DEPTH,
        }
    }

    fn nested(self) -> Result<Serializer> {
        if self.depth == 0 {
            return Err(Error::Cycle);
        }
        Ok(Serializer {
            depth: self.depth - 1,
        })
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn null_expression() -> Expression {
    Expression::Null(NullLiteral {
        token: Token::synthetic(Kind::Null, "null"),
    })
}

fn integer_expression(value: i64) -> Expression {
    Expression::Integer(IntegerLiteral {
        token: Token::synthetic(Kind::Int, value.to_string()),
        value,
    })
}

fn string_expression(value: &str) -> Expression {
    Expression::String(StringLiteral {
        token: Token::synthetic(Kind::String, value),
        value: value.to_string(),
    })
}

/// Reports whether `s` can be written as an unquoted object key. Bare keys
/// are identifiers or numbers, but not keywords.
pub(crate) fn is_bare_key(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }

    // Keywords must be quoted.
    if lookup_ident(s) != Kind::Ident {
        return false;
    }

    // Anything that parses as a number can be a bare key.
    if classify_number(s).is_some() {
        return true;
    }

    // Otherwise it must be a valid identifier, which cannot start with a
    // hyphen (a leading hyphen is only allowed on numbers, handled above).
    if s.starts_with('-') {
        return false;
    }

    s.chars().all(is_identifier_char)
}

fn key_node(key: &str) -> Key {
    if is_bare_key(key) {
        let kind = classify_number(key).unwrap_or(Kind::Ident);
        Key::Identifier(Identifier {
            token: Token::synthetic(kind, key),
            value: key.to_string(),
        })
    } else {
        Key::String(StringLiteral {
            token: Token::synthetic(Kind::String, key),
            value: key.to_string(),
        })
    }
}

impl ser::Serializer for Serializer {
    type Ok = Expression;
    type Error = Error;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Expression> {
        let kind = if v { Kind::True } else { Kind::False };
        Ok(Expression::Boolean(BooleanLiteral {
            token: Token::synthetic(kind, v.to_string()),
            value: v,
        }))
    }

    fn serialize_i8(self, v: i8) -> Result<Expression> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Expression> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Expression> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Expression> {
        Ok(integer_expression(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Expression> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Expression> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Expression> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Expression> {
        if v > i64::MAX as u64 {
            return Err(Error::UnsupportedType(format!(
                "unsigned integer {v} overflows i64"
            )));
        }
        Ok(integer_expression(v as i64))
    }

    fn serialize_f32(self, v: f32) -> Result<Expression> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Expression> {
        if !v.is_finite() {
            return Err(Error::UnsupportedType(format!(
                "non-finite float {v} has no MAML representation"
            )));
        }
        Ok(Expression::Float(FloatLiteral {
            token: Token::synthetic(Kind::Float, format_float(v)),
            value: v,
        }))
    }

    fn serialize_char(self, v: char) -> Result<Expression> {
        Ok(string_expression(&v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Expression> {
        Ok(string_expression(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Expression> {
        let elements = v.iter().map(|b| integer_expression(*b as i64)).collect();
        Ok(Expression::Array(ArrayLiteral {
            token: Token::synthetic(Kind::LBrack, "["),
            elements,
        }))
    }

    fn serialize_none(self) -> Result<Expression> {
        Ok(null_expression())
    }

    fn serialize_some<T>(self, value: &T) -> Result<Expression>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Expression> {
        Ok(null_expression())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Expression> {
        Ok(null_expression())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Expression> {
        Ok(string_expression(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Expression>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Expression>
    where
        T: ?Sized + Serialize,
    {
        let inner = value.serialize(self.nested()?)?;
        Ok(single_pair_object(variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(len.unwrap_or(0)),
            inner: self.nested()?,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeSeq> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            elements: Vec::with_capacity(len),
            inner: self.nested()?,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            pairs: Vec::with_capacity(len.unwrap_or(0)),
            next_key: None,
            inner: self.nested()?,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            pairs: Vec::with_capacity(len),
            inner: self.nested()?,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            pairs: Vec::with_capacity(len),
            inner: self.nested()?,
        })
    }
}

fn single_pair_object(key: &str, value: Expression) -> Expression {
    Expression::Object(ObjectLiteral {
        token: Token::synthetic(Kind::LBrace, "{"),
        pairs: vec![KeyValue::new(key_node(key), value)],
    })
}

fn object_from_pairs(pairs: Vec<(String, Expression)>) -> Expression {
    let pairs = pairs
        .into_iter()
        .map(|(key, value)| KeyValue::new(key_node(&key), value))
        .collect();
    Expression::Object(ObjectLiteral {
        token: Token::synthetic(Kind::LBrace, "{"),
        pairs,
    })
}

pub struct SerializeSeq {
    elements: Vec<Expression>,
    inner: Serializer,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Expression;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Expression> {
        Ok(Expression::Array(ArrayLiteral {
            token: Token::synthetic(Kind::LBrack, "["),
            elements: self.elements,
        }))
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Expression;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Expression> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Expression;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Expression> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    elements: Vec<Expression>,
    inner: Serializer,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Expression;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.elements.push(value.serialize(self.inner)?);
        Ok(())
    }

    fn end(self) -> Result<Expression> {
        let array = Expression::Array(ArrayLiteral {
            token: Token::synthetic(Kind::LBrack, "["),
            elements: self.elements,
        });
        Ok(single_pair_object(self.variant, array))
    }
}

pub struct SerializeMap {
    pairs: Vec<(String, Expression)>,
    next_key: Option<String>,
    inner: Serializer,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Expression;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        self.pairs.push((key, value.serialize(self.inner)?));
        Ok(())
    }

    fn end(mut self) -> Result<Expression> {
        // Maps sort by key for deterministic output.
        self.pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(object_from_pairs(self.pairs))
    }
}

pub struct SerializeStruct {
    pairs: Vec<(String, Expression)>,
    inner: Serializer,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Expression;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pairs.push((key.to_string(), value.serialize(self.inner)?));
        Ok(())
    }

    fn end(self) -> Result<Expression> {
        // Struct fields keep declaration order.
        Ok(object_from_pairs(self.pairs))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    pairs: Vec<(String, Expression)>,
    inner: Serializer,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Expression;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.pairs.push((key.to_string(), value.serialize(self.inner)?));
        Ok(())
    }

    fn end(self) -> Result<Expression> {
        let object = object_from_pairs(self.pairs);
        Ok(single_pair_object(self.variant, object))
    }
}

/// Serializes map keys, which must be strings (or string-like scalars have
/// no sensible MAML spelling and are rejected).
struct MapKeySerializer;

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i8(self, _v: i8) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i16(self, _v: i16) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i32(self, _v: i32) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_i64(self, _v: i64) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u8(self, _v: u8) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u16(self, _v: u16) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u32(self, _v: u32) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_u64(self, _v: u64) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_none(self) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::KeyMustBeString)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::KeyMustBeString)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::KeyMustBeString)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::KeyMustBeString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EncodeOptions;

    fn compact<T: Serialize>(value: &T) -> String {
        let expr = to_expression(value).unwrap();
        crate::format::expression_to_string(&expr, &EncodeOptions::compact()).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(compact(&true), "true");
        assert_eq!(compact(&-5i32), "-5");
        assert_eq!(compact(&1.0f64), "1.0");
        assert_eq!(compact(&3.14f64), "3.14");
        assert_eq!(compact(&"hi"), "\"hi\"");
        assert_eq!(compact(&'x'), "\"x\"");
        assert_eq!(compact(&()), "null");
        assert_eq!(compact(&None::<i32>), "null");
        assert_eq!(compact(&Some(7)), "7");
    }

    #[test]
    fn uint_overflow() {
        assert_eq!(compact(&u64::from(u32::MAX)), "4294967295");
        let err = to_expression(&u64::MAX).unwrap_err();
        assert!(err.to_string().contains("overflows i64"));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(to_expression(&f64::NAN).is_err());
        assert!(to_expression(&f64::INFINITY).is_err());
    }

    #[test]
    fn map_keys_are_sorted() {
        let mut map = std::collections::HashMap::new();
        map.insert("zebra".to_string(), 1);
        map.insert("apple".to_string(), 2);
        map.insert("mango".to_string(), 3);
        assert_eq!(compact(&map), "{apple:2,mango:3,zebra:1}");
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        let mut map = std::collections::HashMap::new();
        map.insert(1, "one");
        let err = to_expression(&map).unwrap_err();
        assert!(err.to_string().contains("map key must be a string"));
    }

    #[test]
    fn bare_key_rules() {
        assert!(is_bare_key("simple"));
        assert!(is_bare_key("with-dash"));
        assert!(is_bare_key("with_underscore"));
        assert!(is_bare_key("123"));
        assert!(is_bare_key("-5"));
        assert!(is_bare_key("1.5"));
        assert!(!is_bare_key(""));
        assert!(!is_bare_key("true"));
        assert!(!is_bare_key("null"));
        assert!(!is_bare_key("has space"));
        assert!(!is_bare_key("-dash-start"));
        assert!(!is_bare_key("dot.ted"));
    }

    #[test]
    fn keys_needing_quotes_are_quoted() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("true".to_string(), 1);
        map.insert("has space".to_string(), 2);
        map.insert("ok".to_string(), 3);
        assert_eq!(compact(&map), r#"{"has space":2,ok:3,"true":1}"#);
    }

    #[test]
    fn exhausted_nesting_budget_reports_a_cycle() {
        use crate::{MamlMap, Value};

        let mut value = Value::Null;
        for _ in 0..16 {
            let mut map = MamlMap::new();
            map.insert("next".to_string(), value);
            value = Value::Object(map);
        }
        let err = value.serialize(Serializer { depth: 8 }).unwrap_err();
        assert!(matches!(err, Error::Cycle));

        assert!(value.serialize(Serializer::new()).is_ok());
    }
}
