//! MAML deserialization.
//!
//! [`Deserializer`] walks a parsed [`Expression`] tree and drives a serde
//! visitor over it. Dispatch is strict about kinds: an integer node binds to
//! integer targets (with a width check), a float node to float targets, and
//! string and identifier nodes both bind to string targets, since bare words
//! in value position arrive as identifiers.
//!
//! `null` binds to `Option` targets as `None`, to sequences and maps as
//! their empty value, and to scalar targets as that scalar's zero value.
//!
//! Record binding resolves each document key against the target's field
//! list: an exact match first, then a case-insensitive fallback. Keys that
//! match no field pass through unchanged unless strict mode
//! ([`DecodeOptions::deny_unknown_fields`]) is enabled. This resolution
//! runs when serde hands the record to `deserialize_struct` — which it does
//! for every plain derived struct.
//!
//! Embedded records use `#[serde(flatten)]`. A struct containing a
//! flattened member is driven through `deserialize_map` instead, and the
//! leftover keys are matched by serde's own flatten machinery, which is
//! exact (plus `#[serde(alias)]`). Outer fields still shadow flattened ones
//! because named fields are consumed before the remainder is buffered, but
//! the case-insensitive fallback does not apply on that path by itself.
//! Implementing the embedded type's `Deserialize` with [`embedded`] routes
//! its keys back through this module's resolver and restores it.
//!
//! Every recursive step spends one unit of the depth budget so adversarial
//! nesting fails with a recursion error instead of exhausting the stack.

use std::fmt;

use serde::de::{self, IntoDeserializer};

use crate::ast::{Document, Expression, KeyValue, NullLiteral};
use crate::error::{Error, Result};
use crate::map::MamlMap;
use crate::options::DecodeOptions;
use crate::token::{Kind, Token};
use crate::value::Value;

/// Binds a parsed document to a `T`.
///
/// The document root decodes as `null` when the document is empty.
pub(crate) fn deserialize_document<T>(doc: &Document, opts: &DecodeOptions) -> Result<T>
where
    T: de::DeserializeOwned,
{
    if opts.max_depth == 0 {
        return Err(Error::InvalidOptions(
            "max depth must be a positive integer".to_string(),
        ));
    }
    let null_root = Expression::Null(NullLiteral {
        token: Token::synthetic(Kind::Null, "null"),
    });
    let root = doc.root().unwrap_or(&null_root);
    T::deserialize(Deserializer::new(root, opts))
}

/// Binds a single expression to a `T` under the given options.
pub(crate) fn deserialize_expression<T>(expr: &Expression, opts: &DecodeOptions) -> Result<T>
where
    T: de::DeserializeOwned,
{
    if opts.max_depth == 0 {
        return Err(Error::InvalidOptions(
            "max depth must be a positive integer".to_string(),
        ));
    }
    T::deserialize(Deserializer::new(expr, opts))
}

/// Rebinds an embedded record through the MAML field resolver.
///
/// serde's `#[serde(flatten)]` machinery matches the embedded record's
/// field names exactly, so a flattened `Address { City }` would not see a
/// document key written as `city`. Implementing the embedded type's
/// `Deserialize` with this function collects the flattened remainder and
/// binds it through [`Deserializer`] again, giving embedded fields the same
/// exact-then-case-insensitive key resolution as top-level records.
///
/// The rebinding uses default [`DecodeOptions`]; strict mode does not reach
/// through a flatten boundary.
///
/// ```rust
/// use serde::{Deserialize, Deserializer};
///
/// #[derive(Debug, PartialEq)]
/// struct Address {
///     city: String,
/// }
///
/// impl<'de> Deserialize<'de> for Address {
///     fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
///         #[derive(Deserialize, Default)]
///         #[serde(default)]
///         struct Def {
///             #[serde(rename = "City")]
///             city: String,
///         }
///         let def: Def = serde_maml::de::embedded(deserializer)?;
///         Ok(Address { city: def.city })
///     }
/// }
///
/// #[derive(Deserialize)]
/// struct Contact {
///     #[serde(rename = "Name")]
///     name: String,
///     #[serde(flatten)]
///     address: Address,
/// }
///
/// let contact: Contact =
///     serde_maml::from_str("{ Name: \"Jane\", city: \"London\" }").unwrap();
/// assert_eq!(contact.address.city, "London");
/// ```
pub fn embedded<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: de::Deserializer<'de>,
    T: de::DeserializeOwned,
{
    struct ObjectVisitor;

    impl<'de> de::Visitor<'de> for ObjectVisitor {
        type Value = MamlMap;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an embedded object")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<MamlMap, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            let mut map = MamlMap::new();
            while let Some((key, value)) = access.next_entry::<String, Value>()? {
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    // deserialize_map rather than deserialize_any: the flatten buffer only
    // supports map-shaped requests.
    let map = deserializer.deserialize_map(ObjectVisitor)?;
    crate::from_value(Value::Object(map)).map_err(de::Error::custom)
}

/// The MAML deserializer: a serde `Deserializer` over one expression node.
#[derive(Clone, Copy)]
pub struct Deserializer<'a> {
    expr: &'a Expression,
    /// Remaining recursion budget.
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer over a parsed expression.
    pub fn new(expr: &'a Expression, opts: &'a DecodeOptions) -> Self {
        Deserializer {
            expr,
            depth: opts.max_depth.saturating_sub(1),
            opts,
        }
    }

    fn check_depth(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::RecursionLimit);
        }
        Ok(())
    }

    fn mismatch(&self, target: impl Into<String>) -> Error {
        let token = self.expr.token();
        Error::TypeMismatch {
            found: self.expr.kind_name(),
            target: target.into(),
            line: token.line,
            column: token.column,
        }
    }

    fn integer_value(&self, target: &'static str, min: i64, max: i64) -> Result<Option<i64>> {
        match self.expr {
            Expression::Integer(node) => {
                if node.value < min || node.value > max {
                    let token = self.expr.token();
                    return Err(Error::IntegerOverflow {
                        value: node.value,
                        target,
                        line: token.line,
                        column: token.column,
                    });
                }
                Ok(Some(node.value))
            }
            // null binds to a scalar target as its zero value.
            Expression::Null(_) => Ok(None),
            _ => Err(self.mismatch(target)),
        }
    }

    fn float_value(&self, target: &'static str, max_abs: f64) -> Result<f64> {
        match self.expr {
            Expression::Float(node) => {
                if node.value.is_finite() && node.value.abs() > max_abs {
                    let token = self.expr.token();
                    return Err(Error::FloatOverflow {
                        value: node.value,
                        target,
                        line: token.line,
                        column: token.column,
                    });
                }
                Ok(node.value)
            }
            Expression::Null(_) => Ok(0.0),
            _ => Err(self.mismatch(target)),
        }
    }

    fn string_value(&self) -> Result<&'a str> {
        match self.expr {
            Expression::String(node) => Ok(&node.value),
            Expression::Identifier(node) => Ok(&node.value),
            Expression::Null(_) => Ok(""),
            _ => Err(self.mismatch("string")),
        }
    }
}

macro_rules! deserialize_signed {
    ($method:ident, $visit:ident, $ty:ty, $name:literal) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.check_depth()?;
            let value = self
                .integer_value($name, <$ty>::MIN as i64, <$ty>::MAX as i64)?
                .unwrap_or(0);
            visitor.$visit(value as $ty)
        }
    };
}

macro_rules! deserialize_unsigned {
    ($method:ident, $visit:ident, $ty:ty, $name:literal) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.check_depth()?;
            let max = if (<$ty>::MAX as u64) > (i64::MAX as u64) {
                i64::MAX
            } else {
                <$ty>::MAX as i64
            };
            let value = self.integer_value($name, 0, max)?.unwrap_or(0);
            visitor.$visit(value as $ty)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Null(_) => visitor.visit_unit(),
            Expression::Boolean(node) => visitor.visit_bool(node.value),
            Expression::Integer(node) => visitor.visit_i64(node.value),
            Expression::Float(node) => visitor.visit_f64(node.value),
            Expression::String(node) => visitor.visit_str(&node.value),
            Expression::Identifier(node) => visitor.visit_str(&node.value),
            Expression::Array(node) => visitor.visit_seq(SeqAccess {
                iter: node.elements.iter(),
                depth: self.depth - 1,
                opts: self.opts,
            }),
            Expression::Object(node) => visitor.visit_map(MapAccess {
                iter: node.pairs.iter(),
                value: None,
                depth: self.depth - 1,
                opts: self.opts,
            }),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Boolean(node) => visitor.visit_bool(node.value),
            Expression::Null(_) => visitor.visit_bool(false),
            _ => Err(self.mismatch("bool")),
        }
    }

    deserialize_signed!(deserialize_i8, visit_i8, i8, "i8");
    deserialize_signed!(deserialize_i16, visit_i16, i16, "i16");
    deserialize_signed!(deserialize_i32, visit_i32, i32, "i32");
    deserialize_signed!(deserialize_i64, visit_i64, i64, "i64");

    deserialize_unsigned!(deserialize_u8, visit_u8, u8, "u8");
    deserialize_unsigned!(deserialize_u16, visit_u16, u16, "u16");
    deserialize_unsigned!(deserialize_u32, visit_u32, u32, "u32");
    deserialize_unsigned!(deserialize_u64, visit_u64, u64, "u64");

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        let value = self.float_value("f32", f32::MAX as f64)?;
        visitor.visit_f32(value as f32)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        let value = self.float_value("f64", f64::MAX)?;
        visitor.visit_f64(value)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        let s = self.string_value()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(self.mismatch("char")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        visitor.visit_str(self.string_value()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Null(_) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Null(_) => visitor.visit_unit(),
            _ => Err(self.mismatch("unit")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Array(node) => visitor.visit_seq(SeqAccess {
                iter: node.elements.iter(),
                depth: self.depth - 1,
                opts: self.opts,
            }),
            // null binds to a sequence target as an empty sequence.
            Expression::Null(_) => {
                const EMPTY: &[Expression] = &[];
                visitor.visit_seq(SeqAccess {
                    iter: EMPTY.iter(),
                    depth: self.depth - 1,
                    opts: self.opts,
                })
            }
            _ => Err(self.mismatch("sequence")),
        }
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Array(node) => {
                if node.elements.len() != len {
                    let token = self.expr.token();
                    return Err(Error::ArrayLength {
                        expected: len,
                        found: node.elements.len(),
                        line: token.line,
                        column: token.column,
                    });
                }
                visitor.visit_seq(SeqAccess {
                    iter: node.elements.iter(),
                    depth: self.depth - 1,
                    opts: self.opts,
                })
            }
            _ => Err(self.mismatch("sequence")),
        }
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Object(node) => visitor.visit_map(MapAccess {
                iter: node.pairs.iter(),
                value: None,
                depth: self.depth - 1,
                opts: self.opts,
            }),
            // null binds to a map target as an empty map.
            Expression::Null(_) => {
                const EMPTY: &[KeyValue] = &[];
                visitor.visit_map(MapAccess {
                    iter: EMPTY.iter(),
                    value: None,
                    depth: self.depth - 1,
                    opts: self.opts,
                })
            }
            _ => Err(self.mismatch("map")),
        }
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::Object(node) => visitor.visit_map(StructAccess {
                pairs: node.pairs.iter(),
                value: None,
                fields,
                struct_name: name,
                depth: self.depth - 1,
                opts: self.opts,
            }),
            _ => Err(self.mismatch(format!("struct {name}"))),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.check_depth()?;
        match self.expr {
            Expression::String(node) => visitor.visit_enum(node.value.as_str().into_deserializer()),
            Expression::Identifier(node) => {
                visitor.visit_enum(node.value.as_str().into_deserializer())
            }
            Expression::Object(node) => {
                if node.pairs.len() != 1 {
                    return Err(self.mismatch("enum variant"));
                }
                let pair = &node.pairs[0];
                visitor.visit_enum(EnumAccess {
                    variant: pair.key.text(),
                    value: &pair.value,
                    depth: self.depth - 1,
                    opts: self.opts,
                })
            }
            _ => Err(self.mismatch("enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }
}

/// Resolves a document key against a record's field list: exact match
/// first, then a case-insensitive fallback.
fn resolve_field(fields: &'static [&'static str], key: &str) -> Option<&'static str> {
    if let Some(field) = fields.iter().find(|f| **f == key) {
        return Some(field);
    }
    let lowered = key.to_lowercase();
    fields
        .iter()
        .find(|f| f.to_lowercase() == lowered)
        .copied()
}

struct SeqAccess<'a> {
    iter: std::slice::Iter<'a, Expression>,
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'de, 'a> de::SeqAccess<'de> for SeqAccess<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(expr) => seed
                .deserialize(Deserializer {
                    expr,
                    depth: self.depth,
                    opts: self.opts,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapAccess<'a> {
    iter: std::slice::Iter<'a, KeyValue>,
    value: Option<&'a Expression>,
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'de, 'a> de::MapAccess<'de> for MapAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(pair) => {
                self.value = Some(&pair.value);
                seed.deserialize(pair.key.text().into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(expr) => seed.deserialize(Deserializer {
                expr,
                depth: self.depth,
                opts: self.opts,
            }),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Map access for record targets: resolves keys against the field list and
/// enforces strict mode.
struct StructAccess<'a> {
    pairs: std::slice::Iter<'a, KeyValue>,
    value: Option<&'a Expression>,
    fields: &'static [&'static str],
    struct_name: &'static str,
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'de, 'a> de::MapAccess<'de> for StructAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let Some(pair) = self.pairs.next() else {
            return Ok(None);
        };
        let key = pair.key.text();
        self.value = Some(&pair.value);
        match resolve_field(self.fields, key) {
            Some(field) => seed.deserialize(field.into_deserializer()).map(Some),
            None if self.opts.deny_unknown_fields => Err(Error::UnknownField {
                field: key.to_string(),
                target: self.struct_name.to_string(),
            }),
            // Unresolved keys pass through unchanged; the visitor ignores
            // them (or honors its own aliases).
            None => seed.deserialize(key.into_deserializer()).map(Some),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(expr) => seed.deserialize(Deserializer {
                expr,
                depth: self.depth,
                opts: self.opts,
            }),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

struct EnumAccess<'a> {
    variant: &'a str,
    value: &'a Expression,
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'de, 'a> de::EnumAccess<'de> for EnumAccess<'a> {
    type Error = Error;
    type Variant = VariantAccess<'a>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(de::value::StrDeserializer::<Error>::new(self.variant))?;
        Ok((
            variant,
            VariantAccess {
                value: self.value,
                depth: self.depth,
                opts: self.opts,
            },
        ))
    }
}

struct VariantAccess<'a> {
    value: &'a Expression,
    depth: usize,
    opts: &'a DecodeOptions,
}

impl<'a> VariantAccess<'a> {
    fn deserializer(&self) -> Deserializer<'a> {
        Deserializer {
            expr: self.value,
            depth: self.depth,
            opts: self.opts,
        }
    }
}

impl<'de, 'a> de::VariantAccess<'de> for VariantAccess<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Expression::Null(_) => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self.deserializer())
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.deserializer(), len, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.deserializer(), visitor)
    }
}
