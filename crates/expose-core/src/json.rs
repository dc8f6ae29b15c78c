//! JSON codec for variants
//!
//! Maps become objects in insertion order, arrays become arrays, scalars
//! are written natively and references are written as their current value.
//! On parse, integer literals in `i64::MIN..=u64::MAX` become `Int64`
//! (`UInt64` above `i64::MAX`) and every other number becomes `Double`.
//! Integer variants compare by value across both tags, so
//! `parse(to_json(v)) == v` for trees built from integers of either sign,
//! finite doubles, strings, booleans and nulls.
//!
//! Non-finite doubles have no JSON form and are written as `null`.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::variant::{Variant, VariantArray, VariantMap};

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    /// No extraneous whitespace
    #[default]
    Compact,
    /// One member per line, nested levels indented
    Beautified,
}

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Output layout
    pub mode: JsonMode,
    /// Spaces per nesting level in beautified output
    pub indent: usize,
}

impl JsonOptions {
    /// Compact output
    pub fn compact() -> Self {
        Self {
            mode: JsonMode::Compact,
            ..Self::default()
        }
    }

    /// Beautified output with the default indent
    pub fn beautified() -> Self {
        Self {
            mode: JsonMode::Beautified,
            ..Self::default()
        }
    }

    /// Set the indent width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            mode: JsonMode::Compact,
            indent: 4,
        }
    }
}

/// Serialize a variant
pub fn to_json(value: &Variant, mode: JsonMode) -> String {
    let options = JsonOptions {
        mode,
        ..JsonOptions::default()
    };
    to_json_with(value, &options)
}

/// Serialize a variant with explicit options
pub fn to_json_with(value: &Variant, options: &JsonOptions) -> String {
    let result = match options.mode {
        JsonMode::Compact => serde_json::to_vec(value),
        JsonMode::Beautified => {
            let indent = " ".repeat(options.indent);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), formatter);
            value.serialize(&mut serializer).map(|()| serializer.into_inner())
        }
    };
    match result {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            log::warn!("failed to serialize variant: {}", e);
            String::new()
        }
    }
}

/// Parse JSON text into a variant
pub fn parse(text: &str) -> Result<Variant, ParseError> {
    serde_json::from_str::<Variant>(text).map_err(|e| {
        let error = ParseError::from(e);
        log::debug!("{}", error);
        error
    })
}

impl Variant {
    /// Serialize as JSON
    pub fn to_json(&self, mode: JsonMode) -> String {
        to_json(self, mode)
    }

    /// Parse JSON text
    pub fn from_json(text: &str) -> Result<Variant, ParseError> {
        parse(text)
    }
}

// ============================================================================
// serde
// ============================================================================

impl Serialize for Variant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Variant::Null => serializer.serialize_unit(),
            Variant::Bool(v) => serializer.serialize_bool(*v),
            Variant::Int64(v) => serializer.serialize_i64(*v),
            Variant::UInt64(v) => serializer.serialize_u64(*v),
            Variant::Double(v) if v.is_finite() => serializer.serialize_f64(*v),
            Variant::Double(_) => serializer.serialize_unit(),
            Variant::String(v) => serializer.serialize_str(v),
            Variant::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Variant::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Variant::Reference(link) => link.get().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D>(deserializer: D) -> Result<Variant, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(VariantVisitor)
    }
}

struct VariantVisitor;

impl<'de> Visitor<'de> for VariantVisitor {
    type Value = Variant;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Variant, E> {
        Ok(Variant::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Variant, D::Error>
    where
        D: Deserializer<'de>,
    {
        Variant::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Variant, E> {
        Ok(Variant::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Variant, E> {
        Ok(Variant::Int64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Variant, E> {
        Ok(match i64::try_from(v) {
            Ok(signed) => Variant::Int64(signed),
            Err(_) => Variant::UInt64(v),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Variant, E> {
        Ok(Variant::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Variant, E> {
        Ok(Variant::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Variant, E> {
        Ok(Variant::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Variant, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = VariantArray::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Variant>()? {
            items.push(item);
        }
        Ok(Variant::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Variant, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = VariantMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Variant>()? {
            entries.insert(key, value);
        }
        Ok(Variant::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Variant {
        let mut root = Variant::map();
        let map = root.as_map_mut();
        map.insert("name".to_string(), Variant::from("box"));
        map.insert("size".to_string(), vec![Variant::from(2), Variant::from(3)].into());
        map.insert("ratio".to_string(), Variant::from(0.5));
        map.insert("empty".to_string(), Variant::Null);
        root
    }

    #[test]
    fn test_compact_layout() {
        assert_eq!(
            to_json(&sample(), JsonMode::Compact),
            r#"{"name":"box","size":[2,3],"ratio":0.5,"empty":null}"#
        );
    }

    #[test]
    fn test_beautified_layout() {
        let text = to_json_with(&sample(), &JsonOptions::beautified().with_indent(2));
        let expected = "{\n  \"name\": \"box\",\n  \"size\": [\n    2,\n    3\n  ],\n  \"ratio\": 0.5,\n  \"empty\": null\n}";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_parse_round_trip() {
        let v = sample();
        assert_eq!(parse(&to_json(&v, JsonMode::Beautified)).unwrap(), v);
        assert_eq!(Variant::from_json(&v.to_json(JsonMode::Compact)).unwrap(), v);
    }

    #[test]
    fn test_number_policy() {
        assert_eq!(parse("-12").unwrap(), Variant::Int64(-12));
        assert_eq!(parse("12").unwrap(), Variant::Int64(12));
        assert_eq!(parse("18446744073709551615").unwrap(), Variant::UInt64(u64::MAX));
        assert_eq!(parse("1.0").unwrap(), Variant::Double(1.0));
        assert_eq!(parse("1e3").unwrap(), Variant::Double(1000.0));
        assert!(parse("99999999999999999999").unwrap().is_number());
    }

    #[test]
    fn test_unsigned_values_round_trip() {
        let mut v = Variant::map();
        v.as_map_mut().insert("small".to_string(), Variant::from(640u32));
        v.as_map_mut().insert("large".to_string(), Variant::from(u64::MAX));
        let parsed = parse(&to_json(&v, JsonMode::Compact)).unwrap();
        assert_eq!(parsed.get("small"), Some(&Variant::Int64(640)));
        assert_eq!(parsed, v);
    }

    #[test]
    fn test_doubles_keep_their_tag() {
        let v: Variant = vec![Variant::from(1.0), Variant::from(-0.25)].into();
        assert_eq!(parse(&to_json(&v, JsonMode::Compact)).unwrap(), v);
    }

    #[test]
    fn test_non_finite_written_as_null() {
        assert_eq!(to_json(&Variant::from(f64::NAN), JsonMode::Compact), "null");
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse("{\n  \"a\": [1, 2,\n}").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.column > 0);
        assert!(parse("").is_err());
    }

    #[test]
    fn test_options_from_config() {
        let options: JsonOptions = serde_json::from_str(r#"{"mode": "beautified"}"#).unwrap();
        assert_eq!(options, JsonOptions::beautified());
        assert_eq!(options.indent, 4);
    }
}
