// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// A variant-typed scalar carried by configuration properties and message attributes.
///
/// Deserialization is untagged so plain YAML/JSON scalars map onto the closest variant:
/// `true` becomes `Bool`, `-3` becomes `Int`, `3` becomes `UInt`, `1.5` becomes `Float`
/// and strings become `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variant {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Variant {
    /// Parse a console token into the narrowest matching variant.
    ///
    /// ```
    /// use the_tmtc_console::model::Variant;
    ///
    /// assert_eq!(Variant::parse("true"), Variant::Bool(true));
    /// assert_eq!(Variant::parse("42"), Variant::UInt(42));
    /// assert_eq!(Variant::parse("-7"), Variant::Int(-7));
    /// assert_eq!(Variant::parse("nominal"), Variant::Text("nominal".to_string()));
    /// ```
    pub fn parse(token: &str) -> Self {
        if let Ok(b) = token.parse::<bool>() {
            return Variant::Bool(b);
        }
        if let Ok(u) = token.parse::<u64>() {
            return Variant::UInt(u);
        }
        if let Ok(i) = token.parse::<i64>() {
            return Variant::Int(i);
        }
        if let Ok(f) = token.parse::<f64>() {
            return Variant::Float(f);
        }
        Variant::Text(token.to_string())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Variant::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Variant::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::UInt(u) => write!(f, "{}", u),
            Variant::Int(i) => write!(f, "{}", i),
            Variant::Float(x) => write!(f, "{}", x),
            Variant::Text(s) => write!(f, "{}", s),
            Variant::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Variant::UInt(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Text(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Text(value)
    }
}

/// A typed name/value pair. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    name: String,
    value: Variant,
}

impl AttributeRecord {
    pub fn new(name: impl Into<String>, value: impl Into<Variant>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Variant {
        &self.value
    }

    pub fn into_value(self) -> Variant {
        self.value
    }
}
