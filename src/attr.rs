//! DynamoDB's tagged attribute value representation

use crate::error::SerializationError;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};

/// A single item, keyed by attribute name
pub type Item = HashMap<String, Attr>;

/// An attribute value as it appears on the wire, e.g. `{"S":"Hello"}` or `{"N":"3.5"}`
///
/// Numbers travel as strings to preserve the precision DynamoDB stores them with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Attr {
    S(String),
    N(String),
    B(#[serde(with = "b64")] Vec<u8>),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(HashMap<String, Attr>),
    L(Vec<Attr>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(#[serde(with = "b64_set")] Vec<Vec<u8>>),
}

/// The type tag of an [`Attr`], without its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    S,
    N,
    B,
    Bool,
    Null,
    M,
    L,
    SS,
    NS,
    BS,
}

impl AttrType {
    /// The tag as it appears on the wire
    pub fn tag(self) -> &'static str {
        match self {
            AttrType::S => "S",
            AttrType::N => "N",
            AttrType::B => "B",
            AttrType::Bool => "BOOL",
            AttrType::Null => "NULL",
            AttrType::M => "M",
            AttrType::L => "L",
            AttrType::SS => "SS",
            AttrType::NS => "NS",
            AttrType::BS => "BS",
        }
    }
}

// DynamoDB numbers range over 1E-130 to 9.9999999999999999999999999999999999999E+125,
// positive or negative, plus zero. Every f64 below 1E+126 is within that bound.
const MIN_MAGNITUDE: f64 = 1e-130;
const MAX_MAGNITUDE_EXCLUSIVE: f64 = 1e126;

fn check_number(
    name: &str,
    value: f64,
) -> Result<(), SerializationError> {
    if !value.is_finite() {
        return Err(SerializationError::NonFiniteNumber(name.to_owned()));
    }
    let magnitude = value.abs();
    if value != 0.0 && !(MIN_MAGNITUDE..MAX_MAGNITUDE_EXCLUSIVE).contains(&magnitude) {
        return Err(SerializationError::OutOfRange(name.to_owned()));
    }
    Ok(())
}

impl Attr {
    /// Encodes a float as a number attribute, rejecting values DynamoDB can't store:
    /// NaN, infinities and magnitudes outside its number range
    pub fn number(
        name: &str,
        value: f64,
    ) -> Result<Self, SerializationError> {
        check_number(name, value)?;
        Ok(Attr::N(value.to_string()))
    }

    pub fn attr_type(&self) -> AttrType {
        match self {
            Attr::S(_) => AttrType::S,
            Attr::N(_) => AttrType::N,
            Attr::B(_) => AttrType::B,
            Attr::Bool(_) => AttrType::Bool,
            Attr::Null(_) => AttrType::Null,
            Attr::M(_) => AttrType::M,
            Attr::L(_) => AttrType::L,
            Attr::SS(_) => AttrType::SS,
            Attr::NS(_) => AttrType::NS,
            Attr::BS(_) => AttrType::BS,
        }
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::S(value)
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::S(value.to_owned())
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Attr::N(value.to_string())
    }
}

impl From<f64> for Attr {
    /// Values DynamoDB can't store are rejected when the attribute is sent,
    /// see [`ItemStore::update_field`](crate::ItemStore::update_field)
    fn from(value: f64) -> Self {
        Attr::N(value.to_string())
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Attr::Bool(value)
    }
}

impl From<Vec<u8>> for Attr {
    fn from(value: Vec<u8>) -> Self {
        Attr::B(value)
    }
}

/// Checks that `attr` has the `expected` type and, for numbers, holds something
/// DynamoDB will accept
pub(crate) fn validate(
    name: &str,
    attr: &Attr,
    expected: AttrType,
) -> Result<(), SerializationError> {
    if attr.attr_type() != expected {
        return Err(unexpected(name, expected.tag()));
    }
    match attr {
        Attr::N(n) => match n.parse::<f64>() {
            Ok(value) => check_number(name, value),
            Err(_) => Err(SerializationError::InvalidNumber {
                name: name.to_owned(),
                value: n.clone(),
            }),
        },
        _ => Ok(()),
    }
}

fn take(
    item: &mut Item,
    name: &str,
) -> Result<Attr, SerializationError> {
    item.remove(name)
        .ok_or_else(|| SerializationError::MissingAttribute(name.to_owned()))
}

fn unexpected(
    name: &str,
    expected: &'static str,
) -> SerializationError {
    SerializationError::UnexpectedType {
        name: name.to_owned(),
        expected,
    }
}

/// Removes a string attribute from an item
pub fn take_string(
    item: &mut Item,
    name: &str,
) -> Result<String, SerializationError> {
    match take(item, name)? {
        Attr::S(value) => Ok(value),
        _ => Err(unexpected(name, "S")),
    }
}

/// Removes a number attribute from an item, parsing it as `T`
pub fn take_number<T: FromStr>(
    item: &mut Item,
    name: &str,
) -> Result<T, SerializationError> {
    match take(item, name)? {
        Attr::N(value) => value
            .parse()
            .map_err(|_| SerializationError::InvalidNumber {
                name: name.to_owned(),
                value,
            }),
        _ => Err(unexpected(name, "N")),
    }
}

/// Removes a binary attribute from an item
pub fn take_binary(
    item: &mut Item,
    name: &str,
) -> Result<Vec<u8>, SerializationError> {
    match take(item, name)? {
        Attr::B(value) => Ok(value),
        _ => Err(unexpected(name, "B")),
    }
}

mod b64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

mod b64_set {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        set: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(set.iter().map(|bytes| STANDARD.encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .into_iter()
            .map(|encoded| STANDARD.decode(encoded).map_err(D::Error::custom))
            .collect()
    }
}
