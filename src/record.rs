use crate::{
    attr::{AttrType, Item},
    error::SerializationError,
};
use serde::Serialize;

/// A domain type stored as one item of a table keyed by a numeric
/// partition (hash) key and a string sort (range) key
pub trait Record: Sized {
    /// Name of the numeric hash key attribute
    const PARTITION_KEY: &'static str;
    /// Name of the string range key attribute
    const SORT_KEY: &'static str;

    fn partition_key(&self) -> i64;

    fn sort_key(&self) -> &str;

    /// Encodes every field, key attributes included
    fn to_item(&self) -> Result<Item, SerializationError>;

    fn from_item(item: Item) -> Result<Self, SerializationError>;

    /// The attribute type a stored field must have for [`Record::from_item`] to read it back,
    /// `None` for names that aren't fields of the record
    fn field_type(name: &str) -> Option<AttrType>;
}

/// The scalar types DynamoDB allows for key attributes
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    S,
    N,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub scalar_type: ScalarType,
}

impl KeyAttribute {
    pub fn new(
        name: impl AsRef<str>,
        scalar_type: ScalarType,
    ) -> Self {
        Self {
            name: name.as_ref().into(),
            scalar_type,
        }
    }
}

/// A two-attribute composite primary key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub hash: KeyAttribute,
    pub range: KeyAttribute,
}

impl KeySchema {
    pub fn new(
        hash: KeyAttribute,
        range: KeyAttribute,
    ) -> Self {
        Self { hash, range }
    }

    /// The key schema records of type `R` are stored under
    pub fn of<R: Record>() -> Self {
        Self {
            hash: KeyAttribute::new(R::PARTITION_KEY, ScalarType::N),
            range: KeyAttribute::new(R::SORT_KEY, ScalarType::S),
        }
    }
}

/// Capacity hint used when a table is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throughput {
    Provisioned { read: u64, write: u64 },
    /// Pay-per-request billing, no capacity units
    OnDemand,
}

impl Default for Throughput {
    fn default() -> Self {
        Throughput::Provisioned { read: 10, write: 10 }
    }
}
