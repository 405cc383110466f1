//! <h1 align="center">
//!   dynamo items
//! </h1>
//!
//! <p align="center">
//!    A small, typed, blocking item store for AWS DynamoDB tables with composite keys
//! </p>
//!
//! ### Install
//!
//! ```toml
//! [dependencies]
//! dynamo-items = { version = "0.1", features = ["reqwest"] }
//! ```
//!
//! ### What is this?
//!
//! DynamoDB tables are commonly keyed by a pair: a partition (hash) key and a sort (range) key.
//! This crate wraps the handful of calls needed to keep one kind of record in such a table,
//! `ensure_table`, `put`, `get`, `update_field` and `delete`, behind a typed interface so
//! callers never touch DynamoDB's attribute value wire format.
//!
//! Each operation is a single, blocking round trip. There are no retries, no batching and no
//! background work. Every failure comes back to the caller as a [`StoreError`].
//!
//! ### Usage
//!
//! ```rust ,no_run
//! use dynamo_items::{Const, Connection, Credentials, ItemStore, KeySchema, Movie, Throughput};
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let store = ItemStore::new(Connection::new(
//!         Credentials::new("access-key-id", "secret-access-key"),
//!         "us-east-1".parse()?,
//!         Some("http://localhost:8000".to_string()),
//!         Const(200, "{}".into()),
//!     ));
//!
//!     store.ensure_table("Movies", &KeySchema::of::<Movie>(), Throughput::default())?;
//!     store.put("Movies", &Movie::new(2017, "Hello", "Action", 3.0))?;
//!     store.update_field::<Movie>("Movies", 2017, "Hello", "Rating", 0.5)?;
//!     println!("{:#?}", store.get::<Movie>("Movies", 2017, "Hello")?);
//!     store.delete::<Movie>("Movies", 2017, "Hello")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Records
//!
//! A [`Record`] names its key attributes and maps itself to and from an [`Item`]. [`Movie`]
//! is provided as an example.
//!
//! ### Sans I/O
//!
//! Requests are built and signed here, but sent by a [`Transport`]. The `reqwest` cargo
//! feature provides `reqwest_transport::Reqwest`, a blocking client. Anything else can be
//! plugged in:
//!
//! ```rust
//! use dynamo_items::{Request, Transport};
//! use std::error::Error;
//!
//! struct CustomIO;
//!
//! impl Transport for CustomIO {
//!   fn send(&self, signed: Request) -> Result<(u16, String), Box<dyn Error + Send + Sync>> {
//!     Ok(
//!       (200, "{}".into())
//!     )
//!   }
//! }
//! ```

pub mod attr;
mod config;
mod error;
mod movie;
mod record;
mod region;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
mod sign;

pub use attr::{Attr, AttrType, Item};
pub use config::{Config, ConfigError, Credentials};
pub use error::{ApiError, SerializationError, ServiceError, StoreError};
pub use movie::Movie;
pub use record::{KeyAttribute, KeySchema, Record, ScalarType, Throughput};
pub use region::{Region, UnknownRegion};

use chrono::Utc;
use http::{
    header::{CONTENT_TYPE, HOST},
    method::Method,
    Request as HttpRequest, Uri,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, error::Error, iter::FromIterator};

/// A type alias for `http::Request<Vec<u8>>`
pub type Request = HttpRequest<Vec<u8>>;

const TARGET_PREFIX: &str = "DynamoDB_20120810";

/// A trait to implement the behavior for sending requests, often your "IO" layer
pub trait Transport {
    /// Accepts a signed `http::Request<Vec<u8>>` and returns a tuple
    /// representing a response's HTTP status code and body
    fn send(
        &self,
        signed: Request,
    ) -> Result<(u16, String), Box<dyn Error + Send + Sync>>;
}

/// Provides a `Transport` implementation for a constantized response.
pub struct Const(pub u16, pub String);

impl Transport for Const {
    fn send(
        &self,
        _: Request,
    ) -> Result<(u16, String), Box<dyn Error + Send + Sync>> {
        let Const(status, body) = self;
        Ok((*status, body.clone()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeDefinition<'a> {
    attribute_name: &'a str,
    attribute_type: ScalarType,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct KeySchemaElement<'a> {
    attribute_name: &'a str,
    key_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ProvisionedThroughput {
    read_capacity_units: u64,
    write_capacity_units: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateTableInput<'a> {
    table_name: &'a str,
    attribute_definitions: [AttributeDefinition<'a>; 2],
    key_schema: [KeySchemaElement<'a>; 2],
    billing_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    provisioned_throughput: Option<ProvisionedThroughput>,
}

impl<'a> CreateTableInput<'a> {
    fn new(
        table_name: &'a str,
        KeySchema { hash, range }: &'a KeySchema,
        throughput: Throughput,
    ) -> Self {
        let (billing_mode, provisioned_throughput) = match throughput {
            Throughput::Provisioned { read, write } => (
                "PROVISIONED",
                Some(ProvisionedThroughput {
                    read_capacity_units: read,
                    write_capacity_units: write,
                }),
            ),
            Throughput::OnDemand => ("PAY_PER_REQUEST", None),
        };
        Self {
            table_name,
            attribute_definitions: [
                AttributeDefinition {
                    attribute_name: &hash.name,
                    attribute_type: hash.scalar_type,
                },
                AttributeDefinition {
                    attribute_name: &range.name,
                    attribute_type: range.scalar_type,
                },
            ],
            key_schema: [
                KeySchemaElement {
                    attribute_name: &hash.name,
                    key_type: "HASH",
                },
                KeySchemaElement {
                    attribute_name: &range.name,
                    key_type: "RANGE",
                },
            ],
            billing_mode,
            provisioned_throughput,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutItemInput<'a> {
    table_name: &'a str,
    item: Item,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemInput<'a> {
    table_name: &'a str,
    key: Item,
    consistent_read: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetItemOutput {
    item: Option<Item>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateItemInput<'a> {
    table_name: &'a str,
    key: Item,
    update_expression: &'static str,
    condition_expression: &'static str,
    expression_attribute_names: HashMap<&'static str, &'a str>,
    expression_attribute_values: HashMap<&'static str, Attr>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteItemInput<'a> {
    table_name: &'a str,
    key: Item,
}

fn encode<T: Serialize>(input: &T) -> Result<Vec<u8>, SerializationError> {
    serde_json::to_vec(input).map_err(SerializationError::Encode)
}

fn key<R: Record>(
    partition: i64,
    sort: &str,
) -> Item {
    Item::from_iter([
        (R::PARTITION_KEY.to_string(), Attr::from(partition)),
        (R::SORT_KEY.to_string(), Attr::from(sort)),
    ])
}

/// The session handle an [`ItemStore`] sends its requests through
pub struct Connection {
    credentials: Credentials,
    region: Region,
    endpoint: Option<String>,
    transport: Box<dyn Transport + Send + Sync>,
}

impl Connection {
    pub fn new(
        credentials: Credentials,
        region: Region,
        endpoint: Option<String>,
        transport: impl Transport + Send + Sync + 'static,
    ) -> Self {
        Self {
            credentials,
            region,
            endpoint,
            transport: Box::new(transport),
        }
    }

    pub fn from_config(
        config: Config,
        transport: impl Transport + Send + Sync + 'static,
    ) -> Self {
        let Config {
            credentials,
            region,
            endpoint,
            ..
        } = config;
        Self::new(credentials, region, endpoint, transport)
    }

    /// Connects with a reqwest transport configured from the process environment,
    /// see [`Config::from_env`]
    #[cfg(feature = "reqwest")]
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::from_env()?;
        let transport = reqwest_transport::Reqwest::with_timeout(config.timeout)
            .map_err(|e| ConfigError::Transport(Box::new(e)))?;
        Ok(Self::from_config(config, transport))
    }

    fn signed_request(
        &self,
        operation: &str,
        body: Vec<u8>,
    ) -> Result<Request, ServiceError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/Programming.LowLevelAPI.html
        let uri: Uri = self
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.region.endpoint())
            .parse()?;
        let host = uri
            .authority()
            .ok_or_else(|| ServiceError::InvalidEndpoint(uri.to_string()))?
            .to_string();
        let unsigned = HttpRequest::builder()
            .method(Method::POST)
            .uri(uri)
            .header(HOST, host)
            .header(CONTENT_TYPE, "application/x-amz-json-1.0")
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .body(body)?;
        sign::sign(&self.credentials, self.region.id(), Utc::now(), unsigned)
    }

    fn call(
        &self,
        operation: &str,
        body: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let request = self.signed_request(operation, body)?;
        debug!("sending {} to {}", operation, request.uri());
        match self.transport.send(request).map_err(ServiceError::Transport)? {
            (200, body) => Ok(body),
            (status, body) => {
                let err = ApiError::from_response(status, &body);
                debug!("{} failed: {}", operation, err);
                Err(ServiceError::Api(err))
            }
        }
    }
}

/// The central client interface applications will work with
///
/// All operations take the table name and, where they address one record, its full
/// composite key.
///
/// # Example
///
/// ```rust ,no_run
/// # use dynamo_items::{Const, Connection, Credentials, ItemStore, Movie};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = ItemStore::new(Connection::new(
///     Credentials::new("access-key-id", "secret-access-key"),
///     "us-east-1".parse()?,
///     None,
///     Const(200, "{}".into()),
/// ));
/// assert_eq!(store.get::<Movie>("Movies", 2015, "The Big New Movie")?, None);
/// # Ok(())
/// # }
/// ```
pub struct ItemStore {
    connection: Connection,
}

impl ItemStore {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Creates a table with a hash + range key, succeeding if one by that name already exists
    pub fn ensure_table(
        &self,
        table: &str,
        schema: &KeySchema,
        throughput: Throughput,
    ) -> Result<(), StoreError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/APIReference/API_CreateTable.html
        let body = encode(&CreateTableInput::new(table, schema, throughput))?;
        match self.connection.call("CreateTable", body) {
            Ok(_) => {
                info!("Created the table {}", table);
                Ok(())
            }
            Err(err) if err.code() == Some("ResourceInUseException") => {
                info!("Table {} already exists", table);
                Ok(())
            }
            Err(source) => Err(StoreError::Provisioning {
                table: table.into(),
                source,
            }),
        }
    }

    /// Writes the whole record, replacing any record stored under the same key
    pub fn put<R: Record>(
        &self,
        table: &str,
        record: &R,
    ) -> Result<(), StoreError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/APIReference/API_PutItem.html
        let body = encode(&PutItemInput {
            table_name: table,
            item: record.to_item()?,
        })?;
        self.connection.call("PutItem", body)?;
        info!(
            "Successfully added '{}' ({}) to table {}",
            record.sort_key(),
            record.partition_key(),
            table
        );
        Ok(())
    }

    /// Fetches a record by key, `None` when nothing is stored under it
    pub fn get<R: Record>(
        &self,
        table: &str,
        partition: i64,
        sort: impl AsRef<str>,
    ) -> Result<Option<R>, StoreError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/APIReference/API_GetItem.html
        let sort = sort.as_ref();
        let body = encode(&GetItemInput {
            table_name: table,
            key: key::<R>(partition, sort),
            consistent_read: true,
        })?;
        let output = serde_json::from_str::<GetItemOutput>(&self.connection.call("GetItem", body)?)
            .map_err(ServiceError::Response)?;
        match output.item {
            Some(item) => {
                let record = R::from_item(item)?;
                info!("Found '{}' ({}) in table {}", sort, partition, table);
                Ok(Some(record))
            }
            None => {
                info!("Could not find '{}' ({}) in table {}", sort, partition, table);
                Ok(None)
            }
        }
    }

    /// Sets one non-key attribute of an existing record, leaving the rest untouched
    ///
    /// The value must have the type [`Record::field_type`] gives for `field`, so the record stays
    /// readable. Fails with [`StoreError::NoSuchItem`] rather than creating a partial record when
    /// nothing is stored under the key.
    pub fn update_field<R: Record>(
        &self,
        table: &str,
        partition: i64,
        sort: impl AsRef<str>,
        field: impl AsRef<str>,
        value: impl Into<Attr>,
    ) -> Result<(), StoreError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/APIReference/API_UpdateItem.html
        let (sort, field) = (sort.as_ref(), field.as_ref());
        if field == R::PARTITION_KEY || field == R::SORT_KEY {
            return Err(StoreError::ImmutableAttribute(field.into()));
        }
        let expected = R::field_type(field)
            .ok_or_else(|| SerializationError::UnknownAttribute(field.into()))?;
        let value = value.into();
        attr::validate(field, &value, expected)?;
        let body = encode(&UpdateItemInput {
            table_name: table,
            key: key::<R>(partition, sort),
            // placeholders keep reserved words such as `Year` usable as attribute names
            update_expression: "SET #f = :v",
            condition_expression: "attribute_exists(#pk)",
            expression_attribute_names: HashMap::from_iter([
                ("#f", field),
                ("#pk", R::PARTITION_KEY),
            ]),
            expression_attribute_values: HashMap::from_iter([(":v", value)]),
        })?;
        match self.connection.call("UpdateItem", body) {
            Ok(_) => {
                info!(
                    "Successfully updated '{}' ({}) {} in table {}",
                    sort, partition, field, table
                );
                Ok(())
            }
            Err(err) if err.code() == Some("ConditionalCheckFailedException") => {
                Err(StoreError::NoSuchItem {
                    partition,
                    sort: sort.into(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a record by key. Removing a key with nothing stored under it is not an error.
    pub fn delete<R: Record>(
        &self,
        table: &str,
        partition: i64,
        sort: impl AsRef<str>,
    ) -> Result<(), StoreError> {
        // https://docs.aws.amazon.com/amazondynamodb/latest/APIReference/API_DeleteItem.html
        let sort = sort.as_ref();
        let body = encode(&DeleteItemInput {
            table_name: table,
            key: key::<R>(partition, sort),
        })?;
        self.connection.call("DeleteItem", body)?;
        info!("Deleted '{}' ({}) from table {}", sort, partition, table);
        Ok(())
    }

    #[doc(hidden)]
    pub fn put_item_req<R: Record>(
        &self,
        table: &str,
        record: &R,
    ) -> Result<Request, StoreError> {
        let body = encode(&PutItemInput {
            table_name: table,
            item: record.to_item()?,
        })?;
        Ok(self.connection.signed_request("PutItem", body)?)
    }
}
