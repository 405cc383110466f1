//! An in-memory stand-in for the DynamoDB JSON api

use dynamo_items::{Connection, Credentials, ItemStore, Region, Request, Transport};
use serde_json::{json, Map, Value};
use std::{
    collections::HashMap,
    error::Error,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

type Key = (String, String);

struct Table {
    hash: String,
    range: String,
    items: HashMap<Key, Map<String, Value>>,
}

impl Table {
    fn key_of(
        &self,
        item: &Map<String, Value>,
    ) -> Key {
        let part = |name: &str| item.get(name).map(Value::to_string).unwrap_or_default();
        (part(&self.hash), part(&self.range))
    }
}

/// Keeps tables in a map and answers the five operations the store issues.
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct Memory {
    tables: Arc<Mutex<HashMap<String, Table>>>,
    sent: Arc<AtomicUsize>,
}

fn respond(body: Value) -> (u16, String) {
    (200, body.to_string())
}

fn fail(
    code: &str,
    message: &str,
) -> (u16, String) {
    (
        400,
        json!({
            "__type": format!("com.amazonaws.dynamodb.v20120810#{}", code),
            "message": message,
        })
        .to_string(),
    )
}

fn key_name(
    input: &Value,
    key_type: &str,
) -> String {
    input["KeySchema"]
        .as_array()
        .and_then(|elements| {
            elements
                .iter()
                .find(|element| element["KeyType"] == key_type)
        })
        .and_then(|element| element["AttributeName"].as_str())
        .unwrap_or_default()
        .to_string()
}

impl Memory {
    /// Number of requests that reached the transport
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Stores an item as-is, bypassing the client
    pub fn insert_raw(
        &self,
        table: &str,
        item: Value,
    ) {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.get_mut(table).expect("table exists");
        let item = item.as_object().cloned().expect("item is an object");
        let key = table.key_of(&item);
        table.items.insert(key, item);
    }

    fn handle(
        &self,
        target: &str,
        input: &Value,
    ) -> (u16, String) {
        let name = input["TableName"].as_str().unwrap_or_default().to_string();
        let mut tables = self.tables.lock().unwrap();

        if target == "CreateTable" {
            if tables.contains_key(&name) {
                return fail(
                    "ResourceInUseException",
                    &format!("Table already exists: {}", name),
                );
            }
            tables.insert(
                name.clone(),
                Table {
                    hash: key_name(input, "HASH"),
                    range: key_name(input, "RANGE"),
                    items: HashMap::new(),
                },
            );
            return respond(json!({ "TableDescription": { "TableName": name } }));
        }

        let table = match tables.get_mut(&name) {
            Some(table) => table,
            None => return fail("ResourceNotFoundException", "Requested resource not found"),
        };
        let empty = Map::new();
        let key = table.key_of(input["Key"].as_object().unwrap_or(&empty));

        match target {
            "PutItem" => {
                let item = input["Item"].as_object().cloned().unwrap_or_default();
                let key = table.key_of(&item);
                table.items.insert(key, item);
                respond(json!({}))
            }
            "GetItem" => match table.items.get(&key) {
                Some(item) => respond(json!({ "Item": item })),
                None => respond(json!({})),
            },
            "UpdateItem" => {
                let field = input["ExpressionAttributeNames"]["#f"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let value = input["ExpressionAttributeValues"][":v"].clone();
                if !table.items.contains_key(&key) {
                    if input.get("ConditionExpression").is_some() {
                        return fail(
                            "ConditionalCheckFailedException",
                            "The conditional request failed",
                        );
                    }
                    let fresh = input["Key"].as_object().cloned().unwrap_or_default();
                    table.items.insert(key.clone(), fresh);
                }
                if let Some(item) = table.items.get_mut(&key) {
                    item.insert(field, value);
                }
                respond(json!({}))
            }
            "DeleteItem" => {
                table.items.remove(&key);
                respond(json!({}))
            }
            other => fail("UnknownOperationException", other),
        }
    }
}

impl Transport for Memory {
    fn send(
        &self,
        signed: Request,
    ) -> Result<(u16, String), Box<dyn Error + Send + Sync>> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if !signed.headers().contains_key("authorization") {
            return Ok(fail("MissingAuthenticationTokenException", "unsigned request"));
        }
        let target = signed
            .headers()
            .get("x-amz-target")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("DynamoDB_20120810."))
            .unwrap_or_default()
            .to_string();
        let input: Value = serde_json::from_slice(signed.body())?;
        Ok(self.handle(&target, &input))
    }
}

/// A store backed by a fresh [`Memory`], which is returned alongside for inspection
pub fn memory_store() -> (ItemStore, Memory) {
    let memory = Memory::default();
    let store = ItemStore::new(Connection::new(
        Credentials::new("test", "test"),
        Region::UsEast1,
        Some("http://localhost:8000".to_string()),
        memory.clone(),
    ));
    (store, memory)
}
