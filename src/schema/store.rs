/// In-memory record store backing the mock schema
///
/// Records are JSON objects kept in insertion order per model. Every
/// successful mutation is published as a `ChangeEvent`.

use crate::catalog::Action;
use crate::config::{ModelConfig, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};
use crate::error::{ContactGraphError, Result};
use crate::schema::filter::matches;
use crate::schema::scalars::now_timestamp;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Default page size of list operations
pub const DEFAULT_LIMIT: usize = 100;

/// Largest accepted page size
pub const MAX_LIMIT: usize = 1000;

const EVENT_CAPACITY: usize = 256;

const TOKEN_PREFIX: &str = "after:";

pub type StoredRecord = Map<String, Value>;

/// A record change published to subscribers
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub model: String,
    /// `Create`, `Update` or `Delete`
    pub action: Action,
    pub record: StoredRecord,
}

/// Result of a list operation
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub items: Vec<StoredRecord>,
    pub next_token: Option<String>,
}

struct Table {
    /// Fields that may not be null
    required: Vec<String>,
    records: IndexMap<String, Entry>,
    /// Sequence number of the latest insert
    last_seq: u64,
}

/// A stored record and its insertion sequence number
///
/// Sequence numbers grow with insertion order and are never reused, so a
/// continuation token stays valid when records are deleted between pages.
struct Entry {
    seq: u64,
    record: StoredRecord,
}

pub struct MockStore {
    tables: RwLock<HashMap<String, Table>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MockStore {
    /// Create an empty store for `models`
    pub fn new(models: &[ModelConfig]) -> Self {
        let tables = models
            .iter()
            .map(|model| {
                let required = model
                    .field
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| f.name.clone())
                    .collect();
                (
                    model.name.clone(),
                    Table {
                        required,
                        records: IndexMap::new(),
                        last_seq: 0,
                    },
                )
            })
            .collect();

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            tables: RwLock::new(tables),
            events,
        }
    }

    /// Receive every change made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    pub async fn len(&self, model: &str) -> usize {
        self.tables
            .read()
            .await
            .get(model)
            .map_or(0, |table| table.records.len())
    }

    pub async fn get(&self, model: &str, id: &str) -> Result<Option<StoredRecord>> {
        let tables = self.tables.read().await;
        let table = table(&tables, model)?;
        Ok(table.records.get(id).map(|entry| entry.record.clone()))
    }

    /// One page of records matching `filter`
    ///
    /// The token marks the last record scanned and is returned only while a
    /// further matching record exists.
    pub async fn list(
        &self,
        model: &str,
        filter: Option<&Value>,
        limit: Option<i64>,
        next_token: Option<&str>,
    ) -> Result<RecordPage> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(limit) if limit < 1 => {
                return Err(ContactGraphError::Store(format!(
                    "limit must be positive, got {}",
                    limit
                )))
            }
            Some(limit) => (limit as usize).min(MAX_LIMIT),
        };
        let after = next_token.map(decode_token).transpose()?.unwrap_or(0);

        let tables = self.tables.read().await;
        let table = table(&tables, model)?;

        let mut page = RecordPage::default();
        let mut cursor = after;
        let mut rest = table.records.values().skip_while(|entry| entry.seq <= after);

        while page.items.len() < limit {
            let Some(entry) = rest.next() else { break };
            cursor = entry.seq;
            if is_match(filter, Some(&entry.record))? {
                page.items.push(entry.record.clone());
            }
        }

        for entry in rest {
            if is_match(filter, Some(&entry.record))? {
                page.next_token = Some(encode_token(cursor));
                break;
            }
        }

        Ok(page)
    }

    pub async fn create(
        &self,
        model: &str,
        mut input: StoredRecord,
        condition: Option<&Value>,
    ) -> Result<StoredRecord> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, model)?;

        let id = match input.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => uuid::Uuid::new_v4().to_string(),
            Some(other) => {
                return Err(ContactGraphError::Store(format!("Invalid id {}", other)))
            }
        };

        if table.records.contains_key(&id) {
            return Err(ContactGraphError::ConditionalCheckFailed(format!(
                "{} with id {} already exists",
                model, id
            )));
        }
        if !is_match(condition, None)? {
            return Err(condition_failed(model, &id));
        }

        input.retain(|_, value| !value.is_null());
        check_required(model, &table.required, &input)?;

        let now = now_timestamp();
        input.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        input.insert(CREATED_AT_FIELD.to_string(), Value::String(now.clone()));
        input.insert(UPDATED_AT_FIELD.to_string(), Value::String(now));

        table.last_seq += 1;
        let entry = Entry {
            seq: table.last_seq,
            record: input.clone(),
        };
        table.records.insert(id, entry);
        self.publish(model, Action::Create, &input);

        Ok(input)
    }

    pub async fn update(&self, model: &str, input: StoredRecord, condition: Option<&Value>) -> Result<StoredRecord> {
        let id = required_id(&input)?;

        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, model)?;

        let required = table.required.clone();
        let record = &mut table
            .records
            .get_mut(&id)
            .ok_or_else(|| condition_failed(model, &id))?
            .record;

        if !is_match(condition, Some(record))? {
            return Err(condition_failed(model, &id));
        }

        let mut updated = record.clone();
        for (key, value) in input {
            if key == ID_FIELD {
                continue;
            }
            if value.is_null() {
                updated.remove(&key);
            } else {
                updated.insert(key, value);
            }
        }
        check_required(model, &required, &updated)?;
        updated.insert(UPDATED_AT_FIELD.to_string(), Value::String(now_timestamp()));

        *record = updated.clone();
        self.publish(model, Action::Update, &updated);

        Ok(updated)
    }

    pub async fn delete(&self, model: &str, input: StoredRecord, condition: Option<&Value>) -> Result<StoredRecord> {
        let id = required_id(&input)?;

        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, model)?;

        let record = &table
            .records
            .get(&id)
            .ok_or_else(|| condition_failed(model, &id))?
            .record;
        if !is_match(condition, Some(record))? {
            return Err(condition_failed(model, &id));
        }

        let removed = table
            .records
            .shift_remove(&id)
            .ok_or_else(|| condition_failed(model, &id))?
            .record;
        self.publish(model, Action::Delete, &removed);

        Ok(removed)
    }

    fn publish(&self, model: &str, action: Action, record: &StoredRecord) {
        let event = ChangeEvent {
            model: model.to_string(),
            action,
            record: record.clone(),
        };
        // No receivers is not an error
        if self.events.send(event).is_err() {
            tracing::trace!("No subscribers for {:?} on {}", action, model);
        }
    }
}

fn table<'a>(tables: &'a HashMap<String, Table>, model: &str) -> Result<&'a Table> {
    tables
        .get(model)
        .ok_or_else(|| ContactGraphError::NotFound(format!("Unknown model '{}'", model)))
}

fn table_mut<'a>(tables: &'a mut HashMap<String, Table>, model: &str) -> Result<&'a mut Table> {
    tables
        .get_mut(model)
        .ok_or_else(|| ContactGraphError::NotFound(format!("Unknown model '{}'", model)))
}

fn is_match(filter: Option<&Value>, record: Option<&StoredRecord>) -> Result<bool> {
    match filter {
        Some(filter) => matches(filter, record),
        None => Ok(true),
    }
}

fn required_id(input: &StoredRecord) -> Result<String> {
    match input.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(ContactGraphError::Store("input.id is required".to_string())),
    }
}

fn check_required(model: &str, required: &[String], record: &StoredRecord) -> Result<()> {
    for field in required {
        if record.get(field).map_or(true, Value::is_null) {
            return Err(ContactGraphError::Store(format!(
                "{}.{} cannot be null",
                model, field
            )));
        }
    }
    Ok(())
}

fn condition_failed(model: &str, id: &str) -> ContactGraphError {
    ContactGraphError::ConditionalCheckFailed(format!("{} {}", model, id))
}

fn encode_token(seq: u64) -> String {
    STANDARD.encode(format!("{}{}", TOKEN_PREFIX, seq))
}

fn decode_token(token: &str) -> Result<u64> {
    let invalid = || ContactGraphError::Store(format!("Invalid nextToken '{}'", token));

    let bytes = STANDARD.decode(token).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    text.strip_prefix(TOKEN_PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::model::builtin_models;
    use serde_json::json;

    fn input(value: Value) -> StoredRecord {
        value.as_object().unwrap().clone()
    }

    fn store() -> MockStore {
        MockStore::new(&builtin_models())
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = store();
        let created = store
            .create("Company", input(json!({"companyName": "Acme", "city": null})), None)
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert_eq!(created["createdAt"], created["updatedAt"]);
        assert!(!created.contains_key("city"));

        let fetched = store.get("Company", id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_duplicate_id() {
        let store = store();
        store.create("Company", input(json!({"id": "c1"})), None).await.unwrap();

        let err = store.create("Company", input(json!({"id": "c1"})), None).await.unwrap_err();
        assert!(matches!(err, ContactGraphError::ConditionalCheckFailed(_)));
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let store = store();
        assert!(matches!(
            store.get("Nope", "1").await,
            Err(ContactGraphError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_and_removes() {
        let store = store();
        store
            .create(
                "Connection",
                input(json!({"id": "p1", "firstName": "Jane", "email": "jane@example.com"})),
                None,
            )
            .await
            .unwrap();

        let updated = store
            .update(
                "Connection",
                input(json!({"id": "p1", "lastName": "Doe", "email": null})),
                None,
            )
            .await
            .unwrap();

        assert_eq!(updated["firstName"], "Jane");
        assert_eq!(updated["lastName"], "Doe");
        assert!(!updated.contains_key("email"));
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = store();
        let err = store
            .update("Connection", input(json!({"id": "missing"})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactGraphError::ConditionalCheckFailed(_)));

        let err = store
            .update("Connection", input(json!({"firstName": "x"})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactGraphError::Store(_)));
    }

    #[tokio::test]
    async fn test_conditions() {
        let store = store();
        store
            .create("Company", input(json!({"id": "c1", "industry": "Retail"})), None)
            .await
            .unwrap();

        let condition = json!({"industry": {"eq": "Software"}});
        let err = store
            .update("Company", input(json!({"id": "c1", "city": "Oslo"})), Some(&condition))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactGraphError::ConditionalCheckFailed(_)));
        assert!(store.get("Company", "c1").await.unwrap().unwrap().get("city").is_none());

        let err = store
            .delete("Company", input(json!({"id": "c1"})), Some(&condition))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactGraphError::ConditionalCheckFailed(_)));
        assert_eq!(store.len("Company").await, 1);

        let condition = json!({"industry": {"eq": "Retail"}});
        let deleted = store
            .delete("Company", input(json!({"id": "c1"})), Some(&condition))
            .await
            .unwrap();
        assert_eq!(deleted["industry"], "Retail");
        assert_eq!(store.len("Company").await, 0);
    }

    #[tokio::test]
    async fn test_create_condition_sees_no_record() {
        let store = store();
        let condition = json!({"companyName": {"attributeExists": true}});
        assert!(store
            .create("Company", input(json!({"companyName": "Acme"})), Some(&condition))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_required_fields() {
        let mut models = builtin_models();
        models[0].field.push(FieldConfig::new(
            "source",
            crate::config::FieldType::String,
            true,
        ));
        let store = MockStore::new(&models);

        assert!(store.create("Connection", input(json!({"id": "p1"})), None).await.is_err());
        store
            .create("Connection", input(json!({"id": "p1", "source": "csv"})), None)
            .await
            .unwrap();
        assert!(store
            .update("Connection", input(json!({"id": "p1", "source": null})), None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_pagination() {
        let store = store();
        for i in 0..5 {
            store
                .create("Company", input(json!({"id": format!("c{}", i)})), None)
                .await
                .unwrap();
        }

        let first = store.list("Company", None, Some(2), None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.next_token.expect("more pages");

        let second = store.list("Company", None, Some(2), Some(&token)).await.unwrap();
        assert_eq!(second.items[0]["id"], "c2");

        let third = store
            .list("Company", None, Some(2), second.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(third.items.len(), 1);
        assert!(third.next_token.is_none());

        let all = store.list("Company", None, None, None).await.unwrap();
        assert_eq!(all.items.len(), 5);
        assert!(all.next_token.is_none());
    }

    #[tokio::test]
    async fn test_filtered_pagination_omits_useless_token() {
        let store = store();
        for (id, city) in [("c0", "Oslo"), ("c1", "Rome"), ("c2", "Oslo"), ("c3", "Rome")] {
            store
                .create("Company", input(json!({"id": id, "city": city})), None)
                .await
                .unwrap();
        }

        let filter = json!({"city": {"eq": "Oslo"}});
        let first = store.list("Company", Some(&filter), Some(1), None).await.unwrap();
        assert_eq!(first.items[0]["id"], "c0");

        let second = store
            .list("Company", Some(&filter), Some(1), first.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.items[0]["id"], "c2");
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn test_pagination_survives_deletes() {
        let store = store();
        for i in 0..6 {
            store
                .create("Company", input(json!({"id": format!("c{}", i)})), None)
                .await
                .unwrap();
        }

        let first = store.list("Company", None, Some(2), None).await.unwrap();
        let ids: Vec<&Value> = first.items.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec!["c0", "c1"]);

        // Earlier records and the last one returned both disappear
        store.delete("Company", input(json!({"id": "c0"})), None).await.unwrap();
        store.delete("Company", input(json!({"id": "c1"})), None).await.unwrap();

        let second = store
            .list("Company", None, Some(2), first.next_token.as_deref())
            .await
            .unwrap();
        let ids: Vec<&Value> = second.items.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec!["c2", "c3"]);

        store.delete("Company", input(json!({"id": "c4"})), None).await.unwrap();

        let third = store
            .list("Company", None, Some(2), second.next_token.as_deref())
            .await
            .unwrap();
        let ids: Vec<&Value> = third.items.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec!["c5"]);
        assert!(third.next_token.is_none());
    }

    #[tokio::test]
    async fn test_updates_keep_page_position() {
        let store = store();
        for i in 0..3 {
            store
                .create("Company", input(json!({"id": format!("c{}", i)})), None)
                .await
                .unwrap();
        }

        let first = store.list("Company", None, Some(1), None).await.unwrap();
        store
            .update("Company", input(json!({"id": "c0", "city": "Oslo"})), None)
            .await
            .unwrap();

        let second = store
            .list("Company", None, Some(2), first.next_token.as_deref())
            .await
            .unwrap();
        let ids: Vec<&Value> = second.items.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_invalid_list_arguments() {
        let store = store();
        assert!(store.list("Company", None, Some(0), None).await.is_err());
        assert!(store.list("Company", None, None, Some("garbage!")).await.is_err());
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let store = store();
        let mut events = store.subscribe();

        store.create("Company", input(json!({"id": "c1"})), None).await.unwrap();
        store.delete("Company", input(json!({"id": "c1"})), None).await.unwrap();

        let created = events.recv().await.unwrap();
        assert_eq!(created.action, Action::Create);
        assert_eq!(created.model, "Company");

        let deleted = events.recv().await.unwrap();
        assert_eq!(deleted.action, Action::Delete);
        assert_eq!(deleted.record["id"], "c1");
    }

    #[test]
    fn test_token_round_trip_rejects_foreign_tokens() {
        assert_eq!(decode_token(&encode_token(42)).unwrap(), 42);
        assert!(decode_token(&STANDARD.encode("offset:3")).is_err());
    }
}
