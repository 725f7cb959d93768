use crate::core::client::ApiClient;
use crate::core::fetcher::PagedFetcher;
use crate::domain::model::Record;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Coercion applied to a source value before it lands in the payload.
#[derive(Debug, Clone, Copy)]
pub enum Coerce {
    /// Pass the value through untouched.
    Raw,
    Float,
    /// Case-insensitive comparison against "true".
    Bool,
    /// Normalize to an ISO-8601 datetime string.
    DateTime,
}

/// One destination field: where it comes from and how it is coerced.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub dest: &'static str,
    pub source: &'static str,
    pub coerce: Coerce,
}

impl FieldRule {
    pub const fn new(dest: &'static str, source: &'static str, coerce: Coerce) -> Self {
        Self {
            dest,
            source,
            coerce,
        }
    }
}

/// Maps one external record (CSV row or upstream API object) into the
/// destination API's field set via a static mapping table.
pub struct Materializer {
    rules: Vec<FieldRule>,
}

impl Materializer {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Builds a destination payload from one source record. A source field
    /// that is absent is omitted from the payload; one that is present but
    /// uncoercible becomes null.
    pub fn materialize(&self, record: &Record) -> Value {
        let mut payload = Map::new();
        for rule in &self.rules {
            if let Some(value) = record.get(rule.source) {
                payload.insert(rule.dest.to_string(), apply(rule.coerce, value));
            }
        }
        Value::Object(payload)
    }
}

fn apply(coerce: Coerce, value: &Value) -> Value {
    match coerce {
        Coerce::Raw => value.clone(),
        Coerce::Float => match value {
            Value::Number(_) => value.clone(),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        Coerce::Bool => match value {
            Value::Bool(_) => value.clone(),
            Value::String(s) => Value::Bool(s.trim().eq_ignore_ascii_case("true")),
            _ => Value::Null,
        },
        Coerce::DateTime => value.as_str().map(coerce_datetime).unwrap_or(Value::Null),
    }
}

fn coerce_datetime(text: &str) -> Value {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Value::String(parsed.to_rfc3339());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Value::String(parsed.format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Value::String(format!("{}T00:00:00", parsed.format("%Y-%m-%d")));
    }
    Value::Null
}

/// In-memory `name -> id` map built once per run from a full fetch of a list
/// endpoint, used to avoid duplicate entity creation during an import.
pub struct ReferenceIndex {
    path: String,
    entries: HashMap<String, Value>,
}

impl ReferenceIndex {
    pub fn from_records(path: impl Into<String>, records: &[Record]) -> Self {
        let entries = records
            .iter()
            .filter_map(|r| Some((r.str("name")?.to_string(), r.get("id")?.clone())))
            .collect();
        Self {
            path: path.into(),
            entries,
        }
    }

    /// Builds the index from a full fetch of `path`.
    pub async fn fetch(client: &ApiClient, path: &str) -> Result<Self> {
        let records = PagedFetcher::new(client).fetch_all(path, &[]).await?;
        Ok(Self::from_records(path, &records))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `name` to a remote id, creating the entity from `template`
    /// when it is not in the index. The created id is cached so repeated
    /// names within the run resolve without another request. A failed
    /// creation resolves to `None`; the caller submits the record anyway.
    pub async fn resolve_or_create(
        &mut self,
        client: &ApiClient,
        name: &str,
        template: Value,
    ) -> Option<Value> {
        if let Some(id) = self.entries.get(name) {
            return Some(id.clone());
        }

        match client.create(&self.path, &template).await {
            Ok(created) => match created.get("id").cloned() {
                Some(id) => {
                    tracing::info!("created '{}' on {}", name, self.path);
                    self.entries.insert(name.to_string(), id.clone());
                    Some(id)
                }
                None => {
                    tracing::warn!("creation of '{}' on {} returned no id", name, self.path);
                    None
                }
            },
            Err(err) => {
                tracing::warn!("could not create '{}' on {}: {}", name, self.path, err);
                None
            }
        }
    }
}

/// Outcome of a bulk import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub failed: usize,
}

/// Submits each payload as an independent creation request. A non-success
/// status is logged with the server body and the run moves on to the next
/// record; per-record failures never abort the import.
pub async fn submit_all(
    client: &ApiClient,
    path: &str,
    payloads: Vec<(String, Value)>,
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for (label, payload) in payloads {
        match client.submit(path, &payload).await {
            Ok(()) => {
                summary.created += 1;
                tracing::info!("created '{}' on {}", label, path);
            }
            Err(err) => {
                summary.failed += 1;
                tracing::warn!("could not create '{}' on {}: {}", label, path, err);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::Auth;
    use httpmock::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_materialize_applies_coercions() {
        let materializer = Materializer::new(vec![
            FieldRule::new("name", "name", Coerce::Raw),
            FieldRule::new("priceNet", "priceNet", Coerce::Float),
            FieldRule::new("isBilled", "isBilled", Coerce::Bool),
            FieldRule::new("date", "date", Coerce::DateTime),
        ]);
        let row = record(json!({
            "name": "Office supplies",
            "priceNet": "120.50",
            "isBilled": "TRUE",
            "date": "2024-03-01",
        }));

        let payload = materializer.materialize(&row);

        assert_eq!(payload["name"], json!("Office supplies"));
        assert_eq!(payload["priceNet"], json!(120.5));
        assert_eq!(payload["isBilled"], json!(true));
        assert_eq!(payload["date"], json!("2024-03-01T00:00:00"));
    }

    #[test]
    fn test_materialize_missing_source_is_omitted() {
        let materializer = Materializer::new(vec![
            FieldRule::new("name", "name", Coerce::Raw),
            FieldRule::new("description", "description", Coerce::Raw),
        ]);
        let payload = materializer.materialize(&record(json!({"name": "A"})));

        let obj = payload.as_object().unwrap();
        assert!(obj.contains_key("name"));
        assert!(!obj.contains_key("description"));
    }

    #[test]
    fn test_materialize_uncoercible_becomes_null() {
        let materializer = Materializer::new(vec![
            FieldRule::new("priceNet", "priceNet", Coerce::Float),
            FieldRule::new("date", "date", Coerce::DateTime),
        ]);
        let payload =
            materializer.materialize(&record(json!({"priceNet": "abc", "date": "someday"})));

        assert_eq!(payload["priceNet"], Value::Null);
        assert_eq!(payload["date"], Value::Null);
    }

    #[test]
    fn test_datetime_passthrough_variants() {
        assert_eq!(
            coerce_datetime("2024-03-01T10:30:00"),
            json!("2024-03-01T10:30:00")
        );
        assert_eq!(
            coerce_datetime("2024-03-01T10:30:00+01:00"),
            json!("2024-03-01T10:30:00+01:00")
        );
    }

    #[tokio::test]
    async fn test_known_name_issues_no_creation_call() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/finance/cost-categories");
            then.status(201).json_body(json!({"id": "never"}));
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let records = vec![record(json!({"id": "cc-1", "name": "Office"}))];
        let mut index = ReferenceIndex::from_records("finance/cost-categories", &records);

        let resolved = index
            .resolve_or_create(&client, "Office", json!({"name": "Office"}))
            .await;

        create_mock.assert_hits(0);
        assert_eq!(resolved, Some(json!("cc-1")));
    }

    #[tokio::test]
    async fn test_unknown_name_creates_once_and_caches() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/finance/cost-categories")
                .json_body(json!({"name": "Travel"}));
            then.status(201).json_body(json!({"id": "cc-9", "name": "Travel"}));
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let mut index = ReferenceIndex::from_records("finance/cost-categories", &[]);

        let first = index
            .resolve_or_create(&client, "Travel", json!({"name": "Travel"}))
            .await;
        let second = index
            .resolve_or_create(&client, "Travel", json!({"name": "Travel"}))
            .await;

        create_mock.assert(); // exactly one creation call
        assert_eq!(first, Some(json!("cc-9")));
        assert_eq!(second, Some(json!("cc-9")));
        assert_eq!(index.get("Travel"), Some(&json!("cc-9")));
    }

    #[tokio::test]
    async fn test_failed_creation_resolves_to_none() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/finance/tax-rates");
            then.status(400).body("bad tax rate");
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let mut index = ReferenceIndex::from_records("finance/tax-rates", &[]);

        let resolved = index
            .resolve_or_create(&client, "VAT 99%", json!({"name": "VAT 99%"}))
            .await;

        create_mock.assert();
        assert_eq!(resolved, None);
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_submit_all_continues_past_failures() {
        let server = MockServer::start();
        let ok_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/crm/contractors")
                .json_body_partial(r#"{"name": "Good Co"}"#);
            then.status(201).json_body(json!({"id": 1}));
        });
        let bad_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/crm/contractors")
                .json_body_partial(r#"{"name": "Bad Co"}"#);
            then.status(422).body("name already taken");
        });

        let client = ApiClient::new(server.base_url(), Auth::Token("t".into())).unwrap();
        let payloads = vec![
            ("Good Co".to_string(), json!({"name": "Good Co"})),
            ("Bad Co".to_string(), json!({"name": "Bad Co"})),
        ];

        let summary = submit_all(&client, "crm/contractors", payloads).await;

        ok_mock.assert();
        bad_mock.assert();
        assert_eq!(
            summary,
            ImportSummary {
                created: 1,
                failed: 1
            }
        );
    }
}
