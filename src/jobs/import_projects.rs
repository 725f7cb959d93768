use crate::core::{submit_all, ApiClient, Coerce, FieldRule, ImportSummary, Materializer};
use crate::jobs::read_csv_records;
use crate::utils::error::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Creates one project per CSV row (name, dateStart, dateEnd, description,
/// status). Planned dates come from the CSV; category and tags are left
/// unset and the budget starts at zero.
pub async fn run(client: &ApiClient, csv_path: &Path) -> Result<ImportSummary> {
    let rows = read_csv_records(csv_path)?;
    tracing::info!("importing {} projects", rows.len());

    let materializer = Materializer::new(vec![
        FieldRule::new("name", "name", Coerce::Raw),
        FieldRule::new("dateStartPlanned", "dateStart", Coerce::DateTime),
        FieldRule::new("dateEndPlanned", "dateEnd", Coerce::DateTime),
        FieldRule::new("description", "description", Coerce::Raw),
        FieldRule::new("status", "status", Coerce::Raw),
    ]);

    let payloads = rows
        .iter()
        .map(|row| {
            let mut payload = materializer.materialize(row);
            if let Some(obj) = payload.as_object_mut() {
                obj.insert("category".to_string(), Value::Null);
                obj.insert("tags".to_string(), Value::Null);
                obj.insert("isBlameableRemovalEnabled".to_string(), json!(true));
                obj.insert("budget".to_string(), json!(0));
            }
            let label = row.str("name").unwrap_or("<unnamed>").to_string();
            (label, payload)
        })
        .collect();

    Ok(submit_all(client, "project/projects", payloads).await)
}
