use crate::core::{
    submit_all, ApiClient, Coerce, FieldRule, ImportSummary, Materializer, ReferenceIndex,
};
use crate::jobs::read_csv_records;
use crate::utils::error::Result;
use chrono::Local;
use serde_json::{json, Value};
use std::path::Path;

/// Creates one cost per CSV row. Cost categories and tax rates are resolved
/// by name through lookup-or-create indexes built from a full fetch before
/// the loop; projects are lookup-only. An unresolvable reference lands as
/// null and the cost is submitted anyway.
pub async fn run(client: &ApiClient, csv_path: &Path) -> Result<ImportSummary> {
    let rows = read_csv_records(csv_path)?;
    tracing::info!("importing {} costs", rows.len());

    let mut categories = ReferenceIndex::fetch(client, "finance/cost-categories").await?;
    let mut tax_rates = ReferenceIndex::fetch(client, "finance/tax-rates").await?;
    let projects = ReferenceIndex::fetch(client, "project/projects").await?;
    tracing::info!(
        "reference data: {} categories, {} tax rates, {} projects",
        categories.len(),
        tax_rates.len(),
        projects.len()
    );

    let materializer = Materializer::new(vec![
        FieldRule::new("name", "name", Coerce::Raw),
        FieldRule::new("description", "description", Coerce::Raw),
        FieldRule::new("priceNet", "priceNet", Coerce::Float),
        FieldRule::new("priceGross", "priceGross", Coerce::Float),
        FieldRule::new("date", "date", Coerce::DateTime),
        FieldRule::new("isBilled", "isBilled", Coerce::Bool),
        FieldRule::new("isPosted", "isPosted", Coerce::Bool),
    ]);

    let now = Local::now().to_rfc3339();
    let mut payloads = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut payload = materializer.materialize(row);
        if let Some(obj) = payload.as_object_mut() {
            let category = match row.str("category") {
                Some(name) => {
                    categories
                        .resolve_or_create(client, name, json!({ "name": name }))
                        .await
                }
                None => None,
            };
            obj.insert("costCategory".to_string(), category.unwrap_or(Value::Null));

            let tax_rate = match row.str("taxRate") {
                Some(name) => {
                    let value = row.float("taxRateValue").unwrap_or(0.0);
                    tax_rates
                        .resolve_or_create(
                            client,
                            name,
                            json!({ "name": name, "value": value, "isDefault": false }),
                        )
                        .await
                }
                None => None,
            };
            obj.insert("taxRate".to_string(), tax_rate.unwrap_or(Value::Null));

            let project = row
                .str("project")
                .filter(|name| !name.is_empty())
                .and_then(|name| projects.get(name).cloned());
            obj.insert("financeProject".to_string(), project.unwrap_or(Value::Null));

            obj.insert("createdAt".to_string(), json!(now));
            obj.insert("updatedAt".to_string(), json!(now));
        }

        let label = row.str("name").unwrap_or("<unnamed>").to_string();
        payloads.push((label, payload));
    }

    Ok(submit_all(client, "finance/costs", payloads).await)
}
