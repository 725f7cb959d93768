use crate::core::{submit_all, ApiClient, Coerce, FieldRule, ImportSummary, Materializer};
use crate::jobs::read_csv_records;
use crate::utils::error::Result;
use std::path::Path;

/// Creates one contractor per CSV row. Only `name` is required by the API;
/// email and phone ride along when the CSV has them.
pub async fn run(client: &ApiClient, csv_path: &Path) -> Result<ImportSummary> {
    let rows = read_csv_records(csv_path)?;
    tracing::info!("importing {} contractors", rows.len());

    let materializer = Materializer::new(vec![
        FieldRule::new("name", "name", Coerce::Raw),
        FieldRule::new("email", "email", Coerce::Raw),
        FieldRule::new("phoneNumber", "phone", Coerce::Raw),
    ]);

    let payloads = rows
        .iter()
        .map(|row| {
            let label = row.str("name").unwrap_or("<unnamed>").to_string();
            (label, materializer.materialize(row))
        })
        .collect();

    Ok(submit_all(client, "crm/contractors", payloads).await)
}
