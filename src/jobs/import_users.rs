use crate::core::{submit_all, ApiClient, Coerce, FieldRule, ImportSummary, Materializer};
use crate::jobs::read_csv_records;
use crate::utils::error::Result;
use serde_json::json;
use std::path::Path;

/// Creates one user account per CSV row. `canLogIn` defaults to true and
/// `hourlyRate` to zero when the CSV omits them; `roleSets` is a
/// single-element array on the wire.
pub async fn run(client: &ApiClient, csv_path: &Path) -> Result<ImportSummary> {
    let rows = read_csv_records(csv_path)?;
    tracing::info!("importing {} users", rows.len());

    let materializer = Materializer::new(vec![
        FieldRule::new("email", "email", Coerce::Raw),
        FieldRule::new("firstName", "firstName", Coerce::Raw),
        FieldRule::new("lastName", "lastName", Coerce::Raw),
        FieldRule::new("canLogIn", "canLogIn", Coerce::Bool),
        FieldRule::new("phoneNumber", "phoneNumber", Coerce::Raw),
        FieldRule::new("jobPosition", "jobPosition", Coerce::Raw),
        FieldRule::new("department", "department", Coerce::Raw),
        FieldRule::new("hourlyRate", "hourlyRate", Coerce::Float),
    ]);

    let payloads = rows
        .iter()
        .map(|row| {
            let mut payload = materializer.materialize(row);
            if let Some(obj) = payload.as_object_mut() {
                obj.entry("canLogIn").or_insert(json!(true));
                obj.entry("hourlyRate").or_insert(json!(0.0));
                if let Some(role_set) = row.str("roleSets") {
                    obj.insert("roleSets".to_string(), json!([role_set]));
                }
            }
            let label = row.str("email").unwrap_or("<no email>").to_string();
            (label, payload)
        })
        .collect();

    Ok(submit_all(client, "user/users", payloads).await)
}
