use crate::core::{ApiClient, PagedFetcher};
use crate::utils::error::Result;
use serde_json::Value;
use std::path::Path;

type Formatter = fn(&Value) -> String;

/// Export columns: source key, CSV label and an optional formatter for
/// values that are not flat scalars.
const COLUMNS: &[(&str, &str, Option<Formatter>)] = &[
    ("id", "ID", None),
    ("no", "Number", None),
    ("name", "Name", None),
    ("contractorId", "Contractor ID", None),
    ("contractorName", "Contractor", None),
    ("status", "Status", None),
    ("userPermissions", "Permissions", Some(join_strings)),
    ("category", "Category", Some(category_name)),
    ("dateStart", "Start date", None),
    ("dateEnd", "End date", None),
    ("dateStartPlanned", "Planned start date", None),
    ("dateEndPlanned", "Planned end date", None),
    ("isFavorite", "Favourite?", None),
    ("assignedProjectUsers", "Assigned users", Some(user_names)),
    ("progress", "Progress", None),
    ("budget", "Budget", None),
    ("taskCountTotal", "Total tasks", None),
    ("taskCountDone", "Done tasks", None),
    ("timePlanned", "Planned time", None),
    ("timeReported", "Reported time", None),
    ("shortCode", "Short code", None),
    ("tags", "Tags", Some(tag_names)),
];

fn join_strings(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn category_name(value: &Value) -> String {
    value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn user_names(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|entry| {
                    let user = entry.get("projectUser")?;
                    Some(format!(
                        "{} {}",
                        user.get("firstName")?.as_str()?,
                        user.get("lastName")?.as_str()?
                    ))
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn tag_names(value: &Value) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|tag| tag.get("name")?.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fetches every project and writes the column table to `output` as CSV.
pub async fn run(client: &ApiClient, output: &Path) -> Result<()> {
    let projects = PagedFetcher::new(client)
        .fetch_all("project/projects", &[])
        .await?;
    tracing::info!("exporting {} projects", projects.len());

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(COLUMNS.iter().map(|(_, label, _)| *label))?;

    for project in &projects {
        let row: Vec<String> = COLUMNS
            .iter()
            .map(|(key, _, formatter)| match project.data.get(*key) {
                Some(value) => match formatter {
                    Some(format) => format(value),
                    None => scalar(value),
                },
                None => String::new(),
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    tracing::info!("projects written to {}", output.display());
    Ok(())
}
