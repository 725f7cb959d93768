pub mod download_invoices;
pub mod export_projects;
pub mod import_contractors;
pub mod import_costs;
pub mod import_projects;
pub mod import_users;
pub mod sync_orders;
pub mod unpaid_report;

use crate::domain::model::Record;
use crate::utils::error::Result;
use std::path::Path;

/// Reads a CSV file into records, every cell as a string value keyed by its
/// header. Coercions happen later, in the field-mapping tables.
pub fn read_csv_records(path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let data = headers
            .iter()
            .zip(row.iter())
            .map(|(key, value)| {
                (
                    key.to_string(),
                    serde_json::Value::String(value.to_string()),
                )
            })
            .collect();
        records.push(Record { data });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_csv_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,priceNet").unwrap();
        writeln!(file, "Office supplies,120.50").unwrap();
        writeln!(file, "Travel,80").unwrap();

        let records = read_csv_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].str("name"), Some("Office supplies"));
        assert_eq!(records[0].float("priceNet"), Some(120.5));
        assert_eq!(records[1].str("name"), Some("Travel"));
    }
}
