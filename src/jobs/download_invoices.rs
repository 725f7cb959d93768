use crate::core::{ApiClient, PagedFetcher};
use crate::utils::error::Result;
use chrono::{Datelike, Local};
use std::path::Path;

/// Downloads a PDF for every invoice issued in the current year into
/// `output_dir`, named by invoice number. Invoices whose file has not been
/// rendered yet get a generate-pdf request and are picked up on a later run.
pub async fn run(client: &ApiClient, output_dir: &Path) -> Result<()> {
    let year = Local::now().year();
    let filters = vec![
        ("dateIssue[after]".to_string(), format!("{}-01-01T00:00:00", year)),
        ("dateIssue[before]".to_string(), format!("{}-12-31T00:00:00", year)),
        ("order[number]".to_string(), "asc".to_string()),
    ];

    let invoices = PagedFetcher::new(client)
        .fetch_all("finance/invoices", &filters)
        .await?;
    tracing::info!("retrieved {} invoices", invoices.len());

    std::fs::create_dir_all(output_dir)?;
    // Download URLs are pre-signed and must be fetched without auth headers.
    let downloader = reqwest::Client::new();

    for invoice in &invoices {
        let (Some(id), Some(no)) = (invoice.display("id"), invoice.str("no")) else {
            tracing::warn!("invoice without id or number, skipping");
            continue;
        };

        if !invoice.boolean("fileGenerated").unwrap_or(false) {
            match client
                .patch(&format!("finance/invoices/{}/generate-pdf", id))
                .await
            {
                Ok(()) => tracing::info!("{}: file not generated yet, requested generation, re-run later", no),
                Err(err) => tracing::warn!("{}: generate-pdf request failed: {}", no, err),
            }
            continue;
        }

        let target = output_dir.join(format!("{}.pdf", no.replace('/', "-")));
        if target.exists() {
            tracing::debug!("{}: file already exists", no);
            continue;
        }

        let meta = client
            .get_value(&format!("finance/invoices/{}/download-file", id), &[])
            .await?;
        let Some(download_url) = meta.get("downloadUrl").and_then(|v| v.as_str()) else {
            tracing::warn!("{}: response carried no downloadUrl", no);
            continue;
        };

        let response = downloader
            .get(download_url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        std::fs::write(&target, &bytes)?;
        tracing::info!("{}: saved to {}", no, target.display());
    }

    Ok(())
}
