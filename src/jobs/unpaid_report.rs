use crate::config::{IcpConfig, SmtpConfig};
use crate::core::{ApiClient, PagedFetcher};
use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use crate::utils::mailer;
use chrono::{DateTime, Duration, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 12] = [
    "VAT ID",
    "Contractor",
    "Contractor country",
    "Invoice number",
    "Amount",
    "Amount outstanding",
    "Currency",
    "Due date",
    "Issued by",
    "Issue date",
    "Kind",
    "Link",
];

/// The import sheet carries only the columns the collections tool ingests.
const IMPORT_COLUMN_COUNT: usize = 8;

/// Amounts are formatted with a comma decimal separator, as the downstream
/// import expects.
fn money(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

fn short_date(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Fetches overdue unpaid invoices, builds the workbook and mails it.
/// Exits with an error when there is nothing to report, so a scheduler can
/// tell "sent" from "skipped".
pub async fn run(client: &ApiClient, icp: &IcpConfig, smtp: &SmtpConfig) -> Result<()> {
    let cutoff = Local::now() - Duration::days(1);
    let filters = vec![
        ("isNotPaid".to_string(), "1".to_string()),
        (
            "dateDeadline[before]".to_string(),
            cutoff.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ),
        ("order[dateDeadline]".to_string(), "asc".to_string()),
    ];

    let invoices = PagedFetcher::new(client)
        .fetch_all("finance/invoices", &filters)
        .await?;
    if invoices.is_empty() {
        return Err(EtlError::NoData("no unpaid invoices".to_string()));
    }
    tracing::info!("{} unpaid invoices", invoices.len());

    let (workbook_path, outstanding) = build_workbook(&invoices, icp, Path::new("."))?;

    let subject = format!(
        "[ICP] Unpaid invoices as of {}",
        Local::now().format("%d.%m.%Y")
    );
    let body = format!(
        "Unpaid invoices: {}, outstanding total: {}",
        invoices.len(),
        money(outstanding)
    );
    mailer::send_with_attachment(smtp, &subject, body, &workbook_path)?;
    std::fs::remove_file(&workbook_path)?;

    tracing::info!("report sent to {}", smtp.send_to);
    Ok(())
}

/// Writes the two-sheet workbook into `dir`: a summary sheet with a banner,
/// per-invoice rows, a link column and an outstanding total, and an
/// import-ready sheet with the first eight columns. Returns the file path
/// and the outstanding total.
pub fn build_workbook(
    invoices: &[Record],
    icp: &IcpConfig,
    dir: &Path,
) -> Result<(PathBuf, f64)> {
    let path = dir.join(format!(
        "invoices-to-pay-{}.xlsx",
        Local::now().format("%Y-%m-%d")
    ));

    let mut total = 0.0;
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(invoices.len());
    for invoice in invoices {
        let to_pay = invoice.float("toPay").unwrap_or(0.0);
        let already_paid = invoice.float("alreadyPaid").unwrap_or(0.0);
        total += to_pay - already_paid;

        rows.push(vec![
            invoice.str("buyerVatId").unwrap_or("").to_string(),
            invoice.str("buyerName").unwrap_or("").to_string(),
            "PL".to_string(),
            invoice.str("no").unwrap_or("").to_string(),
            money(to_pay),
            money(to_pay - already_paid),
            invoice.str("currencyCode").unwrap_or("").to_string(),
            invoice.str("dateDeadline").map(short_date).unwrap_or_default(),
            invoice.str("sellerCreatorName").unwrap_or("").to_string(),
            invoice.str("dateIssue").map(short_date).unwrap_or_default(),
            invoice.str("kind").unwrap_or("").to_string(),
            format!(
                "{}/finance/invoice/update/{}",
                icp.instance_url(),
                invoice.display("id").unwrap_or_default()
            ),
        ]);
    }

    let mut workbook = Workbook::new();
    let banner = Format::new()
        .set_background_color(Color::Red)
        .set_font_color(Color::White)
        .set_font_size(12)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header = Format::new().set_bold();

    let summary = workbook.add_worksheet().set_name("Summary")?;
    summary.merge_range(0, 0, 1, 11, "Import data is on the second sheet!", &banner)?;
    for (col, label) in COLUMNS.iter().enumerate() {
        summary.write_string_with_format(2, col as u16, *label, &header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            summary.write_string(3 + i as u32, col as u16, cell)?;
        }
    }
    summary.write_string(3 + rows.len() as u32, 5, &money(total))?;

    let import = workbook.add_worksheet().set_name("Import")?;
    for (col, label) in COLUMNS.iter().take(IMPORT_COLUMN_COUNT).enumerate() {
        import.write_string_with_format(0, col as u16, *label, &header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().take(IMPORT_COLUMN_COUNT).enumerate() {
            import.write_string(1 + i as u32, col as u16, cell)?;
        }
    }

    workbook.save(&path)?;
    tracing::debug!("workbook written to {}", path.display());

    Ok((path, total))
}
