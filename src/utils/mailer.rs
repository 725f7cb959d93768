use crate::config::SmtpConfig;
use crate::utils::error::{EtlError, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::path::Path;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn mailbox(field: &str, address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| EtlError::Mail(format!("invalid {} address '{}': {}", field, address, e)))
}

/// Sends one plain-text message with a single file attached through the
/// configured SMTP relay. Blocking send; these jobs are single-run batches.
pub fn send_with_attachment(
    smtp: &SmtpConfig,
    subject: &str,
    body: String,
    attachment_path: &Path,
) -> Result<()> {
    tracing::debug!("sending mail to {}", smtp.send_to);

    let filename = attachment_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("attachment")
        .to_string();
    let content = std::fs::read(attachment_path)?;
    let content_type = ContentType::parse(XLSX_MIME)
        .map_err(|e| EtlError::Mail(format!("invalid attachment content type: {}", e)))?;

    let message = Message::builder()
        .from(mailbox("sender", &smtp.send_from)?)
        .to(mailbox("recipient", &smtp.send_to)?)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(filename).body(content, content_type)),
        )
        .map_err(|e| EtlError::Mail(format!("could not build message: {}", e)))?;

    let builder = if smtp.use_tls {
        SmtpTransport::starttls_relay(&smtp.host)
            .map_err(|e| EtlError::Mail(format!("STARTTLS setup failed: {}", e)))?
    } else {
        SmtpTransport::builder_dangerous(&smtp.host)
    };

    let transport = builder
        .port(smtp.port)
        .credentials(Credentials::new(smtp.username.clone(), smtp.password.clone()))
        .build();

    transport
        .send(&message)
        .map_err(|e| EtlError::Mail(format!("send failed: {}", e)))?;

    tracing::debug!("mail sent");
    Ok(())
}
