use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Payload(String),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidConfigValue { field: String, reason: String },

    #[error("no matching records: {0}")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
