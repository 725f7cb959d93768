pub mod config;
pub mod core;
pub mod domain;
pub mod jobs;
pub mod utils;

pub use crate::config::{ApiloConfig, IcpConfig, SmtpConfig};
pub use crate::core::{ApiClient, Auth, Materializer, PagedFetcher, ReferenceIndex};
pub use crate::domain::model::Record;
pub use crate::utils::error::{EtlError, Result};
