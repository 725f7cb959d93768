pub mod client;
pub mod fetcher;
pub mod materializer;

pub use client::{ApiClient, Auth};
pub use fetcher::{PagedFetcher, DEFAULT_PAGE_SIZE};
pub use materializer::{submit_all, Coerce, FieldRule, ImportSummary, Materializer, ReferenceIndex};
