use crate::core::client::ApiClient;
use crate::domain::model::Record;
use crate::utils::error::Result;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pulls every record behind a paged list endpoint, one page at a time.
///
/// Termination is size-based: a page shorter than `per_page` is the last one.
/// A page of exactly `per_page` records is assumed non-terminal, so an exact
/// multiple costs one extra request that returns an empty page. The API does
/// not document a total-count header; do not replace this rule with one, a
/// full last page would be silently dropped.
pub struct PagedFetcher<'a> {
    client: &'a ApiClient,
    per_page: usize,
}

impl<'a> PagedFetcher<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self::with_page_size(client, DEFAULT_PAGE_SIZE)
    }

    /// `per_page` must be at least 1; with a page size of zero the
    /// termination rule can never trigger.
    pub fn with_page_size(client: &'a ApiClient, per_page: usize) -> Self {
        debug_assert!(per_page >= 1, "page size must be at least 1");
        Self { client, per_page }
    }

    /// Fetches all pages of `path`, placing `filters` identically on every
    /// request. Records accumulate in server order. Any page failure aborts
    /// the whole fetch and partial results are discarded.
    pub async fn fetch_all(
        &self,
        path: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<Record>> {
        let mut page = 1usize;
        let mut items = Vec::new();

        loop {
            tracing::debug!("retrieving {}, page {}", path, page);

            let mut query = vec![
                ("page".to_string(), page.to_string()),
                ("itemsPerPage".to_string(), self.per_page.to_string()),
            ];
            query.extend_from_slice(filters);

            let batch = self.client.get_records(path, &query).await?;
            let received = batch.len();
            items.extend(batch);

            if received < self.per_page {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}
