use std::time::Duration;

use catalog_core::{normalize, CatalogCollection};

use crate::fetch::{PageFetcher, ProgressSink};
use crate::{CatalogEvent, RetryPolicy, StopReason};

#[derive(Debug, Clone)]
pub struct PaginationSettings {
    pub page_size: u64,
    /// Courtesy pause between successful page fetches.
    pub page_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub collection: CatalogCollection,
    pub stop: StopReason,
    /// Successful responses, including a final empty page.
    pub pages: u32,
    pub retries: u32,
}

/// Walks the listing endpoint from offset 0 and normalizes every item.
///
/// One request is outstanding at a time. Transient failures are retried at
/// the same offset under `settings.retry`. The loop ends on an empty page,
/// when `offset + items` reaches the reported total, or on the first
/// non-transient failure, in which case the records gathered so far are
/// still returned.
pub async fn fetch_all(
    fetcher: &dyn PageFetcher,
    settings: &PaginationSettings,
    sink: &dyn ProgressSink,
) -> FetchOutcome {
    let limit = settings.page_size.max(1);
    let mut records = Vec::new();
    let mut offset: u64 = 0;
    let mut pages: u32 = 0;
    let mut retries: u32 = 0;

    let stop = loop {
        sink.emit(CatalogEvent::PageRequested { offset, limit });

        let result = settings
            .retry
            .run(
                || fetcher.fetch_page(offset, limit),
                |attempt, err| {
                    retries += 1;
                    sink.emit(CatalogEvent::Retrying {
                        offset,
                        attempt,
                        failure: err.kind.clone(),
                        delay: settings.retry.delay,
                    });
                },
            )
            .await;

        let page = match result {
            Ok(page) => page,
            Err(err) => break StopReason::Aborted(err),
        };
        pages += 1;

        if page.items.is_empty() {
            break StopReason::EmptyPage;
        }

        let count = page.items.len();
        records.extend(page.items.iter().map(normalize));
        sink.emit(CatalogEvent::PageFetched {
            offset,
            items: count,
            accumulated: records.len(),
            total: page.total,
        });

        // Trusts the reported total; a catalog that changes mid-run can skew it.
        if offset + count as u64 >= page.total {
            break StopReason::ReachedTotal { total: page.total };
        }

        offset += limit;
        tokio::time::sleep(settings.page_delay).await;
    };

    sink.emit(CatalogEvent::Finished {
        records: records.len(),
        stop: stop.clone(),
    });

    FetchOutcome {
        collection: CatalogCollection::from(records),
        stop,
        pages,
        retries,
    }
}
