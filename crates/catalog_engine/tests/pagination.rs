use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catalog_engine::{
    fetch_all, CatalogEvent, FailureKind, FetchError, Page, PageFetcher, PaginationSettings,
    ProgressSink, RetryPolicy, StopReason,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// In-memory listing endpoint that records every requested offset.
struct FakeCatalog {
    items: Vec<Value>,
    reported_total: u64,
    failures: Mutex<HashMap<u64, (u32, FailureKind)>>,
    calls: Mutex<Vec<u64>>,
}

impl FakeCatalog {
    fn with_items(count: usize) -> Self {
        let items = (0..count)
            .map(|i| json!({ "name": format!("actor-{i}"), "username": "user" }))
            .collect();
        Self {
            items,
            reported_total: count as u64,
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reporting_total(mut self, total: u64) -> Self {
        self.reported_total = total;
        self
    }

    fn failing_at(self, offset: u64, times: u32, kind: FailureKind) -> Self {
        self.failures.lock().unwrap().insert(offset, (times, kind));
        self
    }

    fn calls(&self) -> Vec<u64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeCatalog {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Page, FetchError> {
        self.calls.lock().unwrap().push(offset);

        if let Some((remaining, kind)) = self.failures.lock().unwrap().get_mut(&offset) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::new(kind.clone(), "injected failure"));
            }
        }

        let start = (offset as usize).min(self.items.len());
        let end = (offset as usize + limit as usize).min(self.items.len());
        Ok(Page {
            items: self.items[start..end].to_vec(),
            total: self.reported_total,
        })
    }
}

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<CatalogEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<CatalogEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: CatalogEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn settings(page_size: u64) -> PaginationSettings {
    PaginationSettings {
        page_size,
        page_delay: Duration::ZERO,
        retry: RetryPolicy::fixed(Duration::from_millis(1)),
    }
}

fn names(outcome: &catalog_engine::FetchOutcome) -> Vec<String> {
    outcome
        .collection
        .iter()
        .map(|record| record.name.clone())
        .collect()
}

#[tokio::test]
async fn stops_on_empty_page_and_keeps_order() {
    // Reported total is larger than what is served, so only the empty page ends the run.
    let catalog = FakeCatalog::with_items(25).reporting_total(1000);
    let sink = TestSink::default();

    let outcome = fetch_all(&catalog, &settings(10), &sink).await;

    assert_eq!(outcome.stop, StopReason::EmptyPage);
    assert_eq!(outcome.collection.len(), 25);
    let expected: Vec<String> = (0..25).map(|i| format!("actor-{i}")).collect();
    assert_eq!(names(&outcome), expected);
    assert_eq!(catalog.calls(), vec![0, 10, 20, 30]);
    assert_eq!(outcome.pages, 4);
    assert_eq!(outcome.retries, 0);
}

#[tokio::test]
async fn stops_at_reported_total_without_extra_request() {
    let catalog = FakeCatalog::with_items(150);
    let sink = TestSink::default();

    let outcome = fetch_all(&catalog, &settings(100), &sink).await;

    assert_eq!(outcome.stop, StopReason::ReachedTotal { total: 150 });
    assert_eq!(outcome.collection.len(), 150);
    assert_eq!(catalog.calls(), vec![0, 100]);
}

#[tokio::test]
async fn exact_multiple_of_page_size_stops_at_total() {
    let catalog = FakeCatalog::with_items(200);
    let outcome = fetch_all(&catalog, &settings(100), &TestSink::default()).await;

    assert_eq!(outcome.stop, StopReason::ReachedTotal { total: 200 });
    assert_eq!(catalog.calls(), vec![0, 100]);
}

#[tokio::test]
async fn missing_total_stops_after_first_page() {
    let catalog = FakeCatalog::with_items(30).reporting_total(0);
    let outcome = fetch_all(&catalog, &settings(10), &TestSink::default()).await;

    assert_eq!(outcome.stop, StopReason::ReachedTotal { total: 0 });
    assert_eq!(outcome.collection.len(), 10);
    assert_eq!(catalog.calls(), vec![0]);
}

#[tokio::test]
async fn empty_catalog_returns_empty_collection() {
    let catalog = FakeCatalog::with_items(0);
    let outcome = fetch_all(&catalog, &settings(100), &TestSink::default()).await;

    assert_eq!(outcome.stop, StopReason::EmptyPage);
    assert!(outcome.collection.is_empty());
    assert_eq!(catalog.calls(), vec![0]);
}

#[tokio::test]
async fn transient_failures_are_retried_at_same_offset() {
    let catalog = FakeCatalog::with_items(25).failing_at(10, 2, FailureKind::HttpStatus(503));
    let sink = TestSink::default();

    let outcome = fetch_all(&catalog, &settings(10), &sink).await;

    assert_eq!(outcome.collection.len(), 25);
    assert_eq!(outcome.stop, StopReason::ReachedTotal { total: 25 });
    assert_eq!(outcome.retries, 2);
    assert_eq!(catalog.calls(), vec![0, 10, 10, 10, 20]);

    let retries: Vec<(u64, u32)> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            CatalogEvent::Retrying {
                offset, attempt, ..
            } => Some((offset, attempt)),
            _ => None,
        })
        .collect();
    assert_eq!(retries, vec![(10, 1), (10, 2)]);
}

#[tokio::test]
async fn timeouts_and_network_errors_are_transient() {
    let catalog = FakeCatalog::with_items(25)
        .failing_at(0, 1, FailureKind::Timeout)
        .failing_at(10, 1, FailureKind::Network);
    let outcome = fetch_all(&catalog, &settings(10), &TestSink::default()).await;

    assert_eq!(outcome.collection.len(), 25);
    assert_eq!(outcome.retries, 2);
    assert_eq!(catalog.calls(), vec![0, 0, 10, 10, 20]);
}

#[tokio::test]
async fn non_transient_failure_aborts_with_partial_result() {
    let catalog = FakeCatalog::with_items(30).failing_at(20, 1, FailureKind::Decode);
    let sink = TestSink::default();

    let outcome = fetch_all(&catalog, &settings(10), &sink).await;

    assert_eq!(outcome.collection.len(), 20);
    assert!(matches!(
        &outcome.stop,
        StopReason::Aborted(err) if err.kind == FailureKind::Decode
    ));
    assert!(!outcome.stop.is_complete());
    assert_eq!(outcome.retries, 0);
    assert_eq!(catalog.calls(), vec![0, 10, 20]);

    let last = sink.take().pop().unwrap();
    assert!(matches!(
        last,
        CatalogEvent::Finished { records: 20, stop: StopReason::Aborted(_) }
    ));
}

#[tokio::test]
async fn emits_page_events_in_order() {
    let catalog = FakeCatalog::with_items(15);
    let sink = TestSink::default();

    fetch_all(&catalog, &settings(10), &sink).await;

    assert_eq!(
        sink.take(),
        vec![
            CatalogEvent::PageRequested { offset: 0, limit: 10 },
            CatalogEvent::PageFetched {
                offset: 0,
                items: 10,
                accumulated: 10,
                total: 15
            },
            CatalogEvent::PageRequested { offset: 10, limit: 10 },
            CatalogEvent::PageFetched {
                offset: 10,
                items: 5,
                accumulated: 15,
                total: 15
            },
            CatalogEvent::Finished {
                records: 15,
                stop: StopReason::ReachedTotal { total: 15 }
            },
        ]
    );
}

#[tokio::test]
async fn records_are_normalized() {
    let catalog = FakeCatalog::with_items(1);
    let outcome = fetch_all(&catalog, &settings(10), &TestSink::default()).await;

    let record = &outcome.collection.records()[0];
    assert_eq!(record.url, "https://apify.com/user/actor-0");
    assert_eq!(record.affiliate_url, "https://apify.com/user/actor-0?fpr=p2hrc6");
    assert_eq!(record.title, "actor-0");
}
