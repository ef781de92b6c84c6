use std::fmt;
use std::time::Duration;

use catalog_core::RawEntry;

/// One successful response of the listing endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawEntry>,
    /// Catalog size reported by the endpoint; 0 when the response omits it.
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    PageRequested {
        offset: u64,
        limit: u64,
    },
    PageFetched {
        offset: u64,
        items: usize,
        accumulated: usize,
        total: u64,
    },
    Retrying {
        offset: u64,
        attempt: u32,
        failure: FailureKind,
        delay: Duration,
    },
    Finished {
        records: usize,
        stop: StopReason,
    },
}

/// Why the pagination loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The endpoint returned a page without items.
    EmptyPage,
    /// `offset + items` reached the total reported by the endpoint.
    ReachedTotal { total: u64 },
    /// A non-transient failure; the collection holds what came before it.
    Aborted(FetchError),
}

impl StopReason {
    pub fn is_complete(&self) -> bool {
        !matches!(self, StopReason::Aborted(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => write!(f, "empty page"),
            StopReason::ReachedTotal { total } => write!(f, "reached reported total {total}"),
            StopReason::Aborted(err) => write!(f, "aborted: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl FailureKind {
    /// Connection errors, timeouts, and non-2xx statuses are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FailureKind::HttpStatus(_) | FailureKind::Timeout | FailureKind::Network
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed listing response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
