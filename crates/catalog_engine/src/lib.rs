//! Catalog engine: page transport, pagination loop, and output sinks.
mod engine;
mod export;
mod fetch;
mod paginate;
mod persist;
mod retry;
mod types;

pub use engine::{CatalogEngine, Clock, EngineConfig, EngineError, RunReport};
pub use export::{
    heading_anchor, render_json, render_markdown, render_readme, render_simple_list, write_outputs,
    ExportError, ExportOptions, ExportSummary,
};
pub use fetch::{
    parse_listing, FetchSettings, LogProgressSink, PageFetcher, ProgressSink, ReqwestPageFetcher,
    DEFAULT_ENDPOINT,
};
pub use paginate::{fetch_all, FetchOutcome, PaginationSettings};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use retry::RetryPolicy;
pub use types::{CatalogEvent, FailureKind, FetchError, Page, StopReason};
