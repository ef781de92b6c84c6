use std::path::PathBuf;
use std::sync::Arc;

use catalog_logging::{catalog_info, catalog_warn};

use crate::export::{write_outputs, ExportError, ExportOptions, ExportSummary};
use crate::fetch::{FetchSettings, PageFetcher, ProgressSink, ReqwestPageFetcher};
use crate::paginate::{fetch_all, PaginationSettings};
use crate::{FetchError, StopReason};

/// Clock used for the generation timestamp in the Markdown trailer.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub pagination: PaginationSettings,
    pub export: ExportOptions,
    pub output_dir: PathBuf,
    pub generated_at: Clock,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            fetch: FetchSettings::default(),
            pagination: PaginationSettings::default(),
            export: ExportOptions::default(),
            output_dir,
            generated_at: Arc::new(|| {
                chrono::Local::now()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("http client setup failed: {0}")]
    Client(#[from] FetchError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stop: StopReason,
    pub pages: u32,
    pub retries: u32,
    pub export: ExportSummary,
}

/// Runs one fetch-and-export pass.
pub struct CatalogEngine {
    config: EngineConfig,
}

impl CatalogEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Fetches the catalog over HTTP and writes the three outputs.
    pub async fn run(&self, sink: &dyn ProgressSink) -> Result<RunReport, EngineError> {
        let fetcher = ReqwestPageFetcher::new(self.config.fetch.clone())?;
        self.run_with(&fetcher, sink).await
    }

    /// Same as [`CatalogEngine::run`] with a caller-supplied page source.
    ///
    /// Fetch failures never fail the run: outputs are written from whatever
    /// was collected. Only writing the outputs can fail.
    pub async fn run_with(
        &self,
        fetcher: &dyn PageFetcher,
        sink: &dyn ProgressSink,
    ) -> Result<RunReport, EngineError> {
        catalog_info!(
            "Starting catalog fetch from {} (page size {})",
            self.config.fetch.endpoint,
            self.config.pagination.page_size
        );
        let outcome = fetch_all(fetcher, &self.config.pagination, sink).await;

        if outcome.collection.is_empty() {
            catalog_info!("No records were found; writing empty outputs");
        } else if !outcome.stop.is_complete() {
            catalog_warn!(
                "Writing partial catalog of {} records",
                outcome.collection.len()
            );
        }

        let generated_at = (self.config.generated_at)();
        let export = write_outputs(
            &outcome.collection,
            &self.config.output_dir,
            &self.config.export,
            &generated_at,
        )?;

        Ok(RunReport {
            stop: outcome.stop,
            pages: outcome.pages,
            retries: outcome.retries,
            export,
        })
    }
}
