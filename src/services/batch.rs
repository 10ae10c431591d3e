use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use rand::Rng;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Duration;

use crate::configuration::ScraperSettings;
use crate::domain::{ExtractionResult, ResultStatus, WorkItem};
use crate::services::extractor::{FetchError, PageContent, PageExtractor};

/// Seam between the batch runner and the network, so tests can swap in an
/// instrumented fake.
#[async_trait]
pub trait Extract: Send + Sync {
    async fn extract(&self, url: &str) -> Result<PageContent, FetchError>;
}

#[async_trait]
impl Extract for PageExtractor {
    async fn extract(&self, url: &str) -> Result<PageContent, FetchError> {
        PageExtractor::extract(self, url).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn tally(results: &[ExtractionResult]) -> Self {
        let counts = results.iter().counts_by(|r| r.status);

        BatchSummary {
            succeeded: counts.get(&ResultStatus::Success).copied().unwrap_or(0),
            failed: counts.get(&ResultStatus::Error).copied().unwrap_or(0),
        }
    }
}

/// Runs every item through the extractor under a fixed-size worker pool and
/// returns one result per item, in completion order. A failing item never
/// takes its siblings down with it.
pub async fn run_batch<E>(
    extractor: Arc<E>,
    items: Vec<WorkItem>,
    settings: &ScraperSettings,
) -> Vec<ExtractionResult>
where
    E: Extract + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(settings.workers));
    let (result_sender, mut result_receiver) = mpsc::unbounded_channel::<ExtractionResult>();

    for item in items {
        let extractor = extractor.clone();
        let semaphore = semaphore.clone();
        let settings = settings.clone();
        let result_sender = result_sender.clone();

        tokio::spawn(async move {
            let result = process_item(extractor, item, semaphore, settings).await;
            if let Err(e) = result_sender.send(result) {
                log::error!("Batch receiver dropped before completion: {:?}", e);
            }
        });
    }
    drop(result_sender);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_receiver.recv().await {
        results.push(result);
    }

    results
}

async fn process_item<E>(
    extractor: Arc<E>,
    item: WorkItem,
    semaphore: Arc<Semaphore>,
    settings: ScraperSettings,
) -> ExtractionResult
where
    E: Extract,
{
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            return ExtractionResult::failure(
                item,
                format!("Failed to dispatch to the worker pool: {}", e),
            )
        }
    };

    // Politeness throttle between requests.
    let delay_ms = {
        let mut rng = rand::thread_rng();
        rng.gen_range(settings.min_delay_ms..=settings.max_delay_ms)
    };
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    match extractor.extract(&item.url).await {
        Ok(PageContent { text, links }) => {
            let link_count = links.len();
            ExtractionResult::success(item, text, link_count)
        }
        Err(e) => {
            log::error!("Failed to process url {}: {}", item.url, e);
            let message = format!("Error processing URL {}: {}", item.url, e);
            ExtractionResult::failure(item, message)
        }
    }
}
