// ABOUTME: Fan-out image preloading that completes once every load has settled.
// ABOUTME: Defines the ImageLoader capability and the PreloadReport of settled loads.

use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::error::ImagesError;

/// A load that has been started and resolves when the image has been fetched.
pub type LoadFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Something that can warm an image cache.
pub trait ImageLoader: Send + Sync {
    /// Starts loading `url`.
    ///
    /// An `Err` means the load could not even be initiated; the returned future
    /// carries everything that can go wrong afterwards.
    fn start(&self, url: &str) -> Result<LoadFuture, ImagesError>;
}

/// A load that was started but did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedLoad {
    pub url: String,
    pub reason: String,
}

/// Outcome of a preload run once every load has settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: Vec<FailedLoad>,
}

impl PreloadReport {
    /// True when every requested image loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.loaded == self.requested
    }
}

/// Starts a load for every URL and waits for all of them.
///
/// Loads are spawned on the current tokio runtime as they are started. The
/// first URL that cannot be started fails the whole call; loads spawned before
/// it are left running. Failures after a load started are logged and listed in
/// the report, never returned as an error. `concurrency` caps how many loads
/// are in flight at once; `None` means no cap.
pub async fn preload<L>(
    loader: &L,
    urls: &[String],
    concurrency: Option<NonZeroUsize>,
) -> Result<PreloadReport, ImagesError>
where
    L: ImageLoader + ?Sized,
{
    if urls.is_empty() {
        return Ok(PreloadReport::default());
    }

    let limit = concurrency.map(|n| Arc::new(Semaphore::new(n.get())));
    let mut in_flight = Vec::with_capacity(urls.len());

    for url in urls {
        let load = loader.start(url)?;
        let limit = limit.clone();
        in_flight.push(tokio::spawn(async move {
            let _permit = match limit {
                Some(limit) => limit.acquire_owned().await.ok(),
                None => None,
            };
            load.await
        }));
    }

    let settled = join_all(in_flight).await;

    let mut report = PreloadReport {
        requested: urls.len(),
        ..PreloadReport::default()
    };
    for (url, outcome) in urls.iter().zip(settled) {
        let reason = match outcome {
            Ok(Ok(())) => {
                report.loaded += 1;
                continue;
            }
            Ok(Err(err)) => format!("{err:#}"),
            Err(join_err) => join_err.to_string(),
        };
        tracing::warn!(url = %url, reason = %reason, "image preload failed");
        report.failed.push(FailedLoad {
            url: url.clone(),
            reason,
        });
    }

    tracing::debug!(
        requested = report.requested,
        loaded = report.loaded,
        failed = report.failed.len(),
        "preload settled"
    );
    Ok(report)
}
