use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use crate::models::events::{FailureKind, Outcome, ResolutionEvent, Stage};
use crate::models::providers::ProviderId;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::classifier::ProviderClassifier;
use crate::core::registry::ExtractorRegistry;
use crate::models::media::{ResolvedLinkSet, VideoCandidate};

pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Label prefix carried by every candidate: language tag then server name.
pub fn prefix_for(language: &str, provider: ProviderId) -> String {
    format!("{} {}:", language.trim(), provider.display_name())
}

struct Job {
    language: String,
    url: String,
}

struct JobResult {
    index: usize,
    url: String,
    provider: ProviderId,
    prefix: String,
    videos: anyhow::Result<Vec<VideoCandidate>>,
}

pub struct VideoResolutionDispatcher {
    registry: Arc<ExtractorRegistry>,
    classifier: ProviderClassifier,
    max_concurrent: usize,
}

impl VideoResolutionDispatcher {
    pub fn new(
        registry: Arc<ExtractorRegistry>,
        classifier: ProviderClassifier,
        max_concurrent: usize,
    ) -> Self {
        Self {
            registry,
            classifier,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn classifier(&self) -> &ProviderClassifier {
        &self.classifier
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub async fn resolve(&self, urls: &[String], language: &str) -> Outcome<Vec<VideoCandidate>> {
        let jobs = urls
            .iter()
            .map(|url| Job {
                language: language.to_string(),
                url: url.clone(),
            })
            .collect();
        self.run(jobs).await
    }

    /// Resolves every language of the set in a single fan-out.
    pub async fn resolve_set(&self, links: &ResolvedLinkSet) -> Outcome<Vec<VideoCandidate>> {
        let jobs = links
            .iter()
            .flat_map(|(language, urls)| {
                urls.iter().map(move |url| Job {
                    language: language.to_string(),
                    url: url.clone(),
                })
            })
            .collect();
        self.run(jobs).await
    }

    async fn run(&self, jobs: Vec<Job>) -> Outcome<Vec<VideoCandidate>> {
        let mut outcome: Outcome<Vec<VideoCandidate>> = Outcome::default();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let route = self.classifier.route(&job.url);
            let Some((_, extractor)) = self.registry.find_extractor(route.provider) else {
                outcome.record(ResolutionEvent::new(
                    Stage::Dispatch,
                    FailureKind::Remote,
                    &job.url,
                    format!("no extractor registered for {}", route.provider),
                ));
                continue;
            };
            let prefix = prefix_for(&job.language, route.provider);
            let semaphore = Arc::clone(&semaphore);

            tracing::debug!(
                "[dispatch] {} -> {} ({})",
                job.url,
                route.provider,
                extractor.name()
            );

            join_set.spawn(async move {
                let videos = match semaphore.acquire().await {
                    Ok(_permit) => {
                        AssertUnwindSafe(extractor.videos_from_url(&route.url, &prefix))
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|_| Err(anyhow!("extractor panicked")))
                    }
                    Err(e) => Err(anyhow!("Semaphore closed: {}", e)),
                };
                JobResult {
                    index,
                    url: job.url,
                    provider: route.provider,
                    prefix,
                    videos,
                }
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => outcome.record(ResolutionEvent::new(
                    Stage::Dispatch,
                    FailureKind::Remote,
                    "extractor task",
                    e.to_string(),
                )),
            }
        }
        // Completion order is arbitrary; candidates follow input order.
        results.sort_by_key(|r| r.index);

        for result in results {
            match result.videos {
                Ok(videos) => {
                    let before = outcome.value.len();
                    outcome.value.extend(
                        videos
                            .iter()
                            .filter(|v| !v.url.trim().is_empty())
                            .map(|v| v.prefixed(&result.prefix)),
                    );
                    tracing::debug!(
                        "[dispatch] {} gave {} streams from {}",
                        result.provider,
                        outcome.value.len() - before,
                        result.url
                    );
                }
                Err(e) => outcome.record(ResolutionEvent::new(
                    Stage::Dispatch,
                    FailureKind::Remote,
                    &result.url,
                    format!("{} extractor failed: {}", result.provider, e),
                )),
            }
        }

        outcome
    }
}
