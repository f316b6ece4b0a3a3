//! Evidence collection across providers in fixed priority order.
//!
//! # Pipeline
//!
//! 1. Fetch every provider (one after another, or all at once when
//!    concurrency is enabled). Providers are always ordered
//!    custom → web → news, whatever order they were registered in.
//! 2. Normalize each raw record, dropping records without a link.
//! 3. Deduplicate by canonical link; the first copy seen wins, so a
//!    higher-priority provider's copy is the one kept.
//! 4. Truncate to `max_results`.
//! 5. Pause for the post-collection delay, whatever happened above.
//!
//! A provider that fails is logged and recorded in the outcome list; the
//! remaining providers still contribute. If every provider fails the result
//! is simply empty.

use futures::future::join_all;

use crate::config::SearchConfig;
use crate::dedup::EvidenceSet;
use crate::error::SearchError;
use crate::normalize::normalize;
use crate::pacing::PostCollectionDelay;
use crate::provider::SourceProvider;
use crate::providers::{CustomUrlProvider, NewsSearchProvider, WebSearchProvider};
use crate::types::{Evidence, RawRecord, SourceKind};

/// Record counts for a provider that fetched successfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    /// Raw records returned by the provider.
    pub fetched: usize,
    /// Records that became new evidence (had a link and were not duplicates).
    pub accepted: usize,
}

/// What happened when one provider was asked for records.
#[derive(Debug)]
pub struct ProviderOutcome {
    /// Kind of the provider.
    pub kind: SourceKind,
    /// Provider name as used in logs.
    pub name: String,
    /// Counts on success, or the provider's error.
    pub result: Result<ProviderStats, SearchError>,
}

impl ProviderOutcome {
    /// Returns `true` if the provider's fetch failed.
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Evidence from one collection plus a per-provider report.
#[derive(Debug, Default)]
pub struct Collection {
    /// Deduplicated evidence in priority order.
    pub evidence: Vec<Evidence>,
    /// One entry per provider that was queried, in priority order.
    pub outcomes: Vec<ProviderOutcome>,
}

impl Collection {
    /// Kinds of the providers whose fetch failed.
    pub fn failed_kinds(&self) -> Vec<SourceKind> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| o.kind)
            .collect()
    }
}

/// Runs providers in priority order and merges their evidence.
pub struct EvidenceCollector {
    providers: Vec<Box<dyn SourceProvider>>,
    delay: PostCollectionDelay,
    concurrent: bool,
}

impl std::fmt::Debug for EvidenceCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("EvidenceCollector")
            .field("providers", &names)
            .field("delay", &self.delay)
            .field("concurrent", &self.concurrent)
            .finish()
    }
}

impl EvidenceCollector {
    /// Create a collector over `providers`.
    ///
    /// Providers are stably sorted into priority order by [`SourceKind`].
    /// The default post-collection delay applies; use
    /// [`with_delay`](Self::with_delay) to change it.
    pub fn new(mut providers: Vec<Box<dyn SourceProvider>>) -> Self {
        providers.sort_by_key(|p| p.kind());
        Self {
            providers,
            delay: PostCollectionDelay::default(),
            concurrent: false,
        }
    }

    /// Build the standard custom → web → news collector from configuration.
    pub fn from_config(config: &SearchConfig, custom_urls: Vec<String>) -> Self {
        let providers: Vec<Box<dyn SourceProvider>> = vec![
            Box::new(CustomUrlProvider::new(config.clone(), custom_urls)),
            Box::new(WebSearchProvider::new(config.clone())),
            Box::new(NewsSearchProvider::new(config.clone())),
        ];
        Self::new(providers)
            .with_delay(PostCollectionDelay::new(config.post_collection_delay()))
            .with_concurrency(config.concurrent_providers)
    }

    /// Set the post-collection delay.
    pub fn with_delay(mut self, delay: PostCollectionDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch all providers at once. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Kinds of the registered providers, in the order they are queried.
    pub fn provider_kinds(&self) -> Vec<SourceKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Collect evidence for `query`, returning at most `max_results` items.
    pub async fn collect(&self, query: &str, max_results: usize) -> Vec<Evidence> {
        self.collect_report(query, max_results).await.evidence
    }

    /// Collect evidence and report how each provider fared.
    ///
    /// With `max_results == 0` no provider is queried, but the delay still
    /// applies.
    pub async fn collect_report(&self, query: &str, max_results: usize) -> Collection {
        self.delay.around(self.gather(query, max_results)).await
    }

    async fn gather(&self, query: &str, max_results: usize) -> Collection {
        if max_results == 0 {
            return Collection::default();
        }
        let fetched: Vec<Result<Vec<RawRecord>, SearchError>> = if self.concurrent {
            join_all(self.providers.iter().map(|p| p.fetch(query, max_results))).await
        } else {
            let mut fetched = Vec::with_capacity(self.providers.len());
            for provider in &self.providers {
                fetched.push(provider.fetch(query, max_results).await);
            }
            fetched
        };

        let mut evidence = EvidenceSet::new();
        let mut outcomes = Vec::with_capacity(self.providers.len());

        for (provider, result) in self.providers.iter().zip(fetched) {
            let kind = provider.kind();
            let result = match result {
                Ok(records) => {
                    let mut stats = ProviderStats {
                        fetched: records.len(),
                        accepted: 0,
                    };
                    for record in &records {
                        match normalize(record, kind) {
                            Some(item) => {
                                if evidence.insert(item) {
                                    stats.accepted += 1;
                                }
                            }
                            None => {
                                tracing::trace!(provider = provider.name(), "record without link dropped");
                            }
                        }
                    }
                    tracing::debug!(
                        provider = provider.name(),
                        fetched = stats.fetched,
                        accepted = stats.accepted,
                        "provider returned records"
                    );
                    Ok(stats)
                }
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "provider failed");
                    Err(err)
                }
            };
            outcomes.push(ProviderOutcome {
                kind,
                name: provider.name().to_owned(),
                result,
            });
        }

        let evidence = evidence.into_truncated(max_results);
        tracing::info!(
            count = evidence.len(),
            failed = outcomes.iter().filter(|o| o.is_failure()).count(),
            "evidence collected"
        );

        Collection { evidence, outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct StubProvider {
        kind: SourceKind,
        outcome: Result<Vec<RawRecord>, String>,
        calls: Arc<AtomicUsize>,
    }

    impl StubProvider {
        fn ok(kind: SourceKind, records: Vec<RawRecord>) -> Box<dyn SourceProvider> {
            Box::new(Self {
                kind,
                outcome: Ok(records),
                calls: Arc::new(AtomicUsize::new(0)),
            })
        }

        fn failing(kind: SourceKind) -> Box<dyn SourceProvider> {
            Box::new(Self {
                kind,
                outcome: Err(format!("{kind} backend down")),
                calls: Arc::new(AtomicUsize::new(0)),
            })
        }
    }

    #[async_trait]
    impl SourceProvider for StubProvider {
        async fn fetch(&self, _query: &str, _limit: usize) -> Result<Vec<RawRecord>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(SearchError::Http)
        }

        fn kind(&self) -> SourceKind {
            self.kind
        }
    }

    fn record(link: &str, title: &str) -> RawRecord {
        RawRecord::new()
            .with_url(link)
            .with_title(title)
            .with_body(format!("about {title}"))
    }

    fn no_delay(providers: Vec<Box<dyn SourceProvider>>) -> EvidenceCollector {
        EvidenceCollector::new(providers).with_delay(PostCollectionDelay::none())
    }

    #[test]
    fn providers_are_sorted_into_priority_order() {
        let collector = no_delay(vec![
            StubProvider::ok(SourceKind::News, vec![]),
            StubProvider::ok(SourceKind::Custom, vec![]),
            StubProvider::ok(SourceKind::Web, vec![]),
        ]);
        assert_eq!(
            collector.provider_kinds(),
            [SourceKind::Custom, SourceKind::Web, SourceKind::News]
        );
    }

    #[tokio::test]
    async fn records_without_links_are_skipped() {
        let collector = no_delay(vec![StubProvider::ok(
            SourceKind::Web,
            vec![RawRecord::new().with_title("orphan"), record("https://a.com", "A")],
        )]);
        let report = collector.collect_report("q", 5).await;
        assert_eq!(report.evidence.len(), 1);
        let stats = report.outcomes[0].result.as_ref().expect("ok");
        assert_eq!(stats.fetched, 2);
        assert_eq!(stats.accepted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_results_skips_providers_but_still_pauses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: Box<dyn SourceProvider> = Box::new(StubProvider {
            kind: SourceKind::Web,
            outcome: Ok(vec![record("https://a.com", "A")]),
            calls: Arc::clone(&calls),
        });
        let collector = EvidenceCollector::new(vec![provider])
            .with_delay(PostCollectionDelay::new(Duration::from_secs(1)));

        let start = tokio::time::Instant::now();
        let report = collector.collect_report("q", 0).await;
        assert!(report.evidence.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_results_with_no_providers_still_pauses() {
        let collector = EvidenceCollector::new(vec![])
            .with_delay(PostCollectionDelay::new(Duration::from_secs(1)));

        let start = tokio::time::Instant::now();
        let evidence = collector.collect("q", 0).await;
        assert!(evidence.is_empty());
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn failed_kinds_are_reported() {
        let collector = no_delay(vec![
            StubProvider::failing(SourceKind::Web),
            StubProvider::ok(SourceKind::News, vec![record("https://n.com", "N")]),
        ]);
        let report = collector.collect_report("q", 5).await;
        assert_eq!(report.failed_kinds(), [SourceKind::Web]);
        assert_eq!(report.evidence.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_applies_when_every_provider_fails() {
        let collector = EvidenceCollector::new(vec![
            StubProvider::failing(SourceKind::Custom),
            StubProvider::failing(SourceKind::Web),
            StubProvider::failing(SourceKind::News),
        ])
        .with_delay(PostCollectionDelay::new(Duration::from_millis(500)));

        let start = tokio::time::Instant::now();
        let evidence = collector.collect("q", 5).await;
        assert!(evidence.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn concurrent_mode_matches_sequential_mode() {
        let build = || {
            vec![
                StubProvider::ok(SourceKind::News, vec![record("u2", "N"), record("u1", "N dup")]),
                StubProvider::ok(SourceKind::Web, vec![record("u1", "W"), record("u3", "W3")]),
            ]
        };
        let sequential = no_delay(build()).collect("q", 10).await;
        let concurrent = no_delay(build()).with_concurrency(true).collect("q", 10).await;
        assert_eq!(sequential, concurrent);
        let links: Vec<_> = sequential.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, ["u1", "u3", "u2"]);
    }

    #[test]
    fn from_config_registers_three_providers() {
        let collector = EvidenceCollector::from_config(&SearchConfig::default(), vec![]);
        assert_eq!(
            collector.provider_kinds(),
            [SourceKind::Custom, SourceKind::Web, SourceKind::News]
        );
    }
}
