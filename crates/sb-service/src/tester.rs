//! Request verdict service
//!
//! `UriTester` owns one `FilterEngine` behind an async read/write lock.
//! Queries share the read side. A reload builds a fresh engine off-lock and
//! swaps it in under the write side, so nobody observes a half-built index.
//! Queries that arrive while a load is running are parked on a readiness
//! signal instead of being answered from stale or empty indices.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinSet;

use sb_compiler::{load_filter_list, LoadStats};
use sb_core::{FilterEngine, MatchDecision, TestFlags};

use crate::config::FilterConfig;
use crate::feed::FilterFeed;

/// Outcome of one reload.
#[derive(Debug, Default, Clone)]
pub struct ReloadStats {
    /// Per-source counts, in the order the sources finished loading.
    pub sources: Vec<(String, LoadStats)>,
    /// Sources whose text could not be fetched.
    pub failed: Vec<String>,
}

impl ReloadStats {
    pub fn total(&self) -> LoadStats {
        let mut total = LoadStats::default();
        for (_, stats) in &self.sources {
            total.merge(stats);
        }
        total
    }
}

/// Element hiding output for the page-side script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideCss {
    pub global: String,
    pub domain_script: String,
}

pub struct UriTester<F: FilterFeed> {
    feed: Arc<F>,
    engine: RwLock<FilterEngine>,
    config: Mutex<FilterConfig>,
    enabled: AtomicBool,
    ready: watch::Sender<bool>,
    reload_guard: Mutex<()>,
}

impl<F: FilterFeed> UriTester<F> {
    /// Create a tester that is not ready until the first `reload`.
    pub fn new(feed: F, config: FilterConfig) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            feed: Arc::new(feed),
            engine: RwLock::new(FilterEngine::new()),
            enabled: AtomicBool::new(config.enabled),
            config: Mutex::new(config),
            ready,
            reload_guard: Mutex::new(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub async fn config(&self) -> FilterConfig {
        self.config.lock().await.clone()
    }

    /// Store a new configuration. Reloads only if it differs from the
    /// current one.
    pub async fn apply_config(&self, config: FilterConfig) -> Option<ReloadStats> {
        {
            let mut current = self.config.lock().await;
            if *current == config {
                return None;
            }
            log::info!(
                "filter config changed: enabled={} sources={}",
                config.enabled,
                config.filters.len()
            );
            self.enabled.store(config.enabled, Ordering::Release);
            *current = config;
        }
        Some(self.reload().await)
    }

    /// Rebuild the engine from every configured source.
    ///
    /// Sources are fetched concurrently and parsed one at a time as they
    /// arrive. A source that fails to fetch is logged and skipped. If the
    /// returned future is dropped early the previous engine stays in place
    /// and the service is marked ready again.
    pub async fn reload(&self) -> ReloadStats {
        let _guard = self.reload_guard.lock().await;
        let _loading = LoadingGuard::start(&self.ready);

        let config = self.config.lock().await.clone();
        let mut next = FilterEngine::new();
        let mut stats = ReloadStats::default();

        if config.enabled {
            self.load_sources(&mut next, &config, &mut stats).await;

            let total = stats.total();
            log::info!(
                "filters loaded: {} block rules, {} exception rules, {} hide selectors from {} sources",
                total.block_rules,
                total.allow_rules,
                total.hide_rules,
                stats.sources.len()
            );
        } else {
            log::info!("blocking disabled, filters cleared");
        }

        *self.engine.write().await = next;
        stats
    }

    async fn load_sources(&self, engine: &mut FilterEngine, config: &FilterConfig, stats: &mut ReloadStats) {
        let mut tasks = JoinSet::new();
        for id in &config.filters {
            let feed = Arc::clone(&self.feed);
            let id = id.clone();
            tasks.spawn(async move {
                let result = feed.fetch(&id).await;
                (id, result)
            });
        }

        let mut pending = config.filters.len();
        while let Some(joined) = tasks.join_next().await {
            pending -= 1;
            match joined {
                Ok((id, Ok(text))) => {
                    let list_stats = load_filter_list(engine, &text);
                    log::debug!(
                        "parsed '{}': {} rules, {} pending",
                        id,
                        list_stats.network_rules(),
                        pending
                    );
                    stats.sources.push((id, list_stats));
                }
                Ok((id, Err(e))) => {
                    log::warn!("skipping filter source: {}", e);
                    stats.failed.push(id);
                }
                Err(e) => log::warn!("filter fetch task failed: {}", e),
            }
        }
    }

    /// Verdict for one request. Waits for an in-flight load to finish
    /// unless ad-blocking is not requested or blocking is disabled.
    pub async fn test_uri(&self, url: &str, page_url: Option<&str>, flags: TestFlags) -> MatchDecision {
        if !flags.contains(TestFlags::ADBLOCK) || !self.is_enabled() {
            return MatchDecision::Allow;
        }

        self.wait_ready().await;
        let engine = self.engine.read().await;
        engine.check(url, page_url, flags)
    }

    /// Global hiding selectors and the per-domain script fragment.
    pub async fn hide_css(&self) -> HideCss {
        self.wait_ready().await;
        let engine = self.engine.read().await;
        HideCss {
            global: engine.css().global_selectors().to_string(),
            domain_script: engine.css().domain_script().to_string(),
        }
    }

    /// Run `f` against the loaded engine.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&FilterEngine) -> R) -> R {
        self.wait_ready().await;
        let engine = self.engine.read().await;
        f(&engine)
    }

    async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = ready.wait_for(|ready| *ready).await;
    }
}

/// Holds readiness down while a reload runs and restores it however the
/// reload ends.
struct LoadingGuard<'a> {
    ready: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    fn start(ready: &'a watch::Sender<bool>) -> Self {
        ready.send_replace(false);
        Self { ready }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.ready.send_replace(true);
    }
}
