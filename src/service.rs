use crate::embed::{EmbedDispatcher, EmbedOutcome, PreviewCard};
use crate::{EmbedCache, ExtractedLink, Fetcher, LinkExtractor, Platform};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};
use url::Url;

/// Roundup messages carry a handful of links; this bound exists to keep a
/// pathological paste from opening hundreds of connections at once.
pub const MAX_CONCURRENT_EMBEDS: usize = 32;

const DEFAULT_EMBED_DEADLINE: Duration = Duration::from_secs(8);

/// RoundupService ties the pure extractor to the embed layer: analyze a
/// pasted text synchronously, then load widgets asynchronously, each with
/// its own deadline and fallback.
#[derive(Clone)]
pub struct RoundupService {
    extractor: LinkExtractor,
    dispatcher: Arc<EmbedDispatcher>,
    cache: EmbedCache,
    embed_deadline: Duration,
    semaphore: Arc<Semaphore>,
}

impl Default for RoundupService {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundupService {
    pub fn new() -> Self {
        Self::new_with_config(RoundupConfig::new(1000))
    }

    pub fn new_with_config(config: RoundupConfig) -> Self {
        debug!(
            cache_capacity = config.cache_capacity,
            "Initializing RoundupService"
        );

        let fetcher = config.fetcher.unwrap_or_default();
        let twitter_fetcher = config
            .twitter_fetcher
            .unwrap_or_else(Fetcher::new_twitter_client);

        let cache = config
            .cache
            .unwrap_or_else(|| EmbedCache::new(config.cache_capacity));

        Self {
            extractor: LinkExtractor::new(),
            dispatcher: Arc::new(EmbedDispatcher::new(fetcher, twitter_fetcher)),
            cache,
            embed_deadline: config.embed_deadline,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_embeds)),
        }
    }

    /// Synchronous and side-effect-free; safe to call from any number of
    /// callers in any order.
    pub fn analyze(&self, text: &str) -> Vec<ExtractedLink> {
        self.extractor.extract(text)
    }

    /// Load one widget. Cache hit short-circuits; everything else goes
    /// through the dispatcher under the concurrency bound. Never fails:
    /// the worst outcome is the preview card.
    #[instrument(level = "debug", skip(self, link), fields(url = %link.url))]
    pub async fn embed(&self, link: &ExtractedLink) -> EmbedOutcome {
        if let Some(cached) = self.cache.get(&link.url).await {
            debug!("Embed cache hit");
            return cached;
        }

        if let Err(e) = Url::parse(&link.url) {
            crate::EmbedError::from(e).log();
            return EmbedOutcome::Fallback {
                card: PreviewCard::for_link(link),
            };
        }

        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Embed semaphore closed, using preview card");
                return EmbedOutcome::Fallback {
                    card: PreviewCard::for_link(link),
                };
            }
        };

        let outcome = self.dispatcher.load(link, self.embed_deadline).await;
        drop(permit);

        if let EmbedOutcome::Rendered { .. } = outcome {
            self.cache.set(link.url.clone(), outcome.clone()).await;
        }

        outcome
    }

    /// Load widgets for a whole record list. Loads are independent: they
    /// complete in any order and one slow or failing widget never blocks
    /// another. Results come back paired with record ids, in input order.
    pub async fn embed_all(&self, links: &[ExtractedLink]) -> Vec<(String, EmbedOutcome)> {
        let futures: Vec<_> = links
            .iter()
            .map(|link| async move { (link.id.clone(), self.embed(link).await) })
            .collect();

        futures::future::join_all(futures).await
    }
}

/// Presentation-layer filter; `All` passes every record through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn matches(&self, link: &ExtractedLink) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(platform) => link.platform == *platform,
        }
    }
}

/// Page-lifetime display state: the current record list and the active
/// filter, reset through an explicit method instead of ambient globals.
#[derive(Default)]
pub struct RoundupSession {
    links: Vec<ExtractedLink>,
    filter: PlatformFilter,
}

impl RoundupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed records. Any widget loads still in flight for
    /// the previous list are simply abandoned.
    pub fn set_links(&mut self, links: Vec<ExtractedLink>) {
        self.links = links;
    }

    pub fn set_filter(&mut self, filter: PlatformFilter) {
        self.filter = filter;
    }

    pub fn links(&self) -> &[ExtractedLink] {
        &self.links
    }

    /// Records passing the active filter, in extraction order.
    pub fn visible(&self) -> Vec<&ExtractedLink> {
        self.links.iter().filter(|l| self.filter.matches(l)).collect()
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.filter = PlatformFilter::All;
    }
}

/// Builder-style service configuration.
pub struct RoundupConfig {
    pub cache_capacity: usize,
    pub embed_deadline: Duration,
    pub max_concurrent_embeds: usize,
    pub fetcher: Option<Fetcher>,
    pub twitter_fetcher: Option<Fetcher>,
    /// Share or pre-seed a cache across services; `None` builds a fresh
    /// one sized to `cache_capacity`.
    pub cache: Option<EmbedCache>,
}

impl RoundupConfig {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            embed_deadline: DEFAULT_EMBED_DEADLINE,
            max_concurrent_embeds: MAX_CONCURRENT_EMBEDS,
            fetcher: None,
            twitter_fetcher: None,
            cache: None,
        }
    }

    pub fn with_embed_deadline(mut self, deadline: Duration) -> Self {
        self.embed_deadline = deadline;
        self
    }

    pub fn with_max_concurrent_embeds(mut self, max_concurrent_embeds: usize) -> Self {
        self.max_concurrent_embeds = max_concurrent_embeds;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_twitter_fetcher(mut self, fetcher: Fetcher) -> Self {
        self.twitter_fetcher = Some(fetcher);
        self
    }

    pub fn with_cache(mut self, cache: EmbedCache) -> Self {
        self.cache = Some(cache);
        self
    }
}
