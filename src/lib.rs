use serde::{Deserialize, Serialize};
use std::fmt;

mod cache;
mod embed;
mod error;
mod extractor;
mod fetcher;
#[cfg(feature = "logging")]
mod logging;
mod normalize;
mod service;

pub use cache::EmbedCache;
pub use embed::{
    await_ready, EmbedDispatcher, EmbedOutcome, EmbedStrategy, FacebookEmbed, InstagramEmbed,
    PreviewCard, Readiness, TwitterEmbed,
};
pub use error::EmbedError;
pub use extractor::LinkExtractor;
pub use fetcher::{Fetcher, FetcherConfig, OEmbedResponse};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_link_card, setup_logging, LogConfig, LogLevelGuard};
pub use normalize::{normalize_label, trim_url_trailer};
pub use service::{
    PlatformFilter, RoundupConfig, RoundupService, RoundupSession, MAX_CONCURRENT_EMBEDS,
};

/// Social network a link belongs to, derived from the URL host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Unknown,
}

impl Platform {
    /// Classify a URL by its host substring. `x.com` and `twitter.com`
    /// both map to `Twitter`.
    pub fn from_url(url: &str) -> Self {
        if url.contains("facebook.com") {
            Platform::Facebook
        } else if url.contains("instagram.com") {
            Platform::Instagram
        } else if is_twitter_url(url) {
            Platform::Twitter
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Twitter => "twitter",
            Platform::Unknown => "unknown",
        }
    }

    /// Human-readable network name, as shown on preview cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::Twitter => "X/Twitter",
            Platform::Unknown => "Red",
        }
    }

    /// Icon class used by the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Facebook => "fab fa-facebook",
            Platform::Instagram => "fab fa-instagram",
            Platform::Twitter => "fab fa-x-twitter",
            Platform::Unknown => "fas fa-link",
        }
    }

    /// Brand color used by the presentation layer.
    pub fn color(&self) -> &'static str {
        match self {
            Platform::Facebook => "#1877f2",
            Platform::Instagram => "#e4405f",
            Platform::Twitter => "#000000",
            Platform::Unknown => "#6c757d",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link recovered from the pasted roundup text.
///
/// `group` mirrors `title` in the current design; it is kept as its own
/// field so the presentation layer can cluster several links under one
/// human-assigned heading without re-deriving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub platform: Platform,
    pub title: String,
    pub group: String,
    pub url: String,
    /// Opaque, unique within the process. Only used for DOM addressing
    /// downstream; never persisted.
    pub id: String,
}

pub fn is_twitter_url(url: &str) -> bool {
    url.contains("twitter.com") || url.contains("x.com")
}
