use crate::{EmbedError, ExtractedLink, Fetcher, Platform};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;
use url::form_urlencoded;

// Post-URL shapes each platform accepts for embedding. Anything else gets
// the preview-card fallback even if the extractor recognized the host.
static FACEBOOK_POST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?facebook\.com/(?:share/p/|permalink\.php\?story_fbid=|.*?/posts/|.*?/photos/|.*?/videos/)([^/?]+)",
    )
    .unwrap()
});

static INSTAGRAM_POST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://)?(?:www\.)?instagram\.com/p/([^/?]+)").unwrap());

static TWEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?(?:x\.com|twitter\.com)/([^/]+)/status/([^/?]+)")
        .unwrap()
});

/// Static card shown when a widget cannot be rendered: title, platform
/// icon, and an outbound link. Always available, never fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewCard {
    pub platform: Platform,
    pub title: String,
    pub url: String,
}

impl PreviewCard {
    pub fn for_link(link: &ExtractedLink) -> Self {
        Self {
            platform: link.platform,
            title: link.title.clone(),
            url: link.url.clone(),
        }
    }

    pub fn render_html(&self) -> String {
        format!(
            r#"<div class="preview-card" style="border-left: 4px solid {color}">
  <i class="{icon}"></i>
  <span class="preview-title">{title}</span>
  <a href="{url}" target="_blank" rel="noopener">Ver publicación original</a>
</div>"#,
            color = self.platform.color(),
            icon = self.platform.icon(),
            title = escape_html(&self.title),
            url = escape_html(&self.url),
        )
    }
}

/// Result of one widget load attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbedOutcome {
    Rendered { html: String },
    Fallback { card: PreviewCard },
}

/// An external resource with unknown readiness latency either became ready
/// within the deadline or it did not. No polling flags.
#[derive(Debug, PartialEq)]
pub enum Readiness<T> {
    Ready(T),
    TimedOut,
}

pub async fn await_ready<F, T>(deadline: Duration, fut: F) -> Readiness<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(value) => Readiness::Ready(value),
        Err(_) => Readiness::TimedOut,
    }
}

/// One official embed mechanism per platform. `render` produces
/// ready-to-insert markup or an error; the dispatcher turns either failure
/// mode into the fallback card.
#[async_trait]
pub trait EmbedStrategy: Send + Sync {
    async fn render(&self, link: &ExtractedLink) -> Result<String, EmbedError>;

    fn fallback(&self, link: &ExtractedLink) -> PreviewCard {
        PreviewCard::for_link(link)
    }
}

pub struct FacebookEmbed {
    fetcher: Fetcher,
}

impl FacebookEmbed {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Post plugin URL for a given post, XFBML-free iframe variant.
    pub fn plugin_url(post_url: &str) -> String {
        let href: String = form_urlencoded::byte_serialize(post_url.as_bytes()).collect();
        format!("https://www.facebook.com/plugins/post.php?href={href}&show_text=true&width=550")
    }
}

#[async_trait]
impl EmbedStrategy for FacebookEmbed {
    async fn render(&self, link: &ExtractedLink) -> Result<String, EmbedError> {
        let post_id = FACEBOOK_POST_RE
            .captures(&link.url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| EmbedError::InvalidPostUrl {
                platform: "Facebook".into(),
                url: link.url.clone(),
            })?;

        let embed_url = Self::plugin_url(&link.url);
        self.fetcher.probe(&embed_url).await?;

        debug!(post_id = %post_id, "Facebook post plugin is reachable");
        Ok(format!(
            r#"<iframe src="{embed_url}" width="550" height="400" style="border:none;overflow:hidden" scrolling="no" frameborder="0" allowfullscreen="true" allow="autoplay; clipboard-write; encrypted-media; picture-in-picture; web-share"></iframe>"#
        ))
    }
}

pub struct InstagramEmbed {
    fetcher: Fetcher,
}

impl InstagramEmbed {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn embed_url(shortcode: &str) -> String {
        format!("https://www.instagram.com/p/{shortcode}/embed/")
    }
}

#[async_trait]
impl EmbedStrategy for InstagramEmbed {
    async fn render(&self, link: &ExtractedLink) -> Result<String, EmbedError> {
        let shortcode = INSTAGRAM_POST_RE
            .captures(&link.url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| EmbedError::InvalidPostUrl {
                platform: "Instagram".into(),
                url: link.url.clone(),
            })?;

        let embed_url = Self::embed_url(&shortcode);
        self.fetcher.probe(&embed_url).await?;

        debug!(shortcode = %shortcode, "Instagram embed endpoint is reachable");
        Ok(format!(
            r#"<iframe src="{embed_url}" width="400" height="480" frameborder="0" scrolling="no" allowtransparency="true"></iframe>"#
        ))
    }
}

pub struct TwitterEmbed {
    fetcher: Fetcher,
}

impl TwitterEmbed {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl EmbedStrategy for TwitterEmbed {
    async fn render(&self, link: &ExtractedLink) -> Result<String, EmbedError> {
        TWEET_RE
            .captures(&link.url)
            .ok_or_else(|| EmbedError::InvalidPostUrl {
                platform: "Twitter".into(),
                url: link.url.clone(),
            })?;

        let oembed = self.fetcher.fetch_twitter_oembed(&link.url).await?;

        if let Some(text) = tweet_text(&oembed.html) {
            debug!(text = %text, "Fetched tweet text");
        }

        // The widgets.js script is omitted from the oEmbed response; a
        // response without the blockquote is an empty shell, not a widget.
        if !has_blockquote(&oembed.html) {
            return Err(EmbedError::MarkupError(
                "oEmbed response contains no tweet blockquote".into(),
            ));
        }

        Ok(oembed.html)
    }
}

/// Pull the tweet body out of oEmbed blockquote markup.
pub fn tweet_text(oembed_html: &str) -> Option<String> {
    let document = Html::parse_fragment(oembed_html);
    let text_selector = Selector::parse("p").ok()?;

    document
        .select(&text_selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn has_blockquote(oembed_html: &str) -> bool {
    let document = Html::parse_fragment(oembed_html);
    match Selector::parse("blockquote") {
        Ok(selector) => document.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Routes a link to its platform strategy. `unknown` never had a widget to
/// begin with and goes straight to the fallback card.
pub struct EmbedDispatcher {
    facebook: FacebookEmbed,
    instagram: InstagramEmbed,
    twitter: TwitterEmbed,
}

impl Default for EmbedDispatcher {
    fn default() -> Self {
        Self::new(Fetcher::new(), Fetcher::new_twitter_client())
    }
}

impl EmbedDispatcher {
    pub fn new(fetcher: Fetcher, twitter_fetcher: Fetcher) -> Self {
        Self {
            facebook: FacebookEmbed::new(fetcher.clone()),
            instagram: InstagramEmbed::new(fetcher),
            twitter: TwitterEmbed::new(twitter_fetcher),
        }
    }

    pub fn strategy(&self, platform: Platform) -> Option<&dyn EmbedStrategy> {
        match platform {
            Platform::Facebook => Some(&self.facebook),
            Platform::Instagram => Some(&self.instagram),
            Platform::Twitter => Some(&self.twitter),
            Platform::Unknown => None,
        }
    }

    /// Attempt one widget load within `deadline`. Every failure mode
    /// degrades to the preview card; this never returns an error.
    pub async fn load(&self, link: &ExtractedLink, deadline: Duration) -> EmbedOutcome {
        let Some(strategy) = self.strategy(link.platform) else {
            debug!(url = %link.url, "No embed strategy for platform, using preview card");
            return EmbedOutcome::Fallback {
                card: PreviewCard::for_link(link),
            };
        };

        Self::resolve(strategy, link, deadline).await
    }

    async fn resolve(
        strategy: &dyn EmbedStrategy,
        link: &ExtractedLink,
        deadline: Duration,
    ) -> EmbedOutcome {
        match await_ready(deadline, strategy.render(link)).await {
            Readiness::Ready(Ok(html)) => EmbedOutcome::Rendered { html },
            Readiness::Ready(Err(e)) => {
                e.log();
                EmbedOutcome::Fallback {
                    card: strategy.fallback(link),
                }
            }
            Readiness::TimedOut => {
                EmbedError::TimeoutError(link.url.clone()).log();
                EmbedOutcome::Fallback {
                    card: strategy.fallback(link),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(platform: Platform, url: &str) -> ExtractedLink {
        ExtractedLink {
            platform,
            title: "Titular".into(),
            group: "Titular".into(),
            url: url.into(),
            id: "link_test".into(),
        }
    }

    #[test]
    fn test_facebook_post_pattern() {
        let caps = FACEBOOK_POST_RE
            .captures("https://www.facebook.com/share/p/14JZkDVzxbL/")
            .unwrap();
        assert_eq!(&caps[1], "14JZkDVzxbL");

        assert!(FACEBOOK_POST_RE
            .captures("https://www.facebook.com/groups/somegroup")
            .is_none());
    }

    #[test]
    fn test_instagram_post_pattern() {
        let caps = INSTAGRAM_POST_RE
            .captures("https://www.instagram.com/p/DNqt0o-O2oy/")
            .unwrap();
        assert_eq!(&caps[1], "DNqt0o-O2oy");
    }

    #[test]
    fn test_tweet_pattern() {
        let caps = TWEET_RE
            .captures("https://x.com/editsantibanez/status/1958959222055374946")
            .unwrap();
        assert_eq!(&caps[1], "editsantibanez");
        assert_eq!(&caps[2], "1958959222055374946");
    }

    #[test]
    fn test_plugin_url_escapes_href() {
        let url = FacebookEmbed::plugin_url("https://www.facebook.com/share/p/abc/");
        assert!(url.starts_with("https://www.facebook.com/plugins/post.php?href="));
        assert!(url.contains("https%3A%2F%2Fwww.facebook.com"));
    }

    #[test]
    fn test_tweet_text_from_oembed() {
        let html = r#"<blockquote class="twitter-tweet"><p lang="es">Hola mundo</p>&mdash; Alguien (@alguien) <a href="https://twitter.com/alguien/status/123">August 22, 2025</a></blockquote>"#;
        assert_eq!(tweet_text(html).as_deref(), Some("Hola mundo"));
        assert!(has_blockquote(html));
        assert!(!has_blockquote("<div>nothing here</div>"));
    }

    #[test]
    fn test_preview_card_escapes_title() {
        let card = PreviewCard {
            platform: Platform::Twitter,
            title: "Uno <b> & \"dos\"".into(),
            url: "https://x.com/a/status/1".into(),
        };
        let html = card.render_html();
        assert!(html.contains("Uno &lt;b&gt; &amp; &quot;dos&quot;"));
        assert!(html.contains("fab fa-x-twitter"));
    }

    #[tokio::test]
    async fn test_unknown_platform_falls_back() {
        let dispatcher = EmbedDispatcher::default();
        let link = link(Platform::Unknown, "https://example.com/post/1");

        match dispatcher.load(&link, Duration::from_secs(1)).await {
            EmbedOutcome::Fallback { card } => {
                assert_eq!(card.platform, Platform::Unknown);
                assert_eq!(card.url, "https://example.com/post/1");
            }
            EmbedOutcome::Rendered { .. } => panic!("unknown platform must not render"),
        }
    }

    #[tokio::test]
    async fn test_deadline_expiry_degrades_to_card() {
        struct StallingEmbed;

        #[async_trait]
        impl EmbedStrategy for StallingEmbed {
            async fn render(&self, _link: &ExtractedLink) -> Result<String, EmbedError> {
                std::future::pending().await
            }
        }

        let link = link(Platform::Twitter, "https://x.com/a/status/1");
        let outcome =
            EmbedDispatcher::resolve(&StallingEmbed, &link, Duration::from_millis(10)).await;

        match outcome {
            EmbedOutcome::Fallback { card } => {
                assert_eq!(card.platform, Platform::Twitter);
                assert_eq!(card.url, "https://x.com/a/status/1");
            }
            EmbedOutcome::Rendered { .. } => panic!("a stalled widget must degrade to a card"),
        }
    }

    #[test]
    fn test_timeout_error_carries_url() {
        let e = EmbedError::TimeoutError("https://x.com/a/status/1".into());
        assert_eq!(
            e.to_string(),
            "Embed load timed out: https://x.com/a/status/1"
        );
    }

    #[tokio::test]
    async fn test_await_ready_times_out() {
        let outcome: Readiness<()> =
            await_ready(Duration::from_millis(10), std::future::pending()).await;
        assert_eq!(outcome, Readiness::TimedOut);
    }

    #[tokio::test]
    async fn test_invalid_post_url_falls_back_without_network() {
        let dispatcher = EmbedDispatcher::default();
        // Facebook host, but not an embeddable post shape: rejected before
        // any request is made.
        let link = link(Platform::Facebook, "https://www.facebook.com/somepage");

        match dispatcher.load(&link, Duration::from_secs(5)).await {
            EmbedOutcome::Fallback { card } => assert_eq!(card.title, "Titular"),
            EmbedOutcome::Rendered { .. } => panic!("non-post URL must not render"),
        }
    }
}
