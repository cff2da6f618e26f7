use crate::normalize::{normalize_label, trim_url_trailer};
use crate::{ExtractedLink, Platform};
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use tracing::{debug, warn};

// One combined pass: platform token, non-greedy candidate title (same line
// run, newlines allowed around it), then a URL on one of the known hosts.
// Tolerant of the loose formatting of human-pasted roundup messages.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(Facebook|Instagram|X|Twitter)\s*([^\n]*?)\s*(https?://(?:www\.|m\.)?(?:facebook\.com/\S+|instagram\.com/\S+|x\.com/\S+|twitter\.com/\S+)\S*)",
    )
    .unwrap()
});

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Link extractor, responsible for recovering (platform, title, URL)
/// records from unstructured roundup text.
///
/// Pure and synchronous: no I/O, no shared mutable state beyond the
/// process-wide id counter. Safe to call repeatedly and concurrently.
#[derive(Clone)]
pub struct LinkExtractor;

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan `text` and return every token-then-URL match in order of
    /// appearance. Malformed input yields fewer records, never an error.
    pub fn extract(&self, text: &str) -> Vec<ExtractedLink> {
        let mut links = Vec::new();

        for caps in LINK_RE.captures_iter(text) {
            let token = &caps[1];
            let label = capitalize(token);

            let mut title = normalize_label(&caps[2]);
            if title.is_empty() {
                title = format!("{label} Publicación");
            }

            let url = trim_url_trailer(&caps[3]).to_string();
            let platform = Platform::from_url(&url);

            // The rendered platform comes from the host, the label from the
            // literal token; the two can disagree in sloppy input. Flag it
            // rather than silently unifying.
            if platform != token_platform(token) {
                warn!(
                    label = %label,
                    url = %url,
                    "platform token disagrees with link host"
                );
            }

            debug!(platform = %platform, title = %title, url = %url, "extracted link");

            links.push(ExtractedLink {
                platform,
                group: title.clone(),
                title,
                url,
                id: next_id(),
            });
        }

        links
    }
}

fn next_id() -> String {
    format!("link_{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// First letter upper, rest lower: the network name as shown in synthesized
/// titles ("Facebook", "X", ...).
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn token_platform(token: &str) -> Platform {
    match token.to_lowercase().as_str() {
        "facebook" => Platform::Facebook,
        "instagram" => Platform::Instagram,
        "x" | "twitter" => Platform::Twitter,
        _ => Platform::Unknown,
    }
}
