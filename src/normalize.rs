use regex::Regex;
use std::sync::LazyLock;

// `[^*]+` keeps the match innermost, so adjacent emphasis runs are each
// unwrapped independently instead of being merged into one span.
static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,2}([^*]+)\*{1,2}").unwrap());

/// Clean a candidate title fragment: strip `*`/`**` emphasis, drop
/// zero-width and BOM-class invisible characters, collapse whitespace runs
/// into single spaces, and trim. Always returns a string, possibly empty.
pub fn normalize_label(text: &str) -> String {
    let unwrapped = EMPHASIS_RE.replace_all(text, "$1");
    let visible: String = unwrapped
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip one trailing run of prose punctuation (`?`, `.`, `)`, `]`, `}`)
/// from the end of a URL. Characters in the middle of the string are never
/// touched, and nothing outside that set is stripped.
pub fn trim_url_trailer(url: &str) -> &str {
    url.trim_end_matches(&['?', '.', ')', ']', '}'][..])
}
