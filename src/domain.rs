/// URL parsing and domain extraction for the Split Tab extension
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Everything `encodeURIComponent` leaves alone stays unencoded
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a string for use inside a URL query component
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

pub fn is_valid_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Lowercased hostname of a URL, if it parses and has one
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_lowercase()))
}

/// Extract the registrable domain from a URL with smart TLD handling
///
/// Keeps 3 hostname segments for two-letter TLDs preceded by "co"/"com"
/// (bbc.co.uk, example.com.au), 2 otherwise (google.com, zinfandel.io).
/// localhost and IP addresses are returned unchanged.
pub fn extract_domain(url: &str) -> Option<String> {
    hostname(url).map(|host| {
        if host == "localhost" || is_ip_address(&host) {
            return host;
        }

        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() < 2 {
            return host;
        }

        let tld = parts[parts.len() - 1];
        let num_parts = if parts.len() >= 3
            && tld.len() == 2
            && matches!(parts[parts.len() - 2], "co" | "com")
        {
            3
        } else {
            2
        };

        parts[parts.len() - num_parts..].join(".")
    })
}

/// The second-level label of a URL's hostname ("google" for mail.google.com)
///
/// Used for auto-generated group titles and favorite names. Falls back to
/// "tab" when the URL does not parse.
pub fn second_level_label(url: &str) -> String {
    match hostname(url) {
        Some(host) => {
            let parts: Vec<&str> = host.split('.').collect();
            if parts.len() >= 2 {
                parts[parts.len() - 2].to_string()
            } else {
                host
            }
        }
        None => "tab".to_string(),
    }
}

fn is_ip_address(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Search engines supported for title-based suggestion URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

/// Build a search URL for a query on the given engine
pub fn build_search_url(query: &str, engine: SearchEngine) -> String {
    let encoded = encode_component(query);
    match engine {
        SearchEngine::Google => format!("https://www.google.com/search?q={}", encoded),
        SearchEngine::Bing => format!("https://www.bing.com/search?q={}", encoded),
        SearchEngine::DuckDuckGo => format!("https://duckduckgo.com/?q={}", encoded),
        SearchEngine::Yahoo => format!("https://search.yahoo.com/search?p={}", encoded),
    }
}
