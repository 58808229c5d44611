/// Destination-URL resolution for a split request
use std::collections::HashMap;

use crate::domain::{SearchEngine, build_search_url, encode_component, hostname};
use crate::tab_data::{Mode, QuickMode, SplitRequest};

/// Neutral empty-tab URL used to pad short template lists
pub const NEW_TAB_URL: &str = "chrome://newtab/";

/// Resolve the ordered destination URLs for a request
///
/// Total: always returns exactly `split_count - 1` URLs. Explicit URLs
/// win over the mode; a recognized mode pulls its templates with
/// `{{title}}` substituted by the percent-encoded source title; anything
/// else falls back to suggestions built from the source tab.
pub fn resolve(
    request: &SplitRequest,
    quick_modes: &HashMap<Mode, QuickMode>,
    smart_suggestions: bool,
) -> Vec<String> {
    let wanted = request.split_count.saturating_sub(1) as usize;

    if let Some(explicit) = &request.explicit_urls {
        return fit_length(explicit.clone(), wanted);
    }

    if let Some(quick_mode) = request.mode.as_ref().and_then(|m| quick_modes.get(m)) {
        let encoded_title = encode_component(&request.source_tab.title);
        let urls = quick_mode
            .urls
            .iter()
            .map(|template| template.replace("{{title}}", &encoded_title))
            .collect();
        return fit_length(urls, wanted);
    }

    let suggestions = if smart_suggestions {
        contextual_suggestions(&request.source_tab.url, &request.source_tab.title)
    } else {
        default_suggestions(&request.source_tab.title)
    };
    fit_length(suggestions, wanted)
}

/// Truncate or pad with new-tab URLs to the exact required length
fn fit_length(mut urls: Vec<String>, wanted: usize) -> Vec<String> {
    urls.truncate(wanted);
    while urls.len() < wanted {
        urls.push(NEW_TAB_URL.to_string());
    }
    urls
}

fn default_suggestions(title: &str) -> Vec<String> {
    vec![
        build_search_url(title, SearchEngine::Google),
        NEW_TAB_URL.to_string(),
        NEW_TAB_URL.to_string(),
    ]
}

/// Companion sites for well-known source domains
fn contextual_suggestions(source_url: &str, title: &str) -> Vec<String> {
    let Some(host) = hostname(source_url) else {
        return default_suggestions(title);
    };

    if host.contains("github.com") {
        vec![
            "https://stackoverflow.com".to_string(),
            "https://developer.mozilla.org".to_string(),
            NEW_TAB_URL.to_string(),
        ]
    } else if host.contains("stackoverflow.com") {
        vec![
            "https://github.com".to_string(),
            "https://developer.mozilla.org".to_string(),
            NEW_TAB_URL.to_string(),
        ]
    } else if host.contains("amazon.com") || host.contains("shopping") {
        vec![
            format!(
                "https://www.google.com/search?tbm=shop&q={}",
                encode_component(title)
            ),
            "https://www.ebay.com".to_string(),
            NEW_TAB_URL.to_string(),
        ]
    } else if host.contains("wikipedia.org") {
        vec![
            build_search_url(title, SearchEngine::Google),
            "https://scholar.google.com".to_string(),
            NEW_TAB_URL.to_string(),
        ]
    } else {
        default_suggestions(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_quick_modes;
    use crate::tab_data::TabInfo;

    fn request(split_count: u32, mode: Option<Mode>, explicit: Option<Vec<String>>) -> SplitRequest {
        SplitRequest {
            source_tab: TabInfo::new(
                1,
                "https://example.com/article".to_string(),
                "Rust patterns".to_string(),
                1,
                5,
            ),
            split_count,
            mode,
            explicit_urls: explicit,
            placement: None,
            group: None,
            pin_important: None,
        }
    }

    #[test]
    fn test_explicit_urls_win() {
        let req = request(
            2,
            Some(Mode::Work),
            Some(vec!["https://example.com".to_string()]),
        );

        let urls = resolve(&req, &default_quick_modes(), true);
        assert_eq!(urls, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_work_mode_trims_to_count() {
        let req = request(3, Some(Mode::Work), None);

        let urls = resolve(&req, &default_quick_modes(), true);
        assert_eq!(
            urls,
            vec![
                "https://mail.google.com".to_string(),
                "https://calendar.google.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_mode_pads_with_new_tabs() {
        let req = request(6, Some(Mode::Work), None);

        let urls = resolve(&req, &default_quick_modes(), true);
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[3], NEW_TAB_URL);
        assert_eq!(urls[4], NEW_TAB_URL);
    }

    #[test]
    fn test_title_substitution_is_encoded() {
        let req = request(2, Some(Mode::Research), None);

        let urls = resolve(&req, &default_quick_modes(), true);
        assert_eq!(urls[0], "https://www.google.com/search?q=Rust%20patterns");
    }

    #[test]
    fn test_unknown_mode_falls_back_to_suggestions() {
        let req = request(2, Some(Mode::Custom("focus".to_string())), None);

        let urls = resolve(&req, &default_quick_modes(), false);
        assert_eq!(urls, vec!["https://www.google.com/search?q=Rust%20patterns"]);
    }

    #[test]
    fn test_contextual_suggestions_for_github() {
        let mut req = request(3, None, None);
        req.source_tab.url = "https://github.com/rust-lang/rust".to_string();

        let urls = resolve(&req, &default_quick_modes(), true);
        assert_eq!(
            urls,
            vec![
                "https://stackoverflow.com".to_string(),
                "https://developer.mozilla.org".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolver_is_total_over_counts() {
        let modes = default_quick_modes();
        for count in 2..=8 {
            let req = request(count, Some(Mode::Development), None);
            assert_eq!(resolve(&req, &modes, true).len(), (count - 1) as usize);

            let req = request(count, None, None);
            assert_eq!(resolve(&req, &modes, false).len(), (count - 1) as usize);
        }
    }
}
