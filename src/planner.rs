/// Split planning: request validation and per-tab creation parameters
use std::collections::HashMap;

use thiserror::Error;

use crate::domain::is_valid_url;
use crate::resolver;
use crate::settings::Settings;
use crate::tab_data::{Mode, Placement, PlannedTab, QuickMode, SplitRequest};

/// Domains pinned when important-tab pinning is in effect
const IMPORTANT_DOMAINS: [&str; 3] = ["mail.google.com", "gmail.com", "calendar.google.com"];

/// Request rejections, raised before any browser API call
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("split count must be at least 2, got {0}")]
    SplitCountTooSmall(u32),
    #[error("source tab URL does not parse: {0}")]
    InvalidSourceUrl(String),
    #[error("expected {expected} explicit URLs, got {actual}")]
    ExplicitUrlCountMismatch { expected: usize, actual: usize },
    #[error("explicit URL does not parse: {0}")]
    InvalidExplicitUrl(String),
}

/// Reject malformed requests before anything touches the browser
pub fn validate(request: &SplitRequest) -> Result<(), SplitError> {
    if request.split_count < 2 {
        return Err(SplitError::SplitCountTooSmall(request.split_count));
    }
    if !is_valid_url(&request.source_tab.url) {
        return Err(SplitError::InvalidSourceUrl(request.source_tab.url.clone()));
    }
    if let Some(explicit) = &request.explicit_urls {
        let expected = (request.split_count - 1) as usize;
        if explicit.len() != expected {
            return Err(SplitError::ExplicitUrlCountMismatch {
                expected,
                actual: explicit.len(),
            });
        }
        for url in explicit {
            if !is_valid_url(url) {
                return Err(SplitError::InvalidExplicitUrl(url.clone()));
            }
        }
    }
    Ok(())
}

/// Compute the ordered creation parameters for a validated request
///
/// Exactly `split_count - 1` entries; only the first is active.
pub fn plan(
    request: &SplitRequest,
    settings: &Settings,
    quick_modes: &HashMap<Mode, QuickMode>,
) -> Result<Vec<PlannedTab>, SplitError> {
    validate(request)?;

    let urls = resolver::resolve(request, quick_modes, settings.smart_suggestions);
    let placement = request.placement.unwrap_or(settings.tab_position);
    let pinning = pinning_enabled(request, settings);
    let source = &request.source_tab;

    Ok(urls
        .into_iter()
        .enumerate()
        .map(|(position, url)| {
            let index = match placement {
                Placement::After => Some(source.index + position as i32 + 1),
                Placement::Before => Some(source.index + position as i32),
                Placement::End => None,
            };
            let pinned = pinning && is_important_url(&url);
            PlannedTab {
                url,
                window_id: source.window_id,
                index,
                active: position == 0,
                pinned,
            }
        })
        .collect())
}

/// A per-request flag wins; otherwise work mode or the global setting
pub fn pinning_enabled(request: &SplitRequest, settings: &Settings) -> bool {
    request
        .pin_important
        .unwrap_or(request.mode == Some(Mode::Work) || settings.pin_important_tabs)
}

/// A per-request flag wins; otherwise the `autoGroupTabs` setting
pub fn grouping_enabled(request: &SplitRequest, settings: &Settings) -> bool {
    request.group.unwrap_or(settings.auto_group_tabs)
}

fn is_important_url(url: &str) -> bool {
    IMPORTANT_DOMAINS.iter().any(|domain| url.contains(domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_quick_modes;
    use crate::tab_data::TabInfo;

    fn request(split_count: u32) -> SplitRequest {
        SplitRequest {
            source_tab: TabInfo::new(
                10,
                "https://example.com".to_string(),
                "Example".to_string(),
                1,
                5,
            ),
            split_count,
            mode: None,
            explicit_urls: None,
            placement: None,
            group: None,
            pin_important: None,
        }
    }

    #[test]
    fn test_plan_places_after_source() {
        let mut req = request(2);
        req.explicit_urls = Some(vec!["https://example.com".to_string()]);

        let plan = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].index, Some(6));
        assert!(plan[0].active);
        assert!(!plan[0].pinned);
        assert_eq!(plan[0].window_id, 1);
    }

    #[test]
    fn test_plan_before_and_end_placement() {
        let mut req = request(3);
        req.placement = Some(Placement::Before);
        let before = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();
        assert_eq!(before[0].index, Some(5));
        assert_eq!(before[1].index, Some(6));

        req.placement = Some(Placement::End);
        let end = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();
        assert_eq!(end[0].index, None);
        assert_eq!(end[1].index, None);
    }

    #[test]
    fn test_plan_only_first_tab_active() {
        let req = request(4);
        let plan = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.iter().filter(|tab| tab.active).count(), 1);
        assert!(plan[0].active);
    }

    #[test]
    fn test_work_mode_pins_important_tabs() {
        let mut req = request(3);
        req.mode = Some(Mode::Work);

        let plan = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();

        // mail.google.com and calendar.google.com are both on the allowlist
        assert!(plan[0].pinned);
        assert!(plan[1].pinned);
    }

    #[test]
    fn test_request_flag_overrides_work_mode_pinning() {
        let mut req = request(3);
        req.mode = Some(Mode::Work);
        req.pin_important = Some(false);

        let plan = plan(&req, &Settings::default(), &default_quick_modes()).unwrap();
        assert!(plan.iter().all(|tab| !tab.pinned));
    }

    #[test]
    fn test_setting_enables_pinning_without_work_mode() {
        let mut req = request(2);
        req.explicit_urls = Some(vec!["https://calendar.google.com".to_string()]);
        let mut settings = Settings::default();
        settings.pin_important_tabs = true;

        let plan = plan(&req, &settings, &default_quick_modes()).unwrap();
        assert!(plan[0].pinned);
    }

    #[test]
    fn test_grouping_precedence() {
        let mut settings = Settings::default();
        settings.auto_group_tabs = false;

        let mut req = request(2);
        assert!(!grouping_enabled(&req, &settings));

        req.group = Some(true);
        assert!(grouping_enabled(&req, &settings));
    }

    #[test]
    fn test_validate_rejects_small_count() {
        let req = request(1);
        assert_eq!(validate(&req), Err(SplitError::SplitCountTooSmall(1)));
    }

    #[test]
    fn test_validate_rejects_bad_source_url() {
        let mut req = request(2);
        req.source_tab.url = "not a url".to_string();

        assert!(matches!(
            validate(&req),
            Err(SplitError::InvalidSourceUrl(_))
        ));
    }

    #[test]
    fn test_validate_rejects_count_mismatch() {
        let mut req = request(3);
        req.explicit_urls = Some(vec!["https://example.com".to_string()]);

        assert_eq!(
            validate(&req),
            Err(SplitError::ExplicitUrlCountMismatch {
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_validate_rejects_malformed_explicit_url() {
        let mut req = request(2);
        req.explicit_urls = Some(vec!["definitely not a url".to_string()]);

        assert!(matches!(
            validate(&req),
            Err(SplitError::InvalidExplicitUrl(_))
        ));
    }
}
