/// Settings resolution: versioned defaults, merge, legacy migration
use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain;
use crate::tab_data::{FavoriteUrl, Mode, Placement, QuickMode};

/// Top-level sync-storage key holding the settings record
pub const SETTINGS_KEY: &str = "settings";
/// Pre-1.0 sync-storage key; its presence without `settings` triggers migration
pub const LEGACY_PREFS_KEY: &str = "splitTabPreferences";
/// Top-level sync-storage key holding the quick-mode table
pub const QUICK_MODES_KEY: &str = "quickModes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// Complete user preference record
///
/// Deserializing a partial stored record merges it over the defaults
/// key-by-key; nested sequences and maps are replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_split_count: u32,
    pub auto_group_tabs: bool,
    pub tab_position: Placement,
    pub show_notifications: bool,
    pub animation_speed: AnimationSpeed,
    pub theme: Theme,
    pub enable_quick_modes: bool,
    #[serde(deserialize_with = "deserialize_favorites")]
    pub favorite_urls: Vec<FavoriteUrl>,
    pub keyboard_shortcuts_enabled: bool,
    pub custom_shortcuts: HashMap<String, String>,
    pub smart_suggestions: bool,
    pub context_menu_enabled: bool,
    pub pin_important_tabs: bool,
    pub track_usage: bool,
    pub share_anonymous_stats: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            default_split_count: 2,
            auto_group_tabs: true,
            tab_position: Placement::After,
            show_notifications: true,
            animation_speed: AnimationSpeed::Normal,
            theme: Theme::Auto,
            enable_quick_modes: true,
            favorite_urls: default_favorites(),
            keyboard_shortcuts_enabled: true,
            custom_shortcuts: HashMap::new(),
            smart_suggestions: true,
            context_menu_enabled: true,
            pin_important_tabs: false,
            track_usage: true,
            share_anonymous_stats: false,
        }
    }
}

fn default_favorites() -> Vec<FavoriteUrl> {
    [
        "https://mail.google.com",
        "https://calendar.google.com",
        "https://drive.google.com",
        "https://github.com",
        "https://stackoverflow.com",
    ]
    .iter()
    .map(|url| FavoriteUrl {
        url: url.to_string(),
        title: favorite_title(url),
        added_at: 0.0,
    })
    .collect()
}

/// Display name for a favorite: leading hostname label, `www.` stripped
fn favorite_title(url: &str) -> String {
    match domain::hostname(url) {
        Some(host) => {
            let trimmed = host.strip_prefix("www.").unwrap_or(&host);
            trimmed.split('.').next().unwrap_or(trimmed).to_string()
        }
        None => "Custom Site".to_string(),
    }
}

/// Stored favorites may be pre-migration bare URL strings
fn deserialize_favorites<'de, D>(deserializer: D) -> Result<Vec<FavoriteUrl>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Full(FavoriteUrl),
        Bare(String),
    }

    let entries = Vec::<Entry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Full(favorite) => favorite,
            Entry::Bare(url) => FavoriteUrl {
                title: favorite_title(&url),
                url,
                added_at: 0.0,
            },
        })
        .collect())
}

impl Settings {
    /// Merge a possibly-partial stored record over the defaults
    ///
    /// Total: a missing or non-object record yields the full defaults.
    /// Stored values win key-by-key; a key whose value does not decode
    /// is dropped without discarding its valid siblings.
    pub fn effective(stored: Option<&Value>) -> Settings {
        let Some(Value::Object(stored)) = stored else {
            return Settings::default();
        };
        let mut record = match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => return Settings::default(),
        };

        for (key, value) in stored {
            let previous = record.insert(key.clone(), value.clone());
            if serde_json::from_value::<Settings>(Value::Object(record.clone())).is_err() {
                match previous {
                    Some(prev) => record.insert(key.clone(), prev),
                    None => record.remove(key),
                };
            }
        }

        serde_json::from_value(Value::Object(record)).unwrap_or_default()
    }

    /// Append a favorite unless its URL is already present
    ///
    /// Returns whether the list changed.
    pub fn add_favorite(&mut self, url: &str, title: Option<&str>, now_ms: f64) -> bool {
        if self.favorite_urls.iter().any(|fav| fav.url == url) {
            return false;
        }

        self.favorite_urls.push(FavoriteUrl {
            url: url.to_string(),
            title: title
                .map(|t| t.to_string())
                .unwrap_or_else(|| favorite_title(url)),
            added_at: now_ms,
        });
        true
    }

    /// Remove a favorite by URL; returns whether anything was removed
    pub fn remove_favorite(&mut self, url: &str) -> bool {
        let before = self.favorite_urls.len();
        self.favorite_urls.retain(|fav| fav.url != url);
        self.favorite_urls.len() < before
    }
}

/// The shipped quick-mode table
pub fn default_quick_modes() -> HashMap<Mode, QuickMode> {
    let mut modes = HashMap::new();
    modes.insert(
        Mode::Research,
        QuickMode {
            name: "Research Mode".to_string(),
            icon: "🔍".to_string(),
            urls: vec![
                "https://www.google.com/search?q={{title}}".to_string(),
                "https://scholar.google.com".to_string(),
                "chrome://newtab/".to_string(),
            ],
        },
    );
    modes.insert(
        Mode::Shopping,
        QuickMode {
            name: "Shopping Mode".to_string(),
            icon: "🛒".to_string(),
            urls: vec![
                "https://www.google.com/search?tbm=shop&q={{title}}".to_string(),
                "https://www.amazon.com".to_string(),
                "https://www.ebay.com".to_string(),
            ],
        },
    );
    modes.insert(
        Mode::Work,
        QuickMode {
            name: "Work Mode".to_string(),
            icon: "💼".to_string(),
            urls: vec![
                "https://mail.google.com".to_string(),
                "https://calendar.google.com".to_string(),
                "https://drive.google.com".to_string(),
            ],
        },
    );
    modes.insert(
        Mode::Social,
        QuickMode {
            name: "Social Mode".to_string(),
            icon: "📱".to_string(),
            urls: vec![
                "https://twitter.com".to_string(),
                "https://www.linkedin.com".to_string(),
                "https://www.facebook.com".to_string(),
            ],
        },
    );
    modes.insert(
        Mode::Development,
        QuickMode {
            name: "Development Mode".to_string(),
            icon: "👨‍💻".to_string(),
            urls: vec![
                "https://github.com".to_string(),
                "https://stackoverflow.com".to_string(),
                "https://developer.mozilla.org".to_string(),
            ],
        },
    );
    modes
}

/// Stored quick-mode table, or the shipped defaults
///
/// A stored table replaces the defaults wholesale; modes are not merged
/// entry-by-entry.
pub fn effective_quick_modes(stored: Option<&Value>) -> HashMap<Mode, QuickMode> {
    stored
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_else(default_quick_modes)
}

/// One-time migration of the pre-1.0 preference shape
///
/// Fires only when the legacy key is present and the new settings key is
/// absent, so re-running it is a no-op (`changed = false`).
pub fn migrate_legacy(sync_store: &Value) -> (Settings, bool) {
    if let Some(current) = sync_store.get(SETTINGS_KEY) {
        return (Settings::effective(Some(current)), false);
    }

    let Some(old_prefs) = sync_store.get(LEGACY_PREFS_KEY) else {
        return (Settings::default(), false);
    };

    let mut settings = Settings::default();
    if let Some(count) = old_prefs.get("defaultSplit").and_then(Value::as_u64) {
        settings.default_split_count = count as u32;
    }
    // `autoGroup !== false` in the old shape
    settings.auto_group_tabs = old_prefs.get("autoGroup").and_then(Value::as_bool) != Some(false);
    if let Some(urls) = old_prefs.get("favoriteUrls").and_then(Value::as_array) {
        settings.favorite_urls = urls
            .iter()
            .filter_map(Value::as_str)
            .map(|url| FavoriteUrl {
                url: url.to_string(),
                title: favorite_title(url),
                added_at: 0.0,
            })
            .collect();
    }

    (settings, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_empty_is_total() {
        let settings = Settings::effective(Some(&json!({})));

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_split_count, 2);
        assert_eq!(settings.favorite_urls.len(), 5);
    }

    #[test]
    fn test_effective_partial_preserves_stored_keys() {
        let settings = Settings::effective(Some(&json!({ "defaultSplitCount": 5 })));

        assert_eq!(settings.default_split_count, 5);
        assert_eq!(settings.auto_group_tabs, true);
        assert_eq!(settings.tab_position, Placement::After);
        assert_eq!(settings.favorite_urls.len(), 5);
    }

    #[test]
    fn test_effective_replaces_nested_lists_wholesale() {
        let settings = Settings::effective(Some(&json!({
            "favoriteUrls": [{ "url": "https://example.com", "title": "Example" }]
        })));

        assert_eq!(settings.favorite_urls.len(), 1);
        assert_eq!(settings.favorite_urls[0].url, "https://example.com");
    }

    #[test]
    fn test_effective_undecodable_falls_back_to_defaults() {
        let settings = Settings::effective(Some(&json!({ "defaultSplitCount": "three" })));
        assert_eq!(settings, Settings::default());

        let settings = Settings::effective(Some(&json!("not a record")));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_effective_bad_key_keeps_valid_siblings() {
        let settings = Settings::effective(Some(&json!({
            "defaultSplitCount": 5,
            "theme": "blue",
            "autoGroupTabs": false,
        })));

        assert_eq!(settings.default_split_count, 5);
        assert_eq!(settings.auto_group_tabs, false);
        assert_eq!(settings.theme, Theme::Auto);
    }

    #[test]
    fn test_effective_coerces_bare_favorite_strings() {
        let settings = Settings::effective(Some(&json!({
            "favoriteUrls": ["https://mail.google.com", "https://github.com"]
        })));

        assert_eq!(settings.favorite_urls.len(), 2);
        assert_eq!(settings.favorite_urls[0].title, "mail");
        assert_eq!(settings.favorite_urls[1].title, "github");
    }

    #[test]
    fn test_add_favorite_appends() {
        let mut settings = Settings::default();
        let changed = settings.add_favorite("https://news.ycombinator.com", None, 1000.0);

        assert!(changed);
        assert_eq!(settings.favorite_urls.len(), 6);
        let added = settings.favorite_urls.last().unwrap();
        assert_eq!(added.title, "news");
        assert_eq!(added.added_at, 1000.0);
    }

    #[test]
    fn test_add_duplicate_favorite_is_noop() {
        let mut settings = Settings::default();
        let before = settings.favorite_urls.clone();

        let changed = settings.add_favorite("https://github.com", None, 1000.0);

        assert!(!changed);
        assert_eq!(settings.favorite_urls, before);
    }

    #[test]
    fn test_remove_favorite() {
        let mut settings = Settings::default();

        assert!(settings.remove_favorite("https://github.com"));
        assert_eq!(settings.favorite_urls.len(), 4);
        assert!(!settings.remove_favorite("https://github.com"));
    }

    #[test]
    fn test_favorite_title_fallback() {
        assert_eq!(favorite_title("https://www.google.com"), "google");
        assert_eq!(favorite_title("https://mail.google.com"), "mail");
        assert_eq!(favorite_title("not a url"), "Custom Site");
    }

    #[test]
    fn test_default_quick_modes_cover_named_modes() {
        let modes = default_quick_modes();

        assert_eq!(modes.len(), 5);
        assert_eq!(modes[&Mode::Work].urls.len(), 3);
        assert_eq!(modes[&Mode::Work].urls[0], "https://mail.google.com");
        assert!(modes[&Mode::Research].urls[0].contains("{{title}}"));
    }

    #[test]
    fn test_migrate_legacy_maps_old_keys() {
        let store = json!({
            "splitTabPreferences": {
                "defaultSplit": 4,
                "autoGroup": false,
                "favoriteUrls": ["https://mail.google.com"]
            }
        });

        let (settings, changed) = migrate_legacy(&store);

        assert!(changed);
        assert_eq!(settings.default_split_count, 4);
        assert_eq!(settings.auto_group_tabs, false);
        assert_eq!(settings.favorite_urls.len(), 1);
        assert_eq!(settings.favorite_urls[0].title, "mail");
    }

    #[test]
    fn test_migrate_legacy_is_idempotent() {
        let store = json!({
            "splitTabPreferences": { "defaultSplit": 4 }
        });

        let (first, changed) = migrate_legacy(&store);
        assert!(changed);

        // After migration the new settings key is present
        let migrated_store = json!({
            "splitTabPreferences": { "defaultSplit": 4 },
            "settings": serde_json::to_value(&first).unwrap()
        });

        let (second, changed_again) = migrate_legacy(&migrated_store);
        assert!(!changed_again);
        assert_eq!(second, first);
    }

    #[test]
    fn test_migrate_without_legacy_key_is_noop() {
        let (settings, changed) = migrate_legacy(&json!({}));

        assert!(!changed);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_round_trip_uses_storage_shape() {
        let json = serde_json::to_value(Settings::default()).unwrap();

        assert!(json.get("defaultSplitCount").is_some());
        assert!(json.get("autoGroupTabs").is_some());
        assert_eq!(json["tabPosition"], "after");

        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back, Settings::default());
    }
}
