/// JS bridge to the browser tab, group, and storage APIs
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use crate::settings::{QUICK_MODES_KEY, SETTINGS_KEY, Settings, effective_quick_modes};
use crate::storage::{SessionStore, UsageLog, UsageStats};
use crate::tab_data::{GroupLabel, Mode, PlannedTab, QuickMode, TabInfo};

/// Local-storage key holding the bounded session history
pub const SESSIONS_KEY: &str = "splitSessions";
/// Local-storage key holding the aggregated usage counters
pub const USAGE_STATS_KEY: &str = "usageStats";
/// Local-storage key holding the raw usage-event log
pub const USAGE_LOG_KEY: &str = "splitUsage";

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn createTab(config: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTabPinned(tab_id: i32, pinned: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateTabGroup(group_id: i32, config: JsValue) -> Result<(), JsValue>;

    fn tabGroupsAvailable() -> bool;

    #[wasm_bindgen(catch)]
    async fn getSyncStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getAllSyncStorage() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getLocalStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setLocalStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Serialize with plain objects for maps so records survive
/// chrome.storage's JSON round trip
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))
}

/// Creation config passed to `chrome.tabs.create`; pinning happens later
/// in the organize step so its failures stay isolated
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTabConfig<'a> {
    url: &'a str,
    window_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<i32>,
    active: bool,
}

pub async fn create_tab(planned: &PlannedTab) -> Result<TabInfo, String> {
    let config = CreateTabConfig {
        url: &planned.url,
        window_id: planned.window_id,
        index: planned.index,
        active: planned.active,
    };
    let config_js = to_js(&config)?;

    let tab_js = createTab(config_js)
        .await
        .map_err(|e| format!("Failed to create tab: {:?}", e))?;
    serde_wasm_bindgen::from_value(tab_js).map_err(|e| format!("Failed to parse tab: {:?}", e))
}

pub async fn set_tab_pinned(tab_id: i32, pinned: bool) -> Result<(), String> {
    updateTabPinned(tab_id, pinned)
        .await
        .map_err(|e| format!("Failed to pin tab {}: {:?}", tab_id, e))
}

pub async fn remove_tabs(tab_ids: &[i32]) -> Result<(), String> {
    let ids_js = to_js(&tab_ids)?;
    removeTabs(ids_js)
        .await
        .map_err(|e| format!("Failed to remove tabs: {:?}", e))
}

pub fn tab_groups_available() -> bool {
    tabGroupsAvailable()
}

pub async fn group_tabs(tab_ids: &[i32]) -> Result<i32, String> {
    let ids_js = to_js(&tab_ids)?;
    let group_id = groupTabs(ids_js)
        .await
        .map_err(|e| format!("Failed to group tabs: {:?}", e))?;
    serde_wasm_bindgen::from_value(group_id)
        .map_err(|e| format!("Failed to parse group id: {:?}", e))
}

pub async fn update_group(group_id: i32, label: &GroupLabel) -> Result<(), String> {
    let label_js = to_js(label)?;
    updateTabGroup(group_id, label_js)
        .await
        .map_err(|e| format!("Failed to update group {}: {:?}", group_id, e))
}

/// Read a local-storage record, falling back to the default on any failure
///
/// Decodes through JSON so stringified numeric map keys (e.g. the
/// splits-by-count counters) round-trip.
async fn get_local_or_default<T: DeserializeOwned + Default>(key: &str) -> T {
    match getLocalStorage(key).await {
        Ok(value) if !value.is_null() && !value.is_undefined() => {
            let json: serde_json::Value =
                serde_wasm_bindgen::from_value(value).unwrap_or(serde_json::Value::Null);
            serde_json::from_value(json).unwrap_or_else(|e| {
                log::warn!("Undecodable record under '{}', using defaults: {}", key, e);
                T::default()
            })
        }
        Ok(_) => T::default(),
        Err(e) => {
            log::warn!("Storage read failed for '{}', using defaults: {:?}", key, e);
            T::default()
        }
    }
}

async fn set_local<T: Serialize>(key: &str, value: &T) -> Result<(), String> {
    let value_js = to_js(value)?;
    setLocalStorage(key, value_js)
        .await
        .map_err(|e| format!("Failed to save '{}': {:?}", key, e))
}

/// Read a sync-storage record as JSON, `None` on absence or failure
async fn get_sync_json(key: &str) -> Option<serde_json::Value> {
    match getSyncStorage(key).await {
        Ok(value) if !value.is_null() && !value.is_undefined() => {
            serde_wasm_bindgen::from_value(value).ok()
        }
        Ok(_) => None,
        Err(e) => {
            log::warn!("Sync storage read failed for '{}': {:?}", key, e);
            None
        }
    }
}

/// Effective settings: stored record merged over the defaults
pub async fn load_settings() -> Settings {
    Settings::effective(get_sync_json(SETTINGS_KEY).await.as_ref())
}

pub async fn save_settings(settings: &Settings) -> Result<(), String> {
    let settings_js = to_js(settings)?;
    setSyncStorage(SETTINGS_KEY, settings_js)
        .await
        .map_err(|e| format!("Failed to save settings: {:?}", e))
}

pub async fn load_quick_modes() -> std::collections::HashMap<Mode, QuickMode> {
    effective_quick_modes(get_sync_json(QUICK_MODES_KEY).await.as_ref())
}

/// Whole sync store as JSON, for legacy-shape migration
pub async fn load_sync_store() -> serde_json::Value {
    match getAllSyncStorage().await {
        Ok(value) if !value.is_null() && !value.is_undefined() => {
            serde_wasm_bindgen::from_value(value).unwrap_or(serde_json::Value::Null)
        }
        Ok(_) => serde_json::Value::Null,
        Err(e) => {
            log::warn!("Sync storage read failed: {:?}", e);
            serde_json::Value::Null
        }
    }
}

pub async fn load_sessions() -> SessionStore {
    get_local_or_default(SESSIONS_KEY).await
}

pub async fn save_sessions(store: &SessionStore) -> Result<(), String> {
    set_local(SESSIONS_KEY, store).await
}

pub async fn load_usage_stats() -> UsageStats {
    get_local_or_default(USAGE_STATS_KEY).await
}

pub async fn save_usage_stats(stats: &UsageStats) -> Result<(), String> {
    set_local(USAGE_STATS_KEY, stats).await
}

pub async fn load_usage_log() -> UsageLog {
    get_local_or_default(USAGE_LOG_KEY).await
}

pub async fn save_usage_log(log: &UsageLog) -> Result<(), String> {
    set_local(USAGE_LOG_KEY, log).await
}
