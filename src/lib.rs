/// Split Tab - Chrome extension core for splitting a tab into grouped tabs
/// Built with Rust + WASM

mod bridge;
mod classifier;
mod domain;
mod planner;
mod resolver;
mod settings;
mod storage;
mod tab_data;
mod workflow;

use wasm_bindgen::prelude::*;

use settings::Settings;
use tab_data::{Mode, SplitRequest, TabInfo};

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| js_error(format!("Invalid {}: {:?}", what, e)))
}

/// Run a full split for a request coming from the popup or a message
#[wasm_bindgen]
pub async fn split_tabs(request: JsValue) -> Result<JsValue, JsValue> {
    let request: SplitRequest = parse(request, "split request")?;
    let session = workflow::execute_split(request).await.map_err(js_error)?;
    bridge::to_js(&session).map_err(js_error)
}

/// Fixed-count split bound to the keyboard shortcuts and context menu
#[wasm_bindgen]
pub async fn quick_split(tab: JsValue, split_count: u32) -> Result<JsValue, JsValue> {
    let tab: TabInfo = parse(tab, "tab")?;
    let request = workflow::quick_split_request(tab, split_count);
    let session = workflow::execute_split(request).await.map_err(js_error)?;
    bridge::to_js(&session).map_err(js_error)
}

/// Quick-mode split bound to the context menu (research, work, ...)
#[wasm_bindgen]
pub async fn quick_mode_split(tab: JsValue, mode: String) -> Result<JsValue, JsValue> {
    let tab: TabInfo = parse(tab, "tab")?;
    let quick_modes = bridge::load_quick_modes().await;
    let request = workflow::quick_mode_request(tab, Mode::from(mode), &quick_modes);
    let session = workflow::execute_split(request).await.map_err(js_error)?;
    bridge::to_js(&session).map_err(js_error)
}

/// Effective settings: stored record merged over the defaults
#[wasm_bindgen]
pub async fn get_settings() -> Result<JsValue, JsValue> {
    let settings = bridge::load_settings().await;
    bridge::to_js(&settings).map_err(js_error)
}

/// Merge a partial settings patch over the current record and persist it
///
/// Read-merge-write on the whole record; concurrent saves are
/// last-write-wins.
#[wasm_bindgen]
pub async fn save_settings(patch: JsValue) -> Result<(), JsValue> {
    let patch: serde_json::Value = parse(patch, "settings patch")?;
    let current = bridge::load_settings().await;
    let mut record = serde_json::to_value(&current).map_err(js_error)?;

    if let (Some(record_obj), Some(patch_obj)) = (record.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            record_obj.insert(key.clone(), value.clone());
        }
    }

    let merged = Settings::effective(Some(&record));
    bridge::save_settings(&merged).await.map_err(js_error)
}

/// Update a single settings key, persisting the whole merged record
#[wasm_bindgen]
pub async fn set_setting(key: String, value: JsValue) -> Result<(), JsValue> {
    let value: serde_json::Value = parse(value, "setting value")?;
    let mut patch = serde_json::Map::new();
    patch.insert(key, value);
    save_settings(bridge::to_js(&serde_json::Value::Object(patch)).map_err(js_error)?).await
}

/// Append a favorite URL; duplicates are a no-op. Returns the favorites.
#[wasm_bindgen]
pub async fn add_favorite_url(url: String, title: Option<String>) -> Result<JsValue, JsValue> {
    let mut settings = bridge::load_settings().await;
    if settings.add_favorite(&url, title.as_deref(), js_sys::Date::now()) {
        bridge::save_settings(&settings).await.map_err(js_error)?;
    }
    bridge::to_js(&settings.favorite_urls).map_err(js_error)
}

/// Remove a favorite URL. Returns the remaining favorites.
#[wasm_bindgen]
pub async fn remove_favorite_url(url: String) -> Result<JsValue, JsValue> {
    let mut settings = bridge::load_settings().await;
    if settings.remove_favorite(&url) {
        bridge::save_settings(&settings).await.map_err(js_error)?;
    }
    bridge::to_js(&settings.favorite_urls).map_err(js_error)
}

/// The quick-mode table: stored record or the shipped defaults
#[wasm_bindgen]
pub async fn get_quick_modes() -> Result<JsValue, JsValue> {
    let quick_modes = bridge::load_quick_modes().await;
    bridge::to_js(&quick_modes).map_err(js_error)
}

/// Condensed usage statistics for the settings page
#[wasm_bindgen]
pub async fn get_usage_stats() -> Result<JsValue, JsValue> {
    let stats = bridge::load_usage_stats().await;
    let usage_log = bridge::load_usage_log().await;
    bridge::to_js(&stats.summary(&usage_log)).map_err(js_error)
}

/// Recorded split sessions, oldest first
#[wasm_bindgen]
pub async fn get_split_sessions() -> Result<JsValue, JsValue> {
    let sessions = bridge::load_sessions().await;
    bridge::to_js(&sessions).map_err(js_error)
}

/// Close a recorded session's tabs; returns whether it was still active
#[wasm_bindgen]
pub async fn close_split_session(session_id: String) -> Result<bool, JsValue> {
    workflow::close_session(&session_id).await.map_err(js_error)
}

/// One-time migration of the pre-1.0 preference shape; idempotent
#[wasm_bindgen]
pub async fn migrate_storage() -> Result<bool, JsValue> {
    let store = bridge::load_sync_store().await;
    let (settings, changed) = settings::migrate_legacy(&store);
    if changed {
        bridge::save_settings(&settings).await.map_err(js_error)?;
        log::info!("Migrated legacy preferences to the settings record");
    }
    Ok(changed)
}
