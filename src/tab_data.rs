/// Data structures for the Split Tab extension
use serde::{Deserialize, Serialize};

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: i32,
    /// May be empty while the tab is still loading
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub window_id: i32,
    pub index: i32,
    #[serde(default)]
    pub pinned: bool,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String, window_id: i32, index: i32) -> TabInfo {
        TabInfo {
            id,
            url,
            title,
            window_id,
            index,
            pinned: false,
        }
    }
}

/// A named split preset mapping to a fixed list of destination URLs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    Research,
    Shopping,
    Work,
    Social,
    Development,
    Custom(String),
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Research => "research",
            Mode::Shopping => "shopping",
            Mode::Work => "work",
            Mode::Social => "social",
            Mode::Development => "development",
            Mode::Custom(name) => name,
        }
    }
}

impl From<String> for Mode {
    fn from(name: String) -> Mode {
        match name.as_str() {
            "research" => Mode::Research,
            "shopping" => Mode::Shopping,
            "work" => Mode::Work,
            "social" => Mode::Social,
            "development" => Mode::Development,
            _ => Mode::Custom(name),
        }
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> String {
        mode.as_str().to_string()
    }
}

/// Where new tabs are placed relative to the source tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    After,
    Before,
    End,
}

/// One user-initiated request to split a source tab into `split_count` tabs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    pub source_tab: TabInfo,
    pub split_count: u32,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub explicit_urls: Option<Vec<String>>,
    /// Overrides the `tabPosition` setting when present
    #[serde(default)]
    pub placement: Option<Placement>,
    /// Overrides the `autoGroupTabs` setting when present
    #[serde(default)]
    pub group: Option<bool>,
    /// Overrides the `pinImportantTabs` setting when present
    #[serde(default)]
    pub pin_important: Option<bool>,
}

/// Creation parameters for one planned tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTab {
    pub url: String,
    pub window_id: i32,
    /// `None` lets the browser append at the end of the window
    pub index: Option<i32>,
    pub active: bool,
    pub pinned: bool,
}

/// The 8 colors the tab-group API accepts for generated groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

/// Hard limit the tab-group API puts on group titles
pub const MAX_GROUP_TITLE_CHARS: usize = 16;

/// Title and color for a tab group; derived, never persisted on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLabel {
    pub title: String,
    pub color: GroupColor,
}

impl GroupLabel {
    /// Builds a label, truncating the title to the API limit
    pub fn new(title: impl Into<String>, color: GroupColor) -> GroupLabel {
        let title: String = title.into();
        GroupLabel {
            title: title.chars().take(MAX_GROUP_TITLE_CHARS).collect(),
            color,
        }
    }
}

/// A favorite destination URL kept in settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteUrl {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub added_at: f64,
}

/// A named quick mode: icon plus ordered URL templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickMode {
    pub name: String,
    pub icon: String,
    pub urls: Vec<String>,
}

/// Lifecycle of a recorded split session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Closed,
}

/// Configuration snapshot stored with a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub split_count: u32,
    pub mode: Option<Mode>,
    pub placement: Placement,
    pub grouped: bool,
}

/// Record of one completed split, retained for history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSession {
    pub id: String,
    pub source_tab: TabInfo,
    pub created_tabs: Vec<TabInfo>,
    pub config: SessionConfig,
    pub created_at: f64,
    pub status: SessionStatus,
}

impl SplitSession {
    /// Session ids combine the creation timestamp with a random suffix
    pub fn generate_id(timestamp_ms: f64) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("session_{}_{}", timestamp_ms as u64, &suffix[..9])
    }
}
