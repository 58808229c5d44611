/// Group labeling and tab categorization
use crate::domain::{hostname, second_level_label};
use crate::tab_data::{GroupColor, GroupLabel, Mode, TabInfo};

const PALETTE: [GroupColor; 8] = [
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
    GroupColor::Orange,
];

/// Derive the group title and color for a set of tabs
///
/// Named modes map to fixed labels. Otherwise the title is built from
/// the unique second-level domain labels across the tabs and the color
/// from a stable hash of those labels, so the same domain set always
/// gets the same color.
pub fn classify(tabs: &[TabInfo], mode: Option<&Mode>) -> GroupLabel {
    if let Some(label) = mode.and_then(mode_label) {
        return label;
    }

    let domains = unique_domain_labels(tabs);
    let title = if domains.len() == 1 {
        format!("⚡ {}", domains[0])
    } else {
        format!("⚡ Split ({})", tabs.len())
    };

    GroupLabel::new(title, color_for_domains(&domains))
}

/// Fixed label for a recognized named mode
pub fn mode_label(mode: &Mode) -> Option<GroupLabel> {
    let (title, color) = match mode {
        Mode::Research => ("🔍 Research", GroupColor::Blue),
        Mode::Shopping => ("🛒 Shopping", GroupColor::Green),
        Mode::Work => ("💼 Work", GroupColor::Orange),
        Mode::Social => ("📱 Social", GroupColor::Pink),
        Mode::Development => ("👨‍💻 Dev", GroupColor::Purple),
        Mode::Custom(_) => return None,
    };
    Some(GroupLabel::new(title, color))
}

/// Second-level domain labels across the tabs, first occurrence order
fn unique_domain_labels(tabs: &[TabInfo]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for tab in tabs {
        let label = second_level_label(&tab.url);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Stable color pick: `h = (h << 5) - h + c` over the concatenated
/// labels' UTF-16 units, reduced modulo the palette
fn color_for_domains(domains: &[String]) -> GroupColor {
    let joined = domains.concat();
    let mut hash: i32 = 0;
    for unit in joined.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32);
    }
    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}

/// Buckets a tab falls into for auto-organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabCategory {
    Tools,
    Social,
    Reference,
    Primary,
}

const TOOL_DOMAINS: [&str; 4] = [
    "gmail.com",
    "calendar.google.com",
    "drive.google.com",
    "slack.com",
];

const SOCIAL_DOMAINS: [&str; 4] = [
    "twitter.com",
    "facebook.com",
    "linkedin.com",
    "instagram.com",
];

const REFERENCE_DOMAINS: [&str; 4] = [
    "google.com",
    "bing.com",
    "wikipedia.org",
    "stackoverflow.com",
];

/// Classify a single tab by domain-substring matching
///
/// Tool sites are checked before reference sites, so calendar.google.com
/// lands in Tools even though it also matches google.com.
pub fn categorize(tab: &TabInfo) -> TabCategory {
    let Some(host) = hostname(&tab.url) else {
        return TabCategory::Primary;
    };

    if TOOL_DOMAINS.iter().any(|d| host.contains(d)) {
        return TabCategory::Tools;
    }
    if SOCIAL_DOMAINS.iter().any(|d| host.contains(d)) {
        return TabCategory::Social;
    }
    if REFERENCE_DOMAINS.iter().any(|d| host.contains(d)) {
        return TabCategory::Reference;
    }
    TabCategory::Primary
}

/// Result of bucketing tabs around a single anchor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizedTabs {
    pub anchor: Option<TabInfo>,
    pub tools: Vec<TabInfo>,
    pub social: Vec<TabInfo>,
    pub reference: Vec<TabInfo>,
    /// Primary tabs beyond the first anchor
    pub other: Vec<TabInfo>,
}

/// The first Primary tab becomes the anchor; everything else is bucketed
pub fn auto_organize(tabs: &[TabInfo]) -> OrganizedTabs {
    let mut organized = OrganizedTabs::default();

    for tab in tabs {
        match categorize(tab) {
            TabCategory::Primary if organized.anchor.is_none() => {
                organized.anchor = Some(tab.clone());
            }
            TabCategory::Primary => organized.other.push(tab.clone()),
            TabCategory::Tools => organized.tools.push(tab.clone()),
            TabCategory::Social => organized.social.push(tab.clone()),
            TabCategory::Reference => organized.reference.push(tab.clone()),
        }
    }

    organized
}
