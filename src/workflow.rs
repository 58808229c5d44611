/// Split workflow orchestration: Requested -> TabsCreated -> Organized -> Recorded
use std::collections::HashMap;

use crate::bridge;
use crate::classifier;
use crate::planner;
use crate::settings::Settings;
use crate::storage::{UsageEvent, epoch_day_from_ms};
use crate::tab_data::{
    GroupLabel, Mode, Placement, QuickMode, SessionConfig, SessionStatus, SplitRequest,
    SplitSession, TabInfo,
};

/// Phases of one split; organize failures jump straight to Recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPhase {
    Requested,
    TabsCreated,
    Organized,
    Recorded,
}

/// Outcome of the grouping step; logged and discarded, never propagated
#[derive(Debug, Clone, PartialEq)]
pub enum GroupStatus {
    Grouped { group_id: i32, label: GroupLabel },
    Disabled,
    Unavailable,
    Failed(String),
}

/// Per-step statuses of the best-effort organize phase
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizeReport {
    pub group: GroupStatus,
    pub pinned_tabs: usize,
    pub errors: Vec<String>,
}

/// Request for a fixed-count split with default suggestions
pub fn quick_split_request(tab: TabInfo, split_count: u32) -> SplitRequest {
    SplitRequest {
        source_tab: tab,
        split_count,
        mode: None,
        explicit_urls: None,
        placement: None,
        group: None,
        pin_important: None,
    }
}

/// Request for a quick-mode split; the count covers all mode templates
pub fn quick_mode_request(
    tab: TabInfo,
    mode: Mode,
    quick_modes: &HashMap<Mode, QuickMode>,
) -> SplitRequest {
    let split_count = quick_modes
        .get(&mode)
        .map(|quick| quick.urls.len() as u32 + 1)
        .unwrap_or(3);

    SplitRequest {
        source_tab: tab,
        split_count,
        mode: Some(mode),
        explicit_urls: None,
        placement: None,
        group: None,
        pin_important: None,
    }
}

/// Session record for a completed split
pub fn build_session(
    request: &SplitRequest,
    created: &[TabInfo],
    placement: Placement,
    grouped: bool,
    now_ms: f64,
) -> SplitSession {
    SplitSession {
        id: SplitSession::generate_id(now_ms),
        source_tab: request.source_tab.clone(),
        created_tabs: created.to_vec(),
        config: SessionConfig {
            split_count: request.split_count,
            mode: request.mode.clone(),
            placement,
            grouped,
        },
        created_at: now_ms,
        status: SessionStatus::Active,
    }
}

/// Run one split end to end
///
/// Fails only before any tab exists (invalid request, or not a single
/// tab could be created). Once tabs exist, organization and recording
/// are best-effort: their failures are logged and the created tabs are
/// never rolled back.
pub async fn execute_split(request: SplitRequest) -> Result<SplitSession, String> {
    let settings = bridge::load_settings().await;
    let quick_modes = bridge::load_quick_modes().await;

    let plan = planner::plan(&request, &settings, &quick_modes).map_err(|e| e.to_string())?;
    log::info!(
        "{:?}: {} new tabs for {}",
        SplitPhase::Requested,
        plan.len(),
        request.source_tab.url
    );

    let mut created: Vec<TabInfo> = Vec::new();
    let mut pin_flags: Vec<bool> = Vec::new();
    for planned in &plan {
        match bridge::create_tab(planned).await {
            Ok(tab) => {
                created.push(tab);
                pin_flags.push(planned.pinned);
            }
            Err(e) if created.is_empty() => return Err(e),
            Err(e) => log::warn!("Skipping tab {}: {}", planned.url, e),
        }
    }
    log::debug!("{:?}: {} tabs", SplitPhase::TabsCreated, created.len());

    let report = organize(&request, &settings, &created, &pin_flags).await;
    if let GroupStatus::Failed(reason) = &report.group {
        log::warn!("Grouping failed: {}", reason);
    }
    for error in &report.errors {
        log::warn!("Organize step failed: {}", error);
    }
    log::debug!(
        "{:?}: group {:?}, {} pinned",
        SplitPhase::Organized,
        report.group,
        report.pinned_tabs
    );

    let now_ms = js_sys::Date::now();
    let placement = request.placement.unwrap_or(settings.tab_position);
    let grouped = matches!(report.group, GroupStatus::Grouped { .. });
    let session = build_session(&request, &created, placement, grouped, now_ms);
    record(&request, &settings, &session, now_ms).await;
    log::info!("{:?}: session {}", SplitPhase::Recorded, session.id);

    Ok(session)
}

/// Group and pin the created tabs, collecting statuses instead of errors
async fn organize(
    request: &SplitRequest,
    settings: &Settings,
    created: &[TabInfo],
    pin_flags: &[bool],
) -> OrganizeReport {
    let mut report = OrganizeReport {
        group: GroupStatus::Disabled,
        pinned_tabs: 0,
        errors: Vec::new(),
    };

    if planner::grouping_enabled(request, settings) {
        report.group = if !bridge::tab_groups_available() {
            GroupStatus::Unavailable
        } else {
            let mut all_tabs = vec![request.source_tab.clone()];
            all_tabs.extend(created.iter().cloned());
            let label = classifier::classify(&all_tabs, request.mode.as_ref());
            let ids: Vec<i32> = all_tabs.iter().map(|tab| tab.id).collect();

            match bridge::group_tabs(&ids).await {
                Ok(group_id) => match bridge::update_group(group_id, &label).await {
                    Ok(()) => GroupStatus::Grouped { group_id, label },
                    Err(e) => GroupStatus::Failed(e),
                },
                Err(e) => GroupStatus::Failed(e),
            }
        };
    }

    for (tab, pin) in created.iter().zip(pin_flags) {
        if *pin {
            match bridge::set_tab_pinned(tab.id, true).await {
                Ok(()) => report.pinned_tabs += 1,
                Err(e) => report.errors.push(e),
            }
        }
    }

    report
}

/// Append the session record and bump usage counters; storage failures
/// here are logged and swallowed
async fn record(request: &SplitRequest, settings: &Settings, session: &SplitSession, now_ms: f64) {
    let mut sessions = bridge::load_sessions().await;
    sessions.push(session.clone());
    if let Err(e) = bridge::save_sessions(&sessions).await {
        log::warn!("Failed to record session: {}", e);
    }

    if !settings.track_usage {
        return;
    }

    let mut stats = bridge::load_usage_stats().await;
    stats.record_split(
        request.split_count,
        request.mode.as_ref(),
        epoch_day_from_ms(now_ms),
    );
    if let Err(e) = bridge::save_usage_stats(&stats).await {
        log::warn!("Failed to update usage stats: {}", e);
    }

    let mut usage_log = bridge::load_usage_log().await;
    usage_log.push(UsageEvent {
        timestamp_ms: now_ms,
        split_count: request.split_count,
        mode: request.mode.clone(),
        source_url: request.source_tab.url.clone(),
        target_urls: session.created_tabs.iter().map(|t| t.url.clone()).collect(),
    });
    if let Err(e) = bridge::save_usage_log(&usage_log).await {
        log::warn!("Failed to append usage event: {}", e);
    }
}

/// Close a recorded session's tabs and mark the session closed
pub async fn close_session(session_id: &str) -> Result<bool, String> {
    let mut sessions = bridge::load_sessions().await;
    let Some(tab_ids) = sessions.close(session_id) else {
        return Ok(false);
    };

    if let Err(e) = bridge::remove_tabs(&tab_ids).await {
        log::warn!("Failed to close tabs for {}: {}", session_id, e);
    }

    bridge::save_sessions(&sessions).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_quick_modes;

    fn tab() -> TabInfo {
        TabInfo::new(
            1,
            "https://example.com".to_string(),
            "Example".to_string(),
            2,
            5,
        )
    }

    #[test]
    fn test_quick_split_request() {
        let request = quick_split_request(tab(), 3);

        assert_eq!(request.split_count, 3);
        assert_eq!(request.mode, None);
        assert_eq!(request.explicit_urls, None);
    }

    #[test]
    fn test_quick_mode_request_counts_templates() {
        let request = quick_mode_request(tab(), Mode::Work, &default_quick_modes());

        // 3 work templates plus the source tab
        assert_eq!(request.split_count, 4);
        assert_eq!(request.mode, Some(Mode::Work));
    }

    #[test]
    fn test_quick_mode_request_unknown_mode_defaults() {
        let request = quick_mode_request(
            tab(),
            Mode::Custom("focus".to_string()),
            &default_quick_modes(),
        );

        assert_eq!(request.split_count, 3);
    }

    #[test]
    fn test_build_session_snapshot() {
        let request = quick_mode_request(tab(), Mode::Work, &default_quick_modes());
        let created = vec![
            TabInfo::new(2, "https://mail.google.com".to_string(), String::new(), 2, 6),
            TabInfo::new(
                3,
                "https://calendar.google.com".to_string(),
                String::new(),
                2,
                7,
            ),
        ];

        let session = build_session(&request, &created, Placement::After, true, 1698508200000.0);

        assert_eq!(session.source_tab.id, 1);
        assert_eq!(session.created_tabs.len(), 2);
        assert_eq!(session.config.split_count, 4);
        assert_eq!(session.config.mode, Some(Mode::Work));
        assert!(session.config.grouped);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.id.starts_with("session_1698508200000_"));
    }
}
