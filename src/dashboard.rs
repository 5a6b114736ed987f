use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domains::strategy::GrowthStrategy;
use crate::error::{GrowthFlowError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DashboardTab {
    #[default]
    Audit,
    Priority,
    Ads,
    Roadmap,
    Consultant,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Audit,
        DashboardTab::Priority,
        DashboardTab::Ads,
        DashboardTab::Roadmap,
        DashboardTab::Consultant,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardTab::Audit => "Technical Audit",
            DashboardTab::Priority => "Top Fixes",
            DashboardTab::Ads => "Ad Strategy",
            DashboardTab::Roadmap => "Fix Roadmap",
            DashboardTab::Consultant => "Live Support",
        }
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for DashboardTab {
    type Err = GrowthFlowError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "audit" => Ok(DashboardTab::Audit),
            "priority" | "fixes" => Ok(DashboardTab::Priority),
            "ads" | "ad" | "social" => Ok(DashboardTab::Ads),
            "roadmap" => Ok(DashboardTab::Roadmap),
            "consultant" | "chat" | "support" => Ok(DashboardTab::Consultant),
            other => Err(GrowthFlowError::Validation(format!("unknown tab: {other}"))),
        }
    }
}

/// View state of the dashboard; lives only as long as the session.
///
/// Completion is keyed by position in the roadmap, so tasks sharing a day
/// are tracked separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub active_tab: DashboardTab,
    completed_tasks: BTreeSet<usize>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, tab: DashboardTab) {
        self.active_tab = tab;
    }

    /// Flips completion for the roadmap task at `index`; returns the new state.
    pub fn toggle_task(&mut self, strategy: &GrowthStrategy, index: usize) -> Result<bool> {
        if index >= strategy.roadmap.len() {
            return Err(GrowthFlowError::Validation(format!(
                "no roadmap task #{}",
                index + 1
            )));
        }
        if self.completed_tasks.remove(&index) {
            Ok(false)
        } else {
            self.completed_tasks.insert(index);
            Ok(true)
        }
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed_tasks.contains(&index)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_tasks.len()
    }

    pub fn progress_percent(&self, strategy: &GrowthStrategy) -> u32 {
        let total = strategy.roadmap.len();
        if total == 0 {
            return 0;
        }
        ((self.completed_count() * 100) / total) as u32
    }
}
