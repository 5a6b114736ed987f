//! Plain-text rendering of the dashboard.

use std::fmt::Write as _;

use crate::dashboard::{DashboardTab, DashboardView};
use crate::domains::chat::{ChatMessage, ChatRole};
use crate::domains::intake::IntakeRecord;
use crate::domains::strategy::{AuditFinding, GrowthStrategy, PlatformIdea, Priority};

const RULE: &str = "------------------------------------------------------------";

/// Badge text per priority; styling only, no ordering weight.
pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "[!! HIGH ]",
        Priority::Medium => "[ ! MEDIUM]",
        Priority::Low => "[   LOW  ]",
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {} ==", title.to_uppercase());
}

pub fn render_audit_section(title: &str, findings: &[AuditFinding]) -> String {
    let mut out = String::new();
    heading(&mut out, title);
    if findings.is_empty() {
        out.push_str("  No issues reported.\n");
        return out;
    }
    for finding in findings {
        let _ = writeln!(out, "{} {}", priority_badge(finding.priority), finding.issue);
        if !finding.impact.is_empty() {
            let _ = writeln!(out, "    Impact: {}", finding.impact);
        }
        if !finding.solution.is_empty() {
            let _ = writeln!(out, "    Recommended Fix: {}", finding.solution);
        }
    }
    out
}

pub fn render_sidebar(intake: &IntakeRecord, strategy: &GrowthStrategy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{} | {} blueprint | Health Score {}/100",
        intake.business_name,
        strategy.kind.as_str().to_uppercase(),
        strategy.display_score()
    );
    if !strategy.daily_metrics.is_empty() {
        out.push_str("Daily targets:\n");
        for metric in &strategy.daily_metrics {
            let _ = writeln!(out, "  - {}: {}", metric.metric_name, metric.target_value);
        }
    }
    let _ = writeln!(out, "{RULE}");
    out
}

pub fn render_audit(strategy: &GrowthStrategy) -> String {
    [
        render_audit_section("On-Page SEO", &strategy.on_page_audit),
        render_audit_section("Technical Performance", &strategy.technical_audit),
        render_audit_section("Conversion & Trust", &strategy.conversion_audit),
        render_audit_section("Off-Page Signals", &strategy.off_page_audit),
    ]
    .concat()
}

pub fn render_priorities(strategy: &GrowthStrategy) -> String {
    let mut out = String::new();
    heading(&mut out, "Top Priority Fixes");
    for (index, fix) in strategy.top_priority_fixes.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, fix);
    }
    out
}

fn render_platform(out: &mut String, platform: &PlatformIdea) {
    let _ = writeln!(out, "\n  # {}", platform.platform);
    if !platform.reasoning.is_empty() {
        let _ = writeln!(out, "    {}", platform.reasoning);
    }
    if !platform.content_ideas.is_empty() {
        out.push_str("    Content ideas:\n");
        for idea in &platform.content_ideas {
            let _ = writeln!(out, "      * {idea}");
        }
    }
    if !platform.engagement_tactics.is_empty() {
        out.push_str("    Engagement tactics:\n");
        for tactic in &platform.engagement_tactics {
            let _ = writeln!(out, "      * {tactic}");
        }
    }
}

pub fn render_ads(strategy: &GrowthStrategy) -> String {
    let ads = &strategy.ad_social_strategy;
    let mut out = String::new();
    heading(&mut out, "Ad & Social Strategy");
    if !ads.overall_tone.is_empty() {
        let _ = writeln!(out, "  Brand Tone: {}", ads.overall_tone);
    }
    if !ads.paid_ad_focus.is_empty() {
        let _ = writeln!(out, "  Paid Ad Focus: \"{}\"", ads.paid_ad_focus);
    }
    for platform in &ads.platform_suggestions {
        render_platform(&mut out, platform);
    }

    let market = &strategy.market_analysis;
    if !market.competitor_insights.is_empty() || !market.platform_priority.is_empty() {
        heading(&mut out, "Market Analysis");
        if !market.competitor_insights.is_empty() {
            let _ = writeln!(out, "  {}", market.competitor_insights);
        }
        for entry in &market.platform_priority {
            let _ = writeln!(out, "  - {}: {}", entry.platform, entry.ranking_tips);
        }
    }
    out
}

pub fn render_roadmap(strategy: &GrowthStrategy, view: &DashboardView) -> String {
    let mut out = String::new();
    heading(&mut out, "Fix Roadmap");
    let _ = writeln!(
        out,
        "  Progress: {}% ({} of {} tasks)",
        view.progress_percent(strategy),
        view.completed_count(),
        strategy.roadmap.len()
    );
    let mut phase = None;
    for (index, task) in strategy.roadmap.iter().enumerate() {
        if phase != Some(task.phase) {
            phase = Some(task.phase);
            let _ = writeln!(out, "\n  Phase {}", task.phase);
        }
        let mark = if view.is_completed(index) { "x" } else { " " };
        let _ = writeln!(
            out,
            "  [{mark}] {}. Day {}: {}",
            index + 1,
            task.day,
            task.title
        );
        if !task.description.is_empty() {
            let _ = writeln!(out, "        {}", task.description);
        }
        if !task.goal.is_empty() {
            let _ = writeln!(out, "        Goal: {}", task.goal);
        }
        if !task.creative_focus.is_empty() {
            let _ = writeln!(out, "        Creative focus: {}", task.creative_focus);
        }
        if let Some(why) = task.why_it_matters.as_deref().filter(|w| !w.is_empty()) {
            let _ = writeln!(out, "        Why it matters: {why}");
        }
    }
    out
}

pub fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "You",
        ChatRole::Advisor => "Advisor",
    };
    format!("{speaker}: {}", message.text)
}

pub fn render_chat(history: &[ChatMessage]) -> String {
    let mut out = String::new();
    heading(&mut out, "Live Support");
    for message in history {
        let _ = writeln!(out, "{}\n", render_message(message));
    }
    out
}

pub fn render_tab(
    tab: DashboardTab,
    strategy: &GrowthStrategy,
    view: &DashboardView,
    history: &[ChatMessage],
) -> String {
    match tab {
        DashboardTab::Audit => render_audit(strategy),
        DashboardTab::Priority => render_priorities(strategy),
        DashboardTab::Ads => render_ads(strategy),
        DashboardTab::Roadmap => render_roadmap(strategy, view),
        DashboardTab::Consultant => render_chat(history),
    }
}

/// Every tab in order, for one-shot output.
pub fn render_dashboard(intake: &IntakeRecord, strategy: &GrowthStrategy) -> String {
    let view = DashboardView::new();
    let mut out = render_sidebar(intake, strategy);
    for tab in DashboardTab::ALL {
        if tab != DashboardTab::Consultant {
            out.push_str(&render_tab(tab, strategy, &view, &[]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strategy() -> GrowthStrategy {
        GrowthStrategy::from_value(json!({
            "type": "social",
            "healthScore": 38,
            "onPageAudit": [],
            "technicalAudit": [
                {"issue": "No profile links", "impact": "Lost clicks", "solution": "Add link hub", "priority": "HIGH"}
            ],
            "topPriorityFixes": ["Claim handles", "Post daily"],
            "roadmap": [
                {"day": 1, "phase": 1, "title": "Claim handles", "goal": "Presence"},
                {"day": 2, "phase": 2, "title": "First reel", "whyItMatters": "Reach"}
            ],
            "adSocialStrategy": {
                "overallTone": "Playful",
                "paidAdFocus": "Retarget engagers",
                "platformSuggestions": [
                    {"platform": "TikTok", "reasoning": "Gen Z", "contentIdeas": ["ASMR unboxing"], "engagementTactics": ["Reply with video"]}
                ]
            },
            "dailyMetrics": [{"metricName": "Followers", "targetValue": "+20"}]
        }))
        .unwrap()
    }

    fn intake() -> IntakeRecord {
        IntakeRecord {
            business_name: "Nexus Labs".to_string(),
            ..IntakeRecord::default()
        }
    }

    #[test]
    fn dashboard_covers_every_section() {
        let text = render_dashboard(&intake(), &strategy());
        assert!(text.contains("Nexus Labs | SOCIAL blueprint | Health Score 38/100"));
        assert!(text.contains("Followers: +20"));
        assert!(text.contains("[!! HIGH ] No profile links"));
        assert!(text.contains("OFF-PAGE SIGNALS"));
        assert!(text.contains("No issues reported."));
        assert!(text.contains("  2. Post daily"));
        assert!(text.contains("* ASMR unboxing"));
        assert!(text.contains("Why it matters: Reach"));
        assert!(!text.contains("MARKET ANALYSIS"));
    }

    #[test]
    fn roadmap_marks_completed_tasks() {
        let strategy = strategy();
        let mut view = DashboardView::new();
        view.toggle_task(&strategy, 1).unwrap();
        let text = render_roadmap(&strategy, &view);
        assert!(text.contains("Progress: 50% (1 of 2 tasks)"));
        assert!(text.contains("[x] 2. Day 2: First reel"));
        assert!(text.contains("[ ] 1. Day 1: Claim handles"));
        assert!(text.contains("Phase 2"));
    }

    #[test]
    fn chat_lines_name_the_speaker() {
        let history = vec![ChatMessage::advisor("Hello"), ChatMessage::user("Hi")];
        let text = render_chat(&history);
        assert!(text.contains("Advisor: Hello"));
        assert!(text.contains("You: Hi"));
    }
}
