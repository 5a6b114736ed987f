//! Prompt templates and fixed texts used around the external model.

use crate::domains::intake::IntakeRecord;
use crate::domains::strategy::{GrowthStrategy, StrategyKind};

/// System message for generation calls.
pub const AUDITOR_SYSTEM_PROMPT: &str = "You are a World-Class Technical SEO Auditor and Growth Consultant. \
Respond ONLY with strict JSON matching the requested schema. Do not include markdown or extra text.";

/// Advisor reply substituted when a chat turn fails.
pub const CHAT_FALLBACK_REPLY: &str =
    "Support link briefly interrupted. Re-connecting to your Advisor...";

/// Blocking notice shown when strategy generation fails.
pub const GENERATION_FAILED_NOTICE: &str = "Consultant link failed. Ensure API access is valid.";

pub const INITIAL_STATUS: &str = "Initializing Consultant Engine...";

pub const STATUS_MESSAGES: [&str; 6] = [
    "Performing deep market diagnostics...",
    "Simulating search engine crawlers...",
    "Analyzing competitor authority...",
    "Mapping customer acquisition funnel...",
    "Architecting multi-phase roadmap...",
    "Optimizing daily growth vectors...",
];

const CONSULTANT_CHARTER: &str = r#"YOUR ROLE:
1. Understand the question clearly.
2. Identify the REAL problem behind the question.
3. Guide step-by-step like a human consultant.
4. Use simple, clear, non-technical language.
5. Give practical advice for immediate application.
6. If the question is ambiguous, ask ONE short clarifying question before answering.
7. Correct wrong assumptions politely and logically.
8. Do NOT over-promise results.
9. Focus on solutions that increase traffic, leads, or sales.

GUIDELINES:
- Be calm, professional, and supportive.
- Avoid generic motivational talk.
- Use checklists, steps, and examples.
- If NO website: guide towards a social-media-first strategy.
- If a website exists but has NO traffic: focus on SEO or ads.
- If traffic exists but there are NO sales: focus on conversion and trust issues.
- Budget-aware: low budget = organic; high budget = paid + organic mix.

Response style:
- Short explanation
- Clear steps (numbered or bullet points)
- Actionable next move"#;

fn or_unspecified(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "Not specified"
    } else {
        trimmed
    }
}

/// The steering the prompt asks for; the model's answer is not trusted to follow it.
pub fn expected_kind(intake: &IntakeRecord) -> StrategyKind {
    if intake.is_social_first() {
        StrategyKind::Social
    } else {
        StrategyKind::Seo
    }
}

pub fn generation_prompt(intake: &IntakeRecord) -> String {
    let website_line = match intake.site_url() {
        Some(url) if !intake.is_social_first() => url.to_string(),
        Some(url) => format!("{url} (setup reported as: {})", intake.current_setup),
        None => "None Provided (the client has no website)".to_string(),
    };

    let framing = match expected_kind(intake) {
        StrategyKind::Social => {
            "The client has NO website. Focus on Social SEO and social-first selling \
             (profiles, DMs, WhatsApp, marketplace listings) and set \"type\" to \"social\"."
        }
        StrategyKind::Seo => {
            "The client has a website. Perform a full technical, on-page, off-page and \
             conversion SEO audit of it and set \"type\" to \"seo\"."
        }
    };

    format!(
        r#"Client Details:
- Name: {name}
- Product: {product}
- Target Audience: {audience}
- Target Region: {region}
- Digital Setup: {setup}
- URL: {website}
- Monthly Budget: {budget}
- Problem: {problem}
- Goal: {goal}

TASK:
1. Perform a professional conversion, technical, on-page and off-page audit based on their setup.
2. {framing}
3. Score overall digital health from 0 to 100 in "healthScore".
4. List the most urgent fixes in "topPriorityFixes" and lay out a day-by-day "roadmap" grouped into phases.
5. MANDATORY SECTION: Ad & Social Strategy ("adSocialStrategy").
   - If targeting younger demographics (Gen Z, Millennials) or visual products, suggest platforms like TikTok, Instagram, and Pinterest.
   - Provide specific content ideas (e.g., "Day in the life", "ASMR unboxing").
   - Provide engagement tactics (e.g., "Reply to comments with video", "User-generated content contests").
6. Provide "dailyMetrics" with concrete daily targets scaled to the budget."#,
        name = intake.business_name,
        product = intake.product_type,
        audience = or_unspecified(&intake.target_audience),
        region = or_unspecified(&intake.target_country),
        setup = intake.current_setup,
        website = website_line,
        budget = or_unspecified(&intake.budget),
        problem = intake.current_problem,
        goal = intake.main_goal,
    )
}

pub fn consultant_system_prompt(intake: &IntakeRecord, strategy: &GrowthStrategy) -> String {
    let website = match intake.site_url() {
        Some(url) => format!("YES ({url})"),
        None => "NO".to_string(),
    };

    format!(
        r#"You are a professional senior digital marketing consultant acting as a live chat support agent.
The client may ask ANY question related to digital marketing (SEO, Ads, Sales, Social Media, Budget, Strategy).

Client Context:
- Business Name: {name}
- Product/Service: {product}
- Target Audience: {audience}
- Target Location: {region}
- Digital Setup: {setup}
- Website: {website}
- Monthly Budget: {budget}
- Current Situation/Problem: {problem}
- Strategy Goal: {goal}
- Active Blueprint Type: {kind}

{charter}"#,
        name = intake.business_name,
        product = intake.product_type,
        audience = or_unspecified(&intake.target_audience),
        region = or_unspecified(&intake.target_country),
        setup = intake.current_setup,
        website = website,
        budget = or_unspecified(&intake.budget),
        problem = intake.current_problem,
        goal = intake.main_goal,
        kind = strategy.kind.as_str().to_uppercase(),
        charter = CONSULTANT_CHARTER,
    )
}

pub fn advisor_greeting(intake: &IntakeRecord, strategy: &GrowthStrategy) -> String {
    format!(
        "Hi, I'm your Senior Marketing Advisor. I've finished the deep audit of {}. \
         Your Health Score is {}/100. How can I help you dominate your market today? \
         Ask me about specific fixes, ads, or scaling tips.",
        intake.business_name,
        strategy.display_score()
    )
}
