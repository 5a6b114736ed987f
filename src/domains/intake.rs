use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GrowthFlowError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigitalSetup {
    #[default]
    NoWebsite,
    Storefront,
    ContentSite,
    SocialOnly,
}

impl DigitalSetup {
    pub const ALL: [DigitalSetup; 4] = [
        DigitalSetup::NoWebsite,
        DigitalSetup::Storefront,
        DigitalSetup::ContentSite,
        DigitalSetup::SocialOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DigitalSetup::NoWebsite => "No Website / Starting New",
            DigitalSetup::Storefront => "Shopify / E-commerce Store",
            DigitalSetup::ContentSite => "WordPress / Service Website",
            DigitalSetup::SocialOnly => "FB/IG Pages Only",
        }
    }
}

impl fmt::Display for DigitalSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DigitalSetup {
    type Err = GrowthFlowError;

    fn from_str(value: &str) -> Result<Self> {
        let lower = value.trim().to_ascii_lowercase();
        if lower.is_empty() || lower.contains("no website") || lower == "none" {
            return Ok(DigitalSetup::NoWebsite);
        }
        if ["shopify", "e-commerce", "ecommerce", "storefront", "store"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            return Ok(DigitalSetup::Storefront);
        }
        if ["wordpress", "service website", "cms", "content"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            return Ok(DigitalSetup::ContentSite);
        }
        if ["fb", "ig", "social", "facebook", "instagram"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            return Ok(DigitalSetup::SocialOnly);
        }
        Err(GrowthFlowError::Validation(format!(
            "unknown digital setup: {value}"
        )))
    }
}

impl TryFrom<String> for DigitalSetup {
    type Error = GrowthFlowError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DigitalSetup> for String {
    fn from(value: DigitalSetup) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrimaryGoal {
    #[default]
    Sales,
    Leads,
    Authority,
    Ranking,
}

impl PrimaryGoal {
    pub const ALL: [PrimaryGoal; 4] = [
        PrimaryGoal::Sales,
        PrimaryGoal::Leads,
        PrimaryGoal::Authority,
        PrimaryGoal::Ranking,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PrimaryGoal::Sales => "Sales & Revenue",
            PrimaryGoal::Leads => "Lead Generation",
            PrimaryGoal::Authority => "Brand Authority",
            PrimaryGoal::Ranking => "Search Ranking",
        }
    }
}

impl fmt::Display for PrimaryGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PrimaryGoal {
    type Err = GrowthFlowError;

    fn from_str(value: &str) -> Result<Self> {
        let lower = value.trim().to_ascii_lowercase();
        if lower.is_empty() || lower.contains("sales") || lower.contains("revenue") {
            Ok(PrimaryGoal::Sales)
        } else if lower.contains("lead") {
            Ok(PrimaryGoal::Leads)
        } else if lower.contains("authority") || lower.contains("brand") {
            Ok(PrimaryGoal::Authority)
        } else if lower.contains("rank") || lower.contains("search") || lower.contains("seo") {
            Ok(PrimaryGoal::Ranking)
        } else {
            Err(GrowthFlowError::Validation(format!(
                "unknown primary goal: {value}"
            )))
        }
    }
}

impl TryFrom<String> for PrimaryGoal {
    type Error = GrowthFlowError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PrimaryGoal> for String {
    fn from(value: PrimaryGoal) -> Self {
        value.label().to_string()
    }
}

/// Business profile captured by the onboarding form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeRecord {
    pub business_name: String,
    pub product_type: String,
    pub target_audience: String,
    pub target_country: String,
    pub current_problem: String,
    pub budget: String,
    pub current_setup: DigitalSetup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub main_goal: PrimaryGoal,
}

impl IntakeRecord {
    /// Business name, product description and problem statement are required.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("businessName", &self.business_name),
            ("productType", &self.product_type),
            ("currentProblem", &self.current_problem),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GrowthFlowError::Validation(format!(
                "required fields missing: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn site_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// No website setup, or no address to audit, routes to social-first guidance.
    pub fn is_social_first(&self) -> bool {
        self.current_setup == DigitalSetup::NoWebsite || self.site_url().is_none()
    }
}
