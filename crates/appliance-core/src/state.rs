//! UI-agnostic conversation state types
//!
//! This module contains data structures that are shared between different
//! surfaces (TUI, plain-text output, ...) and don't depend on any specific
//! UI framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentBlock;

/// The appliance categories the search service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplianceType {
    Range,
    Dishwasher,
    Refrigerator,
    Microwave,
}

impl ApplianceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplianceType::Range => "range",
            ApplianceType::Dishwasher => "dishwasher",
            ApplianceType::Refrigerator => "refrigerator",
            ApplianceType::Microwave => "microwave",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "range" => Some(ApplianceType::Range),
            "dishwasher" => Some(ApplianceType::Dishwasher),
            "refrigerator" => Some(ApplianceType::Refrigerator),
            "microwave" => Some(ApplianceType::Microwave),
            _ => None,
        }
    }

    pub fn all() -> Vec<ApplianceType> {
        vec![
            ApplianceType::Range,
            ApplianceType::Dishwasher,
            ApplianceType::Refrigerator,
            ApplianceType::Microwave,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ApplianceType::Range => "Range",
            ApplianceType::Dishwasher => "Dishwasher",
            ApplianceType::Refrigerator => "Refrigerator",
            ApplianceType::Microwave => "Microwave",
        }
    }
}

/// Brands offered as presets. Free text is accepted as well.
pub const POPULAR_BRANDS: &[&str] = &[
    "GE",
    "Whirlpool",
    "LG",
    "Samsung",
    "Frigidaire",
    "KitchenAid",
    "Kenmore",
    "Bosch",
    "Maytag",
    "Electrolux",
    "Amana",
    "Other",
];

/// One stage of the question sequence, in the order they are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ApplianceType,
    Brand,
    Model,
    BrandForBrand,
    DollarLimit,
    Results,
}

impl WizardStep {
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::ApplianceType => Some(WizardStep::Brand),
            WizardStep::Brand => Some(WizardStep::Model),
            WizardStep::Model => Some(WizardStep::BrandForBrand),
            WizardStep::BrandForBrand => Some(WizardStep::DollarLimit),
            WizardStep::DollarLimit => Some(WizardStep::Results),
            WizardStep::Results => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::ApplianceType | WizardStep::Results => None,
            WizardStep::Brand => Some(WizardStep::ApplianceType),
            WizardStep::Model => Some(WizardStep::Brand),
            WizardStep::BrandForBrand => Some(WizardStep::Model),
            WizardStep::DollarLimit => Some(WizardStep::BrandForBrand),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Results)
    }

    /// The question shown while this step is waiting for input
    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::ApplianceType => "What type of appliance are you looking for?",
            WizardStep::Brand => "Select or enter the brand:",
            WizardStep::Model => "Enter the model number:",
            WizardStep::BrandForBrand => "Brand-for-brand coverage?",
            WizardStep::DollarLimit => "Maximum price (optional):",
            WizardStep::Results => "Search complete",
        }
    }
}

/// Answers collected so far plus the active step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub appliance_type: Option<ApplianceType>,
    pub brand: String,
    pub model: String,
    pub brand_for_brand: bool,
    pub dollar_limit: Option<f64>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::ApplianceType,
            appliance_type: None,
            brand: String::new(),
            model: String::new(),
            brand_for_brand: false,
            dollar_limit: None,
        }
    }
}

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: Author,
    pub content: ContentBlock,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(author: Author, content: ContentBlock) -> Self {
        Self {
            author,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}
