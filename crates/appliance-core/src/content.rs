//! Typed display blocks carried by chat messages
//!
//! Each surface decides how to draw these; nothing here knows about markup.

use serde::{Deserialize, Serialize};

/// One self-contained unit of displayable output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum ContentBlock {
    PlainText {
        text: String,
    },
    OriginalProduct {
        brand: String,
        model: String,
        appliance_type: String,
        size: String,
        fuel: String,
        source: String,
        features: Vec<String>,
    },
    Summary {
        replacement_count: usize,
        retailers_searched: u32,
    },
    ReplacementCard {
        rank: u32,
        product_name: String,
        retailer: String,
        badge: Option<AvailabilityBadge>,
        match_score: f64,
        brand: String,
        price: String,
        size: String,
        fuel: String,
        features: Vec<String>,
        url: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::PlainText { text: text.into() }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ContentBlock::Error {
            kind,
            message: message.into(),
        }
    }

    /// Plain-text rendering, one entry per line
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            ContentBlock::PlainText { text } => text.lines().map(str::to_string).collect(),
            ContentBlock::OriginalProduct {
                brand,
                model,
                appliance_type,
                size,
                fuel,
                source,
                features,
            } => {
                let mut lines = vec![
                    "Original Product Found!".to_string(),
                    format!("{} {}", brand, model),
                    format!("Type: {}  Size: {}  Fuel: {}", appliance_type, size, fuel),
                    format!("Source: {}", source),
                ];
                if !features.is_empty() {
                    lines.push(format!("Features: {}", features.join(", ")));
                }
                lines
            }
            ContentBlock::Summary {
                replacement_count,
                retailers_searched,
            } => vec![
                format!("Found {} Replacement Options", replacement_count),
                format!("Searched {} retailers", retailers_searched),
            ],
            ContentBlock::ReplacementCard {
                rank,
                product_name,
                retailer,
                badge,
                match_score,
                brand,
                price,
                size,
                fuel,
                features,
                url,
            } => {
                let mut header = format!("#{} {} [{}]", rank, product_name, retailer);
                if let Some(badge) = badge {
                    header.push_str(&format!(" [{}]", badge.label()));
                }
                let mut lines = vec![
                    header,
                    format!("Score: {}", match_score),
                    format!(
                        "Brand: {}  Price: {}  Size: {}  Fuel: {}",
                        brand, price, size, fuel
                    ),
                ];
                if !features.is_empty() {
                    lines.push(format!("Features: {}", features.join(", ")));
                }
                lines.push(format!("View Product: {}", url));
                lines
            }
            ContentBlock::Error { kind, message } => {
                let mut lines = vec![format!("{}: {}", kind.title(), message)];
                lines.push(kind.hint().to_string());
                lines
            }
        }
    }
}

/// Stock badge shown on a replacement card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityBadge {
    InStock,
    LimitedStock,
}

impl AvailabilityBadge {
    pub fn label(&self) -> &'static str {
        match self {
            AvailabilityBadge::InStock => "In Stock",
            AvailabilityBadge::LimitedStock => "Limited Stock",
        }
    }
}

/// Which failure path produced an error block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service answered with `success: false`
    Application,
    /// The request never produced a usable response
    Connectivity,
}

impl ErrorKind {
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::Application => "Error",
            ErrorKind::Connectivity => "Connection Error",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            ErrorKind::Application => "Please try again or adjust your search criteria.",
            ErrorKind::Connectivity => "Make sure the API server is running and reachable.",
        }
    }
}
