//! Wire types for the search service

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub brand: String,
    pub model: String,
    pub appliance_type: String,
    pub brand_for_brand: bool,
    pub dollar_limit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub original_product: Option<OriginalProduct>,
    #[serde(default)]
    pub search_summary: Option<SearchSummary>,
    #[serde(default)]
    pub replacements: Option<Vec<ReplacementProduct>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Pipeline stage that failed, when the service reports one
    #[serde(default)]
    pub stage: Option<String>,
}

impl SearchResponse {
    pub fn replacements(&self) -> &[ReplacementProduct] {
        self.replacements.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalProduct {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "type", default)]
    pub appliance_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub extraction_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    #[serde(default)]
    pub retailers_searched: u32,
    #[serde(default)]
    pub total_products_found: u32,
    #[serde(default)]
    pub viable_matches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementProduct {
    pub rank: u32,
    pub product_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub retailer: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub match_details: MatchDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    #[serde(default)]
    pub size_match: bool,
    #[serde(default)]
    pub fuel_match: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features_matched: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features_missing: Vec<String>,
    #[serde(default)]
    pub price_competitive: bool,
}

/// Stock status reported by the retailer. Only the two exact strings the
/// service uses are recognized; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    InStock,
    LimitedStock,
    Other(String),
}

impl Availability {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "in stock" => Availability::InStock,
            "limited stock" => Availability::LimitedStock,
            other => Availability::Other(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Availability::InStock => "in stock",
            Availability::LimitedStock => "limited stock",
            Availability::Other(raw) => raw,
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Other(String::new())
    }
}

impl Serialize for Availability {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Availability::from_wire(&s)).unwrap_or_default())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}
