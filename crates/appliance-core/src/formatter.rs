//! Turns a search response into transcript blocks
//!
//! Output order follows the response exactly. Ranking and filtering are the
//! search service's job; nothing here re-sorts or drops replacements.

use crate::content::{AvailabilityBadge, ContentBlock};
use crate::gateway::{Availability, OriginalProduct, ReplacementProduct, SearchResponse};

const ORIGINAL_FEATURE_LIMIT: usize = 8;
const REPLACEMENT_FEATURE_LIMIT: usize = 5;
const NOT_AVAILABLE: &str = "N/A";

pub const NO_MATCHES_TEXT: &str = "No replacement products found matching your criteria.";

/// Format a successful search response as an ordered list of blocks
pub fn format_results(response: &SearchResponse) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    blocks.push(match &response.original_product {
        Some(original) => original_block(original),
        None => unknown_original_block(),
    });

    let replacements = response.replacements();
    if replacements.is_empty() {
        blocks.push(ContentBlock::text(NO_MATCHES_TEXT));
        return blocks;
    }

    blocks.push(ContentBlock::Summary {
        replacement_count: replacements.len(),
        retailers_searched: response
            .search_summary
            .as_ref()
            .map(|summary| summary.retailers_searched)
            .unwrap_or(0),
    });
    blocks.extend(replacements.iter().map(replacement_block));

    blocks
}

fn original_block(original: &OriginalProduct) -> ContentBlock {
    ContentBlock::OriginalProduct {
        brand: original.brand.clone(),
        model: original.model.clone(),
        appliance_type: original.appliance_type.clone(),
        size: or_not_available(original.size.as_deref()),
        fuel: or_not_available(original.fuel.as_deref()),
        source: or_not_available(original.source.as_deref()),
        features: first_features(&original.features, ORIGINAL_FEATURE_LIMIT),
    }
}

/// Placeholder when the service found replacements but sent no original
fn unknown_original_block() -> ContentBlock {
    ContentBlock::OriginalProduct {
        brand: NOT_AVAILABLE.to_string(),
        model: NOT_AVAILABLE.to_string(),
        appliance_type: NOT_AVAILABLE.to_string(),
        size: NOT_AVAILABLE.to_string(),
        fuel: NOT_AVAILABLE.to_string(),
        source: NOT_AVAILABLE.to_string(),
        features: Vec::new(),
    }
}

fn replacement_block(product: &ReplacementProduct) -> ContentBlock {
    ContentBlock::ReplacementCard {
        rank: product.rank,
        product_name: product.product_name.clone(),
        retailer: product.retailer.clone(),
        badge: badge_for(&product.availability),
        match_score: product.match_score,
        brand: or_not_available(product.brand.as_deref()),
        price: product
            .price
            .map(|price| format!("${:.2}", price))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        size: or_not_available(product.size.as_deref()),
        fuel: or_not_available(product.fuel.as_deref()),
        features: first_features(&product.features, REPLACEMENT_FEATURE_LIMIT),
        url: product.url.clone(),
    }
}

fn badge_for(availability: &Availability) -> Option<AvailabilityBadge> {
    match availability {
        Availability::InStock => Some(AvailabilityBadge::InStock),
        Availability::LimitedStock => Some(AvailabilityBadge::LimitedStock),
        Availability::Other(_) => None,
    }
}

// Empty strings count as absent, same as a missing field.
fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn first_features(features: &[String], limit: usize) -> Vec<String> {
    features.iter().take(limit).cloned().collect()
}
