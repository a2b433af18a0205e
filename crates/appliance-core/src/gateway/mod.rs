//! Boundary to the remote product search service

pub mod error;
pub mod http;
pub mod testing;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;

pub use error::{GatewayError, GatewayErrorKind};
pub use http::HttpSearchClient;
pub use types::{
    Availability, HealthStatus, MatchDetails, OriginalProduct, ReplacementProduct, SearchRequest,
    SearchResponse, SearchSummary,
};

/// Anything that can answer a completed questionnaire with search results.
///
/// An `Err` means the call itself failed; a response with `success: false`
/// is an answer, not an error.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    async fn complete_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, GatewayError>;
}

#[async_trait]
impl<T: SearchGateway + ?Sized> SearchGateway for Arc<T> {
    async fn complete_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, GatewayError> {
        (**self).complete_search(request).await
    }
}
