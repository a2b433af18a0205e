//! In-memory gateway for tests and offline demos

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{GatewayError, SearchGateway, SearchRequest, SearchResponse};

/// Gateway that replays queued outcomes in order and records every request
#[derive(Default)]
pub struct MockSearchGateway {
    outcomes: Mutex<VecDeque<Result<SearchResponse, GatewayError>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearchGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, response: SearchResponse) {
        self.outcomes.lock().unwrap_or_else(|p| p.into_inner()).push_back(Ok(response));
    }

    pub fn queue_error(&self, error: GatewayError) {
        self.outcomes.lock().unwrap_or_else(|p| p.into_inner()).push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl SearchGateway for MockSearchGateway {
    async fn complete_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, GatewayError> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).push(request.clone());
        self.outcomes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("No mock response queued")))
    }
}
