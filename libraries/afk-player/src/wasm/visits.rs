use crate::error::VisitError;
use crate::visits::{VisitCounter, VisitResponse};
use async_trait::async_trait;
use gloo_net::http::{Request, Response};

/// Visit counter backed by the site's `/api/visits` endpoint
#[derive(Debug, Clone)]
pub struct HttpVisitCounter {
    endpoint: String,
}

impl HttpVisitCounter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    async fn read_count(response: Response) -> Result<u64, VisitError> {
        if !response.ok() {
            return Err(VisitError::Status(response.status()));
        }
        response
            .json::<VisitResponse>()
            .await
            .map_err(|e| VisitError::Decode(e.to_string()))?
            .into_count()
    }
}

#[async_trait(?Send)]
impl VisitCounter for HttpVisitCounter {
    async fn register(&self) -> Result<u64, VisitError> {
        let response = Request::post(&self.endpoint)
            .send()
            .await
            .map_err(|e| VisitError::Network(e.to_string()))?;
        Self::read_count(response).await
    }
}
