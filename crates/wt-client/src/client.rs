//! Model service abstraction and its HTTP implementation.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use wt_types::{ConfigError, Features, ServiceError};

use crate::wire::{LearnRequest, ModelsResponse, PredictRequest, PredictResponse};

/// Narrow view of the remote incremental-learning service.
///
/// All model state lives on the server. `train` is not idempotent: every
/// call adapts the model again, so callers send each observation once.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Names of the models currently registered.
    async fn list_models(&self) -> Result<Vec<String>, ServiceError>;

    /// Feed one labelled observation to `model`.
    async fn train(&self, model: &str, features: &Features, label: u64) -> Result<(), ServiceError>;

    /// Ask `model` for its prediction. Does not change the model.
    async fn predict(&self, model: &str, features: &Features) -> Result<f64, ServiceError>;

    /// Opaque description of `model`, for diagnostics.
    async fn describe(&self, model: &str) -> Result<serde_json::Value, ServiceError>;
}

/// [`ModelService`] over the service's JSON/HTTP API.
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    base: Url,
    client: reqwest::Client,
}

impl HttpModelClient {
    /// Client for the service at `base_url`. A missing scheme defaults to
    /// `http://`.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let with_scheme = if base_url.contains("://") {
            base_url.to_string()
        } else {
            format!("http://{base_url}")
        };
        let base = Url::parse(&with_scheme).map_err(|e| ConfigError::Invalid {
            message: format!("invalid model service URL '{base_url}': {e}"),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                message: format!("model service URL '{base_url}' cannot hold a path"),
            });
        }
        Ok(Self {
            base,
            client: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send `request` and fail on transport errors or non-2xx statuses.
    async fn execute(&self, url: &Url, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await.map_err(|e| ServiceError::Unavailable {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ServiceError> {
        debug!(%url, "GET");
        let response = self.execute(&url, self.client.get(url.clone())).await?;
        decode(&url, response).await
    }

    async fn post<B: Serialize + Sync>(&self, url: &Url, body: &B) -> Result<Response, ServiceError> {
        debug!(%url, "POST");
        self.execute(url, self.client.post(url.clone()).json(body)).await
    }
}

async fn decode<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T, ServiceError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl ModelService for HttpModelClient {
    async fn list_models(&self) -> Result<Vec<String>, ServiceError> {
        let response: ModelsResponse = self.get(self.endpoint(&["models"])).await?;
        Ok(response.models)
    }

    async fn train(&self, model: &str, features: &Features, label: u64) -> Result<(), ServiceError> {
        let body = LearnRequest {
            x: *features,
            y: label,
        };
        // The acknowledgement body carries nothing we use.
        self.post(&self.endpoint(&["learn", model]), &body).await?;
        Ok(())
    }

    async fn predict(&self, model: &str, features: &Features) -> Result<f64, ServiceError> {
        let url = self.endpoint(&["predict", model]);
        let response = self.post(&url, &PredictRequest { x: *features }).await?;
        let response: PredictResponse = decode(&url, response).await?;
        response
            .prediction
            .ok_or_else(|| ServiceError::InvalidResponse {
                url: url.to_string(),
                message: format!("model {model} returned no prediction"),
            })
    }

    async fn describe(&self, model: &str) -> Result<serde_json::Value, ServiceError> {
        self.get(self.endpoint(&["model", model])).await
    }
}
