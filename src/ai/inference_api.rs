// src/ai/inference_api.rs
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use super::connector::Classifier;
use super::error::{ClassifyError, ClassifyResult};
use super::record::Classification;
use crate::config::{Config, Endpoint};

/// Blocking client for the hosted inference API.
pub struct InferenceClient {
    config: Config,
    client: Client,
}

impl InferenceClient {
    pub fn new(config: Config) -> ClassifyResult<Self> {
        info!(
            "Initializing inference client (gender: {}, detector: {})",
            config.gender_url, config.detector_url
        );

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }
}

impl Classifier for InferenceClient {
    fn classify(&mut self, endpoint: Endpoint, image_data: &[u8]) -> ClassifyResult<Classification> {
        let url = self.config.url_for(endpoint);
        info!("Posting {} bytes to {} model", image_data.len(), endpoint);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image_data.to_vec())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Request to {} model timed out", endpoint);
                }
                ClassifyError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} model responded with status: {}", endpoint, status);
            // body is best-effort here
            let body = response.text().unwrap_or_default();
            return Err(ClassifyError::from_status(status, &body));
        }

        let body = response.text()?;

        debug!("{} model response: {}", endpoint, body);

        let result = Classification::from_json(&body)?;
        if result.is_empty() {
            return Err(ClassifyError::EmptyResult);
        }

        info!("{} model returned {} record(s)", endpoint, result.len());
        Ok(result)
    }
}
