// src/ai/connector.rs
use super::error::ClassifyResult;
use super::record::Classification;
use crate::config::Endpoint;

/// Trait defining the interface for remote image classification
pub trait Classifier {
    /// Send one image to the given endpoint and return its label/score records
    fn classify(&mut self, endpoint: Endpoint, image_data: &[u8]) -> ClassifyResult<Classification>;
}
