// src/ai/cache.rs
use std::collections::HashMap;

use log::debug;
use sha2::{Digest, Sha256};

use super::connector::Classifier;
use super::error::ClassifyResult;
use super::record::Classification;
use crate::config::Endpoint;

pub const DEFAULT_CAPACITY: usize = 64;

pub fn content_hash(image_data: &[u8]) -> String {
    hex::encode(Sha256::digest(image_data))
}

/// Memoizes successful results per endpoint and image content so the same
/// upload in one session is only sent once. Stops inserting at capacity;
/// nothing is evicted.
pub struct CachedClassifier<C> {
    inner: C,
    capacity: usize,
    entries: HashMap<(Endpoint, String), Classification>,
    hits: u64,
}

impl<C: Classifier> CachedClassifier<C> {
    pub fn new(inner: C, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[cfg(test)]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Classifier> Classifier for CachedClassifier<C> {
    fn classify(&mut self, endpoint: Endpoint, image_data: &[u8]) -> ClassifyResult<Classification> {
        let key = (endpoint, content_hash(image_data));

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            debug!("Cache hit for {} image {}", endpoint, &key.1[..12]);
            return Ok(cached.clone());
        }

        let result = self.inner.classify(endpoint, image_data)?;

        if self.entries.len() < self.capacity {
            self.entries.insert(key, result.clone());
        } else {
            debug!("Cache full ({} entries), not storing", self.capacity);
        }
        Ok(result)
    }
}
