// src/ai/mod.rs
pub mod cache;
pub mod connector;
pub mod error;
pub mod inference_api;
pub mod record;
