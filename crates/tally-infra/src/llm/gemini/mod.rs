//! Google Gemini completion provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`LlmProvider`](tally_core::llm::provider::LlmProvider) trait for the
//! Gemini `generateContent` REST API.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
