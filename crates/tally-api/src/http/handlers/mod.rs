//! HTTP request handlers for the REST API.

pub mod auth;
pub mod category;
pub mod chat;
pub mod expense;
pub mod health;
pub mod profile;
