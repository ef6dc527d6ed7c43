//! User module
//!
//! Account registration, token issuance and profile management.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
