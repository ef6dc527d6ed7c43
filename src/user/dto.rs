//! User Data Transfer Objects
//!
//! Request bodies keep every field optional so that a missing field is
//! reported through the response envelope rather than as a JSON decoding
//! failure.

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

/// Token issuance request
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
}

/// Update profile details request
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Update email request
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateEmailRequest {
    pub email: Option<String>,
}

/// Token issuance response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
