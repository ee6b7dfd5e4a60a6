use serde::{Deserialize, Serialize};

use super::repo_types::Gender;

/// Request body for signup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub id: String,
    pub password: String,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
}

/// Response returned after signup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: String,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub id: String,
}
