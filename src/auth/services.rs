use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    blacklist,
    dto::{LoginRequest, SignupRequest},
    extractors::BearerSession,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::{BodyAttrs, Customer},
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_LOGIN_PASSWORD_LEN: usize = 72;

pub(crate) fn is_valid_login_id(id: &str) -> bool {
    lazy_static! {
        static ref LOGIN_ID_RE: Regex = Regex::new(r"^\S{1,100}$").unwrap();
    }
    LOGIN_ID_RE.is_match(id)
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn check_password_len(password: &str, max: usize) -> ApiResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN || len > max {
        return Err(ApiError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{max} characters"
        )));
    }
    Ok(())
}

/// Body attributes are optional, but when present they must be plausible.
pub(crate) fn check_body_attrs(attrs: &BodyAttrs) -> ApiResult<()> {
    if let Some(w) = attrs.weight {
        if !(w.is_finite() && w > 0.0 && w < 1000.0) {
            return Err(ApiError::validation("weight must be positive"));
        }
    }
    if let Some(h) = attrs.height {
        if !(h.is_finite() && h > 0.0 && h < 1000.0) {
            return Err(ApiError::validation("height must be positive"));
        }
    }
    if let Some(a) = attrs.age {
        if !(1..=150).contains(&a) {
            return Err(ApiError::validation("age must be between 1 and 150"));
        }
    }
    Ok(())
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> ApiResult<(Customer, String)> {
    let login_id = payload.id.trim();
    if !is_valid_login_id(login_id) {
        warn!("invalid login id");
        return Err(ApiError::validation("id must be 1-100 characters without spaces"));
    }
    check_password_len(&payload.password, MAX_LOGIN_PASSWORD_LEN)?;

    let attrs = BodyAttrs {
        weight: payload.weight,
        age: payload.age,
        gender: payload.gender,
        height: payload.height,
    };
    check_body_attrs(&attrs)?;

    if Customer::find_by_login_id(&state.db, login_id).await?.is_some() {
        warn!(login_id, "id already registered");
        return Err(ApiError::conflict("id already registered"));
    }

    let hash = hash_password(&payload.password)?;
    // A concurrent signup can still win the race; the unique index turns that into a 409.
    let customer = Customer::create(&state.db, login_id, &hash, attrs).await?;

    let token = JwtKeys::from_ref(state).sign_access(customer.id)?;
    info!(customer_id = %customer.id, login_id = %customer.login_id, "customer registered");
    Ok((customer, token))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> ApiResult<(Customer, String)> {
    let invalid = || ApiError::unauthorized("INVALID_CREDENTIALS", "invalid credentials");

    let login_id = payload.id.trim();
    if login_id.is_empty() || payload.password.is_empty() {
        return Err(invalid());
    }

    let Some(customer) = Customer::find_by_login_id(&state.db, login_id).await? else {
        warn!(login_id, "login unknown id");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &customer.password_hash)? {
        warn!(customer_id = %customer.id, "login invalid password");
        return Err(invalid());
    }

    let token = JwtKeys::from_ref(state).sign_access(customer.id)?;
    info!(customer_id = %customer.id, "customer logged in");
    Ok((customer, token))
}

pub async fn logout(state: &AppState, session: &BearerSession) -> ApiResult<()> {
    blacklist::blacklist(
        &state.db,
        &session.token,
        session.customer_id,
        session.expires_at,
        "logout",
    )
    .await?;
    info!(customer_id = %session.customer_id, "customer logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_id_rules() {
        assert!(is_valid_login_id("runner@example.com"));
        assert!(is_valid_login_id("a"));
        assert!(!is_valid_login_id(""));
        assert!(!is_valid_login_id("has space"));
        assert!(!is_valid_login_id(&"x".repeat(101)));
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("no-at.example.com"));
    }

    #[test]
    fn password_length_bounds() {
        assert!(check_password_len("1234567", 72).is_err());
        assert!(check_password_len("12345678", 72).is_ok());
        assert!(check_password_len(&"p".repeat(72), 72).is_ok());
        assert!(check_password_len(&"p".repeat(65), 64).is_err());
    }

    #[test]
    fn body_attrs_bounds() {
        assert!(check_body_attrs(&BodyAttrs::default()).is_ok());
        let bad_age = BodyAttrs { age: Some(151), ..Default::default() };
        assert!(check_body_attrs(&bad_age).is_err());
        let bad_weight = BodyAttrs { weight: Some(-1.0), ..Default::default() };
        assert!(check_body_attrs(&bad_weight).is_err());
        let nan_height = BodyAttrs { height: Some(f64::NAN), ..Default::default() };
        assert!(check_body_attrs(&nan_height).is_err());
        let ok = BodyAttrs {
            weight: Some(70.0),
            age: Some(30),
            gender: None,
            height: Some(175.5),
        };
        assert!(check_body_attrs(&ok).is_ok());
    }
}
