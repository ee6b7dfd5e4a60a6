use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{
        AccountView, BodyRecordView, BodySetupRequest, ChangePasswordRequest, GoalView,
        ProfileView, UpdateAccountRequest, UpdateProfileRequest,
    },
    repo,
    repo_types::{BodyRecord, Goal, RankingRow, Targets},
};
use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo_types::{BodyAttrs, Customer},
        services::{check_body_attrs, check_password_len, is_valid_email},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const MAX_PROFILE_PASSWORD_LEN: usize = 64;
const MAX_TARGET_WEIGHT: f64 = 10_000.0;
const MAX_TARGET_CALORIES: i32 = 99_999;

pub(crate) fn check_targets(weight: Option<f64>, calories: Option<i32>) -> ApiResult<Targets> {
    let weight = weight.ok_or_else(|| ApiError::validation("targetWeight is required"))?;
    let calories = calories.ok_or_else(|| ApiError::validation("targetCalories is required"))?;
    if !(weight.is_finite() && weight > 0.0 && weight < MAX_TARGET_WEIGHT) {
        return Err(ApiError::validation("targetWeight must be positive"));
    }
    if !(1..=MAX_TARGET_CALORIES).contains(&calories) {
        return Err(ApiError::validation("targetCalories must be positive"));
    }
    Ok(Targets { weight, calories })
}

/// A profile write: body attributes, new targets and an optional password.
struct ProfileChange<'a> {
    patch: BodyAttrs,
    targets: Targets,
    new_password: Option<&'a str>,
    inbody: Option<f64>,
}

async fn load_customer(state: &AppState, customer_id: Uuid) -> ApiResult<Customer> {
    Customer::find_by_id(&state.db, customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("customer"))
}

/// Updates the customer and appends a goal and a body snapshot, all or nothing.
async fn apply_change(state: &AppState, customer_id: Uuid, change: ProfileChange<'_>) -> ApiResult<()> {
    let customer = load_customer(state, customer_id).await?;
    let attrs = customer.body_attrs().merged(change.patch);
    check_body_attrs(&attrs)?;

    let password_hash = match change.new_password.filter(|p| !p.is_empty()) {
        Some(p) => {
            check_password_len(p, MAX_PROFILE_PASSWORD_LEN)?;
            Some(hash_password(p)?)
        }
        None => None,
    };

    let today = state.today();
    let mut tx = state.db.begin().await?;
    Customer::update_core_tx(&mut tx, customer_id, attrs).await?;
    if let Some(hash) = &password_hash {
        Customer::update_password_tx(&mut tx, customer_id, hash).await?;
    }
    Goal::insert_tx(&mut tx, customer_id, change.targets, today).await?;
    BodyRecord::insert_tx(&mut tx, customer_id, attrs, change.targets, change.inbody, today).await?;
    tx.commit().await?;

    info!(
        %customer_id,
        target_weight = change.targets.weight,
        target_calories = change.targets.calories,
        password_changed = password_hash.is_some(),
        "profile updated"
    );
    Ok(())
}

pub async fn profile(state: &AppState, customer_id: Uuid) -> ApiResult<ProfileView> {
    let customer = load_customer(state, customer_id).await?;
    let goal = Goal::latest(&state.db, customer_id).await?;
    Ok(ProfileView::new(customer, goal.as_ref()))
}

pub async fn update_profile(state: &AppState, customer_id: Uuid, req: &UpdateProfileRequest) -> ApiResult<()> {
    let targets = check_targets(req.target_weight, req.target_calories)?;
    apply_change(
        state,
        customer_id,
        ProfileChange {
            patch: req.attrs(),
            targets,
            new_password: req.new_password.as_deref(),
            inbody: None,
        },
    )
    .await
}

pub async fn setup_body(state: &AppState, customer_id: Uuid, req: &BodySetupRequest) -> ApiResult<()> {
    let targets = check_targets(req.target_weight, req.target_calories)?;
    if req.weight.is_none() || req.height.is_none() {
        return Err(ApiError::validation("weight and height are required"));
    }
    if let Some(inbody) = req.inbody {
        if !(inbody.is_finite() && inbody >= 0.0) {
            return Err(ApiError::validation("inbody must not be negative"));
        }
    }
    apply_change(
        state,
        customer_id,
        ProfileChange {
            patch: BodyAttrs {
                weight: req.weight,
                age: req.age,
                gender: req.gender,
                height: req.height,
            },
            targets,
            new_password: None,
            inbody: req.inbody,
        },
    )
    .await
}

pub async fn body_history(state: &AppState, customer_id: Uuid) -> ApiResult<Vec<BodyRecordView>> {
    let rows = BodyRecord::history(&state.db, customer_id).await?;
    Ok(rows.into_iter().map(BodyRecordView::from).collect())
}

pub async fn current_goal(state: &AppState, customer_id: Uuid) -> ApiResult<GoalView> {
    Goal::latest(&state.db, customer_id)
        .await?
        .map(GoalView::from)
        .ok_or_else(|| ApiError::not_found("goal"))
}

pub async fn account(state: &AppState, customer_id: Uuid) -> ApiResult<AccountView> {
    Ok(load_customer(state, customer_id).await?.into())
}

pub async fn update_account(
    state: &AppState,
    customer_id: Uuid,
    req: &UpdateAccountRequest,
) -> ApiResult<AccountView> {
    let customer = load_customer(state, customer_id).await?;
    let attrs = customer.body_attrs().merged(BodyAttrs {
        weight: req.weight,
        age: req.age,
        gender: req.gender,
        height: req.height,
    });
    check_body_attrs(&attrs)?;

    let email = req.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !is_valid_email(email) {
            return Err(ApiError::validation("email is not valid"));
        }
        if Customer::email_in_use_by_other(&state.db, customer_id, email).await? {
            warn!(%customer_id, "email already in use");
            return Err(ApiError::conflict("email already in use"));
        }
    }

    let mut tx = state.db.begin().await?;
    Customer::update_core_tx(&mut tx, customer_id, attrs).await?;
    if let Some(email) = email {
        Customer::update_email_tx(&mut tx, customer_id, email).await?;
    }
    tx.commit().await?;

    info!(%customer_id, email_changed = email.is_some(), "account updated");
    account(state, customer_id).await
}

pub async fn change_password(state: &AppState, customer_id: Uuid, req: &ChangePasswordRequest) -> ApiResult<()> {
    check_password_len(&req.new_password, MAX_PROFILE_PASSWORD_LEN)?;
    let customer = load_customer(state, customer_id).await?;
    if !verify_password(&req.current_password, &customer.password_hash)? {
        warn!(%customer_id, "password change with wrong current password");
        return Err(ApiError::validation("current password does not match"));
    }
    let hash = hash_password(&req.new_password)?;
    Customer::update_password(&state.db, customer_id, &hash).await?;
    info!(%customer_id, "password changed");
    Ok(())
}

pub async fn ranking(state: &AppState) -> ApiResult<Vec<RankingRow>> {
    Ok(repo::ranking(&state.db).await?)
}
