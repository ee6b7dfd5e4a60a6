use std::collections::{HashMap, HashSet};

use axum::extract::FromRef;
use rand::{seq::SliceRandom, Rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{ResetRequest, SetQuestionItem, StartResponse, VerifyAnswer, VerifyRequest},
    repo,
    repo_types::{QuestionCode, SecurityAnswer},
};
use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_answer, hash_password, verify_answer},
        repo_types::Customer,
        services::check_password_len,
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub const REQUIRED_ANSWERS: usize = 3;
pub const CHALLENGE_SIZE: usize = 2;
pub const MAX_RESET_PASSWORD_LEN: usize = 64;

pub(crate) fn validate_setup(items: &[SetQuestionItem]) -> ApiResult<()> {
    if items.len() != REQUIRED_ANSWERS {
        return Err(ApiError::validation(format!(
            "exactly {REQUIRED_ANSWERS} security questions are required"
        )));
    }
    let mut codes = HashSet::new();
    for item in items {
        if item.answer.trim().is_empty() || item.confirm.trim().is_empty() {
            return Err(ApiError::validation("answers must not be blank"));
        }
        if item.answer != item.confirm {
            return Err(ApiError::validation("answer and confirmation do not match"));
        }
        if !codes.insert(item.code) {
            return Err(ApiError::validation("question codes must be unique"));
        }
    }
    Ok(())
}

pub(crate) fn validate_challenge(answers: &[VerifyAnswer]) -> ApiResult<()> {
    if answers.len() != CHALLENGE_SIZE {
        return Err(ApiError::validation(format!(
            "exactly {CHALLENGE_SIZE} answers are required"
        )));
    }
    let codes: HashSet<_> = answers.iter().map(|a| a.code).collect();
    if codes.len() != answers.len() {
        return Err(ApiError::validation("question codes must be unique"));
    }
    if answers.iter().any(|a| a.answer.trim().is_empty()) {
        return Err(ApiError::validation("answers must not be blank"));
    }
    Ok(())
}

pub(crate) fn pick_challenge<R: Rng + ?Sized>(mut codes: Vec<QuestionCode>, rng: &mut R) -> Vec<QuestionCode> {
    codes.shuffle(rng);
    codes.truncate(CHALLENGE_SIZE);
    codes
}

/// Every provided answer must match the stored hash for its code.
pub(crate) fn answers_match(stored: &[SecurityAnswer], provided: &[VerifyAnswer]) -> anyhow::Result<bool> {
    let by_code: HashMap<QuestionCode, &str> = stored
        .iter()
        .filter_map(|a| a.code().map(|c| (c, a.answer_hash.as_str())))
        .collect();
    for answer in provided {
        let Some(hash) = by_code.get(&answer.code) else {
            return Ok(false);
        };
        if !verify_answer(&answer.answer, hash)? {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn customer_by_login_id(state: &AppState, login_id: &str) -> ApiResult<Customer> {
    Customer::find_by_login_id(&state.db, login_id.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("customer"))
}

pub async fn set_questions(state: &AppState, customer_id: Uuid, items: &[SetQuestionItem]) -> ApiResult<()> {
    validate_setup(items)?;

    let hashed = items
        .iter()
        .map(|item| Ok((item.code, hash_answer(&item.answer)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut tx = state.db.begin().await?;
    for (code, hash) in &hashed {
        repo::upsert_answer_tx(&mut tx, customer_id, *code, hash).await?;
    }
    tx.commit().await?;

    info!(%customer_id, "security questions saved");
    Ok(())
}

pub async fn start(state: &AppState, login_id: &str) -> ApiResult<StartResponse> {
    let customer = customer_by_login_id(state, login_id).await?;
    let stored = repo::list_answers(&state.db, customer.id).await?;
    if stored.len() < REQUIRED_ANSWERS {
        return Err(ApiError::validation("security questions not set"));
    }
    let codes = stored.iter().filter_map(SecurityAnswer::code).collect();
    let questions = pick_challenge(codes, &mut rand::thread_rng());
    info!(customer_id = %customer.id, "recovery started");
    Ok(StartResponse {
        id: customer.login_id,
        questions,
    })
}

pub async fn verify(state: &AppState, req: &VerifyRequest) -> ApiResult<String> {
    validate_challenge(&req.answers)?;
    let customer = customer_by_login_id(state, &req.id).await?;
    let stored = repo::list_answers(&state.db, customer.id).await?;
    if !answers_match(&stored, &req.answers)? {
        warn!(customer_id = %customer.id, "recovery answers rejected");
        return Err(ApiError::validation("security answers do not match"));
    }
    let token = JwtKeys::from_ref(state).sign_recovery(customer.id)?;
    info!(customer_id = %customer.id, "recovery verified");
    Ok(token)
}

pub async fn reset(state: &AppState, req: &ResetRequest) -> ApiResult<()> {
    check_password_len(&req.new_password, MAX_RESET_PASSWORD_LEN)?;
    let claims = JwtKeys::from_ref(state)
        .verify_recovery(req.recovery_token.trim())
        .map_err(|e| {
            warn!(error = %e, "recovery token rejected");
            ApiError::validation("recovery token is invalid or expired")
        })?;

    let hash = hash_password(&req.new_password)?;
    if !Customer::update_password(&state.db, claims.sub, &hash).await? {
        return Err(ApiError::not_found("customer"));
    }
    info!(customer_id = %claims.sub, "password reset via recovery");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use time::OffsetDateTime;

    fn item(code: QuestionCode, answer: &str, confirm: &str) -> SetQuestionItem {
        SetQuestionItem {
            code,
            answer: answer.into(),
            confirm: confirm.into(),
        }
    }

    fn ans(code: QuestionCode, answer: &str) -> VerifyAnswer {
        VerifyAnswer {
            code,
            answer: answer.into(),
        }
    }

    fn stored(code: QuestionCode, answer: &str) -> SecurityAnswer {
        SecurityAnswer {
            customer_id: Uuid::nil(),
            code: code.as_str().into(),
            answer_hash: hash_answer(answer).unwrap(),
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn setup_needs_three_distinct_confirmed_answers() {
        use QuestionCode::*;
        let ok = [item(Birthplace, "Seoul", "Seoul"), item(PetName, "Bori", "Bori"), item(MotherName, "Kim", "Kim")];
        assert!(validate_setup(&ok).is_ok());
        assert!(validate_setup(&ok[..2]).is_err());

        let mismatch = [item(Birthplace, "Seoul", "Busan"), item(PetName, "a", "a"), item(MotherName, "b", "b")];
        assert!(validate_setup(&mismatch).is_err());

        let dup = [item(Birthplace, "a", "a"), item(Birthplace, "b", "b"), item(MotherName, "c", "c")];
        assert!(validate_setup(&dup).is_err());

        let blank = [item(Birthplace, "  ", "  "), item(PetName, "a", "a"), item(MotherName, "b", "b")];
        assert!(validate_setup(&blank).is_err());
    }

    #[test]
    fn challenge_needs_two_distinct_codes() {
        use QuestionCode::*;
        assert!(validate_challenge(&[ans(Birthplace, "a"), ans(PetName, "b")]).is_ok());
        assert!(validate_challenge(&[ans(Birthplace, "a")]).is_err());
        assert!(validate_challenge(&[ans(Birthplace, "a"), ans(Birthplace, "b")]).is_err());
        assert!(validate_challenge(&[ans(Birthplace, "a"), ans(PetName, "")]).is_err());
    }

    #[test]
    fn pick_challenge_returns_two_of_the_stored_codes() {
        use QuestionCode::*;
        let all = vec![Birthplace, PetName, MotherName];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = pick_challenge(all.clone(), &mut rng);
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0], picked[1]);
            assert!(picked.iter().all(|c| all.contains(c)));
        }
    }

    #[test]
    fn answers_match_normalizes_and_requires_all() {
        use QuestionCode::*;
        let db = vec![stored(Birthplace, "Seoul"), stored(PetName, "Bori"), stored(MotherName, "Kim")];
        assert!(answers_match(&db, &[ans(Birthplace, "  SEOUL "), ans(PetName, "bori")]).unwrap());
        assert!(!answers_match(&db, &[ans(Birthplace, "Seoul"), ans(PetName, "wrong")]).unwrap());
        assert!(!answers_match(&db, &[ans(Birthplace, "Seoul"), ans(ElementarySchool, "x")]).unwrap());
    }

    #[tokio::test]
    async fn reset_rejects_access_tokens() {
        let state = AppState::fake();
        let access = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let req = ResetRequest {
            recovery_token: access,
            new_password: "brand-new-pass".into(),
        };
        let err = reset(&state, &req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn reset_checks_password_length_first() {
        let state = AppState::fake();
        let req = ResetRequest {
            recovery_token: "whatever".into(),
            new_password: "p".repeat(65),
        };
        assert!(matches!(reset(&state, &req).await, Err(ApiError::Validation(_))));
    }
}
