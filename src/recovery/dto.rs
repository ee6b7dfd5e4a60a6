use serde::{Deserialize, Serialize};

use super::repo_types::QuestionCode;

#[derive(Debug, Deserialize)]
pub struct SetQuestionsRequest {
    pub answers: Vec<SetQuestionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetQuestionItem {
    pub code: QuestionCode,
    pub answer: String,
    pub confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub id: String,
    pub questions: Vec<QuestionCode>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub id: String,
    pub answers: Vec<VerifyAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyAnswer {
    pub code: QuestionCode,
    pub answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub recovery_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub recovery_token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
