use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionCode {
    Birthplace,
    ElementarySchool,
    PetName,
    MotherName,
}

impl QuestionCode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCode::Birthplace => "BIRTHPLACE",
            QuestionCode::ElementarySchool => "ELEMENTARY_SCHOOL",
            QuestionCode::PetName => "PET_NAME",
            QuestionCode::MotherName => "MOTHER_NAME",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BIRTHPLACE" => Some(QuestionCode::Birthplace),
            "ELEMENTARY_SCHOOL" => Some(QuestionCode::ElementarySchool),
            "PET_NAME" => Some(QuestionCode::PetName),
            "MOTHER_NAME" => Some(QuestionCode::MotherName),
            _ => None,
        }
    }
}

/// One stored answer hash, unique per (customer, code).
#[derive(Debug, Clone, FromRow)]
pub struct SecurityAnswer {
    pub customer_id: Uuid,
    pub code: String,
    pub answer_hash: String,
    pub updated_at: OffsetDateTime,
}

impl SecurityAnswer {
    pub fn code(&self) -> Option<QuestionCode> {
        QuestionCode::parse(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_upper_snake() {
        let json = serde_json::to_string(&QuestionCode::ElementarySchool).unwrap();
        assert_eq!(json, "\"ELEMENTARY_SCHOOL\"");
        for code in [
            QuestionCode::Birthplace,
            QuestionCode::ElementarySchool,
            QuestionCode::PetName,
            QuestionCode::MotherName,
        ] {
            assert_eq!(QuestionCode::parse(code.as_str()), Some(code));
            assert_eq!(serde_json::to_string(&code).unwrap(), format!("\"{}\"", code.as_str()));
        }
        assert!(serde_json::from_str::<QuestionCode>("\"FAVORITE_COLOR\"").is_err());
    }
}
