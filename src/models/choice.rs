// src/models/choice.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_choices' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    pub is_correct: bool,
}

/// DTO for sending a choice to a client that may not see the answer key.
#[derive(Debug, Serialize)]
pub struct PublicChoice {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

impl PublicChoice {
    pub fn from_choice(choice: Choice, reveal: bool) -> Self {
        Self {
            id: choice.id,
            question_id: choice.question_id,
            content: choice.content,
            is_correct: reveal.then_some(choice.is_correct),
        }
    }
}

/// Input for `Choices::create`.
#[derive(Debug, Clone)]
pub struct ChoiceCreate {
    pub question_id: i64,
    pub content: String,
    pub is_correct: bool,
}

/// DTO for creating a new choice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChoiceRequest {
    #[validate(length(min = 1, max = 500))]
    pub content: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// DTO for updating a choice. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChoiceRequest {
    #[validate(length(min = 1, max = 500))]
    pub content: Option<String>,
    pub is_correct: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_choice_omits_correctness() {
        let choice = Choice {
            id: 3,
            question_id: 1,
            content: "42".into(),
            is_correct: true,
        };
        let hidden = serde_json::to_value(PublicChoice::from_choice(choice.clone(), false)).unwrap();
        assert!(hidden.get("is_correct").is_none());

        let shown = serde_json::to_value(PublicChoice::from_choice(choice, true)).unwrap();
        assert_eq!(shown["is_correct"], true);
    }
}
