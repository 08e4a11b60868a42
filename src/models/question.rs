// src/models/question.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::choice::PublicChoice;

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// The text content of the question.
    pub content: String,

    /// Display position inside the quiz.
    /// Stored as 'position' since `order` is a reserved SQL keyword.
    #[serde(rename = "order")]
    pub position: i64,

    pub points: i64,

    pub created_at: DateTime<Utc>,
}

/// Input for `Questions::create`.
#[derive(Debug, Clone)]
pub struct QuestionCreate {
    pub quiz_id: i64,
    pub content: String,
    pub position: i64,
    pub points: i64,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(rename = "order", default)]
    pub position: i64,
    #[validate(range(min = 0, max = 1000))]
    #[serde(default = "default_points")]
    pub points: i64,
}

fn default_points() -> i64 {
    1
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: Option<String>,
    #[serde(rename = "order")]
    pub position: Option<i64>,
    #[validate(range(min = 0, max = 1000))]
    pub points: Option<i64>,
}

/// A question with its choices, correctness hidden unless revealed.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub choices: Vec<PublicChoice>,
}
