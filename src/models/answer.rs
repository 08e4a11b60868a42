// src/models/answer.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_answers' table in the database.
/// `attempt_id` is `None` until the student submits the quiz.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub attempt_id: Option<i64>,
    pub student_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for `Answers::create`.
#[derive(Debug, Clone)]
pub struct AnswerCreate {
    pub attempt_id: Option<i64>,
    pub student_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerUpdate {
    pub choice_id: Option<i64>,
}

/// DTO for answering one question.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub choice_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitQuizRequest {
    /// Answers to store before the attempt is created.
    /// Key: Question ID, Value: Choice ID.
    #[serde(default)]
    pub answers: HashMap<i64, i64>,
}
