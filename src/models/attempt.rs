// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table in the database.
/// Groups the answers a student submitted together.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for `Attempts::create`.
#[derive(Debug, Clone)]
pub struct AttemptCreate {
    pub quiz_id: i64,
    pub student_id: i64,
}

/// An attempt with its computed score.
#[derive(Debug, Serialize)]
pub struct AttemptSummary {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub score: i64,
    pub total_questions: i64,
}

/// Response of the submit endpoint.
#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub message: String,
}
