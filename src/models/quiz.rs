// src/models/quiz.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{answer::Answer, question::QuestionDetail};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub number_of_questions: i64,

    /// Short random code, an alternate lookup key to `id`.
    pub quiz_code: String,

    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,

    /// Author of the quiz.
    pub teacher_id: i64,
}

impl Quiz {
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| now > due)
    }
}

/// How a quiz is addressed in a URL: by numeric id or by its code.
/// A numeric index keeps its raw text, since an all-digit code such as
/// `012345` must still match verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizIndex {
    Id(i64, String),
    Code(String),
}

impl QuizIndex {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => QuizIndex::Id(id, raw.to_string()),
            Err(_) => QuizIndex::Code(raw.to_string()),
        }
    }

    /// The index as it appeared in the URL.
    pub fn as_str(&self) -> &str {
        match self {
            QuizIndex::Id(_, raw) | QuizIndex::Code(raw) => raw,
        }
    }
}

impl fmt::Display for QuizIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for `Quizzes::create`. The code is generated, never supplied.
#[derive(Debug, Clone)]
pub struct QuizCreate {
    pub name: String,
    pub description: String,
    pub number_of_questions: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub teacher_id: i64,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 200))]
    pub number_of_questions: i64,
    pub due_date: Option<DateTime<Utc>>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 200))]
    pub number_of_questions: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    /// Exact-name filter.
    pub name: Option<String>,
}

/// A quiz together with its questions and their choices.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionDetail>,
}

/// A quiz the current student took, with their latest attempt.
#[derive(Debug, Serialize)]
pub struct ParticipatedQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub attempt_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub answers: Vec<Answer>,
}

/// One participant's latest attempt at a quiz, as seen by the author.
#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub attempt_id: i64,
    pub student_id: i64,
    pub participant_name: String,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub answers: Vec<Answer>,
}

/// Row of the scores table.
#[derive(Debug, Serialize)]
pub struct QuizScore {
    pub id: i64,
    pub username: String,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn index_parses_ids_and_codes() {
        assert_eq!(QuizIndex::parse("42"), QuizIndex::Id(42, "42".into()));
        assert_eq!(QuizIndex::parse("aB3xZ9"), QuizIndex::Code("aB3xZ9".into()));
        assert_eq!(QuizIndex::parse("007abc").to_string(), "007abc");
    }

    #[test]
    fn numeric_index_keeps_leading_zeros() {
        let index = QuizIndex::parse("012345");
        assert_eq!(index, QuizIndex::Id(12345, "012345".into()));
        assert_eq!(index.as_str(), "012345");
    }

    #[test]
    fn past_due_only_after_due_date() {
        let now = Utc::now();
        let mut quiz = Quiz {
            id: 1,
            name: "Rust basics".into(),
            description: String::new(),
            number_of_questions: 3,
            quiz_code: "abc123".into(),
            created_at: now,
            due_date: None,
            teacher_id: 7,
        };
        assert!(!quiz.is_past_due(now));

        quiz.due_date = Some(now + Duration::hours(1));
        assert!(!quiz.is_past_due(now));

        quiz.due_date = Some(now - Duration::hours(1));
        assert!(quiz.is_past_due(now));
    }
}
