// src/crud/quiz.rs

use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use sqlx::SqlitePool;

use crate::{
    config::QUIZ_CODE_LENGTH,
    crud::{
        answer::Answers,
        attempt::Attempts,
        base::{CrudBase, CrudUpdate, SetClause},
        user::Users,
    },
    error::AppError,
    models::{
        pagination::Pagination,
        quiz::{ParticipatedQuiz, Quiz, QuizCreate, QuizIndex, QuizResult, UpdateQuizRequest},
    },
};

const COLUMNS: &str =
    "id, name, description, number_of_questions, quiz_code, created_at, due_date, teacher_id";

/// How many times `create` re-rolls the code after losing an insert race.
const CODE_INSERT_RETRIES: usize = 5;

/// Draws `QUIZ_CODE_LENGTH` characters from `[A-Za-z0-9]`.
pub fn random_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(QUIZ_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Data access for the 'quizzes' table.
pub struct Quizzes;

impl Quizzes {
    /// Generates a code no existing quiz uses.
    pub async fn generate_code(&self, pool: &SqlitePool) -> Result<String, AppError> {
        loop {
            let code = random_code();
            if self.get_by_code(pool, &code).await?.is_none() {
                return Ok(code);
            }
            tracing::debug!("Quiz code {} already taken, drawing again", code);
        }
    }

    pub async fn get_by_code(&self, pool: &SqlitePool, code: &str) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {COLUMNS} FROM quizzes WHERE quiz_code = ?"
        ))
        .bind(code)
        .fetch_optional(pool)
        .await?;

        Ok(quiz)
    }

    /// Resolves an id or a code. A numeric index that matches no id is
    /// retried as a code, since codes may consist of digits only.
    pub async fn get_by_index(
        &self,
        pool: &SqlitePool,
        index: &QuizIndex,
    ) -> Result<Option<Quiz>, AppError> {
        match index {
            QuizIndex::Id(id, raw) => match self.get(pool, *id).await? {
                Some(quiz) => Ok(Some(quiz)),
                None => self.get_by_code(pool, raw).await,
            },
            QuizIndex::Code(code) => self.get_by_code(pool, code).await,
        }
    }

    /// Quizzes with exactly this name. Names are not unique.
    pub async fn get_multi_by_name(
        &self,
        pool: &SqlitePool,
        name: &str,
        page: &Pagination,
    ) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {COLUMNS} FROM quizzes WHERE name = ? ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(quizzes)
    }

    /// Quizzes authored by the teacher.
    pub async fn get_multi_by_author(
        &self,
        pool: &SqlitePool,
        teacher_id: i64,
        page: &Pagination,
    ) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {COLUMNS} FROM quizzes WHERE teacher_id = ? ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(teacher_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(quizzes)
    }

    /// Quizzes the student submitted, each with their latest attempt.
    pub async fn get_multi_by_participant(
        &self,
        pool: &SqlitePool,
        student_id: i64,
        page: &Pagination,
    ) -> Result<Vec<ParticipatedQuiz>, AppError> {
        let attempts = Attempts
            .get_multi_latest_by_student_id(pool, student_id, page)
            .await?;

        let mut quizzes = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            let Some(quiz) = self.get(pool, attempt.quiz_id).await? else {
                continue;
            };

            quizzes.push(ParticipatedQuiz {
                quiz,
                attempt_id: attempt.id,
                submitted_at: attempt.created_at,
                score: Attempts.get_score(pool, attempt.id).await?,
                answers: Answers.get_all_by_attempt(pool, attempt.id).await?,
            });
        }

        Ok(quizzes)
    }

    /// Latest attempt of every participant, for the quiz author.
    pub async fn get_multi_results_by_quiz_id(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
    ) -> Result<Vec<QuizResult>, AppError> {
        let attempts = Attempts.get_multi_latest_by_quiz_id(pool, quiz_id).await?;

        let mut results = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            let participant_name = Users
                .get(pool, attempt.student_id)
                .await?
                .map(|user| user.full_name())
                .unwrap_or_default();

            results.push(QuizResult {
                attempt_id: attempt.id,
                student_id: attempt.student_id,
                participant_name,
                submitted_at: attempt.created_at,
                score: Attempts.get_score(pool, attempt.id).await?,
                answers: Answers.get_all_by_attempt(pool, attempt.id).await?,
            });
        }

        Ok(results)
    }

    /// Whether the question belongs to the quiz.
    pub async fn has_question(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
        question_id: i64,
    ) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_questions WHERE id = ? AND quiz_id = ?",
        )
        .bind(question_id)
        .bind(quiz_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    /// Whether the user authored the quiz.
    pub async fn is_author(
        &self,
        pool: &SqlitePool,
        user_id: i64,
        quiz_id: i64,
    ) -> Result<bool, AppError> {
        let teacher_id: Option<i64> =
            sqlx::query_scalar("SELECT teacher_id FROM quizzes WHERE id = ?")
                .bind(quiz_id)
                .fetch_optional(pool)
                .await?;

        Ok(teacher_id == Some(user_id))
    }

    async fn insert(&self, pool: &SqlitePool, obj_in: &QuizCreate, code: &str) -> Result<Quiz, sqlx::Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            r#"
            INSERT INTO quizzes
            (name, description, number_of_questions, quiz_code, created_at, due_date, teacher_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&obj_in.name)
        .bind(&obj_in.description)
        .bind(obj_in.number_of_questions)
        .bind(code)
        .bind(Utc::now())
        .bind(obj_in.due_date)
        .bind(obj_in.teacher_id)
        .fetch_one(pool)
        .await
    }
}

#[async_trait]
impl CrudBase for Quizzes {
    type Model = Quiz;
    type Create = QuizCreate;

    const TABLE: &'static str = "quizzes";
    const COLUMNS: &'static str = COLUMNS;

    /// Assigns a freshly generated code. If another insert claims the same
    /// code first, the UNIQUE constraint fires and a new code is drawn.
    async fn create(&self, pool: &SqlitePool, obj_in: &QuizCreate) -> Result<Quiz, AppError> {
        for _ in 0..CODE_INSERT_RETRIES {
            let code = self.generate_code(pool).await?;

            match self.insert(pool, obj_in, &code).await {
                Ok(quiz) => {
                    tracing::info!("Created quiz {} with code {}", quiz.id, quiz.quiz_code);
                    return Ok(quiz);
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    tracing::warn!("Quiz code {} was claimed concurrently, retrying", code);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Conflict("Could not allocate a unique quiz code".to_string()))
    }
}

#[async_trait]
impl CrudUpdate for Quizzes {
    type Update = UpdateQuizRequest;

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &UpdateQuizRequest,
    ) -> Result<Option<Quiz>, AppError> {
        let mut clause = SetClause::new(Self::TABLE);
        clause
            .set("name", obj_in.name.clone())
            .set("description", obj_in.description.clone())
            .set("number_of_questions", obj_in.number_of_questions)
            .set("due_date", obj_in.due_date);

        if clause.is_empty() {
            return self.get(pool, id).await;
        }

        Ok(clause.execute(pool, id, COLUMNS).await?)
    }
}
