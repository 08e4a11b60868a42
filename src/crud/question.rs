// src/crud/question.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    crud::base::{CrudBase, CrudUpdate, SetClause},
    error::AppError,
    models::question::{Question, QuestionCreate, UpdateQuestionRequest},
};

const COLUMNS: &str = "id, quiz_id, content, position, points, created_at";

/// Data access for the 'quiz_questions' table.
pub struct Questions;

impl Questions {
    /// Questions of a quiz in display order.
    pub async fn get_multi_by_quiz(
        &self,
        pool: &SqlitePool,
        quiz_id: i64,
    ) -> Result<Vec<Question>, AppError> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {COLUMNS} FROM quiz_questions WHERE quiz_id = ? ORDER BY position, id"
        ))
        .bind(quiz_id)
        .fetch_all(pool)
        .await?;

        Ok(questions)
    }

    pub async fn count_by_quiz(&self, pool: &SqlitePool, quiz_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Whether the choice belongs to the question.
    pub async fn has_choice(
        &self,
        pool: &SqlitePool,
        question_id: i64,
        choice_id: i64,
    ) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_choices WHERE id = ? AND question_id = ?",
        )
        .bind(choice_id)
        .bind(question_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl CrudBase for Questions {
    type Model = Question;
    type Create = QuestionCreate;

    const TABLE: &'static str = "quiz_questions";
    const COLUMNS: &'static str = COLUMNS;

    async fn create(&self, pool: &SqlitePool, obj_in: &QuestionCreate) -> Result<Question, AppError> {
        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO quiz_questions (quiz_id, content, position, points, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(obj_in.quiz_id)
        .bind(&obj_in.content)
        .bind(obj_in.position)
        .bind(obj_in.points)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(question)
    }
}

#[async_trait]
impl CrudUpdate for Questions {
    type Update = UpdateQuestionRequest;

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &UpdateQuestionRequest,
    ) -> Result<Option<Question>, AppError> {
        let mut clause = SetClause::new(Self::TABLE);
        clause
            .set("content", obj_in.content.clone())
            .set("position", obj_in.position)
            .set("points", obj_in.points);

        if clause.is_empty() {
            return self.get(pool, id).await;
        }

        Ok(clause.execute(pool, id, COLUMNS).await?)
    }
}
