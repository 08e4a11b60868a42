// src/crud/choice.rs

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    crud::base::{CrudBase, CrudUpdate, SetClause},
    error::AppError,
    models::choice::{Choice, ChoiceCreate, UpdateChoiceRequest},
};

const COLUMNS: &str = "id, question_id, content, is_correct";

/// Data access for the 'quiz_choices' table.
pub struct Choices;

impl Choices {
    pub async fn get_multi_by_question(
        &self,
        pool: &SqlitePool,
        question_id: i64,
    ) -> Result<Vec<Choice>, AppError> {
        let choices = sqlx::query_as::<_, Choice>(&format!(
            "SELECT {COLUMNS} FROM quiz_choices WHERE question_id = ? ORDER BY id"
        ))
        .bind(question_id)
        .fetch_all(pool)
        .await?;

        Ok(choices)
    }
}

#[async_trait]
impl CrudBase for Choices {
    type Model = Choice;
    type Create = ChoiceCreate;

    const TABLE: &'static str = "quiz_choices";
    const COLUMNS: &'static str = COLUMNS;

    async fn create(&self, pool: &SqlitePool, obj_in: &ChoiceCreate) -> Result<Choice, AppError> {
        let choice = sqlx::query_as::<_, Choice>(&format!(
            r#"
            INSERT INTO quiz_choices (question_id, content, is_correct)
            VALUES (?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(obj_in.question_id)
        .bind(&obj_in.content)
        .bind(obj_in.is_correct)
        .fetch_one(pool)
        .await?;

        Ok(choice)
    }
}

#[async_trait]
impl CrudUpdate for Choices {
    type Update = UpdateChoiceRequest;

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &UpdateChoiceRequest,
    ) -> Result<Option<Choice>, AppError> {
        let mut clause = SetClause::new(Self::TABLE);
        clause
            .set("content", obj_in.content.clone())
            .set("is_correct", obj_in.is_correct);

        if clause.is_empty() {
            return self.get(pool, id).await;
        }

        Ok(clause.execute(pool, id, COLUMNS).await?)
    }
}
