// src/crud/base.rs

use async_trait::async_trait;
use sqlx::{Encode, FromRow, QueryBuilder, Sqlite, SqlitePool, Type, sqlite::SqliteRow};

use crate::{error::AppError, models::pagination::Pagination};

/// Read, create and delete operations shared by every table.
///
/// Implementors name their table and the column list matching `Model`;
/// the default methods build the SQL from those.
#[async_trait]
pub trait CrudBase: Send + Sync {
    type Model: for<'r> FromRow<'r, SqliteRow> + Send + Unpin;
    type Create: Send + Sync;

    const TABLE: &'static str;
    const COLUMNS: &'static str;

    /// Fetches a row by primary key.
    async fn get(&self, pool: &SqlitePool, id: i64) -> Result<Option<Self::Model>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", Self::COLUMNS, Self::TABLE);

        let row = sqlx::query_as::<_, Self::Model>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row)
    }

    /// Fetches one page of rows ordered by id.
    async fn get_multi(
        &self,
        pool: &SqlitePool,
        page: &Pagination,
    ) -> Result<Vec<Self::Model>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT ? OFFSET ?",
            Self::COLUMNS,
            Self::TABLE
        );

        let rows = sqlx::query_as::<_, Self::Model>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Inserts a row and returns it as stored.
    async fn create(&self, pool: &SqlitePool, obj_in: &Self::Create) -> Result<Self::Model, AppError>;

    /// Deletes a row by primary key and returns it, or `None` if it did not exist.
    async fn remove(&self, pool: &SqlitePool, id: i64) -> Result<Option<Self::Model>, AppError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? RETURNING {}",
            Self::TABLE,
            Self::COLUMNS
        );

        let row = sqlx::query_as::<_, Self::Model>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        if row.is_some() {
            tracing::debug!("Removed {} row {}", Self::TABLE, id);
        }

        Ok(row)
    }
}

/// Partial updates. Kept apart from [`CrudBase`] because some rows
/// (attempts) are never edited after creation.
#[async_trait]
pub trait CrudUpdate: CrudBase {
    type Update: Send + Sync;

    /// Writes every `Some` field of `obj_in`. Returns the refreshed row,
    /// or `None` if no row has that id.
    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &Self::Update,
    ) -> Result<Option<Self::Model>, AppError>;
}

/// Builds `UPDATE <table> SET a = ?, b = ? WHERE id = ? RETURNING ...`
/// from optional values.
pub struct SetClause<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    assignments: usize,
}

impl<'a> SetClause<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            builder: QueryBuilder::new(format!("UPDATE {table} SET ")),
            assignments: 0,
        }
    }

    /// Adds `column = value` when `value` is present.
    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Sqlite> + Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            if self.assignments > 0 {
                self.builder.push(", ");
            }
            self.builder.push(column);
            self.builder.push(" = ");
            self.builder.push_bind(value);
            self.assignments += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments == 0
    }

    /// Runs the update against row `id` and returns the refreshed row.
    pub async fn execute<M>(
        mut self,
        pool: &SqlitePool,
        id: i64,
        columns: &str,
    ) -> Result<Option<M>, sqlx::Error>
    where
        M: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        self.builder.push(" WHERE id = ");
        self.builder.push_bind(id);
        self.builder.push(" RETURNING ");
        self.builder.push(columns);

        self.builder.build_query_as::<M>().fetch_optional(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clause_skips_missing_values() {
        let mut clause = SetClause::new("quizzes");
        clause.set::<String>("name", None);
        assert!(clause.is_empty());

        clause
            .set("name", Some("Intro".to_string()))
            .set::<i64>("number_of_questions", None)
            .set("description", Some("Warm-up".to_string()));
        assert!(!clause.is_empty());
        assert_eq!(
            clause.builder.sql(),
            "UPDATE quizzes SET name = ?, description = ?"
        );
    }
}
