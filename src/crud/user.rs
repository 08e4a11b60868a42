// src/crud/user.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    crud::base::{CrudBase, CrudUpdate, SetClause},
    error::AppError,
    models::user::{User, UserCreate, UserUpdate},
    utils::hash::{hash_password, verify_password},
};

const COLUMNS: &str = "id, username, email, password, first_name, last_name, \
                       is_student, is_teacher, is_superuser, created_at";

/// Data access for the 'users' table.
pub struct Users;

impl Users {
    pub async fn get_by_username(
        &self,
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(
        &self,
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Looks the user up by username, then by email, and checks the password.
    /// Returns `None` for an unknown login or a wrong password.
    pub async fn authenticate(
        &self,
        pool: &SqlitePool,
        login: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user = match self.get_by_username(pool, login).await? {
            Some(user) => Some(user),
            None => self.get_by_email(pool, login).await?,
        };

        let Some(user) = user else {
            return Ok(None);
        };

        if !verify_password(password, &user.password)? {
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub fn is_superuser(user: &User) -> bool {
        user.is_superuser
    }

    pub fn is_teacher(user: &User) -> bool {
        user.is_teacher
    }

    pub fn is_student(user: &User) -> bool {
        user.is_student
    }
}

#[async_trait]
impl CrudBase for Users {
    type Model = User;
    type Create = UserCreate;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = COLUMNS;

    /// Hashes the password with Argon2 before storing it.
    async fn create(&self, pool: &SqlitePool, obj_in: &UserCreate) -> Result<User, AppError> {
        let hashed_password = hash_password(&obj_in.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
            (username, email, password, first_name, last_name,
             is_student, is_teacher, is_superuser, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&obj_in.username)
        .bind(&obj_in.email)
        .bind(hashed_password)
        .bind(&obj_in.first_name)
        .bind(&obj_in.last_name)
        .bind(obj_in.is_student)
        .bind(obj_in.is_teacher)
        .bind(obj_in.is_superuser)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                format!("Username '{}' or email already exists", obj_in.username),
            ),
            e => AppError::from(e),
        })?;

        tracing::info!("Created user {} ({})", user.username, user.role());
        Ok(user)
    }
}

#[async_trait]
impl CrudUpdate for Users {
    type Update = UserUpdate;

    async fn update(
        &self,
        pool: &SqlitePool,
        id: i64,
        obj_in: &UserUpdate,
    ) -> Result<Option<User>, AppError> {
        let hashed_password = obj_in.password.as_deref().map(hash_password).transpose()?;

        let mut clause = SetClause::new(Self::TABLE);
        clause
            .set("username", obj_in.username.clone())
            .set("email", obj_in.email.clone())
            .set("password", hashed_password)
            .set("first_name", obj_in.first_name.clone())
            .set("last_name", obj_in.last_name.clone())
            .set("is_student", obj_in.is_student)
            .set("is_teacher", obj_in.is_teacher)
            .set("is_superuser", obj_in.is_superuser);

        if clause.is_empty() {
            return self.get(pool, id).await;
        }

        Ok(clause.execute(pool, id, COLUMNS).await?)
    }
}
