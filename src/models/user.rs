// src/models/user.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid username pattern"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    pub is_student: bool,
    pub is_teacher: bool,
    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Role carried in access tokens. Superuser wins over teacher, teacher over student.
    pub fn role(&self) -> &'static str {
        if self.is_superuser {
            "superuser"
        } else if self.is_teacher {
            "teacher"
        } else {
            "student"
        }
    }
}

/// Input for `Users::create`. Also the body of the superuser-only create endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(
        length(min = 3, max = 50, message = "Username length must be between 3 and 50 characters."),
        regex(path = *USERNAME_RE, message = "Username may only contain letters, digits, '_', '.' and '-'.")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 4, max = 128, message = "Password length must be between 4 and 128 characters."))]
    pub password: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(
        length(min = 3, max = 50),
        regex(path = *USERNAME_RE)
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub is_student: Option<bool>,
    pub is_teacher: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// DTO for self-registration. Creates a student unless `is_teacher` is set.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username length must be between 3 and 50 characters."),
        regex(path = *USERNAME_RE, message = "Username may only contain letters, digits, '_', '.' and '-'.")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 4, max = 128, message = "Password length must be between 4 and 128 characters."))]
    pub password: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_teacher: bool,
}

impl From<RegisterRequest> for UserCreate {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            is_student: !req.is_teacher,
            is_teacher: req.is_teacher,
            is_superuser: false,
        }
    }
}

/// DTO for a user editing their own profile. Role flags are not editable here.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

impl From<ProfileUpdate> for UserUpdate {
    fn from(req: ProfileUpdate) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            ..Default::default()
        }
    }
}

/// DTO for user login. `username` may also be the account's email.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
