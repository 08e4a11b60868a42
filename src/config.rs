// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Length of generated quiz codes.
pub const QUIZ_CODE_LENGTH: usize = 6;

/// Default and maximum page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Name of the cookie carrying the access token.
pub const AUTH_COOKIE_NAME: &str = "access_token";

/// Demo data shape used by `db::init_db` when seeding is enabled.
pub const DEMO_QUIZ_COUNT: usize = 10;
pub const DEMO_QUESTIONS_PER_QUIZ: i64 = 5;
pub const DEMO_CHOICES_PER_QUESTION: usize = 4;

/// Credentials and names for an account created at startup.
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub first_superuser: Option<SeedUser>,
    pub first_teacher: Option<SeedUser>,
    pub first_student: Option<SeedUser>,
    pub seed_demo_data: bool,
    pub reset_db: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let seed_demo_data = flag_from_env("SEED_DEMO_DATA");
        let reset_db = flag_from_env("RESET_DB");

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            first_superuser: seed_user_from_env("FIRST_SUPERUSER"),
            first_teacher: seed_user_from_env("FIRST_TEACHER"),
            first_student: seed_user_from_env("FIRST_STUDENT"),
            seed_demo_data,
            reset_db,
        }
    }
}

fn flag_from_env(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Reads `{PREFIX}_USERNAME`, `{PREFIX}_EMAIL`, `{PREFIX}_PASSWORD` and the
/// optional name variables. Returns `None` unless all three required ones are set.
fn seed_user_from_env(prefix: &str) -> Option<SeedUser> {
    let var = |suffix: &str| env::var(format!("{prefix}_{suffix}")).ok();

    Some(SeedUser {
        username: var("USERNAME")?,
        email: var("EMAIL")?,
        password: var("PASSWORD")?,
        first_name: var("FIRSTNAME").unwrap_or_default(),
        last_name: var("LASTNAME").unwrap_or_default(),
    })
}
