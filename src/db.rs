// src/db.rs

//! Connection setup, migrations and initial data.

use std::str::FromStr;

use rand::Rng;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    config::{
        Config, DEMO_CHOICES_PER_QUESTION, DEMO_QUESTIONS_PER_QUIZ, DEMO_QUIZ_COUNT, SeedUser,
    },
    crud::{Choices, CrudBase, Questions, Quizzes, Users},
    error::AppError,
    models::{
        choice::ChoiceCreate,
        pagination::Pagination,
        question::QuestionCreate,
        quiz::QuizCreate,
        user::{User, UserCreate},
    },
};

/// Tables in drop order (children first).
const TABLES: [&str; 7] = [
    "quiz_answers",
    "quiz_attempts",
    "quiz_choices",
    "quiz_questions",
    "quizzes",
    "users",
    "_sqlx_migrations",
];

/// Opens a pool, creating the database file if needed.
/// An in-memory database lives in a single connection that is never
/// recycled, since closing it discards the data.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:");
    let mut pool_options =
        SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { max_connections });
    if in_memory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    pool_options.connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Drops every table, including the migration ledger.
pub async fn drop_db(pool: &SqlitePool) -> Result<(), AppError> {
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await?;
    }
    tracing::info!("Dropped all tables");
    Ok(())
}

/// Seeds the configured accounts and, when enabled, demo quizzes.
/// Safe to run on every start: existing accounts and quizzes are kept.
pub async fn init_db(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let superuser = match &config.first_superuser {
        Some(seed) => Some(ensure_user(pool, seed, Role::Superuser).await?),
        None => None,
    };
    let teacher = match &config.first_teacher {
        Some(seed) => Some(ensure_user(pool, seed, Role::Teacher).await?),
        None => None,
    };
    if let Some(seed) = &config.first_student {
        ensure_user(pool, seed, Role::Student).await?;
    }

    if config.seed_demo_data {
        match teacher.or(superuser) {
            Some(author) => seed_demo_quizzes(pool, &author).await?,
            None => tracing::warn!("SEED_DEMO_DATA is set but no teacher or superuser is configured"),
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Superuser,
    Teacher,
    Student,
}

async fn ensure_user(pool: &SqlitePool, seed: &SeedUser, role: Role) -> Result<User, AppError> {
    if let Some(user) = Users.get_by_username(pool, &seed.username).await? {
        return Ok(user);
    }

    tracing::info!("Seeding {:?} account: {}", role, seed.username);
    let user_in = UserCreate {
        username: seed.username.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        first_name: seed.first_name.clone(),
        last_name: seed.last_name.clone(),
        is_student: matches!(role, Role::Student),
        is_teacher: matches!(role, Role::Teacher | Role::Superuser),
        is_superuser: matches!(role, Role::Superuser),
    };

    Users.create(pool, &user_in).await
}

/// Creates demo quizzes with one correct choice per question, unless the
/// author already has quizzes.
async fn seed_demo_quizzes(pool: &SqlitePool, author: &User) -> Result<(), AppError> {
    let existing = Quizzes
        .get_multi_by_author(pool, author.id, &Pagination::new(0, 1))
        .await?;
    if !existing.is_empty() {
        tracing::info!("Demo quizzes already present, skipping");
        return Ok(());
    }

    for quiz_no in 1..=DEMO_QUIZ_COUNT {
        let quiz = Quizzes
            .create(
                pool,
                &QuizCreate {
                    name: format!("Demo quiz {quiz_no}"),
                    description: "Generated sample quiz".to_string(),
                    number_of_questions: DEMO_QUESTIONS_PER_QUIZ,
                    due_date: None,
                    teacher_id: author.id,
                },
            )
            .await?;

        for question_no in 1..=DEMO_QUESTIONS_PER_QUIZ {
            let question = Questions
                .create(
                    pool,
                    &QuestionCreate {
                        quiz_id: quiz.id,
                        content: format!("Question {question_no} of {}", quiz.name),
                        position: question_no,
                        points: 1,
                    },
                )
                .await?;

            let index_correct = rand::thread_rng().gen_range(0..DEMO_CHOICES_PER_QUESTION);
            for choice_no in 0..DEMO_CHOICES_PER_QUESTION {
                Choices
                    .create(
                        pool,
                        &ChoiceCreate {
                            question_id: question.id,
                            content: format!("Choice {}", choice_no + 1),
                            is_correct: choice_no == index_correct,
                        },
                    )
                    .await?;
            }
        }
    }

    tracing::info!("Seeded {} demo quizzes for {}", DEMO_QUIZ_COUNT, author.username);
    Ok(())
}
