// tests/common/mod.rs

#![allow(dead_code)]

use quiz_backend::{
    config::{Config, SeedUser},
    db, routes,
    state::AppState,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;

pub const PASSWORD: &str = "password123";
pub const SUPERUSER: &str = "admin";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        first_superuser: Some(SeedUser {
            username: SUPERUSER.to_string(),
            email: "admin@example.com".to_string(),
            password: PASSWORD.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
        }),
        first_teacher: None,
        first_student: None,
        seed_demo_data: false,
        reset_db: false,
    }
}

/// Fresh in-memory database with migrations applied and accounts seeded.
pub async fn test_pool(config: &Config) -> SqlitePool {
    let pool = db::connect(&config.database_url, 1)
        .await
        .expect("Failed to open in-memory SQLite");

    db::run_migrations(&pool)
        .await
        .expect("Failed to migrate database");

    db::init_db(&pool, config)
        .await
        .expect("Failed to seed database");

    pool
}

/// Spawns the app on a random port over its own in-memory database.
pub async fn spawn_app() -> TestApp {
    let config = test_config();
    let pool = test_pool(&config).await;

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str, is_teacher: bool) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
                "first_name": username,
                "last_name": "Tester",
                "is_teacher": is_teacher,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str) -> String {
        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        body["token"].as_str().expect("Token not found").to_string()
    }

    /// Registers the account and returns its token.
    pub async fn student(&self, username: &str) -> String {
        assert_eq!(self.register(username, false).await.status().as_u16(), 201);
        self.login(username).await
    }

    pub async fn teacher(&self, username: &str) -> String {
        assert_eq!(self.register(username, true).await.status().as_u16(), 201);
        self.login(username).await
    }

    pub async fn superuser(&self) -> String {
        self.login(SUPERUSER).await
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Creates a quiz with `questions` questions, each with choices "A".."D"
    /// where "A" is correct. Returns the quiz JSON.
    pub async fn quiz_with_questions(&self, token: &str, questions: i64) -> Value {
        let quiz: Value = self
            .post("/api/quizzes", token)
            .json(&json!({
                "name": "Ownership",
                "description": "Borrowing and moves",
                "number_of_questions": questions,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let quiz_id = quiz["id"].as_i64().unwrap();

        for i in 0..questions {
            let question: Value = self
                .post(&format!("/api/quizzes/{}/questions", quiz_id), token)
                .json(&json!({ "content": format!("Question {}", i), "order": i }))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            let question_id = question["id"].as_i64().unwrap();

            for (label, correct) in [("A", true), ("B", false), ("C", false), ("D", false)] {
                let resp = self
                    .post(
                        &format!("/api/quizzes/{}/questions/{}/choices", quiz_id, question_id),
                        token,
                    )
                    .json(&json!({ "content": label, "is_correct": correct }))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(resp.status().as_u16(), 201);
            }
        }

        quiz
    }

    /// Reads the quiz as `token` and returns `(question_id, [choice ids])` pairs.
    pub async fn question_choices(&self, quiz_index: &str, token: &str) -> Vec<(i64, Vec<i64>)> {
        let detail: Value = self
            .get(&format!("/api/quizzes/{}", quiz_index), token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        detail["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| {
                let choices = q["choices"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|c| c["id"].as_i64().unwrap())
                    .collect();
                (q["id"].as_i64().unwrap(), choices)
            })
            .collect()
    }
}
