// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer, auth, choice, question, quiz, users},
    state::AppState,
    utils::jwt::{auth_middleware, superuser_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, quizzes).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route(
            "/profile",
            get(users::read_profile).put(users::update_profile),
        )
        .merge(
            Router::new()
                .route("/", get(users::list_users).post(users::create_user))
                .route(
                    "/{id}",
                    get(users::read_user)
                        .put(users::update_user)
                        .delete(users::delete_user),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    superuser_middleware,
                )),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route(
            "/{index}",
            get(quiz::read_quiz)
                .put(quiz::update_quiz)
                .delete(quiz::delete_quiz),
        )
        .route("/{index}/scores", get(quiz::read_quiz_scores))
        .route("/{index}/results", get(quiz::read_quiz_results))
        .route(
            "/{index}/questions",
            get(question::list_questions).post(question::create_question),
        )
        .route(
            "/{index}/questions/{question_id}",
            get(question::read_question)
                .put(question::update_question)
                .delete(question::delete_question),
        )
        .route(
            "/{index}/questions/{question_id}/choices",
            get(choice::list_choices).post(choice::create_choice),
        )
        .route(
            "/{index}/questions/{question_id}/choices/{choice_id}",
            get(choice::read_choice)
                .put(choice::update_choice)
                .delete(choice::delete_choice),
        )
        .route(
            "/{index}/questions/{question_id}/answer",
            put(answer::answer_question),
        )
        .route("/{index}/answers", get(answer::list_answers))
        .route("/{index}/attempts", get(answer::list_attempts))
        .route("/{index}/submit", post(answer::submit_quiz))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/quizzes", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
