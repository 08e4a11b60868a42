// tests/crud_tests.rs

mod common;

use std::collections::HashSet;

use common::{PASSWORD, SUPERUSER, test_config, test_pool};
use quiz_backend::{
    config::{DEMO_CHOICES_PER_QUESTION, DEMO_QUESTIONS_PER_QUIZ, DEMO_QUIZ_COUNT, SeedUser},
    crud::{Answers, Attempts, Choices, CrudBase, CrudUpdate, Questions, Quizzes, Users},
    db,
    models::{
        answer::{AnswerCreate, AnswerUpdate},
        attempt::AttemptCreate,
        choice::{Choice, ChoiceCreate},
        pagination::Pagination,
        question::{Question, QuestionCreate},
        quiz::{QuizCreate, QuizIndex, UpdateQuizRequest},
        user::{User, UserCreate, UserUpdate},
    },
};
use sqlx::SqlitePool;

async fn teacher(pool: &SqlitePool, username: &str) -> User {
    Users
        .create(
            pool,
            &UserCreate {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: PASSWORD.to_string(),
                first_name: username.to_string(),
                last_name: "Teacher".to_string(),
                is_student: false,
                is_teacher: true,
                is_superuser: false,
            },
        )
        .await
        .unwrap()
}

/// A question with two choices, the first one correct.
async fn question_with_choices(pool: &SqlitePool, quiz_id: i64, position: i64) -> (Question, Vec<Choice>) {
    let question = Questions
        .create(
            pool,
            &QuestionCreate {
                quiz_id,
                content: format!("Question {}", position),
                position,
                points: 1,
            },
        )
        .await
        .unwrap();

    let mut choices = Vec::new();
    for (content, is_correct) in [("Yes", true), ("No", false)] {
        let choice = Choices
            .create(
                pool,
                &ChoiceCreate {
                    question_id: question.id,
                    content: content.to_string(),
                    is_correct,
                },
            )
            .await
            .unwrap();
        choices.push(choice);
    }

    (question, choices)
}

fn quiz_in(teacher_id: i64, name: &str) -> QuizCreate {
    QuizCreate {
        name: name.to_string(),
        description: String::new(),
        number_of_questions: 2,
        due_date: None,
        teacher_id,
    }
}

#[tokio::test]
async fn users_crud_roundtrip() {
    let config = test_config();
    let pool = test_pool(&config).await;

    let tina = teacher(&pool, "tina").await;
    assert_ne!(tina.password, PASSWORD, "password must be hashed");
    assert!(Users::is_teacher(&tina));
    assert!(!Users::is_superuser(&tina));

    let found = Users.get_by_email(&pool, "tina@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(tina.id));

    let update = UserUpdate {
        last_name: Some("Turner".to_string()),
        password: Some("new-secret".to_string()),
        ..Default::default()
    };
    let updated = Users.update(&pool, tina.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.full_name(), "tina Turner");

    assert!(Users.authenticate(&pool, "tina", PASSWORD).await.unwrap().is_none());
    assert!(Users.authenticate(&pool, "tina", "new-secret").await.unwrap().is_some());

    let page = Users.get_multi(&pool, &Pagination::new(0, 10)).await.unwrap();
    let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, [SUPERUSER, "tina"]);

    let removed = Users.remove(&pool, tina.id).await.unwrap();
    assert_eq!(removed.map(|u| u.id), Some(tina.id));
    assert!(Users.get(&pool, tina.id).await.unwrap().is_none());
    assert!(Users.remove(&pool, tina.id).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let config = test_config();
    let pool = test_pool(&config).await;
    teacher(&pool, "tina").await;

    let err = Users
        .create(
            &pool,
            &UserCreate {
                username: "tina".to_string(),
                email: "other@example.com".to_string(),
                password: PASSWORD.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                is_student: true,
                is_teacher: false,
                is_superuser: false,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, quiz_backend::error::AppError::Conflict(_)));
}

#[tokio::test]
async fn quiz_codes_are_unique() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;

    let mut codes = HashSet::new();
    for i in 0..50 {
        let quiz = Quizzes
            .create(&pool, &quiz_in(tina.id, &format!("Quiz {}", i)))
            .await
            .unwrap();
        assert!(codes.insert(quiz.quiz_code));
    }
    assert_eq!(codes.len(), 50);
}

#[tokio::test]
async fn quiz_lookup_by_index() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;
    let quiz = Quizzes.create(&pool, &quiz_in(tina.id, "Traits")).await.unwrap();

    let by_id = Quizzes
        .get_by_index(&pool, &QuizIndex::parse(&quiz.id.to_string()))
        .await
        .unwrap();
    assert_eq!(by_id.map(|q| q.id), Some(quiz.id));

    let by_code = Quizzes
        .get_by_index(&pool, &QuizIndex::parse(&quiz.quiz_code))
        .await
        .unwrap();
    assert_eq!(by_code.map(|q| q.id), Some(quiz.id));

    // A digits-only code that is not an id still resolves
    sqlx::query("UPDATE quizzes SET quiz_code = '424242' WHERE id = ?")
        .bind(quiz.id)
        .execute(&pool)
        .await
        .unwrap();
    let by_numeric_code = Quizzes
        .get_by_index(&pool, &QuizIndex::parse("424242"))
        .await
        .unwrap();
    assert_eq!(by_numeric_code.map(|q| q.id), Some(quiz.id));

    // Leading zeros are part of the code
    sqlx::query("UPDATE quizzes SET quiz_code = '012345' WHERE id = ?")
        .bind(quiz.id)
        .execute(&pool)
        .await
        .unwrap();
    let by_zero_padded_code = Quizzes
        .get_by_index(&pool, &QuizIndex::parse("012345"))
        .await
        .unwrap();
    assert_eq!(by_zero_padded_code.map(|q| q.id), Some(quiz.id));
    assert!(Quizzes
        .get_by_index(&pool, &QuizIndex::parse("12345"))
        .await
        .unwrap()
        .is_none());

    assert!(Quizzes
        .get_by_index(&pool, &QuizIndex::parse("nope00"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn quiz_partial_update_keeps_other_fields() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;
    let quiz = Quizzes.create(&pool, &quiz_in(tina.id, "Traits")).await.unwrap();

    let unchanged = Quizzes
        .update(&pool, quiz.id, &UpdateQuizRequest::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.name, "Traits");

    let update = UpdateQuizRequest {
        number_of_questions: Some(7),
        ..Default::default()
    };
    let updated = Quizzes.update(&pool, quiz.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.number_of_questions, 7);
    assert_eq!(updated.name, "Traits");
    assert_eq!(updated.quiz_code, quiz.quiz_code);

    assert!(Quizzes.update(&pool, 9_999, &update).await.unwrap().is_none());
}

#[tokio::test]
async fn attempts_and_scores() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;
    let student = Users
        .get_by_username(&pool, SUPERUSER)
        .await
        .unwrap()
        .unwrap();
    let quiz = Quizzes.create(&pool, &quiz_in(tina.id, "Traits")).await.unwrap();
    let question = Questions
        .create(
            &pool,
            &QuestionCreate {
                quiz_id: quiz.id,
                content: "Which trait enables `?`".to_string(),
                position: 0,
                points: 1,
            },
        )
        .await
        .unwrap();
    let right = Choices
        .create(
            &pool,
            &ChoiceCreate {
                question_id: question.id,
                content: "From".to_string(),
                is_correct: true,
            },
        )
        .await
        .unwrap();
    let wrong = Choices
        .create(
            &pool,
            &ChoiceCreate {
                question_id: question.id,
                content: "Clone".to_string(),
                is_correct: false,
            },
        )
        .await
        .unwrap();

    assert!(Quizzes.has_question(&pool, quiz.id, question.id).await.unwrap());
    assert!(Questions.has_choice(&pool, question.id, right.id).await.unwrap());
    assert!(Quizzes.is_author(&pool, tina.id, quiz.id).await.unwrap());
    assert!(!Quizzes.is_author(&pool, student.id, quiz.id).await.unwrap());

    // Nothing pending yet
    assert!(Attempts.submit(&pool, quiz.id, student.id, &[]).await.is_err());

    let first = Answers
        .upsert_pending(&pool, student.id, question.id, wrong.id)
        .await
        .unwrap();
    let again = Answers
        .upsert_pending(&pool, student.id, question.id, wrong.id)
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    let switched = Answers
        .upsert_pending(&pool, student.id, question.id, right.id)
        .await
        .unwrap();
    assert_eq!(switched.id, first.id);
    assert_eq!(switched.choice_id, right.id);

    let attempt = Attempts.submit(&pool, quiz.id, student.id, &[]).await.unwrap();
    assert_eq!(Attempts.get_score(&pool, attempt.id).await.unwrap(), 1);
    assert_eq!(Answers.get_all_by_attempt(&pool, attempt.id).await.unwrap().len(), 1);
    assert!(Answers
        .get_by_choice_and_user(&pool, right.id, student.id)
        .await
        .unwrap()
        .is_none());

    // An empty attempt created directly scores zero
    let empty = Attempts
        .create(
            &pool,
            &AttemptCreate {
                quiz_id: quiz.id,
                student_id: student.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(Attempts.get_score(&pool, empty.id).await.unwrap(), 0);

    let latest = Attempts.get_multi_latest_by_quiz_id(&pool, quiz.id).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, empty.id);

    let all = Attempts
        .get_multi_by_quiz_and_student(&pool, quiz.id, student.id)
        .await
        .unwrap();
    assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), [attempt.id, empty.id]);

    // Answers can also be filed straight into an attempt
    Answers
        .create(
            &pool,
            &AnswerCreate {
                attempt_id: Some(empty.id),
                student_id: student.id,
                question_id: question.id,
                choice_id: right.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(Attempts.get_score(&pool, empty.id).await.unwrap(), 1);
    assert_eq!(
        Answers
            .get_all_by_quiz_and_student_ids(&pool, quiz.id, student.id)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn init_db_seeds_demo_data_once() {
    let mut config = test_config();
    config.first_teacher = Some(SeedUser {
        username: "teacher".to_string(),
        email: "teacher@example.com".to_string(),
        password: PASSWORD.to_string(),
        first_name: "Terry".to_string(),
        last_name: "Teacher".to_string(),
    });
    config.first_student = Some(SeedUser {
        username: "student".to_string(),
        email: "student@example.com".to_string(),
        password: PASSWORD.to_string(),
        first_name: "Stu".to_string(),
        last_name: "Dent".to_string(),
    });
    config.seed_demo_data = true;

    let pool = test_pool(&config).await;
    // Second run is a no-op
    db::init_db(&pool, &config).await.unwrap();

    let users = Users.get_multi(&pool, &Pagination::default()).await.unwrap();
    assert_eq!(users.len(), 3);
    let student = Users.get_by_username(&pool, "student").await.unwrap().unwrap();
    assert!(Users::is_student(&student) && !Users::is_teacher(&student));

    let quizzes = Quizzes.get_multi(&pool, &Pagination::default()).await.unwrap();
    assert_eq!(quizzes.len(), DEMO_QUIZ_COUNT);

    for quiz in &quizzes {
        let questions = Questions.get_multi_by_quiz(&pool, quiz.id).await.unwrap();
        assert_eq!(questions.len() as i64, DEMO_QUESTIONS_PER_QUIZ);
        assert_eq!(Questions.count_by_quiz(&pool, quiz.id).await.unwrap(), DEMO_QUESTIONS_PER_QUIZ);

        for question in &questions {
            let choices = Choices.get_multi_by_question(&pool, question.id).await.unwrap();
            assert_eq!(choices.len(), DEMO_CHOICES_PER_QUESTION);
            assert_eq!(choices.iter().filter(|c| c.is_correct).count(), 1);
        }
    }
}

#[tokio::test]
async fn drop_db_allows_fresh_migration() {
    let config = test_config();
    let pool = test_pool(&config).await;
    teacher(&pool, "tina").await;

    db::drop_db(&pool).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let users = Users.get_multi(&pool, &Pagination::default()).await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn concurrent_answers_keep_one_pending_row() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;
    let student = Users.get_by_username(&pool, SUPERUSER).await.unwrap().unwrap();
    let quiz = Quizzes.create(&pool, &quiz_in(tina.id, "Traits")).await.unwrap();
    let (question, choices) = question_with_choices(&pool, quiz.id, 0).await;

    let (first, second) = tokio::join!(
        Answers.upsert_pending(&pool, student.id, question.id, choices[0].id),
        Answers.upsert_pending(&pool, student.id, question.id, choices[1].id),
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(first.id, second.id);

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM quiz_answers WHERE student_id = ? AND attempt_id IS NULL",
    )
    .bind(student.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 1);

    // Plain partial update on the pending row
    let edited = Answers
        .update(
            &pool,
            first.id,
            &AnswerUpdate {
                choice_id: Some(choices[0].id),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.choice_id, choices[0].id);
}

#[tokio::test]
async fn failed_submit_stores_nothing() {
    let config = test_config();
    let pool = test_pool(&config).await;
    let tina = teacher(&pool, "tina").await;
    let student = Users.get_by_username(&pool, SUPERUSER).await.unwrap().unwrap();
    let quiz = Quizzes.create(&pool, &quiz_in(tina.id, "Traits")).await.unwrap();
    let (first, first_choices) = question_with_choices(&pool, quiz.id, 0).await;
    let (second, _) = question_with_choices(&pool, quiz.id, 1).await;

    // Second pair points at a choice that does not exist
    let result = Attempts
        .submit(
            &pool,
            quiz.id,
            student.id,
            &[(first.id, first_choices[0].id), (second.id, 9_999)],
        )
        .await;
    assert!(result.is_err());

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_answers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
    assert!(Attempts
        .get_multi_by_quiz_and_student(&pool, quiz.id, student.id)
        .await
        .unwrap()
        .is_empty());

    let attempt = Attempts
        .submit(&pool, quiz.id, student.id, &[(first.id, first_choices[0].id)])
        .await
        .unwrap();
    assert_eq!(Attempts.get_score(&pool, attempt.id).await.unwrap(), 1);
}
