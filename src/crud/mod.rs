// src/crud/mod.rs

//! Data-access layer. One unit struct per table, each implementing the
//! generic CRUD traits from [`base`] plus its own lookups.

pub mod answer;
pub mod attempt;
pub mod base;
pub mod choice;
pub mod question;
pub mod quiz;
pub mod user;

pub use answer::Answers;
pub use attempt::Attempts;
pub use base::{CrudBase, CrudUpdate};
pub use choice::Choices;
pub use question::Questions;
pub use quiz::Quizzes;
pub use user::Users;
