// src/handlers/mod.rs

pub mod answer;
pub mod auth;
pub mod choice;
pub mod deps;
pub mod question;
pub mod quiz;
pub mod users;
