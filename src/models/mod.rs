// src/models/mod.rs

pub mod answer;
pub mod attempt;
pub mod choice;
pub mod pagination;
pub mod question;
pub mod quiz;
pub mod user;
