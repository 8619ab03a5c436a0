// src/models/mod.rs

pub mod answers;
pub mod exam;
pub mod question;
pub mod submission;
