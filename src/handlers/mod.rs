// src/handlers/mod.rs

pub mod exam;
