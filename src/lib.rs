// src/lib.rs

pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod runner;
pub mod session;
pub mod state;
pub mod timer;
pub mod utils;

pub use backend::{ExamBackend, HttpExamBackend, StaticToken, TokenSource};
pub use error::AppError;
pub use routes::create_router;
pub use runner::{ExamRunner, SessionSnapshot};
pub use session::{ExamSession, Phase};
