// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use exam_session::{
    clock::ManualClock,
    config::Config,
    models::{exam::ExamDefinition, question::Question},
    routes,
    state::{AppState, ExamStore},
    utils::jwt::sign_jwt,
};

pub const SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub store: ExamStore,
    /// The backend's notion of "now".
    pub clock: ManualClock,
}

impl TestApp {
    pub fn token_for(&self, student_id: &str) -> String {
        sign_jwt(student_id, SECRET, 600).expect("Failed to sign token")
    }

    pub fn config(&self) -> Config {
        test_config(&self.address)
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 14, 0, 0).unwrap()
}

pub fn test_config(address: &str) -> Config {
    let address = address.to_string();
    Config::from_lookup(move |key| match key {
        "EXAM_API_BASE_URL" => Some(address.clone()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        "EXAM_SUBMIT_GRACE_SECS" => Some("60".to_string()),
        "RUST_LOG" => Some("error".to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

/// An exam that opened an hour before `t0` and closes `ends_in` after it.
pub fn sample_exam(id: &str, ends_in: Duration, duration_minutes: u32) -> ExamDefinition {
    let question = |id: &str, options: &[&str], answer: &str| Question {
        id: id.to_string(),
        text: format!("Question {}", id),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: Some(answer.to_string()),
    };

    ExamDefinition {
        id: id.to_string(),
        course_id: None,
        title: "Ancient Architecture Final".to_string(),
        start_date: t0() - Duration::hours(1),
        end_date: t0() + ends_in,
        duration_minutes,
        questions: vec![
            question("q1", &["Dougong", "Arch", "Dome"], "Dougong"),
            question("q2", &["Wood", "Stone"], "Wood"),
            question("q3", &["Ming", "Qing", "Song"], "Ming"),
        ],
    }
}

/// Spawns the reference backend on a random port.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") with its store and clock.
pub async fn spawn_app() -> TestApp {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = ExamStore::new();
    let clock = ManualClock::new(t0());
    let state = AppState {
        store: store.clone(),
        config: test_config(&address),
        clock: Arc::new(clock.clone()),
    };
    let app = routes::create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        clock,
    }
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
