// tests/api_tests.rs

mod common;

use chrono::Duration;
use common::{sample_exam, spawn_app, unique};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn exam_requires_bearer_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let course = unique("course");
    app.store
        .insert_exam(&course, sample_exam(&unique("exam"), Duration::hours(1), 30))
        .await
        .unwrap();

    let response = client
        .get(&format!("{}/api/courses/{}/exam", app.address, course))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert!(body["error"].is_string());

    let response = client
        .get(&format!("{}/api/courses/{}/exam", app.address, course))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn exam_payload_hides_answer_key() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let course = unique("course");
    let exam_id = unique("exam");
    app.store
        .insert_exam(&course, sample_exam(&exam_id, Duration::hours(1), 30))
        .await
        .unwrap();

    let body = client
        .get(&format!("{}/api/courses/{}/exam", app.address, course))
        .bearer_auth(app.token_for("1"))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();

    assert_eq!(body["id"], exam_id);
    assert_eq!(body["durationMinutes"], 30);
    assert_eq!(body["questions"].as_array().unwrap().len(), 3);
    assert!(body["questions"][0].get("correctAnswer").is_none());
}

#[tokio::test]
async fn unknown_course_is_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/api/courses/{}/exam", app.address, unique("nothing")))
        .bearer_auth(app.token_for("1"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submission_flow() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let course = unique("course");
    let exam_id = unique("exam");
    app.store
        .insert_exam(&course, sample_exam(&exam_id, Duration::hours(1), 30))
        .await
        .unwrap();
    let token = app.token_for("student-a");
    let url = format!("{}/api/exams/{}/submission", app.address, exam_id);

    // 1. Nothing submitted yet
    let before = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(before.status().as_u16(), 200);
    assert!(before.json::<serde_json::Value>().await.unwrap().is_null());

    // 2. Submit
    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&serde_json::json!({"answers": {"q1": "Arch", "q2": "Wood"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let record = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(record["examId"], exam_id);
    assert_eq!(record["answers"]["q1"], "Arch");
    assert!(record.get("score").is_none());

    // 3. It is now visible to the same student only
    let after = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert_eq!(after["answers"]["q2"], "Wood");

    let other = client
        .get(&url)
        .bearer_auth(app.token_for("student-b"))
        .send()
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .await
        .unwrap();
    assert!(other.is_null());

    // 4. A second attempt is refused
    let again = client
        .post(&url)
        .bearer_auth(&token)
        .json(&serde_json::json!({"answers": {"q1": "Dougong"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 409);
}

#[tokio::test]
async fn submission_rejects_foreign_answers() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let course = unique("course");
    let exam_id = unique("exam");
    app.store
        .insert_exam(&course, sample_exam(&exam_id, Duration::hours(1), 30))
        .await
        .unwrap();
    let url = format!("{}/api/exams/{}/submission", app.address, exam_id);
    let token = app.token_for("student-c");

    for body in [
        serde_json::json!({"answers": {"q99": "Wood"}}),
        serde_json::json!({"answers": {"q2": "Glass"}}),
        serde_json::json!({"answers": {"q2": ""}}),
    ] {
        let response = client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "body: {}", body);
    }

    // Malformed payloads are rejected by the extractor.
    let response = client
        .post(&url)
        .bearer_auth(&token)
        .json(&serde_json::json!({"answers": ["q1", "Wood"]}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // None of the rejected attempts counted.
    assert!(app.store.submission(&exam_id, "student-c").await.is_none());
}

#[tokio::test]
async fn submission_closes_after_grace_period() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let course = unique("course");
    let exam_id = unique("exam");
    app.store
        .insert_exam(&course, sample_exam(&exam_id, Duration::minutes(10), 30))
        .await
        .unwrap();
    let url = format!("{}/api/exams/{}/submission", app.address, exam_id);

    // Inside the grace period
    app.clock.advance(Duration::minutes(10) + Duration::seconds(30));
    let response = client
        .post(&url)
        .bearer_auth(app.token_for("on-time"))
        .json(&serde_json::json!({"answers": {"q1": "Dome"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Past it
    app.clock.advance(Duration::seconds(31));
    let response = client
        .post(&url)
        .bearer_auth(app.token_for("late"))
        .json(&serde_json::json!({"answers": {"q1": "Dome"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
