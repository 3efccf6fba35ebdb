//! Integration tests for the chat session against a mock completion API.

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stratus_chat::client::{ChatError, CompletionClient};
use stratus_chat::session::ChatSession;
use stratus_chat::types::Author;

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

fn client_for(server: &MockServer) -> CompletionClient {
    CompletionClient::new(Some("test-key".into()), "openai/gpt-3.5-turbo", 150, 0.7)
        .unwrap()
        .with_base_url(&server.uri())
}

#[tokio::test]
async fn test_send_round_trip_appends_both_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "openai/gpt-3.5-turbo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Pack an umbrella, showers are likely this afternoon. ☔",
        )))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server));
    let reply = session.send("Will it rain today?", Utc::now()).await.unwrap();

    assert_eq!(reply.author, Author::Assistant);
    assert!(reply.text.contains("umbrella"));

    // Greeting + user + assistant
    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].author, Author::User);
    assert_eq!(messages[1].text, "Will it rain today?");
    assert_eq!(messages[2].text, reply.text);
}

#[tokio::test]
async fn test_history_is_forwarded_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Sure!")))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server));
    let t0 = Utc::now();
    session.send("First question", t0).await.unwrap();
    session.send("Second question", t0 + Duration::seconds(2)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let second: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    let messages = second["messages"].as_array().unwrap();
    // system + greeting + q1 + a1 + q2
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[2]["content"], "First question");
    assert_eq!(messages[4]["content"], "Second question");
}

#[tokio::test]
async fn test_api_error_is_surfaced_and_user_message_kept() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server));
    let result = session.send("Hello?", Utc::now()).await;

    match result {
        Err(ChatError::Api { status, message }) => {
            assert_eq!(status, 429);
            assert!(message.contains("slow down"));
        }
        other => panic!("expected Api error, got {:?}", other.map(|m| m.text)),
    }
    // The user's message was admitted and stays in the log.
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_cooldown_rejects_second_send_in_same_second() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi!")))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server));
    let t0 = Utc::now();
    session.send("one", t0).await.unwrap();

    let rejected = session.send("two", t0 + Duration::milliseconds(500)).await;
    match rejected {
        Err(ChatError::RateLimited(rejection)) => {
            assert_eq!(rejection.retry_after_secs, 1);
        }
        other => panic!("expected RateLimited, got {:?}", other.map(|m| m.text)),
    }
}

#[tokio::test]
async fn test_empty_completion_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let mut session = ChatSession::new(client_for(&server));
    let result = session.send("Hello?", Utc::now()).await;
    assert!(matches!(result, Err(ChatError::EmptyCompletion)));
}

#[tokio::test]
async fn test_summarize_uses_summary_prompt_and_skips_log() {
    use chrono::NaiveDate;
    use stratus_weather::types::{
        CurrentConditions, TemperatureUnit, WeatherSnapshot,
    };

    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Mild and dry — a great evening for a walk. 🌤️",
        )))
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let snapshot = WeatherSnapshot {
        current: CurrentConditions {
            time: date.and_hms_opt(12, 0, 0).unwrap(),
            temperature: 18.0,
            apparent_temperature: 18.0,
            relative_humidity: 50,
            weather_code: 0,
            wind_speed: 8.0,
            wind_direction: 90.0,
            dew_point: 8.0,
            pressure_msl: 1015.0,
        },
        daily: Vec::new(),
        hourly: Vec::new(),
        fetched_at: Utc::now(),
    };

    let mut session = ChatSession::new(client_for(&server));
    let summary = session
        .summarize(&snapshot, "Lisbon, Portugal", TemperatureUnit::Celsius, Utc::now())
        .await
        .unwrap();
    assert!(summary.contains("walk"));

    // The summary is not part of the conversation.
    assert_eq!(session.messages().len(), 1);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system = body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("summarization"));
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("Current Weather at Lisbon, Portugal"));
}
