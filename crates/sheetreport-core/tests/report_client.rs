use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sheetreport_core::{
    AppState, Backend, Category, Completion, GeminiClient, GenerationStatus, NewSalesRecord,
    OllamaClient, OpenAIClient, ReportClient, ReportError, SaleStatus, SalesRecord, StartError,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn consulting_pro() -> SalesRecord {
    SalesRecord {
        id: "1".to_string(),
        date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
        product: "Consulting Pro".to_string(),
        category: Category::Services,
        units: 5,
        revenue: Decimal::from(2500),
        status: SaleStatus::Completed,
    }
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": text }]
            },
            "finishReason": "STOP"
        }]
    })
}

fn gemini_client(server: &MockServer) -> ReportClient {
    let client = GeminiClient::with_base_url("test-key", &server.uri());
    ReportClient::new(Backend::Gemini(client), "gemini-2.5-flash")
}

/// Drive one generation cycle through the state the way the front end does
async fn run_generation(state: &mut AppState, client: &ReportClient) -> Completion {
    let ticket = state.begin_generation().unwrap();
    assert_eq!(state.status(), GenerationStatus::Generating);
    let result = client.generate(ticket.records()).await;
    state.complete_generation(ticket, result)
}

#[tokio::test]
async fn test_single_record_report_succeeds() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"One strong consulting sale.","keyInsights":["a","b"],"recommendation":"Sell more consulting."}"#;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = AppState::new(vec![consulting_pro()]);
    let client = gemini_client(&server);

    let outcome = run_generation(&mut state, &client).await;

    assert_eq!(outcome, Completion::Applied(GenerationStatus::Success));
    assert_eq!(state.status(), GenerationStatus::Success);
    let report = state.report().expect("report attached");
    assert_eq!(report.key_insights.len(), 2);
    assert_eq!(report.summary, "One strong consulting sale.");
    assert_eq!(report.recommendation, "Sell more consulting.");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();

    let start = prompt.find("Data: ").unwrap() + "Data: ".len();
    let end = start + prompt[start..].find('\n').unwrap();
    let sent: Vec<SalesRecord> = serde_json::from_str(&prompt[start..end]).unwrap();
    assert_eq!(sent, vec![consulting_pro()]);

    let schema = &body["generationConfig"]["responseSchema"];
    assert_eq!(schema["type"], "OBJECT");
    assert_eq!(schema["required"], json!(["summary", "keyInsights", "recommendation"]));
}

#[tokio::test]
async fn test_malformed_text_sets_error_without_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Sales look great!")))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = AppState::new(vec![consulting_pro()]);
    let outcome = run_generation(&mut state, &gemini_client(&server)).await;

    assert_eq!(outcome, Completion::Applied(GenerationStatus::Error));
    assert!(state.report().is_none());
    assert!(matches!(
        state.last_error(),
        Some(ReportError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_extra_field_is_rejected() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"s","keyInsights":["a"],"recommendation":"r","confidence":0.9}"#;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .mount(&server)
        .await;

    let err = gemini_client(&server).generate(&[consulting_pro()]).await.unwrap_err();
    assert!(matches!(err, ReportError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_missing_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = gemini_client(&server).generate(&[consulting_pro()]).await.unwrap_err();
    assert_eq!(err, ReportError::EmptyResponse);
}

#[tokio::test]
async fn test_http_failure_is_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = AppState::new(vec![consulting_pro()]);
    let outcome = run_generation(&mut state, &gemini_client(&server)).await;

    assert_eq!(outcome, Completion::Applied(GenerationStatus::Error));
    assert_eq!(
        state.last_error(),
        Some(&ReportError::Api {
            status: 403,
            body: "API key not valid".to_string()
        })
    );
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Nothing listens on the discard port
    let client = ReportClient::new(
        Backend::Gemini(GeminiClient::with_base_url("k", "http://127.0.0.1:9")),
        "gemini-2.5-flash",
    );
    let err = client.generate(&[consulting_pro()]).await.unwrap_err();
    assert!(matches!(err, ReportError::Transport { .. }));
}

#[tokio::test]
async fn test_empty_store_never_calls_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut state = AppState::new(Vec::new());
    assert_eq!(state.begin_generation().unwrap_err(), StartError::EmptyDataset);
    assert_eq!(state.status(), GenerationStatus::Idle);

    let err = gemini_client(&server).generate(state.records()).await.unwrap_err();
    assert_eq!(err, ReportError::EmptyDataset);
}

#[tokio::test]
async fn test_report_is_dated_on_completion() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"s","keyInsights":["a","b","c"],"recommendation":"r"}"#;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .mount(&server)
        .await;

    let before = Local::now().date_naive();
    let report = gemini_client(&server).generate(&[consulting_pro()]).await.unwrap();
    let after = Local::now().date_naive();

    assert!(report.generated_at >= before && report.generated_at <= after);
}

#[tokio::test]
async fn test_mutation_after_success_clears_report() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"s","keyInsights":["a","b"],"recommendation":"r"}"#;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = AppState::new(vec![consulting_pro()]);
    run_generation(&mut state, &gemini_client(&server)).await;
    assert!(state.report().is_some());

    state.add_record(NewSalesRecord {
        date: NaiveDate::from_ymd_opt(2023, 10, 20).unwrap(),
        product: "Training Day".to_string(),
        category: Category::Training,
        units: 1,
        revenue: Decimal::from(800),
        status: SaleStatus::Pending,
    });

    assert!(state.report().is_none());
    assert_eq!(state.status(), GenerationStatus::Idle);
}

#[tokio::test]
async fn test_superseded_request_result_is_discarded() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"old","keyInsights":["a"],"recommendation":"r"}"#;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .mount(&server)
        .await;

    let mut state = AppState::new(vec![consulting_pro()]);
    let client = gemini_client(&server);

    let ticket = state.begin_generation().unwrap();
    let pending = client.generate(ticket.records());
    state.remove_record("1");
    let result = pending.await;

    assert!(result.is_ok());
    assert_eq!(state.complete_generation(ticket, result), Completion::Stale);
    assert!(state.report().is_none());
    assert_eq!(state.status(), GenerationStatus::Idle);
}

#[tokio::test]
async fn test_openai_backend() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"s","keyInsights":["a","b"],"recommendation":"r"}"#;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_schema" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReportClient::new(
        Backend::OpenAI(OpenAIClient::with_base_url("sk-test", &server.uri())),
        "gpt-4o-mini",
    );
    let report = client.generate(&[consulting_pro()]).await.unwrap();
    assert_eq!(report.key_insights, vec!["a", "b"]);
}

#[tokio::test]
async fn test_ollama_backend_sends_schema_as_format() {
    let server = MockServer::start().await;
    let reply = r#"{"summary":"s","keyInsights":["a"],"recommendation":"r"}"#;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3.2:latest",
            "stream": false,
            "format": { "type": "object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2:latest",
            "response": reply,
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReportClient::new(
        Backend::Ollama(OllamaClient::new(&server.uri())),
        "llama3.2:latest",
    );
    let report = client.generate(&[consulting_pro()]).await.unwrap();
    assert_eq!(report.summary, "s");
}
