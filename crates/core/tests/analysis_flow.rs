mod common;

use common::{RecordingTransport, TEST_TOKEN, config_for, credential, solid};
use image::GenericImageView;
use medgemma_core::{
    AnalysisMode, AnalysisRequest, Config, Credential, ErrorKind, HttpTransport, InferenceResult,
    MedGemmaClient, ModelStatus, RawResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VISION_PATH: &str = "/models/google/medgemma-4b-it";
const TEXT_PATH: &str = "/models/google/medgemma-27b";

fn http_client(server: &MockServer) -> MedGemmaClient {
    MedGemmaClient::new(config_for(&server.uri())).unwrap()
}

async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json::<Value>().unwrap()
}

#[tokio::test]
async fn describe_returns_nested_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VISION_PATH))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[{"generated_text":[{"content":"normal chest"}]}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = http_client(&server);
    let result = client
        .run_analysis(AnalysisRequest::describe(solid(1, 1, [128, 128, 128])), credential())
        .await;

    assert_eq!(result, InferenceResult::success("normal chest"));

    let body = only_request_body(&server).await;
    let content = body["inputs"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["type"], json!("text"));
    assert_eq!(content[1]["type"], json!("image"));
    assert!(body.get("parameters").is_none());
}

#[tokio::test]
async fn clinical_reasoning_hits_text_model_with_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({
            "parameters": {"max_new_tokens": 400}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "Differential: ACS, PE, pericarditis"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = http_client(&server);
    let result = client
        .run_analysis(
            AnalysisRequest::clinical_reasoning("45M, chest pain worse on exertion"),
            credential(),
        )
        .await;

    assert_eq!(result, InferenceResult::success("Differential: ACS, PE, pericarditis"));

    let body = only_request_body(&server).await;
    let content = body["inputs"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert!(
        content[0]["text"]
            .as_str()
            .unwrap()
            .contains("45M, chest pain worse on exertion")
    );
}

#[tokio::test]
async fn compare_sends_one_merged_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VISION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "stable"}])))
        .mount(&server)
        .await;

    let client = http_client(&server);
    let request = AnalysisRequest::compare(solid(100, 50, [255, 0, 0]), solid(80, 70, [0, 0, 255]));
    let result = client.run_analysis(request, credential()).await;
    assert_eq!(result, InferenceResult::success("stable"));

    let body = only_request_body(&server).await;
    let content = body["inputs"][0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);

    let uri = content[1]["image"].as_str().unwrap();
    let encoded = uri.strip_prefix("data:image/png;base64,").unwrap();
    let merged = image::load_from_memory(&BASE64.decode(encoded).unwrap()).unwrap();
    assert_eq!(merged.dimensions(), (180, 70));
}

#[tokio::test]
async fn service_loading_is_reported_for_every_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "Model is currently loading",
            "estimated_time": 42.0
        })))
        .mount(&server)
        .await;

    let client = http_client(&server);
    let requests = [
        AnalysisRequest::describe(solid(2, 2, [0, 0, 0])),
        AnalysisRequest::answer(solid(2, 2, [0, 0, 0]), "Any effusion?"),
        AnalysisRequest::report(solid(2, 2, [0, 0, 0])),
        AnalysisRequest::compare(solid(2, 2, [0, 0, 0]), solid(3, 3, [0, 0, 0])),
        AnalysisRequest::clinical_reasoning("fever and cough"),
    ];

    for request in requests {
        let mode = request.mode;
        let result = client.run_analysis(request, credential()).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::ServiceLoading), "{}", mode);
    }
}

#[tokio::test]
async fn api_errors_embed_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
        .mount(&server)
        .await;

    let client = http_client(&server);
    let result = client
        .run_analysis(AnalysisRequest::report(solid(1, 1, [1, 1, 1])), Credential::new("bad"))
        .await;

    assert_eq!(
        result,
        InferenceResult::failure(ErrorKind::ApiError, "401 - Invalid credentials")
    );
}

#[tokio::test]
async fn unknown_success_shape_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"label": "pneumonia", "score": 0.9})))
        .mount(&server)
        .await;

    let client = http_client(&server);
    let result = client
        .run_analysis(AnalysisRequest::answer(solid(1, 1, [0, 0, 0]), "Diagnosis?"), credential())
        .await;

    let text = result.text().unwrap();
    let parsed: Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed, json!({"label": "pneumonia", "score": 0.9}));
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"generated_text": "too late"}]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::with_timeout(Duration::from_millis(100)).unwrap();
    let client = MedGemmaClient::with_transport(config_for(&server.uri()), transport);
    let result = client
        .run_analysis(AnalysisRequest::describe(solid(1, 1, [0, 0, 0])), credential())
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    // nothing listens on port 1
    let client = MedGemmaClient::new(config_for("http://127.0.0.1:1")).unwrap();
    let result = client
        .run_analysis(AnalysisRequest::describe(solid(1, 1, [0, 0, 0])), credential())
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn empty_clinical_text_issues_no_call() {
    let transport = RecordingTransport::new(RawResponse::new(200, "[]"));
    let client = MedGemmaClient::with_transport(Config::default(), transport.clone());

    let result = client
        .run_analysis(AnalysisRequest::clinical_reasoning("   "), credential())
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn missing_image_issues_no_call() {
    let transport = RecordingTransport::new(RawResponse::new(200, "[]"));
    let client = MedGemmaClient::with_transport(Config::default(), transport.clone());

    for mode in [AnalysisMode::Describe, AnalysisMode::Answer, AnalysisMode::Report, AnalysisMode::Compare] {
        let request = AnalysisRequest::new(mode).with_question("what?");
        let result = client.run_analysis(request, credential()).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput), "{}", mode);
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn recording_transport_sees_expected_urls() {
    let transport = RecordingTransport::new(RawResponse::new(200, r#"[{"generated_text":"ok"}]"#));
    let client = MedGemmaClient::with_transport(Config::default(), transport.clone());

    client
        .run_analysis(AnalysisRequest::report(solid(1, 1, [0, 0, 0])), credential())
        .await;
    client
        .run_analysis(AnalysisRequest::clinical_reasoning("syncope"), credential())
        .await;

    let calls = transport.calls.lock().unwrap().clone();
    let urls: Vec<&str> = calls.iter().map(|(url, _)| url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://api-inference.huggingface.co/models/google/medgemma-4b-it",
            "https://api-inference.huggingface.co/models/google/medgemma-27b",
        ]
    );
}

#[tokio::test]
async fn status_probe_reports_availability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VISION_PATH))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loaded": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = http_client(&server);
    assert_eq!(client.check_status(&credential()).await, ModelStatus::Available);
}

#[tokio::test]
async fn status_probe_reports_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = http_client(&server);
    assert_eq!(client.check_status(&credential()).await, ModelStatus::Loading);
}
