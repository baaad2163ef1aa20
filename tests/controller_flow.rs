use quadratic_tutor::controller::State;
use quadratic_tutor::{
    Category, ConsoleFormatter, DisplayOptions, Error, Extraction, InteractionController,
    OutputFormat, SessionSettings,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-test:streamGenerateContent";

fn settings(server: &MockServer) -> SessionSettings {
    SessionSettings {
        model: "gemini-test".to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        temperature: None,
        max_output_tokens: None,
    }
}

fn answer(text: &str) -> ResponseTemplate {
    let event = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    });
    ResponseTemplate::new(200)
        .set_body_string(format!("data: {event}\n\n"))
        .insert_header("content-type", "text/event-stream")
}

async fn ready_controller(server: &MockServer) -> InteractionController {
    let mut controller = InteractionController::new(settings(server), DisplayOptions::default());
    controller.supply_credential("test-key").unwrap();
    controller
}

#[tokio::test]
async fn test_practice_cycle_produces_full_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(answer(
            "Problem 1: Solve x² - 5x + 6 = 0 by factoring. \
             Problem 2: Use the quadratic formula on 2x² + 3x - 2 = 0. \
             Problem 3: Complete the square for x² + 4x - 1 = 0.",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = ready_controller(&server).await;
    let report = controller.generate(Category::Practice, true).await.unwrap();

    assert_eq!(report.category, Category::Practice);
    assert_eq!(report.extraction, Extraction::ProblemCount { count: 3 });
    assert!(report.readability.is_some());
    assert_eq!(
        report.follow_up.as_deref(),
        Some("Mixed Practice: Different solving methods and applications used")
    );

    let section = report.chart.as_ref().unwrap();
    assert_eq!(section.chart.points.len(), 100);
    assert_eq!(section.chart.curve.spec(), Category::Practice.quadratic());

    let rendered = ConsoleFormatter::format(&report, OutputFormat::Text).unwrap();
    assert!(rendered.contains("Number of problems created: 3"));
}

#[tokio::test]
async fn test_explanation_cycle_extracts_why_questions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(answer(
            "A quadratic has degree two. Why does the graph curve. It bends because of x².",
        ))
        .mount(&server)
        .await;

    let mut controller = ready_controller(&server).await;
    let report = controller
        .generate(Category::Explanation, false)
        .await
        .unwrap();

    assert_eq!(
        report.extraction,
        Extraction::WhyQuestions {
            questions: vec!["Why does the graph curve?".to_string()]
        }
    );
    assert!(report.follow_up.is_none());
    assert!(report.chart.is_none());
}

#[tokio::test]
async fn test_failed_cycle_keeps_controller_ready() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(answer("Application 1: bridges. Application 2: fountains."))
        .mount(&server)
        .await;

    let mut controller = ready_controller(&server).await;

    let first = controller.generate(Category::Applications, true).await;
    assert!(matches!(first, Err(Error::RemoteService(_))));
    assert!(controller.is_ready());

    let report = controller
        .generate(Category::Applications, true)
        .await
        .unwrap();
    assert_eq!(report.extraction, Extraction::ApplicationCount { count: 2 });
    assert_eq!(
        report.chart.unwrap().chart.title,
        "Projectile Motion: Height vs Time"
    );
}

#[tokio::test]
async fn test_rejected_key_returns_to_awaiting_credential() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = InteractionController::new(settings(&server), DisplayOptions::default());
    controller.supply_credential("revoked-key").unwrap();
    assert!(controller.is_ready());

    let result = controller.generate(Category::Practice, true).await;
    assert!(matches!(result, Err(Error::Authentication(_))));
    assert!(!controller.is_ready());

    // No further request goes out until a new key is supplied.
    assert!(matches!(
        controller.generate(Category::Practice, true).await,
        Err(Error::Authentication(_))
    ));
}

#[tokio::test]
async fn test_unanalyzable_answer_leaves_no_turn_behind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(answer("..."))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = ready_controller(&server).await;

    let result = controller.generate(Category::Practice, true).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(controller.is_ready());

    match controller.state() {
        State::Ready(session) => assert_eq!(session.turns(), 0),
        State::AwaitingCredential => panic!("Expected the controller to stay ready"),
    }
}

#[tokio::test]
async fn test_json_output_carries_extraction_kind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(answer("Problem 1: Solve x² = 9."))
        .mount(&server)
        .await;

    let options = DisplayOptions {
        show_readability: false,
        show_graph: false,
    };
    let mut controller = InteractionController::new(settings(&server), options);
    controller.supply_credential("test-key").unwrap();

    let report = controller.generate(Category::Practice, true).await.unwrap();
    let rendered = ConsoleFormatter::format(&report, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["category"], "practice");
    assert_eq!(value["extraction"]["kind"], "problem_count");
    assert_eq!(value["extraction"]["count"], 1);
    assert!(value.get("readability").is_none());
    assert!(value.get("chart").is_none());
}
