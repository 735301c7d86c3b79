#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end runs of the wizard against an in-process backend.

use std::{
    io::Cursor,
    sync::{Arc, Mutex},
};

use {
    axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
    },
    conduit_config::ApiConfig,
    conduit_connect::{
        HttpSourceApi, Notice, NoticeLevel, SensitivityPolicy, SourceApi, WizardController,
        WizardHost, WizardStep, wizard::run_connect_wizard_with,
    },
    serde_json::{Value, json},
    tokio_test::{assert_err, assert_ok},
};

#[derive(Clone, Default)]
struct Backend {
    fields: Arc<Mutex<Value>>,
    fail_fetch: bool,
    created: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn detail(
    State(backend): State<Backend>,
    Path(short_name): Path<String>,
) -> (StatusCode, Json<Value>) {
    if backend.fail_fetch {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "source registry unavailable" })),
        );
    }
    let fields = backend.fields.lock().unwrap().clone();
    (
        StatusCode::OK,
        Json(json!({
            "name": "Example Source",
            "description": null,
            "short_name": short_name,
            "config_fields": { "fields": fields },
        })),
    )
}

async fn connect(
    State(backend): State<Backend>,
    Path(short_name): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    backend.created.lock().unwrap().push((short_name, body));
    Json(json!({ "id": "conn-42", "status": "active" }))
}

async fn start(backend: Backend) -> Arc<dyn SourceApi> {
    let app = Router::new()
        .route("/sources/detail/{short_name}", get(detail))
        .route("/connections/connect/source/{short_name}", post(connect))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let config = ApiConfig {
        base_url: format!("http://{addr}"),
        ..ApiConfig::default()
    };
    Arc::new(HttpSourceApi::new(&config).unwrap())
}

fn api_key_backend() -> Backend {
    Backend {
        fields: Arc::new(Mutex::new(json!([
            { "name": "api_key", "title": "API Key", "type": "password" }
        ]))),
        ..Backend::default()
    }
}

#[derive(Default)]
struct Host {
    completed: Vec<String>,
    open_changes: Vec<bool>,
    notices: Vec<Notice>,
}

impl WizardHost for Host {
    fn on_complete(&mut self, connection_id: &str) {
        self.completed.push(connection_id.to_string());
    }

    fn on_open_change(&mut self, open: bool) {
        self.open_changes.push(open);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

#[tokio::test]
async fn create_connection_with_masked_review() {
    let backend = api_key_backend();
    let api = start(backend.clone()).await;
    let mut ctl = WizardController::new(api, Host::default());

    assert_ok!(ctl.open("example"));
    assert!(ctl.pump().await);
    assert_ok!(ctl.set_name("My Source"));
    assert_ok!(ctl.set_field("api_key", "sk-1234567890"));
    assert_ok!(ctl.next());

    let review = ctl.review();
    assert_eq!(review[0].value, "My Source");
    assert_eq!(review[1].label, "API Key");
    assert_eq!(review[1].value, "sk-123********");
    assert!(review[1].masked);

    assert_ok!(ctl.submit());
    assert!(ctl.pump().await);
    assert_eq!(ctl.host().completed, ["conn-42"]);
    assert_eq!(ctl.host().open_changes, [false]);
    assert!(ctl.session().is_initial());
    assert!(!ctl.is_open());

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, "example");
    assert_eq!(
        created[0].1,
        json!({ "name": "My Source", "config_fields": { "api_key": "sk-1234567890" } })
    );
}

#[tokio::test]
async fn empty_form_reports_all_missing_values_at_once() {
    let api = start(api_key_backend()).await;
    let mut ctl = WizardController::new(api, Host::default());
    assert_ok!(ctl.open("example"));
    ctl.pump().await;

    assert_err!(ctl.next());
    assert_eq!(ctl.session().current_step(), WizardStep::Configure);
    assert_eq!(ctl.host().notices.len(), 1);
    let notice = &ctl.host().notices[0];
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("Connection name"));
    assert!(notice.message.contains("API Key"));
}

#[tokio::test]
async fn failed_schema_fetch_renders_nothing() {
    let backend = Backend {
        fail_fetch: true,
        ..api_key_backend()
    };
    let api = start(backend).await;
    let mut ctl = WizardController::new(api, Host::default());
    assert_ok!(ctl.open("example"));
    ctl.pump().await;

    assert_eq!(ctl.session().current_step(), WizardStep::Configure);
    assert!(ctl.session().schema().is_none());
    assert!(ctl.form().is_empty());
    assert_eq!(ctl.host().notices.len(), 1);
    assert!(
        ctl.host().notices[0]
            .message
            .contains("source registry unavailable")
    );
}

#[tokio::test]
async fn draft_has_one_empty_value_per_field() {
    for n in [0usize, 1, 5, 12] {
        let fields: Vec<Value> = (0..n)
            .map(|i| json!({ "name": format!("field_{i}"), "title": format!("Field {i}"), "type": "string" }))
            .collect();
        let backend = Backend {
            fields: Arc::new(Mutex::new(Value::Array(fields))),
            ..Backend::default()
        };
        let api = start(backend).await;
        let mut ctl = WizardController::new(api, Host::default());
        assert_ok!(ctl.open("example"));
        ctl.pump().await;

        let draft = ctl.session().draft();
        assert_eq!(draft.name, "");
        assert_eq!(draft.field_values().len(), n);
        assert!(draft.field_values().values().all(String::is_empty));
        for i in 0..n {
            assert_eq!(draft.field(&format!("field_{i}")), Some(""));
        }
        assert_eq!(ctl.form().len(), n);
    }
}

#[tokio::test]
async fn terminal_wizard_creates_connection() {
    let backend = api_key_backend();
    let api = start(backend.clone()).await;
    let mut input = Cursor::new("My Source\nsk-1234567890\nc\n");
    let mut output = Vec::new();

    let id = run_connect_wizard_with(
        api,
        "example",
        SensitivityPolicy::default(),
        &mut input,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(id.as_deref(), Some("conn-42"));
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Step 1 of 2"));
    assert!(output.contains("API Key: sk-123********"));
    assert!(!output.contains("sk-1234567890"));
    assert!(output.contains("ok: Connection created"));
    assert_eq!(backend.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn terminal_wizard_reprompts_and_can_quit() {
    let backend = api_key_backend();
    let api = start(backend.clone()).await;
    // Blank answers fail validation, then fill in, go back, keep values, quit.
    let mut input = Cursor::new("\n\nMy Source\nsecret-value\nb\n\n\nq\n");
    let mut output = Vec::new();

    let id = run_connect_wizard_with(
        api,
        "example",
        SensitivityPolicy::default(),
        &mut input,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(id, None);
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("error: Missing required fields: Please fill in: Connection name, API Key"));
    assert!(output.contains("Connection name [My Source]"));
    assert!(output.contains("API Key [secret********]"));
    assert!(backend.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn terminal_wizard_masks_token_named_text_field_after_back() {
    let backend = Backend {
        fields: Arc::new(Mutex::new(json!([
            { "name": "api_token", "title": "API Token", "type": "string" }
        ]))),
        ..Backend::default()
    };
    let api = start(backend.clone()).await;
    let mut input = Cursor::new("My Source\ntok_supersecret\nb\n\n\nq\n");
    let mut output = Vec::new();

    let id = run_connect_wizard_with(
        api,
        "example",
        SensitivityPolicy::default(),
        &mut input,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(id, None);
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("API Token: tok_su********"));
    assert!(output.contains("API Token [tok_su********]"));
    assert!(!output.contains("tok_supersecret"));
}

#[tokio::test]
async fn terminal_wizard_clears_a_value_with_dash() {
    let backend = api_key_backend();
    let api = start(backend.clone()).await;
    // Fill in, go back, clear the name, fail validation, then set a new name.
    let mut input = Cursor::new("My Source\nsk-1234567890\nb\n-\n\nOther\n\nc\n");
    let mut output = Vec::new();

    let id = run_connect_wizard_with(
        api,
        "example",
        SensitivityPolicy::default(),
        &mut input,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(id.as_deref(), Some("conn-42"));
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("type - to clear it"));
    assert!(output.contains("error: Missing required fields: Please fill in: Connection name\n"));
    let created = backend.created.lock().unwrap();
    assert_eq!(
        created[0].1,
        json!({ "name": "Other", "config_fields": { "api_key": "sk-1234567890" } })
    );
}

#[tokio::test]
async fn terminal_wizard_stops_when_source_is_missing() {
    let backend = Backend {
        fail_fetch: true,
        ..api_key_backend()
    };
    let api = start(backend).await;
    let mut input = Cursor::new("");
    let mut output = Vec::new();

    let id = run_connect_wizard_with(
        api,
        "example",
        SensitivityPolicy::default(),
        &mut input,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(id, None);
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("error: Failed to load source"));
    assert!(!output.contains("Step 1 of 2"));
}
