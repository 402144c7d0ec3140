use crux_core::testing::AppTester;
use crux_http::testing::ResponseBuilder;
use crux_kv::KeyValueOutput;
use serde_json::json;

use estateview_core::session::{Role, Session, StoredSession};
use estateview_core::{App, Effect, Event, Model};

fn start(app: &AppTester<App, Effect>, model: &mut Model) {
    app.update(
        Event::Started {
            api_base_url: "http://localhost:8080".into(),
        },
        model,
    );
}

fn agent_session_bytes() -> Vec<u8> {
    let session = Session::new(
        4,
        "agent@example.com".into(),
        "John Agent".into(),
        Role::Agent,
        "stored-token".into(),
    );
    StoredSession::of(&session).to_bytes().unwrap()
}

#[test]
fn successful_agent_login_persists_and_loads_the_dashboard() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);

    let update = app.update(
        Event::LoginSubmitted {
            email: "agent@example.com".into(),
            password: "hunter2".into(),
        },
        &mut model,
    );
    assert!(model.is_authenticating);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));

    let response = ResponseBuilder::ok()
        .body(json!({
            "token": "jwt-abc",
            "userId": 4,
            "email": "agent@example.com",
            "fullName": "John Agent",
            "role": "AGENT"
        }))
        .build();
    let update = app.update(
        Event::LoginCompleted {
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert!(!model.is_authenticating);
    assert!(model.is_agent());
    let session = model.session.as_ref().unwrap();
    assert_eq!(session.user_id, 4);
    assert_eq!(session.authorization_header(), "Bearer jwt-abc");
    // Session write plus the dashboard fetch.
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Kv(_))));
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    assert!(model.is_dashboard_loading);

    let view = app.view(&model);
    assert!(view.session.is_authenticated);
    assert!(view.session.is_agent);
    assert_eq!(view.session.name, "John Agent");
}

#[test]
fn rejected_credentials_surface_an_auth_error() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);
    app.update(
        Event::LoginSubmitted {
            email: "agent@example.com".into(),
            password: "wrong".into(),
        },
        &mut model,
    );

    let response = ResponseBuilder::with_status(crux_http::http::StatusCode::Unauthorized)
        .body(json!(null))
        .build();
    app.update(
        Event::LoginCompleted {
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert!(model.session.is_none());
    assert!(!model.is_authenticating);
    let view = app.view(&model);
    assert_eq!(
        view.auth_error.unwrap().message,
        "Invalid email or password."
    );
}

#[test]
fn token_free_login_response_is_rejected() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);
    app.update(
        Event::LoginSubmitted {
            email: "agent@example.com".into(),
            password: "hunter2".into(),
        },
        &mut model,
    );

    let response = ResponseBuilder::ok()
        .body(json!({"userId": 4, "email": "agent@example.com"}))
        .build();
    app.update(
        Event::LoginCompleted {
            result: Box::new(Ok(response)),
        },
        &mut model,
    );

    assert!(model.session.is_none());
    assert!(model.auth_error.is_some());
}

#[test]
fn stored_session_is_restored_on_startup() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);

    let update = app.update(
        Event::SessionRestored(KeyValueOutput::Read(Some(agent_session_bytes()))),
        &mut model,
    );

    assert!(model.is_agent());
    assert_eq!(model.session.as_ref().unwrap().user_id, 4);
    // An agent session immediately refreshes the dashboard.
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
}

#[test]
fn unreadable_stored_session_is_ignored() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);

    // The empty payload is what logout leaves behind.
    app.update(
        Event::SessionRestored(KeyValueOutput::Read(Some(Vec::new()))),
        &mut model,
    );
    assert!(model.session.is_none());

    app.update(
        Event::SessionRestored(KeyValueOutput::Read(Some(b"not json".to_vec()))),
        &mut model,
    );
    assert!(model.session.is_none());

    app.update(Event::SessionRestored(KeyValueOutput::Read(None)), &mut model);
    assert!(model.session.is_none());
}

#[test]
fn logout_clears_agent_state_and_overwrites_the_store() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    start(&app, &mut model);
    app.update(
        Event::SessionRestored(KeyValueOutput::Read(Some(agent_session_bytes()))),
        &mut model,
    );
    assert!(model.is_agent());

    let update = app.update(Event::LogoutRequested, &mut model);
    assert!(model.session.is_none());
    assert!(model.agent_properties.is_empty());
    assert!(model.queries.is_empty());
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Kv(_))));

    let view = app.view(&model);
    assert!(!view.session.is_authenticated);
}
