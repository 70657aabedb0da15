use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, ClientInfo, Request};
use serde_json::json;

fn client_json(client: &ClientInfo) -> serde_json::Value {
    json!({
        "app": client.app,
        "version": client.version,
    })
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "client": state.client.as_ref().map(client_json),
        }),
    )
}

fn handle_session_hello(state: &mut AppState, req: &Request) -> serde_json::Value {
    let app = match req.params.get("app").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing app", None),
    };
    let version = req
        .params
        .get("version")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string());

    tracing::info!(app = %app, version = version.as_deref(), "client connected");
    state.client = Some(ClientInfo { app, version });

    ok(&req.id, json!({ "version": env!("CARGO_PKG_VERSION") }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.hello" => Some(handle_session_hello(state, req)),
        _ => None,
    }
}
