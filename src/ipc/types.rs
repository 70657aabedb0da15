use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Admin UI that said hello on this connection. Purely diagnostic.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub app: String,
    pub version: Option<String>,
}

pub struct AppState {
    pub client: Option<ClientInfo>,
}
