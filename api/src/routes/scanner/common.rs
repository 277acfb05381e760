use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PollQuery {
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueReq {
    pub device_id: String,
    pub command: String,
    pub mode: Option<String>,
    pub params: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusReq {
    pub device_id: String,
    #[serde(flatten)]
    pub payload: Value,
}
