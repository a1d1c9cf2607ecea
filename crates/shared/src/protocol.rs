use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EnvelopeError;

/// Outbound command: `{"cmd": <string>, "args": <object>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub cmd: String,
    pub args: Map<String, Value>,
}

impl CommandEnvelope {
    pub fn new(cmd: impl Into<String>, args: impl Serialize) -> Result<Self, EnvelopeError> {
        let args = match serde_json::to_value(args)? {
            Value::Object(map) => map,
            other => {
                return Err(EnvelopeError::ArgsNotObject {
                    kind: json_kind(&other),
                })
            }
        };
        Ok(Self {
            cmd: cmd.into(),
            args,
        })
    }

    pub fn to_frame(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound message: `{"type": <string>, "data": <any>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn from_frame(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
