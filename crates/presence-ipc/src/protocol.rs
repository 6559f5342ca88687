//! Payload types for the local RPC protocol.
//!
//! These ride inside `Opcode::Frame` bodies. Commands carry a nonce that
//! the service echoes back; dispatches (`cmd: "DISPATCH"`) carry none.

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

/// Command names.
pub mod commands {
    pub const DISPATCH: &str = "DISPATCH";
    pub const SET_ACTIVITY: &str = "SET_ACTIVITY";
    pub const AUTHORIZE: &str = "AUTHORIZE";
    pub const AUTHENTICATE: &str = "AUTHENTICATE";
}

/// Event names carried in the `evt` field.
pub mod events {
    pub const READY: &str = "READY";
    pub const ERROR: &str = "ERROR";
}

// ---------------------------------------------------------------------------
// Outgoing
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Handshake<'a> {
    pub v: u32,
    pub client_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Command<'a, A: Serialize> {
    pub cmd: &'a str,
    pub args: A,
    pub nonce: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SetActivityArgs<'a> {
    pub pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<&'a Activity>,
}

/// The status record shown to other users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Timestamps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
    #[serde(default)]
    pub instance: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

/// Unix timestamps in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Incoming
// ---------------------------------------------------------------------------

/// Any `Opcode::Frame` body sent by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub cmd: String,
    #[serde(default)]
    pub evt: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Response {
    pub fn is_error(&self) -> bool {
        self.evt.as_deref() == Some(events::ERROR)
    }

    pub fn is_ready(&self) -> bool {
        self.cmd == commands::DISPATCH && self.evt.as_deref() == Some(events::READY)
    }
}

/// `data` of an `ERROR` event, and the body of a `Close` frame.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadyData {
    #[serde(default)]
    pub user: Option<User>,
}

/// The account the local client is logged in as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl User {
    /// `name#1234`, or just the name for accounts without a discriminator.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeData {
    pub code: String,
}
