use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);
    };
}

id_newtype!(ListenerId);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Primary panel shown in the main content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MainContent {
    #[default]
    FlowSelection,
    FlowExecution,
    NodeStatus,
    Settings,
}

impl MainContent {
    pub const ALL: [MainContent; 4] = [
        MainContent::FlowSelection,
        MainContent::FlowExecution,
        MainContent::NodeStatus,
        MainContent::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MainContent::FlowSelection => "flow_selection",
            MainContent::FlowExecution => "flow_execution",
            MainContent::NodeStatus => "node_status",
            MainContent::Settings => "settings",
        }
    }
}

impl fmt::Display for MainContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MainContent {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        MainContent::ALL
            .into_iter()
            .find(|panel| panel.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownMainContent(raw.to_string()))
    }
}

/// Snapshot of the broadcast UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub dark_theme: bool,
    pub console_open: bool,
    pub main_content: MainContent,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            dark_theme: false,
            console_open: true,
            main_content: MainContent::FlowSelection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketOpenEvent {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketCloseEvent {
    pub code: u16,
    pub reason: String,
    pub was_clean: bool,
}

impl SocketCloseEvent {
    /// Close code reported when the peer sent a close frame without a status.
    pub const NO_STATUS: u16 = 1005;
    /// Close code reported when the connection dropped without a close frame.
    pub const ABNORMAL: u16 = 1006;

    pub fn clean(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            was_clean: true,
        }
    }

    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self {
            code: Self::ABNORMAL,
            reason: reason.into(),
            was_clean: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketErrorEvent {
    pub message: String,
}

impl SocketErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
