use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;
use shared::{
    domain::{
        ListenerId, MainContent, SocketCloseEvent, SocketErrorEvent, SocketOpenEvent, UiState,
    },
    protocol::CommandEnvelope,
};
use tracing::{debug, warn};

pub mod config;
pub mod console;
pub mod error;
pub mod listener;
pub mod transport;

use console::ConsoleSink;
use error::SendError;
use listener::{Callback, ListenerRegistry, UiListener};
use transport::SocketProvider;

/// Console category used for everything socket related.
pub const WEBSOCKET_CATEGORY: &str = "WebSocket";

#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: ListenerId,
    pub callback: Callback,
    pub error: anyhow::Error,
}

/// Outcome of one notification fan-out.
#[derive(Debug, Default)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failures: Vec<ListenerFailure>,
}

impl FanoutReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Listeners the notification reached, successfully or not.
    pub fn notified(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

/// UI state holder and notification bus shared by every mounted component.
///
/// Owned by the application root and handed to components as `Arc<Broadcast>`.
/// Notifications iterate a snapshot of the registry with no lock held, so a
/// listener may read the bus or (un)register listeners from inside a callback.
pub struct Broadcast {
    state: RwLock<UiState>,
    listeners: RwLock<ListenerRegistry>,
    console: Arc<dyn ConsoleSink>,
    sockets: Arc<dyn SocketProvider>,
}

impl Broadcast {
    pub fn new(console: Arc<dyn ConsoleSink>, sockets: Arc<dyn SocketProvider>) -> Self {
        Self::with_state(UiState::default(), console, sockets)
    }

    pub fn with_state(
        state: UiState,
        console: Arc<dyn ConsoleSink>,
        sockets: Arc<dyn SocketProvider>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            listeners: RwLock::new(ListenerRegistry::new()),
            console,
            sockets,
        }
    }

    pub fn register(&self, listener: Arc<dyn UiListener>) -> ListenerId {
        let id = self.write_listeners().insert(listener);
        debug!(listener = %id, "ui listener registered");
        id
    }

    pub fn unregister(&self, id: ListenerId) -> bool {
        let removed = self.write_listeners().remove(id).is_some();
        if removed {
            debug!(listener = %id, "ui listener unregistered");
        }
        removed
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.read_listeners().contains(id)
    }

    pub fn listener_count(&self) -> usize {
        self.read_listeners().len()
    }

    pub fn console(&self) -> &Arc<dyn ConsoleSink> {
        &self.console
    }

    pub fn state(&self) -> UiState {
        *self.read_state()
    }

    pub fn set_dark(&self, dark: bool) -> FanoutReport {
        self.write_state().dark_theme = dark;
        self.fan_out(Callback::ThemeChanged, |listener| {
            listener.on_theme_changed(dark)
        })
    }

    pub fn is_dark(&self) -> bool {
        self.read_state().dark_theme
    }

    pub fn set_console_open(&self, open: bool) -> FanoutReport {
        self.write_state().console_open = open;
        self.fan_out(Callback::ConsoleChanged, |listener| {
            listener.on_console_changed(open)
        })
    }

    pub fn is_console_open(&self) -> bool {
        self.read_state().console_open
    }

    pub fn set_main_content(&self, content: MainContent) -> FanoutReport {
        self.write_state().main_content = content;
        self.fan_out(Callback::MainContentChanged, |listener| {
            listener.on_main_content_changed(content)
        })
    }

    pub fn main_content(&self) -> MainContent {
        self.read_state().main_content
    }

    pub fn on_socket_connected(&self, event: &SocketOpenEvent) -> FanoutReport {
        self.fan_out(Callback::SocketConnected, |listener| {
            listener.on_socket_connected(event)
        })
    }

    pub fn on_socket_closed(&self, event: &SocketCloseEvent) -> FanoutReport {
        self.fan_out(Callback::SocketClosed, |listener| {
            listener.on_socket_closed(event)
        })
    }

    pub fn on_socket_error(&self, event: &SocketErrorEvent) -> FanoutReport {
        self.fan_out(Callback::SocketError, |listener| {
            listener.on_socket_error(event)
        })
    }

    pub fn on_socket_message(&self, kind: &str, data: &Value) -> FanoutReport {
        self.fan_out(Callback::SocketMessage, |listener| {
            listener.on_socket_message(kind, data)
        })
    }

    /// Fire-and-forget send of `{"cmd": cmd, "args": args}`.
    ///
    /// Failures, including a missing connection, go to the console error
    /// channel and are not returned.
    pub fn send_socket_message(&self, cmd: &str, args: impl Serialize) {
        self.console
            .log(&format!("sending message of type '{cmd}'."), WEBSOCKET_CATEGORY);
        if let Err(err) = self.try_send_socket_message(cmd, args) {
            self.console.error(&err.to_string(), WEBSOCKET_CATEGORY);
        }
    }

    pub fn try_send_socket_message(&self, cmd: &str, args: impl Serialize) -> Result<(), SendError> {
        let frame = CommandEnvelope::new(cmd, args)?.to_frame()?;
        let socket = self.sockets.active_socket().ok_or(SendError::NoConnection)?;
        socket.send_text(frame)
    }

    fn fan_out<F>(&self, callback: Callback, mut notify: F) -> FanoutReport
    where
        F: FnMut(&dyn UiListener) -> anyhow::Result<()>,
    {
        let snapshot = self.read_listeners().snapshot();
        let mut report = FanoutReport::default();
        for (id, listener) in snapshot {
            match notify(listener.as_ref()) {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    let detail = format!("{error:#}");
                    warn!(
                        listener = %id,
                        callback = callback.as_str(),
                        error = %detail,
                        "ui listener callback failed"
                    );
                    report.failures.push(ListenerFailure {
                        listener: id,
                        callback,
                        error,
                    });
                }
            }
        }
        report
    }

    fn read_state(&self) -> RwLockReadGuard<'_, UiState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, UiState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_listeners(&self) -> RwLockReadGuard<'_, ListenerRegistry> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_listeners(&self) -> RwLockWriteGuard<'_, ListenerRegistry> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
