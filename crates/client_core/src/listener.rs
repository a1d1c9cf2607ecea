//! Listener contract for mounted UI components and the registry that tracks them.

use std::{collections::BTreeMap, fmt, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared::domain::{
    ListenerId, MainContent, SocketCloseEvent, SocketErrorEvent, SocketOpenEvent,
};

/// Callbacks a mounted component receives from the bus.
///
/// Every method defaults to a no-op so a component only overrides the
/// notifications it renders from. An `Err` is reported in the fan-out report
/// and does not stop delivery to the remaining listeners.
pub trait UiListener: Send + Sync {
    fn on_theme_changed(&self, _dark: bool) -> Result<()> {
        Ok(())
    }

    fn on_console_changed(&self, _open: bool) -> Result<()> {
        Ok(())
    }

    fn on_main_content_changed(&self, _content: MainContent) -> Result<()> {
        Ok(())
    }

    fn on_socket_connected(&self, _event: &SocketOpenEvent) -> Result<()> {
        Ok(())
    }

    fn on_socket_closed(&self, _event: &SocketCloseEvent) -> Result<()> {
        Ok(())
    }

    fn on_socket_error(&self, _event: &SocketErrorEvent) -> Result<()> {
        Ok(())
    }

    fn on_socket_message(&self, _kind: &str, _data: &Value) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Callback {
    ThemeChanged,
    ConsoleChanged,
    MainContentChanged,
    SocketConnected,
    SocketClosed,
    SocketError,
    SocketMessage,
}

impl Callback {
    pub fn as_str(self) -> &'static str {
        match self {
            Callback::ThemeChanged => "on_theme_changed",
            Callback::ConsoleChanged => "on_console_changed",
            Callback::MainContentChanged => "on_main_content_changed",
            Callback::SocketConnected => "on_socket_connected",
            Callback::SocketClosed => "on_socket_closed",
            Callback::SocketError => "on_socket_error",
            Callback::SocketMessage => "on_socket_message",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered listeners keyed by id, iterated in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Arc<dyn UiListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, listener: Arc<dyn UiListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, listener);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> Option<Arc<dyn UiListener>> {
        self.listeners.remove(&id)
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(ListenerId, Arc<dyn UiListener>)> {
        self.listeners
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    impl UiListener for Quiet {}

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut registry = ListenerRegistry::new();
        let first = registry.insert(Arc::new(Quiet));
        assert!(registry.remove(first).is_some());
        let second = registry.insert(Arc::new(Quiet));
        assert_ne!(first, second);
        assert!(!registry.contains(first));
        assert!(registry.contains(second));
        assert!(registry.remove(first).is_none());
    }

    #[test]
    fn snapshot_follows_registration_order() {
        let mut registry = ListenerRegistry::new();
        let ids: Vec<_> = (0..4).map(|_| registry.insert(Arc::new(Quiet))).collect();
        registry.remove(ids[1]);
        let snapshot: Vec<_> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(snapshot, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn default_callbacks_succeed() {
        let listener = Quiet;
        assert!(listener.on_theme_changed(true).is_ok());
        assert!(listener
            .on_socket_message("status", &Value::Null)
            .is_ok());
        assert!(listener
            .on_socket_closed(&SocketCloseEvent::abnormal("gone"))
            .is_ok());
    }
}
