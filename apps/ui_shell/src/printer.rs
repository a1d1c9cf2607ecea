use std::{
    fmt,
    io::Write,
    sync::{Mutex, PoisonError},
};

use anyhow::Result;
use client_core::listener::UiListener;
use serde_json::Value;
use shared::domain::{MainContent, SocketCloseEvent, SocketErrorEvent, SocketOpenEvent};

/// Prints every notification as one line.
pub struct PrintListener<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> PrintListener<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, args: fmt::Arguments<'_>) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{args}")?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> UiListener for PrintListener<W> {
    fn on_theme_changed(&self, dark: bool) -> Result<()> {
        self.line(format_args!("theme -> {}", if dark { "dark" } else { "light" }))
    }

    fn on_console_changed(&self, open: bool) -> Result<()> {
        self.line(format_args!(
            "console -> {}",
            if open { "open" } else { "closed" }
        ))
    }

    fn on_main_content_changed(&self, content: MainContent) -> Result<()> {
        self.line(format_args!("content -> {content}"))
    }

    fn on_socket_connected(&self, event: &SocketOpenEvent) -> Result<()> {
        self.line(format_args!("socket connected: {}", event.url))
    }

    fn on_socket_closed(&self, event: &SocketCloseEvent) -> Result<()> {
        self.line(format_args!(
            "socket closed: code={} clean={} reason={:?}",
            event.code, event.was_clean, event.reason
        ))
    }

    fn on_socket_error(&self, event: &SocketErrorEvent) -> Result<()> {
        self.line(format_args!("socket error: {}", event.message))
    }

    fn on_socket_message(&self, kind: &str, data: &Value) -> Result<()> {
        self.line(format_args!("socket message {kind}: {data}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prints_one_line_per_notification() {
        let printer = PrintListener::new(Vec::new());
        printer.on_theme_changed(true).expect("theme");
        printer
            .on_main_content_changed(MainContent::FlowExecution)
            .expect("content");
        printer
            .on_socket_message("status", &json!({"up": true}))
            .expect("message");
        printer
            .on_socket_closed(&SocketCloseEvent::clean(1000, "bye"))
            .expect("closed");

        let printed = String::from_utf8(printer.into_inner()).expect("utf8");
        assert_eq!(
            printed,
            "theme -> dark\n\
             content -> flow_execution\n\
             socket message status: {\"up\":true}\n\
             socket closed: code=1000 clean=true reason=\"bye\"\n"
        );
    }
}
