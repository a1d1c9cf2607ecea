//! Line commands accepted by the shell and their effect on the bus.

use std::io::{self, Write};

use client_core::{
    console::{ConsoleLevel, ConsoleLog},
    Broadcast, FanoutReport,
};
use serde_json::{json, Value};
use shared::{domain::MainContent, error::DomainError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Dark(bool),
    Console(bool),
    Content(MainContent),
    Send { cmd: String, args: Value },
    Status,
    Log,
    Quit,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Panel(#[from] DomainError),
    #[error("invalid json arguments: {0}")]
    Args(#[from] serde_json::Error),
}

/// Parses one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, ShellError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = split_word(line);

    let command = match word {
        "dark" => ShellCommand::Dark(
            switch(rest, "on", "off").ok_or(ShellError::Usage("dark on|off"))?,
        ),
        "console" => ShellCommand::Console(
            switch(rest, "open", "closed").ok_or(ShellError::Usage("console open|closed"))?,
        ),
        "content" => {
            if rest.is_empty() {
                return Err(ShellError::Usage("content <panel>"));
            }
            ShellCommand::Content(rest.parse()?)
        }
        "send" => {
            let (cmd, raw_args) = split_word(rest);
            if cmd.is_empty() {
                return Err(ShellError::Usage("send <cmd> [json-object]"));
            }
            let args = if raw_args.is_empty() {
                json!({})
            } else {
                serde_json::from_str(raw_args)?
            };
            ShellCommand::Send {
                cmd: cmd.to_string(),
                args,
            }
        }
        "status" => ShellCommand::Status,
        "log" => ShellCommand::Log,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(ShellError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

pub fn execute(
    bus: &Broadcast,
    console: &ConsoleLog,
    command: ShellCommand,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        ShellCommand::Dark(dark) => report_failures(out, &bus.set_dark(dark)),
        ShellCommand::Console(open) => report_failures(out, &bus.set_console_open(open)),
        ShellCommand::Content(content) => report_failures(out, &bus.set_main_content(content)),
        ShellCommand::Send { cmd, args } => {
            bus.send_socket_message(&cmd, args);
            Ok(())
        }
        ShellCommand::Status => {
            let state = bus.state();
            writeln!(
                out,
                "theme={} console={} content={} listeners={}",
                if state.dark_theme { "dark" } else { "light" },
                if state.console_open { "open" } else { "closed" },
                state.main_content,
                bus.listener_count()
            )
        }
        ShellCommand::Log => {
            for entry in console.entries() {
                let level = match entry.level {
                    ConsoleLevel::Log => "log",
                    ConsoleLevel::Error => "error",
                };
                writeln!(
                    out,
                    "{} {level:<5} [{}] {}",
                    entry.logged_at.format("%H:%M:%S%.3f"),
                    entry.category,
                    entry.message
                )?;
            }
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}

fn report_failures(out: &mut impl Write, report: &FanoutReport) -> io::Result<()> {
    for failure in &report.failures {
        writeln!(
            out,
            "{} failed in {}: {:#}",
            failure.listener, failure.callback, failure.error
        )?;
    }
    Ok(())
}

fn switch(raw: &str, on: &str, off: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case(on) {
        Some(true)
    } else if raw.eq_ignore_ascii_case(off) {
        Some(false)
    } else {
        None
    }
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_core::transport::SocketSlot;

    use super::*;

    fn bus() -> (Broadcast, Arc<ConsoleLog>) {
        let console = Arc::new(ConsoleLog::default());
        let bus = Broadcast::new(console.clone(), Arc::new(SocketSlot::new()));
        (bus, console)
    }

    #[test]
    fn parses_state_commands() {
        assert_eq!(
            parse_command("dark on").expect("parse"),
            Some(ShellCommand::Dark(true))
        );
        assert_eq!(
            parse_command("  console CLOSED ").expect("parse"),
            Some(ShellCommand::Console(false))
        );
        assert_eq!(
            parse_command("content node-status").expect("parse"),
            Some(ShellCommand::Content(MainContent::NodeStatus))
        );
        assert_eq!(parse_command("").expect("parse"), None);
        assert_eq!(parse_command("# comment").expect("parse"), None);
    }

    #[test]
    fn parses_send_with_and_without_args() {
        assert_eq!(
            parse_command("send ping").expect("parse"),
            Some(ShellCommand::Send {
                cmd: "ping".to_string(),
                args: json!({}),
            })
        );
        assert_eq!(
            parse_command(r#"send start_flow {"flow": "registration", "ue_count": 2}"#)
                .expect("parse"),
            Some(ShellCommand::Send {
                cmd: "start_flow".to_string(),
                args: json!({"flow": "registration", "ue_count": 2}),
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_command("dark maybe"),
            Err(ShellError::Usage(_))
        ));
        assert!(matches!(parse_command("content"), Err(ShellError::Usage(_))));
        assert!(matches!(
            parse_command("content dashboard"),
            Err(ShellError::Panel(_))
        ));
        assert!(matches!(
            parse_command("send ping {oops"),
            Err(ShellError::Args(_))
        ));
        assert!(matches!(
            parse_command("reboot"),
            Err(ShellError::UnknownCommand(_))
        ));
    }

    #[test]
    fn status_reflects_executed_commands() {
        let (bus, console) = bus();
        let mut out = Vec::new();
        execute(&bus, &console, ShellCommand::Dark(true), &mut out).expect("dark");
        execute(
            &bus,
            &console,
            ShellCommand::Content(MainContent::Settings),
            &mut out,
        )
        .expect("content");
        execute(&bus, &console, ShellCommand::Status, &mut out).expect("status");

        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(
            printed,
            "theme=dark console=open content=settings listeners=0\n"
        );
    }

    #[test]
    fn send_without_connection_shows_up_in_log() {
        let (bus, console) = bus();
        execute(
            &bus,
            &console,
            ShellCommand::Send {
                cmd: "ping".to_string(),
                args: json!({}),
            },
            &mut Vec::new(),
        )
        .expect("send");

        let mut out = Vec::new();
        execute(&bus, &console, ShellCommand::Log, &mut out).expect("log");
        let printed = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = printed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("log   [WebSocket] sending message of type 'ping'."));
        assert!(lines[1].ends_with("error [WebSocket] no active websocket connection"));
    }
}
