use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use client_core::{config::load_settings, console::ConsoleLog, transport::SocketSlot, Broadcast};
use tracing::info;

mod printer;
mod shell;

use printer::PrintListener;
use shell::{parse_command, ShellCommand};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "ui.toml")]
    config: PathBuf,
    #[arg(long, default_value = "info")]
    log_filter: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter.as_str())
        .with_writer(io::stderr)
        .init();

    let settings = load_settings(&args.config);
    let console = Arc::new(ConsoleLog::with_capacity(settings.console_capacity));
    let bus = Arc::new(Broadcast::with_state(
        settings.initial_state(),
        console.clone(),
        Arc::new(SocketSlot::new()),
    ));
    bus.register(Arc::new(PrintListener::new(io::stdout())));
    info!(config = %args.config.display(), state = ?bus.state(), "ui shell ready");

    let mut stdout = io::stdout();
    for line in io::stdin().lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => shell::execute(&bus, &console, command, &mut stdout)?,
            Err(err) => writeln!(stdout, "error: {err}")?,
        }
        stdout.flush()?;
    }

    Ok(())
}
