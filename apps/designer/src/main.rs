mod config;
mod console;
mod render;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, select, Receiver};
use designer_core::DesignerSession;
use solver_port::ProcessSolver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Settings,
    console::{parse_command, Command, HELP},
    render::Printer,
};

#[derive(Parser, Debug)]
#[command(name = "cube-designer", about = "Design 3x3 cube states and replay solver traces")]
struct Args {
    /// Config file; defaults to ./designer.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    solver_program: Option<String>,
    /// Fixed argument placed before the cube string. Repeat for several.
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,
    #[arg(long)]
    working_dir: Option<PathBuf>,
    /// Solve deadline in seconds; at least 1.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Print notifications as JSON lines.
    #[arg(long)]
    json: bool,
    /// Log filter, e.g. `debug` or `designer_core=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.solver_program {
            settings.solver_program = v.clone();
        }
        if !self.solver_args.is_empty() {
            settings.solver_args = self.solver_args.clone();
        }
        if let Some(v) = &self.working_dir {
            settings.solver_working_dir = v.clone();
        }
        if let Some(v) = self.timeout_secs {
            settings.solver_timeout_seconds = v;
        }
        if self.json {
            settings.json_output = true;
        }
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (line_tx, line_rx) = bounded::<String>(64);
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!("stdin read failed: {err}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn stdin reader thread")?;
    Ok(line_rx)
}

fn run_command<W: Write>(
    session: &mut DesignerSession,
    printer: &mut Printer<W>,
    command: Command,
) -> io::Result<()> {
    match command {
        Command::Intent(intent) => printer.notifications(&session.dispatch(intent)),
        Command::Show => printer.cube(session.cube(), session.validity()),
        Command::Steps => printer.steps(session.playback()),
        Command::Help => printer.message(HELP),
        Command::Quit => Ok(()),
    }
}


fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let mut settings = config::load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("solver-runtime")
        .build()
        .context("failed to build solver runtime")?;

    let solver = ProcessSolver::new(settings.solver_program.clone(), settings.solver_args.clone());
    info!(
        program = %settings.solver_program,
        working_dir = %settings.solver_working_dir.display(),
        timeout_secs = settings.solver_timeout_seconds,
        "cube designer ready"
    );
    let mut session = DesignerSession::new(
        Arc::new(solver),
        settings.solver_settings(),
        runtime.handle().clone(),
    );

    let stdout = io::stdout();
    let mut printer = Printer::new(stdout.lock(), settings.json_output);
    if !settings.json_output {
        printer.message("Type 'help' for the command list.")?;
    }
    printer.cube(session.cube(), session.validity())?;

    let line_rx = spawn_stdin_reader()?;
    let job_rx = session.job_events();

    loop {
        let input_open = select! {
            recv(line_rx) -> line => match line {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(Command::Quit)) => return Ok(()),
                    Ok(Some(command)) => {
                        run_command(&mut session, &mut printer, command)?;
                        true
                    }
                    Ok(None) => true,
                    Err(err) => {
                        printer.message(&err.to_string())?;
                        true
                    }
                },
                Err(_) => false,
            },
            recv(job_rx) -> event => {
                if let Ok(event) = event {
                    printer.notifications(&session.handle_job_event(event))?;
                }
                true
            }
        };
        if !input_open {
            break;
        }
    }

    // Input is exhausted; let a running solve report before exiting.
    while session.is_solving() {
        let Ok(event) = job_rx.recv() else {
            break;
        };
        printer.notifications(&session.handle_job_event(event))?;
    }
    Ok(())
}
