use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use designer_core::SolverSettings;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "designer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub solver_program: String,
    pub solver_args: Vec<String>,
    pub solver_working_dir: PathBuf,
    pub solver_timeout_seconds: u64,
    pub json_output: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver_program: "go".into(),
            solver_args: vec!["run".into(), ".".into()],
            solver_working_dir: PathBuf::from("."),
            solver_timeout_seconds: 60,
            json_output: false,
        }
    }
}

impl Settings {
    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            working_dir: self.solver_working_dir.clone(),
            timeout: Duration::from_secs(self.solver_timeout_seconds),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    solver: SolverSection,
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SolverSection {
    program: Option<String>,
    args: Option<Vec<String>>,
    working_dir: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OutputSection {
    json: Option<bool>,
}

/// Defaults, then the config file, then environment overrides.
///
/// An explicit `path` must exist; the default `designer.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if file_cfg.solver.timeout_seconds == Some(0) {
        anyhow::bail!("solver.timeout_seconds must be at least 1");
    }

    if let Some(v) = file_cfg.solver.program {
        settings.solver_program = v;
    }
    if let Some(v) = file_cfg.solver.args {
        settings.solver_args = v;
    }
    if let Some(v) = file_cfg.solver.working_dir {
        settings.solver_working_dir = v;
    }
    if let Some(v) = file_cfg.solver.timeout_seconds {
        settings.solver_timeout_seconds = v;
    }
    if let Some(v) = file_cfg.output.json {
        settings.json_output = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("CUBE_SOLVER_PROGRAM") {
        settings.solver_program = v;
    }
    if let Some(v) = var("APP__SOLVER_PROGRAM") {
        settings.solver_program = v;
    }

    if let Some(v) = var("APP__SOLVER_ARGS") {
        settings.solver_args = v.split_whitespace().map(str::to_string).collect();
    }

    if let Some(v) = var("CUBE_SOLVER_DIR") {
        settings.solver_working_dir = PathBuf::from(v);
    }
    if let Some(v) = var("APP__SOLVER_WORKING_DIR") {
        settings.solver_working_dir = PathBuf::from(v);
    }

    if let Some(v) = var("APP__SOLVER_TIMEOUT_SECONDS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.solver_timeout_seconds = parsed,
            _ => {}
        }
    }
}
