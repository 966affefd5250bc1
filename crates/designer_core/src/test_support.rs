//! Scripted solver double shared by unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use solver_port::{SolveRequest, SolverOutput, SolverPort, SolverPortError};

pub const SOLVED: &str = "000000000111111111222222222333333333444444444555555555";

#[derive(Clone)]
pub enum Script {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    NotFound,
    Launch(String),
}

impl Script {
    pub fn exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Script::Exit {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

pub struct ScriptedSolver {
    scripts: Mutex<VecDeque<Script>>,
    delay: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<SolveRequest>>,
    terminated: Arc<AtomicBool>,
}

impl ScriptedSolver {
    pub fn new(script: Script) -> Self {
        Self::sequence(vec![script])
    }

    /// Plays `scripts` in order, repeating the last one once the rest are used up.
    pub fn sequence(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn exiting(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::new(Script::exit(code, stdout, stderr))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SolveRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// True once a solve future was dropped before it finished.
    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

struct TerminationProbe {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for TerminationProbe {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl SolverPort for ScriptedSolver {
    async fn solve(&self, request: &SolveRequest) -> Result<SolverOutput, SolverPortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());

        let mut probe = TerminationProbe {
            flag: Arc::clone(&self.terminated),
            armed: true,
        };
        tokio::time::sleep(self.delay).await;
        probe.armed = false;

        let script = {
            let mut scripts = self.scripts.lock().expect("scripts lock");
            if scripts.len() > 1 {
                scripts.pop_front()
            } else {
                scripts.front().cloned()
            }
        };

        match script.expect("at least one script") {
            Script::Exit {
                code,
                stdout,
                stderr,
            } => Ok(SolverOutput {
                exit_code: Some(code),
                stdout,
                stderr,
            }),
            Script::NotFound => Err(SolverPortError::ExecutableNotFound {
                program: "scripted".to_string(),
            }),
            Script::Launch(detail) => Err(SolverPortError::Launch {
                program: "scripted".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, detail),
            }),
        }
    }

    fn describe(&self) -> String {
        "scripted solver".to_string()
    }
}
