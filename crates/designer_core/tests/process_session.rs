#![cfg(unix)]

use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use designer_core::{DesignerSession, JobState, SolverSettings};
use nix::{sys::signal::kill, unistd::Pid};
use shared::protocol::{Intent, Notification};
use solver_port::ProcessSolver;
use tokio::runtime::Runtime;

const SOLVED: &str = "000000000111111111222222222333333333444444444555555555";

const LAUNCHER_SCRIPT: &str = "sleep 30 & echo $! > grandchild.pid; wait";

fn session(runtime: &Runtime, script: &str, timeout: Duration) -> DesignerSession {
    session_in(runtime, script, timeout, env::temp_dir())
}

fn session_in(
    runtime: &Runtime,
    script: &str,
    timeout: Duration,
    working_dir: PathBuf,
) -> DesignerSession {
    let solver = ProcessSolver::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "solver".to_string()],
    );
    DesignerSession::new(
        Arc::new(solver),
        SolverSettings {
            working_dir,
            timeout,
        },
        runtime.handle().clone(),
    )
}

fn wait_for_outcome(session: &mut DesignerSession) -> Vec<Notification> {
    let event = session
        .job_events()
        .recv_timeout(Duration::from_secs(10))
        .expect("job event");
    session.handle_job_event(event)
}

fn scratch_dir(name: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("designer_session_{name}_{suffix}"));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn read_pid(dir: &Path) -> i32 {
    let path = dir.join("grandchild.pid");
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(pid) = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
        {
            return pid;
        }
        assert!(Instant::now() < deadline, "launcher never wrote its pid");
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// Signal 0 also succeeds for zombies, so consult /proc where it exists.
fn process_alive(pid: i32) -> bool {
    if kill(Pid::from_raw(pid), None).is_err() {
        return false;
    }
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !stat
            .rsplit_once(')')
            .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
        Err(_) => !Path::new("/proc/self").exists(),
    }
}

fn wait_until_dead(pid: i32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while process_alive(pid) {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    true
}

#[test]
fn echoing_solver_round_trips_through_playback() {
    let runtime = Runtime::new().expect("runtime");
    let script = "echo 'Solving...'; echo \"step 1: U|$1\"; echo \"step 2: U'|$1\"";
    let mut session = session(&runtime, script, Duration::from_secs(10));

    session.dispatch(Intent::Solve);
    let out = wait_for_outcome(&mut session);
    let [Notification::SolveSucceeded { steps, .. }] = out.as_slice() else {
        panic!("expected success, got {out:?}");
    };
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].mv, "U'");
    assert_eq!(steps[1].resulting_cube, SOLVED);

    session.dispatch(Intent::LoadString("1".repeat(54)));
    session.dispatch(Intent::SelectStep(1));
    assert_eq!(session.cube_string().as_str(), SOLVED);
}

#[test]
fn failing_solver_surfaces_stderr() {
    let runtime = Runtime::new().expect("runtime");
    let mut session = session(
        &runtime,
        "echo 'invalid cube configuration' >&2; exit 1",
        Duration::from_secs(10),
    );

    session.dispatch(Intent::Solve);
    let out = wait_for_outcome(&mut session);
    assert!(matches!(
        out.as_slice(),
        [Notification::SolveFailed { message, .. }]
            if message == "Failed to solve cube:\ninvalid cube configuration"
    ));
    assert_eq!(session.cube_string().as_str(), SOLVED);
}

#[test]
fn sleeping_solver_times_out() {
    let runtime = Runtime::new().expect("runtime");
    let mut session = session(&runtime, "sleep 30", Duration::from_millis(300));

    let started = Instant::now();
    session.dispatch(Intent::Solve);
    let out = wait_for_outcome(&mut session);

    assert!(matches!(out.as_slice(), [Notification::SolveTimedOut { .. }]));
    assert_eq!(session.job_state(), Some(JobState::TimedOut));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn timed_out_solve_leaves_no_solver_process_behind() {
    let runtime = Runtime::new().expect("runtime");
    let dir = scratch_dir("timeout");
    let mut session = session_in(
        &runtime,
        LAUNCHER_SCRIPT,
        Duration::from_millis(500),
        dir.clone(),
    );

    session.dispatch(Intent::Solve);
    let grandchild = read_pid(&dir);
    let out = wait_for_outcome(&mut session);

    assert!(matches!(out.as_slice(), [Notification::SolveTimedOut { .. }]));
    assert!(
        wait_until_dead(grandchild),
        "grandchild {grandchild} survived the timeout"
    );
    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn cancelled_solve_leaves_no_solver_process_behind() {
    let runtime = Runtime::new().expect("runtime");
    let dir = scratch_dir("cancel");
    let mut session = session_in(
        &runtime,
        LAUNCHER_SCRIPT,
        Duration::from_secs(30),
        dir.clone(),
    );

    session.dispatch(Intent::Solve);
    let grandchild = read_pid(&dir);
    assert!(process_alive(grandchild));

    let out = session.dispatch(Intent::CancelSolve);
    assert!(matches!(out.as_slice(), [Notification::SolveCancelled { .. }]));
    assert!(
        wait_until_dead(grandchild),
        "grandchild {grandchild} survived cancellation"
    );
    assert!(session.pump_job_events().is_empty());
    fs::remove_dir_all(dir).expect("cleanup");
}
