//! Text and JSON rendering of session output.

use std::io::{self, Write};

use designer_core::{CubeState, PlaybackController};
use shared::{
    domain::{Color, Face, Validity, FACE_SIZE},
    protocol::Notification,
};

/// Unfolded net, faces laid out as
///
/// ```text
///     [3]
/// [2] [0] [1] [5]
///     [4]
/// ```
pub fn render_net(cube: &CubeState) -> String {
    let blank = " ".repeat(FACE_SIZE);
    let bands: [&[Option<Face>]; 3] = [
        &[None, Some(Face::Top)],
        &[
            Some(Face::Left),
            Some(Face::Front),
            Some(Face::Right),
            Some(Face::Back),
        ],
        &[None, Some(Face::Bottom)],
    ];

    let mut out = String::new();
    for band in bands {
        for row in 0..FACE_SIZE {
            let cells: Vec<String> = band
                .iter()
                .map(|face| match face {
                    Some(face) => face_row(cube, *face, row),
                    None => blank.clone(),
                })
                .collect();
            out.push_str(cells.join(" ").trim_end());
            out.push('\n');
        }
    }
    out
}

fn face_row(cube: &CubeState, face: Face, row: usize) -> String {
    cube.face_colors(face)[row * FACE_SIZE..(row + 1) * FACE_SIZE]
        .iter()
        .map(|color| initial(*color))
        .collect()
}

fn initial(color: Color) -> char {
    color.name().chars().next().unwrap_or('?')
}

pub fn render_steps(playback: &PlaybackController) -> String {
    if playback.is_empty() {
        return "No solution loaded.\n".to_string();
    }
    let mut out = String::new();
    for (position, step) in playback.steps().iter().enumerate() {
        let marker = if playback.current() == Some(position) {
            '>'
        } else {
            ' '
        };
        out.push_str(&format!("{marker} {:>3}. {}\n", position + 1, step.label()));
    }
    out
}

pub fn describe(notification: &Notification) -> String {
    match notification {
        Notification::ColorSelected(color) => format!("Selected color: {color}"),
        Notification::CubeStringChanged(cube) => format!("Cube: {cube}"),
        Notification::ValidityChanged(validity) => validity.to_string(),
        Notification::SolveStarted { job_id, .. } => format!("Solving... (job {job_id})"),
        Notification::SolveSucceeded { steps, .. } if steps.is_empty() => {
            "Solver finished without any steps.".to_string()
        }
        Notification::SolveSucceeded { steps, .. } => {
            let mut text = format!("Solution found: {} steps", steps.len());
            for step in steps {
                text.push_str("\n  ");
                text.push_str(&step.label());
            }
            text
        }
        Notification::SolveFailed { message, .. } | Notification::SolveTimedOut { message, .. } => {
            format!("Error: {message}")
        }
        Notification::SolveCancelled { job_id } => format!("Solve cancelled (job {job_id})"),
        Notification::SolutionCleared => "Solution cleared.".to_string(),
        Notification::StepSelected { position, step, .. } => {
            format!("Showing {} of the solution (position {})", step.label(), position + 1)
        }
        Notification::IntentRejected(rejection) => format!("Rejected: {}", rejection.message),
    }
}

/// Writes notifications as text lines or as one JSON object per line.
pub struct Printer<W> {
    out: W,
    json: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    pub fn notifications(&mut self, notifications: &[Notification]) -> io::Result<()> {
        for notification in notifications {
            if self.json {
                serde_json::to_writer(&mut self.out, notification)?;
                writeln!(self.out)?;
            } else {
                writeln!(self.out, "{}", describe(notification))?;
            }
        }
        self.out.flush()
    }

    pub fn cube(&mut self, cube: &CubeState, validity: &Validity) -> io::Result<()> {
        if self.json {
            let snapshot = serde_json::json!({
                "cube": cube.to_cube_string(),
                "validity": validity,
            });
            writeln!(self.out, "{snapshot}")?;
        } else {
            write!(self.out, "{}", render_net(cube))?;
            writeln!(self.out, "{validity}")?;
        }
        self.out.flush()
    }

    pub fn steps(&mut self, playback: &PlaybackController) -> io::Result<()> {
        if self.json {
            let snapshot = serde_json::json!({
                "steps": playback.steps(),
                "current": playback.current(),
            });
            writeln!(self.out, "{snapshot}")?;
        } else {
            write!(self.out, "{}", render_steps(playback))?;
        }
        self.out.flush()
    }

    /// Console-local messages (usage hints, help). Go to stderr in JSON mode.
    pub fn message(&mut self, text: &str) -> io::Result<()> {
        if self.json {
            eprintln!("{text}");
            Ok(())
        } else {
            writeln!(self.out, "{text}")?;
            self.out.flush()
        }
    }
}
