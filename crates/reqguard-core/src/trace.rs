//! Stack trace rendering

use crate::{CapturedFailure, Frame};

/// Innermost frames hidden when rendering: the stack capture function and
/// the `TracedError` constructor that called it.
pub const SKIP_DEPTH: usize = 2;

/// Render `frames[skip..]` one per line, preceded by a newline.
///
/// Returns `None` when no frame is left to show.
pub fn render_frames(frames: &[Frame], skip: usize) -> Option<String> {
    let shown = frames.get(skip..).filter(|rest| !rest.is_empty())?;

    let mut out = String::from("\n");
    for frame in shown {
        out.push_str(&frame.to_string());
        out.push('\n');
    }
    Some(out)
}

/// Render the trace of a failure, falling back to its message when there is
/// nothing to render.
pub fn render(captured: &CapturedFailure, skip: usize) -> String {
    render_frames(&captured.frames, skip).unwrap_or_else(|| captured.message.clone())
}

impl CapturedFailure {
    /// The text written to the error channel: the message, followed by the
    /// rendered trace when there is one.
    pub fn log_line(&self, skip: usize) -> String {
        match render_frames(&self.frames, skip) {
            Some(trace) => format!("{}{}", self.message, trace),
            None => self.message.clone(),
        }
    }
}
