//! Failure classification
//!
//! Normalizes whatever a handler failed with (a panic payload, a plain
//! error, an error carrying a captured call stack, or nothing at all) into a
//! [`CapturedFailure`] that can be logged uniformly.

use serde_json::{json, Value};
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;

/// Type-erased error accepted by the classifier
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Logged when asked to log an absent error
pub const NIL_ERROR_MESSAGE: &str = "given error message doesn't implement error interface";

/// Logged when a panic carried no usable value
pub const NIL_PANIC_MESSAGE: &str = "panic error is nil";

/// One entry of a captured call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: Option<&str>, line: Option<u32>) -> Self {
        Self {
            function: function.into(),
            file: file.map(String::from),
            line,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{} {}:{}", self.function, file, line),
            (Some(file), None) => write!(f, "{} {}", self.function, file),
            _ => write!(f, "{}", self.function),
        }
    }
}

/// Capability of errors that carry their own call stack
pub trait HasTrace {
    /// Frames ordered innermost first
    fn frames(&self) -> &[Frame];
}

/// Error carrying the call stack of the place it was created or wrapped at
#[derive(Debug)]
pub struct TracedError {
    message: String,
    frames: Vec<Frame>,
    source: Option<BoxError>,
}

impl TracedError {
    /// New error with a stack captured here
    #[inline(never)]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: capture_frames(),
            source: None,
        }
    }

    /// Attach a stack to an existing error.
    ///
    /// An error that already is a `TracedError` keeps its original frames.
    #[inline(never)]
    pub fn wrap(err: impl Into<BoxError>) -> Self {
        let err = err.into();
        match err.downcast::<TracedError>() {
            Ok(traced) => *traced,
            Err(err) => Self {
                message: err.to_string(),
                frames: capture_frames(),
                source: Some(err),
            },
        }
    }

    /// Build from already known frames
    pub fn with_frames(message: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            message: message.into(),
            frames,
            source: None,
        }
    }

    /// Prefix the message with `context`, keeping the frames
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Drop frames whose function name ends with `suffix`
    pub(crate) fn without_frames_of(mut self, suffix: &str) -> Self {
        self.frames.retain(|frame| !frame.function.ends_with(suffix));
        self
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TracedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl HasTrace for TracedError {
    fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Capture the current call stack, innermost first.
///
/// Frames of the backtrace machinery are dropped. The first two frames left
/// are always this function and the `TracedError` constructor that called
/// it, which is what [`SKIP_DEPTH`](crate::SKIP_DEPTH) hides.
#[inline(never)]
fn capture_frames() -> Vec<Frame> {
    let backtrace = Backtrace::force_capture();
    parse_backtrace(&backtrace.to_string())
        .into_iter()
        .skip_while(|frame| is_backtrace_frame(&frame.function))
        .collect()
}

fn is_backtrace_frame(function: &str) -> bool {
    function.starts_with("std::backtrace") || function.starts_with("backtrace::")
}

/// Parse the text form of a `std::backtrace::Backtrace`:
///
/// ```text
///    0: my_crate::handler
///              at ./src/handler.rs:12:5
/// ```
///
/// That text is not a stable API of std. Lines that do not match the shape
/// above are ignored, so a format change degrades to fewer frames (and the
/// message-only log line) rather than to an error.
pub(crate) fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(location) = line.strip_prefix("at ") {
            // Inlined frames share one location line; only the first symbol gets it
            if let Some(frame) = frames.last_mut().filter(|f| f.file.is_none()) {
                let (file, line_no) = split_location(location);
                frame.file = Some(file);
                frame.line = line_no;
            }
            continue;
        }

        if let Some((index, function)) = line.split_once(": ") {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                frames.push(Frame::new(function.trim(), None, None));
            }
        }
    }

    frames
}

/// Split `path:line:column` from the right so that Windows drive letters survive
fn split_location(location: &str) -> (String, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let rest = parts.next();

    match (rest, middle, last) {
        (Some(file), Some(line), Some(_column)) => match line.parse() {
            Ok(n) => (file.to_string(), Some(n)),
            Err(_) => (location.to_string(), None),
        },
        (None, Some(file), Some(line)) => match line.parse() {
            Ok(n) => (file.to_string(), Some(n)),
            Err(_) => (location.to_string(), None),
        },
        _ => (location.to_string(), None),
    }
}

/// Closed set of failure shapes the classifier understands
#[derive(Debug)]
pub enum Failure {
    /// Ad-hoc message (panic with a string, runtime panics such as
    /// out-of-bounds indexing or overflow)
    Message(String),
    /// Error carrying its own call stack
    Traced(TracedError),
    /// Error without trace information
    Plain(BoxError),
    /// Value of no known failure shape; `None` is the nil case
    Unknown(Option<String>),
}

impl Failure {
    /// The absent failure
    pub fn nil() -> Self {
        Failure::Unknown(None)
    }

    /// Classify an arbitrary error by capability
    pub fn from_error(err: impl Into<BoxError>) -> Self {
        let err = err.into();
        match err.downcast::<TracedError>() {
            Ok(traced) => Failure::Traced(*traced),
            Err(err) => Failure::Plain(err),
        }
    }

    /// Classify a payload recovered from a panic
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<&'static str>() {
            Ok(message) => return Failure::Message((*message).to_string()),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Failure::Message(*message),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<TracedError>() {
            Ok(traced) => return Failure::Traced(*traced),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return Failure::from_error(*err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<anyhow::Error>() {
            Ok(err) => {
                return match err.downcast::<TracedError>() {
                    Ok(traced) => Failure::Traced(traced),
                    Err(err) => Failure::Plain(err.into()),
                }
            }
            Err(payload) => payload,
        };
        match payload.downcast::<std::io::Error>() {
            Ok(err) => Failure::Plain(err),
            // (), Option<()>::None and any foreign payload type
            Err(_) => Failure::nil(),
        }
    }

    /// Raw response encoding of the failure value.
    ///
    /// Errors encode as an empty object so their internals never reach the
    /// client; only logs carry the message and trace.
    pub fn to_json(&self) -> Value {
        match self {
            Failure::Message(message) => Value::String(message.clone()),
            Failure::Traced(_) | Failure::Plain(_) => json!({}),
            Failure::Unknown(Some(text)) => Value::String(text.clone()),
            Failure::Unknown(None) => Value::Null,
        }
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Message(message.to_string())
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Message(message)
    }
}

impl From<TracedError> for Failure {
    fn from(err: TracedError) -> Self {
        Failure::Traced(err)
    }
}

/// Which branch of classification produced a [`CapturedFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Message,
    Traced,
    Plain,
    Unknown,
    Nil,
}

/// Normalized failure, ready to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFailure {
    pub message: String,
    pub frames: Vec<Frame>,
    pub kind: FailureKind,
}

impl CapturedFailure {
    pub fn has_trace(&self) -> bool {
        !self.frames.is_empty()
    }

    /// False only for the nil case, whose message is a sentinel
    pub fn is_usable(&self) -> bool {
        self.kind != FailureKind::Nil
    }

    /// Prefix the message with `context`
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }
}

/// Normalize a failure value
pub fn classify(failure: &Failure) -> CapturedFailure {
    match failure {
        Failure::Message(message) => CapturedFailure {
            message: message.clone(),
            frames: Vec::new(),
            kind: FailureKind::Message,
        },
        Failure::Traced(err) => classify_traced(err),
        Failure::Plain(err) => {
            let mut message = err.to_string();
            if message.is_empty() {
                message = format!("{:?}", err);
            }
            CapturedFailure {
                message,
                frames: Vec::new(),
                kind: FailureKind::Plain,
            }
        }
        Failure::Unknown(Some(text)) => CapturedFailure {
            message: text.clone(),
            frames: Vec::new(),
            kind: FailureKind::Unknown,
        },
        Failure::Unknown(None) => CapturedFailure {
            message: NIL_ERROR_MESSAGE.to_string(),
            frames: Vec::new(),
            kind: FailureKind::Nil,
        },
    }
}

/// Classify anything exposing a trace
pub(crate) fn classify_traced(err: &(impl HasTrace + fmt::Display)) -> CapturedFailure {
    CapturedFailure {
        message: err.to_string(),
        frames: err.frames().to_vec(),
        kind: FailureKind::Traced,
    }
}
