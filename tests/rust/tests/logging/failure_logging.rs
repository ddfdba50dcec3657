//! Failure classification and trace rendering end to end

use pretty_assertions::assert_eq;
use reqguard_core::{
    classify, render, Failure, FailureKind, Frame, HasTrace, LogChannel, Logger, Sink,
    TracedError, NIL_ERROR_MESSAGE, SKIP_DEPTH,
};
use tests::logs::channel_lines;

#[inline(never)]
fn load_account() -> TracedError {
    TracedError::new("account store unreachable")
}

#[test]
fn traced_error_trace_starts_at_failure_site() {
    let (sink, buffer) = Sink::memory();
    let logger = Logger::new(sink);
    let err = load_account();

    logger.log_failure(Some(&err));

    let expected_frames = err.frames().len().saturating_sub(SKIP_DEPTH);
    let content = buffer.contents();
    let mut lines = content.lines();
    let first = lines.next().unwrap();
    assert!(first.starts_with(LogChannel::Error.prefix()));
    assert!(first.ends_with("account store unreachable"));

    let trace: Vec<&str> = lines.filter(|l| !l.is_empty()).collect();
    assert_eq!(trace.len(), expected_frames);
    assert!(trace[0].contains("load_account"));
    assert!(!content.contains("TracedError::new"));
    assert!(!content.contains("capture_frames"));
}

#[test]
fn panic_payload_trace_starts_at_failure_site() {
    let payload = std::panic::catch_unwind(|| {
        std::panic::panic_any(load_account());
    })
    .unwrap_err();

    let captured = classify(&Failure::from_panic(payload));
    assert_eq!(captured.kind, FailureKind::Traced);

    let rendered = render(&captured, SKIP_DEPTH);
    let first_frame = rendered.lines().find(|l| !l.is_empty()).unwrap();
    assert!(first_frame.contains("load_account"));
    assert!(!rendered.contains("TracedError::new"));
}

#[test]
fn classification_matches_input_shape() {
    let frames = vec![
        Frame::new("wrapper::a", None, None),
        Frame::new("wrapper::b", None, None),
        Frame::new("billing::charge", Some("src/billing.rs"), Some(31)),
    ];

    let cases = vec![
        (Failure::from("plain text"), "plain text", FailureKind::Message),
        (
            Failure::from_error(std::io::Error::new(std::io::ErrorKind::Other, "io down")),
            "io down",
            FailureKind::Plain,
        ),
        (
            Failure::from_error(TracedError::with_frames("card declined", frames)),
            "card declined",
            FailureKind::Traced,
        ),
        (Failure::nil(), NIL_ERROR_MESSAGE, FailureKind::Nil),
    ];

    for (failure, message, kind) in cases {
        let captured = classify(&failure);
        assert_eq!(captured.message, message);
        assert_eq!(captured.kind, kind);
    }
}

#[test]
fn render_shows_caller_frames_only() {
    let frames = vec![
        Frame::new("wrapper::a", None, None),
        Frame::new("wrapper::b", None, None),
        Frame::new("billing::charge", Some("src/billing.rs"), Some(31)),
    ];
    let captured = classify(&Failure::from(TracedError::with_frames("declined", frames)));

    assert_eq!(
        render(&captured, SKIP_DEPTH),
        "\nbilling::charge src/billing.rs:31\n"
    );
    assert_eq!(render(&captured, 5), "declined");
}

#[test]
fn nil_error_is_logged_not_dropped() {
    let (sink, buffer) = Sink::memory();
    let logger = Logger::new(sink);

    logger.log_failure(None);

    assert_eq!(
        channel_lines(&buffer, LogChannel::Error),
        vec![NIL_ERROR_MESSAGE.to_string()]
    );
}
