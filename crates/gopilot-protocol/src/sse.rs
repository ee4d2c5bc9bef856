use bytes::Bytes;

/// Literal sentinel terminating every emulated stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Renders one `data: <payload>\n\n` frame. Multi-line payloads get one
/// `data:` line each, per the SSE wire format.
pub fn data_frame(payload: &str) -> Bytes {
    let mut out = String::with_capacity(payload.len() + 16);
    for line in payload.split('\n') {
        out.push_str("data: ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    Bytes::from(out)
}

pub fn done_frame() -> Bytes {
    Bytes::from_static(b"data: [DONE]\n\n")
}

/// Extracts the payload of a single-event `data:` frame. Used by tests to
/// assert on emulated streams without a full SSE parser.
pub fn frame_payload(frame: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(frame).ok()?;
    let mut lines = Vec::new();
    for line in text.trim_end_matches('\n').split('\n') {
        let value = line.strip_prefix("data:")?;
        lines.push(value.strip_prefix(' ').unwrap_or(value));
    }
    if lines.is_empty() {
        return None;
    }
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_frame_round_trips() {
        let frame = data_frame(r#"{"x":1}"#);
        assert_eq!(frame.as_ref(), b"data: {\"x\":1}\n\n");
        assert_eq!(frame_payload(&frame).as_deref(), Some(r#"{"x":1}"#));
    }

    #[test]
    fn done_frame_is_the_literal_sentinel() {
        assert_eq!(frame_payload(&done_frame()).as_deref(), Some(DONE_SENTINEL));
    }

    #[test]
    fn multi_line_payloads_use_one_data_line_each() {
        let frame = data_frame("a\nb");
        assert_eq!(frame.as_ref(), b"data: a\ndata: b\n\n");
        assert_eq!(frame_payload(&frame).as_deref(), Some("a\nb"));
    }
}
