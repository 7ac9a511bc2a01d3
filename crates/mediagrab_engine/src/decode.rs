use mediagrab_logging::mediagrab_debug;

use crate::progress::extract_percent;
use crate::{ArtifactInfo, ProtocolEvent};

const DATA_PREFIX: &str = "data: ";
const COMPLETED_TOKEN: &str = "completed";

/// Reassembles newline-delimited protocol lines from arbitrarily split chunks.
///
/// Bytes are buffered rather than text, so a UTF-8 sequence split across two
/// chunks decodes the same as when delivered whole.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the events of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(event) = decode_line(&self.pending[start..end]) {
                events.push(event);
            }
            start = end + 1;
        }
        self.pending.drain(..start);
        events
    }

    /// Bytes of an unterminated trailing line still waiting for its newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Ends the stream. An unterminated trailing line is never dispatched;
    /// returns how many bytes were discarded.
    pub fn finish(self) -> usize {
        self.pending.len()
    }
}

/// Decodes one line without its terminating newline.
///
/// Lines without the `data: ` prefix (event names, keep-alives, blank
/// separators) yield nothing.
pub fn decode_line(line: &[u8]) -> Option<ProtocolEvent> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let text = String::from_utf8_lossy(line);
    let payload = text.strip_prefix(DATA_PREFIX)?;
    classify_payload(payload)
}

/// Classifies a payload: completion token, then metadata, then progress.
///
/// Metadata that fails to parse is dropped; the stream carries no redelivery.
pub fn classify_payload(payload: &str) -> Option<ProtocolEvent> {
    if payload == COMPLETED_TOKEN {
        return Some(ProtocolEvent::Completed);
    }

    if payload.starts_with('{') {
        return match serde_json::from_str::<ArtifactInfo>(payload) {
            Ok(info) if !info.filename.is_empty() => Some(ProtocolEvent::Metadata(info)),
            Ok(_) => {
                mediagrab_debug!("Dropping metadata without filename: {}", payload);
                None
            }
            Err(err) => {
                mediagrab_debug!("Dropping malformed metadata {:?}: {}", payload, err);
                None
            }
        };
    }

    Some(ProtocolEvent::Progress {
        text: payload.to_string(),
        percent: extract_percent(payload),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_returns_are_stripped() {
        assert_eq!(decode_line(b"data: completed\r"), Some(ProtocolEvent::Completed));
    }

    #[test]
    fn prefix_must_match_exactly() {
        assert_eq!(decode_line(b"data:completed"), None);
        assert_eq!(decode_line(b" data: completed"), None);
        assert_eq!(decode_line(b"event: done"), None);
        assert_eq!(decode_line(b""), None);
    }

    #[test]
    fn completion_token_is_exact() {
        assert!(matches!(
            classify_payload("completed!"),
            Some(ProtocolEvent::Progress { percent: None, .. })
        ));
    }

    #[test]
    fn metadata_needs_both_fields() {
        assert_eq!(classify_payload(r#"{"filename":"x.mp4"}"#), None);
        assert_eq!(classify_payload(r#"{"filename":"","downloadUrl":"/files/"}"#), None);
        assert_eq!(
            classify_payload(r#"{"filename":"x.mp4","downloadUrl":"/files/x.mp4","size":3}"#),
            Some(ProtocolEvent::Metadata(ArtifactInfo {
                filename: "x.mp4".to_string(),
                download_url: "/files/x.mp4".to_string(),
            }))
        );
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(b"data: 5").is_empty());
        assert_eq!(decoder.pending_len(), 7);
        let events = decoder.push(b"0% done\n");
        assert_eq!(
            events,
            vec![ProtocolEvent::Progress {
                text: "50% done".to_string(),
                percent: Some(50.0),
            }]
        );
        assert_eq!(decoder.pending_len(), 0);
    }
}
