//! Balanced-brace frame extraction over a growing text buffer.
//!
//! Provider streams are chunked at arbitrary points, so a JSON object may be
//! split across any number of deliveries. [`extract_next`] recovers the first
//! complete, JSON-valid object from the head of a buffer and reports what must
//! be kept for the next delivery. [`FrameBuffer`] threads that buffer through
//! a sequence of deliveries.

use serde::de::IgnoredAny;

/// Result of one extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// A complete JSON object, when one was found.
    pub frame: Option<&'a str>,
    /// Text that must be retained for the next attempt.
    pub remainder: &'a str,
}

/// Pulls the next balanced, JSON-valid object out of `buffer`.
///
/// - No `{` in the buffer: nothing is recoverable and the remainder is empty.
/// - A balanced span that fails JSON validation is a false positive; scanning
///   resumes at the next `{` after that span's opening brace.
/// - An opening brace whose span never closes is incomplete; the remainder is
///   the buffer from that brace onward and everything before it is dropped.
///
/// Quotes toggle string context unless escaped, and braces only count outside
/// strings, so `{"content":"} \" {"}` is one frame.
#[must_use]
pub fn extract_next(buffer: &str) -> Extraction<'_> {
    let mut search_from = 0;

    loop {
        let Some(offset) = buffer[search_from..].find('{') else {
            return Extraction {
                frame: None,
                remainder: "",
            };
        };
        let start = search_from + offset;

        let Some(end) = balanced_end(buffer.as_bytes(), start) else {
            return Extraction {
                frame: None,
                remainder: &buffer[start..],
            };
        };

        let candidate = &buffer[start..=end];
        if is_json(candidate) {
            return Extraction {
                frame: Some(candidate),
                remainder: &buffer[end + 1..],
            };
        }

        tracing::trace!(offset = start, "skipping balanced span that is not JSON");
        search_from = start + 1;
    }
}

/// Index of the `}` that closes the `{` at `start`, if the buffer holds it.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    Scan::at(start).resume(bytes)
}

/// Brace-matching progress through one candidate object.
///
/// Structural characters are ASCII, so byte scanning never lands inside a
/// multi-byte UTF-8 sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Scan {
    position: usize,
    depth: usize,
    in_string: bool,
    is_escaped: bool,
}

impl Scan {
    fn at(position: usize) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Advances over the unscanned bytes, returning the closing brace index.
    ///
    /// On `None` the state covers every byte seen, so scanning can continue
    /// once more bytes are appended.
    fn resume(&mut self, bytes: &[u8]) -> Option<usize> {
        while let Some(&byte) = bytes.get(self.position) {
            let index = self.position;
            self.position += 1;

            if self.in_string {
                if self.is_escaped {
                    self.is_escaped = false;
                } else if byte == b'\\' {
                    self.is_escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }

        None
    }
}

fn is_json(candidate: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(candidate).is_ok()
}

/// Accumulating decoder buffer scoped to one stream.
///
/// Text is appended as it arrives; complete frames are drained from the head.
/// Anything that cannot begin a frame is discarded as soon as it is scanned.
/// An object still open at the head keeps its scan position, so each delivery
/// only scans the bytes it added.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    buffer: String,
    open: Option<Scan>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delivery to the buffer without extracting.
    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Extracts one frame from the buffer head.
    ///
    /// Returns `None` once no complete frame remains; the buffer then holds
    /// only the unconsumed tail, starting at an opening brace.
    pub fn next_frame(&mut self) -> Option<String> {
        loop {
            let mut scan = match self.open.take() {
                Some(scan) => scan,
                None => {
                    let Some(start) = self.buffer.find('{') else {
                        self.buffer.clear();
                        return None;
                    };
                    self.buffer.drain(..start);
                    Scan::default()
                }
            };

            let Some(end) = scan.resume(self.buffer.as_bytes()) else {
                self.open = Some(scan);
                return None;
            };

            let candidate = &self.buffer[..=end];
            if is_json(candidate) {
                let frame = candidate.to_owned();
                self.buffer.drain(..=end);
                return Some(frame);
            }

            tracing::trace!(len = end + 1, "skipping balanced span that is not JSON");
            self.buffer.drain(..1);
        }
    }

    /// Appends a delivery and drains every frame it completes, in order.
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        self.push(text);
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Unconsumed text currently held.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{balanced_end, extract_next, FrameBuffer, Scan};

    #[test]
    fn balanced_end_ignores_braces_inside_strings() {
        let text = r#"{"a":"}{"}"#;
        assert_eq!(balanced_end(text.as_bytes(), 0), Some(text.len() - 1));
    }

    #[test]
    fn balanced_end_handles_escaped_backslash_before_quote() {
        let text = r#"{"a":"x\\"}"#;
        assert_eq!(balanced_end(text.as_bytes(), 0), Some(text.len() - 1));
    }

    #[test]
    fn balanced_end_reports_incomplete_nesting() {
        assert_eq!(balanced_end(br#"{"a":{"b":1}"#, 0), None);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let extraction = extract_next("");
        assert_eq!(extraction.frame, None);
        assert_eq!(extraction.remainder, "");
    }

    #[test]
    fn prose_without_braces_is_discarded() {
        let extraction = extract_next("the model said hello");
        assert_eq!(extraction.frame, None);
        assert_eq!(extraction.remainder, "");
    }

    #[test]
    fn incomplete_object_keeps_tail_from_opening_brace() {
        let extraction = extract_next(r#"noise {"action":"THI"#);
        assert_eq!(extraction.frame, None);
        assert_eq!(extraction.remainder, r#"{"action":"THI"#);
    }

    #[test]
    fn frame_buffer_drops_leading_noise_once_scanned() {
        let mut buffer = FrameBuffer::new();
        assert!(buffer.feed("```json\n").is_empty());
        assert!(buffer.is_empty());
        assert!(buffer.feed(r#"{"a":"#).is_empty());
        assert_eq!(buffer.pending(), r#"{"a":"#);
        assert_eq!(buffer.feed("1}\n"), vec![r#"{"a":1}"#.to_string()]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn scan_resumes_inside_an_escape_across_deliveries() {
        let first = br#"{"a":"x\"#;
        let mut scan = Scan::default();
        assert_eq!(scan.resume(first), None);
        assert!(scan.in_string && scan.is_escaped);

        let whole = br#"{"a":"x\"}"}"#;
        assert_eq!(scan.resume(whole), Some(whole.len() - 1));
    }

    #[test]
    fn open_object_keeps_its_scan_position() {
        let mut buffer = FrameBuffer::new();
        assert!(buffer.feed(r#"noise {"action":"APPEND_TO_FILE","content":"a{"#).is_empty());
        let scanned = buffer.open.map(|scan| scan.position);
        assert_eq!(scanned, Some(buffer.pending().len()));

        assert!(buffer.feed("b}").is_empty());
        let frames = buffer.feed(r#""}"#);
        assert_eq!(frames, vec![r#"{"action":"APPEND_TO_FILE","content":"a{b}"}"#.to_string()]);
        assert!(buffer.open.is_none());
    }

    #[test]
    fn large_record_in_tiny_deliveries_yields_one_frame() {
        let content = "fn main() { println!(\"{}\", 1); }\n".repeat(200);
        let record = serde_json::json!({
            "action": "APPEND_TO_FILE",
            "filePath": "src/main.rs",
            "content": content,
        })
        .to_string();
        let text = format!("prose {{not json}} {record}\n");

        let mut buffer = FrameBuffer::new();
        let mut frames = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        for chunk in chars.chunks(3) {
            frames.extend(buffer.feed(&chunk.iter().collect::<String>()));
        }

        assert_eq!(frames, vec![record]);
        assert!(buffer.is_empty());
    }
}
