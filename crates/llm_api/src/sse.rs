use crate::utf8::Utf8Carry;

/// Incremental parser for SSE text streams.
///
/// Yields the joined `data:` payload of each complete event. `[DONE]`
/// sentinels and empty payloads are dropped.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    utf8: Utf8Carry,
    buffer: String,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete event payloads.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = self.utf8.decode(bytes);
        self.push_text(&text)
    }

    /// Drains whatever the transport left behind once it completes.
    ///
    /// A final event without its blank-line terminator is still delivered.
    pub fn finish(&mut self) -> Vec<String> {
        let rest = self.utf8.finish();
        let mut payloads = self.push_text(&rest);
        let tail = std::mem::take(&mut self.buffer);
        if let Some(payload) = extract_data_payload(&tail) {
            payloads.extend(keep_payload(payload));
        }
        payloads
    }

    fn push_text(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        if self.buffer.contains("\r\n") {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut payloads = Vec::new();
        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);

            if let Some(payload) = extract_data_payload(&frame) {
                payloads.extend(keep_payload(payload));
            }
        }

        payloads
    }
}

fn keep_payload(payload: String) -> Option<String> {
    if payload == "[DONE]" || payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::SseStreamParser;

    #[test]
    fn parse_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut payloads = Vec::new();

        payloads.extend(parser.feed(b"data: {\"candidates\":[]}\n\n"));
        assert_eq!(payloads.len(), 1);

        payloads.extend(parser.feed(b"data: [DONE]\n\n"));
        assert_eq!(payloads.len(), 1);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn crlf_separated_events_split_across_chunks() {
        let mut parser = SseStreamParser::default();
        assert!(parser.feed(b"data: {\"a\":1}\r").is_empty());
        assert!(parser.feed(b"\n\r").is_empty());
        assert_eq!(parser.feed(b"\n"), vec!["{\"a\":1}".to_string()]);
    }
}
