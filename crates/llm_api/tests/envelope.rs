use codegen_protocol::WireFormat;
use llm_api::{delta_decoder, EnvelopeDecoder, EnvelopeShape, SseChunkDecoder, StreamDelta};
use llm_api::envelope::DeltaDecoder;
use serde_json::json;

fn texts(deltas: &[StreamDelta]) -> Vec<&str> {
    deltas
        .iter()
        .filter_map(|delta| match delta {
            StreamDelta::Text(text) => Some(text.as_str()),
            StreamDelta::Failure(_) => None,
        })
        .collect()
}

fn feed_in_chunks(decoder: &mut dyn DeltaDecoder, body: &[u8], size: usize) -> Vec<StreamDelta> {
    let mut deltas = Vec::new();
    for chunk in body.chunks(size) {
        deltas.extend(decoder.feed(chunk));
    }
    deltas.extend(decoder.finish());
    deltas
}

#[test]
fn gemini_rest_array_is_recovered_across_any_chunking() {
    let body = concat!(
        "[{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"{\\\"action\\\": \"}]}}]}\n",
        ",\r\n{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"\\\"THINKING\\\"}\"}]}}]}]"
    );

    for size in [1, 2, 7, 64, body.len()] {
        let mut decoder = EnvelopeDecoder::new(EnvelopeShape::GeminiRest);
        let deltas = feed_in_chunks(&mut decoder, body.as_bytes(), size);
        assert_eq!(
            texts(&deltas),
            vec!["{\"action\": ", "\"THINKING\"}"],
            "chunk size {size}"
        );
    }
}

#[test]
fn openai_sse_prefixes_and_done_sentinel_are_ignored() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"{\\\"action\\\":\\\"FINISH\\\"}\"}}]}\n\n",
        "data: [DONE]\n\n"
    );

    let mut decoder = delta_decoder(WireFormat::OpenAiCompatible);
    let deltas = feed_in_chunks(decoder.as_mut(), body.as_bytes(), 5);
    assert_eq!(texts(&deltas), vec!["{\"action\":\"FINISH\"}"]);
}

#[test]
fn gemini_sdk_chunks_skip_thought_parts() {
    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[",
        "{\"text\":\"pondering\",\"thought\":true},{\"text\":\"{\\\"a\\\":1}\"}]}}]}\n\n"
    );

    let mut decoder = SseChunkDecoder::default();
    let deltas = feed_in_chunks(&mut decoder, body.as_bytes(), 3);
    assert_eq!(texts(&deltas), vec!["{\"a\":1}"]);
}

#[test]
fn error_envelopes_become_failures() {
    let body = r#"[{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}]"#;

    let mut decoder = EnvelopeDecoder::new(EnvelopeShape::GeminiRest);
    let deltas = feed_in_chunks(&mut decoder, body.as_bytes(), 11);
    assert_eq!(
        deltas,
        vec![StreamDelta::Failure(json!({
            "error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}
        }))]
    );
}

#[test]
fn sdk_error_event_becomes_failure() {
    let mut decoder = delta_decoder(WireFormat::GeminiSdk);
    let deltas = decoder.feed(b"data: {\"error\":{\"message\":\"bad key\",\"status\":\"INVALID_ARGUMENT\"}}\n\n");
    assert!(matches!(deltas.as_slice(), [StreamDelta::Failure(_)]));
}

#[test]
fn multibyte_text_split_between_chunks_is_preserved() {
    let body = "[{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"سلام ✓\"}]}}]}]".as_bytes();

    let mut decoder = EnvelopeDecoder::new(EnvelopeShape::GeminiRest);
    let deltas = feed_in_chunks(&mut decoder, body, 1);
    assert_eq!(texts(&deltas), vec!["سلام ✓"]);
}
