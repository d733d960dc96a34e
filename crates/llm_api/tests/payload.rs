use codegen_protocol::HistoryTurn;
use llm_api::{ChatCompletionRequest, GeminiContent, GeminiRequest};
use serde_json::json;

#[test]
fn gemini_generation_request_maps_assistant_turns_to_model() {
    let history = vec![
        HistoryTurn::user("build a todo app"),
        HistoryTurn::assistant("{\"action\":\"THINKING\",\"content\":\"ok\"}"),
    ];
    let request = GeminiRequest::generation(&history, "continue", "be terse");
    let value = serde_json::to_value(&request).expect("serialize");

    assert_eq!(value["contents"][0]["role"], "user");
    assert_eq!(value["contents"][1]["role"], "model");
    assert_eq!(value["contents"][2]["parts"][0]["text"], "continue");
    assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be terse");
    assert!(value.get("tools").is_none());
}

#[test]
fn code_execution_request_enables_tool() {
    let request = GeminiRequest::code_execution(vec![GeminiContent::user("2+2?")]);
    let value = serde_json::to_value(&request).expect("serialize");

    assert_eq!(value["tools"], json!([{ "codeExecution": {} }]));
    assert!(value.get("systemInstruction").is_none());
}

#[test]
fn chat_request_puts_system_message_first() {
    let history = vec![HistoryTurn::user("a"), HistoryTurn::assistant("b")];
    let request = ChatCompletionRequest::generation("gpt-4o", &history, "c", "rules");
    let value = serde_json::to_value(&request).expect("serialize");

    assert_eq!(value["stream"], true);
    let roles: Vec<&str> = value["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .filter_map(|message| message["role"].as_str())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
}

#[test]
fn blank_instructions_are_omitted() {
    let request = ChatCompletionRequest::generation("m", &[], "hi", "  ");
    assert_eq!(request.messages.len(), 1);
}
