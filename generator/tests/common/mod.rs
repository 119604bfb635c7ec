//! Shared fixtures for generator integration tests

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn openai_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    })
}

pub fn anthropic_reply(content: &str) -> Value {
    json!({
        "id": "msg-test",
        "content": [{ "type": "text", "text": content }],
        "usage": { "input_tokens": 15, "output_tokens": 5 }
    })
}

pub fn prediction(status: &str, poll_url: &str, output: Value) -> Value {
    json!({
        "id": "p1",
        "status": status,
        "urls": { "get": poll_url },
        "output": output
    })
}
