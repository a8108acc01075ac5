//! Chat prompt templating for the generate endpoint.
//!
//! Renders role/content pairs into the ChatML-style prompt the engine
//! expects when the client did not ask for raw prompting.

use crate::api::Message;

/// Render messages into a ChatML prompt, ending with an open assistant turn.
pub fn render_chat_prompt(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str("<|im_start|>");
        out.push_str(&message.role);
        out.push('\n');
        out.push_str(&message.content);
        out.push_str("<|im_end|>\n");
    }
    out.push_str("<|im_start|>assistant");
    out
}

/// Build the message list for a generate request: optional system message
/// followed by the user prompt.
pub fn generate_messages(system: Option<&str>, prompt: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    if let Some(system) = system
        && !system.is_empty()
    {
        messages.push(Message {
            role: "system".to_string(),
            content: system.to_string(),
        });
    }
    messages.push(Message {
        role: "user".to_string(),
        content: prompt.to_string(),
    });
    messages
}
