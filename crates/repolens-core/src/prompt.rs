//! Prompt assembly around the aggregated repository context.

use repolens_llm::{Message, Role};

pub const SYSTEM_PROMPT: &str = concat!(
    "You are a code assistant. Use ONLY the repository context below to answer. ",
    "If the context clearly contains relevant information, ",
    "DO NOT say that you have no information. ",
    "If there is truly nothing relevant in the context, then say that."
);

pub const CONTEXT_HEADER: &str = "Repository context:\n";

/// Text of the most recent `user` message.
///
/// `None` when there is no user message or its content is empty or not a
/// plain string (content parts are not searched).
#[must_use]
pub fn last_user_message(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .and_then(Message::text)
        .filter(|c| !c.is_empty())
}

/// Instruction, optional context block, then the conversation unchanged.
#[must_use]
pub fn assemble(conversation: &[Message], context: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(conversation.len() + 2);
    messages.push(Message::system(SYSTEM_PROMPT));
    if !context.is_empty() {
        messages.push(Message::system(format!("{CONTEXT_HEADER}{context}")));
    }
    messages.extend_from_slice(conversation);
    messages
}
