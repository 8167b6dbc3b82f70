use super::message::Message;
use super::role::Role;

/// Ordered message history for one request.
///
/// Messages can only be appended; there is no API to edit or remove them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation from the user's query
    pub fn from_query<S: Into<String>>(query: S) -> Self {
        let mut conversation = Self::new();
        conversation.push(Message::user().with_text(query));
        conversation
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Text of the most recent assistant message that answers rather than calls tools
    pub fn last_answer(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant && m.tool_requests().is_empty())
            .find_map(Message::text)
    }
}
