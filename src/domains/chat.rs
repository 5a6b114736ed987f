use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model", alias = "assistant")]
    Advisor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn advisor(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Advisor,
            text: text.into(),
        }
    }
}

/// Session-scoped conversation. Messages are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_appends_in_order() {
        let mut history = ChatHistory::new();
        assert!(history.is_empty());
        history.push(ChatMessage::advisor("hello"));
        history.push(ChatMessage::user("why no sales?"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].role, ChatRole::Advisor);
        assert_eq!(history.last().map(|m| m.text.as_str()), Some("why no sales?"));
    }

    #[test]
    fn role_accepts_model_alias() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"role": "model", "text": "hi"}"#).unwrap();
        assert_eq!(message.role, ChatRole::Advisor);
        let encoded = serde_json::to_string(&message).unwrap();
        assert!(encoded.contains(r#""role":"advisor""#));
    }
}
