//! Shapes exchanged with a chat channel.

/// An update as a chat platform delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A typed message. Slash commands arrive this way too.
    Message { user_id: String, text: String },
    /// A button press carrying the button's data string.
    Callback { user_id: String, data: String },
}

impl ChannelEvent {
    pub fn message(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        ChannelEvent::Message {
            user_id: user_id.into(),
            text: text.into(),
        }
    }

    pub fn callback(user_id: impl Into<String>, data: impl Into<String>) -> Self {
        ChannelEvent::Callback {
            user_id: user_id.into(),
            data: data.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            ChannelEvent::Message { user_id, .. } => user_id,
            ChannelEvent::Callback { user_id, .. } => user_id,
        }
    }
}

/// A selectable button attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAction {
    pub label: String,
    pub code: String,
}

impl ReplyAction {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }
}

/// The outbound message: text plus buttons, which may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDirective {
    pub text: String,
    pub actions: Vec<ReplyAction>,
}

impl ReplyDirective {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: Vec<ReplyAction>) -> Self {
        self.actions = actions;
        self
    }

    pub fn has_action(&self, code: &str) -> bool {
        self.actions.iter().any(|a| a.code == code)
    }
}
