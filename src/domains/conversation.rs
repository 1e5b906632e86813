use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Bot,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub pending: bool,
    pub retryable: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::User,
            text: text.into(),
            pending: false,
            retryable: false,
        }
    }

    pub fn pending_bot() -> Self {
        Self {
            kind: MessageKind::Bot,
            text: String::new(),
            pending: true,
            retryable: false,
        }
    }

    pub fn error(text: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            pending: false,
            retryable,
        }
    }
}

/// Append-only chat log with at most one pending entry.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its index.
    ///
    /// At most one message is pending: appending a new pending message
    /// closes any older pending slot, leaving its text as it was.
    pub fn append(&mut self, message: Message) -> usize {
        if message.pending {
            if let Some(index) = self.pending_index() {
                tracing::warn!(index, "Pending message superseded before resolution");
                self.messages[index].pending = false;
            }
        }
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Resolves the most recent pending message. Returns its index, or
    /// `None` (and changes nothing) when no message is pending.
    pub fn resolve_pending(&mut self, text: impl Into<String>) -> Option<usize> {
        let index = self.pending_index()?;
        let message = &mut self.messages[index];
        message.text = text.into();
        message.pending = false;
        Some(index)
    }

    /// Turns the pending slot into a retryable error entry in place, or
    /// appends one when nothing is pending. Returns the error's index.
    pub fn fail_pending(&mut self, text: impl Into<String>) -> usize {
        match self.pending_index() {
            Some(index) => {
                self.messages[index] = Message::error(text, true);
                index
            }
            None => self.append(Message::error(text, true)),
        }
    }

    /// Text to resend for the retryable error at `index`. The entry right
    /// before it must be the user message that failed.
    pub fn retry_text(&self, index: usize) -> Option<String> {
        let entry = self.messages.get(index)?;
        if entry.kind != MessageKind::Error || !entry.retryable {
            return None;
        }
        let previous = self.messages.get(index.checked_sub(1)?)?;
        (previous.kind == MessageKind::User).then(|| previous.text.clone())
    }

    pub fn pending_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|message| message.pending)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
