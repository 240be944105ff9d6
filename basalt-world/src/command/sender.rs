//! The command sender contract.

use basalt_utils::locks::SyncMutex;
use basalt_utils::text::ChatComponent;

/// Something that can issue commands and receive replies.
pub trait CommandSender: Send + Sync {
    /// Display name used in broadcasts.
    fn display_name(&self) -> String;

    /// Whether this sender may run a command requiring `perm_level`.
    fn can_use_command(&self, perm_level: i32, name: &str) -> bool;

    /// Delivers a chat message to the sender.
    fn add_chat_message(&self, message: ChatComponent);
}

/// The server console: full permissions, replies go to the log.
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn display_name(&self) -> String {
        String::from("Server")
    }

    fn can_use_command(&self, _perm_level: i32, _name: &str) -> bool {
        true
    }

    fn add_chat_message(&self, message: ChatComponent) {
        log::info!("{}", message.to_plain());
    }
}

/// A sender with a fixed permission level that records its messages.
/// Used by tests and as the player-session adapter's core.
pub struct MemorySender {
    name: String,
    permission_level: i32,
    messages: SyncMutex<Vec<ChatComponent>>,
}

impl MemorySender {
    /// Creates a sender with a name and permission level.
    #[must_use]
    pub fn new(name: &str, permission_level: i32) -> Self {
        Self {
            name: name.to_owned(),
            permission_level,
            messages: SyncMutex::new(Vec::new()),
        }
    }

    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatComponent> {
        self.messages.lock().clone()
    }
}

impl CommandSender for MemorySender {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn can_use_command(&self, perm_level: i32, _name: &str) -> bool {
        self.permission_level >= perm_level
    }

    fn add_chat_message(&self, message: ChatComponent) {
        self.messages.lock().push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_threshold() {
        let sender = MemorySender::new("mod", 2);
        assert!(sender.can_use_command(2, "time"));
        assert!(sender.can_use_command(0, "help"));
        assert!(!sender.can_use_command(4, "stop"));
    }

    #[test]
    fn messages_accumulate() {
        let sender = MemorySender::new("a", 0);
        sender.add_chat_message(ChatComponent::text("one"));
        sender.add_chat_message(ChatComponent::text("two"));
        assert_eq!(sender.messages().len(), 2);
    }
}
