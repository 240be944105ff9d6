//! The command dispatcher and its sender/permission contract.

pub mod commands;
pub mod sender;

use std::sync::atomic::AtomicBool;

use basalt_utils::text::{ChatColor, ChatComponent};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::world::World;
use sender::CommandSender;

/// Typed command failures. None of these propagate past the dispatcher;
/// the sender receives a message and the tick loop is unaffected.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// The sender's permission level is too low.
    #[error("You do not have permission to use this command")]
    NotAuthorized,
    /// Bad argument shape; carries the usage string.
    #[error("Usage: {0}")]
    SyntaxError(String),
    /// A named player is not online.
    #[error("Player '{0}' cannot be found")]
    PlayerNotFound(String),
    /// A numeric argument under its minimum.
    #[error("The number you have entered ({value}) is too small, it must be at least {min}")]
    NumberTooSmall {
        /// Parsed value.
        value: i64,
        /// Lower bound.
        min: i64,
    },
    /// A numeric argument over its maximum.
    #[error("The number you have entered ({value}) is too big, it must be at most {max}")]
    NumberTooBig {
        /// Parsed value.
        value: i64,
        /// Upper bound.
        max: i64,
    },
    /// No such command.
    #[error("Unknown command. Try /help for a list of commands")]
    UnknownCommand,
}

/// Parses an integer argument within bounds.
pub fn parse_bounded(arg: &str, min: i64, max: i64, usage: &str) -> Result<i64, CommandError> {
    let value: i64 = arg
        .parse()
        .map_err(|_| CommandError::SyntaxError(usage.to_owned()))?;
    if value < min {
        return Err(CommandError::NumberTooSmall { value, min });
    }
    if value > max {
        return Err(CommandError::NumberTooBig { value, max });
    }
    Ok(value)
}

/// Everything a command may touch.
pub struct CommandContext<'a> {
    /// The world being commanded.
    pub world: &'a World,
    /// Names of online players, for targeting and completion.
    pub players: &'a [String],
    /// Set by `/stop`; the server loop watches it.
    pub stop_flag: &'a AtomicBool,
}

/// One command implementation.
pub trait Command: Send + Sync {
    /// Primary name, without the slash.
    fn name(&self) -> &'static str;

    /// Permission level required (0–4).
    fn permission_level(&self) -> i32;

    /// Usage string for syntax errors and `/help`.
    fn usage(&self) -> &'static str;

    /// Executes with pre-split arguments. Returns a success count.
    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError>;

    /// Whether the argument at `index` names a player, for completion.
    fn is_username_index(&self, args: &[&str], index: usize) -> bool {
        let _ = (args, index);
        false
    }
}

/// The dispatcher: a name-keyed command table.
pub struct CommandDispatcher {
    commands: FxHashMap<&'static str, Box<dyn Command>>,
}

impl CommandDispatcher {
    /// Builds the dispatcher with the built-in command set.
    #[must_use]
    pub fn new() -> Self {
        let mut dispatcher = Self {
            commands: FxHashMap::default(),
        };
        for command in commands::builtin_commands() {
            dispatcher.register(command);
        }
        dispatcher
    }

    /// Registers a command, replacing an existing one of the same name.
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    /// Looks a command up by name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(Box::as_ref)
    }

    /// Command names visible to a sender, sorted.
    #[must_use]
    pub fn visible_commands(&self, sender: &dyn CommandSender) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .commands
            .values()
            .filter(|command| sender.can_use_command(command.permission_level(), command.name()))
            .map(|command| command.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Executes a raw command line (leading slash optional). Errors are
    /// rendered to the sender; the return value is the success count.
    pub fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        line: &str,
    ) -> i32 {
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return 0;
        };
        let args: Vec<&str> = parts.collect();

        let result = match self.commands.get(name) {
            None => Err(CommandError::UnknownCommand),
            Some(command) => {
                if sender.can_use_command(command.permission_level(), command.name()) {
                    command.execute(context, sender, &args)
                } else {
                    Err(CommandError::NotAuthorized)
                }
            }
        };

        match result {
            Ok(count) => count,
            Err(error) => {
                sender.add_chat_message(
                    ChatComponent::text(error.to_string()).colored(ChatColor::Red),
                );
                0
            }
        }
    }

    /// Case-insensitive prefix completion over command names and, where a
    /// command flags the argument as a username index, player names.
    #[must_use]
    pub fn tab_complete(&self, line: &str, players: &[String]) -> Vec<String> {
        let line = line.strip_prefix('/').unwrap_or(line);
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() <= 1 {
            let prefix = parts.first().copied().unwrap_or("").to_lowercase();
            let mut names: Vec<String> = self
                .commands
                .keys()
                .filter(|name| name.to_lowercase().starts_with(&prefix))
                .map(|name| format!("/{name}"))
                .collect();
            names.sort_unstable();
            return names;
        }

        let Some(command) = self.commands.get(parts[0]) else {
            return Vec::new();
        };
        let args = &parts[1..];
        let index = args.len() - 1;
        if command.is_username_index(args, index) {
            let prefix = args[index].to_lowercase();
            let mut names: Vec<String> = players
                .iter()
                .filter(|player| player.to_lowercase().starts_with(&prefix))
                .cloned()
                .collect();
            names.sort_unstable();
            return names;
        }
        Vec::new()
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
