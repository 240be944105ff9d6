//! The built-in command set.

use std::sync::atomic::Ordering;

use basalt_registry::REGISTRY;
use basalt_utils::text::ChatComponent;

use crate::command::sender::CommandSender;
use crate::command::{Command, CommandContext, CommandError, parse_bounded};

/// All built-in commands in registration order.
#[must_use]
pub fn builtin_commands() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(StopCommand),
        Box::new(SayCommand),
        Box::new(HelpCommand),
        Box::new(ListCommand),
        Box::new(GamemodeCommand),
        Box::new(TimeCommand),
        Box::new(GiveCommand),
        Box::new(TpCommand),
        Box::new(GameruleCommand),
        Box::new(DifficultyCommand),
        Box::new(SeedCommand),
        Box::new(KillCommand),
    ]
}

fn require_player(context: &CommandContext<'_>, name: &str) -> Result<String, CommandError> {
    context
        .players
        .iter()
        .find(|player| player.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| CommandError::PlayerNotFound(name.to_owned()))
}

struct StopCommand;

impl Command for StopCommand {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn permission_level(&self) -> i32 {
        4
    }

    fn usage(&self) -> &'static str {
        "/stop"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        _args: &[&str],
    ) -> Result<i32, CommandError> {
        sender.add_chat_message(ChatComponent::text("Stopping the server"));
        context.stop_flag.store(true, Ordering::SeqCst);
        Ok(1)
    }
}

struct SayCommand;

impl Command for SayCommand {
    fn name(&self) -> &'static str {
        "say"
    }

    fn permission_level(&self) -> i32 {
        1
    }

    fn usage(&self) -> &'static str {
        "/say <message ...>"
    }

    fn execute(
        &self,
        _context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        if args.is_empty() {
            return Err(CommandError::SyntaxError(self.usage().to_owned()));
        }
        let message = format!("[{}] {}", sender.display_name(), args.join(" "));
        // Fan-out to sessions happens at the network layer; the sender
        // sees the broadcast immediately.
        sender.add_chat_message(ChatComponent::text(message));
        Ok(1)
    }
}

struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn permission_level(&self) -> i32 {
        0
    }

    fn usage(&self) -> &'static str {
        "/help"
    }

    fn execute(
        &self,
        _context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        _args: &[&str],
    ) -> Result<i32, CommandError> {
        sender.add_chat_message(ChatComponent::text(
            "Available commands: /stop /say /help /list /gamemode /time /give /tp /gamerule /difficulty /seed /kill",
        ));
        Ok(1)
    }
}

struct ListCommand;

impl Command for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn permission_level(&self) -> i32 {
        0
    }

    fn usage(&self) -> &'static str {
        "/list"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        _args: &[&str],
    ) -> Result<i32, CommandError> {
        sender.add_chat_message(ChatComponent::text(format!(
            "There are {} players online: {}",
            context.players.len(),
            context.players.join(", ")
        )));
        Ok(1)
    }
}

struct GamemodeCommand;

impl Command for GamemodeCommand {
    fn name(&self) -> &'static str {
        "gamemode"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/gamemode <mode> [player]"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        let Some(&mode_arg) = args.first() else {
            return Err(CommandError::SyntaxError(self.usage().to_owned()));
        };
        let mode = match mode_arg {
            "survival" | "s" => 0,
            "creative" | "c" => 1,
            "adventure" | "a" => 2,
            other => parse_bounded(other, 0, 3, self.usage())? as i32,
        };

        let target = match args.get(1) {
            Some(name) => require_player(context, name)?,
            None => sender.display_name(),
        };
        sender.add_chat_message(ChatComponent::text(format!(
            "Set {target}'s game mode to {mode}"
        )));
        Ok(1)
    }

    fn is_username_index(&self, _args: &[&str], index: usize) -> bool {
        index == 1
    }
}

struct TimeCommand;

impl Command for TimeCommand {
    fn name(&self) -> &'static str {
        "time"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/time <set|add> <value>"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        let (Some(&action), Some(&value_arg)) = (args.first(), args.get(1)) else {
            return Err(CommandError::SyntaxError(self.usage().to_owned()));
        };
        let value = match value_arg {
            "day" => 1000,
            "night" => 13_000,
            other => parse_bounded(other, 0, i64::MAX, self.usage())?,
        };

        let mut info = context.world.info.write();
        match action {
            "set" => info.world_time = value,
            "add" => info.world_time += value,
            _ => return Err(CommandError::SyntaxError(self.usage().to_owned())),
        }
        let now = info.world_time;
        drop(info);
        sender.add_chat_message(ChatComponent::text(format!("Set the time to {now}")));
        Ok(1)
    }
}

struct GiveCommand;

impl Command for GiveCommand {
    fn name(&self) -> &'static str {
        "give"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/give <player> <item> [amount]"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        let (Some(&player_arg), Some(&item_arg)) = (args.first(), args.get(1)) else {
            return Err(CommandError::SyntaxError(self.usage().to_owned()));
        };
        let player = require_player(context, player_arg)?;

        let item = REGISTRY
            .items
            .by_name(item_arg)
            .or_else(|| {
                item_arg
                    .parse::<u16>()
                    .ok()
                    .and_then(|id| REGISTRY.items.by_id(id))
            })
            .ok_or_else(|| CommandError::SyntaxError(format!("There is no such item: {item_arg}")))?;

        let amount = match args.get(2) {
            Some(arg) => parse_bounded(arg, 1, 64, self.usage())? as i32,
            None => 1,
        };

        sender.add_chat_message(ChatComponent::text(format!(
            "Given {} x{amount} to {player}",
            item.name
        )));
        Ok(1)
    }

    fn is_username_index(&self, _args: &[&str], index: usize) -> bool {
        index == 0
    }
}

struct TpCommand;

impl Command for TpCommand {
    fn name(&self) -> &'static str {
        "tp"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/tp <player> | /tp <x> <y> <z>"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        match args {
            [target] => {
                let player = require_player(context, target)?;
                sender.add_chat_message(ChatComponent::text(format!(
                    "Teleported {} to {player}",
                    sender.display_name()
                )));
                Ok(1)
            }
            [x, y, z] => {
                let x: f64 = x
                    .parse()
                    .map_err(|_| CommandError::SyntaxError(self.usage().to_owned()))?;
                let y = parse_bounded(y, 0, 255, self.usage())?;
                let z: f64 = z
                    .parse()
                    .map_err(|_| CommandError::SyntaxError(self.usage().to_owned()))?;
                sender.add_chat_message(ChatComponent::text(format!(
                    "Teleported {} to {x:.1}, {y}, {z:.1}",
                    sender.display_name()
                )));
                Ok(1)
            }
            _ => Err(CommandError::SyntaxError(self.usage().to_owned())),
        }
    }

    fn is_username_index(&self, args: &[&str], index: usize) -> bool {
        index == 0 && args.len() <= 1
    }
}

struct GameruleCommand;

impl Command for GameruleCommand {
    fn name(&self) -> &'static str {
        "gamerule"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/gamerule <rule> [value]"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        match args {
            [] => {
                let rules = context.world.game_rules.read();
                let names: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
                sender.add_chat_message(ChatComponent::text(names.join(", ")));
                Ok(1)
            }
            [rule] => {
                let rules = context.world.game_rules.read();
                match rules.get(rule) {
                    Some(value) => {
                        sender
                            .add_chat_message(ChatComponent::text(format!("{rule} = {value}")));
                        Ok(1)
                    }
                    None => Err(CommandError::SyntaxError(format!("No such rule: {rule}"))),
                }
            }
            [rule, value] => {
                context.world.game_rules.write().set(rule, value);
                sender.add_chat_message(ChatComponent::text(format!(
                    "Game rule {rule} has been updated to {value}"
                )));
                Ok(1)
            }
            _ => Err(CommandError::SyntaxError(self.usage().to_owned())),
        }
    }
}

struct DifficultyCommand;

impl Command for DifficultyCommand {
    fn name(&self) -> &'static str {
        "difficulty"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/difficulty <0-3>"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        let Some(&arg) = args.first() else {
            return Err(CommandError::SyntaxError(self.usage().to_owned()));
        };
        let value = parse_bounded(arg, 0, 3, self.usage())? as i32;
        context.world.info.write().difficulty = value;
        sender.add_chat_message(ChatComponent::text(format!("Set difficulty to {value}")));
        Ok(1)
    }
}

struct SeedCommand;

impl Command for SeedCommand {
    fn name(&self) -> &'static str {
        "seed"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/seed"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        _args: &[&str],
    ) -> Result<i32, CommandError> {
        let seed = context.world.info.read().seed;
        sender.add_chat_message(ChatComponent::text(format!("Seed: {seed}")));
        Ok(1)
    }
}

struct KillCommand;

impl Command for KillCommand {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn permission_level(&self) -> i32 {
        2
    }

    fn usage(&self) -> &'static str {
        "/kill [player]"
    }

    fn execute(
        &self,
        context: &CommandContext<'_>,
        sender: &dyn CommandSender,
        args: &[&str],
    ) -> Result<i32, CommandError> {
        let target = match args.first() {
            Some(name) => require_player(context, name)?,
            None => sender.display_name(),
        };
        // Find the entity and void it out.
        let mut entities = context.world.entities.write();
        let target_id = entities
            .iter()
            .find(|entity| entity.display_name() == target)
            .map(|entity| entity.id);
        if let Some(id) = target_id
            && let Some(entity) = entities.get_mut(id)
        {
            entity.health = 0.0;
            entity.dead = true;
        }
        drop(entities);
        sender.add_chat_message(ChatComponent::text(format!("Ouch! That looked painful ({target})")));
        Ok(1)
    }

    fn is_username_index(&self, _args: &[&str], index: usize) -> bool {
        index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDispatcher;
    use crate::command::sender::MemorySender;
    use crate::world::{Dimension, World};
    use basalt_gen::{ChunkGenerator, PopulateWorld, RawChunk};
    use basalt_utils::ChunkPos;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    struct EmptyGenerator;

    impl ChunkGenerator for EmptyGenerator {
        fn generate(&self, _pos: ChunkPos) -> RawChunk {
            RawChunk::empty()
        }

        fn populate(&self, _world: &mut dyn PopulateWorld, _pos: ChunkPos) {}
    }

    fn setup() -> (World, Vec<String>, AtomicBool) {
        let world = World::new(
            Dimension::Overworld,
            424_242,
            Arc::new(EmptyGenerator),
            None,
            0,
        )
        .expect("ram world");
        let players = vec![String::from("Alice"), String::from("Bob")];
        (world, players, AtomicBool::new(false))
    }

    #[test]
    fn stop_needs_level_four() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();

        let lowly = MemorySender::new("mod", 2);
        dispatcher.execute(&context, &lowly, "/stop");
        assert!(!stop.load(Ordering::SeqCst));
        assert!(lowly.messages()[0].to_plain().contains("permission"));

        let admin = MemorySender::new("admin", 4);
        dispatcher.execute(&context, &admin, "/stop");
        assert!(stop.load(Ordering::SeqCst));
    }

    #[test]
    fn time_set_updates_world_time() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();
        let op = MemorySender::new("op", 2);
        dispatcher.execute(&context, &op, "/time set 6000");
        assert_eq!(world.world_time(), 6000);
        dispatcher.execute(&context, &op, "/time add 100");
        assert_eq!(world.world_time(), 6100);
    }

    #[test]
    fn unknown_player_is_reported() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();
        let op = MemorySender::new("op", 4);
        dispatcher.execute(&context, &op, "/give Nobody stone 1");
        assert!(op.messages()[0].to_plain().contains("cannot be found"));
    }

    #[test]
    fn number_bounds_are_reported() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();
        let op = MemorySender::new("op", 4);
        dispatcher.execute(&context, &op, "/difficulty 9");
        assert!(op.messages()[0].to_plain().contains("too big"));
        dispatcher.execute(&context, &op, "/gamerule doFireTick false");
        assert!(!world.game_rules.read().get_bool("doFireTick"));
    }

    #[test]
    fn seed_reports_the_world_seed() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();
        let op = MemorySender::new("op", 2);
        dispatcher.execute(&context, &op, "/seed");
        assert!(op.messages()[0].to_plain().contains("424242"));
    }

    #[test]
    fn unknown_command_is_flagged() {
        let (world, players, stop) = setup();
        let context = CommandContext {
            world: &world,
            players: &players,
            stop_flag: &stop,
        };
        let dispatcher = CommandDispatcher::new();
        let op = MemorySender::new("op", 4);
        dispatcher.execute(&context, &op, "/frobnicate");
        assert!(op.messages()[0].to_plain().contains("Unknown command"));
    }
}
