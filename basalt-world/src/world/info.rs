//! Persisted world metadata (`level.dat`).

use std::io::Cursor;
use std::path::Path;

use basalt_utils::BlockPos;
use simdnbt::owned::{BaseNbt, NbtCompound, NbtTag};
use thiserror::Error;

use crate::world::game_rules::GameRules;

/// Default world border diameter.
const DEFAULT_BORDER_SIZE: f64 = 6.0e7;

/// Errors reading `level.dat`.
#[derive(Debug, Error)]
pub enum WorldInfoError {
    /// Not parseable as NBT.
    #[error("malformed level.dat: {0}")]
    Malformed(String),
    /// The `Data` compound is missing.
    #[error("level.dat has no Data compound")]
    NoData,
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The world's persisted metadata.
#[derive(Debug, Clone)]
pub struct WorldInfo {
    /// World seed.
    pub seed: i64,
    /// Spawn point.
    pub spawn: BlockPos,
    /// Total ticks the world has existed.
    pub total_time: i64,
    /// Time-of-day ticks.
    pub world_time: i64,
    /// Whether it is raining.
    pub raining: bool,
    /// Ticks until the rain state flips.
    pub rain_time: i32,
    /// Whether it is thundering.
    pub thundering: bool,
    /// Ticks until the thunder state flips.
    pub thunder_time: i32,
    /// Default game type (0–3, −1 = not set).
    pub game_type: i32,
    /// Difficulty (0–3).
    pub difficulty: i32,
    /// Hardcore flag.
    pub hardcore: bool,
    /// Whether commands (cheats) are allowed.
    pub commands_allowed: bool,
    /// Whether structures generate.
    pub map_features: bool,
    /// World type id (0 default, 1 flat, 2 largeBiomes, 3 amplified,
    /// 8 default_1_1).
    pub world_type_id: i32,
    /// Generator options string for flat/custom worlds.
    pub generator_options: String,
    /// World name.
    pub world_name: String,
    /// Border center.
    pub border_center_x: f64,
    /// Border center.
    pub border_center_z: f64,
    /// Border diameter.
    pub border_size: f64,
    /// Size on disk, informational only.
    pub size_on_disk: i64,
    /// Wall-clock milliseconds of the last save.
    pub last_played: i64,
    /// Game rules.
    pub game_rules_snapshot: Vec<(String, String)>,
}

impl WorldInfo {
    /// Fresh metadata for a new world.
    #[must_use]
    pub fn new(seed: i64, world_name: &str) -> Self {
        Self {
            seed,
            spawn: BlockPos::new(0, 64, 0),
            total_time: 0,
            world_time: 0,
            raining: false,
            rain_time: 0,
            thundering: false,
            thunder_time: 0,
            game_type: 0,
            difficulty: 2,
            hardcore: false,
            commands_allowed: false,
            map_features: true,
            world_type_id: 0,
            generator_options: String::new(),
            world_name: world_name.to_owned(),
            border_center_x: 0.0,
            border_center_z: 0.0,
            border_size: DEFAULT_BORDER_SIZE,
            size_on_disk: 0,
            last_played: 0,
            game_rules_snapshot: Vec::new(),
        }
    }

    /// Serializes to the `level.dat` document, stamping `lastPlayed`.
    #[must_use]
    pub fn to_nbt(&self, game_rules: &GameRules) -> Vec<u8> {
        let mut data = NbtCompound::new();
        data.insert("RandomSeed", NbtTag::Long(self.seed));
        data.insert("SpawnX", NbtTag::Int(self.spawn.x));
        data.insert("SpawnY", NbtTag::Int(self.spawn.y));
        data.insert("SpawnZ", NbtTag::Int(self.spawn.z));
        data.insert("Time", NbtTag::Long(self.total_time));
        data.insert("DayTime", NbtTag::Long(self.world_time));
        data.insert("raining", NbtTag::Byte(i8::from(self.raining)));
        data.insert("rainTime", NbtTag::Int(self.rain_time));
        data.insert("thundering", NbtTag::Byte(i8::from(self.thundering)));
        data.insert("thunderTime", NbtTag::Int(self.thunder_time));
        data.insert("GameType", NbtTag::Int(self.game_type));
        data.insert("Difficulty", NbtTag::Byte(self.difficulty as i8));
        data.insert("hardcore", NbtTag::Byte(i8::from(self.hardcore)));
        data.insert(
            "allowCommands",
            NbtTag::Byte(i8::from(self.commands_allowed)),
        );
        data.insert("MapFeatures", NbtTag::Byte(i8::from(self.map_features)));
        data.insert("generatorVersion", NbtTag::Int(self.world_type_id));
        data.insert("generatorOptions", self.generator_options.as_str());
        data.insert("LevelName", self.world_name.as_str());
        data.insert("BorderCenterX", NbtTag::Double(self.border_center_x));
        data.insert("BorderCenterZ", NbtTag::Double(self.border_center_z));
        data.insert("BorderSize", NbtTag::Double(self.border_size));
        data.insert("SizeOnDisk", NbtTag::Long(self.size_on_disk));
        let last_played = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as i64);
        data.insert("LastPlayed", NbtTag::Long(last_played));

        let mut rules = NbtCompound::new();
        for (name, value) in game_rules.iter() {
            rules.insert(name, value);
        }
        data.insert("GameRules", NbtTag::Compound(rules));

        let mut root = NbtCompound::new();
        root.insert("Data", NbtTag::Compound(data));
        let mut out = Vec::new();
        BaseNbt::new("", root).write(&mut out);
        out
    }

    /// Parses a `level.dat` document.
    pub fn from_nbt(bytes: &[u8]) -> Result<Self, WorldInfoError> {
        let nbt = simdnbt::owned::read(&mut Cursor::new(bytes))
            .map_err(|e| WorldInfoError::Malformed(e.to_string()))?;
        let simdnbt::owned::Nbt::Some(root) = nbt else {
            return Err(WorldInfoError::NoData);
        };
        let data = root.compound("Data").ok_or(WorldInfoError::NoData)?;

        let mut info = Self::new(data.long("RandomSeed").unwrap_or(0), "world");
        info.spawn = BlockPos::new(
            data.int("SpawnX").unwrap_or(0),
            data.int("SpawnY").unwrap_or(64),
            data.int("SpawnZ").unwrap_or(0),
        );
        info.total_time = data.long("Time").unwrap_or(0);
        info.world_time = data.long("DayTime").unwrap_or(0);
        info.raining = data.byte("raining").unwrap_or(0) != 0;
        info.rain_time = data.int("rainTime").unwrap_or(0);
        info.thundering = data.byte("thundering").unwrap_or(0) != 0;
        info.thunder_time = data.int("thunderTime").unwrap_or(0);
        info.game_type = data.int("GameType").unwrap_or(-1);
        info.difficulty = i32::from(data.byte("Difficulty").unwrap_or(2));
        info.hardcore = data.byte("hardcore").unwrap_or(0) != 0;
        info.commands_allowed = data.byte("allowCommands").unwrap_or(0) != 0;
        info.map_features = data.byte("MapFeatures").unwrap_or(1) != 0;
        info.world_type_id = data.int("generatorVersion").unwrap_or(0);
        info.generator_options = data
            .string("generatorOptions")
            .map(|s| s.to_str().into_owned())
            .unwrap_or_default();
        info.world_name = data
            .string("LevelName")
            .map_or_else(|| String::from("world"), |s| s.to_str().into_owned());
        info.border_center_x = data.double("BorderCenterX").unwrap_or(0.0);
        info.border_center_z = data.double("BorderCenterZ").unwrap_or(0.0);
        info.border_size = data.double("BorderSize").unwrap_or(DEFAULT_BORDER_SIZE);
        info.size_on_disk = data.long("SizeOnDisk").unwrap_or(0);
        info.last_played = data.long("LastPlayed").unwrap_or(0);

        if let Some(rules) = data.compound("GameRules") {
            for (name, value) in rules.iter() {
                if let Some(value) = value.string() {
                    info.game_rules_snapshot
                        .push((name.to_str().into_owned(), value.to_str().into_owned()));
                }
            }
        }

        Ok(info)
    }

    /// Writes `level.dat` next to the region directory.
    pub fn save(&self, world_dir: &Path, game_rules: &GameRules) -> Result<(), WorldInfoError> {
        std::fs::create_dir_all(world_dir)?;
        let bytes = self.to_nbt(game_rules);
        let tmp = world_dir.join("level.dat.tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(tmp, world_dir.join("level.dat"))?;
        Ok(())
    }

    /// Loads `level.dat` if present.
    pub fn load(world_dir: &Path) -> Result<Option<Self>, WorldInfoError> {
        let path = world_dir.join("level.dat");
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(Self::from_nbt(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nbt_round_trip() {
        let mut info = WorldInfo::new(987_654_321, "testworld");
        info.spawn = BlockPos::new(100, 70, -200);
        info.world_time = 6000;
        info.total_time = 120_000;
        info.raining = true;
        info.rain_time = 400;
        info.game_type = 1;
        info.difficulty = 3;
        info.border_size = 1000.0;

        let mut rules = GameRules::new();
        rules.set("doFireTick", "false");

        let bytes = info.to_nbt(&rules);
        let loaded = WorldInfo::from_nbt(&bytes).unwrap();
        assert_eq!(loaded.seed, info.seed);
        assert_eq!(loaded.spawn, info.spawn);
        assert_eq!(loaded.world_time, 6000);
        assert_eq!(loaded.total_time, 120_000);
        assert!(loaded.raining);
        assert_eq!(loaded.rain_time, 400);
        assert_eq!(loaded.game_type, 1);
        assert_eq!(loaded.difficulty, 3);
        assert!((loaded.border_size - 1000.0).abs() < f64::EPSILON);
        assert_eq!(loaded.world_name, "testworld");
        assert!(loaded.last_played > 0);
        assert!(loaded
            .game_rules_snapshot
            .iter()
            .any(|(name, value)| name == "doFireTick" && value == "false"));
    }

    #[test]
    fn default_border_is_sixty_million() {
        let info = WorldInfo::new(0, "w");
        assert!((info.border_size - 6.0e7).abs() < f64::EPSILON);
    }
}
