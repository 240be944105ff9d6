//! `server.properties` parsing.

use std::path::Path;

/// The recognized server options with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// World directory / level name.
    pub level_name: String,
    /// Seed string; empty picks a random seed.
    pub level_seed: String,
    /// World preset: `default|flat|largeBiomes|amplified|default_1_1`.
    pub level_type: String,
    /// Extra generator settings (flat layer spec).
    pub generator_settings: String,
    /// Difficulty 0–3.
    pub difficulty: i32,
    /// Default game mode 0–3.
    pub gamemode: i32,
    /// Hardcore flag.
    pub hardcore: bool,
    /// Player-versus-player damage.
    pub pvp: bool,
    /// View distance in chunks, at least 3.
    pub view_distance: i32,
    /// Player cap.
    pub max_players: i32,
    /// Authenticate against the session service.
    pub online_mode: bool,
    /// Blocks around spawn protected from non-ops.
    pub spawn_protection: i32,
    /// Whether the nether dimension runs.
    pub allow_nether: bool,
    /// Whether the end dimension runs.
    pub allow_end: bool,
    /// Whether command blocks execute.
    pub enable_command_block: bool,
    /// Permission level granted to ops (1–4).
    pub op_permission_level: i32,
    /// Permission level for functions (1–4).
    pub function_permission_level: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            level_name: String::from("world"),
            level_seed: String::new(),
            level_type: String::from("default"),
            generator_settings: String::new(),
            difficulty: 1,
            gamemode: 0,
            hardcore: false,
            pvp: true,
            view_distance: 10,
            max_players: 20,
            online_mode: true,
            spawn_protection: 16,
            allow_nether: true,
            allow_end: true,
            enable_command_block: false,
            op_permission_level: 4,
            function_permission_level: 2,
        }
    }
}

impl ServerConfig {
    /// Parses a properties document, falling back to defaults for absent
    /// or malformed entries.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "level-name" => config.level_name = value.to_owned(),
                "level-seed" => config.level_seed = value.to_owned(),
                "level-type" => {
                    if matches!(
                        value,
                        "default" | "flat" | "largeBiomes" | "amplified" | "default_1_1"
                    ) {
                        config.level_type = value.to_owned();
                    }
                }
                "generator-settings" => config.generator_settings = value.to_owned(),
                "difficulty" => parse_clamped(value, 0, 3, &mut config.difficulty),
                "gamemode" => parse_clamped(value, 0, 3, &mut config.gamemode),
                "hardcore" => config.hardcore = value == "true",
                "pvp" => config.pvp = value == "true",
                "view-distance" => parse_clamped(value, 3, 32, &mut config.view_distance),
                "max-players" => parse_clamped(value, 1, i32::MAX, &mut config.max_players),
                "online-mode" => config.online_mode = value == "true",
                "spawn-protection" => {
                    parse_clamped(value, 0, i32::MAX, &mut config.spawn_protection);
                }
                "allow-nether" => config.allow_nether = value == "true",
                "allow-end" => config.allow_end = value == "true",
                "enable-command-block" => config.enable_command_block = value == "true",
                "op-permission-level" => {
                    parse_clamped(value, 1, 4, &mut config.op_permission_level);
                }
                "function-permission-level" => {
                    parse_clamped(value, 1, 4, &mut config.function_permission_level);
                }
                _ => log::debug!("ignoring unknown property {key}"),
            }
        }
        config
    }

    /// Loads `server.properties`, returning defaults when absent.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => Self::default(),
        }
    }

    /// Resolves the numeric world seed: a numeric string parses directly,
    /// anything else hashes Java-style, empty draws from the clock.
    #[must_use]
    pub fn numeric_seed(&self) -> i64 {
        let trimmed = self.level_seed.trim();
        if trimmed.is_empty() {
            return std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as i64);
        }
        if let Ok(seed) = trimmed.parse::<i64>() {
            return seed;
        }
        // Java String.hashCode over UTF-16 units.
        let mut hash = 0i32;
        for unit in trimmed.encode_utf16() {
            hash = hash.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
        i64::from(hash)
    }
}

fn parse_clamped(value: &str, min: i32, max: i32, out: &mut i32) {
    if let Ok(parsed) = value.parse::<i32>() {
        *out = parsed.clamp(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let config = ServerConfig::parse(
            "level-name=myworld\nlevel-seed=1234\nlevel-type=amplified\n\
             difficulty=3\nview-distance=2\nmax-players=50\npvp=false\n\
             # a comment\nop-permission-level=3\n",
        );
        assert_eq!(config.level_name, "myworld");
        assert_eq!(config.level_type, "amplified");
        assert_eq!(config.difficulty, 3);
        // Below the floor of 3 clamps up.
        assert_eq!(config.view_distance, 3);
        assert_eq!(config.max_players, 50);
        assert!(!config.pvp);
        assert_eq!(config.op_permission_level, 3);
    }

    #[test]
    fn bad_level_type_keeps_default() {
        let config = ServerConfig::parse("level-type=skyblock\n");
        assert_eq!(config.level_type, "default");
    }

    #[test]
    fn numeric_and_string_seeds() {
        let mut config = ServerConfig::default();
        config.level_seed = String::from("1234");
        assert_eq!(config.numeric_seed(), 1234);

        config.level_seed = String::from("glacier");
        // Java hashCode("glacier")
        let mut expected = 0i32;
        for unit in "glacier".encode_utf16() {
            expected = expected.wrapping_mul(31).wrapping_add(i32::from(unit));
        }
        assert_eq!(config.numeric_seed(), i64::from(expected));
    }
}
