//! The block table.
//!
//! Blocks are identified by an integer id in `[0, 4095]` plus a 4-bit
//! metadata nibble. The table is a const slice; the registry builds the
//! id and name indexes over it once at startup.

use basalt_utils::BlockId;
use rustc_hash::FxHashMap;

use crate::tile_entity_types::TileEntityKind;

/// A reference into the static block table.
pub type BlockRef = &'static Block;

/// Broad physical category of a block, mirroring the reference materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    /// No substance at all.
    Air,
    /// Stone-like solids.
    Rock,
    /// Dirt, sand, gravel and other diggables.
    Ground,
    /// Wooden solids.
    Wood,
    /// Flowing or still water.
    Water,
    /// Flowing or still lava.
    Lava,
    /// Leaf blocks.
    Leaves,
    /// Small plants, destroyed by pistons and fluids.
    Plants,
    /// Redstone components.
    Circuits,
    /// Glass and ice.
    Glass,
    /// Metal blocks.
    Iron,
    /// Wool and similar soft solids.
    Cloth,
    /// Snow layers.
    Snow,
    /// Cactus.
    Cactus,
    /// Nether portal blocks.
    Portal,
    /// Fire.
    Fire,
    /// Cobweb.
    Web,
    /// Cake and similar edibles.
    Cake,
    /// Moving piston stand-in.
    Piston,
}

impl Material {
    /// Whether entities collide with blocks of this material.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        !matches!(
            self,
            Material::Air
                | Material::Water
                | Material::Lava
                | Material::Plants
                | Material::Circuits
                | Material::Snow
                | Material::Portal
                | Material::Fire
                | Material::Web
        )
    }

    /// Whether this material is a liquid.
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Whether this material is a full solid for cave/ore carving purposes.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        self.blocks_movement() && !matches!(self, Material::Piston)
    }

    /// Whether placing a block may simply replace this material.
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        matches!(
            self,
            Material::Air | Material::Water | Material::Lava | Material::Snow | Material::Fire
        )
    }
}

/// What a piston may do with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PistonMobility {
    /// Pushed and pulled normally.
    Normal,
    /// Destroyed when pushed (plants, torches, snow layers).
    Destroy,
    /// Never moved.
    Immovable,
}

/// One entry of the block table.
#[derive(Debug)]
pub struct Block {
    /// Numeric block id.
    pub id: u16,
    /// Namespaced path, without the `minecraft:` prefix.
    pub name: &'static str,
    /// Physical material.
    pub material: Material,
    /// Dig hardness; `-1.0` marks unbreakable blocks.
    pub hardness: f32,
    /// Raw blast resistance. Explosions consume `resistance / 5`.
    pub resistance: f32,
    /// Light opacity in `0..=255`; 255 blocks light entirely.
    pub opacity: u8,
    /// Light emission in `0..=15`.
    pub emission: u8,
    /// Piston behavior.
    pub mobility: PistonMobility,
    /// Tile entity spawned by this block, if any.
    pub tile_entity: Option<TileEntityKind>,
    /// Scheduled-tick delay used by the block's update logic (0 = none).
    pub tick_rate: u32,
    /// Whether this block receives random ticks.
    pub random_ticks: bool,
}

impl Block {
    const fn new(id: u16, name: &'static str, material: Material) -> Self {
        Self {
            id,
            name,
            material,
            hardness: 0.0,
            resistance: 0.0,
            opacity: if material.blocks_movement() { 255 } else { 0 },
            emission: 0,
            mobility: PistonMobility::Normal,
            tile_entity: None,
            tick_rate: 0,
            random_ticks: false,
        }
    }

    const fn strength(mut self, hardness: f32, resistance: f32) -> Self {
        self.hardness = hardness;
        self.resistance = resistance;
        self
    }

    const fn unbreakable(mut self, resistance: f32) -> Self {
        self.hardness = -1.0;
        self.resistance = resistance;
        self
    }

    const fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    const fn emission(mut self, emission: u8) -> Self {
        self.emission = emission;
        self
    }

    const fn mobility(mut self, mobility: PistonMobility) -> Self {
        self.mobility = mobility;
        self
    }

    const fn tile(mut self, kind: TileEntityKind) -> Self {
        self.tile_entity = Some(kind);
        self
    }

    const fn ticks(mut self, rate: u32) -> Self {
        self.tick_rate = rate;
        self
    }

    const fn random_ticks(mut self) -> Self {
        self.random_ticks = true;
        self
    }

    /// The block id as the world's id type.
    #[must_use]
    pub const fn block_id(&self) -> BlockId {
        BlockId(self.id)
    }

    /// Resistance as consumed by the explosion ray march.
    #[must_use]
    pub fn explosion_resistance(&self) -> f32 {
        self.resistance / 5.0
    }

    /// Whether this block is a full opaque cube for light purposes.
    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.opacity >= 15
    }

    /// Whether entities collide with this block.
    #[must_use]
    pub const fn blocks_movement(&self) -> bool {
        self.material.blocks_movement()
    }
}

/// Well-known block ids used across the simulation core.
#[allow(missing_docs)]
pub mod vanilla {
    use basalt_utils::BlockId;

    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const GRASS: BlockId = BlockId(2);
    pub const DIRT: BlockId = BlockId(3);
    pub const COBBLESTONE: BlockId = BlockId(4);
    pub const PLANKS: BlockId = BlockId(5);
    pub const SAPLING: BlockId = BlockId(6);
    pub const BEDROCK: BlockId = BlockId(7);
    pub const FLOWING_WATER: BlockId = BlockId(8);
    pub const WATER: BlockId = BlockId(9);
    pub const FLOWING_LAVA: BlockId = BlockId(10);
    pub const LAVA: BlockId = BlockId(11);
    pub const SAND: BlockId = BlockId(12);
    pub const GRAVEL: BlockId = BlockId(13);
    pub const GOLD_ORE: BlockId = BlockId(14);
    pub const IRON_ORE: BlockId = BlockId(15);
    pub const COAL_ORE: BlockId = BlockId(16);
    pub const LOG: BlockId = BlockId(17);
    pub const LEAVES: BlockId = BlockId(18);
    pub const GLASS: BlockId = BlockId(20);
    pub const LAPIS_ORE: BlockId = BlockId(21);
    pub const DISPENSER: BlockId = BlockId(23);
    pub const SANDSTONE: BlockId = BlockId(24);
    pub const NOTEBLOCK: BlockId = BlockId(25);
    pub const STICKY_PISTON: BlockId = BlockId(29);
    pub const WEB: BlockId = BlockId(30);
    pub const TALLGRASS: BlockId = BlockId(31);
    pub const DEADBUSH: BlockId = BlockId(32);
    pub const PISTON: BlockId = BlockId(33);
    pub const PISTON_HEAD: BlockId = BlockId(34);
    pub const WOOL: BlockId = BlockId(35);
    pub const PISTON_EXTENSION: BlockId = BlockId(36);
    pub const YELLOW_FLOWER: BlockId = BlockId(37);
    pub const RED_FLOWER: BlockId = BlockId(38);
    pub const BROWN_MUSHROOM: BlockId = BlockId(39);
    pub const RED_MUSHROOM: BlockId = BlockId(40);
    pub const TNT: BlockId = BlockId(46);
    pub const MOSSY_COBBLESTONE: BlockId = BlockId(48);
    pub const OBSIDIAN: BlockId = BlockId(49);
    pub const TORCH: BlockId = BlockId(50);
    pub const FIRE: BlockId = BlockId(51);
    pub const MOB_SPAWNER: BlockId = BlockId(52);
    pub const CHEST: BlockId = BlockId(54);
    pub const REDSTONE_WIRE: BlockId = BlockId(55);
    pub const DIAMOND_ORE: BlockId = BlockId(56);
    pub const WHEAT: BlockId = BlockId(59);
    pub const FARMLAND: BlockId = BlockId(60);
    pub const FURNACE: BlockId = BlockId(61);
    pub const LIT_FURNACE: BlockId = BlockId(62);
    pub const STANDING_SIGN: BlockId = BlockId(63);
    pub const WOODEN_DOOR: BlockId = BlockId(64);
    pub const LADDER: BlockId = BlockId(65);
    pub const RAIL: BlockId = BlockId(66);
    pub const WALL_SIGN: BlockId = BlockId(68);
    pub const IRON_DOOR: BlockId = BlockId(71);
    pub const REDSTONE_ORE: BlockId = BlockId(73);
    pub const LIT_REDSTONE_ORE: BlockId = BlockId(74);
    pub const REDSTONE_TORCH: BlockId = BlockId(76);
    pub const SNOW_LAYER: BlockId = BlockId(78);
    pub const ICE: BlockId = BlockId(79);
    pub const SNOW: BlockId = BlockId(80);
    pub const CACTUS: BlockId = BlockId(81);
    pub const CLAY: BlockId = BlockId(82);
    pub const REEDS: BlockId = BlockId(83);
    pub const PUMPKIN: BlockId = BlockId(86);
    pub const NETHERRACK: BlockId = BlockId(87);
    pub const SOUL_SAND: BlockId = BlockId(88);
    pub const GLOWSTONE: BlockId = BlockId(89);
    pub const PORTAL: BlockId = BlockId(90);
    pub const LIT_PUMPKIN: BlockId = BlockId(91);
    pub const VINE: BlockId = BlockId(106);
    pub const MYCELIUM: BlockId = BlockId(110);
    pub const WATERLILY: BlockId = BlockId(111);
    pub const END_STONE: BlockId = BlockId(121);
    pub const COMMAND_BLOCK: BlockId = BlockId(137);
    pub const BEACON: BlockId = BlockId(138);
    pub const HOPPER: BlockId = BlockId(154);
    pub const DROPPER: BlockId = BlockId(158);
    pub const HARDENED_CLAY: BlockId = BlockId(172);
}

/// The static block table in id order.
static BLOCKS: &[Block] = &[
    Block::new(0, "air", Material::Air),
    Block::new(1, "stone", Material::Rock).strength(1.5, 30.0),
    Block::new(2, "grass", Material::Ground).strength(0.6, 3.0).random_ticks(),
    Block::new(3, "dirt", Material::Ground).strength(0.5, 2.5),
    Block::new(4, "cobblestone", Material::Rock).strength(2.0, 30.0),
    Block::new(5, "planks", Material::Wood).strength(2.0, 15.0),
    Block::new(6, "sapling", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(7, "bedrock", Material::Rock)
        .unbreakable(18_000_000.0)
        .mobility(PistonMobility::Immovable),
    Block::new(8, "flowing_water", Material::Water)
        .strength(100.0, 500.0)
        .opacity(3)
        .mobility(PistonMobility::Destroy)
        .ticks(5),
    Block::new(9, "water", Material::Water)
        .strength(100.0, 500.0)
        .opacity(3)
        .mobility(PistonMobility::Destroy)
        .ticks(5),
    Block::new(10, "flowing_lava", Material::Lava)
        .strength(100.0, 500.0)
        .emission(15)
        .mobility(PistonMobility::Destroy)
        .ticks(30)
        .random_ticks(),
    Block::new(11, "lava", Material::Lava)
        .strength(100.0, 500.0)
        .emission(15)
        .mobility(PistonMobility::Destroy)
        .ticks(30)
        .random_ticks(),
    Block::new(12, "sand", Material::Ground).strength(0.5, 2.5).ticks(2),
    Block::new(13, "gravel", Material::Ground).strength(0.6, 3.0).ticks(2),
    Block::new(14, "gold_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(15, "iron_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(16, "coal_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(17, "log", Material::Wood).strength(2.0, 10.0),
    Block::new(18, "leaves", Material::Leaves)
        .strength(0.2, 1.0)
        .opacity(1)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(19, "sponge", Material::Cloth).strength(0.6, 3.0),
    Block::new(20, "glass", Material::Glass).strength(0.3, 1.5).opacity(0),
    Block::new(21, "lapis_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(22, "lapis_block", Material::Rock).strength(3.0, 15.0),
    Block::new(23, "dispenser", Material::Rock)
        .strength(3.5, 17.5)
        .tile(TileEntityKind::Dispenser),
    Block::new(24, "sandstone", Material::Rock).strength(0.8, 4.0),
    Block::new(25, "noteblock", Material::Wood)
        .strength(0.8, 4.0)
        .tile(TileEntityKind::NoteBlock),
    Block::new(26, "bed", Material::Cloth).strength(0.2, 1.0).opacity(0),
    Block::new(27, "golden_rail", Material::Circuits)
        .strength(0.7, 3.5)
        .mobility(PistonMobility::Destroy),
    Block::new(28, "detector_rail", Material::Circuits)
        .strength(0.7, 3.5)
        .mobility(PistonMobility::Destroy),
    Block::new(29, "sticky_piston", Material::Piston).strength(0.5, 2.5).opacity(0),
    Block::new(30, "web", Material::Web)
        .strength(4.0, 20.0)
        .opacity(1)
        .mobility(PistonMobility::Destroy),
    Block::new(31, "tallgrass", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(32, "deadbush", Material::Plants).mobility(PistonMobility::Destroy),
    Block::new(33, "piston", Material::Piston).strength(0.5, 2.5).opacity(0),
    Block::new(34, "piston_head", Material::Piston)
        .strength(0.5, 2.5)
        .opacity(0)
        .mobility(PistonMobility::Immovable),
    Block::new(35, "wool", Material::Cloth).strength(0.8, 4.0),
    Block::new(36, "piston_extension", Material::Piston)
        .unbreakable(0.0)
        .opacity(0)
        .mobility(PistonMobility::Immovable)
        .tile(TileEntityKind::PistonMoving),
    Block::new(37, "yellow_flower", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(38, "red_flower", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(39, "brown_mushroom", Material::Plants)
        .emission(1)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(40, "red_mushroom", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(41, "gold_block", Material::Iron).strength(3.0, 30.0),
    Block::new(42, "iron_block", Material::Iron).strength(5.0, 30.0),
    Block::new(43, "double_stone_slab", Material::Rock).strength(2.0, 30.0),
    Block::new(44, "stone_slab", Material::Rock).strength(2.0, 30.0).opacity(0),
    Block::new(45, "brick_block", Material::Rock).strength(2.0, 30.0),
    Block::new(46, "tnt", Material::Cloth).strength(0.0, 0.0),
    Block::new(47, "bookshelf", Material::Wood).strength(1.5, 7.5),
    Block::new(48, "mossy_cobblestone", Material::Rock).strength(2.0, 30.0),
    Block::new(49, "obsidian", Material::Rock)
        .strength(50.0, 6000.0)
        .mobility(PistonMobility::Immovable),
    Block::new(50, "torch", Material::Circuits)
        .emission(14)
        .mobility(PistonMobility::Destroy)
        .ticks(10),
    Block::new(51, "fire", Material::Fire)
        .emission(15)
        .mobility(PistonMobility::Destroy)
        .ticks(30)
        .random_ticks(),
    Block::new(52, "mob_spawner", Material::Rock)
        .strength(5.0, 25.0)
        .opacity(0)
        .tile(TileEntityKind::MobSpawner),
    Block::new(53, "oak_stairs", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(54, "chest", Material::Wood)
        .strength(2.5, 12.5)
        .opacity(0)
        .tile(TileEntityKind::Chest),
    Block::new(55, "redstone_wire", Material::Circuits).mobility(PistonMobility::Destroy),
    Block::new(56, "diamond_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(57, "diamond_block", Material::Iron).strength(5.0, 30.0),
    Block::new(58, "crafting_table", Material::Wood).strength(2.5, 12.5),
    Block::new(59, "wheat", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(60, "farmland", Material::Ground)
        .strength(0.6, 3.0)
        .opacity(0)
        .random_ticks(),
    Block::new(61, "furnace", Material::Rock)
        .strength(3.5, 17.5)
        .tile(TileEntityKind::Furnace),
    Block::new(62, "lit_furnace", Material::Rock)
        .strength(3.5, 17.5)
        .emission(13)
        .tile(TileEntityKind::Furnace),
    Block::new(63, "standing_sign", Material::Wood)
        .strength(1.0, 5.0)
        .opacity(0)
        .tile(TileEntityKind::Sign),
    Block::new(64, "wooden_door", Material::Wood).strength(3.0, 15.0).opacity(0),
    Block::new(65, "ladder", Material::Circuits)
        .strength(0.4, 2.0)
        .mobility(PistonMobility::Destroy),
    Block::new(66, "rail", Material::Circuits)
        .strength(0.7, 3.5)
        .mobility(PistonMobility::Destroy),
    Block::new(67, "stone_stairs", Material::Rock).strength(2.0, 30.0).opacity(0),
    Block::new(68, "wall_sign", Material::Wood)
        .strength(1.0, 5.0)
        .opacity(0)
        .tile(TileEntityKind::Sign),
    Block::new(69, "lever", Material::Circuits)
        .strength(0.5, 2.5)
        .mobility(PistonMobility::Destroy),
    Block::new(70, "stone_pressure_plate", Material::Rock)
        .strength(0.5, 2.5)
        .opacity(0)
        .mobility(PistonMobility::Destroy),
    Block::new(71, "iron_door", Material::Iron).strength(5.0, 25.0).opacity(0),
    Block::new(72, "wooden_pressure_plate", Material::Wood)
        .strength(0.5, 2.5)
        .opacity(0)
        .mobility(PistonMobility::Destroy),
    Block::new(73, "redstone_ore", Material::Rock).strength(3.0, 15.0).random_ticks(),
    Block::new(74, "lit_redstone_ore", Material::Rock)
        .strength(3.0, 15.0)
        .emission(9)
        .random_ticks(),
    Block::new(75, "unlit_redstone_torch", Material::Circuits)
        .mobility(PistonMobility::Destroy)
        .ticks(2),
    Block::new(76, "redstone_torch", Material::Circuits)
        .emission(7)
        .mobility(PistonMobility::Destroy)
        .ticks(2),
    Block::new(77, "stone_button", Material::Circuits)
        .strength(0.5, 2.5)
        .mobility(PistonMobility::Destroy)
        .ticks(20),
    Block::new(78, "snow_layer", Material::Snow)
        .strength(0.1, 0.5)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(79, "ice", Material::Glass)
        .strength(0.5, 2.5)
        .opacity(3)
        .random_ticks(),
    Block::new(80, "snow", Material::Ground).strength(0.2, 1.0).random_ticks(),
    Block::new(81, "cactus", Material::Cactus)
        .strength(0.4, 2.0)
        .opacity(0)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(82, "clay", Material::Ground).strength(0.6, 3.0),
    Block::new(83, "reeds", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(84, "jukebox", Material::Wood)
        .strength(2.0, 30.0)
        .tile(TileEntityKind::Jukebox),
    Block::new(85, "fence", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(86, "pumpkin", Material::Wood).strength(1.0, 5.0),
    Block::new(87, "netherrack", Material::Rock).strength(0.4, 2.0),
    Block::new(88, "soul_sand", Material::Ground).strength(0.5, 2.5),
    Block::new(89, "glowstone", Material::Glass)
        .strength(0.3, 1.5)
        .opacity(0)
        .emission(15),
    Block::new(90, "portal", Material::Portal)
        .unbreakable(0.0)
        .emission(11)
        .mobility(PistonMobility::Immovable),
    Block::new(91, "lit_pumpkin", Material::Wood).strength(1.0, 5.0).emission(15),
    Block::new(92, "cake", Material::Cake)
        .strength(0.5, 2.5)
        .opacity(0)
        .mobility(PistonMobility::Destroy),
    Block::new(93, "unpowered_repeater", Material::Circuits)
        .mobility(PistonMobility::Destroy)
        .ticks(2),
    Block::new(94, "powered_repeater", Material::Circuits)
        .emission(9)
        .mobility(PistonMobility::Destroy)
        .ticks(2),
    Block::new(95, "stained_glass", Material::Glass).strength(0.3, 1.5).opacity(0),
    Block::new(96, "trapdoor", Material::Wood).strength(3.0, 15.0).opacity(0),
    Block::new(97, "monster_egg", Material::Rock).strength(0.75, 3.75),
    Block::new(98, "stonebrick", Material::Rock).strength(1.5, 30.0),
    Block::new(99, "brown_mushroom_block", Material::Wood).strength(0.2, 1.0),
    Block::new(100, "red_mushroom_block", Material::Wood).strength(0.2, 1.0),
    Block::new(101, "iron_bars", Material::Iron).strength(5.0, 30.0).opacity(0),
    Block::new(102, "glass_pane", Material::Glass).strength(0.3, 1.5).opacity(0),
    Block::new(103, "melon_block", Material::Wood).strength(1.0, 5.0),
    Block::new(104, "pumpkin_stem", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(105, "melon_stem", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(106, "vine", Material::Plants)
        .strength(0.2, 1.0)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(107, "fence_gate", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(108, "brick_stairs", Material::Rock).strength(2.0, 30.0).opacity(0),
    Block::new(109, "stone_brick_stairs", Material::Rock)
        .strength(1.5, 30.0)
        .opacity(0),
    Block::new(110, "mycelium", Material::Ground).strength(0.6, 3.0).random_ticks(),
    Block::new(111, "waterlily", Material::Plants).mobility(PistonMobility::Destroy),
    Block::new(112, "nether_brick", Material::Rock).strength(2.0, 30.0),
    Block::new(113, "nether_brick_fence", Material::Rock)
        .strength(2.0, 30.0)
        .opacity(0),
    Block::new(114, "nether_brick_stairs", Material::Rock)
        .strength(2.0, 30.0)
        .opacity(0),
    Block::new(115, "nether_wart", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(116, "enchanting_table", Material::Rock)
        .strength(5.0, 6000.0)
        .opacity(0)
        .tile(TileEntityKind::EnchantTable),
    Block::new(117, "brewing_stand", Material::Iron)
        .strength(0.5, 2.5)
        .opacity(0)
        .emission(1)
        .tile(TileEntityKind::BrewingStand),
    Block::new(118, "cauldron", Material::Iron).strength(2.0, 10.0).opacity(0),
    Block::new(119, "end_portal", Material::Portal)
        .unbreakable(18_000_000.0)
        .opacity(0)
        .emission(15)
        .mobility(PistonMobility::Immovable)
        .tile(TileEntityKind::EndPortal),
    Block::new(120, "end_portal_frame", Material::Rock)
        .unbreakable(18_000_000.0)
        .emission(1)
        .mobility(PistonMobility::Immovable),
    Block::new(121, "end_stone", Material::Rock).strength(3.0, 45.0),
    Block::new(122, "dragon_egg", Material::Rock)
        .strength(3.0, 45.0)
        .opacity(0)
        .emission(1)
        .mobility(PistonMobility::Destroy),
    Block::new(123, "redstone_lamp", Material::Glass).strength(0.3, 1.5),
    Block::new(124, "lit_redstone_lamp", Material::Glass)
        .strength(0.3, 1.5)
        .emission(15),
    Block::new(125, "double_wooden_slab", Material::Wood).strength(2.0, 15.0),
    Block::new(126, "wooden_slab", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(127, "cocoa", Material::Plants)
        .strength(0.2, 15.0)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(128, "sandstone_stairs", Material::Rock).strength(0.8, 4.0).opacity(0),
    Block::new(129, "emerald_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(130, "ender_chest", Material::Rock)
        .strength(22.5, 3000.0)
        .opacity(0)
        .emission(7)
        .tile(TileEntityKind::EnderChest),
    Block::new(131, "tripwire_hook", Material::Circuits).mobility(PistonMobility::Destroy),
    Block::new(132, "tripwire", Material::Circuits).mobility(PistonMobility::Destroy),
    Block::new(133, "emerald_block", Material::Iron).strength(5.0, 30.0),
    Block::new(134, "spruce_stairs", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(135, "birch_stairs", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(136, "jungle_stairs", Material::Wood).strength(2.0, 15.0).opacity(0),
    Block::new(137, "command_block", Material::Iron)
        .unbreakable(18_000_000.0)
        .mobility(PistonMobility::Immovable)
        .tile(TileEntityKind::CommandBlock),
    Block::new(138, "beacon", Material::Glass)
        .strength(3.0, 15.0)
        .opacity(0)
        .emission(15)
        .tile(TileEntityKind::Beacon),
    Block::new(139, "cobblestone_wall", Material::Rock).strength(2.0, 30.0).opacity(0),
    Block::new(140, "flower_pot", Material::Circuits)
        .mobility(PistonMobility::Destroy)
        .tile(TileEntityKind::FlowerPot),
    Block::new(141, "carrots", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(142, "potatoes", Material::Plants)
        .mobility(PistonMobility::Destroy)
        .random_ticks(),
    Block::new(143, "wooden_button", Material::Circuits)
        .strength(0.5, 2.5)
        .mobility(PistonMobility::Destroy)
        .ticks(30),
    Block::new(144, "skull", Material::Circuits)
        .strength(1.0, 5.0)
        .opacity(0)
        .tile(TileEntityKind::Skull),
    Block::new(145, "anvil", Material::Iron)
        .strength(5.0, 6000.0)
        .opacity(0)
        .ticks(2),
    Block::new(146, "trapped_chest", Material::Wood)
        .strength(2.5, 12.5)
        .opacity(0)
        .tile(TileEntityKind::Chest),
    Block::new(147, "light_weighted_pressure_plate", Material::Circuits)
        .strength(0.5, 2.5)
        .mobility(PistonMobility::Destroy),
    Block::new(148, "heavy_weighted_pressure_plate", Material::Circuits)
        .strength(0.5, 2.5)
        .mobility(PistonMobility::Destroy),
    Block::new(149, "unpowered_comparator", Material::Circuits)
        .mobility(PistonMobility::Destroy)
        .ticks(2)
        .tile(TileEntityKind::Comparator),
    Block::new(150, "powered_comparator", Material::Circuits)
        .mobility(PistonMobility::Destroy)
        .ticks(2)
        .tile(TileEntityKind::Comparator),
    Block::new(151, "daylight_detector", Material::Wood)
        .strength(0.2, 1.0)
        .opacity(0)
        .tile(TileEntityKind::DaylightDetector),
    Block::new(152, "redstone_block", Material::Iron).strength(5.0, 30.0),
    Block::new(153, "quartz_ore", Material::Rock).strength(3.0, 15.0),
    Block::new(154, "hopper", Material::Iron)
        .strength(3.0, 24.0)
        .opacity(0)
        .tile(TileEntityKind::Hopper),
    Block::new(155, "quartz_block", Material::Rock).strength(0.8, 4.0),
    Block::new(156, "quartz_stairs", Material::Rock).strength(0.8, 4.0).opacity(0),
    Block::new(157, "activator_rail", Material::Circuits)
        .strength(0.7, 3.5)
        .mobility(PistonMobility::Destroy),
    Block::new(158, "dropper", Material::Rock)
        .strength(3.5, 17.5)
        .tile(TileEntityKind::Dropper),
    Block::new(159, "stained_hardened_clay", Material::Rock).strength(1.25, 21.0),
    Block::new(170, "hay_block", Material::Wood).strength(0.5, 2.5),
    Block::new(171, "carpet", Material::Cloth)
        .strength(0.1, 0.5)
        .opacity(0)
        .mobility(PistonMobility::Destroy),
    Block::new(172, "hardened_clay", Material::Rock).strength(1.25, 21.0),
    Block::new(173, "coal_block", Material::Rock).strength(5.0, 30.0),
    Block::new(174, "packed_ice", Material::Glass).strength(0.5, 2.5),
    Block::new(175, "double_plant", Material::Plants).mobility(PistonMobility::Destroy),
];

/// Lookup structure over the static block table.
pub struct BlockRegistry {
    by_id: Vec<Option<BlockRef>>,
    by_name: FxHashMap<&'static str, BlockRef>,
}

impl BlockRegistry {
    /// Builds the vanilla registry indexes.
    #[must_use]
    pub fn vanilla() -> Self {
        let max_id = BLOCKS.iter().map(|b| b.id as usize).max().unwrap_or(0);
        let mut by_id: Vec<Option<BlockRef>> = vec![None; max_id + 1];
        let mut by_name = FxHashMap::default();
        for block in BLOCKS {
            by_id[block.id as usize] = Some(block);
            by_name.insert(block.name, block);
        }
        Self { by_id, by_name }
    }

    /// Number of registered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        BLOCKS.len()
    }

    /// Whether the table is empty (never, for the vanilla set).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        BLOCKS.is_empty()
    }

    /// Looks a block up by id; unregistered ids return `None`.
    #[must_use]
    pub fn by_id(&self, id: BlockId) -> Option<BlockRef> {
        self.by_id.get(id.0 as usize).copied().flatten()
    }

    /// Looks a block up by id, falling back to air for unregistered ids.
    #[must_use]
    pub fn by_id_or_air(&self, id: BlockId) -> BlockRef {
        self.by_id(id).unwrap_or(&BLOCKS[0])
    }

    /// Looks a block up by name, with or without the `minecraft:` prefix.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<BlockRef> {
        let path = name.strip_prefix("minecraft:").unwrap_or(name);
        self.by_name.get(path).copied()
    }

    /// Iterates all registered blocks in id order.
    pub fn iter(&self) -> impl Iterator<Item = BlockRef> {
        BLOCKS.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_sorted() {
        for window in BLOCKS.windows(2) {
            assert!(window[0].id < window[1].id, "table out of order at {}", window[1].id);
        }
    }

    #[test]
    fn air_invariants() {
        let air = &BLOCKS[0];
        assert_eq!(air.emission, 0);
        assert!(air.tile_entity.is_none());
        assert_eq!(air.opacity, 0);
    }

    #[test]
    fn name_lookup_accepts_namespace() {
        let registry = BlockRegistry::vanilla();
        let stone = registry.by_name("minecraft:stone").unwrap();
        assert_eq!(stone.id, 1);
        assert_eq!(registry.by_name("stone").unwrap().id, 1);
        assert!(registry.by_name("minecraft:unobtainium").is_none());
    }

    #[test]
    fn fluid_tick_rates() {
        let registry = BlockRegistry::vanilla();
        assert_eq!(registry.by_id(vanilla::WATER).unwrap().tick_rate, 5);
        assert_eq!(registry.by_id(vanilla::LAVA).unwrap().tick_rate, 30);
    }

    #[test]
    fn emission_values() {
        let registry = BlockRegistry::vanilla();
        assert_eq!(registry.by_id(vanilla::TORCH).unwrap().emission, 14);
        assert_eq!(registry.by_id(vanilla::GLOWSTONE).unwrap().emission, 15);
        assert_eq!(registry.by_id(vanilla::REDSTONE_TORCH).unwrap().emission, 7);
        assert_eq!(registry.by_id(vanilla::PORTAL).unwrap().emission, 11);
    }

    #[test]
    fn unregistered_id_falls_back_to_air() {
        let registry = BlockRegistry::vanilla();
        assert_eq!(registry.by_id_or_air(BlockId(4000)).id, 0);
        assert!(registry.by_id(BlockId(160)).is_none());
    }
}
