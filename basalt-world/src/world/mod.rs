//! The world: tick pipeline, block access with light maintenance, weather,
//! explosions and entity damage.

pub mod game_rules;
pub mod info;
pub mod scoreboard;
pub mod weather;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use basalt_gen::ChunkGenerator;
use basalt_registry::{DamageSource, REGISTRY};
use basalt_registry::blocks::vanilla;
use basalt_utils::locks::{SyncMutex, SyncRwLock};
use basalt_utils::{Aabb, BlockId, BlockPos, Direction, JavaRandom};

use crate::behavior::BehaviorRegistry;
use crate::chunk::provider::{ChunkProvider, SharedColumn};
use crate::chunk::region::RegionStore;
use crate::entity::{EntityArena, EntityKind, LightningBolt};
use crate::explosion::{EntityHit, Explosion, ExplosionEntity, ExplosionWorld};
use crate::light::{LightAccess, LightEngine, LightKind, skylight_subtracted};
use crate::tick::{BlockEvent, BlockEventQueue, RandomTickLcg, TickScheduler};
use crate::world::game_rules::GameRules;
use crate::world::info::WorldInfo;
use crate::world::scoreboard::Scoreboard;
use crate::world::weather::Weather;

/// Random ticks per active section per world tick.
const RANDOM_TICK_SPEED: u32 = 3;
/// Ticks between incremental save sweeps.
const AUTO_SAVE_INTERVAL: i64 = 900;
/// Per-chunk lightning odds denominator during a thunderstorm.
const LIGHTNING_ODDS: i32 = 100_000;

/// The dimension a world simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// The overworld: sky light, weather.
    Overworld,
    /// The nether: no sky, fast lava.
    Nether,
    /// The end: sky-less in lighting terms, no weather.
    End,
}

impl Dimension {
    /// Whether this dimension stores sky light.
    #[must_use]
    pub const fn has_sky(self) -> bool {
        matches!(self, Dimension::Overworld)
    }

    /// Whether lava uses the nether's fast flow.
    #[must_use]
    pub const fn is_nether(self) -> bool {
        matches!(self, Dimension::Nether)
    }
}

/// A world.
pub struct World {
    /// The dimension being simulated.
    pub dimension: Dimension,
    /// The chunk cache and persistence front end.
    pub provider: ChunkProvider,
    /// Persistent world metadata. Lock level L22.
    pub info: SyncRwLock<WorldInfo>,
    /// Game rules. Lock level L21.
    pub game_rules: SyncRwLock<GameRules>,
    /// The scoreboard. Lock level L20.
    pub scoreboard: SyncRwLock<Scoreboard>,
    /// Entities.
    pub entities: SyncRwLock<EntityArena>,
    scheduler: SyncMutex<TickScheduler>,
    block_events: SyncMutex<BlockEventQueue>,
    light: SyncMutex<LightEngine>,
    light_queue: SyncMutex<Vec<BlockPos>>,
    weather: SyncMutex<Weather>,
    rand: SyncMutex<JavaRandom>,
    random_tick: SyncMutex<RandomTickLcg>,
    behaviors: BehaviorRegistry,
    world_dir: Option<PathBuf>,
}

impl World {
    /// Creates a world over a generator. `world_dir` enables persistence;
    /// `io_workers` > 0 moves chunk I/O off the calling thread.
    pub fn new(
        dimension: Dimension,
        seed: i64,
        generator: Arc<dyn ChunkGenerator>,
        world_dir: Option<PathBuf>,
        io_workers: usize,
    ) -> std::io::Result<Self> {
        let storage = match &world_dir {
            Some(dir) => Some(Arc::new(RegionStore::new(dir.join("region"))?)),
            None => None,
        };

        let info = match &world_dir {
            Some(dir) => WorldInfo::load(dir)
                .ok()
                .flatten()
                .unwrap_or_else(|| WorldInfo::new(seed, "world")),
            None => WorldInfo::new(seed, "world"),
        };

        let mut game_rules = GameRules::new();
        for (name, value) in &info.game_rules_snapshot {
            game_rules.set(name, value);
        }

        let provider = ChunkProvider::new(
            generator,
            storage,
            dimension.has_sky(),
            io_workers,
            Duration::from_millis(50),
        );
        provider.set_spawn(info.spawn.x, info.spawn.z, dimension == Dimension::Overworld);

        let weather = Weather::from_info(&info);

        Ok(Self {
            dimension,
            provider,
            info: SyncRwLock::new(info),
            game_rules: SyncRwLock::new(game_rules),
            scoreboard: SyncRwLock::new(Scoreboard::new()),
            entities: SyncRwLock::new(EntityArena::new()),
            scheduler: SyncMutex::new(TickScheduler::new()),
            block_events: SyncMutex::new(BlockEventQueue::new()),
            light: SyncMutex::new(LightEngine::new()),
            light_queue: SyncMutex::new(Vec::new()),
            weather: SyncMutex::new(weather),
            rand: SyncMutex::new(JavaRandom::new(seed)),
            random_tick: SyncMutex::new(RandomTickLcg::new(seed as i32)),
            behaviors: BehaviorRegistry::new(),
            world_dir,
        })
    }

    // ─── Time ───

    /// Current time-of-day tick.
    #[must_use]
    pub fn world_time(&self) -> i64 {
        self.info.read().world_time
    }

    /// Total ticks simulated.
    #[must_use]
    pub fn total_time(&self) -> i64 {
        self.info.read().total_time
    }

    /// Celestial angle in `[0, 1)`, 0 at noon.
    #[must_use]
    pub fn celestial_angle(&self) -> f32 {
        let day_time = (self.world_time() % 24_000) as f32;
        let mut f = day_time / 24_000.0 - 0.25;
        if f < 0.0 {
            f += 1.0;
        }
        let eased = 1.0 - ((f * std::f32::consts::PI).cos() + 1.0) / 2.0;
        f + (eased - f) / 3.0
    }

    /// Sky dimming applied at read time from the time of day.
    #[must_use]
    pub fn skylight_subtracted(&self) -> i32 {
        if self.dimension.has_sky() {
            skylight_subtracted(self.celestial_angle())
        } else {
            0
        }
    }

    // ─── Block access ───

    fn column_for(&self, pos: BlockPos) -> Option<SharedColumn> {
        self.provider.get_chunk_if_loaded(pos.x >> 4, pos.z >> 4)
    }

    /// Block id at a position; air outside loaded chunks.
    #[must_use]
    pub fn block(&self, pos: BlockPos) -> BlockId {
        if !(0..256).contains(&pos.y) {
            return BlockId::AIR;
        }
        self.column_for(pos).map_or(BlockId::AIR, |column| {
            let (x, z) = pos.local();
            column.read().block(x, pos.y as usize, z)
        })
    }

    /// Metadata at a position.
    #[must_use]
    pub fn metadata(&self, pos: BlockPos) -> u8 {
        if !(0..256).contains(&pos.y) {
            return 0;
        }
        self.column_for(pos).map_or(0, |column| {
            let (x, z) = pos.local();
            column.read().metadata(x, pos.y as usize, z)
        })
    }

    /// Writes a block with metadata, maintaining the height map, queueing
    /// the light update and notifying neighbors.
    pub fn set_block(&self, pos: BlockPos, id: BlockId, meta: u8) {
        if !(0..256).contains(&pos.y) {
            return;
        }
        let Some(column) = self.column_for(pos) else {
            return;
        };
        let (old, old_meta) = {
            let mut column = column.write();
            let (x, z) = pos.local();
            let old_meta = column.metadata(x, pos.y as usize, z);
            let old = column.set_block(x, pos.y as usize, z, id);
            column.set_metadata(x, pos.y as usize, z, meta);
            (old, old_meta)
        };
        if old == id && old_meta == meta {
            return;
        }
        if old != id {
            self.light_queue.lock().push(pos);
        }
        self.notify_neighbors(pos, id);
    }

    /// Writes metadata only.
    pub fn set_metadata(&self, pos: BlockPos, meta: u8) {
        if let Some(column) = self.column_for(pos) {
            let (x, z) = pos.local();
            column.write().set_metadata(x, pos.y as usize, z, meta);
        }
    }

    /// Whether the position sees the sky.
    #[must_use]
    pub fn can_see_sky(&self, pos: BlockPos) -> bool {
        self.dimension.has_sky()
            && self.column_for(pos).is_some_and(|column| {
                let (x, z) = pos.local();
                column.read().can_see_sky(x, pos.y, z)
            })
    }

    /// Stored light of one channel.
    #[must_use]
    pub fn light(&self, kind: LightKind, pos: BlockPos) -> u8 {
        self.column_for(pos)
            .map_or(kind.default_level(self.dimension.has_sky()), |column| {
                let (x, z) = pos.local();
                if (0..256).contains(&pos.y) {
                    column.read().light(kind, x, pos.y as usize, z)
                } else {
                    kind.default_level(self.dimension.has_sky())
                }
            })
    }

    /// The light a player sees: sky minus the time-of-day subtraction,
    /// maxed with block light.
    #[must_use]
    pub fn effective_light(&self, pos: BlockPos) -> u8 {
        let sky = i32::from(self.light(LightKind::Sky, pos)) - self.skylight_subtracted();
        let block = i32::from(self.light(LightKind::Block, pos));
        sky.max(block).clamp(0, 15) as u8
    }

    fn notify_neighbors(&self, pos: BlockPos, source: BlockId) {
        for dir in Direction::ALL {
            let neighbor = pos.relative(dir);
            let neighbor_id = self.block(neighbor);
            self.behaviors
                .for_block(neighbor_id)
                .on_neighbor_changed(self, neighbor, neighbor_id, source);
        }
    }

    // ─── Scheduling ───

    /// Schedules a block update after `delay` ticks.
    pub fn schedule_block_update(&self, pos: BlockPos, id: BlockId, delay: i64) {
        self.schedule_block_update_with_priority(pos, id, delay, 0);
    }

    /// Schedules a block update with a priority.
    pub fn schedule_block_update_with_priority(
        &self,
        pos: BlockPos,
        id: BlockId,
        delay: i64,
        priority: i32,
    ) {
        let time = self.world_time();
        self.scheduler
            .lock()
            .schedule_with_priority(pos, id, delay, priority, time);
    }

    /// Whether an update is pending for `(pos, id)`.
    #[must_use]
    pub fn is_update_scheduled(&self, pos: BlockPos, id: BlockId) -> bool {
        let scheduler = self.scheduler.lock();
        scheduler.is_scheduled(pos, id) || scheduler.is_scheduled_this_tick(pos, id)
    }

    /// Queues a block event.
    pub fn add_block_event(&self, pos: BlockPos, id: BlockId, event_id: i32, event_param: i32) {
        self.block_events.lock().add_event(BlockEvent {
            pos,
            block_id: id,
            event_id,
            event_param,
        });
    }

    /// A uniform roll from the world RNG, for block behaviors.
    #[must_use]
    pub fn roll(&self, bound: i32) -> i32 {
        self.rand.lock().next_i32_bounded(bound)
    }

    // ─── The tick pipeline ───

    /// Runs one world tick: weather → entity removal → scheduled ticks →
    /// block events → entity updates → random ticks → light catch-up →
    /// save sweep.
    pub fn tick(&self) {
        // Drain the async mailbox first so this tick sees every arrival.
        self.provider.pump_io();
        {
            let restored = self.provider.take_restored_ticks();
            if !restored.is_empty() {
                let time = self.world_time();
                self.scheduler.lock().restore(&restored, time);
            }
        }
        for spawn in self.provider.take_pending_spawns() {
            self.entities.write().spawn(
                EntityKind::Living {
                    type_name: spawn.name,
                },
                spawn.x,
                spawn.y,
                spawn.z,
            );
        }

        self.tick_weather();
        self.entities.write().sweep_dead();
        self.run_scheduled_ticks();
        self.run_block_events();
        self.tick_entities();
        self.run_random_ticks();
        self.light_catch_up();
        self.save_sweep();

        let mut info = self.info.write();
        info.total_time += 1;
        drop(info);
        if self.game_rules.read().get_bool("doDaylightCycle") {
            self.info.write().world_time += 1;
        }
    }

    fn tick_weather(&self) {
        if self.dimension != Dimension::Overworld {
            return;
        }
        let mut weather = self.weather.lock();
        let mut info = self.info.write();
        let mut rand = self.rand.lock();
        weather.update(&mut info, &mut rand);
        let thundering = weather.is_thundering();
        drop(info);
        drop(rand);
        drop(weather);

        if !thundering {
            return;
        }
        // One lightning roll per loaded chunk.
        let mut strikes = Vec::new();
        {
            let mut lcg = self.random_tick.lock();
            let mut rand = self.rand.lock();
            self.provider.for_each_loaded_chunk(|column| {
                if column.is_proxy {
                    return;
                }
                if rand.next_i32_bounded(LIGHTNING_ODDS) == 0 {
                    let (x, z) = lcg.chunk_pos(
                        column.pos.min_block_x(),
                        column.pos.min_block_z(),
                    );
                    let (lx, lz) = ((x & 15) as usize, (z & 15) as usize);
                    let y = column.height(lx, lz);
                    strikes.push((x, y, z));
                }
            });
        }
        for (x, y, z) in strikes {
            let bolt = LightningBolt::new(&mut self.rand.lock());
            self.entities.write().spawn(
                EntityKind::Lightning(bolt),
                f64::from(x) + 0.5,
                f64::from(y),
                f64::from(z) + 0.5,
            );
        }
    }

    fn run_scheduled_ticks(&self) {
        let time = self.world_time();
        let snapshot = self.scheduler.lock().process_ticks(time, false);
        for tick in &snapshot {
            let current = self.block(tick.pos);
            // A replaced block supersedes its prior schedules.
            if current != tick.block_id {
                continue;
            }
            self.behaviors
                .for_block(current)
                .on_scheduled_tick(self, tick.pos, current);
        }
        self.scheduler.lock().finish_tick();
    }

    fn run_block_events(&self) {
        // Swap the queue out so handlers can enqueue follow-ups.
        loop {
            let mut queue = self.block_events.lock();
            if queue.pending() == 0 {
                break;
            }
            let mut taken = std::mem::take(&mut *queue);
            drop(queue);
            let _client_events = taken.process_events(|event| {
                if self.block(event.pos) != event.block_id {
                    return false;
                }
                self.behaviors
                    .for_block(event.block_id)
                    .on_block_event(self, event)
            });
        }
    }

    fn tick_entities(&self) {
        let mut completed_bolts = Vec::new();
        {
            let mut entities = self.entities.write();
            let mut rand = self.rand.lock();
            for entity in entities.iter_mut() {
                entity.ticks_existed += 1;
                if entity.fire_ticks > 0 {
                    entity.fire_ticks -= 1;
                }
                if entity.portal_cooldown > 0 {
                    entity.portal_cooldown -= 1;
                }

                match &mut entity.kind {
                    EntityKind::Lightning(bolt) => {
                        let result = bolt.tick(&mut rand);
                        if result.dead {
                            entity.dead = true;
                        }
                        if result.reignite {
                            completed_bolts.push(BlockPos::new(
                                basalt_utils::math::floor_f64(entity.x),
                                basalt_utils::math::floor_f64(entity.y),
                                basalt_utils::math::floor_f64(entity.z),
                            ));
                        }
                    }
                    kind if kind.is_living() => {
                        let ticks = entity.ticks_existed;
                        entity.combat.check_combat_end(ticks, entity.health > 0.0);
                        let _ = entity.effects.tick(&mut entity.attributes);
                    }
                    _ => {}
                }
            }
        }
        // Re-ignition places fire under the game rule.
        if self.game_rules.read().get_bool("doFireTick") {
            for pos in completed_bolts {
                if self.block(pos).is_air() && !self.block(pos.down()).is_air() {
                    self.set_block(pos, vanilla::FIRE, 0);
                }
            }
        }
    }

    fn run_random_ticks(&self) {
        let mut targets = Vec::new();
        {
            let mut lcg = self.random_tick.lock();
            self.provider.for_each_loaded_chunk(|column| {
                if column.is_proxy {
                    return;
                }
                let base_x = column.pos.min_block_x();
                let base_z = column.pos.min_block_z();
                for section in column.sections().iter().flatten() {
                    if section.tickable_count() == 0 {
                        continue;
                    }
                    for _ in 0..RANDOM_TICK_SPEED {
                        let (x, y, z) = lcg.section_pos();
                        let id = section.block(x, y, z);
                        if !id.is_air() && REGISTRY.blocks.by_id_or_air(id).random_ticks {
                            targets.push((
                                BlockPos::new(
                                    base_x + x as i32,
                                    section.y_base() + y as i32,
                                    base_z + z as i32,
                                ),
                                id,
                            ));
                        }
                    }
                }
            });
        }
        for (pos, id) in targets {
            self.behaviors
                .for_block(id)
                .on_random_tick(self, pos, id);
        }
    }

    fn light_catch_up(&self) {
        let queue = std::mem::take(&mut *self.light_queue.lock());
        if queue.is_empty() {
            return;
        }
        let mut engine = self.light.lock();
        let mut access = WorldLightAccess { world: self };
        for pos in queue {
            if self.dimension.has_sky() {
                engine.update_light(&mut access, LightKind::Sky, pos);
            }
            engine.update_light(&mut access, LightKind::Block, pos);
        }
    }

    fn save_sweep(&self) {
        let time = self.total_time();
        self.provider.unload_queued_chunks(time, &mut |pos| {
            self.scheduler.lock().drain_chunk_for_save(pos, time)
        });
        if time > 0 && time % AUTO_SAVE_INTERVAL == 0 {
            self.save(false);
        }
    }

    /// Saves dirty chunks and, with `save_all`, the level metadata too.
    pub fn save(&self, save_all: bool) -> bool {
        let time = self.total_time();
        let all_saved = self.provider.save_chunks(save_all, time, &mut |pos| {
            self.scheduler.lock().snapshot_chunk_for_save(pos, time)
        });
        if save_all && let Some(dir) = &self.world_dir {
            let info = self.info.read();
            let rules = self.game_rules.read();
            if let Err(e) = info.save(dir, &rules) {
                log::error!("failed to save level.dat: {e}");
            }
        }
        all_saved
    }

    // ─── Combat and explosions ───

    /// Applies damage to a living entity, recording it for the combat
    /// tracker. NaN or negative inputs are clamped and logged.
    pub fn damage_entity(&self, entity_id: i32, source: &DamageSource, mut amount: f32) {
        if !amount.is_finite() || amount < 0.0 {
            log::warn!("clamping bad damage amount {amount} on entity {entity_id}");
            amount = 0.0;
        }
        let attacker_info = source.attacker().and_then(|attacker_id| {
            let entities = self.entities.read();
            entities
                .get(attacker_id)
                .map(|attacker| (attacker.display_name(), attacker.kind.is_player()))
        });

        let mut entities = self.entities.write();
        let Some(entity) = entities.get_mut(entity_id) else {
            return;
        };
        if !entity.kind.is_living() {
            return;
        }
        let (attacker_name, attacker_is_player) =
            attacker_info.unwrap_or((String::new(), false));

        entity.combat.update_location_context(
            entity.on_ladder,
            entity.on_vines,
            entity.in_water,
        );
        let health_before = entity.health;
        entity.combat.record_damage(
            source,
            entity.ticks_existed,
            health_before,
            amount,
            entity.fall_distance,
            &attacker_name,
            attacker_is_player,
        );
        entity.health = (entity.health - amount).max(0.0);
        if entity.health <= 0.0 {
            entity.dead = true;
        }
    }

    /// Detonates an explosion, applying destruction, fire and entity
    /// damage. Returns the resolved explosion for observers.
    pub fn explode(
        &self,
        x: f64,
        y: f64,
        z: f64,
        size: f32,
        is_flaming: bool,
        is_smoking: bool,
    ) -> Explosion {
        let mut explosion = Explosion::new(x, y, z, size, is_flaming, is_smoking);
        let view = WorldExplosionView { world: self };
        {
            let mut rand = self.rand.lock();
            explosion.calculate(&view, &mut rand);
        }

        let result = {
            let mut rand = self.rand.lock();
            explosion.resolve_destruction(&view, &mut rand)
        };
        for pos in &result.destroyed {
            self.set_block(*pos, BlockId::AIR, 0);
        }
        for pos in &result.fire {
            self.set_block(*pos, vanilla::FIRE, 0);
        }

        let hits: Vec<EntityHit> = explosion.entity_hits.clone();
        let source = DamageSource::explosion(None);
        for hit in hits {
            self.damage_entity(hit.id, &source, hit.damage);
            let mut entities = self.entities.write();
            if let Some(entity) = entities.get_mut(hit.id) {
                entity.motion_x += hit.knockback.0;
                entity.motion_y += hit.knockback.1;
                entity.motion_z += hit.knockback.2;
            }
        }

        explosion
    }

    /// Fraction of sample rays from the explosion origin to points of the
    /// box that reach them unobstructed.
    #[must_use]
    pub fn block_density(&self, origin: (f64, f64, f64), aabb: &Aabb) -> f64 {
        let step_x = 1.0 / ((aabb.max_x - aabb.min_x) * 2.0 + 1.0);
        let step_y = 1.0 / ((aabb.max_y - aabb.min_y) * 2.0 + 1.0);
        let step_z = 1.0 / ((aabb.max_z - aabb.min_z) * 2.0 + 1.0);
        if step_x < 0.0 || step_y < 0.0 || step_z < 0.0 {
            return 0.0;
        }

        let mut unobstructed = 0u32;
        let mut total = 0u32;
        let mut fx = 0.0;
        while fx <= 1.0 {
            let mut fy = 0.0;
            while fy <= 1.0 {
                let mut fz = 0.0;
                while fz <= 1.0 {
                    let px = aabb.min_x + (aabb.max_x - aabb.min_x) * fx;
                    let py = aabb.min_y + (aabb.max_y - aabb.min_y) * fy;
                    let pz = aabb.min_z + (aabb.max_z - aabb.min_z) * fz;
                    if self.ray_unobstructed(origin, (px, py, pz)) {
                        unobstructed += 1;
                    }
                    total += 1;
                    fz += step_z;
                }
                fy += step_y;
            }
            fx += step_x;
        }

        if total == 0 {
            0.0
        } else {
            f64::from(unobstructed) / f64::from(total)
        }
    }

    fn ray_unobstructed(&self, from: (f64, f64, f64), to: (f64, f64, f64)) -> bool {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let dz = to.2 - from.2;
        let length = (dx * dx + dy * dy + dz * dz).sqrt();
        if length < 1e-7 {
            return true;
        }
        let steps = (length / 0.3).ceil() as i32;
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let pos = BlockPos::new(
                basalt_utils::math::floor_f64(from.0 + dx * t),
                basalt_utils::math::floor_f64(from.1 + dy * t),
                basalt_utils::math::floor_f64(from.2 + dz * t),
            );
            if REGISTRY.blocks.by_id_or_air(self.block(pos)).blocks_movement() {
                return false;
            }
        }
        true
    }
}

/// Light-engine access over the provider.
struct WorldLightAccess<'a> {
    world: &'a World,
}

impl LightAccess for WorldLightAccess<'_> {
    fn light(&self, kind: LightKind, pos: BlockPos) -> u8 {
        self.world.light(kind, pos)
    }

    fn set_light(&mut self, kind: LightKind, pos: BlockPos, level: u8) {
        if !(0..256).contains(&pos.y) {
            return;
        }
        if let Some(column) = self.world.column_for(pos) {
            let (x, z) = pos.local();
            column.write().set_light(kind, x, pos.y as usize, z, level);
        }
    }

    fn opacity(&self, pos: BlockPos) -> u8 {
        REGISTRY.blocks.by_id_or_air(self.world.block(pos)).opacity
    }

    fn emission(&self, pos: BlockPos) -> u8 {
        REGISTRY.blocks.by_id_or_air(self.world.block(pos)).emission
    }

    fn can_see_sky(&self, pos: BlockPos) -> bool {
        self.world.can_see_sky(pos)
    }

    fn chunks_exist(&self, pos: BlockPos, radius: i32) -> bool {
        let min = BlockPos::new(pos.x - radius, 0, pos.z - radius).chunk();
        let max = BlockPos::new(pos.x + radius, 0, pos.z + radius).chunk();
        for cx in min.x..=max.x {
            for cz in min.z..=max.z {
                if !self.world.provider.chunk_exists(cx, cz) {
                    return false;
                }
            }
        }
        true
    }
}

/// Explosion access over the world.
struct WorldExplosionView<'a> {
    world: &'a World,
}

impl ExplosionWorld for WorldExplosionView<'_> {
    fn resistance(&self, pos: BlockPos) -> f32 {
        REGISTRY
            .blocks
            .by_id_or_air(self.world.block(pos))
            .explosion_resistance()
    }

    fn is_air(&self, pos: BlockPos) -> bool {
        self.world.block(pos).is_air()
    }

    fn entities_in(&self, aabb: &Aabb) -> Vec<ExplosionEntity> {
        let entities = self.world.entities.read();
        entities
            .iter()
            .filter(|entity| entity.kind.is_living() && entity.bounding_box.intersects(aabb))
            .map(|entity| ExplosionEntity {
                id: entity.id,
                x: entity.x,
                y: entity.y,
                z: entity.z,
                eye_height: entity.eye_height,
                aabb: entity.bounding_box,
                is_player: entity.kind.is_player(),
                blast_protection: entity.blast_protection,
            })
            .collect()
    }

    fn block_density(&self, origin: (f64, f64, f64), aabb: &Aabb) -> f64 {
        self.world.block_density(origin, aabb)
    }
}

/// Fluid read access over the world, used by the fluid behavior.
pub(crate) struct WorldFluidView<'a> {
    /// The backing world.
    pub world: &'a World,
}

impl crate::fluid::FluidWorld for WorldFluidView<'_> {
    fn block(&self, pos: BlockPos) -> BlockId {
        self.world.block(pos)
    }

    fn metadata(&self, pos: BlockPos) -> u8 {
        self.world.metadata(pos)
    }
}

/// Piston read access over the world.
pub(crate) struct WorldPistonView<'a> {
    /// The backing world.
    pub world: &'a World,
}

impl crate::piston::PistonWorld for WorldPistonView<'_> {
    fn block(&self, pos: BlockPos) -> BlockId {
        self.world.block(pos)
    }

    fn metadata(&self, pos: BlockPos) -> u8 {
        self.world.metadata(pos)
    }

    fn has_tile_entity(&self, pos: BlockPos) -> bool {
        self.world
            .column_for(pos)
            .is_some_and(|column| column.read().tile_entity(pos).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_gen::RawChunk;
    use basalt_gen::{ChunkGenerator as GenTrait, PopulateWorld};
    use basalt_utils::ChunkPos;

    /// A flat stone slab up to y=63, deterministic and fast.
    struct FlatGenerator;

    impl GenTrait for FlatGenerator {
        fn generate(&self, _pos: ChunkPos) -> RawChunk {
            let mut chunk = RawChunk::empty();
            for x in 0..16 {
                for z in 0..16 {
                    for y in 0..64 {
                        chunk.set_block(x, y, z, vanilla::STONE);
                    }
                }
            }
            chunk
        }

        fn populate(&self, _world: &mut dyn PopulateWorld, _pos: ChunkPos) {}
    }

    fn flat_world() -> World {
        let world = World::new(
            Dimension::Overworld,
            1234,
            Arc::new(FlatGenerator),
            None,
            0,
        )
        .expect("ram world");
        // Preload a 5x5 area around the origin.
        for cx in -2..=2 {
            for cz in -2..=2 {
                let _ = world.provider.provide_chunk(cx, cz);
            }
        }
        world
    }

    #[test]
    fn set_block_updates_height_and_light() {
        let world = flat_world();
        let pos = BlockPos::new(8, 64, 8);
        assert!(world.can_see_sky(pos));
        world.set_block(pos, vanilla::STONE, 0);
        assert!(!world.can_see_sky(pos.down()));
        assert!(world.can_see_sky(pos.up()));
    }

    #[test]
    fn torch_lights_the_arena_after_catch_up() {
        let world = flat_world();
        let torch = BlockPos::new(0, 64, 0);
        world.set_block(torch, vanilla::TORCH, 0);
        world.light_catch_up();
        assert_eq!(world.light(LightKind::Block, torch), 14);
        assert_eq!(world.light(LightKind::Block, torch.offset(1, 0, 0)), 13);
        assert_eq!(world.light(LightKind::Block, torch.offset(7, 0, 0)), 7);
    }

    #[test]
    fn water_flow_scenario() {
        // S3: source water in a flat stone arena spreads levels 1..7 and
        // stops at 8.
        let world = flat_world();
        let source = BlockPos::new(0, 64, 0);
        world.set_block(source, vanilla::WATER, 0);
        world.schedule_block_update(source, vanilla::WATER, 0);

        for _ in 0..60 {
            world.tick();
        }

        for k in 1..=7 {
            let east = world.metadata(BlockPos::new(k, 64, 0));
            assert_eq!(i32::from(east), k, "flow level at +{k}");
            assert_eq!(
                world.block(BlockPos::new(k, 64, 0)),
                vanilla::FLOWING_WATER
            );
        }
        assert_eq!(world.block(BlockPos::new(8, 64, 0)), BlockId::AIR);
    }

    #[test]
    fn explosion_in_stone_carves_and_hurts() {
        let world = flat_world();
        let victim = world.entities.write().spawn(
            EntityKind::Living {
                type_name: String::from("Sheep"),
            },
            2.0,
            64.5,
            0.0,
        );
        let explosion = world.explode(0.5, 64.5, 0.5, 4.0, false, true);
        assert!(!explosion.affected_blocks.is_empty());
        let entities = world.entities.read();
        let sheep = entities.get(victim).expect("sheep still tracked");
        assert!(sheep.health < 20.0, "sheep took damage");
    }

    #[test]
    fn tick_advances_time_and_respects_daylight_rule() {
        let world = flat_world();
        let t0 = world.world_time();
        world.tick();
        assert_eq!(world.world_time(), t0 + 1);
        assert_eq!(world.total_time(), 1);

        world.game_rules.write().set("doDaylightCycle", "false");
        let frozen = world.world_time();
        world.tick();
        assert_eq!(world.world_time(), frozen);
        assert_eq!(world.total_time(), 2);
    }

    #[test]
    fn scheduled_dedup_scenario() {
        // S5: scheduling the same update three times yields one firing.
        let world = flat_world();
        let pos = BlockPos::new(5, 5, 5);
        world.set_block(pos, vanilla::FLOWING_WATER, 7);
        for _ in 0..3 {
            world.schedule_block_update(pos, vanilla::FLOWING_WATER, 10);
        }
        let time = world.world_time();
        let fired = world.scheduler.lock().process_ticks(time + 10, false);
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn celestial_angle_midnight_dims_sky() {
        let world = flat_world();
        world.info.write().world_time = 18_000; // midnight
        assert_eq!(world.skylight_subtracted(), 11);
        world.info.write().world_time = 6_000; // noon
        assert_eq!(world.skylight_subtracted(), 0);
    }
}
