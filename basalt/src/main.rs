//! The Basalt server binary: configuration, world bootstrap, the 20 Hz
//! tick loop and the console command feed.

mod config;
mod logger;
mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use basalt_gen::{ChunkGenerator, OverworldGenerator};
use basalt_gen::end::EndGenerator;
use basalt_gen::nether::NetherGenerator;
use basalt_world::World;
use basalt_world::command::sender::ConsoleSender;
use basalt_world::command::{CommandContext, CommandDispatcher};
use basalt_world::world::Dimension;
use tokio::io::{AsyncBufReadExt, BufReader};

use config::ServerConfig;

/// Target tick interval: 20 Hz.
const TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Chunk I/O worker count.
const IO_WORKERS: usize = 2;

fn build_generator(config: &ServerConfig, seed: i64) -> Arc<dyn ChunkGenerator> {
    let amplified = config.level_type == "amplified";
    Arc::new(OverworldGenerator::new(seed, amplified, true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    let config = ServerConfig::load(std::path::Path::new("server.properties"));
    let seed = config.numeric_seed();
    log::info!(
        "starting basalt: world '{}', type {}, seed {seed}",
        config.level_name,
        config.level_type
    );

    let world_dir = PathBuf::from(&config.level_name);
    let overworld = Arc::new(
        World::new(
            Dimension::Overworld,
            seed,
            build_generator(&config, seed),
            Some(world_dir),
            IO_WORKERS,
        )
        .context("creating overworld")?,
    );

    let nether = config.allow_nether.then(|| {
        Arc::new(
            World::new(
                Dimension::Nether,
                seed,
                Arc::new(NetherGenerator::new(seed)),
                None,
                0,
            )
            .expect("ram-backed nether")
        )
    });
    let end = config.allow_end.then(|| {
        Arc::new(
            World::new(
                Dimension::End,
                seed,
                Arc::new(EndGenerator::new(seed)),
                None,
                0,
            )
            .expect("ram-backed end")
        )
    });

    // Pin the spawn area so its chunks generate and stay loaded.
    {
        let spawn = overworld.info.read().spawn;
        let spawn_chunk = spawn.chunk();
        for cx in (spawn_chunk.x - 8)..=(spawn_chunk.x + 8) {
            for cz in (spawn_chunk.z - 8)..=(spawn_chunk.z + 8) {
                let _ = overworld.provider.provide_chunk(cx, cz);
            }
        }
        log::info!(
            "spawn area ready: {} chunks loaded",
            overworld.provider.loaded_count()
        );
    }

    let stop_flag = Arc::new(AtomicBool::new(false));

    // Server-list pings.
    let status_info = status::StatusInfo {
        motd: String::from("A Basalt Server"),
        max_players: config.max_players,
        online_players: 0,
    };
    tokio::spawn(async move {
        if let Err(e) = status::run_listener("0.0.0.0:25565", status_info).await {
            log::error!("status listener failed: {e}");
        }
    });

    // The world tick thread: drives every dimension at 20 Hz.
    let tick_worlds: Vec<Arc<World>> = std::iter::once(Arc::clone(&overworld))
        .chain(nether.iter().cloned())
        .chain(end.iter().cloned())
        .collect();
    let tick_stop = Arc::clone(&stop_flag);
    let tick_thread = std::thread::Builder::new()
        .name(String::from("world-tick"))
        .spawn(move || {
            let mut next_tick = Instant::now();
            while !tick_stop.load(Ordering::SeqCst) {
                for world in &tick_worlds {
                    world.tick();
                }
                next_tick += TICK_INTERVAL;
                let now = Instant::now();
                if next_tick > now {
                    std::thread::sleep(next_tick - now);
                } else {
                    // Running behind; catch up without sleeping.
                    next_tick = now;
                }
            }
        })
        .context("spawning tick thread")?;

    // Console commands.
    let dispatcher = CommandDispatcher::new();
    let console = ConsoleSender;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line {
                    Ok(Some(line)) if !line.trim().is_empty() => {
                        let players: Vec<String> = Vec::new();
                        let context = CommandContext {
                            world: &overworld,
                            players: &players,
                            stop_flag: &stop_flag,
                        };
                        dispatcher.execute(&context, &console, line.trim());
                        if stop_flag.load(Ordering::SeqCst) {
                            break;
                        }
                    }
                    Ok(Some(_)) => {}
                    Ok(None) | Err(_) => {
                        // Console closed; keep serving until a signal.
                        tokio::signal::ctrl_c().await.ok();
                        stop_flag.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                stop_flag.store(true, Ordering::SeqCst);
                break;
            }
        }
    }

    log::info!("shutting down: saving world");
    tick_thread.join().ok();
    overworld.save(true);
    log::info!("goodbye");
    Ok(())
}
