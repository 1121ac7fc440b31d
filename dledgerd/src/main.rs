/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2026 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! `dledgerd`: runs a single DLedger peer to completion or until a
//! termination signal. Wires the core crate's [`dledger::Peer`] to a
//! loopback [`dledger::bus::LoopbackBus`] transport and a
//! [`dledger::signer::NullSigner`] — the real named-data face and
//! signature scheme are out of scope, per the core crate's own docs.

use std::{fs, sync::Arc};

use easy_parallel::Parallel;
use log::{error, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use smol::{channel, lock::Mutex, Executor};
use structopt::StructOpt;
use structopt_toml::StructOptToml;

use dledger::{bus::LoopbackBus, error::Error, peer::Peer, signer::NullSigner, transport::Inbound, Result};

mod settings;
use settings::{Args, CONFIG_FILE, CONFIG_FILE_CONTENTS};

/// Parse CLI args, loading `--config` (or the default `dledgerd_config.toml`)
/// as the TOML defaults layer that `structopt-toml` merges under whatever
/// flags were actually passed on the command line. Writes the bundled
/// template out if no config file exists yet, the way `lilith`/`evgrd`
/// leave a commented starter config for the operator.
fn load_args() -> Result<Args> {
    let bootstrap = Args::from_args();
    let config_path = bootstrap.config.clone().unwrap_or_else(|| CONFIG_FILE.to_string());

    if fs::metadata(&config_path).is_err() {
        if let Err(e) = fs::write(&config_path, CONFIG_FILE_CONTENTS) {
            warn!(target: "dledgerd", "could not write default config to {config_path}: {e}");
        }
    }

    let toml_contents = fs::read_to_string(&config_path).unwrap_or_default();
    Args::from_args_with_toml(&toml_contents).map_err(|e| Error::Config(e.to_string()))
}

fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Drives the generation timer: waits out the startup desync delay once,
/// then reschedules itself at `1/frequency` (jittered) after every tick,
/// per §4.2. Stops only on `InvariantBreach` — every other error is logged
/// and the loop carries on to the next tick.
async fn run_generation_loop(peer: Arc<Mutex<Peer>>) {
    let (startup_delay, seed) = {
        let peer = peer.lock().await;
        (peer.cfg.generation_startup_delay(), peer.cfg.node_id)
    };
    smol::Timer::after(startup_delay).await;
    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(2).wrapping_add(1));

    loop {
        let now = now_millis();
        let outcome = peer.lock().await.tick_generate(now).await;

        match outcome {
            Ok(Some(name)) => info!(target: "dledgerd", "generated record {name}"),
            Ok(None) => {}
            Err(Error::InvariantBreach(what)) => {
                error!(target: "dledgerd", "fatal invariant breach on {what}, stopping generation loop");
                return
            }
            Err(e) => warn!(target: "dledgerd", "generation tick failed: {e}"),
        }

        let delay = {
            let peer = peer.lock().await;
            let cfg = &peer.cfg;
            cfg.randomize.sample(cfg.effective_frequency(), &mut rng)
        };
        smol::Timer::after(delay).await;
    }
}

/// Drives the SYNC timer: same startup/reschedule shape as generation, at
/// `syncFrequency`.
async fn run_sync_loop(peer: Arc<Mutex<Peer>>) {
    let (startup_delay, seed) = {
        let peer = peer.lock().await;
        (peer.cfg.sync_startup_delay(), peer.cfg.node_id.wrapping_mul(2).wrapping_add(2))
    };
    smol::Timer::after(startup_delay).await;
    let mut rng = StdRng::seed_from_u64(seed);

    loop {
        if let Err(e) = peer.lock().await.tick_sync().await {
            warn!(target: "dledgerd", "sync tick failed: {e}");
        }

        let delay = {
            let peer = peer.lock().await;
            let cfg = &peer.cfg;
            cfg.sync_randomize.sample(cfg.sync_frequency, &mut rng)
        };
        smol::Timer::after(delay).await;
    }
}

/// Drains inbound transport events (Interests and Data) onto the peer.
async fn run_event_loop(peer: Arc<Mutex<Peer>>, rx: channel::Receiver<Inbound>) {
    while let Ok(event) = rx.recv().await {
        let now = now_millis();
        if let Err(Error::InvariantBreach(what)) = peer.lock().await.on_event(event, now).await {
            error!(target: "dledgerd", "fatal invariant breach on {what}, stopping event loop");
            return
        }
    }
}

fn main() -> Result<()> {
    let args = load_args()?;

    TermLogger::init(log_level(args.verbose), LogConfig::default(), TerminalMode::Mixed, ColorChoice::Auto)
        .expect("failed to initialize logger");

    let cfg = args.to_config()?;
    info!(
        target: "dledgerd",
        "starting peer {} (mc prefix {}, identity manager: {})",
        cfg.routable_prefix,
        cfg.mc_prefix,
        cfg.is_identity_manager(),
    );

    let bus = LoopbackBus::new();
    let ex = Arc::new(Executor::new());
    let (signal, shutdown) = channel::unbounded::<()>();

    ctrlc::set_handler(move || {
        warn!(target: "dledgerd", "caught interrupt, shutting down");
        let _ = smol::block_on(signal.send(()));
    })
    .expect("failed to set ctrl-c handler");

    let routable_prefix = cfg.routable_prefix.to_string();

    let (result, _) = Parallel::new()
        .add(|| {
            smol::block_on(async {
                let (transport, rx) = bus.register(&routable_prefix).await;
                let peer = Peer::new(cfg.clone(), Box::new(NullSigner), Box::new(transport), cfg.node_id);
                let peer = Arc::new(Mutex::new(peer));
                let is_manager = peer.lock().await.cfg.is_identity_manager();

                if is_manager {
                    if let Some(target) = &args.revoke {
                        match peer.lock().await.revoke(target, now_millis()).await {
                            Ok(name) => info!(target: "dledgerd", "issued revocation {name} against {target}"),
                            Err(e) => error!(target: "dledgerd", "failed to issue revocation: {e}"),
                        }
                    }
                    info!(target: "dledgerd", "identity manager does not auto-generate routine records");
                } else {
                    ex.spawn(run_generation_loop(peer.clone())).detach();
                }

                ex.spawn(run_event_loop(peer.clone(), rx)).detach();
                ex.spawn(run_sync_loop(peer.clone())).detach();

                Ok::<(), Error>(())
            })
        })
        .finish(|| smol::block_on(ex.run(shutdown.recv())));

    result
}
