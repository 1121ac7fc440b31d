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

use std::{str::FromStr, time::Duration};

use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::{error::Error, name::Name};

/// Jitter distribution applied to a timer's base period, matching the
/// original's `ns3::UniformRandomVariable` / `ns3::ExponentialRandomVariable`
/// choices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    #[default]
    None,
    /// Uniform over `[0, 2/f]`.
    Uniform,
    /// Exponential with mean `1/f`, truncated (resampled) at `50/f`.
    Exponential,
}

impl FromStr for Jitter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Jitter::None),
            "uniform" => Ok(Jitter::Uniform),
            "exponential" => Ok(Jitter::Exponential),
            other => Err(Error::Config(format!("unknown jitter distribution: {other}"))),
        }
    }
}

impl Jitter {
    /// Sample a delay for a timer whose base frequency is `f` Hz (period
    /// `1/f` seconds).
    pub fn sample(&self, f: f64, rng: &mut impl Rng) -> Duration {
        let period = 1.0 / f;
        let secs = match self {
            Jitter::None => period,
            Jitter::Uniform => rng.gen_range(0.0..(2.0 * period)),
            Jitter::Exponential => {
                let bound = 50.0 * period;
                let exp = Exp::new(f).expect("frequency must be positive");
                loop {
                    let sample = exp.sample(rng);
                    if sample <= bound {
                        break sample
                    }
                }
            }
        };
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Startup desync divisor for the generation timer: the first generation
/// tick fires at `nodeId/5` seconds, per the original's
/// `Peer::ScheduleNextGeneration`.
pub const GENERATION_STARTUP_DIVISOR: f64 = 5.0;

/// Startup desync divisor for the sync timer: the first SYNC multicast
/// fires at `nodeId/10` seconds, per the original's `Peer::ScheduleNextSync`.
pub const SYNC_STARTUP_DIVISOR: f64 = 10.0;

/// Every recognized configuration option from §6, independent of how it
/// was obtained (CLI, TOML file, or constructed directly in tests).
#[derive(Clone, Debug)]
pub struct Config {
    pub frequency: f64,
    pub sync_frequency: f64,
    pub entropy_threshold: u64,
    pub con_entropy: u64,
    pub max_entropy: u64,
    pub genesis_num: usize,
    pub referred_num: usize,
    pub routable_prefix: Name,
    pub mc_prefix: Name,
    pub id_manager_prefix: Name,
    pub randomize: Jitter,
    pub sync_randomize: Jitter,
    pub node_id: u64,
}

impl Config {
    /// `frequency == 0` falls back to 1 Hz per §6.
    pub fn effective_frequency(&self) -> f64 {
        if self.frequency <= 0.0 {
            1.0
        } else {
            self.frequency
        }
    }

    pub fn is_identity_manager(&self) -> bool {
        self.routable_prefix == self.id_manager_prefix
    }

    /// One-shot desync delay before the first generation tick.
    pub fn generation_startup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.node_id as f64 / GENERATION_STARTUP_DIVISOR)
    }

    /// One-shot desync delay before the first SYNC multicast.
    pub fn sync_startup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.node_id as f64 / SYNC_STARTUP_DIVISOR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            sync_frequency: 0.2,
            entropy_threshold: 3,
            con_entropy: 1,
            max_entropy: 3,
            genesis_num: 5,
            referred_num: 2,
            routable_prefix: Name::parse("/dledger/node0"),
            mc_prefix: Name::parse("/dledger"),
            id_manager_prefix: Name::parse("/dledger/node0"),
            randomize: Jitter::None,
            sync_randomize: Jitter::None,
            node_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frequency_falls_back_to_one_hertz() {
        let mut cfg = Config::default();
        cfg.frequency = 0.0;
        assert_eq!(cfg.effective_frequency(), 1.0);
    }

    #[test]
    fn none_jitter_is_exactly_the_period() {
        let mut rng = rand::thread_rng();
        let d = Jitter::None.sample(2.0, &mut rng);
        assert_eq!(d, Duration::from_secs_f64(0.5));
    }

    #[test]
    fn uniform_jitter_stays_in_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let d = Jitter::Uniform.sample(4.0, &mut rng);
            assert!(d.as_secs_f64() >= 0.0 && d.as_secs_f64() < 0.5);
        }
    }

    #[test]
    fn startup_delays_scale_with_node_id() {
        let mut cfg = Config::default();
        cfg.node_id = 15;
        assert_eq!(cfg.generation_startup_delay(), Duration::from_secs_f64(3.0));
        assert_eq!(cfg.sync_startup_delay(), Duration::from_secs_f64(1.5));
    }

    #[test]
    fn exponential_jitter_respects_bound() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let d = Jitter::Exponential.sample(10.0, &mut rng);
            assert!(d.as_secs_f64() <= 5.0);
        }
    }
}
