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

use dledger::{
    config::{Config, Jitter},
    error::{Error, Result},
    name::Name,
};
use structopt_toml::{serde::Deserialize, structopt::StructOpt, StructOptToml};

pub const CONFIG_FILE: &str = "dledgerd_config.toml";
pub const CONFIG_FILE_CONTENTS: &str = include_str!("../dledgerd_config.toml");

#[derive(Clone, Debug, Deserialize, StructOpt, StructOptToml)]
#[serde(default)]
#[structopt(name = "dledgerd", about = "DAG-structured distributed ledger peer daemon")]
pub struct Args {
    #[structopt(short, long)]
    /// Configuration file to use
    pub config: Option<String>,

    #[structopt(short, parse(from_occurrences))]
    /// Increase verbosity (-vvv supported)
    pub verbose: u8,

    #[structopt(long, default_value = "1.0")]
    /// Record generation rate in Hz
    pub frequency: f64,

    #[structopt(long, default_value = "0.2")]
    /// SYNC advertisement rate in Hz
    pub sync_frequency: f64,

    #[structopt(long, default_value = "3")]
    /// Weight at which a record is archived
    pub entropy_threshold: u64,

    #[structopt(long, default_value = "1")]
    /// Contribution ceiling applied to tailing records on intake
    pub con_entropy: u64,

    #[structopt(long, default_value = "3")]
    /// Entropy value at which ancestor propagation stops descending
    pub max_entropy: u64,

    #[structopt(long, default_value = "5")]
    /// Number of genesis records to seed
    pub genesis_num: usize,

    #[structopt(long, default_value = "2")]
    /// Number of parents to reference per generated record
    pub referred_num: usize,

    #[structopt(long)]
    /// This peer's own routable name prefix, e.g. /dledger/node3
    pub routable_prefix: String,

    #[structopt(long, default_value = "/dledger")]
    /// Multicast prefix shared by the whole network
    pub mc_prefix: String,

    #[structopt(long)]
    /// Routable prefix of the identity-manager peer
    pub id_manager_prefix: String,

    #[structopt(long, default_value = "none")]
    /// Jitter distribution for the generation timer: none, uniform, exponential
    pub randomize: String,

    #[structopt(long, default_value = "none")]
    /// Jitter distribution for the sync timer: none, uniform, exponential
    pub sync_randomize: String,

    #[structopt(long, default_value = "0")]
    /// Numeric identifier used to seed this peer's PRNG deterministically
    pub node_id: u64,

    #[structopt(long)]
    /// Issue a revocation against this sub-prefix (e.g. "node7") at startup,
    /// before entering the run loop. Only meaningful when this peer's
    /// routable_prefix equals id_manager_prefix; ignored otherwise.
    pub revoke: Option<String>,
}

impl Args {
    /// Translate the parsed CLI/TOML arguments into the core crate's
    /// `Config`, parsing the string fields that don't have a native
    /// `structopt` representation (names, jitter kinds).
    pub fn to_config(&self) -> Result<Config> {
        let routable_prefix = Name::parse(&self.routable_prefix);
        let mc_prefix = Name::parse(&self.mc_prefix);
        let id_manager_prefix = Name::parse(&self.id_manager_prefix);
        let randomize: Jitter = self.randomize.parse()?;
        let sync_randomize: Jitter = self.sync_randomize.parse()?;

        if routable_prefix.is_empty() {
            return Err(Error::Config("routable_prefix is required".to_string()))
        }
        if id_manager_prefix.is_empty() {
            return Err(Error::Config("id_manager_prefix is required".to_string()))
        }

        Ok(Config {
            frequency: self.frequency,
            sync_frequency: self.sync_frequency,
            entropy_threshold: self.entropy_threshold,
            con_entropy: self.con_entropy,
            max_entropy: self.max_entropy,
            genesis_num: self.genesis_num,
            referred_num: self.referred_num,
            routable_prefix,
            mc_prefix,
            id_manager_prefix,
            randomize,
            sync_randomize,
            node_id: self.node_id,
        })
    }
}
