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

//! Core of a DAG-structured ledger peer built on a pull-driven, named-data
//! substrate: records are content-addressed, approve prior tips under an
//! interlock/freshness policy, and accumulate weight and entropy as later
//! records approve them. The network face itself is abstracted behind
//! [`transport::Transport`]; this crate only ever reacts to inbound
//! Interests/Data and issues outbound ones through that trait.

pub mod bus;
pub mod config;
pub mod error;
pub mod generator;
pub mod intake;
pub mod name;
pub mod peer;
pub mod propagator;
pub mod record;
pub mod revocation;
pub mod signer;
pub mod store;
pub mod sync;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use name::Name;
pub use peer::Peer;
pub use record::Record;
pub use store::Store;
