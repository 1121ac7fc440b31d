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

use async_trait::async_trait;

use crate::{error::Result, name::Name, record::Record};

/// The named-data request/response substrate, named out of scope in §1.
/// This is the only seam between the core and the network: every handler
/// reacts to an `Inbound` event and every outbound action goes through one
/// of these three calls. No call here ever awaits a reply inline — NOTIF,
/// SYNC and RECORD requests are fire-and-forget Interests; any Data comes
/// back later as a separate `Inbound::Data` event.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Express an Interest on the shared multicast face (NOTIF and SYNC
    /// requests both travel this way).
    async fn multicast(&self, name: Name) -> Result<()>;

    /// Express a RECORD Interest for an exact name (parent back-fill,
    /// forward-on-miss).
    async fn request(&self, name: Name) -> Result<()>;

    /// Answer an inbound RECORD Interest with the stored record.
    async fn reply(&self, name: Name, record: Record) -> Result<()>;
}

/// An event arriving from the transport: either an Interest under one of
/// the three name prefixes, or Data (a `Record`) satisfying some prior
/// request — or arriving unsolicited, as a tailing record does.
#[derive(Clone, Debug)]
pub enum Inbound {
    Interest(Name),
    Data(Record),
}
