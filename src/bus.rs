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

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use smol::{channel, lock::Mutex};

use crate::{error::Result, name::Name, record::Record, transport::{Inbound, Transport}};

/// An in-process stand-in for the named-data substrate: every peer
/// registered on the bus sees every other peer's Interests and Data.
/// Used by `dledgerd`'s standalone/local mode and by the core crate's
/// multi-peer convergence tests — not a production transport.
pub struct LoopbackBus {
    peers: Mutex<HashMap<String, channel::Sender<Inbound>>>,
}

impl LoopbackBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { peers: Mutex::new(HashMap::new()) })
    }

    /// Register a peer under `id` (its routable prefix) and get back a
    /// `Transport` handle plus the receiving end of its inbound queue.
    pub async fn register(self: &Arc<Self>, id: &str) -> (BusHandle, channel::Receiver<Inbound>) {
        let (tx, rx) = channel::unbounded();
        self.peers.lock().await.insert(id.to_string(), tx);
        (BusHandle { bus: self.clone(), self_id: id.to_string() }, rx)
    }

    async fn broadcast_except(&self, sender_id: &str, event: Inbound) {
        let peers = self.peers.lock().await;
        for (id, tx) in peers.iter() {
            if id == sender_id {
                continue
            }
            let _ = tx.send(event.clone()).await;
        }
    }
}

/// A peer's handle onto a `LoopbackBus`.
#[derive(Clone)]
pub struct BusHandle {
    bus: Arc<LoopbackBus>,
    self_id: String,
}

#[async_trait]
impl Transport for BusHandle {
    async fn multicast(&self, name: Name) -> Result<()> {
        self.bus.broadcast_except(&self.self_id, Inbound::Interest(name)).await;
        Ok(())
    }

    async fn request(&self, name: Name) -> Result<()> {
        self.bus.broadcast_except(&self.self_id, Inbound::Interest(name)).await;
        Ok(())
    }

    async fn reply(&self, _name: Name, record: Record) -> Result<()> {
        self.bus.broadcast_except(&self.self_id, Inbound::Data(record)).await;
        Ok(())
    }
}

/// A transport with no peers: everything sent is discarded. Used when
/// `dledgerd` runs a single peer with no configured bus.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn multicast(&self, _name: Name) -> Result<()> {
        Ok(())
    }

    async fn request(&self, _name: Name) -> Result<()> {
        Ok(())
    }

    async fn reply(&self, _name: Name, _record: Record) -> Result<()> {
        Ok(())
    }
}
