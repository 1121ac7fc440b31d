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

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    config::Config,
    error::{Error, Result},
    generator,
    intake::Intake,
    name::Name,
    revocation::RevocationManager,
    signer::Signer,
    store::Store,
    sync,
    transport::{Inbound, Transport},
};

/// A single DLedger node: its ledger, intake queue, revocation chain, and
/// the configuration/signer/transport it was wired up with. Owns no
/// networking of its own — every inbound event arrives as an `Inbound` and
/// every outbound action goes out through `transport`.
pub struct Peer {
    pub store: Store,
    pub cfg: Config,
    signer: Box<dyn Signer>,
    transport: Box<dyn Transport>,
    intake: Intake,
    revocation: RevocationManager,
    rng: StdRng,
}

impl Peer {
    /// Build a peer with its genesis set already seeded. `seed` drives the
    /// parent-selection RNG; callers that need determinism (tests, replay)
    /// should pass a fixed value.
    pub fn new(cfg: Config, signer: Box<dyn Signer>, transport: Box<dyn Transport>, seed: u64) -> Self {
        let mut store = Store::new();
        store.seed_genesis(&cfg.mc_prefix, cfg.genesis_num, 0);
        let revocation = RevocationManager::new(&cfg.mc_prefix);

        Self {
            store,
            cfg,
            signer,
            transport,
            intake: Intake::new(),
            revocation,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Dispatch one event off the transport: an Interest goes to the sync
    /// handler, Data goes to intake.
    pub async fn on_event(&mut self, event: Inbound, _now: u64) -> Result<()> {
        match event {
            Inbound::Interest(name) => {
                sync::handle_interest(&name, &self.store, &self.cfg, self.transport.as_ref()).await
            }
            Inbound::Data(record) => {
                let creator_prefix = record.creator_prefix().to_string();
                if !self.signer.verify(&creator_prefix, record.content.as_bytes(), &record.signature) {
                    warn!(target: "dledger::peer", "dropping record {} with bad signature", record.name);
                    return Err(Error::BadSignature)
                }

                // Revocation bookkeeping runs inside intake's drain loop for
                // every record it commits, not just this one, so a
                // revocation that completes via parent backfill still
                // blacklists its target.
                if let Err(e) =
                    self.intake.on_receive(record.clone(), &mut self.store, &self.cfg, self.transport.as_ref()).await
                {
                    warn!(target: "dledger::peer", "dropping record {}: {e}", record.name);
                    return Err(e)
                }
                Ok(())
            }
        }
    }

    /// Run a generation tick: skipped while parents are still being
    /// back-filled, so a peer never builds on a ledger view it knows is
    /// incomplete.
    pub async fn tick_generate(&mut self, now: u64) -> Result<Option<Name>> {
        if self.intake.missing_count() > 0 {
            info!(target: "dledger::peer", "skipping generation: {} parents still missing", self.intake.missing_count());
            return Ok(None)
        }

        match generator::generate(&mut self.store, &self.cfg, self.signer.as_ref(), self.transport.as_ref(), &mut self.rng, now).await {
            Ok(name) => Ok(Some(name)),
            Err(Error::TipsExhausted(n)) => {
                warn!(target: "dledger::peer", "tips exhausted looking for {n} parents, skipping this tick");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Run a sync tick: advertise the current tip set.
    pub async fn tick_sync(&self) -> Result<()> {
        sync::advertise_sync(&self.store, &self.cfg, self.transport.as_ref()).await
    }

    /// Only meaningful when `cfg.is_identity_manager()` is true.
    pub async fn revoke(&mut self, revoked_sub_prefix: &str, now: u64) -> Result<Name> {
        self.revocation
            .revoke(revoked_sub_prefix, &mut self.store, &self.cfg, self.signer.as_ref(), self.transport.as_ref(), now)
            .await
    }
}
