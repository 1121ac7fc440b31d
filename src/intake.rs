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

use std::collections::HashSet;

use log::debug;

use crate::{
    config::Config, error::Result, name::Name, propagator::propagate, record::Record,
    revocation::apply_if_revocation, store::Store, transport::Transport,
};

/// Records received from the network whose parents aren't all present
/// locally yet. Holds the pending list and the deduped set of parent
/// names currently being fetched.
#[derive(Default)]
pub struct Intake {
    pending: Vec<Record>,
    missing: HashSet<Name>,
}

impl Intake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn mark_missing(&mut self, name: Name) {
        self.missing.insert(name);
    }

    /// Handle a freshly received record: §4.4 steps 1-6.
    pub async fn on_receive(
        &mut self,
        record: Record,
        store: &mut Store,
        cfg: &Config,
        transport: &dyn Transport,
    ) -> Result<()> {
        // Step 1: drop if already committed.
        if store.contains(&record.name) {
            debug!(target: "dledger::intake", "dropping duplicate {}", record.name);
            return Ok(())
        }

        // Step 2: resolved-missing vs tailing arrival.
        let tailing = !self.missing.remove(&record.name);

        // Step 3: blacklist filter.
        let creator_id = record.creator_prefix().to_string();
        if store.blacklist_contains(&creator_id) {
            debug!(target: "dledger::intake", "dropping record from blacklisted {}", creator_id);
            return Ok(())
        }

        // Step 4: append to pending.
        self.pending.push(record.clone());

        // Step 5: walk parents.
        let is_manager_record = record.creator_prefix() == cfg.id_manager_prefix;
        for parent in record.parents() {
            let parent_creator = parent.without_last();

            if parent_creator == record.creator_prefix() && !is_manager_record {
                self.pending.retain(|r| r.name != record.name);
                debug!(target: "dledger::intake", "interlock violation on receipt: {}", record.name);
                return Ok(())
            }

            if !store.contains(&parent) {
                if self.missing.insert(parent.clone()) {
                    transport.request(parent).await?;
                }
                continue
            }

            if tailing {
                let entry = store.lookup(&parent).expect("checked contains above");
                if entry.entropy > cfg.con_entropy {
                    self.pending.retain(|r| r.name != record.name);
                    debug!(target: "dledger::intake", "dropping stale tailing record {}", record.name);
                    return Ok(())
                }
            }
        }

        self.drain(store, cfg)
    }

    /// Step 6: repeatedly scan the pending list newest-to-oldest, committing
    /// any record whose parents are all present, until a full pass makes
    /// no progress.
    fn drain(&mut self, store: &mut Store, cfg: &Config) -> Result<()> {
        loop {
            let mut progressed = false;

            for i in (0..self.pending.len()).rev() {
                let ready = self.pending[i].parents().iter().all(|p| store.contains(p));
                if !ready {
                    continue
                }

                let record = self.pending.remove(i);
                let approver_id = record.creator_prefix().to_string();
                let parents = record.parents();
                let name = record.name.clone();

                store.insert(record.clone(), now_millis());
                store.tip_add(name.clone());
                for p in &parents {
                    store.tip_remove(p);
                }
                propagate(store, &name, &approver_id, cfg.entropy_threshold, cfg.max_entropy)?;
                apply_if_revocation(&record, store, cfg);

                progressed = true;
            }

            if !progressed {
                break
            }
        }

        Ok(())
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::NullTransport, record::make_record, signer::NullSigner};

    fn cfg() -> Config {
        let mut cfg = Config::default();
        cfg.entropy_threshold = 3;
        cfg.max_entropy = 3;
        cfg.con_entropy = 1;
        cfg
    }

    #[test]
    fn backfill_commits_in_order_s4() {
        smol::block_on(async {
            let mut store = Store::new();
            store.seed_genesis(&Name::parse("/dledger"), 1, 0);
            let g = store.tips()[0].clone();

            let y = make_record(&[g.clone()], "/dledger/nodeY", &Name::parse("/dledger/nodeY"), &NullSigner);
            let x = make_record(&[y.name.clone()], "/dledger/nodeX", &Name::parse("/dledger/nodeX"), &NullSigner);

            let mut intake = Intake::new();
            let cfg = cfg();
            let transport = NullTransport;

            // X arrives first; Y is unknown.
            intake.on_receive(x.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert_eq!(intake.missing_count(), 1);
            assert_eq!(intake.pending_count(), 1);
            assert!(!store.contains(&x.name));

            // Y arrives; both commit in the same drain pass.
            intake.on_receive(y.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert_eq!(intake.missing_count(), 0);
            assert_eq!(intake.pending_count(), 0);
            assert!(store.contains(&y.name));
            assert!(store.contains(&x.name));
            assert!(!store.tips().contains(&y.name));
            assert!(store.tips().contains(&x.name));

            assert!(store.check_closure());
            assert!(store.check_tip_parent_disjoint());
            assert!(store.check_entropy_consistency());
            assert!(store.check_interlock(&cfg.id_manager_prefix));
        });
    }

    #[test]
    fn interlock_violation_on_intake_is_dropped_s5() {
        smol::block_on(async {
            let mut store = Store::new();
            store.seed_genesis(&Name::parse("/dledger"), 1, 0);
            let g = store.tips()[0].clone();

            // nodeA approves its own earlier record: self-parent interlock.
            let a1 = make_record(&[g.clone()], "/dledger/nodeA", &Name::parse("/dledger/nodeA"), &NullSigner);
            let a2 = make_record(&[a1.name.clone()], "/dledger/nodeA", &Name::parse("/dledger/nodeA"), &NullSigner);

            let mut intake = Intake::new();
            let cfg = cfg();
            let transport = NullTransport;

            // a1's parent isn't in store so a1 sits pending with g as missing... but g IS
            // genesis, already present. Commit a1 first via drain.
            intake.on_receive(a1.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert!(store.contains(&a1.name));

            let before = store.len();
            intake.on_receive(a2.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert_eq!(store.len(), before);
            assert_eq!(intake.pending_count(), 0);
            assert!(!store.contains(&a2.name));

            assert!(store.check_closure());
            assert!(store.check_tip_parent_disjoint());
            assert!(store.check_entropy_consistency());
            assert!(store.check_interlock(&cfg.id_manager_prefix));
        });
    }

    #[test]
    fn blacklisted_creator_dropped_before_processing() {
        smol::block_on(async {
            let mut store = Store::new();
            store.seed_genesis(&Name::parse("/dledger"), 1, 0);
            store.blacklist_add("/dledger/node1".to_string());
            let g = store.tips()[0].clone();
            let r = make_record(&[g], "/dledger/node1", &Name::parse("/dledger/node1"), &NullSigner);

            let mut intake = Intake::new();
            let cfg = cfg();
            let transport = NullTransport;
            intake.on_receive(r.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert!(!store.contains(&r.name));
            assert_eq!(intake.pending_count(), 0);
        });
    }

    #[test]
    fn backfilled_revocation_still_blacklists_its_target() {
        smol::block_on(async {
            let mc = Name::parse("/dledger");
            let mut store = Store::new();
            store.seed_genesis(&mc, 1, 0);
            let g = store.tips()[0].clone();

            let mut cfg = cfg();
            cfg.mc_prefix = mc.clone();
            cfg.id_manager_prefix = mc.push("idmgr");

            // Two chained revocations, built directly (not through
            // RevocationManager) to simulate them arriving over the wire.
            let r0 = make_record(&[g], "node7", &cfg.id_manager_prefix, &NullSigner);
            let r1 = make_record(&[r0.name.clone()], "node8", &cfg.id_manager_prefix, &NullSigner);

            let mut intake = Intake::new();
            let transport = NullTransport;

            // r1 arrives first; r0 is unknown, so r1 only sits pending —
            // it never reaches Peer::on_event's direct commit path.
            intake.on_receive(r1.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert!(!store.contains(&r1.name));

            // r0 arrives, completing the chain: drain commits r0 then r1
            // in the same pass, and both must get blacklisted.
            intake.on_receive(r0.clone(), &mut store, &cfg, &transport).await.unwrap();
            assert!(store.contains(&r1.name));
            assert!(store.blacklist_contains("/dledger/node7"));
            assert!(store.blacklist_contains("/dledger/node8"));
        });
    }
}
