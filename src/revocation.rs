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

use crate::{
    config::Config,
    error::Result,
    generator::{commit_and_advertise, select_parents},
    name::Name,
    record::{make_record, Record},
    signer::Signer,
    store::Store,
    transport::Transport,
};

/// Tracks the identity manager's revocation chain. Each revocation record
/// must name the previous one as a parent, so a peer that only ever sees
/// the chain's tip can still tell an old revocation from the current one.
pub struct RevocationManager {
    last_revocation: Name,
}

impl RevocationManager {
    /// The chain starts at the manager's own first genesis record.
    pub fn new(mc_prefix: &Name) -> Self {
        Self { last_revocation: mc_prefix.push("genesis").push("genesis0") }
    }

    pub fn last_revocation(&self) -> &Name {
        &self.last_revocation
    }

    /// Issue a revocation record against `revoked_sub_prefix` (e.g.
    /// `"node7"`), chaining it onto the previous revocation and committing
    /// it like any other record. Only meaningful when this peer is the
    /// identity manager; callers are expected to have checked
    /// `cfg.is_identity_manager()`.
    pub async fn revoke(
        &mut self,
        revoked_sub_prefix: &str,
        store: &mut Store,
        cfg: &Config,
        signer: &dyn Signer,
        transport: &dyn Transport,
        now: u64,
    ) -> Result<Name> {
        // The previous revocation is a forced parent; on top of it the
        // manager picks referredNum ordinary tips through the same
        // selection loop every other record uses, per §4.6. Per §9 the
        // identity manager is exempt from the interlock check.
        let forced = [self.last_revocation.clone()];
        let parents =
            select_parents(store, &cfg.id_manager_prefix, cfg.referred_num, &forced, true, &mut rand::thread_rng())?;
        let record = make_record(&parents, revoked_sub_prefix, &cfg.id_manager_prefix, signer);

        let name = commit_and_advertise(store, cfg, transport, record, &parents, now).await?;
        self.last_revocation = name.clone();
        apply_if_revocation(&store.lookup(&name).expect("just committed").record.clone(), store, cfg);
        Ok(name)
    }
}

/// Called after any record (locally generated or received) is committed:
/// if it was issued by the identity manager, blacklist the node identifier
/// it names.
pub fn apply_if_revocation(record: &Record, store: &mut Store, cfg: &Config) {
    if record.creator_prefix() != cfg.id_manager_prefix {
        return
    }
    let revoked = cfg.mc_prefix.push(record.suffix());
    store.blacklist_add(revoked.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::NullTransport, signer::NullSigner};

    /// Runs all four store-level invariant predicates (closure, tip/parent
    /// disjointness, entropy-equals-approver-count, interlock) and asserts
    /// each holds — the end-of-scenario check called out in spec §8.
    fn assert_invariants(store: &Store, id_manager_prefix: &Name) {
        assert!(store.check_closure(), "closure violated");
        assert!(store.check_tip_parent_disjoint(), "tip/parent disjointness violated");
        assert!(store.check_entropy_consistency(), "entropy != approver count");
        assert!(store.check_interlock(id_manager_prefix), "interlock violated");
    }

    #[test]
    fn revocation_blacklists_named_node_s6() {
        smol::block_on(async {
            let mc = Name::parse("/dledger");
            let mut store = Store::new();
            // referred_num ordinary tips plus the forced chain parent need
            // `referred_num + 1` distinct genesis tips on hand.
            store.seed_genesis(&mc, 3, 0);

            let mut cfg = Config::default();
            cfg.mc_prefix = mc.clone();
            cfg.routable_prefix = mc.push("idmgr");
            cfg.id_manager_prefix = cfg.routable_prefix.clone();
            cfg.referred_num = 2;

            let mut mgr = RevocationManager::new(&mc);
            let signer = NullSigner;
            let transport = NullTransport;

            let name = mgr.revoke("node7", &mut store, &cfg, &signer, &transport, 0).await.unwrap();

            assert!(store.blacklist_contains("/dledger/node7"));

            // The revocation went through the same full selection loop as
            // any other record: its chain parent plus referred_num ordinary
            // tips, per §4.6.
            let entry = store.lookup(&name).unwrap();
            assert_eq!(entry.record.parents().len(), 1 + cfg.referred_num);
            assert!(entry.record.parents().contains(&mc.push("genesis").push("genesis0")));

            assert_invariants(&store, &cfg.id_manager_prefix);
        });
    }

    #[test]
    fn revocation_chain_links_to_previous() {
        smol::block_on(async {
            let mc = Name::parse("/dledger");
            let mut store = Store::new();
            // Enough genesis tips to survive two rounds of referred_num=1
            // ordinary picks on top of the chained parent.
            store.seed_genesis(&mc, 5, 0);

            let mut cfg = Config::default();
            cfg.mc_prefix = mc.clone();
            cfg.routable_prefix = mc.push("idmgr");
            cfg.id_manager_prefix = cfg.routable_prefix.clone();
            cfg.referred_num = 1;

            let mut mgr = RevocationManager::new(&mc);
            let signer = NullSigner;
            let transport = NullTransport;

            let first = mgr.revoke("node7", &mut store, &cfg, &signer, &transport, 0).await.unwrap();
            assert_eq!(mgr.last_revocation(), &first);

            let second = mgr.revoke("node8", &mut store, &cfg, &signer, &transport, 1).await.unwrap();
            let entry = store.lookup(&second).unwrap();
            assert!(entry.record.parents().contains(&first));
            assert_eq!(entry.record.parents().len(), 1 + cfg.referred_num);

            assert_invariants(&store, &cfg.id_manager_prefix);
        });
    }
}
