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

use crate::{error::Result, name::Name, store::Store, Error};

/// Depth-first walk over `tail`'s ancestors, crediting `approver_id` on
/// every ancestor reached and bumping weight once per insertion per node.
///
/// `visited` is shared across the whole recursion (a node is credited at
/// most once per call to `propagate`); `processed` is local to each stack
/// frame and only dedupes multiple edges to the same parent from one
/// record.
pub fn propagate(
    store: &mut Store,
    tail: &Name,
    approver_id: &str,
    entropy_threshold: u64,
    max_entropy: u64,
) -> Result<()> {
    let mut visited = HashSet::new();
    visit(store, tail, approver_id, entropy_threshold, max_entropy, &mut visited)
}

fn visit(
    store: &mut Store,
    cur: &Name,
    approver_id: &str,
    entropy_threshold: u64,
    max_entropy: u64,
    visited: &mut HashSet<Name>,
) -> Result<()> {
    visited.insert(cur.clone());

    let parents = match store.lookup(cur) {
        Some(entry) => entry.record.parents(),
        None => return Err(Error::InvariantBreach(cur.to_string())),
    };

    let mut processed = HashSet::new();
    for parent in parents {
        if processed.contains(&parent) {
            continue
        }
        if visited.contains(&parent) {
            continue
        }

        let entropy = {
            let entry = store
                .lookup_mut(&parent)
                .ok_or_else(|| Error::InvariantBreach(parent.to_string()))?;
            entry.weight += 1;
            entry.approver_names.insert(approver_id.to_string());
            entry.entropy = entry.approver_names.len() as u64;
            if entry.entropy >= entropy_threshold {
                entry.is_archived = true;
            }
            entry.entropy
        };

        if entropy >= max_entropy {
            // This branch is strongly archived; its own ancestors already are too.
            continue
        }

        processed.insert(parent.clone());
        visit(store, &parent, approver_id, entropy_threshold, max_entropy, visited)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::make_record, signer::NullSigner};

    fn commit(store: &mut Store, parents: Vec<Name>, creator: &str) -> Name {
        let creator_prefix = Name::parse(creator);
        let record = make_record(&parents, creator, &creator_prefix, &NullSigner);
        let name = record.name.clone();
        store.insert(record, 0);
        for p in &parents {
            store.tip_remove(p);
        }
        store.tip_add(name.clone());
        name
    }

    #[test]
    fn single_generation_updates_parents_s2() {
        let mut store = Store::new();
        store.seed_genesis(&Name::parse("/dledger"), 5, 0);
        let tips: Vec<Name> = store.tips()[..2].to_vec();
        let child = commit(&mut store, tips.clone(), "/dledger/node3");
        propagate(&mut store, &child, "/dledger/node3", 3, 3).unwrap();

        assert_eq!(store.len(), 6);
        assert_eq!(store.tips().len(), 4);
        assert!(child.to_string().starts_with("/dledger/node3/"));
        for p in &tips {
            let e = store.lookup(p).unwrap();
            assert_eq!(e.weight, 2);
            assert_eq!(e.entropy, 1);
            assert!(e.approver_names.contains("/dledger/node3"));
        }

        let no_manager = Name::parse("/dledger/idmgr");
        assert!(store.check_closure());
        assert!(store.check_tip_parent_disjoint());
        assert!(store.check_entropy_consistency());
        assert!(store.check_interlock(&no_manager));
    }

    #[test]
    fn propagation_stops_at_max_entropy_s3() {
        let mut store = Store::new();
        store.seed_genesis(&Name::parse("/dledger"), 1, 0);
        let g = store.tips()[0].clone();

        let a = commit(&mut store, vec![g.clone()], "/dledger/nodeA");
        propagate(&mut store, &a, "/dledger/nodeA", 2, 3).unwrap();
        let b = commit(&mut store, vec![a.clone()], "/dledger/nodeB");
        propagate(&mut store, &b, "/dledger/nodeB", 2, 3).unwrap();
        let c = commit(&mut store, vec![b.clone()], "/dledger/nodeC");
        propagate(&mut store, &c, "/dledger/nodeC", 2, 3).unwrap();

        assert_eq!(store.lookup(&g).unwrap().entropy, 3);

        let d = commit(&mut store, vec![c.clone()], "/dledger/nodeD");
        propagate(&mut store, &d, "/dledger/nodeD", 2, 3).unwrap();
        assert_eq!(store.lookup(&g).unwrap().entropy, 3);

        let no_manager = Name::parse("/dledger/idmgr");
        assert!(store.check_closure());
        assert!(store.check_tip_parent_disjoint());
        assert!(store.check_entropy_consistency());
        assert!(store.check_interlock(&no_manager));
    }

    #[test]
    fn invariant_breach_on_missing_ancestor() {
        let mut store = Store::new();
        // A record referencing a parent that was never committed is a
        // corrupted store — propagation over it must fail fatally.
        let ghost_parent = Name::parse("/dledger/node9/never-committed");
        let dangling = Name::parse("/dledger/ghost/00");
        let bogus = crate::record::Record {
            name: dangling.clone(),
            content: format!(":{ghost_parent}***/dledger/ghost"),
            signature: vec![],
        };
        store.insert(bogus, 0);
        let err = propagate(&mut store, &dangling, "/dledger/ghost", 2, 3);
        assert!(matches!(err, Err(Error::InvariantBreach(_))));
    }
}
