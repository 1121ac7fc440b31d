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

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{name::Name, record::Record};

/// The mutable envelope a committed record gets in the local store.
/// The record itself is immutable; only these aggregates mutate, and only
/// through the propagator.
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    pub record: Record,
    pub weight: u64,
    pub approver_names: HashSet<String>,
    pub entropy: u64,
    pub is_archived: bool,
    pub creation_time: u64,
}

impl LedgerEntry {
    fn fresh(record: Record, creation_time: u64) -> Self {
        Self {
            record,
            weight: 1,
            approver_names: HashSet::new(),
            entropy: 0,
            is_archived: false,
            creation_time,
        }
    }
}

pub enum InsertOutcome {
    New,
    Duplicate,
}

/// Mapping record-name → ledger entry, plus the ordered tip sequence.
///
/// The tip order only matters for serializing into SYNC messages — the
/// store itself treats it as an unordered set for membership purposes,
/// but callers (the generator, SYNC) rely on insertion order being
/// preserved so two runs with the same event order produce the same
/// wire bytes.
pub struct Store {
    entries: HashMap<Name, LedgerEntry>,
    tips: Vec<Name>,
    blacklist: HashSet<String>,
}

impl Store {
    pub fn new() -> Self {
        Self { entries: HashMap::new(), tips: Vec::new(), blacklist: HashSet::new() }
    }

    /// Seed `genesis_num` genesis records named
    /// `{mc_prefix}/genesis/genesis{i}`, all with default aggregates and
    /// all in the tip set. Called once at startup.
    pub fn seed_genesis(&mut self, mc_prefix: &Name, genesis_num: usize, now: u64) {
        for i in 0..genesis_num {
            let name = mc_prefix.push("genesis").push(format!("genesis{i}"));
            let record = Record { name: name.clone(), content: format!("***genesis{i}"), signature: Vec::new() };
            self.entries.insert(name.clone(), LedgerEntry::fresh(record, now));
            self.tips.push(name);
        }
    }

    pub fn insert(&mut self, record: Record, now: u64) -> InsertOutcome {
        if self.entries.contains_key(&record.name) {
            return InsertOutcome::Duplicate
        }
        debug!(target: "dledger::store", "inserting {}", record.name);
        self.entries.insert(record.name.clone(), LedgerEntry::fresh(record, now));
        InsertOutcome::New
    }

    pub fn lookup(&self, name: &Name) -> Option<&LedgerEntry> {
        self.entries.get(name)
    }

    pub fn lookup_mut(&mut self, name: &Name) -> Option<&mut LedgerEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tips(&self) -> &[Name] {
        &self.tips
    }

    pub fn tip_add(&mut self, name: Name) {
        if !self.tips.contains(&name) {
            self.tips.push(name);
        }
    }

    pub fn tip_remove(&mut self, name: &Name) {
        self.tips.retain(|t| t != name);
    }

    pub fn blacklist_add(&mut self, creator_id: String) {
        self.blacklist.insert(creator_id);
    }

    pub fn blacklist_contains(&self, creator_id: &str) -> bool {
        self.blacklist.contains(creator_id)
    }

    /// Closure invariant check (testable property #1): every parent of
    /// every committed record must also be in the store.
    pub fn check_closure(&self) -> bool {
        self.entries.values().all(|e| e.record.parents().iter().all(|p| self.entries.contains_key(p)))
    }

    /// Tip/parent disjointness (testable property #2).
    pub fn check_tip_parent_disjoint(&self) -> bool {
        let mut all_parents: HashSet<Name> = HashSet::new();
        for e in self.entries.values() {
            all_parents.extend(e.record.parents());
        }
        self.tips.iter().all(|t| !all_parents.contains(t))
    }

    /// Entropy equals approver-count invariant (testable property #3).
    pub fn check_entropy_consistency(&self) -> bool {
        self.entries.values().all(|e| e.entropy as usize == e.approver_names.len())
    }

    /// Interlock invariant (testable property #5): no entry's approver set
    /// contains its own creator prefix — except an identity-manager-chain
    /// entry, where self-approval is the intentional, spec-preserved policy
    /// from the §9 Open Question (see DESIGN.md's Open Question decisions).
    pub fn check_interlock(&self, id_manager_prefix: &Name) -> bool {
        self.entries.values().all(|e| {
            let creator = e.record.creator_prefix();
            if creator == *id_manager_prefix {
                return true
            }
            !e.approver_names.contains(&creator.to_string())
        })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
