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

use darkfi_serial::{SerialDecodable, SerialEncodable};
use sha2::{Digest as _, Sha256};

use crate::name::Name;

/// Separator between the parent list and the creator-specific suffix in a
/// record's content. Bit-exact per the wire grammar: `(":" ParentName)+ "***" Suffix`.
const SENTINEL: &str = "***";

/// An immutable, signed, content-addressed ledger entry.
///
/// Once constructed, a `Record` never changes: all mutable bookkeeping
/// (weight, entropy, approvers, archival) lives in the ledger entry that
/// wraps it in the store, never on the record itself.
#[derive(SerialEncodable, SerialDecodable, Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub name: Name,
    pub content: String,
    pub signature: Vec<u8>,
}

impl Record {
    /// SHA-256 digest of the content, lowercase hex, per §6.
    pub fn digest_of(content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    /// Build the content string for a new record: the parents in
    /// iteration order, the sentinel, then the creator-specific suffix.
    pub fn build_content(parents: &[Name], suffix: &str) -> String {
        let mut content = String::new();
        for p in parents {
            content.push(':');
            content.push_str(&p.to_string());
        }
        content.push_str(SENTINEL);
        content.push_str(suffix);
        content
    }

    /// Parse the parent list out of a record's content. Candidate parent
    /// names with fewer than two components are padding and are ignored,
    /// per the content grammar.
    pub fn parents(&self) -> Vec<Name> {
        let blob = match self.content.split_once(SENTINEL) {
            Some((parents_blob, _)) => parents_blob,
            None => return Vec::new(),
        };

        blob.split(':')
            .filter(|s| !s.is_empty())
            .map(Name::parse)
            .filter(|n| n.len() >= 2)
            .collect()
    }

    /// The suffix after the sentinel: a creator's routable prefix for a
    /// normal record, or the revoked node identifier for a revocation.
    pub fn suffix(&self) -> &str {
        match self.content.split_once(SENTINEL) {
            Some((_, suffix)) => suffix,
            None => "",
        }
    }

    /// The creator's routable prefix: the record's own name with the
    /// trailing digest component dropped.
    pub fn creator_prefix(&self) -> Name {
        self.name.without_last()
    }

    /// The node-specific tail of the creator prefix (e.g. `"node3"` or
    /// `"genesis"`), used to build NOTIF names and to compare against
    /// `idManagerPrefix`.
    pub fn creator_sub_prefix(&self) -> Option<&str> {
        self.name.get(1)
    }

    /// A record is genesis iff its creator sub-prefix is the literal
    /// `"genesis"` — derived from name shape, not a stored flag.
    pub fn is_genesis(&self) -> bool {
        self.creator_sub_prefix() == Some("genesis")
    }

    pub fn hash(&self) -> String {
        Self::digest_of(&self.content)
    }
}

/// Build and sign a fresh, unsigned-then-signed record. `parents` is the
/// iteration order used verbatim in the content; `creator_prefix` is this
/// peer's routable prefix (or the identity manager's, for a revocation).
pub fn make_record(
    parents: &[Name],
    suffix: &str,
    creator_prefix: &Name,
    signer: &dyn crate::signer::Signer,
) -> Record {
    let content = Record::build_content(parents, suffix);
    let digest = Record::digest_of(&content);
    let name = creator_prefix.push(digest);
    let signature = signer.sign(content.as_bytes());
    Record { name, content, signature }
}
