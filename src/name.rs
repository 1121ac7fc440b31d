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

use std::fmt;

use darkfi_serial::{SerialDecodable, SerialEncodable};

/// A hierarchical, path-like name, the addressing unit of the name-based
/// transport. Components are kept as an ordered list rather than a bare
/// `String` so that SYNC's stride-3 decoder and creator-sub-prefix
/// extraction are slicing operations, not string surgery.
///
/// Leading empty components from an absolute `"/a/b"`-style path are
/// preserved on parse and dropped again on render, matching how the
/// underlying name-based transport treats names.
#[derive(SerialEncodable, SerialDecodable, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<String>,
}

impl Name {
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }

    /// Parse a `/`-delimited path. `"/dledger/node3/abcd"` yields
    /// components `["dledger", "node3", "abcd"]` — the leading empty
    /// component produced by `str::split` is dropped.
    pub fn parse(s: &str) -> Self {
        let components =
            s.split('/').filter(|c| !c.is_empty()).map(String::from).collect();
        Self { components }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.components.get(i).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// The name with its last component removed (e.g. the creator prefix
    /// of a record name, dropping the digest).
    pub fn without_last(&self) -> Name {
        let mut components = self.components.clone();
        components.pop();
        Name { components }
    }

    pub fn push<S: Into<String>>(&self, component: S) -> Name {
        let mut components = self.components.clone();
        components.push(component.into());
        Name { components }
    }

    pub fn starts_with(&self, prefix: &Name) -> bool {
        self.components.len() >= prefix.components.len() &&
            self.components[..prefix.components.len()] == prefix.components[..]
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.components {
            write!(f, "/{c}")?;
        }
        Ok(())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::parse(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::parse(&s)
    }
}
