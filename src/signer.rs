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

/// The signing/verification oracle. Real deployments provide a real
/// implementation (ed25519 or similar); this crate treats the scheme as
/// assumed-correct and out of scope, per §1.
pub trait Signer: Send + Sync {
    fn sign(&self, content: &[u8]) -> Vec<u8>;
    fn verify(&self, creator_prefix: &str, content: &[u8], sig: &[u8]) -> bool;
}

/// Always-valid signer used by `dledgerd`'s loopback mode and by tests.
/// Produces empty signatures and accepts anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSigner;

impl Signer for NullSigner {
    fn sign(&self, _content: &[u8]) -> Vec<u8> {
        Vec::new()
    }

    fn verify(&self, _creator_prefix: &str, _content: &[u8], _sig: &[u8]) -> bool {
        true
    }
}
