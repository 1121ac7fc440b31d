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

/// Behavioral error kinds for the DLedger core.
///
/// Most variants are not meant to bubble out of the run loop: a handler
/// that encounters `DuplicateRecord`, `InterlockViolation`, `StaleTipApproval`,
/// `BlacklistedCreator` or `TipsExhausted` logs it and drops the offending
/// record or retries. `InvariantBreach` is the sole fatal kind — it signals
/// a corrupted store and should abort the peer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("record already present in store")]
    DuplicateRecord,

    #[error("record approves a parent by its own creator")]
    InterlockViolation,

    #[error("tailing record approves a parent past the contribution ceiling")]
    StaleTipApproval,

    #[error("parent {0} is not present locally")]
    MissingParent(String),

    #[error("creator is blacklisted")]
    BlacklistedCreator,

    #[error("could not find {0} distinct eligible parents after retries")]
    TipsExhausted(usize),

    #[error("invariant breach: parent {0} expected in store but missing")]
    InvariantBreach(String),

    #[error("malformed name: {0}")]
    MalformedName(String),

    #[error("malformed record content: {0}")]
    MalformedContent(String),

    #[error("signature verification failed")]
    BadSignature,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("(de)serialization error: {0}")]
    Serialize(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
