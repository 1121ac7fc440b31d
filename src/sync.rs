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

use log::debug;

use crate::{config::Config, error::Result, name::Name, store::Store, transport::Transport};

/// Build `{mcPrefix}/SYNC/{tip1}/{tip2}/…`, each tip flattened into the
/// name's component list in insertion order.
pub(crate) fn build_sync_name(mc_prefix: &Name, tips: &[Name]) -> Name {
    let mut components = mc_prefix.components().to_vec();
    components.push("SYNC".to_string());
    for tip in tips {
        components.extend_from_slice(tip.components());
    }
    Name::new(components)
}

/// Decode a SYNC name's tip list by chunking the components after
/// `{mcPrefix}/SYNC` into 3-component windows. Tolerant of any tip
/// ordering; a trailing partial window (fewer than 3 components) is
/// dropped rather than panicking — the stride-3 scheme is brittle by
/// design, per §9.
pub(crate) fn decode_sync_tips(name: &Name, mc_prefix: &Name) -> Vec<Name> {
    let skip = mc_prefix.len() + 1;
    let comps = name.components();
    if skip >= comps.len() {
        return Vec::new()
    }
    comps[skip..].chunks_exact(3).map(|w| Name::new(w.to_vec())).collect()
}

/// Build `{mcPrefix}/NOTIF/{creatorSubPrefix}/{digest}`.
pub(crate) fn build_notif_name(mc_prefix: &Name, creator_sub_prefix: &str, digest: &str) -> Name {
    mc_prefix.push("NOTIF").push(creator_sub_prefix).push(digest)
}

/// Recover the record's own name (`{mcPrefix}/{creatorSubPrefix}/{digest}`)
/// from an inbound NOTIF name.
fn record_name_from_notif(notif: &Name, mc_prefix: &Name) -> Name {
    let skip = mc_prefix.len() + 1; // mcPrefix components + "NOTIF"
    let tail = &notif.components()[skip..];
    let mut components = mc_prefix.components().to_vec();
    components.extend_from_slice(tail);
    Name::new(components)
}

/// Emit a SYNC request carrying the local tip set, at the jittered
/// period configured by `syncFrequency`.
pub async fn advertise_sync(store: &Store, cfg: &Config, transport: &dyn Transport) -> Result<()> {
    let name = build_sync_name(&cfg.mc_prefix, store.tips());
    transport.multicast(name).await
}

/// Dispatch an inbound Interest to the right handler based on its prefix:
/// NOTIF, SYNC, or a plain RECORD request.
pub async fn handle_interest(
    name: &Name,
    store: &Store,
    cfg: &Config,
    transport: &dyn Transport,
) -> Result<()> {
    let notif_prefix = cfg.mc_prefix.push("NOTIF");
    let sync_prefix = cfg.mc_prefix.push("SYNC");

    if name.starts_with(&notif_prefix) {
        let record_name = record_name_from_notif(name, &cfg.mc_prefix);
        if !store.contains(&record_name) {
            debug!(target: "dledger::sync", "NOTIF for unknown {record_name}, fetching");
            transport.request(record_name).await?;
        }
        return Ok(())
    }

    if name.starts_with(&sync_prefix) {
        let their_tips = decode_sync_tips(name, &cfg.mc_prefix);
        let mut we_are_ahead = false;

        for tip in their_tips {
            match store.lookup(&tip) {
                None => {
                    debug!(target: "dledger::sync", "SYNC advertises unknown tip {tip}, fetching");
                    transport.request(tip).await?;
                }
                Some(entry) => {
                    if entry.weight > 1 {
                        we_are_ahead = true;
                    }
                }
            }
        }

        if we_are_ahead {
            advertise_sync(store, cfg, transport).await?;
        }
        return Ok(())
    }

    // Plain RECORD request: reply if we have it, forward-on-miss otherwise.
    match store.lookup(name) {
        Some(entry) => transport.reply(name.clone(), entry.record.clone()).await,
        None => transport.request(name.clone()).await,
    }
}
