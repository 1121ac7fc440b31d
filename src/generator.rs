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

use rand::Rng;

use crate::{
    config::Config,
    error::{Error, Result},
    name::Name,
    propagator::propagate,
    record::{make_record, Record},
    signer::Signer,
    store::Store,
    transport::Transport,
};

/// Maximum retries per parent slot before the whole generation attempt
/// bails out, per §4.2.
const MAX_RETRIES_PER_PICK: usize = 10;

/// Pick `count` distinct tips satisfying interlock (not this creator's own)
/// and freshness (not archived), plus any already-`forced` parents. Each
/// slot gets up to 10 random draws before the whole selection fails.
///
/// `skip_interlock` lifts the interlock constraint entirely — per §9's
/// open question, the identity manager is allowed to approve its own
/// earlier (non-forced) records, so its revocation chain can still pick
/// up ordinary tips of its own making. Every other creator always gets
/// `skip_interlock = false`.
pub(crate) fn select_parents(
    store: &Store,
    creator_prefix: &Name,
    count: usize,
    forced: &[Name],
    skip_interlock: bool,
    rng: &mut impl Rng,
) -> Result<Vec<Name>> {
    let tips = store.tips();
    let mut chosen: Vec<Name> = forced.to_vec();

    if tips.is_empty() && chosen.is_empty() {
        return Err(Error::TipsExhausted(count))
    }

    while chosen.len() < count + forced.len() {
        let mut picked = None;

        for _ in 0..MAX_RETRIES_PER_PICK {
            if tips.is_empty() {
                break
            }
            let idx = rng.gen_range(0..tips.len());
            let candidate = &tips[idx];

            if chosen.contains(candidate) {
                continue
            }

            let entry = match store.lookup(candidate) {
                Some(e) => e,
                None => continue,
            };

            if !skip_interlock && entry.record.creator_prefix() == *creator_prefix {
                continue // interlock
            }
            if entry.is_archived {
                continue // freshness
            }

            picked = Some(candidate.clone());
            break
        }

        match picked {
            Some(name) => chosen.push(name),
            None => return Err(Error::TipsExhausted(count)),
        }
    }

    Ok(chosen)
}

/// Build this peer's NOTIF name: `{mcPrefix}/NOTIF/{creatorSubPrefix}/{digest}`.
pub(crate) fn notif_name(mc_prefix: &Name, creator_sub_prefix: &str, digest: &str) -> Name {
    mc_prefix.push("NOTIF").push(creator_sub_prefix).push(digest)
}

/// Select parents, build and sign a new record, commit it, and advertise
/// it via NOTIF. Returns the new record's name, or `TipsExhausted` if no
/// eligible parent set could be found.
pub async fn generate(
    store: &mut Store,
    cfg: &Config,
    signer: &dyn Signer,
    transport: &dyn Transport,
    rng: &mut impl Rng,
    now: u64,
) -> Result<Name> {
    let skip_interlock = cfg.is_identity_manager();
    let parents = select_parents(store, &cfg.routable_prefix, cfg.referred_num, &[], skip_interlock, rng)?;
    let suffix = cfg.routable_prefix.to_string();
    let record = make_record(&parents, &suffix, &cfg.routable_prefix, signer);
    commit_and_advertise(store, cfg, transport, record, &parents, now).await
}

pub(crate) async fn commit_and_advertise(
    store: &mut Store,
    cfg: &Config,
    transport: &dyn Transport,
    record: Record,
    parents: &[Name],
    now: u64,
) -> Result<Name> {
    let name = record.name.clone();
    let digest = name.last().expect("record name always has a digest component").to_string();
    let approver_id = record.creator_prefix().to_string();

    store.insert(record, now);
    store.tip_add(name.clone());
    for p in parents {
        store.tip_remove(p);
    }
    propagate(store, &name, &approver_id, cfg.entropy_threshold, cfg.max_entropy)?;

    let creator_sub = name.get(1).unwrap_or_default();
    transport.multicast(notif_name(&cfg.mc_prefix, creator_sub, &digest)).await?;

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::NullTransport, signer::NullSigner};
    use rand::SeedableRng;

    #[test]
    fn generation_picks_distinct_non_self_fresh_parents() {
        smol::block_on(async {
            let mut store = Store::new();
            store.seed_genesis(&Name::parse("/dledger"), 5, 0);
            let mut cfg = Config::default();
            cfg.routable_prefix = Name::parse("/dledger/node3");
            cfg.referred_num = 2;

            let mut rng = rand::rngs::StdRng::seed_from_u64(1);
            let signer = NullSigner;
            let transport = NullTransport;

            let name = generate(&mut store, &cfg, &signer, &transport, &mut rng, 0).await.unwrap();

            assert_eq!(store.len(), 6);
            assert_eq!(store.tips().len(), 4);
            assert!(name.to_string().starts_with("/dledger/node3/"));
        });
    }

    #[test]
    fn tips_exhausted_when_only_self_owned_tips_remain() {
        let mut store = Store::new();
        store.seed_genesis(&Name::parse("/dledger"), 1, 0);
        // Replace the single tip with one created by node3 itself.
        let g = store.tips()[0].clone();
        let self_record =
            make_record(&[g], "/dledger/node3", &Name::parse("/dledger/node3"), &NullSigner);
        let self_name = self_record.name.clone();
        store.insert(self_record, 0);
        store.tip_remove(&store.tips()[0].clone());
        store.tip_add(self_name);

        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let err = select_parents(&store, &Name::parse("/dledger/node3"), 2, &[], false, &mut rng);
        assert!(matches!(err, Err(Error::TipsExhausted(_))));
    }

    #[test]
    fn identity_manager_may_approve_its_own_prior_record() {
        smol::block_on(async {
            let mc = Name::parse("/dledger");
            let mut store = Store::new();
            store.seed_genesis(&mc, 1, 0);

            let mut cfg = Config::default();
            cfg.mc_prefix = mc.clone();
            cfg.routable_prefix = mc.push("idmgr");
            cfg.id_manager_prefix = cfg.routable_prefix.clone();
            cfg.referred_num = 1;

            let mut rng = rand::rngs::StdRng::seed_from_u64(7);
            let signer = NullSigner;
            let transport = NullTransport;

            // First record: only the genesis tip is available, so the
            // single parent is unavoidably an ordinary (non-self) tip.
            let first =
                generate(&mut store, &cfg, &signer, &transport, &mut rng, 0).await.unwrap();

            // Second record: the only tip left is the manager's own first
            // record. A non-exempt creator would fail here with
            // TipsExhausted since its only remaining tip is self-owned;
            // the identity manager must succeed by approving its own
            // prior record.
            let second =
                generate(&mut store, &cfg, &signer, &transport, &mut rng, 1).await.unwrap();

            let entry = store.lookup(&second).unwrap();
            assert!(entry.record.parents().contains(&first));
        });
    }
}
