use std::hash::Hash;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use uuid::Uuid;

/// Token-bucket limiter keyed by an arbitrary identity. The API runs three
/// of these — one per tier named in the external interface table — rather
/// than one shared limiter, so a burst on one tier can't starve another.
/// Auth and general API traffic key off the caller's IP (no identity exists
/// yet, or isn't the point); lifecycle operations key off the authenticated
/// owner, per spec: one owner hammering create/start/stop must not be able
/// to exhaust a budget shared with every other tenant behind the same NAT.
pub type KeyedRateLimiter<K> = RateLimiter<K, DefaultKeyedStateStore<K>, DefaultClock>;
pub type IpRateLimiter = KeyedRateLimiter<IpAddr>;
pub type OwnerRateLimiter = KeyedRateLimiter<Uuid>;

pub fn build<K: Clone + Hash + Eq>(burst: u32, period: Duration) -> KeyedRateLimiter<K> {
    let quota = Quota::with_period(period)
        .expect("rate limit period must be non-zero")
        .allow_burst(NonZeroU32::new(burst).expect("rate limit burst must be non-zero"));
    RateLimiter::keyed(quota)
}
