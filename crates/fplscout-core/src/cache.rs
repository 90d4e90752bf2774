// Time-bounded single-value cache.
//
// Constructed once by the caller and passed by reference to whatever
// refreshes it. Time is supplied by the caller so expiry is deterministic.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<(T, Instant)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if one is stored and younger than the TTL at `now`.
    pub fn get(&self, now: Instant) -> Option<&T> {
        match &self.slot {
            Some((value, stored_at)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Store `value` as fresh at `now`, replacing anything cached.
    pub fn insert(&mut self, value: T, now: Instant) {
        self.slot = Some((value, now));
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Age of the stored value at `now`, whether or not it has expired.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|(_, stored_at)| now.saturating_duration_since(*stored_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_misses() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        assert!(cache.get(Instant::now()).is_none());
        assert!(cache.age(Instant::now()).is_none());
    }

    #[test]
    fn hit_within_ttl_miss_after() {
        let t0 = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(3600));
        cache.insert("digest".to_string(), t0);

        assert_eq!(cache.get(t0).map(String::as_str), Some("digest"));
        assert!(cache.get(t0 + Duration::from_secs(3599)).is_some());
        assert!(cache.get(t0 + Duration::from_secs(3600)).is_none());
        assert_eq!(
            cache.age(t0 + Duration::from_secs(10)),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn insert_refreshes_timestamp() {
        let t0 = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(1, t0);
        cache.insert(2, t0 + Duration::from_secs(8));
        assert_eq!(cache.get(t0 + Duration::from_secs(15)), Some(&2));
    }

    #[test]
    fn invalidate_clears() {
        let t0 = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(1, t0);
        cache.invalidate();
        assert!(cache.get(t0).is_none());
    }
}
