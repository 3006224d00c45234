// Keyed fetch cache with a bounded freshness window
use crate::domain::frame::Frame;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    fetched_at: Instant,
    frame: Frame,
}

/// Frames cached by source reference for up to `ttl`, with an explicit
/// invalidate operation for user-requested refreshes. Bounds how often the
/// remote spreadsheet gets hit; never consulted across a refresh.
pub struct FetchCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, reference: &str) -> Option<Frame> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(reference) {
            Some(entry) if entry.fetched_at.elapsed() <= self.ttl => Some(entry.frame.clone()),
            Some(_) => {
                entries.remove(reference);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, reference: &str, frame: Frame) {
        self.entries.lock().unwrap().insert(
            reference.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                frame,
            },
        );
    }

    pub fn invalidate(&self, reference: &str) {
        self.entries.lock().unwrap().remove(reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Frame {
        Frame::with_channels(["COUNT_TIME_1"])
    }

    #[test]
    fn test_put_get_round_trip() {
        let cache = FetchCache::new(Duration::from_secs(60));
        assert!(cache.get("https://example.com/a.csv").is_none());

        cache.put("https://example.com/a.csv", sample_frame());
        assert!(cache.get("https://example.com/a.csv").is_some());
        assert!(cache.get("https://example.com/b.csv").is_none());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = FetchCache::new(Duration::ZERO);
        cache.put("https://example.com/a.csv", sample_frame());

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("https://example.com/a.csv").is_none());
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = FetchCache::new(Duration::from_secs(60));
        cache.put("https://example.com/a.csv", sample_frame());

        cache.invalidate("https://example.com/a.csv");
        assert!(cache.get("https://example.com/a.csv").is_none());
    }
}
