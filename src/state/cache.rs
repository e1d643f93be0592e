#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;

/// Tags that group cached REST responses for invalidation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Rides,
    User,
    Drivers,
    Vehicles,
    Admin,
}

/// Per-tag version stamps. Mutating endpoints bump the tags they invalidate;
/// views that cached data under a tag refetch when its version moved.
#[derive(Clone, Debug, Default)]
pub struct CacheStamps {
    versions: HashMap<CacheTag, u64>,
}

impl CacheStamps {
    #[must_use]
    pub fn version(&self, tag: CacheTag) -> u64 {
        self.versions.get(&tag).copied().unwrap_or(0)
    }

    pub fn invalidate(&mut self, tags: &[CacheTag]) {
        for tag in tags {
            *self.versions.entry(*tag).or_insert(0) += 1;
        }
    }
}
