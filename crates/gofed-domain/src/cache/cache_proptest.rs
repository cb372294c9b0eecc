//! Property-based tests for the bounded cache.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashMap;

    use crate::cache::{BoundedCache, BoundedCacheConfig};

    /// Keys from a small alphabet so upserts and evictions both occur often.
    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-h]{1,2}"
    }

    proptest! {
        #[test]
        fn test_size_never_exceeds_capacity(
            capacity in 1usize..12,
            keys in prop::collection::vec(key_strategy(), 0..300),
        ) {
            let cache = BoundedCache::new(BoundedCacheConfig::new(capacity)).unwrap();

            for (i, key) in keys.into_iter().enumerate() {
                cache.set(key, i);
                prop_assert!(cache.size() <= capacity);
                prop_assert_eq!(cache.list().len(), cache.size());
            }
        }

        #[test]
        fn test_set_then_get_returns_latest_value(
            capacity in 1usize..12,
            writes in prop::collection::vec((key_strategy(), any::<u32>()), 1..100),
        ) {
            let cache = BoundedCache::new(BoundedCacheConfig::new(capacity)).unwrap();

            for (key, value) in writes {
                cache.set(key.clone(), value);
                prop_assert_eq!(cache.get(&key), Some(value));
                // Reading twice without an intervening write is stable
                prop_assert_eq!(cache.get(&key), Some(value));
            }
        }

        #[test]
        fn test_survivors_are_the_most_recent_distinct_keys(
            capacity in 1usize..8,
            keys in prop::collection::vec(key_strategy(), 0..100),
        ) {
            let cache = BoundedCache::new(BoundedCacheConfig::new(capacity)).unwrap();
            let mut last_write: HashMap<String, usize> = HashMap::new();

            for (i, key) in keys.iter().enumerate() {
                cache.set(key.clone(), i);
                last_write.insert(key.clone(), i);
            }

            // Oldest-inserted eviction keeps the `capacity` keys written last
            let mut expected: Vec<usize> = last_write.into_values().collect();
            expected.sort_unstable();
            let keep_from = expected.len().saturating_sub(capacity);
            prop_assert_eq!(cache.list(), expected[keep_from..].to_vec());
        }
    }
}
