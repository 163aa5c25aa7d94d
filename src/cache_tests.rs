#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::thread;

use super::*;
use crate::finder::FindOptions;

#[test]
fn miss_then_hit_returns_same_entry() {
    let cache = PatternCache::new(4);
    let first = cache.get_or_compile("a+").unwrap();
    let second = cache.get_or_compile("a+").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
}

#[test]
fn syntax_error_is_propagated_and_not_cached() {
    let cache = PatternCache::new(4);
    let err = cache.get_or_compile("(abc").unwrap_err();
    assert_eq!(err.position, 0);
    assert!(cache.is_empty());
}

#[test]
fn least_recently_used_entry_is_evicted() {
    let cache = PatternCache::new(2);
    cache.get_or_compile("a").unwrap();
    cache.get_or_compile("b").unwrap();
    // Touch "a" so "b" becomes the oldest.
    cache.get_or_compile("a").unwrap();
    cache.get_or_compile("c").unwrap();

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn zero_capacity_is_clamped_to_one() {
    let cache = PatternCache::new(0);
    assert_eq!(cache.capacity(), 1);
    cache.get_or_compile("x").unwrap();
    cache.get_or_compile("y").unwrap();
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("y"));
}

#[test]
fn hit_matches_fresh_compile() {
    let cache = PatternCache::new(1);
    let text = "id=12 id=345\nid=6";
    let cached = cache.get_or_compile("id=(\\d+)").unwrap();
    let again = cache.get_or_compile("id=(\\d+)").unwrap();
    let fresh = CompiledPattern::new("id=(\\d+)").unwrap();
    let options = FindOptions::default();
    assert_eq!(
        again.find_all(text, options).unwrap(),
        fresh.find_all(text, options).unwrap()
    );
    assert_eq!(cached.ast(), fresh.ast());
}

#[test]
fn clear_empties_cache() {
    let cache = PatternCache::new(3);
    cache.get_or_compile("a").unwrap();
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn concurrent_callers_share_entries() {
    let cache = Arc::new(PatternCache::new(8));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let pattern = format!("w{}\\d", i % 4);
                for _ in 0..50 {
                    let compiled = cache.get_or_compile(&pattern).unwrap();
                    let text = format!("w{}7", i % 4);
                    let found = compiled.find_all(&text, FindOptions::default()).unwrap();
                    assert_eq!(found.len(), 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let stats = cache.stats();
    assert_eq!(stats.len, 4);
    assert_eq!(stats.hits + stats.misses, 400);
}
