//! End-to-end properties of compiling and finding through the engine.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use deepgrep_core::{
    CompiledPattern, Engine, EngineConfig, FindOptions, Match, PatternCache, SyntaxErrorKind,
};
use proptest::prelude::*;

fn spans(engine: &Engine, pattern: &str, text: &str) -> Vec<(usize, usize, String)> {
    let compiled = engine.compile(pattern).unwrap();
    engine
        .find_all(&compiled, text)
        .unwrap()
        .into_iter()
        .map(|m| (m.start, m.end, m.text))
        .collect()
}

#[test]
fn bounded_repetition_is_greedy_up_to_max() {
    let engine = Engine::default();
    assert_eq!(
        spans(&engine, "a{2,4}", "aaaaa"),
        vec![(0, 4, "aaaa".to_string())]
    );
    assert!(spans(&engine, "a{2,4}", "a").is_empty());
}

#[test]
fn backreference_repeats_captured_word() {
    let engine = Engine::default();
    let compiled = engine.compile(r"(\w+)\s+\1").unwrap();
    let found = engine.find_all(&compiled, "hello hello").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "hello hello");
    assert_eq!(found[0].group(1).unwrap().text, "hello");
    assert!(engine.find_all(&compiled, "hello world").unwrap().is_empty());
}

#[test]
fn anchors_are_per_line() {
    let engine = Engine::default();
    let texts: Vec<String> = spans(&engine, r"^\d+$", "123\nabc\n456")
        .into_iter()
        .map(|(_, _, text)| text)
        .collect();
    assert_eq!(texts, vec!["123", "456"]);
}

#[test]
fn alternation_prefers_first_branch() {
    let engine = Engine::default();
    assert_eq!(
        spans(&engine, "cat|catalog", "catalog"),
        vec![(0, 3, "cat".to_string())]
    );
}

#[test]
fn empty_matches_at_every_offset() {
    let engine = Engine::default();
    let offsets: Vec<(usize, usize)> = spans(&engine, "a*", "bbb")
        .into_iter()
        .map(|(start, end, _)| (start, end))
        .collect();
    assert_eq!(offsets, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}

#[test]
fn unmatched_paren_is_reported_at_paren() {
    let engine = Engine::default();
    let err = engine.compile("(abc").unwrap_err();
    assert_eq!(err.position, 0);
    assert_eq!(err.kind, SyntaxErrorKind::UnmatchedOpenParen);
}

#[test]
fn engine_capacity_bounds_cache() {
    let engine = Engine::new(EngineConfig {
        cache_capacity: 2,
        ..EngineConfig::default()
    })
    .unwrap();
    for pattern in ["a", "b", "c", "a"] {
        engine.compile(pattern).unwrap();
    }
    let stats = engine.cache().stats();
    assert_eq!(stats.len, 2);
    assert_eq!(stats.misses, 4);
    assert_eq!(stats.evictions, 2);
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "a+",
        "[ab]*c",
        r"(\w+)\s+\1",
        "^x|y$",
        "a{1,3}b?",
        r"(?:ab|a)(b*)",
        r"\d{2}",
        ".",
        "(a|b)*",
    ])
    .prop_map(str::to_string)
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[abcxy 0-9\n]{0,40}"
}

fn strip(found: Vec<Match>) -> Vec<(usize, usize, usize, String)> {
    found
        .into_iter()
        .map(|m| (m.start, m.end, m.line, m.text))
        .collect()
}

proptest! {
    #[test]
    fn cache_hit_matches_fresh_compile(pattern in pattern_strategy(), text in text_strategy()) {
        let cache = PatternCache::new(1);
        cache.get_or_compile(&pattern).unwrap();
        let cached = cache.get_or_compile(&pattern).unwrap();
        let fresh = CompiledPattern::new(&pattern).unwrap();
        let options = FindOptions::default();
        prop_assert_eq!(
            cached.find_all(&text, options).unwrap(),
            fresh.find_all(&text, options).unwrap()
        );
    }

    #[test]
    fn find_all_is_idempotent(pattern in pattern_strategy(), text in text_strategy()) {
        let engine = Engine::default();
        let compiled = engine.compile(&pattern).unwrap();
        let first = strip(engine.find_all(&compiled, &text).unwrap());
        let second = strip(engine.find_all(&compiled, &text).unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn matches_are_ordered_and_disjoint(pattern in pattern_strategy(), text in text_strategy()) {
        let engine = Engine::default();
        let compiled = engine.compile(&pattern).unwrap();
        let found = engine.find_all(&compiled, &text).unwrap();
        for pair in found.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
            prop_assert!(pair[0].start < pair[1].start);
        }
        for m in &found {
            prop_assert_eq!(&text[m.start..m.end], m.text.as_str());
            prop_assert!(!m.text.contains('\n'));
        }
    }

    #[test]
    fn literal_text_matches_itself(word in "[a-z]{1,12}") {
        let engine = Engine::default();
        let found = engine.find_matches(&word, &word).unwrap();
        prop_assert_eq!(found, vec![word]);
    }
}
