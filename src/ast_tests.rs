#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn class_set_merges_overlapping_and_adjacent_ranges() {
    let set = ClassSet::from_ranges([('d', 'f'), ('a', 'c'), ('e', 'k'), ('x', 'x')]);
    assert_eq!(set.ranges(), &[('a', 'k'), ('x', 'x')]);
}

#[test]
fn class_set_contains_uses_range_bounds() {
    let set = ShorthandKind::Word.set();
    assert!(set.contains('a'));
    assert!(set.contains('Z'));
    assert!(set.contains('_'));
    assert!(set.contains('7'));
    assert!(!set.contains('-'));
    assert!(!set.contains('é'));
}

#[test]
fn complement_of_digits_covers_everything_else() {
    let not_digits = ShorthandKind::Digit.set().complement();
    assert!(!not_digits.contains('0'));
    assert!(!not_digits.contains('9'));
    assert!(not_digits.contains('/'));
    assert!(not_digits.contains(':'));
    assert!(not_digits.contains('\0'));
    assert!(not_digits.contains(char::MAX));
    assert!(not_digits.contains('\u{E000}'));
}

#[test]
fn complement_of_empty_set_is_every_scalar_value() {
    let all = ClassSet::new().complement();
    assert_eq!(all.ranges(), &[('\0', char::MAX)]);
    assert_eq!(all.complement(), ClassSet::new());
}

#[test]
fn space_shorthand_includes_vertical_tab_and_form_feed() {
    let space = ShorthandKind::Space.set();
    for ch in [' ', '\t', '\n', '\r', '\u{b}', '\u{c}'] {
        assert!(space.contains(ch), "{ch:?}");
    }
    assert!(!space.contains('a'));
}

#[test]
fn anchors_are_not_repeatable() {
    assert!(!AstNode::Anchor(AnchorKind::StartOfLine).is_repeatable());
    assert!(AstNode::Literal('a').is_repeatable());
    assert!(AstNode::AnyChar.is_repeatable());
}
