//! Regex parser: converts a pattern string into an AST.
//!
//! Precedence, lowest to highest: alternation, concatenation, quantifier,
//! atom. Errors carry the character index of the offending character and
//! parsing stops at the first one.

use std::collections::BTreeMap;

use crate::ast::*;
use crate::error::{PatternSyntaxError, SyntaxErrorKind};

/// Largest accepted repetition bound in `{n,m}`.
pub const MAX_REPEAT: usize = 1000;

type ParseResult<T> = Result<T, PatternSyntaxError>;

/// Parse `pattern` into an [`Ast`].
pub fn parse(pattern: &str) -> ParseResult<Ast> {
    let mut parser = Parser::new(pattern);
    let root = parser.parse()?;
    Ok(Ast {
        root,
        group_count: parser.group_count,
        group_names: parser.group_names,
    })
}

pub struct Parser {
    chars: Vec<char>,
    pos: usize,
    group_count: usize,
    group_names: BTreeMap<String, usize>,
    /// Backreferences seen so far, with the position of their backslash.
    backrefs: Vec<(usize, usize)>,
}

/// One member of a bracketed class before it is folded into a [`ClassSet`].
enum ClassAtom {
    Char(char),
    Set(ClassSet, char),
}

impl Parser {
    pub fn new(pattern: &str) -> Self {
        Parser {
            chars: pattern.chars().collect(),
            pos: 0,
            group_count: 0,
            group_names: BTreeMap::new(),
            backrefs: Vec::new(),
        }
    }

    /// Parse the full pattern and return an AST node.
    pub fn parse(&mut self) -> ParseResult<AstNode> {
        let node = self.parse_alternation()?;
        if self.pos < self.chars.len() {
            // parse_concat only stops early on ')'.
            return Err(self.error_at(self.pos, SyntaxErrorKind::UnmatchedCloseParen));
        }
        // Forward references are legal, so group indices are checked last.
        if let Some(&(index, position)) =
            self.backrefs.iter().find(|(index, _)| *index > self.group_count)
        {
            return Err(self.error_at(position, SyntaxErrorKind::UndefinedGroup(index)));
        }
        Ok(node)
    }

    fn error_at(&self, position: usize, kind: SyntaxErrorKind) -> PatternSyntaxError {
        PatternSyntaxError::new(position, kind)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Parse alternation: `a|b|c`
    fn parse_alternation(&mut self) -> ParseResult<AstNode> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.advance();
            branches.push(self.parse_concat()?);
        }
        match branches.len() {
            1 => Ok(branches.swap_remove(0)),
            _ => Ok(AstNode::Alternation(branches)),
        }
    }

    /// Parse concatenation: `abc`
    fn parse_concat(&mut self) -> ParseResult<AstNode> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            nodes.push(self.parse_quantified()?);
        }
        match nodes.len() {
            1 => Ok(nodes.swap_remove(0)),
            _ => Ok(AstNode::Concat(nodes)),
        }
    }

    /// Parse an atom possibly followed by a quantifier.
    fn parse_quantified(&mut self) -> ParseResult<AstNode> {
        let node = self.parse_atom()?;
        let quant_pos = self.pos;
        let Some((min, max)) = self.parse_quantifier_suffix()? else {
            return Ok(node);
        };
        if !node.is_repeatable() {
            return Err(self.error_at(quant_pos, SyntaxErrorKind::NothingToRepeat));
        }
        // `a*?`, `a+*`, `a{2}{3}`: lazy and possessive forms are not supported.
        let next_pos = self.pos;
        if self.parse_quantifier_suffix()?.is_some() {
            return Err(self.error_at(next_pos, SyntaxErrorKind::RepeatedQuantifier));
        }
        Ok(AstNode::Quantifier {
            node: Box::new(node),
            min,
            max,
            greedy: true,
        })
    }

    /// Consume a quantifier at the cursor, if there is one.
    fn parse_quantifier_suffix(&mut self) -> ParseResult<Option<(usize, Option<usize>)>> {
        let bounds = match self.peek() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => return self.parse_brace_quantifier(),
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(bounds))
    }

    /// Parse `{n}`, `{n,}`, `{,m}`, `{n,m}`. Anything else leaves the cursor
    /// on the `{`, which is then read as a literal.
    fn parse_brace_quantifier(&mut self) -> ParseResult<Option<(usize, Option<usize>)>> {
        let save_pos = self.pos;
        self.advance(); // consume '{'

        let min = self.parse_number();
        let has_comma = self.peek() == Some(',');
        let max = if has_comma {
            self.advance();
            self.parse_number()
        } else {
            min
        };
        if self.peek() != Some('}') || (min.is_none() && !has_comma) {
            self.pos = save_pos;
            return Ok(None);
        }
        self.advance(); // consume '}'

        let min = min.unwrap_or(0);
        for bound in std::iter::once(min).chain(max) {
            if bound > MAX_REPEAT {
                return Err(self.error_at(
                    save_pos,
                    SyntaxErrorKind::BoundTooLarge { limit: MAX_REPEAT },
                ));
            }
        }
        if let Some(max) = max {
            if min > max {
                return Err(self.error_at(save_pos, SyntaxErrorKind::InvalidBounds { min, max }));
            }
        }
        Ok(Some((min, max)))
    }

    /// Read a run of decimal digits. Values that overflow saturate so the
    /// bound check reports them as too large.
    fn parse_number(&mut self) -> Option<usize> {
        let mut value: Option<usize> = None;
        while let Some(digit) = self.peek().and_then(|ch| ch.to_digit(10)) {
            self.advance();
            let acc = value.unwrap_or(0);
            value = Some(acc.saturating_mul(10).saturating_add(digit as usize));
        }
        value
    }

    /// Parse a single atom (literal, class, group, anchor, etc.)
    fn parse_atom(&mut self) -> ParseResult<AstNode> {
        let start = self.pos;
        match self.peek() {
            None => Err(self.error_at(start, SyntaxErrorKind::NothingToRepeat)),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_char_class(),
            Some('\\') => self.parse_escape(),
            Some('*' | '+' | '?') => Err(self.error_at(start, SyntaxErrorKind::NothingToRepeat)),
            Some('{') => {
                if self.parse_brace_quantifier()?.is_some() {
                    return Err(self.error_at(start, SyntaxErrorKind::NothingToRepeat));
                }
                self.advance();
                Ok(AstNode::Literal('{'))
            }
            Some('.') => {
                self.advance();
                Ok(AstNode::AnyChar)
            }
            Some('^') => {
                self.advance();
                Ok(AstNode::Anchor(AnchorKind::StartOfLine))
            }
            Some('$') => {
                self.advance();
                Ok(AstNode::Anchor(AnchorKind::EndOfLine))
            }
            Some(ch) => {
                self.advance();
                Ok(AstNode::Literal(ch))
            }
        }
    }

    /// Parse an escape sequence outside a character class.
    fn parse_escape(&mut self) -> ParseResult<AstNode> {
        let start = self.pos;
        self.advance(); // consume '\\'
        let Some(ch) = self.advance() else {
            return Err(self.error_at(start, SyntaxErrorKind::DanglingEscape));
        };
        if let Some((kind, negated)) = shorthand(ch) {
            return Ok(AstNode::CharClass {
                set: kind.set(),
                negated,
            });
        }
        if ch.is_ascii_digit() && ch != '0' {
            let mut index = ch as usize - '0' as usize;
            while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
                self.advance();
                index = index.saturating_mul(10).saturating_add(digit as usize);
            }
            self.backrefs.push((index, start));
            return Ok(AstNode::Backreference(index));
        }
        match control_escape(ch) {
            Some(lit) => Ok(AstNode::Literal(lit)),
            None if ch.is_ascii_alphabetic() => {
                Err(self.error_at(start, SyntaxErrorKind::UnsupportedEscape(ch)))
            }
            // Escaped literal: \., \*, \\, etc.
            None => Ok(AstNode::Literal(ch)),
        }
    }

    /// Parse a group: `(...)`, `(?:...)`, `(?<name>...)`, `(?P<name>...)`.
    fn parse_group(&mut self) -> ParseResult<AstNode> {
        let open = self.pos;
        self.advance(); // consume '('

        let index = if self.peek() == Some('?') {
            self.advance(); // consume '?'
            match (self.peek(), self.peek_at(1)) {
                (Some(':'), _) => {
                    self.advance();
                    None
                }
                (Some('P'), Some('<')) => {
                    self.pos += 2;
                    Some(self.parse_group_name()?)
                }
                (Some('<'), next) if !matches!(next, Some('=' | '!')) => {
                    self.advance();
                    Some(self.parse_group_name()?)
                }
                _ => return Err(self.error_at(open, SyntaxErrorKind::UnsupportedGroup)),
            }
        } else {
            self.group_count += 1;
            Some(self.group_count)
        };

        let node = self.parse_alternation()?;
        if self.advance() != Some(')') {
            return Err(self.error_at(open, SyntaxErrorKind::UnmatchedOpenParen));
        }
        Ok(AstNode::Group {
            index,
            node: Box::new(node),
        })
    }

    /// Parse `name>` after `(?<` and allocate the group index.
    fn parse_group_name(&mut self) -> ParseResult<usize> {
        let start = self.pos;
        let mut name = String::new();
        loop {
            match self.advance() {
                Some('>') => break,
                Some(ch) if ch == '_' || ch.is_alphanumeric() => name.push(ch),
                _ => return Err(self.error_at(start, SyntaxErrorKind::InvalidGroupName)),
            }
        }
        let valid_start = name.chars().next().is_some_and(|ch| ch == '_' || ch.is_alphabetic());
        if !valid_start {
            return Err(self.error_at(start, SyntaxErrorKind::InvalidGroupName));
        }
        if self.group_names.contains_key(&name) {
            return Err(self.error_at(start, SyntaxErrorKind::DuplicateGroupName(name)));
        }
        self.group_count += 1;
        self.group_names.insert(name, self.group_count);
        Ok(self.group_count)
    }

    /// Parse a character class: `[abc]`, `[a-z]`, `[^abc]`, `[\d_]`.
    fn parse_char_class(&mut self) -> ParseResult<AstNode> {
        let open = self.pos;
        self.advance(); // consume '['
        let negated = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };

        let mut set = ClassSet::new();
        loop {
            let item_pos = self.pos;
            let lo = match self.peek() {
                None => return Err(self.error_at(open, SyntaxErrorKind::UnterminatedClass)),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(_) => self.parse_class_atom()?,
            };
            let lo = match lo {
                ClassAtom::Set(members, _) => {
                    set.union(&members);
                    continue;
                }
                ClassAtom::Char(ch) => ch,
            };
            // A '-' right before ']' is a literal.
            if self.peek() == Some('-') && !matches!(self.peek_at(1), None | Some(']')) {
                self.advance(); // consume '-'
                let hi = match self.parse_class_atom()? {
                    ClassAtom::Char(ch) => ch,
                    ClassAtom::Set(_, letter) => {
                        return Err(
                            self.error_at(item_pos, SyntaxErrorKind::ShorthandInRange(letter))
                        );
                    }
                };
                if lo > hi {
                    return Err(self.error_at(
                        item_pos,
                        SyntaxErrorKind::InvalidClassRange { start: lo, end: hi },
                    ));
                }
                set.push(lo, hi);
            } else {
                set.push(lo, lo);
            }
        }

        if set.is_empty() {
            return Err(self.error_at(open, SyntaxErrorKind::EmptyClass));
        }
        Ok(AstNode::CharClass { set, negated })
    }

    /// Parse one class member: a character, an escaped character or a
    /// shorthand class.
    fn parse_class_atom(&mut self) -> ParseResult<ClassAtom> {
        let start = self.pos;
        match self.advance() {
            Some('\\') => {
                let Some(ch) = self.advance() else {
                    return Err(self.error_at(start, SyntaxErrorKind::DanglingEscape));
                };
                if let Some((kind, negated)) = shorthand(ch) {
                    let members = if negated { kind.set().complement() } else { kind.set() };
                    return Ok(ClassAtom::Set(members, ch));
                }
                match (ch, control_escape(ch)) {
                    ('b', _) => Ok(ClassAtom::Char('\u{8}')),
                    (_, Some(lit)) => Ok(ClassAtom::Char(lit)),
                    (ch, None) if ch.is_ascii_alphanumeric() => {
                        Err(self.error_at(start, SyntaxErrorKind::UnsupportedEscape(ch)))
                    }
                    (ch, None) => Ok(ClassAtom::Char(ch)),
                }
            }
            Some(ch) => Ok(ClassAtom::Char(ch)),
            None => Err(self.error_at(start, SyntaxErrorKind::UnterminatedClass)),
        }
    }
}

/// `\d`, `\w`, `\s` and their negated upper-case forms.
fn shorthand(ch: char) -> Option<(ShorthandKind, bool)> {
    match ch {
        'd' => Some((ShorthandKind::Digit, false)),
        'D' => Some((ShorthandKind::Digit, true)),
        'w' => Some((ShorthandKind::Word, false)),
        'W' => Some((ShorthandKind::Word, true)),
        's' => Some((ShorthandKind::Space, false)),
        'S' => Some((ShorthandKind::Space, true)),
        _ => None,
    }
}

fn control_escape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'f' => Some('\u{c}'),
        'v' => Some('\u{b}'),
        '0' => Some('\0'),
        _ => None,
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
