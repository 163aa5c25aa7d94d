//! Match finder: drives the matcher across multi-line text.
//!
//! Text is split into lines (terminators stripped) so `^` and `$` act per
//! line. Each line is scanned left to right; after a match the scan resumes
//! at its end, or one character later for an empty match. Results are
//! non-overlapping and in document order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{BudgetPolicy, EngineConfig, OffsetMode};
use crate::error::ResourceExceeded;
use crate::pattern::CompiledPattern;
use crate::vm::{Machine, MatchResult};

/// A captured span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// One match. Offsets are byte offsets, absolute or line-relative depending
/// on [`FindOptions::offsets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    /// Zero-based line number the match was found on.
    pub line: usize,
    /// The matched text.
    pub text: String,
    /// Capture groups indexed by group number; slot 0 is the whole match.
    pub groups: Vec<Option<Capture>>,
    #[serde(skip)]
    names: Arc<BTreeMap<String, usize>>,
}

impl Match {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Capture group `index`, or `None` if it did not participate.
    pub fn group(&self, index: usize) -> Option<&Capture> {
        self.groups.get(index)?.as_ref()
    }

    /// Named capture group.
    pub fn name(&self, name: &str) -> Option<&Capture> {
        self.group(*self.names.get(name)?)
    }
}

/// Per-scan settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub step_budget: u64,
    pub offsets: OffsetMode,
    pub on_budget_exceeded: BudgetPolicy,
}

impl Default for FindOptions {
    fn default() -> Self {
        FindOptions::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for FindOptions {
    fn from(config: &EngineConfig) -> Self {
        FindOptions {
            step_budget: config.step_budget,
            offsets: config.offsets,
            on_budget_exceeded: config.on_budget_exceeded,
        }
    }
}

/// One line of the input, without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'t> {
    pub number: usize,
    /// Byte offset of the line in the whole text.
    pub offset: usize,
    pub text: &'t str,
}

/// Split text on `\n` and `\r\n`. A trailing terminator does not start an
/// extra line, but empty text is one empty line.
pub fn lines(text: &str) -> Lines<'_> {
    Lines {
        text,
        pos: 0,
        number: 0,
        done: false,
    }
}

pub struct Lines<'t> {
    text: &'t str,
    pos: usize,
    number: usize,
    done: bool,
}

impl<'t> Iterator for Lines<'t> {
    type Item = Line<'t>;

    fn next(&mut self) -> Option<Line<'t>> {
        if self.done {
            return None;
        }
        let rest = &self.text[self.pos..];
        let (body, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        let body = body.strip_suffix('\r').unwrap_or(body);
        let line = Line {
            number: self.number,
            offset: self.pos,
            text: body,
        };
        self.pos += consumed;
        self.number += 1;
        if self.pos >= self.text.len() {
            self.done = true;
        }
        Some(line)
    }
}

/// Scan state for the line currently being matched.
struct LineScan<'t> {
    line: Line<'t>,
    chars: Vec<char>,
    /// Byte offset of each char in the line, plus the line length.
    offsets: Vec<usize>,
    cursor: usize,
}

impl<'t> LineScan<'t> {
    fn new(line: Line<'t>) -> Self {
        let chars: Vec<char> = line.text.chars().collect();
        let offsets = line
            .text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(line.text.len()))
            .collect();
        LineScan {
            line,
            chars,
            offsets,
            cursor: 0,
        }
    }

    /// Next position at or after the cursor where `ch` occurs.
    fn seek(&self, ch: char) -> Option<usize> {
        self.chars[self.cursor.min(self.chars.len())..]
            .iter()
            .position(|&c| c == ch)
            .map(|i| self.cursor + i)
    }
}

/// Lazy iterator over the matches of a pattern in a text.
///
/// Yields `Err` only under [`BudgetPolicy::Abort`], and then stops.
pub struct Matches<'p, 't> {
    pattern: &'p CompiledPattern,
    machine: Machine<'p>,
    lines: Lines<'t>,
    current: Option<LineScan<'t>>,
    options: FindOptions,
    done: bool,
}

/// Iterate lazily over the matches of `pattern` in `text`.
pub fn find_iter<'p, 't>(
    pattern: &'p CompiledPattern,
    text: &'t str,
    options: FindOptions,
) -> Matches<'p, 't> {
    Matches {
        pattern,
        machine: Machine::new(pattern.program(), options.step_budget),
        lines: lines(text),
        current: None,
        options,
        done: false,
    }
}

/// Collect every match of `pattern` in `text`.
pub fn find_all(
    pattern: &CompiledPattern,
    text: &str,
    options: FindOptions,
) -> Result<Vec<Match>, ResourceExceeded> {
    find_iter(pattern, text, options).collect()
}

impl<'p, 't> Iterator for Matches<'p, 't> {
    type Item = Result<Match, ResourceExceeded>;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern: &'p CompiledPattern = self.pattern;
        let program = pattern.program();
        loop {
            if self.done {
                return None;
            }
            let Some(scan) = self.current.as_mut() else {
                match self.lines.next() {
                    Some(line) => {
                        tracing::trace!("scanning line {}", line.number);
                        self.current = Some(LineScan::new(line));
                    }
                    None => self.done = true,
                }
                continue;
            };

            if scan.cursor > scan.chars.len() || (program.anchored_start && scan.cursor > 0) {
                self.current = None;
                continue;
            }
            if let Some(first) = program.first_char {
                match scan.seek(first) {
                    Some(at) => scan.cursor = at,
                    None => {
                        self.current = None;
                        continue;
                    }
                }
            }

            match self.machine.match_at(&scan.chars, scan.cursor) {
                Ok(Some(result)) => {
                    scan.cursor = if result.end == result.start {
                        result.end + 1
                    } else {
                        result.end
                    };
                    return Some(Ok(build_match(
                        scan,
                        &result,
                        self.options.offsets,
                        pattern.names(),
                    )));
                }
                Ok(None) => scan.cursor += 1,
                Err(exceeded) => {
                    let exceeded = ResourceExceeded {
                        position: report_offset(scan, exceeded.position, self.options.offsets),
                        ..exceeded
                    };
                    match self.options.on_budget_exceeded {
                        BudgetPolicy::Skip => {
                            tracing::warn!("{exceeded}; skipping");
                            scan.cursor += 1;
                        }
                        BudgetPolicy::Abort => {
                            self.done = true;
                            return Some(Err(exceeded));
                        }
                    }
                }
            }
        }
    }
}

/// Match a single line beginning exactly at byte offset `start`. A `start`
/// that is not on a char boundary never matches.
pub(crate) fn match_line_at(
    pattern: &CompiledPattern,
    line: &str,
    start: usize,
    options: FindOptions,
) -> Result<Option<Match>, ResourceExceeded> {
    let scan = LineScan::new(Line {
        number: 0,
        offset: 0,
        text: line,
    });
    let Ok(char_pos) = scan.offsets.binary_search(&start) else {
        return Ok(None);
    };
    let mut machine = Machine::new(pattern.program(), options.step_budget);
    let result = machine
        .match_at(&scan.chars, char_pos)
        .map_err(|exceeded| ResourceExceeded {
            position: report_offset(&scan, exceeded.position, options.offsets),
            ..exceeded
        })?;
    Ok(result.map(|result| build_match(&scan, &result, options.offsets, pattern.names())))
}

fn report_offset(scan: &LineScan<'_>, char_pos: usize, mode: OffsetMode) -> usize {
    let byte = scan.offsets[char_pos];
    match mode {
        OffsetMode::Absolute => scan.line.offset + byte,
        OffsetMode::Line => byte,
    }
}

fn build_match(
    scan: &LineScan<'_>,
    result: &MatchResult,
    mode: OffsetMode,
    names: &Arc<BTreeMap<String, usize>>,
) -> Match {
    let capture = |(s, e): (usize, usize)| Capture {
        start: report_offset(scan, s, mode),
        end: report_offset(scan, e, mode),
        text: scan.line.text[scan.offsets[s]..scan.offsets[e]].to_string(),
    };
    let groups: Vec<Option<Capture>> = result
        .captures
        .iter()
        .map(|span| span.map(&capture))
        .collect();
    Match {
        start: report_offset(scan, result.start, mode),
        end: report_offset(scan, result.end, mode),
        line: scan.line.number,
        text: scan.line.text[scan.offsets[result.start]..scan.offsets[result.end]].to_string(),
        groups,
        names: Arc::clone(names),
    }
}

#[cfg(test)]
#[path = "finder_tests.rs"]
mod tests;
