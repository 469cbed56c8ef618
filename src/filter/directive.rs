//! Classification of conditional-compilation directives and selector conditions

use super::Dimensionality;

/// Identifier used by the sources this tool was written for
pub const DEFAULT_SELECTOR: &str = "NDIMS";

/// A conditional-compilation directive recognized on a single line
///
/// Only the directives that open, branch or close a block are represented.
/// Everything else (`#define`, `#include`, `#pragma`, plain code) classifies as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `#if`, `#ifdef`, `#ifndef` with the text of their condition
    Open(&'a str),
    /// `#elif`, `#elifdef`, `#elifndef` with the text of their condition
    ElseIf(&'a str),
    /// `#else`
    Else,
    /// `#endif`
    EndIf,
}

impl<'a> Directive<'a> {
    /// Classify a line of source text
    ///
    /// Leading whitespace and whitespace between `#` and the keyword are accepted,
    /// matching what a C preprocessor accepts.
    ///
    /// ```
    /// use ndims_extract::filter::Directive;
    ///
    /// assert_eq!(Directive::parse("  # if NDIMS == 2\n"), Some(Directive::Open("NDIMS == 2")));
    /// assert_eq!(Directive::parse("#endif // NDIMS"), Some(Directive::EndIf));
    /// assert_eq!(Directive::parse("#include \"domain.h\""), None);
    /// ```
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.trim_start().strip_prefix('#')?.trim_start();
        let keyword_len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        let (keyword, condition) = rest.split_at(keyword_len);
        let condition = condition.trim();

        match keyword {
            "if" | "ifdef" | "ifndef" => Some(Directive::Open(condition)),
            "elif" | "elifdef" | "elifndef" => Some(Directive::ElseIf(condition)),
            "else" => Some(Directive::Else),
            "endif" => Some(Directive::EndIf),
            _ => None,
        }
    }
}

/// How a directive condition relates to the selector identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMatch {
    /// The selector identifier does not occur in the condition
    Absent,
    /// The selector occurs, but not as `SELECTOR == 2` or `SELECTOR == 3`
    Mentioned,
    /// The condition selects exactly one dimensionality
    Branch(Dimensionality),
    /// The condition compares the selector against both 2 and 3
    Ambiguous,
}

/// The macro identifier that chooses the compile-time dimensionality
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    name: String,
}

impl Selector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify a directive condition against this selector
    ///
    /// The identifier must stand as a whole word and the comparison is
    /// insensitive to whitespace around `==`, so `NDIMS==2`, `NDIMS == 2` and
    /// `(NDIMS  ==  2)` all select 2D while `NDIMS==20` and `XNDIMS==2` do not.
    pub fn classify(&self, condition: &str) -> SelectorMatch {
        let mut mentioned = false;
        let mut two = false;
        let mut three = false;

        for rest in self.occurrences(condition) {
            mentioned = true;
            match compared_value(rest) {
                Some(Dimensionality::Two) => two = true,
                Some(Dimensionality::Three) => three = true,
                None => {}
            }
        }

        match (mentioned, two, three) {
            (false, _, _) => SelectorMatch::Absent,
            (true, true, true) => SelectorMatch::Ambiguous,
            (true, true, false) => SelectorMatch::Branch(Dimensionality::Two),
            (true, false, true) => SelectorMatch::Branch(Dimensionality::Three),
            (true, false, false) => SelectorMatch::Mentioned,
        }
    }

    /// Text following each whole-word occurrence of the identifier
    fn occurrences<'c>(&'c self, condition: &'c str) -> impl Iterator<Item = &'c str> + 'c {
        condition
            .match_indices(self.name.as_str())
            .filter_map(move |(start, matched)| {
                let end = start + matched.len();
                let clear_before = condition[..start]
                    .chars()
                    .next_back()
                    .is_none_or(|c| !is_ident_char(c));
                let rest = &condition[end..];
                let clear_after = rest.chars().next().is_none_or(|c| !is_ident_char(c));
                (clear_before && clear_after).then_some(rest)
            })
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTOR)
    }
}

/// Value on the right of `== <literal>` directly after the identifier
fn compared_value(rest: &str) -> Option<Dimensionality> {
    let rest = rest.trim_start().strip_prefix("==")?.trim_start();
    let literal_len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
    rest[..literal_len].parse().ok()
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
