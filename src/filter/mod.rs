//! Directive filter
//!
//! Specializes the lines of a C source for one dimensionality by resolving the
//! conditional blocks keyed on the selector macro (`NDIMS` by default):
//!
//! ```text
//! a                    a                      a
//! #if NDIMS == 2       b2        target 2     b3        target 3
//! b2             ───▶  c         ◀────────    c         ────────▶
//! #else
//! b3
//! #endif
//! c
//! ```
//!
//! The selector's own `#if`/`#elif`/`#else`/`#endif` lines are dropped, the
//! branch matching the target is kept and the other branch is dropped.
//! Every other line, ordinary conditionals included, passes through verbatim.
//!
//! The filter is a single pass over the lines. Its whole state is a
//! [`FilterState`] owned by one call, so separate files can be filtered
//! concurrently without coordination.

mod directive;
mod error;


use std::fmt;
use std::str::FromStr;

pub use directive::{DEFAULT_SELECTOR, Directive, Selector, SelectorMatch};
pub use error::{FilterError, ParseDimensionalityError};

/// Target dimensionality of a specialization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    Two,
    Three,
}

impl Dimensionality {
    /// Numeric value as written in sources (`2` or `3`)
    pub const fn value(self) -> u8 {
        match self {
            Dimensionality::Two => 2,
            Dimensionality::Three => 3,
        }
    }

    /// The branch taken by an unconditional `#else`
    pub const fn other(self) -> Self {
        match self {
            Dimensionality::Two => Dimensionality::Three,
            Dimensionality::Three => Dimensionality::Two,
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for Dimensionality {
    type Err = ParseDimensionalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" => Ok(Dimensionality::Two),
            "3" => Ok(Dimensionality::Three),
            other => Err(ParseDimensionalityError(other.to_string())),
        }
    }
}

/// Whether the cursor is inside a selector-guarded block, and which branch is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    Outside,
    /// `level` is the nesting level the selector block was opened at
    InBranch { branch: Dimensionality, level: usize },
}

impl SelectorState {
    /// Whether body lines seen in this state are dropped for `target`
    pub fn excludes(self, target: Dimensionality) -> bool {
        matches!(self, SelectorState::InBranch { branch, .. } if branch != target)
    }

    /// Branch level if this is a selector block opened at exactly `nesting`
    fn owns(self, nesting: usize) -> Option<usize> {
        match self {
            SelectorState::InBranch { level, .. } if level == nesting => Some(level),
            _ => None,
        }
    }
}

/// What a line is once its directive, if any, has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRole {
    /// Exists only to express selector branching; never emitted
    Control,
    /// Emitted unless the active branch excludes it
    Body,
}

/// Per-file state carried from one line to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    nesting: usize,
    selector: SelectorState,
    /// Line number and text of the outermost block still open
    outermost: Option<(usize, String)>,
    /// Line number the active selector block was opened on
    selector_opened: usize,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conditional blocks currently open
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn selector(&self) -> SelectorState {
        self.selector
    }

    /// Apply one line to the state and report whether it is a selector-control line
    fn advance(&mut self, selector: &Selector, number: usize, line: &str) -> Result<LineRole, FilterError> {
        let Some(directive) = Directive::parse(line) else {
            return Ok(LineRole::Body);
        };

        match directive {
            Directive::Open(condition) => {
                self.nesting += 1;
                if self.nesting == 1 {
                    self.outermost = Some((number, display_text(line)));
                }

                match selector.classify(condition) {
                    SelectorMatch::Branch(branch) => {
                        if let SelectorState::InBranch { .. } = self.selector {
                            return Err(FilterError::NestedSelectorBlock {
                                line: number,
                                text: display_text(line),
                                outer: self.selector_opened,
                            });
                        }
                        tracing::trace!(line = number, level = self.nesting, "opened {}D branch", branch);
                        self.selector = SelectorState::InBranch { branch, level: self.nesting };
                        self.selector_opened = number;
                        Ok(LineRole::Control)
                    }
                    SelectorMatch::Ambiguous => Err(FilterError::AmbiguousSelector {
                        line: number,
                        text: display_text(line),
                    }),
                    SelectorMatch::Mentioned => {
                        tracing::debug!(line = number, "selector used in an unrecognized condition, keeping verbatim");
                        Ok(LineRole::Body)
                    }
                    SelectorMatch::Absent => Ok(LineRole::Body),
                }
            }
            Directive::Else => {
                if self.nesting == 0 {
                    return Err(FilterError::UnbalancedElse { line: number, text: display_text(line) });
                }
                match self.selector {
                    SelectorState::InBranch { branch, level } if level == self.nesting => {
                        self.selector = SelectorState::InBranch { branch: branch.other(), level };
                        Ok(LineRole::Control)
                    }
                    _ => Ok(LineRole::Body),
                }
            }
            Directive::ElseIf(condition) => {
                if self.nesting == 0 {
                    return Err(FilterError::UnbalancedElseIf { line: number, text: display_text(line) });
                }
                let Some(level) = self.selector.owns(self.nesting) else {
                    return Ok(LineRole::Body);
                };
                match selector.classify(condition) {
                    SelectorMatch::Branch(branch) => {
                        self.selector = SelectorState::InBranch { branch, level };
                        Ok(LineRole::Control)
                    }
                    SelectorMatch::Absent => Err(FilterError::ElseIfWithoutSelector {
                        line: number,
                        text: display_text(line),
                    }),
                    SelectorMatch::Mentioned => Err(FilterError::UnsupportedSelectorCondition {
                        line: number,
                        text: display_text(line),
                    }),
                    SelectorMatch::Ambiguous => Err(FilterError::AmbiguousSelector {
                        line: number,
                        text: display_text(line),
                    }),
                }
            }
            Directive::EndIf => {
                if self.nesting == 0 {
                    return Err(FilterError::UnbalancedEndif { line: number, text: display_text(line) });
                }
                // The closing directive belongs to the level it closes
                let role = if self.selector.owns(self.nesting).is_some() {
                    self.selector = SelectorState::Outside;
                    LineRole::Control
                } else {
                    LineRole::Body
                };
                self.nesting -= 1;
                if self.nesting == 0 {
                    self.outermost = None;
                }
                Ok(role)
            }
        }
    }

    /// Check that every block opened in the input was closed
    fn finish(self) -> Result<(), FilterError> {
        match self.outermost {
            Some((line, text)) if self.nesting > 0 => Err(FilterError::UnclosedConditional {
                line,
                text,
                depth: self.nesting,
            }),
            _ => Ok(()),
        }
    }
}

/// Line text as shown in diagnostics
fn display_text(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_string()
}

/// Resolves selector-guarded conditional blocks for a target dimensionality
#[derive(Debug, Clone, Default)]
pub struct DirectiveFilter {
    selector: Selector,
}

impl DirectiveFilter {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Filter `lines` for `target`, returning the lines to keep in their original order
    ///
    /// The returned lines borrow from the input. An empty result means nothing of
    /// the source survives for this dimensionality.
    ///
    /// ```
    /// use ndims_extract::filter::{Dimensionality, DirectiveFilter};
    ///
    /// let source = ["a", "#if NDIMS==2", "b2", "#else", "b3", "#endif", "c"];
    /// let filter = DirectiveFilter::default();
    /// assert_eq!(filter.filter(source, Dimensionality::Two).unwrap(), ["a", "b2", "c"]);
    /// assert_eq!(filter.filter(source, Dimensionality::Three).unwrap(), ["a", "b3", "c"]);
    /// ```
    pub fn filter<'a, I>(&self, lines: I, target: Dimensionality) -> Result<Vec<&'a str>, FilterError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = FilterState::new();
        let mut kept = Vec::new();

        for (index, line) in lines.into_iter().enumerate() {
            let role = state.advance(&self.selector, index + 1, line)?;
            if role == LineRole::Body && !state.selector.excludes(target) {
                kept.push(line);
            }
        }

        state.finish()?;
        Ok(kept)
    }
}

/// Filter with the default `NDIMS` selector
pub fn filter_lines<'a, I>(lines: I, target: Dimensionality) -> Result<Vec<&'a str>, FilterError>
where
    I: IntoIterator<Item = &'a str>,
{
    DirectiveFilter::default().filter(lines, target)
}
