use thiserror::Error;

/// Structural violations that stop a specialization run
///
/// Every variant records the 1-based line number and the text of the offending line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("line {line}: #endif without matching #if: `{text}`")]
    UnbalancedEndif { line: usize, text: String },

    #[error("line {line}: #else without matching #if: `{text}`")]
    UnbalancedElse { line: usize, text: String },

    #[error("line {line}: #elif without matching #if: `{text}`")]
    UnbalancedElseIf { line: usize, text: String },

    #[error("line {line}: {depth} conditional block(s) still open at end of input, outermost opened here: `{text}`")]
    UnclosedConditional { line: usize, text: String, depth: usize },

    #[error("line {line}: selector block opened inside the selector block from line {outer}: `{text}`")]
    NestedSelectorBlock { line: usize, text: String, outer: usize },

    #[error("line {line}: #elif at the level of a selector block does not test the selector: `{text}`")]
    ElseIfWithoutSelector { line: usize, text: String },

    #[error("line {line}: selector condition is neither `== 2` nor `== 3`: `{text}`")]
    UnsupportedSelectorCondition { line: usize, text: String },

    #[error("line {line}: condition selects both 2D and 3D: `{text}`")]
    AmbiguousSelector { line: usize, text: String },
}

impl FilterError {
    /// Line number (1-based) the violation was detected on
    pub fn line(&self) -> usize {
        match self {
            FilterError::UnbalancedEndif { line, .. }
            | FilterError::UnbalancedElse { line, .. }
            | FilterError::UnbalancedElseIf { line, .. }
            | FilterError::UnclosedConditional { line, .. }
            | FilterError::NestedSelectorBlock { line, .. }
            | FilterError::ElseIfWithoutSelector { line, .. }
            | FilterError::UnsupportedSelectorCondition { line, .. }
            | FilterError::AmbiguousSelector { line, .. } => *line,
        }
    }

    /// Text of the offending line, without its terminator
    pub fn text(&self) -> &str {
        match self {
            FilterError::UnbalancedEndif { text, .. }
            | FilterError::UnbalancedElse { text, .. }
            | FilterError::UnbalancedElseIf { text, .. }
            | FilterError::UnclosedConditional { text, .. }
            | FilterError::NestedSelectorBlock { text, .. }
            | FilterError::ElseIfWithoutSelector { text, .. }
            | FilterError::UnsupportedSelectorCondition { text, .. }
            | FilterError::AmbiguousSelector { text, .. } => text,
        }
    }
}

/// Rejected target dimensionality
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dimensionality must be 2 or 3, got `{0}`")]
pub struct ParseDimensionalityError(pub String);
