use thiserror::Error;

use crate::tree::NodeId;

/// Structural failures raised while decoding IG Script text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Imbalanced parentheses: {message} (input: '{input}')")]
    ImbalancedParentheses { message: String, input: String },

    #[error("Empty leaf value in combination '{fragment}'")]
    EmptyLeaf { fragment: String },

    #[error("Invalid combination expression in the range '{fragment}'")]
    InvalidCombination { fragment: String },

    #[error("Mix of different logical operators on level {level} (expression: '{expression}'); use parentheses to indicate precedence")]
    InvalidOperatorCombination { level: usize, expression: String },

    #[error("Combination in '{fragment}' is not joined to its neighbours by a logical operator and would be ignored")]
    IgnoredElements { fragment: String },

    #[error("Duplicate component entry '{fragment}'; check for repeated components or statements")]
    DuplicateComponentEntry { fragment: String },

    #[error("Logical operator found outside of combination in '{expression}'; check for missing parentheses")]
    LogicalOperatorOutsideCombination { expression: String },

    #[error("Nested statement combination mixes component types: {found}")]
    InvalidTypesInNestedStatementCombination { found: String },

    #[error("Component {component} was not found in input")]
    ComponentNotFound { component: String },

    #[error("Invalid combination of component types (left: {left}, right: {right})")]
    InvalidComponentTypeCombination { left: String, right: String },

    #[error("Component {component} does not support nested statements")]
    NestingOnUnsupportedComponent { component: String },

    #[error("Multiple component pairs on the same level: {pairs}")]
    MultipleComponentPairsOnSameLevel { pairs: String },
}

/// Misuse of the node arena.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0:?} is not a leaf")]
    NotALeaf(NodeId),

    #[error("Cannot combine component {left} with component {right}")]
    IncompatibleComponents { left: String, right: String },

    #[error("Invalid tree structure: {0}")]
    InvalidTree(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("Expansion would produce {rows} rows, exceeding the limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type TreeResult<T> = std::result::Result<T, TreeError>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}

impl From<TreeError> for ParseError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::IncompatibleComponents { left, right } => {
                ParseError::InvalidComponentTypeCombination { left, right }
            }
            other => ParseError::InvalidCombination {
                fragment: other.to_string(),
            },
        }
    }
}
