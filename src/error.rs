//! Error types for resolution, expression evaluation and model mutation.
//!
//! These are the *fatal* failures. Structural findings that should be
//! reported rather than raised live in [`crate::validation`].

use thiserror::Error;

/// Malformed type declaration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeResolutionError {
    #[error("union types are not supported, found {0} non-null members")]
    UnionNotSupported(usize),

    #[error("expected complex object with type field, instead got {0}")]
    MissingTypeField(String),

    #[error("unmatched complex type, expected 'enum', 'array', or 'record', got '{0}'")]
    UnmatchedComplexType(String),

    #[error("expected complex object, array, or string, instead got {0}")]
    UnexpectedShape(String),

    #[error("record fields must be a list, instead got {0}")]
    MalformedFields(String),

    #[error("enum symbols must be a list of strings, instead got {0}")]
    MalformedSymbols(String),

    #[error("invalid items binding: {0}")]
    InvalidItemsBinding(String),
}

/// Failure reported by an expression evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("failed to compile expression `{script}`: {message}")]
    Compile { script: String, message: String },

    #[error("failed to evaluate expression `{script}`: {message}")]
    Evaluate { script: String, message: String },
}

/// Errors raised by parameter, argument and tool models.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error(transparent)]
    Type(#[from] TypeResolutionError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("mismatched value and type definition for {id}: expected {expected} or {items}, but instead got {got}")]
    TypeMismatch {
        id: String,
        expected: String,
        items: String,
        got: String,
    },

    #[error("items can only be set on parameters of type array, type is {0}")]
    ItemsOnNonArray(String),

    #[error("fields can only be added to type or items record: type is {type_}, items is {items}")]
    FieldsOnNonRecord { type_: String, items: String },

    #[error("field with name \"{0}\" already exists")]
    DuplicateField(String),

    #[error("field {0} does not exist on input")]
    MissingField(String),

    #[error("symbols can only be added to type or items enum")]
    SymbolsOnNonEnum,

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("invalid declaration at {loc}: {message}")]
    InvalidDeclaration { loc: String, message: String },
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
