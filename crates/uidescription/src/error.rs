//! Error types for parsing, expression evaluation and storing view lists.
//!
//! Lookups that simply miss never produce errors; they return `None` or `-1`.

use core::str::Utf8Error;
use std::io;
use std::string::FromUtf8Error;

use quick_xml::encoding::EncodingError;
use quick_xml::events::attributes::AttrError;

/// Why a description document could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("utf8 error: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("unknown entity &{0};")]
    UnknownEntity(String),

    #[error("unexpected element <{element}>")]
    Stopped { element: String },

    #[error("document ended inside <{0}>")]
    Unterminated(String),

    #[error("document has no root element")]
    Empty,
}

/// Why an expression has no value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("operator without operand")]
    MisplacedOperator,

    #[error("expression nesting too deep")]
    RecursionLimit,
}

/// Why a view list could not be written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no views to store")]
    NoViews,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("utf8 error: {0}")]
    Utf8(#[from] FromUtf8Error),
}
