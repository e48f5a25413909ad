//! Typed call descriptions
//!
//! A [`CallDescription`] names the target program, the method, the
//! method's declared parameter kinds, and the ordered argument values.
//! Kind matching is shallow: a composite value is an ordered sequence of
//! nested values, each carrying its own tag.

use serde::{Deserialize, Serialize};

/// Argument kind in a method's declared signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    Integer,
    String,
    Bytes,
    Composite,
}

/// A single typed argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Integer(i64),
    String(String),
    Bytes(Vec<u8>),
    Composite(Vec<ArgValue>),
}

impl ArgValue {
    /// The kind this value satisfies
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Integer(_) => ArgKind::Integer,
            Self::String(_) => ArgKind::String,
            Self::Bytes(_) => ArgKind::Bytes,
            Self::Composite(_) => ArgKind::Composite,
        }
    }
}

/// Description of one remote call, consumed by the instruction builder
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescription {
    /// Target program identifier (base58; validated at build time)
    pub program_id: String,

    /// Method name; must be non-empty
    pub method: String,

    /// Declared parameter kinds, in order
    pub params: Vec<ArgKind>,

    /// Argument values, in order; must match `params`
    pub args: Vec<ArgValue>,
}

impl CallDescription {
    pub fn new(
        program_id: impl Into<String>,
        method: impl Into<String>,
        params: Vec<ArgKind>,
        args: Vec<ArgValue>,
    ) -> Self {
        Self {
            program_id: program_id.into(),
            method: method.into(),
            params,
            args,
        }
    }

    /// A call taking no arguments (e.g. a program's `initialize` method)
    pub fn no_args(program_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(program_id, method, Vec::new(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(ArgValue::Integer(-3).kind(), ArgKind::Integer);
        assert_eq!(ArgValue::String("hi".into()).kind(), ArgKind::String);
        assert_eq!(ArgValue::Bytes(vec![1, 2]).kind(), ArgKind::Bytes);
        assert_eq!(
            ArgValue::Composite(vec![ArgValue::Integer(1)]).kind(),
            ArgKind::Composite
        );
    }

    #[test]
    fn test_no_args_constructor() {
        let call = CallDescription::no_args("SomeProgram", "initialize");
        assert_eq!(call.method, "initialize");
        assert!(call.params.is_empty());
        assert!(call.args.is_empty());
    }
}
