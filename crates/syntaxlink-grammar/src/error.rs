use thiserror::Error;
use miette::Diagnostic;

/// Errors raised while interpreting the raw data of a grammar.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq, Hash)]
pub enum ReferenceError {
    /// The `include` string does not match any recognized reference form.
    #[error("Malformed reference `{reference}`: {reason}")]
    #[diagnostic(
        code(syntaxlink_grammar::malformed_reference),
        help("expected one of `#name`, `$self`, `$base`, `scope` or `scope#name`")
    )]
    Malformed {
        /// The include string as it appeared in the raw record.
        reference: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ReferenceError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        ReferenceError::Malformed {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}
