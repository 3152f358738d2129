use thiserror::Error;
use miette::Diagnostic;
use syntaxlink_grammar::ReferenceError;

/// Errors that can occur while building, resolving or linking grammars.
///
/// None of these are recovered from inside the resolver: they propagate to
/// the caller loading the grammar set, which either aborts or drops the
/// grammars named by [`LinkError::scopes`].
#[derive(Debug, Error, Diagnostic, Clone, Hash, PartialEq, Eq)]
pub enum LinkError {
    /// An `include` string did not match any recognized reference form.
    #[error("Malformed reference `{reference}` in `{scope}`: {reason}")]
    #[diagnostic(
        code(syntaxlink_resolve::malformed_reference),
        help("expected one of `#name`, `$self`, `$base`, `scope` or `scope#name`")
    )]
    MalformedReference {
        /// Grammar being built.
        scope: String,
        /// The include string as written.
        reference: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A repository key or grammar scope named by an include does not exist.
    #[error("Unresolved reference: `{reference}` in `{scope}` does not name any pattern group")]
    #[diagnostic(
        code(syntaxlink_resolve::unresolved_reference),
        help("Is `{reference}` defined in the repository or grammar set it refers to?")
    )]
    UnresolvedReference {
        /// Grammar holding the include.
        scope: String,
        /// The include string as written.
        reference: String,
    },

    /// The inter-grammar fixed point stopped making progress: every remaining
    /// include waits on a pattern group that is itself made only of waiting
    /// includes.
    #[error("Unsatisfiable reference cycle between {}", scopes.join(", "))]
    #[diagnostic(
        code(syntaxlink_resolve::unsatisfiable_reference_cycle),
        help("these includes never reach a concrete pattern: {}", references.join("; "))
    )]
    UnsatisfiableReferenceCycle {
        /// Grammars holding stuck includes, sorted.
        scopes: Vec<String>,
        /// Stuck includes as `scope: reference`.
        references: Vec<String>,
    },

    /// Two grammars of one load set share a scope name.
    #[error("Duplicate scope: more than one grammar is named `{scope}`")]
    #[diagnostic(code(syntaxlink_resolve::duplicate_scope))]
    DuplicateScope {
        scope: String,
    },

    /// The linker configuration could not be read.
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(syntaxlink_resolve::invalid_config))]
    InvalidConfig {
        message: String,
    },
}

impl LinkError {
    pub(crate) fn malformed(scope: &str, error: ReferenceError) -> Self {
        match error {
            ReferenceError::Malformed { reference, reason } => LinkError::MalformedReference {
                scope: scope.to_string(),
                reference,
                reason,
            },
        }
    }

    pub(crate) fn unresolved(scope: &str, reference: &str) -> Self {
        LinkError::UnresolvedReference {
            scope: scope.to_string(),
            reference: reference.to_string(),
        }
    }

    /// Grammars this error is attributed to.
    pub fn scopes(&self) -> Vec<&str> {
        match self {
            LinkError::MalformedReference { scope, .. }
            | LinkError::UnresolvedReference { scope, .. }
            | LinkError::DuplicateScope { scope } => vec![scope.as_str()],
            LinkError::UnsatisfiableReferenceCycle { scopes, .. } => {
                scopes.iter().map(String::as_str).collect()
            }
            LinkError::InvalidConfig { .. } => Vec::new(),
        }
    }
}

/// Result type for linking operations.
pub type Result<T> = std::result::Result<T, LinkError>;
