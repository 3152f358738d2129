// Linker orchestrating the passes over one grammar set.

use rustc_hash::FxHashSet;
use syntaxlink_grammar::{PatternArena, RawGrammar};

use crate::config::{FailurePolicy, LinkConfig};
use crate::error::{LinkError, Result};
use crate::global::{resolve_inter_grammar, GlobalReport};
use crate::grammar::Grammar;

/// A grammar removed from the set under [`FailurePolicy::DropGrammar`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedGrammar {
    pub scope: String,
    pub error: LinkError,
}

/// Outcome of [`Linker::link`]: the fully resolved grammars, plus whatever was
/// dropped on the way.
#[derive(Debug, Default)]
pub struct LinkedSet {
    grammars: Vec<Grammar>,
    dropped: Vec<DroppedGrammar>,
    report: GlobalReport,
}

impl LinkedSet {
    pub fn grammars(&self) -> &[Grammar] {
        &self.grammars
    }

    pub fn get(&self, scope: &str) -> Option<&Grammar> {
        self.grammars.iter().find(|g| g.scope_name() == scope)
    }

    pub fn dropped(&self) -> &[DroppedGrammar] {
        &self.dropped
    }

    pub fn report(&self) -> GlobalReport {
        self.report
    }
}

/// Builds and links a set of raw grammars loaded together.
///
/// The linker holds only configuration; the arena and the grammar set are
/// passed in for each run.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    config: LinkConfig,
}

impl Linker {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    /// Runs the complete sequence over `raws`:
    /// 1. **Build** every grammar into `arena`, all includes pending.
    /// 2. **Check scopes**: a scope name may appear once per set.
    /// 3. **Local resolution** of `#name` and `$self` per grammar.
    /// 4. **Inter-grammar resolution** of `$base`, `scope` and `scope#name`
    ///    to a fixed point over the surviving grammars.
    ///
    /// Under [`FailurePolicy::Abort`] the first error is returned. Under
    /// [`FailurePolicy::DropGrammar`] the grammars an error blames are
    /// removed and recorded, and step 4 is retried on the rest. Every grammar
    /// in the returned set is fully resolved.
    pub fn link(&self, arena: &mut PatternArena, raws: &[RawGrammar]) -> Result<LinkedSet> {
        let mut set = LinkedSet::default();

        // --- Pass 1: Build ---
        let mut built = Vec::with_capacity(raws.len());
        for raw in raws {
            match Grammar::build(arena, raw) {
                Ok(grammar) => built.push(grammar),
                Err(error) => self.reject(&mut set, raw.scope_name.clone(), error)?,
            }
        }

        // --- Pass 2: Unique scope names ---
        let mut seen = FxHashSet::default();
        let mut unique = Vec::with_capacity(built.len());
        for grammar in built {
            if seen.insert(grammar.scope_name().to_string()) {
                unique.push(grammar);
            } else {
                let scope = grammar.scope_name().to_string();
                self.reject(&mut set, scope.clone(), LinkError::DuplicateScope { scope })?;
            }
        }

        // --- Pass 3: Local resolution ---
        let mut grammars = Vec::with_capacity(unique.len());
        for grammar in unique {
            match grammar.resolve_local(arena) {
                Ok(()) => grammars.push(grammar),
                Err(error) => self.reject(&mut set, grammar.scope_name().to_string(), error)?,
            }
        }

        // --- Pass 4: Inter-grammar resolution ---
        let base_scope = self.config.base_scope.as_deref();
        loop {
            match resolve_inter_grammar(arena, &grammars, base_scope) {
                Ok(report) => {
                    set.report = report;
                    break;
                }
                Err(error) => {
                    if self.config.on_failure == FailurePolicy::Abort {
                        return Err(error);
                    }
                    let blamed = error.scopes();
                    let (dropped, kept): (Vec<Grammar>, Vec<Grammar>) = grammars
                        .into_iter()
                        .partition(|g| blamed.iter().any(|scope| *scope == g.scope_name()));
                    if dropped.is_empty() {
                        return Err(error);
                    }
                    for grammar in dropped {
                        self.reject(&mut set, grammar.scope_name().to_string(), error.clone())?;
                    }
                    grammars = kept;
                }
            }
        }

        log::debug!(
            "linked {} grammar(s), dropped {}",
            grammars.len(),
            set.dropped.len()
        );
        set.grammars = grammars;
        Ok(set)
    }

    fn reject(&self, set: &mut LinkedSet, scope: String, error: LinkError) -> Result<()> {
        match self.config.on_failure {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::DropGrammar => {
                log::warn!("dropping grammar `{}`: {}", scope, error);
                set.dropped.push(DroppedGrammar { scope, error });
                Ok(())
            }
        }
    }
}
