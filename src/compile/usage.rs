use std::collections::BTreeSet;

use crate::expr::Builtin;

/// Distinct builtins referenced during one run. Append-only; iterates in
/// name order so import emission is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolUsage {
    used: BTreeSet<Builtin>,
}

impl SymbolUsage {
    pub fn new() -> Self { Self::default() }

    pub fn record(&mut self, builtin: Builtin) {
        self.used.insert(builtin);
    }

    pub fn iter(&self) -> impl Iterator<Item = Builtin> + '_ {
        self.used.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Builtin::name).collect()
    }

    pub fn len(&self) -> usize { self.used.len() }
    pub fn is_empty(&self) -> bool { self.used.is_empty() }
}
