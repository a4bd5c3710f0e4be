/// Options passed in for one translation run. Consulted by a handful
/// of method-deduction rules and otherwise carried through opaquely.
#[derive(Debug, Copy, Clone, Default)]
pub struct FinderOptions {
    pub legacy_predicate_forms: LegacyPredicateFormsOption,
}

impl FinderOptions {
    pub fn new(legacy_predicate_forms: LegacyPredicateFormsOption) -> Self {
        FinderOptions {
            legacy_predicate_forms,
        }
    }
}

/// Whether the legacy client-predicate helpers (Inject, StringIn) are
/// still recognized as translatable.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LegacyPredicateFormsOption {
    Enabled,
    #[default]
    Disabled,
}
