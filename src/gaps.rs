//! Computation of required fields a literal leaves unset.

use std::collections::HashSet;

use crate::structure::StructFields;
use crate::syntax::Element;

/// Shape of a literal's element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralShape {
    /// True when the first element has no key.
    pub positional: bool,
    pub provided_keys: HashSet<String>,
    pub provided_count: usize,
}

impl LiteralShape {
    pub fn from_elements(elements: &[Element]) -> Self {
        let positional = elements.first().map(|e| e.key.is_none()).unwrap_or(false);
        let provided_keys = elements.iter().filter_map(|e| e.key.clone()).collect();

        Self {
            positional,
            provided_keys,
            provided_count: elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.provided_count == 0
    }
}

/// Required fields absent from the literal, in declaration order.
///
/// Positional literals are assumed to fill fields front to back, so the gap
/// is the unfilled suffix. Keyed and empty literals miss every field whose
/// name was not supplied, except optional fields and, when `only_exported`
/// is set, unexported fields that cannot be named from another package.
pub fn skipped_fields(shape: &LiteralShape, fields: &StructFields, only_exported: bool) -> StructFields {
    if !fields.has_required() {
        return StructFields::default();
    }

    if !shape.is_empty() && shape.positional {
        if shape.provided_count == fields.len() {
            return StructFields::default();
        }
        let suffix = fields.0.get(shape.provided_count..).unwrap_or_default();
        return StructFields(suffix.to_vec());
    }

    let missing = fields
        .iter()
        .filter(|f| !shape.provided_keys.contains(&f.name))
        .filter(|f| !f.optional)
        .filter(|f| f.exported || !only_exported)
        .cloned()
        .collect();

    StructFields(missing)
}
