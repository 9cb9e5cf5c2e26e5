//! Collision-free synthetic identifiers.

use tracing::trace;

use crate::scope::{ScopeId, ScopeTree};

/// Names that generated identifiers must never shadow.
pub const RESERVED_NAMES: &[&str] = &[
    "arguments",
    "eval",
    "exports",
    "module",
    "require",
    "undefined",
    "__dirname",
    "__filename",
];

const DEFAULT_STEM: &str = "ref";

/// Lowercase, drop characters that cannot appear in an identifier, then drop
/// leading underscores and trailing digits so that suffixing stays readable.
fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    let trimmed = cleaned
        .trim_start_matches('_')
        .trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() || trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        DEFAULT_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

impl ScopeTree {
    /// Whether `name` is unavailable for a new binding created in `scope`.
    ///
    /// A name is taken when it is reserved, declared in `scope` or any
    /// ancestor, previously generated anywhere in the unit, or referenced
    /// anywhere in the unit (a free reference to a global would otherwise be
    /// captured, and so would a reference inside a nested scope).
    pub fn is_name_taken(&self, scope: ScopeId, name: &str) -> bool {
        RESERVED_NAMES.contains(&name)
            || self.generated_names.contains(name)
            || self.referenced_names.contains(name)
            || self.get_binding(scope, name).is_some()
            || self.scopes().any(|s| s.has_own(name))
    }

    /// Generate an identifier that collides with nothing visible from
    /// `scope`, and record it so later calls never return it again.
    ///
    /// The result is `_<stem>`, then `_<stem>1`, `_<stem>2`, ... where the
    /// stem comes from `hint` (default `ref`). The sequence is deterministic
    /// for a given tree and call order.
    pub fn generate_uid(&mut self, scope: ScopeId, hint: Option<&str>) -> String {
        let stem = sanitize_hint(hint.unwrap_or(DEFAULT_STEM));
        let base = format!("_{stem}");
        let mut name = base.clone();
        let mut suffix = 0u32;
        while self.is_name_taken(scope, &name) {
            suffix += 1;
            name = format!("{base}{suffix}");
        }

        self.generated_names.insert(name.clone());
        if let Some(scope_ref) = self.scope_mut(scope) {
            scope_ref.generated.insert(name.clone());
        }
        trace!(scope = scope.0, name = %name, "generated uid");
        name
    }
}

#[cfg(test)]
#[path = "../tests/uid.rs"]
mod tests;
