//! Opaque module identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one module within a bundle.
///
/// Assigned by the external module resolver; the engine only formats it into
/// generated names (`__m$<id>$name`) and compares it for equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u32);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
