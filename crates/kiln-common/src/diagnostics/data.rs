//! Diagnostic message table.
//!
//! Codes in the 9000 range belong to the transform engine: 90xx scope
//! analysis, 91xx language-feature lowering, 92xx bundling.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const DUPLICATE_DECLARATION: u32 = 9001;
    pub const CONST_ENUM_NOT_SUPPORTED: u32 = 9101;
    pub const AMBIENT_ENUM_ELIDED: u32 = 9102;
    pub const NON_CONSTANT_ENUM_INITIALIZER: u32 = 9103;
    pub const UNRESOLVED_BUNDLE_IMPORT: u32 = 9201;
    pub const EXPORT_STAR_NOT_BUNDLED: u32 = 9202;
}

pub mod diagnostic_messages {
    pub const DUPLICATE_DECLARATION: &str = "Identifier '{0}' has already been declared.";
    pub const CONST_ENUM_NOT_SUPPORTED: &str =
        "'const enum' declarations are not supported; '{0}' was left untransformed.";
    pub const AMBIENT_ENUM_ELIDED: &str =
        "Ambient enum '{0}' has no runtime value and was removed.";
    pub const NON_CONSTANT_ENUM_INITIALIZER: &str =
        "Initializer of enum member '{0}.{1}' is not a constant expression; its value is computed at runtime.";
    pub const UNRESOLVED_BUNDLE_IMPORT: &str =
        "Cannot resolve module '{0}' while bundling; the import was kept.";
    pub const EXPORT_STAR_NOT_BUNDLED: &str =
        "'export * from \"{0}\"' cannot be expressed in a bundle and was removed.";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_DECLARATION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DUPLICATE_DECLARATION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONST_ENUM_NOT_SUPPORTED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CONST_ENUM_NOT_SUPPORTED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::AMBIENT_ENUM_ELIDED,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::AMBIENT_ENUM_ELIDED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NON_CONSTANT_ENUM_INITIALIZER,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::NON_CONSTANT_ENUM_INITIALIZER,
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_BUNDLE_IMPORT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::UNRESOLVED_BUNDLE_IMPORT,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXPORT_STAR_NOT_BUNDLED,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::EXPORT_STAR_NOT_BUNDLED,
    },
];
