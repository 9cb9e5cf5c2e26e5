//! The shipped passes, grouped by the stage that runs them.
//!
//! - pre: [`OptimizeImports`], [`OptimizeExports`]
//! - compile: [`Jsx`], [`OptionalChaining`], [`NullishCoalescing`],
//!   [`CallSpread`], [`ObjectSpread`], [`TemplateLiterals`],
//!   [`RestParameters`], [`ClassProperties`], [`Enums`], [`ParamlessCatch`]
//! - compileForBundle: [`BundleRoot`], [`BundleRename`], [`CjsInterop`],
//!   [`MetaProperty`]

mod bundle;
mod call_spread;
mod class_properties;
mod enums;
mod jsx;
mod meta_property;
mod modules;
mod nullish_coalescing;
mod object_spread;
mod optional_chaining;
mod paramless_catch;
mod rest_parameters;
mod template_literals;
pub(crate) mod util;

pub use bundle::{BundleRename, BundleRoot, CjsInterop, module_name};
pub use call_spread::CallSpread;
pub use class_properties::ClassProperties;
pub use enums::Enums;
pub use jsx::Jsx;
pub use meta_property::MetaProperty;
pub use modules::{OptimizeExports, OptimizeImports};
pub use nullish_coalescing::NullishCoalescing;
pub use object_spread::ObjectSpread;
pub use optional_chaining::OptionalChaining;
pub use paramless_catch::ParamlessCatch;
pub use rest_parameters::RestParameters;
pub use template_literals::TemplateLiterals;
