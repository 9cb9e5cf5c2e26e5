//! Tracing setup for hosts embedding the engine and for its tests.
//!
//! The engine only emits events. [`init_tracing`] installs a stderr
//! subscriber when `KILN_LOG` is set, using the `RUST_LOG` directive syntax.
//! `KILN_LOG_TREE=1` switches from flat lines to the `tracing-tree` span
//! hierarchy, which shows stage, visitor and rewrite nesting:
//!
//! ```bash
//! KILN_LOG=kiln_compiler=debug KILN_LOG_TREE=1 cargo test -p kiln-compiler
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Install a global subscriber writing to stderr.
///
/// Does nothing when `KILN_LOG` is unset or a subscriber is already
/// installed, so every test may call it.
pub fn init_tracing() {
    let Ok(directives) = std::env::var("KILN_LOG") else {
        return;
    };
    let filter = EnvFilter::builder().parse_lossy(directives);
    let registry = Registry::default().with(filter);
    let _ = if std::env::var_os("KILN_LOG_TREE").is_some() {
        let tree_layer = tracing_tree::HierarchicalLayer::default()
            .with_indent_amount(2)
            .with_indent_lines(true)
            .with_targets(true);
        registry.with(tree_layer).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };
}
