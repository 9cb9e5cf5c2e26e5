//! `import.meta`

use kiln_ast::{Node, NodeKind, NodeType};

use crate::error::CompileError;
use crate::path::Path;
use crate::pipeline::BundleOptions;
use crate::signal::Signal;
use crate::visitor::{Interest, Visitor};

/// Replaces `import.meta` with `{ url: "<source url>" }` when the bundle
/// asks for it. The url defaults to the file name.
pub struct MetaProperty {
    enabled: bool,
    source_url: Option<String>,
}

impl MetaProperty {
    pub fn new(options: &BundleOptions) -> Self {
        MetaProperty {
            enabled: options.rewrite_meta_properties,
            source_url: options.source_url.clone(),
        }
    }
}

impl Visitor for MetaProperty {
    fn name(&self) -> &'static str {
        "meta_property"
    }

    fn interests(&self) -> &'static [Interest] {
        const INTERESTS: &[Interest] = &[Interest::enter(NodeType::MetaProperty)];
        INTERESTS
    }

    fn enter(&self, path: &mut Path<'_>) -> Result<Signal, CompileError> {
        if !self.enabled {
            return Ok(Signal::Retain);
        }
        let node = path.node();
        let NodeKind::MetaProperty { meta, property } = &node.kind else {
            return Ok(Signal::Retain);
        };
        if meta != "import" || property != "meta" {
            return Ok(Signal::Retain);
        }
        let url = self
            .source_url
            .clone()
            .unwrap_or_else(|| path.context().file_name().to_string());
        let object = Node::object(vec![Node::property("url", Node::string(url))]);
        Ok(Signal::replace(object.with_span(node.span)))
    }
}

#[cfg(test)]
#[path = "../../tests/meta_property.rs"]
mod tests;
