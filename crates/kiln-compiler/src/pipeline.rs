//! Stages, options and the pass orchestrator.

use std::fmt;

use indexmap::IndexMap;
use kiln_ast::{Node, NodeType};
use kiln_common::{Diagnostic, ModuleId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::context::CompilerContext;
use crate::error::CompileError;
use crate::inject::{Injector, check_flushed};
use crate::transforms;
use crate::traverse::{DispatchTable, traverse_with};
use crate::visitor::{Phase, Visitor};

/// A named group of visitors run in one traversal. Stages always run in
/// declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Module-level cleanup that must see the source as written.
    Pre,
    /// Syntax lowering.
    Compile,
    /// Rewriting one module of a bundle.
    CompileForBundle,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Pre, Stage::Compile, Stage::CompileForBundle];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Pre => "pre",
            Stage::Compile => "compile",
            Stage::CompileForBundle => "compileForBundle",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsxOptions {
    /// Element factory, as a dotted path.
    pub pragma: String,
    /// Fragment component, as a dotted path.
    pub pragma_frag: String,
}

impl Default for JsxOptions {
    fn default() -> Self {
        JsxOptions {
            pragma: "React.createElement".to_string(),
            pragma_frag: "React.Fragment".to_string(),
        }
    }
}

/// Maps import specifiers to the ids of modules in the bundle.
pub trait ModuleResolver {
    fn resolve(&self, specifier: &str) -> Option<ModuleId>;
}

/// A precomputed specifier to module table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionTable(IndexMap<String, ModuleId>);

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, specifier: impl Into<String>, module: ModuleId) {
        self.0.insert(specifier.into(), module);
    }

    pub fn with(mut self, specifier: impl Into<String>, module: ModuleId) -> Self {
        self.insert(specifier, module);
        self
    }
}

impl ModuleResolver for ResolutionTable {
    fn resolve(&self, specifier: &str) -> Option<ModuleId> {
        self.0.get(specifier).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOptions {
    pub module_id: ModuleId,
    /// Build a namespace object for ES-module-shaped output.
    #[serde(default)]
    pub synthesize_namespace: bool,
    /// Replace `import.meta` with a literal object.
    #[serde(default)]
    pub rewrite_meta_properties: bool,
    /// Set for asset modules: the module becomes a default export of this
    /// path.
    #[serde(default)]
    pub asset_path: Option<String>,
    /// `import.meta.url` when meta properties are rewritten; defaults to the
    /// file name.
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub resolutions: ResolutionTable,
}

impl BundleOptions {
    pub fn new(module_id: ModuleId) -> Self {
        BundleOptions {
            module_id,
            synthesize_namespace: false,
            rewrite_meta_properties: false,
            asset_path: None,
            source_url: None,
            resolutions: ResolutionTable::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub stages: Vec<Stage>,
    pub jsx: JsxOptions,
    pub bundle: Option<BundleOptions>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            stages: vec![Stage::Pre, Stage::Compile],
            jsx: JsxOptions::default(),
            bundle: None,
        }
    }
}

impl CompileOptions {
    pub fn from_json(text: &str) -> Result<CompileOptions, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The visitors of one stage, in dispatch order, and the `(node type,
/// phase)` pairs on which more than one of them may act.
pub struct StageVisitors {
    pub stage: Stage,
    pub visitors: Vec<Box<dyn Visitor>>,
    pub allowed_overlaps: Vec<(NodeType, Phase)>,
}

impl StageVisitors {
    pub fn new(stage: Stage, visitors: Vec<Box<dyn Visitor>>) -> Self {
        StageVisitors {
            stage,
            visitors,
            allowed_overlaps: Vec::new(),
        }
    }

    pub fn allow_overlap(mut self, node_type: NodeType, phase: Phase) -> Self {
        self.allowed_overlaps.push((node_type, phase));
        self
    }

    /// The shipped visitor list for `stage`.
    pub fn builtin(stage: Stage, options: &CompileOptions) -> Result<StageVisitors, CompileError> {
        let visitors = match stage {
            Stage::Pre => {
                return Ok(StageVisitors::new(
                    stage,
                    vec![
                        Box::new(transforms::OptimizeImports) as Box<dyn Visitor>,
                        Box::new(transforms::OptimizeExports),
                    ],
                )
                .allow_overlap(NodeType::Program, Phase::Enter)
                .allow_overlap(NodeType::ImportDeclaration, Phase::Enter));
            }
            Stage::Compile => vec![
                Box::new(transforms::Jsx::new(&options.jsx)) as Box<dyn Visitor>,
                Box::new(transforms::OptionalChaining),
                Box::new(transforms::NullishCoalescing),
                Box::new(transforms::CallSpread),
                Box::new(transforms::ObjectSpread),
                Box::new(transforms::TemplateLiterals),
                Box::new(transforms::RestParameters),
                Box::new(transforms::ClassProperties),
                Box::new(transforms::Enums),
                Box::new(transforms::ParamlessCatch),
            ],
            Stage::CompileForBundle => {
                let bundle = options
                    .bundle
                    .as_ref()
                    .ok_or(CompileError::MissingBundleOptions(stage))?;
                vec![
                    Box::new(transforms::BundleRoot::new(bundle)) as Box<dyn Visitor>,
                    Box::new(transforms::BundleRename::new(bundle)),
                    Box::new(transforms::CjsInterop::new(bundle)),
                    Box::new(transforms::MetaProperty::new(bundle)),
                ]
            }
        };
        Ok(StageVisitors::new(stage, visitors))
    }
}

/// Ordered, validated stages.
pub struct Pipeline {
    stages: Vec<StageVisitors>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for stage in &self.stages {
            let names: Vec<_> = stage.visitors.iter().map(|v| v.name()).collect();
            list.entry(&(stage.stage, names));
        }
        list.finish()
    }
}

impl Pipeline {
    /// The shipped stages selected by `options`.
    pub fn new(options: &CompileOptions) -> Result<Pipeline, CompileError> {
        let stages = Stage::ALL
            .into_iter()
            .filter(|stage| options.stages.contains(stage))
            .map(|stage| StageVisitors::builtin(stage, options))
            .collect::<Result<Vec<_>, _>>()?;
        Pipeline::from_stages(stages)
    }

    /// Custom stages. They are sorted into stage order, each gets the
    /// injector appended, and each is checked for overlapping visitors.
    pub fn from_stages(mut stages: Vec<StageVisitors>) -> Result<Pipeline, CompileError> {
        stages.sort_by_key(|s| s.stage);
        for stage in &mut stages {
            stage.visitors.push(Box::new(Injector));
            let refs: Vec<&dyn Visitor> = stage.visitors.iter().map(|v| v.as_ref()).collect();
            DispatchTable::checked(stage.stage, &refs, &stage.allowed_overlaps)?;
        }
        Ok(Pipeline { stages })
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().map(|s| s.stage)
    }

    /// Run every stage over `root`, in order.
    pub fn run(&self, mut root: Node, cx: &mut CompilerContext) -> Result<Node, CompileError> {
        for stage in &self.stages {
            let span = info_span!("stage", stage = %stage.stage, file = cx.file_name());
            let _guard = span.enter();

            let refs: Vec<&dyn Visitor> = stage.visitors.iter().map(|v| v.as_ref()).collect();
            let table = DispatchTable::checked(stage.stage, &refs, &stage.allowed_overlaps)?;
            root = traverse_with(root, &table, cx)?;
            check_flushed(cx)?;
            cx.state.clear();
            debug!(diagnostics = cx.diagnostics.len(), "stage complete");
        }
        Ok(root)
    }
}

/// The result of compiling one unit.
#[derive(Debug)]
pub struct CompileOutput {
    pub program: Node,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compile `root` with the stages selected by `options`.
#[tracing::instrument(level = "debug", skip(root, options))]
pub fn compile(
    root: Node,
    options: &CompileOptions,
    file_name: &str,
) -> Result<CompileOutput, CompileError> {
    let pipeline = Pipeline::new(options)?;
    let mut cx = CompilerContext::new(file_name, &root);
    let program = pipeline.run(root, &mut cx)?;
    Ok(CompileOutput {
        program,
        diagnostics: cx.diagnostics.into_vec(),
    })
}

#[cfg(test)]
#[path = "../tests/pipeline.rs"]
mod tests;
