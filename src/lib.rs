pub mod batch;
pub mod config;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod plugin;
pub mod rewrite;
pub mod syntax;
pub mod tree;

use once_cell::sync::Lazy;

pub use batch::{build_all, output_path, BatchItem, BuildProgress, FileWalker, PipelineResolver};
pub use config::{
    BlockMarkers, CommentSyntax, Configuration, MetaEntry, PluginSpec, RewriteRule, EXPOSE_MARKER,
};
pub use emit::{extract, extract_tree, parse_directive, DirectiveNode, EmitDocument, Flag};
pub use error::{EmitsError, PluginError, Result};
pub use pipeline::{BuildOutcome, Pipeline};
pub use plugin::{PluginOutcome, PluginRunner};
pub use rewrite::Rewriter;
pub use syntax::{CommentPreset, SyntaxRegistry};
pub use tree::{
    parse, prune, ClassifiedLine, LineClassifier, Node, TransportDocument, Tree, TreeBuilder,
};
pub use tokio_util::sync::CancellationToken;

/// Global comment preset registry (lazily initialized)
pub static REGISTRY: Lazy<SyntaxRegistry> = Lazy::new(SyntaxRegistry::new);
