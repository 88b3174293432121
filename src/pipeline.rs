//! Single-file build pipeline.
//!
//! read → classify and build → prune → rewrite → plugins → extract.
//! Stages run strictly in sequence; cancellation is honoured between them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::config::Configuration;
use crate::emit::{extract_tree, EmitDocument};
use crate::error::{EmitsError, PluginError, Result};
use crate::plugin::PluginRunner;
use crate::rewrite::Rewriter;
use crate::tree::{prune, LineClassifier, Tree, TreeBuilder};

/// A finished build: the document plus any plugins that failed along the way
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub document: EmitDocument,
    pub plugin_errors: Vec<PluginError>,
}

/// Validated configuration ready to build any number of files.
///
/// Holds no per-build state, so one pipeline can serve parallel builds.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Configuration,
    rewriter: Rewriter,
    plugins: PluginRunner,
}

impl Pipeline {
    /// Validates markers and compiles every rewrite pattern up front
    pub fn new(config: Configuration) -> Result<Self> {
        config.validate()?;
        let rewriter = Rewriter::compile(&config.rewrite)?;
        let plugins = PluginRunner::from_config(&config);
        Ok(Self {
            config,
            rewriter,
            plugins,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Reads a file line by line into the unpruned tree
    pub fn read_tree(&self, path: &Path) -> Result<Tree> {
        let file = File::open(path).map_err(|e| EmitsError::Input {
            path: path.to_path_buf(),
            source: e,
        })?;

        let classifier = LineClassifier::new(&self.config);
        let mut builder = TreeBuilder::new();

        for (i, raw) in BufReader::new(file).lines().enumerate() {
            let raw = raw.map_err(|e| EmitsError::Scan {
                path: path.to_path_buf(),
                source: e,
            })?;
            let line = classifier.classify(builder.last(), &raw);
            builder.insert(i + 1, line);
        }

        tracing::debug!("{}: {} lines", path.display(), builder.len());
        Ok(builder.finish())
    }

    /// Builds the document for one file on disk
    pub fn build_file(&self, path: &Path, cancel: &CancellationToken) -> Result<BuildOutcome> {
        checkpoint(cancel)?;
        let tree = self.read_tree(path)?;
        self.finish(tree, &path.to_string_lossy(), cancel)
    }

    /// Builds the document for in-memory text
    pub fn build_str(
        &self,
        source: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<BuildOutcome> {
        checkpoint(cancel)?;
        let tree = crate::tree::parse(text, &self.config);
        self.finish(tree, source, cancel)
    }

    /// Prunes and rewrites a freshly built tree
    pub fn prepare(&self, tree: Tree) -> Tree {
        let mut tree = prune(tree);
        self.rewriter.apply(&mut tree);
        tree
    }

    fn finish(&self, tree: Tree, source: &str, cancel: &CancellationToken) -> Result<BuildOutcome> {
        checkpoint(cancel)?;
        let mut tree = prune(tree);

        checkpoint(cancel)?;
        self.rewriter.apply(&mut tree);

        checkpoint(cancel)?;
        let outcome = self.plugins.run(tree, source, cancel)?;

        checkpoint(cancel)?;
        let data = extract_tree(&outcome.tree);
        let document = EmitDocument::new(source, self.config.metadata.clone(), data);

        tracing::debug!(
            "{}: {} nodes, {} directives, {} plugin errors",
            source,
            outcome.tree.len(),
            document.directive_count(),
            outcome.errors.len()
        );

        Ok(BuildOutcome {
            document,
            plugin_errors: outcome.errors,
        })
    }
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(EmitsError::Cancelled)
    } else {
        Ok(())
    }
}
