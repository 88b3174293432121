//! Parallel builds over many files.
//!
//! Each file runs through its own sequential [`Pipeline`]; files are
//! independent and are built in parallel with rayon. Pipelines and their
//! configuration are shared read-only across threads.

pub mod progress;
pub mod walker;

pub use progress::{BuildProgress, ProgressSnapshot};
pub use walker::FileWalker;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::config::{CommentSyntax, Configuration};
use crate::error::Result;
use crate::pipeline::{BuildOutcome, Pipeline};
use crate::syntax::SyntaxRegistry;

/// Suffix appended to a source path to name its output document
pub const OUTPUT_SUFFIX: &str = ".emits.json";

/// Picks the pipeline for a file.
///
/// Explicitly configured markers apply to every file. Otherwise markers come
/// from the preset matching the file extension, with C-style markers for
/// anything unknown.
pub struct PipelineResolver {
    registry: SyntaxRegistry,
    by_preset: HashMap<&'static str, Pipeline>,
    fallback: Pipeline,
}

impl PipelineResolver {
    pub fn new(config: Configuration, registry: SyntaxRegistry) -> Result<Self> {
        if !config.comment.is_empty() {
            return Ok(Self {
                registry,
                by_preset: HashMap::new(),
                fallback: Pipeline::new(config)?,
            });
        }

        let fallback = Pipeline::new(Configuration {
            comment: CommentSyntax::c_style(),
            ..config.clone()
        })?;

        let mut by_preset = HashMap::new();
        for preset in registry.presets() {
            let pipeline = Pipeline::new(Configuration {
                comment: preset.syntax(),
                ..config.clone()
            })?;
            by_preset.insert(preset.name, pipeline);
        }

        Ok(Self {
            registry,
            by_preset,
            fallback,
        })
    }

    pub fn for_file(&self, path: &Path) -> &Pipeline {
        self.registry
            .get_for_file(path)
            .and_then(|preset| self.by_preset.get(preset.name))
            .unwrap_or(&self.fallback)
    }
}

/// Result of building one file of a batch
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<BuildOutcome>,
}

/// Builds every file in parallel, calling `on_item` as each one finishes.
/// Results come back in input order.
pub fn build_all<F>(
    resolver: &PipelineResolver,
    files: &[PathBuf],
    progress: &BuildProgress,
    cancel: &CancellationToken,
    on_item: F,
) -> Vec<BatchItem>
where
    F: Fn(&BatchItem) + Sync,
{
    progress.start(files.len());

    let items: Vec<BatchItem> = files
        .par_iter()
        .map(|path| {
            let result = resolver.for_file(path).build_file(path, cancel);
            match &result {
                Ok(outcome) => progress.inc(outcome.plugin_errors.len()),
                Err(e) => {
                    tracing::debug!("{}: {}", path.display(), e);
                    progress.inc_failure();
                }
            }
            let item = BatchItem {
                path: path.clone(),
                result,
            };
            on_item(&item);
            item
        })
        .collect();

    progress.finish();
    items
}

/// Output location for `file` found under `root`, mirrored into `out_dir`
pub fn output_path(root: &Path, file: &Path, out_dir: &Path) -> PathBuf {
    let relative = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output")),
    };

    let mut name = relative.into_os_string();
    name.push(OUTPUT_SUFFIX);
    out_dir.join(name)
}
