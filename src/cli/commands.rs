use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use emits::batch::{build_all, output_path, BuildProgress, FileWalker, PipelineResolver};
use emits::config::{BlockMarkers, CommentSyntax, Configuration, MetaEntry, PluginSpec};
use emits::tree::TransportDocument;
use emits::{CancellationToken, EmitsError, Pipeline, REGISTRY};

#[derive(Parser)]
#[command(name = "emits")]
#[command(about = "Extract comment directives from source files into JSON documents")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Build every supported file under ./src into ./emits-out
    emits build ./src

    # Stop at the first file that cannot be built
    emits build ./src --fail-fast

    # Build one file and print the document
    emits build src/api.rs --stdout

    # Use explicit markers and expose code following `// ... >` comments
    emits build script.lua --line -- --block-start '--[[' --block-end ']]' --expose

    # Chain plugins over the tree before extraction
    emits build ./src --plugin ./plugins/normalize --plugin ./plugins/links

    # Show the pruned tree a plugin would receive
    emits tree src/api.rs

    # List built-in comment presets
    emits syntaxes
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (.yml, .yaml, .json or .toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Comment marker overrides
#[derive(Args, Debug, Default)]
pub struct MarkerArgs {
    /// Line comment marker
    #[arg(long, allow_hyphen_values = true)]
    pub line: Option<String>,

    /// Block comment start marker
    #[arg(long, allow_hyphen_values = true, requires = "block_end")]
    pub block_start: Option<String>,

    /// Block comment end marker
    #[arg(long, allow_hyphen_values = true, requires = "block_start")]
    pub block_end: Option<String>,

    /// Expose lines following a comment that ends with `>`
    #[arg(long)]
    pub expose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build documents for a file or every supported file in a directory
    Build {
        /// File or directory to build
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        markers: MarkerArgs,

        /// Output directory
        #[arg(long, default_value = "emits-out")]
        out: PathBuf,

        /// Print documents to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Plugin executable, may be repeated; runs after configured plugins
        #[arg(long = "plugin")]
        plugins: Vec<PathBuf>,

        /// Timeout for a single plugin run in milliseconds
        #[arg(long)]
        plugin_timeout_ms: Option<u64>,

        /// Metadata `key=value` pair, may be repeated
        #[arg(long = "meta")]
        meta: Vec<String>,

        /// Only build files matching this glob (relative to PATH), may be repeated
        #[arg(long = "include")]
        include: Vec<String>,

        /// Stop building remaining files after the first fatal failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the line tree of a file as plugin transport JSON
    Tree {
        /// File to parse
        file: PathBuf,

        #[command(flatten)]
        markers: MarkerArgs,

        /// Print the tree before pruning and rewriting
        #[arg(long)]
        raw: bool,
    },

    /// List built-in comment presets
    Syntaxes,
}

/// Loads the configuration file, if any, and applies marker overrides
pub fn load_configuration(path: Option<&Path>, markers: &MarkerArgs) -> anyhow::Result<Configuration> {
    let mut config = match path {
        Some(path) => Configuration::load(path)?,
        None => Configuration::default(),
    };

    if let Some(line) = &markers.line {
        config.comment.line = Some(line.clone());
    }
    if let (Some(start), Some(end)) = (&markers.block_start, &markers.block_end) {
        config.comment.block = Some(BlockMarkers {
            start: start.clone(),
            end: end.clone(),
        });
    }
    if markers.expose {
        config.expose = true;
    }

    Ok(config)
}

pub fn apply_build_overrides(
    mut config: Configuration,
    plugins: Vec<PathBuf>,
    plugin_timeout_ms: Option<u64>,
    meta: &[String],
) -> anyhow::Result<Configuration> {
    config
        .plugins
        .extend(plugins.into_iter().map(|path| PluginSpec { path }));

    if let Some(ms) = plugin_timeout_ms {
        config = config.with_plugin_timeout(Duration::from_millis(ms));
    }

    for pair in meta {
        match MetaEntry::parse(pair) {
            Some(entry) => config.metadata.push(entry),
            None => bail!("Invalid metadata {:?}, expected key=value", pair),
        }
    }

    Ok(config)
}

pub fn build(
    path: &Path,
    config: Configuration,
    out: &Path,
    stdout: bool,
    include: &[String],
    fail_fast: bool,
) -> anyhow::Result<()> {
    let walker = FileWalker::new(REGISTRY.clone()).with_include(include)?;
    let files = walker.walk(path)?;

    if files.is_empty() {
        println!("No files to build under {}", path.display());
        return Ok(());
    }

    let resolver = PipelineResolver::new(config, REGISTRY.clone())?;
    let progress = BuildProgress::new();
    let bar = if stdout || files.len() == 1 {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        bar.set_style(style);
    }

    let cancel = CancellationToken::new();
    let items = build_all(&resolver, &files, &progress, &cancel, |item| {
        bar.inc(1);
        if fail_fast && item.result.is_err() {
            cancel.cancel();
        }
    });
    bar.finish_and_clear();

    for item in &items {
        let outcome = match &item.result {
            Ok(outcome) => outcome,
            Err(EmitsError::Cancelled) => {
                tracing::debug!("{}: skipped", item.path.display());
                continue;
            }
            Err(e) => {
                tracing::error!("{}: {}", item.path.display(), e);
                continue;
            }
        };

        for error in &outcome.plugin_errors {
            tracing::warn!("{}: {}", item.path.display(), error);
        }

        if stdout {
            println!("{}", outcome.document.to_json_pretty()?);
        } else {
            let target = output_path(path, &item.path, out);
            outcome
                .document
                .write(&target)
                .with_context(|| format!("Could not write {}", target.display()))?;
            tracing::info!("{} -> {}", item.path.display(), target.display());
        }
    }

    let snapshot = progress.snapshot();
    if !stdout {
        println!("{}", snapshot);
    }

    if snapshot.failures > 0 {
        bail!("{} of {} files failed", snapshot.failures, snapshot.files_total);
    }

    Ok(())
}

pub fn print_tree(file: &Path, mut config: Configuration, raw: bool) -> anyhow::Result<()> {
    if config.comment.is_empty() {
        config.comment = REGISTRY
            .get_for_file(file)
            .map(|preset| preset.syntax())
            .unwrap_or_else(CommentSyntax::c_style);
    }

    let pipeline = Pipeline::new(config)?;
    let mut tree = pipeline.read_tree(file)?;
    if !raw {
        tree = pipeline.prepare(tree);
    }

    let document = TransportDocument::from_tree(&tree, &file.to_string_lossy());
    println!("{}", document.to_json_pretty()?);

    Ok(())
}

pub fn list_syntaxes() {
    for preset in REGISTRY.presets() {
        let line = preset.line.unwrap_or("-");
        let block = preset
            .block
            .map(|(start, end)| format!("{} {}", start, end))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} line: {:<4} block: {:<10} {}",
            preset.name,
            line,
            block,
            preset.extensions.join(", ")
        );
    }
}
