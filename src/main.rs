mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emits=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            path,
            markers,
            out,
            stdout,
            plugins,
            plugin_timeout_ms,
            meta,
            include,
            fail_fast,
        } => {
            let config = cli::load_configuration(cli.config.as_deref(), &markers)?;
            let config = cli::apply_build_overrides(config, plugins, plugin_timeout_ms, &meta)?;
            cli::build(&path, config, &out, stdout, &include, fail_fast)?;
        }
        Commands::Tree { file, markers, raw } => {
            let config = cli::load_configuration(cli.config.as_deref(), &markers)?;
            cli::print_tree(&file, config, raw)?;
        }
        Commands::Syntaxes => {
            cli::list_syntaxes();
        }
    }

    Ok(())
}
