use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use swatch::{
    build_symbol_table, ColorClassifier, PluginOptions, ThemeCache, ThemeGenerator, ThemeOptions,
    ThemePlugin,
};
use swatch_compile::LesscCompiler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extract a runtime-swappable color theme from a LESS component library.
#[derive(Debug, Parser)]
#[command(name = "swatch", version, about)]
struct Cli {
    /// LESS compiler executable.
    #[arg(long, global = true, default_value = "lessc")]
    lessc: String,

    /// Abort a compiler run after this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the theme stylesheet.
    Generate {
        /// YAML options file.
        #[arg(long, short)]
        config: PathBuf,

        /// Write the artifact here instead of the configured output path.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Discover the built-in themes and append the tag palette, as the
        /// build plugin does.
        #[arg(long)]
        plugin: bool,
    },
    /// Print the symbol table of a variable file.
    Vars {
        file: PathBuf,

        /// Directory `~` imports resolve against.
        #[arg(long, default_value = swatch::DEFAULT_ANT_DIR)]
        ant_dir: PathBuf,
    },
    /// Print the browser runtime manifest as JSON.
    Manifest {
        #[arg(long, short)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut compiler = LesscCompiler::new().with_program(cli.lessc.clone());
    if let Some(secs) = cli.timeout_secs {
        compiler = compiler.with_timeout(Duration::from_secs(secs));
    }
    let generator = ThemeGenerator::new(compiler);

    match cli.command {
        Command::Generate {
            config,
            output,
            plugin,
        } => {
            let mut options = PluginOptions::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            if let Some(output) = output {
                options.theme.output_file_path = Some(output);
            }
            let to_stdout = options.theme.output_file_path.is_none();

            let css = if plugin {
                ThemePlugin::new(options, generator)?.run().await?
            } else {
                let mut cache = ThemeCache::new();
                generator.generate(&options.theme, &mut cache).await
            };

            if css.is_empty() {
                bail!("theme generation failed");
            }
            if to_stdout {
                println!("{}", css);
            }
        }
        Command::Vars { file, ant_dir } => {
            let paths = ThemeOptions::new().with_ant_dir(ant_dir).paths();
            let symbols = build_symbol_table(&file, &paths.module_root, &ColorClassifier::new())?;
            for (name, value) in symbols.sorted() {
                println!("{}: {};", name, value);
            }
        }
        Command::Manifest { config } => {
            let options = PluginOptions::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let plugin = ThemePlugin::new(options, generator)?;
            println!("{}", serde_json::to_string_pretty(&plugin.manifest())?);
        }
    }

    Ok(())
}
