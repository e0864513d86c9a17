use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use showreel::catalog::{self, Catalog};
use showreel::constants::*;
use showreel::indicator;
use showreel::simulate::{self, AutoplayPolicy, Script, SimMedia, Span};

#[derive(Parser)]
#[command(name = "showreel", version, about = "Auto-advancing project showcase carousel")]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SourceArgs {
    /// TOML manifest with `[showreel]` settings and `[[items]]`
    #[arg(long, conflicts_with = "dir")]
    manifest: Option<PathBuf>,

    /// Directory of media files, one item per file
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the rotation items
    List,

    /// Run the carousel against a scripted headless page
    Simulate {
        /// Simulated time to run (seconds)
        #[arg(long, default_value_t = 30.0)]
        seconds: f32,

        /// Length of every clip (seconds)
        #[arg(long, default_value_t = DEFAULT_CLIP_LENGTH)]
        clip_seconds: f32,

        /// Random variation of the clip length, at most the clip length (seconds)
        #[arg(long, default_value_t = 0.0)]
        clip_jitter: f32,

        /// Time window where the carousel is scrolled out of view, e.g. 10..15
        #[arg(long)]
        offscreen: Vec<Span>,

        /// Time window where the page is in a background tab
        #[arg(long)]
        background: Vec<Span>,

        /// Moment of a click on the carousel (seconds)
        #[arg(long)]
        click_at: Vec<f32>,

        #[arg(long, value_enum, default_value_t = AutoplayPolicy::Allow)]
        autoplay: AutoplayPolicy,
    },

    /// Open a window with a scrollable page showing the carousel
    #[cfg(feature = "window")]
    Window,
}

fn load_catalog(source: &SourceArgs) -> Result<Catalog> {
    if let Some(path) = &source.manifest {
        return catalog::load_manifest(path)
            .with_context(|| format!("loading manifest {}", path.display()));
    }
    if let Some(dir) = &source.dir {
        return catalog::scan_directory(dir).with_context(|| format!("scanning {}", dir.display()));
    }
    Ok(catalog::builtin())
}

fn run(cli: Cli) -> Result<()> {
    let catalog = load_catalog(&cli.source)?;

    match cli.command {
        Command::List => {
            for (index, item) in catalog.items.iter().enumerate() {
                println!(
                    "{}  {:<32} {:<16} {}",
                    indicator::render(catalog.items.len(), index),
                    item.title,
                    item.date,
                    item.media_ref
                );
                if !item.description.is_empty() {
                    println!("    {}", item.description);
                }
            }
        }
        Command::Simulate {
            seconds,
            clip_seconds,
            clip_jitter,
            offscreen,
            background,
            click_at,
            autoplay,
        } => {
            let media = SimMedia::new(clip_seconds)
                .with_jitter(clip_jitter)
                .with_policy(autoplay);
            let script = Script {
                offscreen,
                background,
                clicks: click_at,
            };
            let items = catalog.items.clone();
            let report = simulate::run(items, &catalog.config, media, &script, seconds)
                .context("running simulation")?;

            println!(
                "{} rotations in {:.1}s ({} frames), ended on {}",
                report.rotations.len(),
                seconds,
                report.frames,
                catalog.items[report.final_index].title
            );
            for record in &report.rotations {
                println!(
                    "{:7.2}s  {} -> {}{}  {}",
                    record.at,
                    record.advance.from,
                    record.advance.to,
                    if record.advance.forced { " (click)" } else { "" },
                    record.media_ref
                );
            }
        }
        #[cfg(feature = "window")]
        Command::Window => {
            let dir = cli
                .source
                .dir
                .as_deref()
                .context("the window needs --dir with the images to show")?;
            showreel::window::run(dir, &catalog)?;
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
