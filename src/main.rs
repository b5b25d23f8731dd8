use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paletti::assets::AssetLoader;
use paletti::console::{ConsoleCommand, HELP};
use paletti::models::AppConfig;
use paletti::services::{Rendered, Session};

#[derive(Parser)]
#[command(name = "paletti")]
#[command(about = "Paletti - reduce an image to a small, adjustable palette")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Posterize an image file and save the result
    Render {
        /// Input image (PNG, JPEG, GIF, BMP, WebP, TIFF)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of colors (defaults to quantize.default_colors)
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(2..=256))]
        colors: Option<u16>,

        /// Convert the result to grays
        #[arg(short, long)]
        mono: bool,

        /// Also save the palette as a strip of swatches
        #[arg(short, long)]
        palette_output: Option<PathBuf>,

        /// Print the palette as JSON
        #[arg(long)]
        json: bool,
    },
    /// Adjust an image interactively with line commands on stdin
    Interactive {
        /// Image to open at start
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Extract the embedded config.yaml for customization
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            input,
            output,
            colors,
            mono,
            palette_output,
            json,
        }) => run_render_command(&input, &output, colors, mono, palette_output, json).await,
        Some(Commands::Interactive { input }) => run_interactive(input).await,
        Some(Commands::Init { force }) => run_init_command(force),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn load_config() -> AppConfig {
    AppConfig::load_from_assets(&AssetLoader::from_env())
}

/// Posterize one file through a session and save the result
async fn run_render_command(
    input: &Path,
    output: &Path,
    colors: Option<u16>,
    mono: bool,
    palette_output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paletti=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut config = load_config();
    if let Some(colors) = colors {
        config.quantize.default_colors = colors;
    }
    config.quantize.monochrome |= mono;

    let session = Session::start(config);
    let rendered = session.load_from_path(input).await?;
    session.export_image(output).await?;
    if let Some(ref path) = palette_output {
        session.export_palette(path).await?;
    }
    session.close().await?;

    if json {
        let summary = serde_json::json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "width": rendered.width,
            "height": rendered.height,
            "colors": rendered.request.color_count,
            "monochrome": rendered.request.monochrome,
            "palette": rendered.palette.to_hex_strings(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Rendered {} ({}x{}, {} colors)",
            output.display(),
            rendered.width,
            rendered.height,
            rendered.palette.len()
        );
        println!("Palette: {}", rendered.palette.to_hex_strings().join(" "));
        if let Some(path) = palette_output {
            println!("Saved palette to {}", path.display());
        }
    }

    Ok(())
}

/// Line-oriented front end: one command per line on stdin
async fn run_interactive(input: Option<PathBuf>) -> anyhow::Result<()> {
    // Logs go to stderr so results stay readable on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paletti=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config();
    let limits = config.limits();
    let session = Session::start(config.clone());

    // Control state lives here; the session follows its changes
    let (controls, controls_rx) = watch::channel(config.default_request());
    let follower = session.follow_controls(WatchStream::new(controls_rx));
    let printer = tokio::spawn(print_updates(session.clone()));

    println!("{HELP}");
    if let Some(path) = input {
        // Failures are reported through the notice stream
        let _ = session.load_from_path(&path).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        let current = *controls.borrow();
        if let Some(request) = command.apply(current, limits) {
            controls.send_replace(request);
            println!("Controls: {request}");
            continue;
        }

        match command {
            ConsoleCommand::Open(path) => {
                let _ = session.load_from_path(&path).await;
            }
            ConsoleCommand::Save(path) => {
                let _ = session.export_image(&path).await;
            }
            ConsoleCommand::Palette(path) => {
                let _ = session.export_palette(&path).await;
            }
            ConsoleCommand::Status => {
                let status = session.status().await?;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
            // Control changes were handled above
            _ => {}
        }
    }

    follower.abort();
    printer.abort();
    session.close().await?;
    Ok(())
}

/// Print published results and notices as they arrive
async fn print_updates(session: Session) {
    let mut results = session.results();
    let mut notices = session.notices();
    drop(session);

    loop {
        tokio::select! {
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest: Option<Arc<Rendered>> = results.borrow_and_update().clone();
                if let Some(rendered) = latest {
                    println!(
                        "Result: {}x{}, {} -> {}",
                        rendered.width,
                        rendered.height,
                        rendered.request,
                        rendered.palette.to_hex_strings().join(" ")
                    );
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => println!("{notice}"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notice output fell behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Extract the embedded config
fn run_init_command(force: bool) -> anyhow::Result<()> {
    let loader = AssetLoader::from_env();
    let report = loader.init(force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let loader = AssetLoader::from_env();
    let config = AppConfig::load_from_assets(&loader);
    let config_file = loader.config_file().map(|p| p.display().to_string());

    println!("Paletti v{VERSION}");
    println!("Reduce an image to a small, adjustable palette\n");

    println!("Environment Variables:");
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    println!("\nConfig:  {}", loader.config_source());
    println!(
        "  colors      {} (range {}..={})",
        config.quantize.default_colors, config.quantize.min_colors, config.quantize.max_colors
    );
    println!("  monochrome  {}", config.quantize.monochrome);
    println!("  debounce    {} ms", config.debounce.quiet_period_ms);
    println!(
        "  export      {} px swatches, optimize {}",
        config.export.swatch_size, config.export.optimize
    );

    println!("\nCommands:");
    println!("  paletti render        Posterize an image file");
    println!("  paletti interactive   Adjust an image with line commands");
    println!("  paletti init          Extract the default config");
    println!("\nRun 'paletti --help' for more details.");
}
