use anyhow::Result;
use clap::Parser;
use tracing::info;

mod color;
mod config;
mod display;
mod engine;
mod ipc;

use config::Config;
use display::DisplayMode;

#[derive(Parser, Debug)]
#[command(name = "rondo")]
#[command(author, version, about = "Carousel layout engine with momentum scrolling")]
struct Args {
    /// Display mode: terminal or headless
    #[arg(short, long)]
    mode: Option<DisplayMode>,

    /// Config file path
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Number of generated demo items (replaces configured labels)
    #[arg(short, long)]
    items: Option<usize>,

    /// Circle radius in layout units
    #[arg(short, long)]
    radius: Option<f64>,

    /// Tilt in radians, between -pi/2 and pi/2
    #[arg(short, long)]
    pitch: Option<f64>,

    /// Hide items within this arc (radians) of the back of the circle
    #[arg(long)]
    visibility_arc: Option<f64>,

    /// Rotate around the vertical screen axis
    #[arg(long)]
    vertical: bool,

    /// Rotate each item by its own angle
    #[arg(long)]
    rotate_items: bool,

    /// Velocity bled off per glide tick
    #[arg(long)]
    deceleration: Option<f64>,

    /// Inertia divisor; defaults to radius * pi
    #[arg(long)]
    weight: Option<f64>,

    /// Glide tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Snap the nearest item to the front once motion settles
    #[arg(long)]
    snap: bool,

    /// Ignore pointer input
    #[arg(long)]
    disable_swiping: bool,

    /// Uniform item width in layout units
    #[arg(long)]
    item_width: Option<f64>,

    /// Color scheme: spectrum, rainbow, fire, ocean, monochrome
    #[arg(long, default_value = "spectrum")]
    colors: String,

    /// Write the default config template and exit
    #[arg(long)]
    init_config: bool,

    /// Send a command to a running instance and exit (e.g. "spin 3")
    #[arg(long)]
    send: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rondo=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if let Some(line) = &args.send {
        let response = ipc::send_command(line).await?;
        println!("{}", response);
        return Ok(());
    }

    if args.init_config {
        let path = Config::init_default_config()?;
        println!("Wrote config template to {}", path.display());
        return Ok(());
    }

    // Load or create config, CLI taking priority
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_default_path().unwrap_or_default(),
    };
    config.merge_args(&args);

    info!("Starting rondo in {:?} mode", config.display.mode);

    let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel(32);
    tokio::spawn(async move {
        if let Err(e) = ipc::start_server(cmd_tx).await {
            tracing::warn!("IPC server stopped: {}", e);
        }
    });

    match config.display.mode {
        DisplayMode::Terminal => {
            display::terminal::run(config, cmd_rx).await?;
        }
        DisplayMode::Headless => {
            display::headless::run(config, cmd_rx).await?;
        }
    }

    Ok(())
}
