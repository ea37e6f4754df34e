//! LED Strip HTTP Control Server
//!
//! Drives an addressable LED strip through one of four effects (fade,
//! solid, snake, off) and lets any device on the network change the effect,
//! color, brightness and active pixel count over HTTP.
//!
//! ## Architecture
//! - **Render thread** (std::thread): ticks the effect engine every millisecond
//! - **HTTP server** (tokio/axum): reads and mutates the same engine
//! - Both sides share one `Arc<Mutex<Engine>>`
//!
//! ## Usage
//! ```sh
//! ./target/release/led-strip-rs --port 8080 --web-dir data --pixels 60
//! ```

use clap::Parser;
use led_strip_rs::driver::{BoxedDriver, MemoryStrip};
use led_strip_rs::engine::Engine;
use led_strip_rs::network::{DEFAULT_ACCESS_POINT_IP, NetworkInfo, advertised_ip};
use led_strip_rs::render::render_loop;
use led_strip_rs::server::{self, AppState};
use led_strip_rs::{DEFAULT_PIXEL_COUNT, MAX_PIXEL_COUNT, StripConfig, is_running, setup_signal_handler};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// LED Strip HTTP Control Server
#[derive(Parser)]
#[command(name = "led-strip-rs")]
#[command(about = "HTTP API server for controlling an addressable LED strip")]
#[command(version)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: Ipv4Addr,

    /// Port to listen on
    #[arg(long, default_value = "80")]
    port: u16,

    /// Directory containing the browser control panel (index.html)
    #[arg(long, default_value = "data")]
    web_dir: PathBuf,

    /// Number of active pixels at startup
    #[arg(long, default_value_t = DEFAULT_PIXEL_COUNT)]
    pixels: u16,

    /// Length of the physical strip
    #[arg(long, default_value_t = MAX_PIXEL_COUNT)]
    max_pixels: u16,

    /// Report the access-point address instead of the station address
    #[arg(long)]
    access_point: bool,

    /// Address to report to clients (defaults to the bind address)
    #[arg(long)]
    advertise_ip: Option<Ipv4Addr>,

    /// Seed for the fade colors, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

/// Pause between two render ticks.
const RENDER_IDLE: Duration = Duration::from_millis(1);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    let args = Args::parse();
    let config = StripConfig::new(args.max_pixels, args.pixels);

    let network = if args.access_point {
        NetworkInfo::access_point(args.advertise_ip.unwrap_or(DEFAULT_ACCESS_POINT_IP))
    } else {
        NetworkInfo::station(advertised_ip(args.host, args.advertise_ip))
    };

    tracing::info!("LED Strip Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Strip: {} of {} pixels active",
        config.pixel_count,
        config.max_pixel_count
    );
    tracing::info!("Control panel dir: {}", args.web_dir.display());
    tracing::info!("Reachable at {} ({:?})", network.current_ip(), network.mode);

    let driver: BoxedDriver = Box::new(MemoryStrip::new(config.max_pixel_count));
    let engine = match args.seed {
        Some(seed) => Engine::with_seed(driver, config, seed),
        None => Engine::new(driver, config),
    };
    let engine = Arc::new(Mutex::new(engine));

    let running = setup_signal_handler()?;

    // Spawn the render thread.
    let render_engine = engine.clone();
    let render_running = running.clone();
    let render_handle = std::thread::spawn(move || {
        render_loop(render_engine, &render_running, RENDER_IDLE);
    });

    let app = server::create_router(AppState {
        engine,
        network,
        web_dir: args.web_dir,
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("API Documentation: http://localhost:{}/docs", args.port);
    tracing::info!("Try: curl 'http://localhost:{}/api/control?mode=solid&r=255&g=0&b=0'", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while is_running(&running) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tracing::info!("Shutting down HTTP server");
        })
        .await?;

    if render_handle.join().is_err() {
        tracing::error!("Render thread panicked");
    }

    Ok(())
}
