// exif_trail - EXIF inspector
// One-shot CLI report, or a daemon serving inspections over a Unix Domain Socket

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use exif_trail::config::{DEFAULT_MAP_ZOOM, DEFAULT_RAW_VALUE_LIMIT};
use exif_trail::service::{InspectorService, Request, Response, Service};
use exif_trail::{Inspector, InspectorConfig};

/// Largest request frame accepted from a client
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "exif_trail", version, about = "EXIF Trail - reveal camera and location metadata hidden in a photo")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect one JPEG and print the report
    Inspect {
        /// Photo to inspect (.jpg or .jpeg)
        path: PathBuf,

        /// Report format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Omit raw values whose text is this long or longer
        #[arg(long, default_value_t = DEFAULT_RAW_VALUE_LIMIT)]
        raw_limit: usize,

        /// Map zoom level
        #[arg(long, default_value_t = DEFAULT_MAP_ZOOM)]
        zoom: u8,
    },

    /// Serve inspections over a Unix socket
    Serve {
        /// Unix socket path for UDS server
        #[arg(long, default_value = "/tmp/exif_trail.sock")]
        socket_path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Html,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Inspect { path, format, output, raw_limit, zoom } => {
            let config = InspectorConfig {
                raw_value_limit: raw_limit,
                map_zoom: zoom,
                ..Default::default()
            };
            inspect(&path, format, output, config)
        }
        Command::Serve { socket_path } => serve(&socket_path).await,
    }
}

fn inspect(path: &Path, format: Format, output: Option<PathBuf>, config: InspectorConfig) -> Result<()> {
    let report = Inspector::new(config)
        .inspect_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let rendered = match format {
        Format::Text => report.to_text(),
        Format::Json => report.to_json().context("Failed to serialize report")?,
        Format::Html => report.to_html(),
    };

    match output {
        Some(out) => {
            std::fs::write(&out, rendered)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Report written to {}", out.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

async fn serve(socket_path: &str) -> Result<()> {
    info!("🔬 Starting EXIF Trail daemon");
    info!("   Socket: {}", socket_path);

    // Track startup time for health checks
    let start_time = std::time::Instant::now();

    let service = Arc::new(InspectorService::default());

    // Remove old socket if exists
    let path = PathBuf::from(socket_path);
    if path.exists() {
        std::fs::remove_file(&path)
            .context("Failed to remove old socket")?;
    }

    let listener = UnixListener::bind(&path)
        .context("Failed to bind Unix socket")?;

    info!("   ✓ Listening on {}", socket_path);

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, service, start_time).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Accept error: {}", e);
            }
        }
    }
}

/// Handle a single UDS connection
async fn handle_connection(
    mut stream: UnixStream,
    service: Arc<InspectorService>,
    start_time: std::time::Instant,
) -> Result<()> {
    let mut buffer = vec![0u8; 65536]; // 64KB buffer

    loop {
        // Read request length (4 bytes)
        let mut len_buf = [0u8; 4];
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Client disconnected");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            anyhow::bail!("Request frame of {} bytes exceeds {} byte limit", len, MAX_FRAME_LEN);
        }
        if len > buffer.len() {
            buffer.resize(len, 0);
        }

        stream.read_exact(&mut buffer[..len]).await?;

        let response = match serde_json::from_slice::<Request>(&buffer[..len]) {
            Ok(request) => {
                debug!("Received: op={}", request.op);
                if request.op == "health" {
                    Response {
                        ok: true,
                        output: serde_json::json!({
                            "status": "healthy",
                            "service": "exif_trail",
                            "version": env!("CARGO_PKG_VERSION"),
                            "uptime_ms": start_time.elapsed().as_millis() as u64,
                        }),
                        latency_ms: 0,
                    }
                } else {
                    match service.call(request).await {
                        Ok(resp) => resp,
                        Err(e) => {
                            error!("Service error: {:?}", e);
                            Response::failure(e.to_string(), 0)
                        }
                    }
                }
            }
            Err(e) => Response::failure(format!("Malformed request: {}", e), 0),
        };

        let response_bytes = serde_json::to_vec(&response)
            .context("Failed to serialize response")?;

        // Write response length + body
        let len_bytes = (response_bytes.len() as u32).to_be_bytes();
        stream.write_all(&len_bytes).await?;
        stream.write_all(&response_bytes).await?;
        stream.flush().await?;

        debug!("Sent: ok={}, latency={}ms", response.ok, response.latency_ms);
    }
}
