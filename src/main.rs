//! apache-connect command line.
//!
//! Builds the httpd configuration described by a layout file and prints it,
//! keeps re-printing it as the layout changes, or runs httpd with it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use apache_connect::config::{load_config, ConfigWatcher, LayoutConfig};
use apache_connect::lifecycle::{forward_signals, Shutdown};
use apache_connect::observability::{logging, metrics};
use apache_connect::{build_server, Conf, Listener};

#[derive(Parser)]
#[command(name = "apache-connect")]
#[command(about = "Compose Apache httpd configurations from path-scoped layers", long_about = None)]
struct Cli {
    /// Layout file
    #[arg(short, long, default_value = "layout.toml")]
    config: PathBuf,

    /// Log level; overrides the layout's `observability.log_level`
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configuration and print it
    Render {
        #[arg(short, long, value_enum, default_value_t = Format::Conf)]
        format: Format,
    },
    /// Validate the layout and report its mounts
    Check,
    /// List the mounts whose scope covers a request path
    Routes { subject: String },
    /// Re-render whenever the layout file changes
    Watch,
    /// Start httpd in the foreground with the built arguments
    Run {
        #[arg(long, default_value = "httpd")]
        httpd: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Directive listing
    Conf,
    /// httpd arguments, one per line
    Args,
    Json,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let layout = match load_config(&cli.config) {
        Ok(layout) => layout,
        Err(e) => {
            logging::init(cli.log_level.as_deref().unwrap_or("info"));
            tracing::error!(path = ?cli.config, error = %e, "Failed to load layout");
            return Err(e.into());
        }
    };
    logging::init(cli.log_level.as_deref().unwrap_or(&layout.observability.log_level));

    tracing::info!(
        path = ?cli.config,
        bind_address = %layout.listener.bind_address,
        mounts = layout.mounts.len(),
        "Layout loaded"
    );

    match cli.command {
        Commands::Render { format } => {
            let conf = render(&layout).await?;
            print_conf(&conf, format)?;
        }
        Commands::Check => {
            let server = build_server(&layout)?;
            println!(
                "{}: ok ({} top-level layers, scope {})",
                cli.config.display(),
                server.layers().len(),
                server.scope().name()
            );
        }
        Commands::Routes { subject } => {
            let server = build_server(&layout)?;
            for route in server.routes_for(&subject) {
                println!("{}", route);
            }
        }
        Commands::Watch => {
            init_metrics(&layout)?;
            watch(&cli.config, layout).await?
        }
        Commands::Run { httpd } => {
            init_metrics(&layout)?;
            run(&httpd, &layout).await?
        }
    }

    Ok(())
}

fn init_metrics(layout: &LayoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(addr) = &layout.observability.metrics_address {
        metrics::init_exporter(addr.parse()?)?;
    }
    Ok(())
}

fn listener_for(layout: &LayoutConfig) -> Listener {
    let listener = Listener::new(layout.listener.bind_address.clone());
    match &layout.listener.file {
        Some(file) => listener.with_file(file),
        None => listener,
    }
}

async fn render(layout: &LayoutConfig) -> apache_connect::Result<Conf> {
    let server = build_server(layout)?;
    listener_for(layout).bootstrap(&server).await
}

fn print_conf(conf: &Conf, format: Format) -> Result<(), serde_json::Error> {
    match format {
        Format::Conf => print!("{}", conf),
        Format::Args => {
            for arg in conf.to_args() {
                println!("{}", arg);
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(conf)?),
    }
    Ok(())
}

async fn watch(path: &Path, layout: LayoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    forward_signals(shutdown);

    print_conf(&render(&layout).await?, Format::Conf)?;

    let (watcher, mut updates) = ConfigWatcher::new(path);
    let _guard = watcher.run()?;

    loop {
        tokio::select! {
            _ = stop.recv() => break,
            Some(layout) = updates.recv() => match render(&layout).await {
                Ok(conf) => print_conf(&conf, Format::Conf)?,
                Err(e) => tracing::error!(error = %e, "Rebuild failed, keeping previous output"),
            },
            else => break,
        }
    }

    tracing::info!("Watch stopped");
    Ok(())
}

async fn run(httpd: &Path, layout: &LayoutConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conf = render(layout).await?;
    let mut child = listener_for(layout).command(httpd, &conf).spawn()?;
    tracing::info!(httpd = ?httpd, pid = ?child.id(), "httpd started");

    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    forward_signals(shutdown);

    tokio::select! {
        status = child.wait() => {
            let status = status?;
            tracing::info!(%status, "httpd exited");
            if !status.success() {
                return Err(format!("httpd exited with {}", status).into());
            }
        }
        _ = stop.recv() => {
            tracing::info!("Stopping httpd");
            child.kill().await?;
        }
    }

    Ok(())
}
