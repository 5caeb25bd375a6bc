use std::{
    io::{self, BufRead, Write},
    net::{TcpStream, ToSocketAddrs},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use search_core::{
    load_settings, Connectivity, HttpBookFetcher, QueryBuilder, SearchController, SearchLoader,
    SearchView,
};
use shared::protocol::StatusMessage;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

const REACH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Parser, Debug)]
#[command(about = "Search the book catalog by title")]
struct Args {
    /// Settings file; defaults to ./book_search.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Behave as if no network were available.
    #[arg(long)]
    offline: bool,
    /// How long to wait for each search before giving up on it.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Print each result as one JSON object per line.
    #[arg(long)]
    json: bool,
    /// Run a single search and exit. Without it, queries are read from stdin.
    query: Option<String>,
}

/// Reachability of the catalog host, checked with a plain TCP connect.
struct TcpReachability {
    host: String,
    port: u16,
}

impl TcpReachability {
    fn for_endpoint(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint).with_context(|| format!("invalid endpoint {endpoint}"))?;
        Ok(Self {
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port_or_known_default().unwrap_or(443),
        })
    }
}

impl Connectivity for TcpReachability {
    fn is_connected(&self) -> bool {
        let Ok(mut addrs) = (self.host.as_str(), self.port).to_socket_addrs() else {
            debug!(host = %self.host, "catalog host did not resolve");
            return false;
        };
        addrs.any(|addr| TcpStream::connect_timeout(&addr, REACH_TIMEOUT).is_ok())
    }
}

fn render(view: &SearchView, json: bool, out: &mut impl Write) -> io::Result<()> {
    if json {
        let line = serde_json::json!({
            "status": view.status,
            "message": view.status.map(StatusMessage::text),
            "books": view.books,
        });
        writeln!(out, "{line}")?;
        return out.flush();
    }

    if let Some(status) = view.status {
        writeln!(out, "{status}")?;
    }
    for (index, book) in view.books.iter().enumerate() {
        writeln!(out, "{:>2}. {} - {}", index + 1, book.title(), book.authors().join(", "))?;
    }
    out.flush()
}

fn run_search(
    controller: &mut SearchController,
    input: &str,
    timeout: Duration,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if controller.search(input).is_some() && !controller.wait_for_delivery(timeout) {
        writeln!(out, "Search is still running; giving up after {}s.", timeout.as_secs())?;
        return Ok(());
    }
    render(controller.view(), json, out)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    info!(endpoint = %settings.endpoint, max_results = settings.max_results, "settings loaded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let fetcher = HttpBookFetcher::from_settings(&settings).context("failed to build HTTP client")?;
    let loader = Arc::new(SearchLoader::new(Arc::new(fetcher), runtime.handle().clone()));
    let queries = QueryBuilder::from_settings(&settings)?;
    let connectivity: Arc<dyn Connectivity> = if args.offline {
        Arc::new(|| false)
    } else {
        Arc::new(TcpReachability::for_endpoint(&settings.endpoint)?)
    };

    let mut controller = SearchController::new(loader, queries, connectivity);
    let timeout = Duration::from_secs(args.timeout_secs);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(query) = args.query {
        return run_search(&mut controller, &query, timeout, args.json, &mut out);
    }

    controller.initialize("");
    if controller.is_loading() {
        controller.wait_for_delivery(timeout);
    }
    render(controller.view(), args.json, &mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read query")?;
        run_search(&mut controller, &line, timeout, args.json, &mut out)?;
    }

    controller.teardown();
    Ok(())
}
