//! randex CLI - samples a collection, enriches it, and prints list or detail views.
//!
//! ```text
//! main() -> load config -> ListingClient::random_sample -> Dashboard::begin
//!                                                              |
//!                                                              v
//!                        fetch_details (concurrent, per-item timeout)
//!                                                              |
//!                                                              v
//!                                       Dashboard::complete -> render
//! ```
//!
//! `refresh` re-runs the detail fetch for the whole sample while any item is
//! still missing its image, up to `--rounds` times.
//!
//! Logs go to stderr so the list/detail output on stdout stays pipeable.

mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use randex_config::RandexConfig;
use randex_fetch::{ClientOptions, FetchOptions, ListingClient, TracingSink};
use randex_types::{Dashboard, EnrichedItem};

#[derive(Debug, Parser)]
#[command(name = "randex", version, about = "Browse a random sample of a REST collection")]
struct Cli {
    /// Config file (default: ~/.randex/config.toml).
    #[arg(long, global = true, env = "RANDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Number of items to sample.
    #[arg(long, global = true)]
    count: Option<usize>,

    /// Per-item detail timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Maximum in-flight detail requests (0 = unbounded).
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample and list items (default).
    List,
    /// Sample and show one item in detail.
    Show {
        /// Item to show; the first sampled item when absent or not sampled.
        name: Option<String>,
    },
    /// Sample, then re-fetch every item while some are missing an image.
    Refresh {
        /// Maximum number of full re-fetches after the first load.
        #[arg(long, default_value_t = 1)]
        rounds: usize,
    },
}

/// Everything one run needs, resolved from config and flags.
#[derive(Debug)]
struct Settings {
    base_url: String,
    resource: String,
    client: ClientOptions,
    listing_timeout: Duration,
    sample_size: usize,
    fetch: FetchOptions,
}

impl Settings {
    fn resolve(cli: &Cli, config: &RandexConfig) -> Result<Self> {
        let mut client = ClientOptions::default();
        if let Some(user_agent) = config.user_agent() {
            client = client.with_user_agent(user_agent);
        }

        let fetch = FetchOptions::default()
            .with_timeout_ms(cli.timeout_ms.unwrap_or_else(|| config.timeout_ms()))
            .context("invalid --timeout-ms")?
            .with_concurrency(cli.concurrency.unwrap_or_else(|| config.concurrency()))
            .with_display_pointer(config.display_pointer())
            .context("invalid fetch.display_pointer in config")?;

        Ok(Self {
            base_url: config.base_url(),
            resource: config.resource(),
            client,
            listing_timeout: config.listing_timeout(),
            sample_size: cli.count.unwrap_or_else(|| config.sample_size()),
            fetch,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RandexConfig> {
    let loaded = match path {
        Some(path) => RandexConfig::load_from(path)?,
        None => RandexConfig::load()?,
    };
    if loaded.is_none()
        && let Some(path) = path
    {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
    }
    Ok(loaded.unwrap_or_default())
}

/// Listing and detail fetching for one run.
struct Session {
    listing: ListingClient,
    fetch: FetchOptions,
}

impl Session {
    fn connect(settings: &Settings) -> Result<Self> {
        let http = randex_fetch::build_client(&settings.client)?;
        let listing = ListingClient::new(http, &settings.base_url, &settings.resource)?
            .with_timeout(settings.listing_timeout);
        Ok(Self {
            listing,
            fetch: settings.fetch.clone(),
        })
    }

    /// Sample `size` handles and fetch their details into `dashboard`.
    async fn load(&self, dashboard: &mut Dashboard, size: usize) -> Result<()> {
        let handles = self
            .listing
            .random_sample(size)
            .await
            .context("failed to list items")?;

        dashboard.begin(&handles);
        tracing::info!(
            count = handles.len(),
            endpoint = %self.listing.endpoint(),
            "Loading item details"
        );
        self.enrich(dashboard).await;
        Ok(())
    }

    /// Re-fetch the whole batch while any item failed, at most `rounds` times.
    /// Returns the number of re-fetches performed.
    async fn refresh(&self, dashboard: &mut Dashboard, rounds: usize) -> usize {
        let mut performed = 0;
        while performed < rounds {
            let failed = dashboard.failed().count();
            if failed == 0 {
                break;
            }
            tracing::info!(failed, round = performed + 1, "Refreshing item details");
            dashboard.refresh();
            self.enrich(dashboard).await;
            performed += 1;
        }
        performed
    }

    async fn enrich(&self, dashboard: &mut Dashboard) {
        let items = randex_fetch::fetch_details(
            self.listing.client(),
            dashboard.handles(),
            &self.fetch,
            &TracingSink,
        )
        .await;
        dashboard.complete(items);
    }
}

fn print_list(dashboard: &Dashboard, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(dashboard.items())?);
    } else {
        print!("{}", render::list(dashboard));
    }
    Ok(())
}

/// Select `name`, falling back to the first item when it is absent.
fn select_for_detail<'a>(
    dashboard: &'a mut Dashboard,
    name: Option<&str>,
) -> Option<&'a EnrichedItem> {
    let selected = match name {
        Some(name) if dashboard.select(name) => true,
        Some(name) => {
            tracing::warn!(name, "Item not in this sample, showing the first item instead");
            false
        }
        None => false,
    };
    if !selected {
        let first = dashboard.items().first()?.name.clone();
        dashboard.select(&first);
    }
    dashboard.selected()
}

/// Detail view text; JSON `null` when the sample is empty.
fn detail_output(item: Option<&EnrichedItem>, json: bool) -> Result<String> {
    Ok(match (item, json) {
        (Some(item), true) => format!("{}\n", serde_json::to_string_pretty(item)?),
        (None, true) => "null\n".to_string(),
        (Some(item), false) => render::detail(item),
        (None, false) => "No items.\n".to_string(),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &config)?;
    tracing::debug!(?settings, "Resolved settings");

    let session = Session::connect(&settings)?;
    let mut dashboard = Dashboard::new();
    session.load(&mut dashboard, settings.sample_size).await?;

    match &cli.command {
        None | Some(Command::List) => print_list(&dashboard, cli.json),
        Some(Command::Show { name }) => {
            let item = select_for_detail(&mut dashboard, name.as_deref());
            print!("{}", detail_output(item, cli.json)?);
            Ok(())
        }
        Some(Command::Refresh { rounds }) => {
            let performed = session.refresh(&mut dashboard, *rounds).await;
            tracing::debug!(performed, "Refresh finished");
            print_list(&dashboard, cli.json)
        }
    }
}

#[cfg(test)]
mod tests {
    use randex_types::{Phase, ReferenceHandle};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(content: &str) -> RandexConfig {
        toml::from_str(content).expect("valid config")
    }

    #[test]
    fn cli_parses_show_with_global_flags() {
        let cli = Cli::try_parse_from([
            "randex",
            "show",
            "pikachu",
            "--count",
            "5",
            "--timeout-ms",
            "250",
            "--json",
        ])
        .expect("valid args");

        assert_eq!(cli.count, Some(5));
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Command::Show { name: Some(ref n) }) if n == "pikachu"));
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["randex", "--count", "3", "--concurrency", "2"])
            .expect("valid args");
        let config = config("[fetch]\nsample_size = 20\ntimeout_ms = 750\nconcurrency = 8\n");

        let settings = Settings::resolve(&cli, &config).expect("valid settings");

        assert_eq!(settings.sample_size, 3);
        assert_eq!(settings.fetch.timeout, Duration::from_millis(750));
        assert_eq!(settings.fetch.concurrency.map(std::num::NonZeroUsize::get), Some(2));
        assert_eq!(settings.resource, "pokemon");
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let cli = Cli::try_parse_from(["randex", "--timeout-ms", "0"]).expect("valid args");
        assert!(Settings::resolve(&cli, &RandexConfig::default()).is_err());
    }

    #[test]
    fn relative_display_pointer_is_rejected() {
        let cli = Cli::try_parse_from(["randex"]).expect("valid args");
        let config = config("[fetch]\ndisplay_pointer = \"sprites/front_default\"\n");
        assert!(Settings::resolve(&cli, &config).is_err());
    }

    #[test]
    fn cli_parses_refresh_rounds() {
        let cli = Cli::try_parse_from(["randex", "refresh", "--rounds", "3"]).expect("valid args");
        assert!(matches!(cli.command, Some(Command::Refresh { rounds: 3 })));

        let cli = Cli::try_parse_from(["randex", "refresh"]).expect("valid args");
        assert!(matches!(cli.command, Some(Command::Refresh { rounds: 1 })));
    }

    #[test]
    fn show_json_on_empty_sample_is_null() {
        let mut dashboard = Dashboard::new();
        dashboard.begin(&[]);
        dashboard.complete(Vec::new());

        let item = select_for_detail(&mut dashboard, Some("mew"));
        assert!(item.is_none());
        assert_eq!(detail_output(item, true).unwrap(), "null\n");
        assert_eq!(detail_output(None, false).unwrap(), "No items.\n");
    }

    #[test]
    fn show_falls_back_to_first_item() {
        let handles = vec![
            ReferenceHandle::new("bulbasaur", "https://x/pokemon/1/").unwrap(),
            ReferenceHandle::new("mew", "https://x/pokemon/151/").unwrap(),
        ];
        let mut dashboard = Dashboard::new();
        dashboard.begin(&handles);
        dashboard.complete(handles.iter().map(EnrichedItem::degraded).collect());

        let item = select_for_detail(&mut dashboard, Some("pikachu")).cloned();
        assert_eq!(item.as_ref().map(|i| i.name.as_str()), Some("bulbasaur"));

        let json: serde_json::Value =
            serde_json::from_str(&detail_output(item.as_ref(), true).unwrap()).unwrap();
        assert_eq!(json["name"], "bulbasaur");
        assert_eq!(json["image"], serde_json::Value::Null);
    }

    fn session_for(server: &MockServer) -> Session {
        let cli = Cli::try_parse_from(["randex", "--timeout-ms", "2000"]).expect("valid args");
        let config = config(&format!("[api]\nbase_url = \"{}\"\n", server.uri()));
        let settings = Settings::resolve(&cli, &config).expect("valid settings");
        Session::connect(&settings).expect("session")
    }

    async fn mount_listing(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1,
                "results": [{ "name": "mew", "url": format!("{}/pokemon/151/", server.uri()) }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn refresh_refetches_until_items_recover() {
        let server = MockServer::start().await;
        mount_listing(&server).await;
        Mock::given(method("GET"))
            .and(path("/pokemon/151/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/151/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sprites": { "front_default": "https://img/151.png" }
            })))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut dashboard = Dashboard::new();
        session.load(&mut dashboard, 1).await.expect("listing succeeds");
        assert_eq!(dashboard.failed().count(), 1);

        let performed = session.refresh(&mut dashboard, 3).await;

        assert_eq!(performed, 1);
        assert_eq!(dashboard.phase(), Phase::Ready);
        assert_eq!(
            dashboard.items()[0].image.as_deref(),
            Some("https://img/151.png")
        );
    }

    #[tokio::test]
    async fn refresh_stops_after_the_round_limit() {
        let server = MockServer::start().await;
        mount_listing(&server).await;
        Mock::given(method("GET"))
            .and(path("/pokemon/151/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = session_for(&server);
        let mut dashboard = Dashboard::new();
        session.load(&mut dashboard, 1).await.expect("listing succeeds");

        assert_eq!(session.refresh(&mut dashboard, 2).await, 2);
        assert_eq!(dashboard.failed().count(), 1);

        let detail_requests = server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == "/pokemon/151/")
            .count();
        assert_eq!(detail_requests, 3);
    }
}
