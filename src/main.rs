use std::sync::Arc;

use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use windwalker::models::{DetailTab, TreatyStatus};
use windwalker::render;
use windwalker::{
    ClientConfig, DataService, HeadlessMap, HttpDataService, MapSurface, MemoryHistory, Windwalker,
};

#[derive(Parser)]
#[command(name = "ww")]
#[command(about = "Headless driver for the Windwalker treaty explorer")]
struct Cli {
    /// Data service root URL (overrides WINDWALKER_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the data service status
    Health,
    /// Load a view and print it
    View {
        /// Navigation path, e.g. /treaties
        #[arg(default_value = "/")]
        path: String,

        /// Temporal cutoff year
        #[arg(short, long)]
        year: Option<i32>,

        /// Status filter (Active, Violated, Unknown)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Search treaties and tribes
    Search { query: String },
    /// Play the timeline up to the end of the treaty era
    Play {
        /// Year to start from
        #[arg(long, default_value_t = windwalker::models::FIRST_TREATY_YEAR)]
        from: i32,
    },
    /// Print the detail panel for one treaty
    Treaty {
        id: String,

        /// overview, parties, text or sources
        #[arg(short, long, default_value = "overview")]
        tab: DetailTab,
    },
}

/// Log to stderr so rendered output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "windwalker=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn engine(config: &ClientConfig, path: &str) -> Windwalker<HttpDataService> {
    let service = HttpDataService::from_config(config);
    let history = Arc::new(MemoryHistory::new(path));
    let surface: Arc<dyn MapSurface> = Arc::new(HeadlessMap::new());
    Windwalker::new(service, history, surface, config.clone())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ClientConfig::load();
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    match cli.command {
        Commands::Health => {
            let service = HttpDataService::from_config(&config);
            let health = service.health().await?;
            println!("{}: {}", service.base_url(), health.status);
            if let Some(database) = &health.database {
                println!("database: {}", database);
            }
            if !health.is_healthy() {
                anyhow::bail!("data service is not healthy");
            }
        }
        Commands::View { path, year, status } => {
            let status = match status {
                Some(s) => TreatyStatus::parse_filter(&s).map_err(anyhow::Error::msg)?,
                None => None,
            };

            let app = engine(&config, &path);
            app.start().await.into_result()?;
            if let Some(year) = year {
                app.temporal().set_year(year).await.into_result()?;
            }
            app.set_status_filter(status);
            print!("{}", app.render());
        }
        Commands::Search { query } => {
            let app = engine(&config, "/");
            app.state().update(|s| s.search_query = query.clone());
            let found = app.search().search_now(&query).await.into_result()?;
            tracing::info!("{} results for {:?}", found.unwrap_or(0), query);

            let mut output = String::new();
            render::render_search_results(&mut output, &app.snapshot());
            print!("{}", output);
        }
        Commands::Play { from } => {
            let app = engine(&config, "/");
            app.temporal().set_year(from).await.into_result()?;

            let last = Arc::new(Mutex::new(None::<(i32, usize)>));
            let printed = Arc::clone(&last);
            let _progress = app.state().subscribe(move |state| {
                let frame = (state.year_cutoff, state.treaties.len());
                let mut last = printed.lock();
                if *last != Some(frame) {
                    *last = Some(frame);
                    println!("{:<26} {} treaties", render::year_label(frame.0), frame.1);
                }
            });

            app.temporal().toggle_play();
            while app.temporal().is_playing() {
                tokio::time::sleep(app.config().playback_period()).await;
            }
            // Let the fetch for the final year land
            tokio::time::sleep(app.config().playback_period()).await;
            app.shutdown();
        }
        Commands::Treaty { id, tab } => {
            let app = engine(&config, "/");
            app.select_treaty(&id).await.into_result()?;
            app.selection().switch_tab(tab);

            let snapshot = app.snapshot();
            if let Some(treaty) = &snapshot.selected_treaty {
                let mut output = String::new();
                render::render_detail(&mut output, treaty, snapshot.detail_tab);
                print!("{}", output);
            }
        }
    }

    Ok(())
}
