// Matchup luck entry point.
//
// 1. Initialize tracing (log to file; stdout carries the report)
// 2. Parse flags and load config
// 3. Load the league response from cache or ESPN
// 4. Compute luck and print the report
// 5. Save text and HTML copies

use matchup_luck_cli::cli::Cli;
use matchup_luck_cli::{app, config, report, term};
use matchup_luck_espn::{EspnClient, ResponseCache, ResponseOrigin};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("matchup-luck starting up");

    let result = run(Cli::parse()).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    let options = cli.resolve(&config).context("invalid arguments")?;
    info!(
        "Analysing league {} season {} ({:?}, bye policy {:?})",
        options.key.league_id, options.key.season, options.luck.aggregation, options.luck.bye_policy
    );
    if let Some(url) = &cli.url {
        term::info(&format!("Parsed league URL: {url}"));
    }

    let cookies = config.credentials.cookies();
    if cookies.is_some() {
        info!("Using ESPN cookies from credentials.toml");
    }
    let client = EspnClient::new(config.espn.base_url.clone(), cookies);
    let cache = config
        .cache
        .enabled
        .then(|| ResponseCache::new(&config.paths.cache_dir));

    let today = chrono::Local::now().date_naive();
    let analysis = app::analyze(&client, cache.as_ref(), &options, &config.directions, today).await?;

    match &analysis.origin {
        ResponseOrigin::Cache(path) => term::success(&format!("Loaded cached data from {}", path.display())),
        ResponseOrigin::Remote => term::success("Fetched league data from ESPN"),
    }
    term::info(&format!("League: {}", analysis.league_name));
    term::info(&analysis.team_mappings);
    term::info(&analysis.stat_mappings);

    println!();
    print!("{}", report::render_text(&analysis.report, &analysis.table, true));

    if options.save {
        let saved = report::save_reports(
            std::path::Path::new(&config.paths.output_dir),
            &options.key,
            today,
            &analysis.league_name,
            &analysis.report,
            &analysis.table,
        )
        .with_context(|| format!("failed to write reports to {}", config.paths.output_dir))?;
        println!();
        term::success("Output saved to:");
        term::success(&format!("Text: {}", saved.text.display()));
        term::success(&format!("HTML: {}", saved.html.display()));
    }

    info!("matchup-luck finished");
    Ok(())
}

/// Initialize tracing to log to a file, keeping stdout for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("matchup-luck.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matchup_luck=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}
