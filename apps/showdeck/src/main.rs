use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use showdeck::config::Config;
use showdeck::error::{AppError, Result};
use showdeck::services::{CatalogSource, ShowIndex, TvMazeClient};

const USAGE: &str = "\
Usage: showdeck <command> [args]

Commands:
  browse [--pages N]   load the show index (plus N extra pages) and print genre buckets
  search <term>        search the catalog for shows matching <term>
  show <id>            fetch one show's detail with cast and episodes
";

fn init_tracing() {
    // RUST_LOG controls log levels; default to debug for our crate only
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showdeck=debug,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<()> {
    let config = Config::load()?;
    let client = TvMazeClient::new_shared(&config.api)?;

    match args.first().map(String::as_str) {
        Some("browse") => browse(client, &config, parse_pages(&args[1..])?).await,
        Some("search") if args.len() >= 2 => search(client, &args[1..].join(" ")).await,
        Some("show") if args.len() == 2 => {
            let id = args[1]
                .parse::<u64>()
                .map_err(|_| AppError::Internal(format!("invalid show id: {}", args[1])))?;
            show(client, id).await
        }
        _ => {
            eprint!("{}", USAGE);
            Err(AppError::Internal("missing or unknown command".to_string()))
        }
    }
}

fn parse_pages(args: &[String]) -> Result<u32> {
    match args {
        [] => Ok(0),
        [flag, n] if flag == "--pages" => n
            .parse()
            .map_err(|_| AppError::Internal(format!("invalid page count: {}", n))),
        _ => Err(AppError::Internal(
            "usage: showdeck browse [--pages N]".to_string(),
        )),
    }
}

async fn browse(client: Arc<TvMazeClient>, config: &Config, extra_pages: u32) -> Result<()> {
    let index = ShowIndex::new(client, config.api.initial_page_range());

    index.init(false).await;
    if let Some(message) = index.error().await {
        return Err(AppError::Internal(message));
    }
    for _ in 0..extra_pages {
        index.load_more(1).await;
    }

    let snapshot = index.snapshot().await;
    if let Some(message) = snapshot.error {
        eprintln!("warning: {}", message);
    }

    println!(
        "{} shows across {} genres\n",
        snapshot.shows.len(),
        snapshot.genre_buckets.len()
    );
    for (genre, shows) in &snapshot.genre_buckets {
        if let Some(top) = shows.first() {
            println!(
                "{:<20} {:>4} shows   top: {} ({:.1})",
                genre,
                shows.len(),
                top.name,
                top.rating_average()
            );
        }
    }
    Ok(())
}

async fn search(client: Arc<TvMazeClient>, term: &str) -> Result<()> {
    let shows = client.search_shows(term, CancellationToken::new()).await?;

    if shows.is_empty() {
        println!("no shows matched {:?}", term);
        return Ok(());
    }
    for show in shows {
        println!(
            "{:>6}  {} ({})  {}",
            show.id,
            show.name,
            show.status.as_deref().unwrap_or("?"),
            show.genres.join(", ")
        );
    }
    Ok(())
}

async fn show(client: Arc<TvMazeClient>, id: u64) -> Result<()> {
    let detail = client.get_show(id).await?;

    println!("{} (id {})", detail.show.name, detail.show.id);
    if let Some(status) = &detail.show.status {
        println!("status:    {}", status);
    }
    if !detail.show.genres.is_empty() {
        println!("genres:    {}", detail.show.genres.join(", "));
    }
    if let Some(average) = detail.show.rating.average {
        println!("rating:    {:.1}", average);
    }
    if let Some(premiered) = &detail.show.premiered {
        println!("premiered: {}", premiered);
    }
    if let Some(network) = &detail.network {
        println!("network:   {}", network.name);
    }
    if let Some(channel) = &detail.web_channel {
        println!("channel:   {}", channel.name);
    }
    if let Some(site) = &detail.official_site {
        println!("site:      {}", site);
    }

    let cast = detail.cast();
    if !cast.is_empty() {
        println!("\ncast:");
        for credit in cast.iter().take(10) {
            println!("  {} as {}", credit.person.name, credit.character.name);
        }
    }
    let episodes = detail.episodes();
    if !episodes.is_empty() {
        let seasons = episodes.iter().map(|e| e.season).max().unwrap_or(0);
        println!("\n{} episodes across {} seasons", episodes.len(), seasons);
    }
    Ok(())
}
