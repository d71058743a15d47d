use clap::{Parser, Subcommand};
use console::style;
use favbadge_badge::badge_url_for;
use favbadge_config::{
    CONFIG_KEYS, RunConfig, RunOptions, config_exists, config_path, get_config_value, load_config,
    open_in_editor, resolve_run, set_config_value,
};
use favbadge_core::{FavError, FavResult, FetchResult, RepositoryTarget};
use favbadge_music::{ChromiumLauncher, ProviderDispatcher, resolve};
use favbadge_publish::{GitCli, PublishOutcome, Publisher};
use tracing::{Level, info};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Open config file in editor
    Edit,
    /// Print where the config file lives
    Path,
}

#[derive(Debug, Parser)]
#[command(name = "favbadge")]
#[command(
    version,
    about = "Creates a badge that shows your favorite music from YouTube Music or Last.fm",
    long_about = None
)]
struct Cli {
    /// User agent used while fetching the favorite music
    #[arg(long, alias = "userAgent")]
    user_agent: Option<String>,
    /// How long to try fetching from YouTube Music, e.g. 60s or 1m30s
    #[arg(long)]
    timeout: Option<String>,
    /// Badge message color (defaults to mistyrose)
    #[arg(long, alias = "messageColor")]
    message_color: Option<String>,
    /// Badge style, see https://shields.io/badges (defaults to for-the-badge)
    #[arg(long)]
    style: Option<String>,
    /// Badge logo name, not a filename (defaults to youtube-music)
    #[arg(long)]
    logo: Option<String>,
    #[arg(long, alias = "logoColor")]
    logo_color: Option<String>,
    #[arg(long, alias = "logoSize")]
    logo_size: Option<String>,
    /// Badge label color (defaults to darkred)
    #[arg(long, alias = "labelColor")]
    label_color: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long, alias = "cacheSeconds")]
    cache_seconds: Option<String>,
    /// Repository to clone and update with the badge, needs --filename
    #[arg(long)]
    repository: Option<String>,
    /// File in the repository that gets the badge, needs --repository
    #[arg(long)]
    filename: Option<String>,
    /// YouTube Music channel id or url, the channel needs "Enable public stats"
    #[arg(long, alias = "youtubeChannelId")]
    youtube_channel_id: Option<String>,
    /// Last.fm user to take the top track from, needs LAST_FM_API_KEY
    #[arg(long, alias = "lastFmUsername")]
    lastfm_username: Option<String>,
    /// Last.fm period: overall, 7day, 1month, 3month, 6month or 12month
    #[arg(long, alias = "lastFmPeriod")]
    lastfm_period: Option<String>,
    /// Provider priority when several are configured, e.g. "lastfm,youtube"
    #[arg(long)]
    fallback: Option<String>,
    /// Only print the badge url
    #[arg(long)]
    simple: bool,
    /// Log every scrape step and git command
    #[arg(short, long)]
    verbose: bool,
    /// Deprecated: use --youtube-channel-id
    #[arg(value_name = "CHANNEL_ID", hide = true)]
    legacy_channel_id: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout.clone(),
            message_color: self.message_color.clone(),
            style: self.style.clone(),
            logo: self.logo.clone(),
            logo_color: self.logo_color.clone(),
            logo_size: self.logo_size.clone(),
            label_color: self.label_color.clone(),
            color: self.color.clone(),
            cache_seconds: self.cache_seconds.clone(),
            repository: self.repository.clone(),
            filename: self.filename.clone(),
            youtube_channel_id: self.youtube_channel_id.clone(),
            legacy_channel_id: self.legacy_channel_id.clone(),
            lastfm_username: self.lastfm_username.clone(),
            lastfm_period: self.lastfm_period.clone(),
            fallback: self.fallback.clone(),
            simple: self.simple,
        }
    }
}

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(Commands::Config { action }) = cli.command.take() {
        if let Err(err) = handle_config_command(action) {
            fail(&err);
        }
        return;
    }

    let config = load_config().unwrap_or_else(|err| fail(&err));
    let run = resolve_run(&config, cli.run_options()).unwrap_or_else(|err| fail(&err));

    if let Err(err) = execute(&run).await {
        fail(&err);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(err: &FavError) -> ! {
    eprintln!("{} {err}", style("Error:").red());
    std::process::exit(exit_code(err));
}

fn exit_code(err: &FavError) -> i32 {
    match err {
        FavError::Config(_) => 64,
        _ => 1,
    }
}

async fn execute(run: &RunConfig) -> FavResult<()> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("favbadge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| FavError::Network(format!("failed to build http client: {err}")))?;
    let mut launcher = ChromiumLauncher::default();
    if let Some(executable) = &run.chrome_executable {
        launcher = launcher.with_executable(executable);
    }
    let dispatcher = ProviderDispatcher::new(client, launcher, run.user_agent.clone(), run.timeout);

    let favorite = resolve(&dispatcher, &run.providers).await?;
    let image_link = badge_url_for(&favorite, &run.badge);
    print_favorite(&favorite, &image_link, run.simple);

    if let Some(target) = &run.repository {
        info!("the image link has been generated, updating {}", target.remote_url);
        let outcome = Publisher::new(GitCli::default())
            .publish(target, &image_link, &favorite.track_url)
            .await?;
        if !run.simple {
            print_outcome(outcome, target);
        }
    }
    Ok(())
}

fn print_favorite(favorite: &FetchResult, image_link: &str, simple: bool) {
    if simple {
        println!("{image_link}");
        return;
    }
    println!(
        "{} {} by {} ({})",
        style("Favorite music:").cyan(),
        favorite.track_name,
        favorite.artist_name,
        favorite.track_url
    );
    println!("{} {image_link}", style("Badge:").green());
}

fn print_outcome(outcome: PublishOutcome, target: &RepositoryTarget) {
    match outcome {
        PublishOutcome::Committed => println!(
            "{} pushed the badge to {} ({})",
            style("✓").green(),
            target.remote_url,
            target.file_path.display()
        ),
        PublishOutcome::Unchanged => println!(
            "{} same favorite music, {} left unchanged",
            style("=").dim(),
            target.remote_url
        ),
    }
}

fn handle_config_command(action: ConfigAction) -> FavResult<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config()?;
            match get_config_value(&config, &key)? {
                Some(v) => println!("{} = {}", key, v),
                None => println!("{} = <null>", key),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            set_config_value(&key, &value)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
            Ok(())
        }
        ConfigAction::List => {
            let config = load_config()?;
            println!("Current configuration:");
            let mut section = "";
            for key in CONFIG_KEYS {
                let (table, field) = key.split_once('.').unwrap_or(("", key));
                if table != section {
                    println!("\n[{table}]");
                    section = table;
                }
                let value = get_config_value(&config, key)?;
                println!("{field} = {}", display_value(key, value.as_deref()));
            }
            Ok(())
        }
        ConfigAction::Edit => {
            open_in_editor()?;
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_path()?;
            let state = if config_exists()? { "" } else { " (not created yet)" };
            println!("{}{state}", path.display());
            Ok(())
        }
    }
}

fn display_value(key: &str, value: Option<&str>) -> String {
    match value {
        None => "<null>".to_string(),
        Some(_) if key.ends_with("api_key") => "<hidden>".to_string(),
        Some(value) => value.to_string(),
    }
}
