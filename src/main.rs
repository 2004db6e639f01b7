use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use divine_words_core::{
    daily, Catalog, Config, Locale, Passage, ReferenceQuery, Selection, Session,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, info};

mod app;
mod handler;
mod logging;
mod server;
mod tui;
mod ui;

use app::App;
use logging::{init_logging, LogConfig, LogTarget};
use server::ServerConfig;

#[derive(Parser)]
#[command(name = "divine-words")]
#[command(version, about = "Resolve scripture references and forward passage lookups to bible-api.com")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Upstream passage provider base URL
    #[arg(long, global = true)]
    upstream: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP forwarding service (default)
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        listen: Option<String>,
        /// Directory holding the web front end; unknown paths serve its index.html
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Pick book, chapter and verse in the terminal
    Browse {
        /// Interface language (de, en)
        #[arg(short, long)]
        locale: Option<String>,
        /// Start on the verse of the day instead of the book list
        #[arg(long)]
        daily: bool,
    },
    /// List the books of the canon
    Books {
        /// Interface language (de, en)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Show the verse of the day
    Daily {
        /// Translation code, e.g. web, kjv, elberfelder
        #[arg(short, long)]
        translation: Option<String>,
        /// Interface language (de, en)
        #[arg(short, long)]
        locale: Option<String>,
        /// Day to show instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Look up one passage, e.g. "John 3:16" or "Johannes 3:1-3"
    Lookup {
        reference: String,
        /// Translation code, e.g. web, kjv, elberfelder
        #[arg(short, long)]
        translation: Option<String>,
        /// Interface language (de, en)
        #[arg(short, long)]
        locale: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(upstream) = cli.upstream {
        config.upstream_url = upstream;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let target = match &cli.command {
        // The terminal front end owns stderr
        Some(Commands::Browse { .. }) => {
            LogTarget::File(Config::config_dir()?.join("divine-words.log"))
        }
        _ => LogTarget::Stderr,
    };
    init_logging(&LogConfig::from_verbosity(cli.verbose, target))?;
    debug!(?config, "configuration loaded");

    match cli.command {
        None => serve(config, None, None).await,
        Some(Commands::Serve { listen, static_dir }) => serve(config, listen, static_dir).await,
        Some(Commands::Browse { locale, daily }) => browse(config, locale.as_deref(), daily).await,
        Some(Commands::Books { locale }) => list_books(&config, locale.as_deref()),
        Some(Commands::Daily { translation, locale, date }) => {
            show_daily(&config, translation.as_deref(), locale.as_deref(), date).await
        }
        Some(Commands::Lookup { reference, translation, locale }) => {
            lookup(&config, &reference, translation.as_deref(), locale.as_deref()).await
        }
    }
}

fn parse_locale(locale: Option<&str>, fallback: Locale) -> Result<Locale> {
    match locale {
        None => Ok(fallback),
        Some(s) => Ok(s.parse::<Locale>()?),
    }
}

async fn serve(config: Config, listen: Option<String>, static_dir: Option<PathBuf>) -> Result<()> {
    let listen = listen.unwrap_or_else(|| config.listen_addr.clone());
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", listen))?;

    let server_config = ServerConfig {
        addr,
        static_dir: static_dir.or_else(|| config.static_dir.clone()),
    };
    server::serve(server_config, config.gateway(), config.range_span).await
}

async fn browse(config: Config, locale: Option<&str>, start_daily: bool) -> Result<()> {
    let selection = match locale {
        Some(_) => Selection::new(parse_locale(locale, config.locale)?),
        None => config.selection(),
    };
    let session = Session::new(selection, config.gateway(), config.range_span);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(session, events.sender());
    if start_daily {
        app.show_daily();
    }
    info!("terminal browser started");

    let result = run(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

fn list_books(config: &Config, locale: Option<&str>) -> Result<()> {
    let locale = parse_locale(locale, config.locale)?;
    let labels = locale.labels();
    println!("{:>3}  {:<14} {:<24} {}", "#", "key", labels.book, labels.chapter);
    for entry in Catalog::standard().list_books(locale) {
        println!(
            "{:>3}  {:<14} {:<24} {}",
            entry.ordinal, entry.key, entry.name, entry.chapters
        );
    }
    Ok(())
}

/// Drive a fresh session through the typed reference, then fetch it
async fn lookup(
    config: &Config,
    reference: &str,
    translation: Option<&str>,
    locale: Option<&str>,
) -> Result<()> {
    let query = ReferenceQuery::parse(reference)
        .ok_or_else(|| anyhow!("Could not read reference: {}", reference))?;

    let mut session = one_shot_session(config, translation, locale)?;
    session.apply_query(&query)?;

    let passage = session.submit().await?;
    print_passage(&passage.label(), &passage);
    Ok(())
}

async fn show_daily(
    config: &Config,
    translation: Option<&str>,
    locale: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let date = date.unwrap_or_else(daily::today);
    let mut session = one_shot_session(config, translation, locale)?;
    let locale = session.selection().locale();
    let caption = format!(
        "{}: {}",
        locale.labels().daily,
        daily::describe(&daily::daily_reference(date), locale)
    );

    let passage = session.daily(date).await?;
    print_passage(&caption, &passage);
    Ok(())
}

/// Session for a single command-line lookup
fn one_shot_session(
    config: &Config,
    translation: Option<&str>,
    locale: Option<&str>,
) -> Result<Session> {
    // Without an explicit locale, use the one the translation belongs to
    let fallback = translation
        .and_then(|code| {
            Locale::all()
                .into_iter()
                .find(|l| l.has_translation(code))
        })
        .unwrap_or(config.locale);
    let locale = parse_locale(locale, fallback)?;

    let mut selection = match (translation, &config.translation) {
        (Some(_), _) => Selection::new(locale),
        (None, Some(code)) => Selection::with_translation(locale, code),
        (None, None) => Selection::new(locale),
    };
    if let Some(code) = translation {
        selection.set_translation(code)?;
    }

    Ok(Session::new(selection, config.gateway(), config.range_span))
}

fn print_passage(caption: &str, passage: &Passage) {
    println!("{}", caption);
    println!();
    if passage.verses.is_empty() {
        println!("{}", passage.text.trim());
    } else {
        for verse in &passage.verses {
            println!("{} {}", verse.verse, verse.text.trim());
        }
    }
    if let Some(name) = &passage.translation_name {
        println!();
        println!("{}", name);
    }
}
