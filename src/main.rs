mod app;
mod catalog;
mod config;
mod logging;
mod router;
mod search;
mod storage;
mod theme;
mod ui;
mod watchlist;

use app::{App, InputMode, View};
use catalog::{Catalog, CatalogResult, Movie, TmdbClient};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use indicatif::{ProgressBar, ProgressStyle};
use router::Location;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{FileStorage, Storage};
use watchlist::WatchlistStore;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browse trending movies, search the catalog and keep a local watchlist
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory for the watchlist, settings and logs (overrides FILMFLUX_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TUI (default)
    Run {
        /// Starting location, e.g. "/", "/?search=heat", "/movies/27205", "/watchlist"
        #[arg(default_value = "/")]
        location: Location,
    },
    /// Print this week's trending movies
    Trending,
    /// Search the catalog by title
    Search {
        query: String,
    },
    /// Print the details of one movie
    Show {
        id: u64,
    },
    /// Manage the saved watchlist
    #[command(subcommand)]
    Watchlist(WatchlistCommand),
}

#[derive(Subcommand)]
enum WatchlistCommand {
    /// List saved movies
    List,
    /// Look up a movie and save it
    Add { id: u64 },
    /// Remove a saved movie
    Remove { id: u64 },
    /// Remove every saved movie
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        location: Location::home(),
    });

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    let data_dir = config.data_dir()?;
    let storage = Arc::new(FileStorage::new(&data_dir));

    if matches!(command, Commands::Run { .. }) {
        logging::init_file_logging(cli.verbose, &data_dir.join("logs"))?;
    } else {
        logging::init_stderr_logging(cli.verbose);
    }
    config.warn_if_incomplete();
    tracing::debug!(data_dir = %storage.dir().display(), "Using data directory");

    let catalog = TmdbClient::new(config.api_key().map(str::to_string), config.api_url.clone())?;

    match command {
        Commands::Run { location } => {
            let mut app = App::new(Arc::new(catalog), storage, config.debounce(), location);
            app.init();

            // Init terminal
            let mut terminal = ratatui::init();

            // Main loop
            let result = run_app(&mut terminal, &mut app);

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                tracing::error!(error = %e, "TUI exited with an error");
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Trending => {
            let movies = or_exit(with_spinner("Fetching trending movies...", catalog.trending()).await);
            let watchlist = WatchlistStore::initialize(storage);
            print_movies(&movies, &watchlist);
        }
        Commands::Search { query } => {
            let query = query.trim();
            if query.is_empty() {
                eprintln!("Error: search query is empty");
                std::process::exit(1);
            }
            let movies = or_exit(with_spinner("Searching...", catalog.search(query)).await);
            if movies.is_empty() {
                println!("No movies found for \"{query}\"");
            } else {
                let watchlist = WatchlistStore::initialize(storage);
                print_movies(&movies, &watchlist);
            }
        }
        Commands::Show { id } => {
            let details = or_exit(with_spinner("Loading movie details...", catalog.details(id)).await);
            let movie = &details.movie;
            let watchlist = WatchlistStore::initialize(storage);

            println!("{} ({})", movie.title, movie.year_label());
            if let Some(tagline) = details.tagline() {
                println!("\"{tagline}\"");
            }
            println!();
            println!("Runtime:  {}", details.runtime_label());
            println!("Rating:   ★ {}", movie.rating_label());
            if let Some(date) = movie.release_date_label() {
                println!("Released: {date}");
            }
            let genres = details.genre_names();
            if !genres.is_empty() {
                println!("Genres:   {}", genres.join(", "));
            }
            if let Some(url) = movie.poster_url() {
                println!("Poster:   {url}");
            }
            if watchlist.contains(movie.id) {
                println!("★ In your watchlist");
            }
            println!();
            println!("{}", movie.overview_text());
        }
        Commands::Watchlist(cmd) => run_watchlist(cmd, storage, &catalog).await?,
    }

    Ok(())
}

async fn run_watchlist(
    cmd: WatchlistCommand,
    storage: Arc<dyn Storage>,
    catalog: &dyn Catalog,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut watchlist = WatchlistStore::initialize(storage);
    match cmd {
        WatchlistCommand::List => {
            if watchlist.is_empty() {
                println!("Your watchlist is empty");
            } else {
                print_movies(watchlist.entries(), &watchlist);
                println!("{}", watchlist.saved_label());
            }
        }
        WatchlistCommand::Add { id } => {
            if watchlist.contains(id) {
                println!("Movie {id} is already in your watchlist");
                return Ok(());
            }
            let details = or_exit(with_spinner("Looking up movie...", catalog.details(id)).await);
            let title = details.movie.title.clone();
            watchlist.add(details.movie)?;
            println!("Added \"{title}\" to watchlist ({})", watchlist.saved_label());
        }
        WatchlistCommand::Remove { id } => {
            if watchlist.remove(id)? {
                println!("Removed movie {id} ({})", watchlist.saved_label());
            } else {
                println!("Movie {id} is not in your watchlist");
            }
        }
        WatchlistCommand::Clear => {
            let removed = watchlist.clear()?;
            println!("Removed {removed} movie{}", if removed == 1 { "" } else { "s" });
        }
    }
    Ok(())
}

fn print_movies(movies: &[Movie], watchlist: &WatchlistStore) {
    for movie in movies {
        let marker = if watchlist.contains(movie.id) { "★" } else { " " };
        println!(
            "{marker} {:>8}  {:<50} {:>4}  ★ {}",
            movie.id,
            ui::truncate_str(&movie.title, 50),
            movie.year_label(),
            movie.rating_label()
        );
    }
}

/// Await `fut` behind a spinner on stderr.
async fn with_spinner<T>(message: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    pb.finish_and_clear();
    output
}

fn or_exit<T>(result: CatalogResult<T>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    })
}

fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain_fetched();
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Wake up in time for a pending search, otherwise every 250ms
        let timeout = match app.search.next_deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }

    // Help toggle (global)
    if key.code == KeyCode::Char('?') {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.view() {
        View::Home => handle_home_key(app, key),
        View::Detail => handle_detail_key(app, key),
        View::Watchlist => handle_watchlist_key(app, key),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.stop_editing(),
        KeyCode::Backspace => app.input_backspace(Instant::now()),
        KeyCode::Char(c) => app.input_char(c, Instant::now()),
        _ => {}
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.start_editing(),
        KeyCode::Esc => {
            if app.active_query().is_some() || !app.search.buffer().is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('w') => app.toggle_watchlist(),
        KeyCode::Char('W') => app.open_watchlist(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('h') | KeyCode::Backspace => app.go_back(),
        KeyCode::Char('l') => app.go_forward(),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Backspace => {
            app.go_back()
        }
        KeyCode::Char('l') => app.go_forward(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
        KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::Char('w') => app.toggle_watchlist(),
        KeyCode::Char('W') => app.open_watchlist(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('t') => app.toggle_theme(),
        _ => {}
    }
}

fn handle_watchlist_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Backspace => {
            app.go_back()
        }
        KeyCode::Char('l') => app.go_forward(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('w') | KeyCode::Char('d') => app.toggle_watchlist(),
        KeyCode::Char('t') => app.toggle_theme(),
        _ => {}
    }
}
