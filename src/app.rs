use crate::catalog::{Catalog, CatalogError, Movie, MovieDetails};
use crate::router::{Location, Route, Router};
use crate::search::SearchSynchronizer;
use crate::storage::Storage;
use crate::theme::Theme;
use crate::watchlist::WatchlistStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Which view is currently active. Derived from the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Detail,
    Watchlist,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Content of the home view.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Loading,
    Loaded(Vec<Movie>),
    /// The catalog answered with zero movies.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Box<MovieDetails>),
    Failed(String),
}

/// Outcome of a spawned catalog request, tagged with the load it answers.
#[derive(Debug)]
pub enum Fetched {
    Listing {
        generation: u64,
        result: Result<Vec<Movie>, CatalogError>,
    },
    Details {
        generation: u64,
        result: Result<MovieDetails, CatalogError>,
    },
}

impl Fetched {
    fn generation(&self) -> u64 {
        match self {
            Self::Listing { generation, .. } | Self::Details { generation, .. } => *generation,
        }
    }
}

/// Main application state.
pub struct App {
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn Storage>,
    pub watchlist: WatchlistStore,
    pub router: Router,
    pub search: SearchSynchronizer,
    pub theme: Theme,

    pub should_quit: bool,
    pub show_help: bool,
    pub input_mode: InputMode,

    pub listing: Listing,
    pub list_selected: usize,
    pub watchlist_selected: usize,

    pub detail: DetailState,
    pub detail_scroll: u16,

    // Status message
    pub status_msg: String,

    // Bumped on every load; results from older loads are dropped
    generation: u64,
    fetch_tx: mpsc::UnboundedSender<Fetched>,
    fetch_rx: mpsc::UnboundedReceiver<Fetched>,
}

impl App {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn Storage>,
        debounce: Duration,
        start: Location,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let watchlist = WatchlistStore::initialize(Arc::clone(&storage));
        let theme = Theme::load(storage.as_ref());

        Self {
            catalog,
            storage,
            watchlist,
            router: Router::new(start),
            search: SearchSynchronizer::new(debounce),
            theme,

            should_quit: false,
            show_help: false,
            input_mode: InputMode::Normal,

            listing: Listing::Loading,
            list_selected: 0,
            watchlist_selected: 0,

            detail: DetailState::Loading,
            detail_scroll: 0,

            status_msg: "Loading...".to_string(),

            generation: 0,
            fetch_tx,
            fetch_rx,
        }
    }

    /// Mount the starting location: sync the search bar and start its load.
    pub fn init(&mut self) {
        let current = self.router.current().clone();
        self.search.resync(&current);
        tracing::info!(location = %current, "Starting");
        self.load_current();
    }

    pub fn view(&self) -> View {
        match self.router.current().route {
            Route::Home => View::Home,
            Route::Movie(_) => View::Detail,
            Route::Watchlist => View::Watchlist,
        }
    }

    /// Active search query from the location, if any.
    pub fn active_query(&self) -> Option<&str> {
        self.router.current().query()
    }

    /// Start the fetch backing the current location.
    pub fn load_current(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let catalog = Arc::clone(&self.catalog);
        let tx = self.fetch_tx.clone();

        match self.router.current().route {
            Route::Home => {
                self.listing = Listing::Loading;
                self.list_selected = 0;
                let query = self.router.current().search.clone();
                self.status_msg = match &query {
                    Some(q) => format!("Searching for \"{q}\"..."),
                    None => "Loading trending movies...".to_string(),
                };
                tokio::spawn(async move {
                    let result = match query.as_deref() {
                        Some(q) => catalog.search(q).await,
                        None => catalog.trending().await,
                    };
                    let _ = tx.send(Fetched::Listing { generation, result });
                });
            }
            Route::Movie(id) => {
                self.detail = DetailState::Loading;
                self.detail_scroll = 0;
                self.status_msg = "Loading movie details...".to_string();
                tokio::spawn(async move {
                    let result = catalog.details(id).await;
                    let _ = tx.send(Fetched::Details { generation, result });
                });
            }
            Route::Watchlist => {
                self.watchlist_selected = self
                    .watchlist_selected
                    .min(self.watchlist.len().saturating_sub(1));
                self.status_msg = self.watchlist.saved_label();
            }
        }
    }

    /// Apply every fetch result that has arrived since the last call.
    pub fn drain_fetched(&mut self) {
        while let Ok(fetched) = self.fetch_rx.try_recv() {
            self.apply_fetched(fetched);
        }
    }

    fn apply_fetched(&mut self, fetched: Fetched) {
        if fetched.generation() != self.generation {
            tracing::debug!(
                generation = fetched.generation(),
                latest = self.generation,
                "Discarding superseded fetch result"
            );
            return;
        }

        match fetched {
            Fetched::Listing { result, .. } => {
                self.listing = match result {
                    Ok(movies) if movies.is_empty() => Listing::Empty,
                    Ok(movies) => Listing::Loaded(movies),
                    Err(e) => Listing::Failed(e.user_message()),
                };
                self.list_selected = 0;
                self.status_msg = match (&self.listing, self.active_query()) {
                    (Listing::Loaded(movies), Some(q)) => format!(
                        "{} result{} for \"{}\"",
                        movies.len(),
                        if movies.len() == 1 { "" } else { "s" },
                        q
                    ),
                    (Listing::Loaded(movies), None) => {
                        format!("{} trending movies this week", movies.len())
                    }
                    (Listing::Failed(_), _) => "Press r to reload".to_string(),
                    _ => String::new(),
                };
            }
            Fetched::Details { result, .. } => {
                self.detail = match result {
                    Ok(details) => {
                        self.status_msg = details.movie.title.clone();
                        DetailState::Loaded(Box::new(details))
                    }
                    Err(_) => {
                        self.status_msg = "Press r to reload".to_string();
                        DetailState::Failed("Failed to load movie details.".to_string())
                    }
                };
            }
        }
    }

    /// Navigate to `location` as a new history entry.
    pub fn navigate(&mut self, location: Location) {
        let previous = self.router.current().route;
        if self.router.push(location) {
            self.location_changed(previous, false);
        }
    }

    /// History back; with no history, fall back to the home view.
    pub fn go_back(&mut self) {
        let previous = self.router.current().route;
        if self.router.back() {
            self.location_changed(previous, true);
        } else if previous != Route::Home {
            self.navigate(Location::home());
        }
    }

    pub fn go_forward(&mut self) {
        let previous = self.router.current().route;
        if self.router.forward() {
            self.location_changed(previous, true);
        }
    }

    fn location_changed(&mut self, previous: Route, from_history: bool) {
        let current = self.router.current().clone();
        match current.route {
            Route::Home => {
                // Mounting the search bar, or back/forward: the location wins
                if from_history || previous != Route::Home {
                    self.search.resync(&current);
                }
            }
            Route::Movie(_) | Route::Watchlist => {
                self.search.cancel();
                self.input_mode = InputMode::Normal;
            }
        }
        self.load_current();
    }

    /// Let the search debounce fire if its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(target) = self.search.poll(now) {
            self.navigate(target);
        }
    }

    pub fn start_editing(&mut self) {
        if self.view() == View::Home {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char, now: Instant) {
        self.search.push_char(c, now);
    }

    pub fn input_backspace(&mut self, now: Instant) {
        self.search.pop_char(now);
    }

    /// Drop the search right away and go back to trending.
    pub fn clear_search(&mut self) {
        self.search.resync(&Location::home());
        self.navigate(Location::home());
    }

    /// Movies listed by the current view.
    pub fn visible_movies(&self) -> &[Movie] {
        match self.view() {
            View::Home => match &self.listing {
                Listing::Loaded(movies) => movies,
                _ => &[],
            },
            View::Watchlist => self.watchlist.entries(),
            View::Detail => &[],
        }
    }

    /// First trending movie, shown as the featured card.
    pub fn featured(&self) -> Option<&Movie> {
        if self.active_query().is_some() {
            return None;
        }
        match &self.listing {
            Listing::Loaded(movies) => movies.first(),
            _ => None,
        }
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        match self.view() {
            View::Home => self.visible_movies().get(self.list_selected),
            View::Watchlist => self.watchlist.entries().get(self.watchlist_selected),
            View::Detail => match &self.detail {
                DetailState::Loaded(details) => Some(&details.movie),
                _ => None,
            },
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.view() {
            View::Watchlist => &mut self.watchlist_selected,
            _ => &mut self.list_selected,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible_movies().len();
        let selected = self.selection_mut();
        if *selected + 1 < len {
            *selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(1);
    }

    pub fn open_selected(&mut self) {
        if self.view() == View::Detail {
            return;
        }
        if let Some(id) = self.selected_movie().map(|m| m.id) {
            self.navigate(Location::movie(id));
        }
    }

    pub fn open_watchlist(&mut self) {
        self.navigate(Location::watchlist());
    }

    /// Add or remove the movie under the cursor (or on the detail page).
    pub fn toggle_watchlist(&mut self) {
        let Some(movie) = self.selected_movie().cloned() else {
            return;
        };
        match self.watchlist.toggle(&movie) {
            Ok(true) => {
                self.status_msg = format!("Added \"{}\" to watchlist", movie.title);
            }
            Ok(false) => {
                self.status_msg = format!("Removed \"{}\" from watchlist", movie.title);
                self.watchlist_selected = self
                    .watchlist_selected
                    .min(self.watchlist.len().saturating_sub(1));
            }
            Err(e) => {
                tracing::error!(error = %e, movie_id = movie.id, "Failed to save watchlist");
                self.status_msg = format!("Could not save watchlist: {e}");
            }
        }
    }

    /// Manual retry after a failed load.
    pub fn reload(&mut self) {
        tracing::info!(location = %self.router.current(), "Reload requested");
        self.load_current();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        match self.theme.save(self.storage.as_ref()) {
            Ok(()) => self.status_msg = format!("Theme: {}", self.theme.label()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save theme");
                self.status_msg = format!("Theme: {} (not saved)", self.theme.label());
            }
        }
    }

    pub fn scroll_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn scroll_page_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(20);
    }

    pub fn scroll_page_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(20);
    }

    /// Wait for the next fetch result and apply it.
    #[cfg(test)]
    pub async fn settle(&mut self) {
        if let Some(fetched) = self.fetch_rx.recv().await {
            self.apply_fetched(fetched);
        }
    }
}
