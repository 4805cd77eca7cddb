use reqwest::Url;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Query parameter carrying the active search term.
pub const SEARCH_PARAM: &str = "search";

const LOCATION_BASE: &str = "filmflux://app";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Trending movies, or search results when the location carries a query.
    Home,
    Movie(u64),
    Watchlist,
}

/// Where the user is, in URL form: `/`, `/?search=..`, `/movies/{id}`, `/watchlist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub search: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocationError {
    #[error("invalid location: {0}")]
    Invalid(String),

    #[error("unknown path: {0}")]
    UnknownPath(String),

    #[error("invalid movie id: {0}")]
    InvalidMovieId(String),
}

impl Location {
    pub fn home() -> Self {
        Self {
            route: Route::Home,
            search: None,
        }
    }

    /// Search results for `query`. An empty query is the plain home location.
    pub fn search(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            route: Route::Home,
            search: (!query.is_empty()).then_some(query),
        }
    }

    pub fn movie(id: u64) -> Self {
        Self {
            route: Route::Movie(id),
            search: None,
        }
    }

    pub fn watchlist() -> Self {
        Self {
            route: Route::Watchlist,
            search: None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let relative = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        let url = Url::parse(&format!("{LOCATION_BASE}{relative}"))
            .map_err(|e| LocationError::Invalid(format!("{s}: {e}")))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] => {
                let search = url
                    .query_pairs()
                    .find(|(key, _)| key == SEARCH_PARAM)
                    .map(|(_, value)| value.into_owned());
                Ok(Location::search(search.unwrap_or_default()))
            }
            ["movies", id] => id
                .parse()
                .map(Location::movie)
                .map_err(|_| LocationError::InvalidMovieId(id.to_string())),
            ["watchlist"] => Ok(Location::watchlist()),
            _ => Err(LocationError::UnknownPath(url.path().to_string())),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.route {
            Route::Home => {
                let Some(query) = &self.search else {
                    return f.write_str("/");
                };
                let mut url = Url::parse(LOCATION_BASE).map_err(|_| fmt::Error)?;
                url.set_path("/");
                url.query_pairs_mut().append_pair(SEARCH_PARAM, query);
                write!(f, "/?{}", url.query().unwrap_or_default())
            }
            Route::Movie(id) => write!(f, "/movies/{id}"),
            Route::Watchlist => f.write_str("/watchlist"),
        }
    }
}

/// Current location plus back/forward history.
#[derive(Debug, Clone)]
pub struct Router {
    back: Vec<Location>,
    current: Location,
    forward: Vec<Location>,
}

impl Router {
    pub fn new(start: Location) -> Self {
        Self {
            back: Vec::new(),
            current: start,
            forward: Vec::new(),
        }
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Navigate to `location`. Returns false when it is already current.
    pub fn push(&mut self, location: Location) -> bool {
        if location == self.current {
            return false;
        }
        tracing::debug!(from = %self.current, to = %location, "Navigate");
        let previous = std::mem::replace(&mut self.current, location);
        self.back.push(previous);
        self.forward.clear();
        true
    }

    pub fn back(&mut self) -> bool {
        let Some(previous) = self.back.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.forward.push(current);
        true
    }

    pub fn forward(&mut self) -> bool {
        let Some(next) = self.forward.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.back.push(current);
        true
    }

    pub fn can_go_back(&self) -> bool {
        !self.back.is_empty()
    }
}
