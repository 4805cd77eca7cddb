use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A movie as returned by the catalog list endpoints.
///
/// Field names follow the catalog's JSON so the same shape is used for the
/// persisted watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full record from the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub tagline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<Movie>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Movie {
    /// Year part of the release date, if one is known.
    pub fn release_year(&self) -> Option<&str> {
        non_empty(&self.release_date).and_then(|d| d.split('-').next())
    }

    pub fn year_label(&self) -> &str {
        self.release_year().unwrap_or("N/A")
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    /// Long form release date ("July 16, 2010"), falling back to the raw text.
    pub fn release_date_label(&self) -> Option<String> {
        let raw = non_empty(&self.release_date)?;
        Some(match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date.format("%B %-d, %Y").to_string(),
            Err(_) => raw.to_string(),
        })
    }

    pub fn overview_text(&self) -> &str {
        if self.overview.trim().is_empty() {
            "No overview available for this movie."
        } else {
            &self.overview
        }
    }

    pub fn poster_url(&self) -> Option<String> {
        non_empty(&self.poster_path).map(|p| format!("{IMAGE_BASE_URL}/w500{p}"))
    }

    pub fn backdrop_url(&self) -> Option<String> {
        non_empty(&self.backdrop_path).map(|p| format!("{IMAGE_BASE_URL}/original{p}"))
    }

    /// Wide image for the featured card: backdrop first, then the poster.
    pub fn featured_image_url(&self) -> Option<String> {
        non_empty(&self.backdrop_path)
            .or_else(|| non_empty(&self.poster_path))
            .map(|p| format!("{IMAGE_BASE_URL}/w1280{p}"))
    }
}

impl MovieDetails {
    pub fn runtime_label(&self) -> String {
        format!("{}h {}m", self.runtime / 60, self.runtime % 60)
    }

    pub fn tagline(&self) -> Option<&str> {
        non_empty(&self.tagline)
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    /// Message shown to the user. Every failure kind collapses to the same text.
    pub fn user_message(&self) -> String {
        "Something went wrong while talking to the movie catalog.".to_string()
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read-only queries against the movie catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn trending(&self) -> CatalogResult<Vec<Movie>>;

    async fn search(&self, query: &str) -> CatalogResult<Vec<Movie>>;

    async fn details(&self, id: u64) -> CatalogResult<MovieDetails>;
}

/// TMDB implementation of [`Catalog`] over reqwest.
#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("filmflux/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> CatalogResult<T> {
        let mut request = self.http.get(self.endpoint(path));
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn trending(&self) -> CatalogResult<Vec<Movie>> {
        let response: ListResponse = self
            .get("/trending/movie/week", &[])
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Error fetching trending movies"))?;
        tracing::debug!(count = response.results.len(), "Fetched trending movies");
        Ok(response.results)
    }

    async fn search(&self, query: &str) -> CatalogResult<Vec<Movie>> {
        let response: ListResponse = self
            .get("/search/movie", &[("query", query)])
            .await
            .inspect_err(|e| tracing::error!(error = %e, query, "Error searching movies"))?;
        tracing::debug!(count = response.results.len(), query, "Fetched search results");
        Ok(response.results)
    }

    async fn details(&self, id: u64) -> CatalogResult<MovieDetails> {
        let details: MovieDetails = self
            .get(&format!("/movie/{id}"), &[])
            .await
            .inspect_err(|e| tracing::error!(error = %e, movie_id = id, "Error fetching movie details"))?;
        Ok(details)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    pub fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/{id}.jpg")),
            backdrop_path: None,
            release_date: Some("2010-07-15".to_string()),
            vote_average: 7.5,
            overview: format!("{title} overview"),
        }
    }

    pub fn details(id: u64, title: &str, runtime: u32) -> MovieDetails {
        MovieDetails {
            movie: movie(id, title),
            runtime,
            genres: vec![Genre { id: 28, name: "Action".to_string() }],
            tagline: None,
        }
    }

    /// Canned catalog answers keyed by query and id.
    #[derive(Default)]
    pub struct FakeCatalog {
        trending: Vec<Movie>,
        results: HashMap<String, Vec<Movie>>,
        details: HashMap<u64, MovieDetails>,
        fail: bool,
    }

    impl FakeCatalog {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn with_trending(mut self, movies: Vec<Movie>) -> Self {
            self.trending = movies;
            self
        }

        pub fn with_results(mut self, query: &str, movies: Vec<Movie>) -> Self {
            self.results.insert(query.to_string(), movies);
            self
        }

        pub fn with_details(mut self, details: MovieDetails) -> Self {
            self.details.insert(details.movie.id, details);
            self
        }

        fn check(&self) -> CatalogResult<()> {
            if self.fail {
                return Err(CatalogError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Catalog for FakeCatalog {
        async fn trending(&self) -> CatalogResult<Vec<Movie>> {
            self.check()?;
            Ok(self.trending.clone())
        }

        async fn search(&self, query: &str) -> CatalogResult<Vec<Movie>> {
            self.check()?;
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn details(&self, id: u64) -> CatalogResult<MovieDetails> {
            self.check()?;
            self.details.get(&id).cloned().ok_or(CatalogError::Status {
                status: 404,
                body: "not found".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned HTTP response and hand back the raw request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request);
            let first_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(first_line);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}"), rx)
    }

    #[test]
    fn test_movie_deserialization() {
        let json = r#"{
            "adult": false,
            "id": 27205,
            "title": "Inception",
            "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
            "backdrop_path": "/8ZTVqvKDQ8emSGUEMjsS4yHAwrp.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.369,
            "overview": "Cobb, a skilled thief..."
        }"#;

        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.year_label(), "2010");
        assert_eq!(movie.rating_label(), "8.4");
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg")
        );
        assert_eq!(movie.release_date_label().as_deref(), Some("July 15, 2010"));
    }

    #[test]
    fn test_movie_with_null_fields() {
        let json = r#"{"id": 1, "title": "Untitled", "poster_path": null, "backdrop_path": null,
                       "release_date": "", "vote_average": null, "overview": null}"#;

        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.poster_path, None);
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.year_label(), "N/A");
        assert_eq!(movie.release_date_label(), None);
        assert_eq!(movie.overview_text(), "No overview available for this movie.");
        assert_eq!(movie.featured_image_url(), None);
    }

    #[test]
    fn test_featured_image_falls_back_to_poster() {
        let movie: Movie =
            serde_json::from_str(r#"{"id": 2, "title": "Heat", "poster_path": "/heat.jpg"}"#).unwrap();
        assert_eq!(
            movie.featured_image_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/heat.jpg")
        );
        assert_eq!(movie.backdrop_url(), None);
    }

    #[test]
    fn test_details_deserialization() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "overview": "Cobb...",
            "runtime": 148,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "tagline": "Your mind is the scene of the crime.",
            "budget": 160000000
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.movie.id, 27205);
        assert_eq!(details.runtime_label(), "2h 28m");
        assert_eq!(details.genre_names(), vec!["Action", "Science Fiction"]);
        assert_eq!(details.tagline(), Some("Your mind is the scene of the crime."));
    }

    #[test]
    fn test_details_empty_tagline_is_absent() {
        let json = r#"{"id": 3, "title": "X", "runtime": null, "genres": null, "tagline": ""}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.tagline(), None);
        assert_eq!(details.runtime_label(), "0h 0m");
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = TmdbClient::new(None, "http://test.local/3/").unwrap();
        assert_eq!(client.endpoint("/movie/1"), "http://test.local/3/movie/1");
    }

    #[test]
    fn test_user_message_is_generic() {
        let status = CatalogError::Status { status: 404, body: "nope".into() };
        let decode = CatalogError::Decode(serde_json::from_str::<Movie>("{").unwrap_err());
        assert_eq!(status.user_message(), decode.user_message());
    }

    #[tokio::test]
    async fn test_search_sends_query_and_key() {
        let (base, request) = serve_once("200 OK", r#"{"page": 1, "results": []}"#).await;
        let client = TmdbClient::new(Some("secret".into()), base).unwrap();

        let movies = client.search("batman").await.unwrap();
        assert!(movies.is_empty());

        let line = request.await.unwrap();
        assert!(line.starts_with("GET /search/movie?"));
        assert!(line.contains("api_key=secret"));
        assert!(line.contains("query=batman"));
    }

    #[tokio::test]
    async fn test_trending_decodes_results() {
        let (base, request) = serve_once(
            "200 OK",
            r#"{"results": [{"id": 27205, "title": "Inception", "vote_average": 8.4}]}"#,
        )
        .await;
        let client = TmdbClient::new(None, base).unwrap();

        let movies = client.trending().await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Inception");
        assert!(request.await.unwrap().starts_with("GET /trending/movie/week"));
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let (base, _request) =
            serve_once("401 Unauthorized", r#"{"status_message": "Invalid API key"}"#).await;
        let client = TmdbClient::new(Some("bad".into()), base).unwrap();

        let err = client.details(27205).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let (base, _request) = serve_once("200 OK", "not json").await;
        let client = TmdbClient::new(None, base).unwrap();

        let err = client.trending().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
