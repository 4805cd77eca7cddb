use crate::router::Location;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Queries shorter than this (after trimming) never navigate.
pub const MIN_QUERY_CHARS: usize = 3;

/// Where a settled search buffer should take the user, if anywhere.
///
/// Empty goes back to the unfiltered home location, one or two characters stay
/// put, anything longer becomes a search location.
pub fn resolve(buffer: &str) -> Option<Location> {
    let query = buffer.trim();
    match query.chars().count() {
        0 => Some(Location::home()),
        n if n < MIN_QUERY_CHARS => None,
        _ => Some(Location::search(query)),
    }
}

/// Search bar state: the text being typed and a single pending debounce deadline.
///
/// The location is authoritative. The buffer may run ahead of it while typing
/// and is reset from it by [`SearchSynchronizer::resync`].
#[derive(Debug, Clone)]
pub struct SearchSynchronizer {
    buffer: String,
    delay: Duration,
    deadline: Option<Instant>,
}

impl SearchSynchronizer {
    pub fn new(delay: Duration) -> Self {
        Self {
            buffer: String::new(),
            delay,
            deadline: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Replace the buffer and restart the timer.
    pub fn on_input(&mut self, text: impl Into<String>, now: Instant) {
        self.buffer = text.into();
        self.deadline = Some(now + self.delay);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut text = std::mem::take(&mut self.buffer);
        text.push(c);
        self.on_input(text, now);
    }

    /// Backspace. Does nothing on an empty buffer since the text did not change.
    pub fn pop_char(&mut self, now: Instant) {
        if self.buffer.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.buffer);
        text.pop();
        self.on_input(text, now);
    }

    /// Fire the timer if it has elapsed. Returns the navigation it resolved to.
    pub fn poll(&mut self, now: Instant) -> Option<Location> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let target = resolve(&self.buffer);
                tracing::debug!(
                    buffer = %self.buffer,
                    destination = ?target.as_ref().map(ToString::to_string),
                    "Search debounce fired"
                );
                target
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Reset the buffer from the location's query and drop any pending timer.
    pub fn resync(&mut self, location: &Location) {
        self.deadline = None;
        self.buffer = location.query().unwrap_or_default().to_string();
    }
}

impl Default for SearchSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(120);

    fn type_text(search: &mut SearchSynchronizer, text: &str, start: Instant) -> (Instant, Vec<Location>) {
        let mut now = start;
        let mut navigations = Vec::new();
        for c in text.chars() {
            search.push_char(c, now);
            now += STEP;
            navigations.extend(search.poll(now));
        }
        (now, navigations)
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(""), Some(Location::home()));
        assert_eq!(resolve("   "), Some(Location::home()));
        assert_eq!(resolve("a"), None);
        assert_eq!(resolve(" ab "), None);
        assert_eq!(resolve(" abc "), Some(Location::search("abc")));
        assert_eq!(resolve("été"), Some(Location::search("été")));
    }

    #[test]
    fn test_typing_then_pausing_navigates_once() {
        let mut search = SearchSynchronizer::default();
        let start = Instant::now();

        let (now, during_typing) = type_text(&mut search, "Incep", start);
        assert!(during_typing.is_empty());
        assert!(search.is_pending());

        // Still inside the window after the last keystroke
        assert_eq!(search.poll(now), None);

        let after_pause = now + DEFAULT_DEBOUNCE;
        assert_eq!(search.poll(after_pause), Some(Location::search("Incep")));
        assert_eq!(search.poll(after_pause + DEFAULT_DEBOUNCE), None);
        assert!(!search.is_pending());
    }

    #[test]
    fn test_single_character_does_not_navigate() {
        let mut search = SearchSynchronizer::default();
        let now = Instant::now();
        search.push_char('x', now);
        assert_eq!(search.poll(now + DEFAULT_DEBOUNCE), None);
        assert!(!search.is_pending());
    }

    #[test]
    fn test_clearing_navigates_home() {
        let mut search = SearchSynchronizer::default();
        search.resync(&Location::search("batman"));
        let mut now = Instant::now();

        for _ in 0.."batman".len() {
            search.pop_char(now);
            now += STEP;
        }
        assert_eq!(search.buffer(), "");
        assert_eq!(search.poll(now + DEFAULT_DEBOUNCE), Some(Location::home()));
    }

    #[test]
    fn test_keystroke_reschedules_timer() {
        let mut search = SearchSynchronizer::new(Duration::from_millis(500));
        let t0 = Instant::now();
        search.on_input("bat", t0);
        search.on_input("batm", t0 + Duration::from_millis(400));

        // The first deadline has passed but was replaced
        assert_eq!(search.poll(t0 + Duration::from_millis(600)), None);
        assert_eq!(
            search.next_deadline(),
            Some(t0 + Duration::from_millis(900))
        );
        assert_eq!(
            search.poll(t0 + Duration::from_millis(900)),
            Some(Location::search("batm"))
        );
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        let mut search = SearchSynchronizer::default();
        let now = Instant::now();
        search.on_input("  dune  ", now);
        assert_eq!(search.poll(now + DEFAULT_DEBOUNCE), Some(Location::search("dune")));
        assert_eq!(search.buffer(), "  dune  ");
    }

    #[test]
    fn test_backspace_on_empty_is_not_input() {
        let mut search = SearchSynchronizer::default();
        search.pop_char(Instant::now());
        assert!(!search.is_pending());
    }

    #[test]
    fn test_cancel_drops_pending_timer() {
        let mut search = SearchSynchronizer::default();
        let now = Instant::now();
        search.on_input("alien", now);
        search.cancel();
        assert_eq!(search.poll(now + DEFAULT_DEBOUNCE), None);
    }

    #[test]
    fn test_resync_from_location() {
        let mut search = SearchSynchronizer::default();
        let now = Instant::now();
        search.on_input("half typed", now);

        search.resync(&Location::search("batman"));
        assert_eq!(search.buffer(), "batman");
        assert!(!search.is_pending());

        search.resync(&Location::home());
        assert_eq!(search.buffer(), "");
    }
}
