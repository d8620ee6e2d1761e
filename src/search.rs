use std::time::{Duration, Instant};

use crate::state::PlayerOption;

/// Debounced autocomplete input.
///
/// Edits arm a quiet-period timer; once it expires `poll_due` hands out the trimmed
/// query with a fresh sequence number. Only results carrying the latest sequence are
/// accepted, so a slow response can never overwrite a newer one.
#[derive(Debug, Clone)]
pub struct SearchBox {
    pub query: String,
    pub options: Vec<PlayerOption>,
    pub highlighted: usize,
    pub active: bool,
    pub loading: bool,
    debounce: Duration,
    dirty_since: Option<Instant>,
    seq: u64,
}

impl SearchBox {
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            options: Vec::new(),
            highlighted: 0,
            active: false,
            loading: false,
            debounce,
            dirty_since: None,
            seq: 0,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_pending(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.edited(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.edited(now);
        }
    }

    pub fn set_query(&mut self, query: &str, now: Instant) {
        self.query = query.to_string();
        self.edited(now);
    }

    fn edited(&mut self, now: Instant) {
        if self.query.trim().is_empty() {
            // An empty query resolves to no candidates without asking the backend.
            self.options.clear();
            self.highlighted = 0;
            self.dirty_since = None;
            self.loading = false;
            self.seq += 1;
            return;
        }
        self.dirty_since = Some(now);
    }

    /// Returns `(seq, query)` when the debounce window has elapsed since the last edit.
    pub fn poll_due(&mut self, now: Instant) -> Option<(u64, String)> {
        let since = self.dirty_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        self.dirty_since = None;
        self.seq += 1;
        self.loading = true;
        Some((self.seq, self.query.trim().to_string()))
    }

    pub fn apply_results(&mut self, seq: u64, options: Vec<PlayerOption>) -> bool {
        if seq != self.seq {
            return false;
        }
        self.options = options;
        self.highlighted = 0;
        self.loading = false;
        true
    }

    pub fn apply_failure(&mut self, seq: u64) -> bool {
        if seq != self.seq {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn highlight_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.highlighted = (self.highlighted + 1).min(self.options.len() - 1);
    }

    pub fn highlight_prev(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    pub fn highlighted_option(&self) -> Option<&PlayerOption> {
        self.options.get(self.highlighted)
    }

    /// Takes the highlighted candidate; the box shows its label and closes.
    pub fn choose(&mut self) -> Option<PlayerOption> {
        let option = self.highlighted_option()?.clone();
        self.query = option.label.clone();
        self.options.clear();
        self.highlighted = 0;
        self.active = false;
        self.loading = false;
        self.dirty_since = None;
        self.seq += 1;
        Some(option)
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.options.clear();
        self.highlighted = 0;
        self.active = false;
        self.loading = false;
        self.dirty_since = None;
        self.seq += 1;
    }
}
