use crate::ReviewError;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub limit: usize,
    /// Restricts results to versions of this chapter.
    pub chapter_id: String,
}

/// One stored content version matched by a semantic search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub excerpt: String,
    pub version_tag: Option<String>,
    pub timestamp: Option<String>,
    /// Lower is more similar.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub results: Vec<SearchHit>,
    pub is_loading: bool,
    pub error: Option<ReviewError>,
    pub last_query: Option<String>,
    generation: u64,
}

impl SearchState {
    pub(crate) fn begin(&mut self, query: &str) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.error = None;
        self.last_query = Some(query.to_string());
        self.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
        self.is_loading = false;
    }
}
