pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Equality filters for listing songs. `None` means "do not filter on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
  pub group: Option<String>,
  pub song: Option<String>,
}

impl SongFilter {
  /// Builds a filter from raw request values. Empty strings are treated as
  /// absent, never as "match the empty string".
  pub fn new(group: Option<&str>, song: Option<&str>) -> Self {
    Self { group: non_empty(group), song: non_empty(song) }
  }

  /// Whether a song passes every set filter.
  pub fn matches(&self, group: &str, song: &str) -> bool {
    self.group.as_deref().is_none_or(|g| g == group) && self.song.as_deref().is_none_or(|s| s == song)
  }
}

fn non_empty(value: Option<&str>) -> Option<String> {
  value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// A 1-based page request. Both values are always at least 1, so the derived
/// offset can never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  page: i64,
  page_size: i64,
}

impl Pagination {
  /// Strict constructor: rejects values below 1.
  pub fn new(page: i64, page_size: i64) -> Option<Self> {
    (page >= 1 && page_size >= 1).then_some(Self { page, page_size })
  }

  /// Lenient constructor used at the HTTP boundary: anything missing or
  /// below 1 falls back to the defaults independently.
  pub fn lenient(page: Option<i64>, page_size: Option<i64>) -> Self {
    Self {
      page: page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE),
      page_size: page_size.filter(|s| *s >= 1).unwrap_or(DEFAULT_PAGE_SIZE),
    }
  }

  /// Same as [`Pagination::lenient`] but from raw query-string values;
  /// non-numeric input counts as missing.
  pub fn from_raw(page: Option<&str>, page_size: Option<&str>) -> Self {
    let parse = |v: Option<&str>| v.and_then(|s| s.parse::<i64>().ok());
    Self::lenient(parse(page), parse(page_size))
  }

  pub fn page(&self) -> i64 {
    self.page
  }

  pub fn page_size(&self) -> i64 {
    self.page_size
  }

  pub fn limit(&self) -> i64 {
    self.page_size
  }

  pub fn offset(&self) -> i64 {
    (self.page - 1).saturating_mul(self.page_size)
  }
}

impl Default for Pagination {
  fn default() -> Self {
    Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE }
  }
}
