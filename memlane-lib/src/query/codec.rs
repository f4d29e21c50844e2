//! Table view state ⇄ query string.

use crate::config::{DEFAULT_PAGE_SIZE, TableViewConfig};
use crate::error::ParamError;
use crate::state::{
    FilterKey, FilterKind, FilterValue, Filters, Pagination, SortEntry, TableViewState, UrlState,
};

use super::QueryParams;

/// 1-based page number.
pub const PAGE: &str = "page";
/// Page size.
pub const PER_PAGE: &str = "per_page";
/// Sort column and direction, `<column>:<asc|desc>`.
pub const SORT: &str = "sort";

/// Converts table view state to and from URL query parameters.
///
/// Defaults are omitted when encoding, so the default view has an empty
/// query. Decoding is total: malformed values fall back to their defaults and
/// unrecognized keys are ignored.
///
/// # Example
///
/// ```
/// use memlane_lib::query::QueryCodec;
/// use memlane_lib::state::{FilterKey, SortEntry};
///
/// let codec = QueryCodec::default();
/// let state = codec.decode_str("?status=done&status=todo&sort=title:desc&page=2");
/// assert_eq!(state.pagination.page_index, 1);
/// assert_eq!(state.sort, Some(SortEntry::desc("title")));
/// assert_eq!(state.filters.options(FilterKey::Status).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCodec {
    default_page_size: usize,
}

impl QueryCodec {
    /// Creates a codec. A zero page size falls back to the global default.
    pub fn new(default_page_size: usize) -> Self {
        Self {
            default_page_size: if default_page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                default_page_size
            },
        }
    }

    pub fn from_config(config: &TableViewConfig) -> Self {
        Self::new(config.default_page_size)
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    /// Encodes the URL-carried part of `state`.
    pub fn encode(&self, state: &TableViewState) -> QueryParams {
        self.encode_url_state(&state.url_state())
    }

    pub fn encode_url_state(&self, state: &UrlState) -> QueryParams {
        let mut params = QueryParams::new();

        if state.pagination.page_index > 0 {
            params.append(PAGE, state.pagination.page_index.saturating_add(1).to_string());
        }
        if state.pagination.page_size != self.default_page_size {
            params.append(PER_PAGE, state.pagination.page_size.to_string());
        }

        for (key, value) in state.filters.iter() {
            match value {
                FilterValue::Text(text) => params.append(key.as_str(), text.as_str()),
                FilterValue::Options(options) => {
                    for option in options {
                        params.append(key.as_str(), option.as_str());
                    }
                }
            }
        }

        if let Some(sort) = &state.sort {
            params.append(SORT, sort.to_string());
        }

        params
    }

    /// Decodes query parameters into a complete URL state.
    pub fn decode(&self, params: &QueryParams) -> UrlState {
        let page = params
            .get(PAGE)
            .map(|value| parse_positive(PAGE, value))
            .transpose()
            .unwrap_or_else(|err| {
                log::debug!("ignoring {err}");
                None
            })
            .unwrap_or(1);

        let page_size = params
            .get(PER_PAGE)
            .map(|value| parse_positive(PER_PAGE, value))
            .transpose()
            .unwrap_or_else(|err| {
                log::debug!("ignoring {err}");
                None
            })
            .unwrap_or(self.default_page_size);

        let sort = params.get(SORT).and_then(|value| {
            parse_sort(value)
                .inspect_err(|err| log::debug!("ignoring {err}"))
                .ok()
        });

        UrlState {
            pagination: Pagination::new(page - 1, page_size),
            filters: decode_filters(params),
            sort,
        }
    }

    pub fn decode_str(&self, query: &str) -> UrlState {
        self.decode(&QueryParams::parse(query))
    }

    /// Returns `true` for parameters this codec reads and writes.
    pub fn owns_key(key: &str) -> bool {
        matches!(key, PAGE | PER_PAGE | SORT) || FilterKey::parse(key).is_some()
    }

    /// Encodes `state` on top of `current`, keeping parameters the codec does
    /// not own in their original order.
    pub fn merge(&self, state: &TableViewState, current: &QueryParams) -> QueryParams {
        current
            .iter()
            .filter(|(key, _)| !Self::owns_key(key))
            .chain(self.encode(state).iter())
            .collect()
    }
}

impl Default for QueryCodec {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

fn decode_filters(params: &QueryParams) -> Filters {
    let mut filters = Filters::new();
    for key in FilterKey::ALL {
        let value = match key.kind() {
            FilterKind::Text => FilterValue::text(params.get(key.as_str()).unwrap_or_default()),
            FilterKind::MultiSelect => FilterValue::options(params.get_all(key.as_str())),
        };
        filters.set(key, value);
    }
    filters
}

/// Parses a strictly positive integer.
fn parse_positive(key: &'static str, value: &str) -> Result<usize, ParamError> {
    let parsed: i128 = value
        .trim()
        .parse()
        .map_err(|source| ParamError::NotANumber {
            key,
            value: value.to_string(),
            source,
        })?;
    usize::try_from(parsed)
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ParamError::OutOfRange { key, value: parsed })
}

/// Parses `<column>:<asc|desc>`. The column may itself contain `:`.
fn parse_sort(value: &str) -> Result<SortEntry, ParamError> {
    let malformed = || ParamError::MalformedSort(value.to_string());
    let (column, direction) = value.rsplit_once(':').ok_or_else(malformed)?;
    if column.is_empty() {
        return Err(malformed());
    }
    match direction {
        "asc" => Ok(SortEntry::asc(column)),
        "desc" => Ok(SortEntry::desc(column)),
        _ => Err(malformed()),
    }
}
