//! URL query string handling.
//!
//! - [`QueryParams`] - ordered, multi-valued `key=value` pairs
//! - [`QueryCodec`] - table view state to and from query parameters
//!
//! | Key | Default | Notes |
//! |---|---|---|
//! | `page` | 1 | 1-based page number |
//! | `per_page` | configured page size | |
//! | `sort` | none | `<column>:<asc\|desc>` |
//! | `title` | `""` | free-text filter |
//! | `status`, `priority`, `type`, `reviewer` | `[]` | repeated, one per option |

mod codec;
mod params;

pub use codec::{PAGE, PER_PAGE, QueryCodec, SORT};
pub use params::QueryParams;
