//! Command line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use memlane_lib::adapter::ColumnSort;

#[derive(Parser, Debug)]
#[command(
    name = "memlane",
    version,
    about = "Browse the memories table with URL-synced filters, sorting and paging",
    long_about = "Mounts the memories table view on a query string, applies the given \
                  interactions through the table's change handlers, then prints the \
                  resulting page, the filter facets and the final query string."
)]
pub struct Cli {
    /// Starting query string, e.g. `status=done&sort=title:desc&page=2`.
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// View configuration file (JSON). Defaults to `config.json` in the
    /// platform config directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Memories dataset (JSON array). Defaults to the bundled sample data.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Type into the search box; committed after the search debounce.
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Show only these statuses.
    #[arg(long, value_name = "VALUE")]
    pub status: Vec<String>,

    /// Show only these priorities.
    #[arg(long, value_name = "VALUE")]
    pub priority: Vec<String>,

    /// Show only these section types.
    #[arg(long = "type", value_name = "VALUE")]
    pub kind: Vec<String>,

    /// Show only these reviewers.
    #[arg(long, value_name = "VALUE")]
    pub reviewer: Vec<String>,

    /// Sort by a column, e.g. `title:desc`.
    #[arg(long, value_name = "COL:DIR", value_parser = parse_sort)]
    pub sort: Option<ColumnSort>,

    /// Go to a page (1-based).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Rows per page.
    #[arg(long = "per-page", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub per_page: Option<u32>,

    /// Clear all filters before applying the ones given here.
    #[arg(long = "reset-filters")]
    pub reset_filters: bool,
}

fn parse_sort(value: &str) -> Result<ColumnSort, String> {
    let (column, direction) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected `<column>:<asc|desc>`, got `{value}`"))?;
    if column.is_empty() {
        return Err("sort column is empty".to_string());
    }
    match direction {
        "asc" => Ok(ColumnSort::new(column, false)),
        "desc" => Ok(ColumnSort::new(column, true)),
        other => Err(format!("unknown sort direction `{other}`, expected asc or desc")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("title:desc"), Ok(ColumnSort::new("title", true)));
        assert_eq!(parse_sort("createdAt:asc"), Ok(ColumnSort::new("createdAt", false)));
        assert!(parse_sort("title").is_err());
        assert!(parse_sort(":asc").is_err());
        assert!(parse_sort("title:up").is_err());
    }

    #[test]
    fn test_cli_parses_interactions() {
        let cli = Cli::try_parse_from([
            "memlane",
            "page=2",
            "--status",
            "done",
            "--status",
            "todo",
            "--type",
            "Narrative",
            "--sort",
            "title:asc",
            "--per-page",
            "5",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.query.as_deref(), Some("page=2"));
        assert_eq!(cli.status, ["done", "todo"]);
        assert_eq!(cli.kind, ["Narrative"]);
        assert_eq!(cli.sort, Some(ColumnSort::new("title", false)));
        assert_eq!(cli.per_page, Some(5));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_page_zero() {
        assert!(Cli::try_parse_from(["memlane", "--page", "0"]).is_err());
    }
}
