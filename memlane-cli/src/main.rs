mod cli;
mod error;
mod paths;
mod render;

use std::fs::{self, File};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use memlane_lib::adapter::{ColumnFilter, TableAdapter, Updater};
use memlane_lib::location::{Location, MemoryLocation};
use memlane_lib::model::{self, Memory};
use memlane_lib::rows::RowModel;
use memlane_lib::state::{FilterKey, Pagination};
use memlane_lib::{TableView, TableViewConfig};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::cli::Cli;
use crate::error::CliError;

const BUNDLED_DATA: &str = include_str!("../data/memories.json");

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(CliError::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("Warning: cannot create log file {}: {e}", path.display()),
    }
}

fn load_config(cli: &Cli) -> Result<TableViewConfig, CliError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => match paths::config_file() {
            Some(path) if path.exists() => path,
            _ => return Ok(TableViewConfig::default()),
        },
    };
    log::info!("loading config from {}", path.display());
    TableViewConfig::from_path(&path).map_err(|source| CliError::Config {
        path: path.display().to_string(),
        source,
    })
}

fn load_data(cli: &Cli) -> Result<Vec<Memory>, CliError> {
    match &cli.data {
        Some(path) => model::load_memories_from_path(path).map_err(|source| CliError::Data {
            path: path.display().to_string(),
            source,
        }),
        None => model::load_memories(BUNDLED_DATA).map_err(CliError::BundledData),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let memories = load_data(&cli)?;

    let location = MemoryLocation::new(cli.query.as_deref().unwrap_or_default());
    let view = TableView::mount(&config, Arc::new(location.clone()));
    apply_interactions(&cli, view.change_handlers());

    if let Some(text) = &cli.search {
        view.change_handlers().on_search_input(text.as_str());
        // Let the debounced commit land.
        tokio::time::sleep(config.search_debounce + Duration::from_millis(1)).await;
    }

    let state = view.store().snapshot();
    let page = RowModel::apply(&memories, &state);
    render::print_page(&page, &state);
    println!();
    render::print_facets(&memories, &state);
    println!();
    println!("?{}", location.search());

    view.unmount();
    Ok(())
}

/// Drives the view through the same handlers a table display would use.
fn apply_interactions(cli: &Cli, handlers: &TableAdapter) {
    if cli.reset_filters {
        handlers.on_column_filters_change(Vec::<ColumnFilter>::new());
    }

    for (key, values) in [
        (FilterKey::Status, &cli.status),
        (FilterKey::Priority, &cli.priority),
        (FilterKey::Type, &cli.kind),
        (FilterKey::Reviewer, &cli.reviewer),
    ] {
        if values.is_empty() {
            continue;
        }
        let filter = ColumnFilter::list(key.as_str(), values.iter().cloned());
        handlers.on_column_filters_change(Updater::apply(move |current: &Vec<ColumnFilter>| {
            let filter_id = filter.id.clone();
            current
                .iter()
                .filter(|existing| existing.id != filter_id)
                .cloned()
                .chain(std::iter::once(filter))
                .collect()
        }));
    }

    if let Some(sort) = &cli.sort {
        handlers.on_sorting_change(vec![sort.clone()]);
    }

    if let Some(per_page) = cli.per_page {
        let page_size = per_page as usize;
        handlers.on_pagination_change(Updater::apply(move |_: &Pagination| {
            Pagination::first(page_size)
        }));
    }

    if let Some(page) = cli.page {
        let page_index = page as usize - 1;
        handlers.on_pagination_change(Updater::apply(move |current: &Pagination| {
            Pagination::new(page_index, current.page_size)
        }));
    }
}
