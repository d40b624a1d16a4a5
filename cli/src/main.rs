use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use salon_core::catalog::{mock_catalog, CatalogIssue};
use salon_core::persist::{export_catalog, load_catalog, CatalogFormat, CatalogPaths};
use salon_core::{query, Catalog, QueryParameters, SalonSummary, DEFAULT_PAGE_SIZE};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salon-cli")]
#[command(about = "Query, export and validate salon catalogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bin,
}

impl From<Format> for CatalogFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => CatalogFormat::Json,
            Format::Bin => CatalogFormat::Bincode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search against a catalog and print the page as JSON
    Query {
        /// URL-style parameters, e.g. "service=thai&sort=rating&page=2"
        #[arg(long, default_value = "")]
        params: String,
        /// Catalog file (.json or .bin); the built-in demo catalog when omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
    /// Write the built-in demo catalog and its meta.json to a directory
    Export {
        /// Output directory
        #[arg(long)]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Check catalog files (a file or every .json/.bin under a directory)
    Validate {
        #[arg(long)]
        input: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryOutput {
    query_string: String,
    active_filters: usize,
    total: usize,
    page: usize,
    total_pages: usize,
    results: Vec<SalonSummary>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { params, catalog, page_size } => {
            let catalog = open_catalog(catalog.as_deref())?;
            let out = run_query(&catalog, &params, page_size);
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
        Commands::Export { output, format } => {
            let paths = CatalogPaths::new(&output);
            let written = export_catalog(&paths, format.into(), mock_catalog())?;
            tracing::info!(path = %written.display(), salons = mock_catalog().len(), "catalog exported");
            Ok(())
        }
        Commands::Validate { input } => {
            let report = validate_path(Path::new(&input))?;
            let mut failed = 0;
            for (file, issues) in &report {
                if issues.is_empty() {
                    println!("ok    {}", file.display());
                    continue;
                }
                failed += 1;
                println!("FAIL  {}", file.display());
                for issue in issues {
                    println!("      {issue}");
                }
            }
            if failed > 0 {
                bail!("{failed} of {} catalog file(s) failed validation", report.len());
            }
            Ok(())
        }
    }
}

fn open_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(p) => load_catalog(p),
        None => Ok(mock_catalog().clone()),
    }
}

fn run_query(catalog: &Catalog, raw: &str, page_size: usize) -> QueryOutput {
    let params = QueryParameters::from_query_string(raw);
    let result = query(catalog.records(), &params, page_size);
    QueryOutput {
        query_string: params.to_query_string(),
        active_filters: params.active_filter_count(),
        total: result.total_matched,
        page: params.page,
        total_pages: result.total_pages(page_size),
        results: result.page.iter().map(|s| s.summary()).collect(),
    }
}

fn catalog_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            let is_meta = p.file_name().is_some_and(|n| n == "meta.json");
            if p.is_file() && !is_meta && CatalogFormat::from_path(p).is_ok() {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn validate_path(input: &Path) -> Result<Vec<(PathBuf, Vec<CatalogIssue>)>> {
    let files = catalog_files(input);
    if files.is_empty() {
        bail!("no catalog files found at {}", input.display());
    }
    let mut report = Vec::with_capacity(files.len());
    for file in files {
        let catalog = load_catalog(&file)?;
        let issues = catalog.validate();
        tracing::debug!(file = %file.display(), salons = catalog.len(), issues = issues.len(), "validated");
        report.push((file, issues));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::persist::save_catalog;
    use tempfile::tempdir;

    #[test]
    fn query_reports_page_and_totals() {
        let out = run_query(mock_catalog(), "service=thai&sort=rating", 1);
        assert_eq!(out.total, 2);
        assert_eq!(out.total_pages, 2);
        assert_eq!(out.active_filters, 1);
        assert_eq!(out.results[0].id, "2");
        assert_eq!(out.query_string, "service=thai&sort=rating");
    }

    #[test]
    fn validate_walks_directories() {
        let dir = tempdir().unwrap();
        let paths = CatalogPaths::new(dir.path().join("good"));
        export_catalog(&paths, CatalogFormat::Bincode, mock_catalog()).unwrap();

        let mut broken = mock_catalog().records()[..1].to_vec();
        broken[0].services.clear();
        save_catalog(&dir.path().join("bad/salons.json"), CatalogFormat::Json, &broken).unwrap();

        let report = validate_path(dir.path()).unwrap();
        // meta.json sits next to the exported salons file and is skipped
        assert!(report.iter().all(|(p, _)| p.file_name().unwrap() != "meta.json"));
        assert_eq!(report.len(), 2);
        let bad = report.iter().find(|(p, _)| p.starts_with(dir.path().join("bad"))).unwrap();
        assert_eq!(bad.1, vec![CatalogIssue::NoServices("1".into())]);
    }

    #[test]
    fn validate_requires_files() {
        let dir = tempdir().unwrap();
        assert!(validate_path(dir.path()).is_err());
    }
}
