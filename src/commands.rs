// fsgraph/src/commands.rs

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::ExitCode,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Cli,
    ingest::ingest_rows,
    sparql::{JsonFileSource, QueryError, RelationSource, SparqlClient},
    tree_view::{render_report, CanonicalRoot},
};

/// Printed on stdout when the store cannot be queried.
pub const QUERY_FAILED: &str = "Failed to query database";

pub fn run_cli() -> Result<ExitCode> {
    let cli = Cli::load();
    init_logging(cli.verbose);

    let source = match build_source(&cli) {
        Ok(s) => s,
        Err(e) => return Ok(query_failed(&e)),
    };

    // Nothing is opened for writing until the query has succeeded.
    let lines = match run_once(source.as_ref()) {
        Ok(lines) => lines,
        Err(e) => return Ok(query_failed(&e)),
    };

    match &cli.output {
        Some(path) => {
            let mut f = create_output(path)?;
            write_report(&lines, &mut f)?;
            info!(path = %path.display(), "report written");
        }
        None => write_report(&lines, &mut io::stdout().lock())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Fetch, ingest, render. Only a query failure can go wrong here.
pub fn run_once(source: &dyn RelationSource) -> Result<Vec<String>, QueryError> {
    let rows = source.fetch_rows()?;

    let ingested = ingest_rows(rows);
    if !ingested.skipped.is_empty() {
        warn!(count = ingested.skipped.len(), "malformed rows skipped");
    }
    Ok(render_report(&ingested.table, &CanonicalRoot))
}

pub fn write_report<W: Write + ?Sized>(lines: &[String], out: &mut W) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}").context("writing report")?;
    }
    out.flush().context("flushing report")
}

fn build_source(cli: &Cli) -> Result<Box<dyn RelationSource>, QueryError> {
    if let Some(path) = &cli.from_json {
        info!(path = %path.display(), "rendering saved results");
        return Ok(Box::new(JsonFileSource::new(path)));
    }
    let client = SparqlClient::new(&cli.endpoint, &cli.graph, cli.token.clone(), cli.timeout())?;
    Ok(Box::new(client))
}

fn create_output(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn query_failed(e: &QueryError) -> ExitCode {
    error!(error = %e, "query failed");
    println!("{QUERY_FAILED}");
    ExitCode::FAILURE
}

// Logs go to stderr; stdout is reserved for the report.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .try_init();
}

/* ================================== Tests ================================== */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RawRow;

    struct Fixed(Vec<RawRow>);

    impl RelationSource for Fixed {
        fn fetch_rows(&self) -> Result<Vec<RawRow>, QueryError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl RelationSource for Broken {
        fn fetch_rows(&self) -> Result<Vec<RawRow>, QueryError> {
            Err(QueryError::Decode(serde_json::from_str::<u8>("x").unwrap_err()))
        }
    }

    fn raw(item: &str, label: &str, kind: &str, parent: Option<&str>) -> RawRow {
        RawRow {
            item: Some(item.into()),
            label: Some(label.into()),
            kind: Some(kind.into()),
            parent: parent.map(Into::into),
            parent_label: None,
        }
    }

    #[test]
    fn report_goes_to_writer() {
        let src = Fixed(vec![
            raw("urn:uuid:11111111-x", "/", "dir", None),
            raw("urn:uuid:22222222-x", "notes.md", "file", Some("urn:uuid:11111111-x")),
        ]);
        let mut buf = Vec::new();
        write_report(&run_once(&src).unwrap(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "=== LIQK Filesystem ===\n\n📁 / (root: 11111111...)\n└── 📄 notes.md (22222222...)\n\n=== Total: 1 directories, 1 files ===\n"
        );
    }

    #[test]
    fn query_failure_renders_nothing() {
        assert!(matches!(run_once(&Broken), Err(QueryError::Decode(_))));
    }

    #[test]
    fn output_file_parents_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/tree.txt");
        let mut f = create_output(&path).unwrap();
        write_report(&run_once(&Fixed(Vec::new())).unwrap(), &mut f).unwrap();
        drop(f);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("=== Total: 0 directories, 0 files ===\n"));
    }
}
