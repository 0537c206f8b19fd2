use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetbundle::{
    batch::{self, container},
    schema::{SchemaRegistry, TableType},
    storage::DirStore,
};
use std::{collections::HashSet, fs, io::Write, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export and import spreadsheet tables as CSV/ZIP")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every table of the selected types into a ZIP of CSV files
    Export {
        /// Directory of `<table>_schema.{json,yaml}` files
        #[arg(long)]
        schemas: PathBuf,
        /// Table store directory
        #[arg(long)]
        store: PathBuf,
        #[arg(long, default_value = "data.zip")]
        out: PathBuf,
        /// Table types to include; defaults to configuration, master and transaction data
        #[arg(long, value_delimiter = ',')]
        types: Vec<TableType>,
    },
    /// List the tables contained in a ZIP bundle
    List {
        #[arg(long)]
        bundle: PathBuf,
    },
    /// Import tables from a ZIP bundle
    Import {
        #[arg(long)]
        schemas: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        bundle: PathBuf,
        /// Tables to import; defaults to every CSV in the bundle
        #[arg(long, value_delimiter = ',')]
        tables: Vec<String>,
    },
    /// Export a single table as CSV
    ExportTable {
        #[arg(long)]
        schemas: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        table: String,
        /// Output file; stdout when absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a single CSV file into a table
    ImportTable {
        #[arg(long)]
        schemas: PathBuf,
        #[arg(long)]
        store: PathBuf,
        #[arg(long)]
        table: String,
        #[arg(long)]
        csv: PathBuf,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    // ─── 2) dispatch ─────────────────────────────────────────────────
    match args.command {
        Command::Export {
            schemas,
            store,
            out,
            types,
        } => {
            let registry = SchemaRegistry::load_dir(&schemas)?;
            let store = DirStore::open(&store)?;
            let filter: HashSet<TableType> = if types.is_empty() {
                TableType::default_export_set()
            } else {
                types.into_iter().collect()
            };

            let bytes = batch::export_bundle(&registry, &filter, &store)
                .context("exporting tables")?;
            fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
            info!(out = %out.display(), bytes = bytes.len(), "bundle written");
        }

        Command::List { bundle } => {
            let bytes = fs::read(&bundle).with_context(|| format!("reading {}", bundle.display()))?;
            for name in batch::list_payload_names(&bytes)? {
                println!("{}", name);
            }
        }

        Command::Import {
            schemas,
            store,
            bundle,
            tables,
        } => {
            let registry = SchemaRegistry::load_dir(&schemas)?;
            let mut store = DirStore::open(&store)?;
            let bytes = fs::read(&bundle).with_context(|| format!("reading {}", bundle.display()))?;

            let selected = if tables.is_empty() {
                batch::list_payload_names(&bytes)?
            } else {
                tables
            };
            if selected.is_empty() {
                warn!(
                    "no {} files found in {}",
                    container::CSV_EXTENSION,
                    bundle.display()
                );
                return Ok(());
            }

            let result = batch::import_selected(&bytes, &selected, &registry, &mut store)?;
            println!("{}", result.summary());
            if result.success_count == 0 {
                anyhow::bail!("no tables were imported");
            }
        }

        Command::ExportTable {
            schemas,
            store,
            table,
            out,
        } => {
            let registry = SchemaRegistry::load_dir(&schemas)?;
            let store = DirStore::open(&store)?;
            let csv = batch::export_table(&registry, &store, &table)
                .with_context(|| format!("exporting {}", table))?;
            match out {
                Some(path) => {
                    fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?
                }
                None => std::io::stdout().write_all(csv.as_bytes())?,
            }
        }

        Command::ImportTable {
            schemas,
            store,
            table,
            csv,
        } => {
            let registry = SchemaRegistry::load_dir(&schemas)?;
            let mut store = DirStore::open(&store)?;
            let text = fs::read_to_string(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let summary = batch::import_table(&registry, &mut store, &table, &text)
                .with_context(|| format!("importing {}", table))?;
            println!(
                "Imported {} rows ({} columns) into \"{}\"",
                summary.rows_imported, summary.columns_imported, summary.table_name
            );
        }
    }

    Ok(())
}
