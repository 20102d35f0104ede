use anyhow::Context;
use clap::{Parser, Subcommand};
use folio::{Engine, EngineConfig, Query, Record, RelatedMethod, StorageManager};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Metadata search and related-item ranking over an image catalog
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Search an image catalog and find related items", long_about = None)]
struct Args {
    /// Directory holding data.json and tfidf_vectors.bin
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Folder used when a command names none
    #[arg(long, env = "DEFAULT_FOLDER", default_value = folio::ALL_FOLDERS)]
    default_folder: String,

    /// Worker threads for building term vectors (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search records; wrap the query in double quotes for an exact phrase
    Search {
        query: Option<String>,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        #[arg(long, default_value_t = 20, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Records related to FILENAME
    Related {
        filename: String,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long, value_enum, default_value_t = RelatedMethod::Auto)]
        method: RelatedMethod,
    },
    /// List folders
    Folders,
    /// Print one record
    Show { filename: String },
    /// Compute TF-IDF vectors for the whole dataset and save them
    BuildVectors,
    /// Replace a record with JSON given inline or on stdin ("-")
    Replace { filename: String, record: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Folio v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let storage = StorageManager::new(&args.data_dir)?;
    let config = EngineConfig {
        vector_threads: args.threads,
        default_folder: args.default_folder.clone(),
        ..EngineConfig::default()
    };
    let engine = Engine::new(storage.load_catalog()?, config);

    match args.command {
        Command::Search {
            query,
            folder,
            page,
            limit,
        } => {
            let folder = folder.unwrap_or_else(|| args.default_folder.clone());
            let query = Query::new(query.unwrap_or_default())
                .in_folder(folder)
                .page(page, limit);
            print_json(&engine.search(&query)?)?;
        }
        Command::Related {
            filename,
            folder,
            method,
        } => {
            if method != RelatedMethod::Overlap {
                let snapshot = engine.catalog().snapshot();
                engine.set_vectors(storage.load_vectors(snapshot.records())?);
            }
            let folder = folder.unwrap_or_else(|| args.default_folder.clone());
            print_json(&engine.related(&filename, Some(&folder), method)?)?;
        }
        Command::Folders => print_json(&engine.folders())?,
        Command::Show { filename } => print_json(&engine.show(&filename)?)?,
        Command::BuildVectors => {
            let vectors = engine.build_vectors()?;
            let snapshot = engine.catalog().snapshot();
            let saved = storage.save_vectors(snapshot.records(), (*vectors).clone())?;
            print_json(&serde_json::json!({
                "vectors": saved.vectors.len(),
                "created_at": saved.created_at,
                "corpus_checksum": saved.corpus_checksum,
            }))?;
        }
        Command::Replace { filename, record } => {
            let json = if record == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                record
            };
            let record: Record = serde_json::from_str(&json).context("parsing record JSON")?;
            engine.replace(&filename, record)?;
            storage.save_catalog(engine.catalog())?;
            print_json(&engine.show(&filename)?)?;
        }
    }

    Ok(())
}
