//! Gadget CLI - local catalog of container image metadata

use clap::{ArgGroup, Parser, Subcommand};
use gadget::config::{self, CatalogConfig, CatalogPaths};
use gadget::ui::{self, Icons};
use gadget::{CatalogStore, Image, IngestRecord};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "gadget")]
#[command(version)]
#[command(about = "Searchable local catalog of container image metadata")]
#[command(long_about = r#"
Gadget keeps a relational index of the images a container runtime reports,
searchable by id, tag, label or volume.

Example usage:
  gadget init
  gadget ingest images.json
  gadget show --tag app:1.0
  gadget labels env:prod
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage directory (overrides config)
    #[arg(short, long, global = true)]
    directory: Option<PathBuf>,

    /// Storage file name inside the directory (overrides config)
    #[arg(long, global = true)]
    file: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog, discarding any existing data
    Init,

    /// Add images from a JSON file of {summary, details} records
    Ingest {
        /// JSON file produced by the image enumerator
        input: PathBuf,

        /// Rebuild the schema before ingesting
        #[arg(long)]
        rebuild: bool,
    },

    /// List every catalogued image
    List,

    /// Show a single image
    #[command(group(ArgGroup::new("lookup").required(true).args(["id", "long", "tag"])))]
    Show {
        /// Short image id
        id: Option<String>,

        /// Full image id
        #[arg(long)]
        long: Option<String>,

        /// Repository tag (name:version)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Check whether an image with this short id is catalogued
    Exists {
        /// Short image id
        id: String,
    },

    /// Images with labels, optionally filtered by a `key:value` substring
    Labels {
        pattern: Option<String>,
    },

    /// Images with volumes, optionally filtered by a volume-name substring
    Volumes {
        pattern: Option<String>,
    },

    /// Copy the catalog file to <file>.bkp
    Backup,

    /// Show row counts per table
    Stats,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let paths = config.paths(cli.directory.clone(), cli.file.clone());

    match cli.command {
        Commands::Init => {
            let store = CatalogStore::open(&paths)?;
            let warnings = store.rebuild_schema();
            store.close()?;

            for warning in &warnings {
                ui::warn(&warning.to_string());
            }
            if warnings.is_empty() {
                ui::success(&format!("Catalog initialized at {}", paths.database_path().display()));
            } else {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Ingest { input, rebuild } => {
            let records = IngestRecord::load_all(&input)?;
            let store = CatalogStore::open(&paths)?;
            if rebuild {
                for warning in store.rebuild_schema() {
                    ui::warn(&warning.to_string());
                }
            }
            ensure_initialized(&store, &paths)?;

            tracing::info!("Ingesting {} records from {}", records.len(), input.display());
            let started = Instant::now();
            let progress = ui::IngestProgress::new(records.len());
            let mut added = 0;
            let mut failed = 0;

            for record in &records {
                match store.put(&record.summary, &record.details) {
                    Ok(image) => {
                        progress.inc(&image.short_id);
                        added += 1;
                    }
                    Err(e) => {
                        tracing::error!("Failed to add {}: {}", record.summary.id, e);
                        failed += 1;
                    }
                }
            }

            progress.finish_with_summary(started.elapsed(), added, failed);
            store.close()?;

            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::List => {
            let store = open_initialized(&paths)?;
            let images = store.get_all()?;
            store.close()?;
            print_images(&images, cli.json, "No images catalogued.")?;
        }

        Commands::Show { id, long, tag } => {
            let store = open_initialized(&paths)?;
            let (what, image) = match (id, long, tag) {
                (Some(id), _, _) => (id.clone(), store.get(&id)?),
                (_, Some(long), _) => (long.clone(), store.find_by_long_id(&long)?),
                (_, _, Some(tag)) => (tag.clone(), store.find_by_tag(&tag)?),
                (None, None, None) => unreachable!("clap requires one lookup argument"),
            };
            store.close()?;

            if image.is_empty() {
                if cli.json {
                    println!("null");
                } else {
                    ui::not_found(&what);
                }
                return Ok(ExitCode::FAILURE);
            }

            if cli.json {
                print_json(&image)?;
            } else {
                print_image(&image);
            }
        }

        Commands::Exists { id } => {
            let store = open_initialized(&paths)?;
            let exists = store.exists(&id)?;
            store.close()?;

            if cli.json {
                print_json(&serde_json::json!({ "id": id, "exists": exists }))?;
            } else {
                println!("{}", exists);
            }
            if !exists {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Labels { pattern } => {
            let store = open_initialized(&paths)?;
            let images = match &pattern {
                Some(pattern) => {
                    println!("{} Images with label matching '{}'", Icons::SEARCH, pattern);
                    store.get_images_by_label(pattern)?
                }
                None => store.get_images_with_labels()?,
            };
            store.close()?;
            print_images(&images, cli.json, "No labelled images found.")?;
        }

        Commands::Volumes { pattern } => {
            let store = open_initialized(&paths)?;
            let images = match &pattern {
                Some(pattern) => {
                    println!("{} Images with volume matching '{}'", Icons::SEARCH, pattern);
                    store.get_images_by_volume(pattern)?
                }
                None => store.get_images_with_volumes()?,
            };
            store.close()?;
            print_images(&images, cli.json, "No images with volumes found.")?;
        }

        Commands::Backup => {
            let target = gadget::storage::backup(&paths)?;
            if cli.json {
                print_json(&serde_json::json!({ "backup": target }))?;
            } else {
                println!("{} Backup written to {}", Icons::DATABASE, target.display());
            }
        }

        Commands::Stats => {
            let store = open_initialized(&paths)?;
            let stats = store.stats()?;
            store.close()?;

            if cli.json {
                print_json(&stats)?;
            } else {
                ui::header(&format!("Gadget catalog ({})", paths.database_path().display()));
                println!("{}", ui::stats_table(&stats));
            }
        }

        Commands::Config { action: ConfigAction::Init { force } } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let defaults = CatalogPaths::default();
            let config = CatalogConfig {
                directory: Some(defaults.directory.display().to_string()),
                file: Some(defaults.file),
            };
            config::write_config(&path, &config, force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn ensure_initialized(store: &CatalogStore, paths: &CatalogPaths) -> anyhow::Result<()> {
    if !store.has_table("images")? {
        anyhow::bail!(
            "catalog at {} is not initialized (run `gadget init`)",
            paths.database_path().display()
        );
    }
    Ok(())
}

fn open_initialized(paths: &CatalogPaths) -> anyhow::Result<CatalogStore> {
    let store = CatalogStore::open(paths)?;
    ensure_initialized(&store, paths)?;
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_images(images: &[Image], json: bool, empty: &str) -> anyhow::Result<()> {
    if json {
        return print_json(&images);
    }

    if images.is_empty() {
        println!("{} {}", Icons::EMPTY, ui::dim(empty));
    } else {
        println!("{}", ui::image_table(images));
    }
    Ok(())
}

fn print_image(image: &Image) {
    ui::image_header(image);
    ui::info("Long ID", &image.long_id);
    ui::info("Created", &image.created_at);
    ui::info("Size", &image.size);
    ui::info("Virtual size", &image.virtual_size);

    if !image.tags.is_empty() {
        ui::section("Tags");
        for tag in &image.tags {
            ui::summary_row(Icons::TAG, &ui::tag(&tag.tag));
        }
    }

    if !image.labels.is_empty() {
        ui::section("Labels");
        for label in &image.labels {
            ui::summary_row(&label.key, &ui::label(&label.value));
        }
    }

    if !image.volumes.is_empty() {
        ui::section("Volumes");
        for volume in &image.volumes {
            ui::summary_row(
                Icons::VOLUME,
                &format!("{} {}", ui::volume(&volume.volume), ui::dim(&volume.data)),
            );
        }
    }

    if !image.blob.details.is_empty() {
        ui::section("Blob");
        ui::summary_row("summary", &format!("{} bytes", image.blob.summary.len()));
        ui::summary_row("details", &format!("{} bytes", image.blob.details.len()));
    }
}
