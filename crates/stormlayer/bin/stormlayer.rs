//! stormlayer command-line entry point.
//!
//! A thin wrapper around the stormlayer library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Opens the client archives
//! 4. Runs one subcommand against them

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use stormlayer::{ArchiveConfig, ArchiveId, ArchiveManager, Locale};

/// Look up files in a World of Warcraft client's MPQ archives
#[derive(Debug, Parser)]
#[command(name = "stormlayer", version)]
struct Cli {
    /// Client data directory
    #[arg(long, env = "STORMLAYER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, env = "STORMLAYER_CONFIG")]
    config: Option<PathBuf>,

    /// Locales to probe, in priority order (comma separated)
    #[arg(long, value_delimiter = ',')]
    locales: Vec<Locale>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List installed locales
    Locales,

    /// List opened archives in search order
    Archives,

    /// Extract one file
    Extract {
        /// Logical path inside the archives
        path: String,

        /// Only search this locale's archives
        #[arg(long, conflicts_with = "archive")]
        locale: Option<Locale>,

        /// Only search the archive with this id (see `archives`)
        #[arg(long)]
        archive: Option<usize>,

        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a client database table
    Dbc {
        /// Table name without extension, e.g. `Map`
        name: String,

        /// Number of records to print
        #[arg(long, default_value_t = 5)]
        records: u32,
    },
}

impl Cli {
    fn archive_config(&self) -> Result<ArchiveConfig> {
        let mut config = match &self.config {
            Some(path) => ArchiveConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ArchiveConfig::default(),
        };

        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir);
        }
        if !self.locales.is_empty() {
            config = config.with_locales(self.locales.iter().copied());
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.archive_config()?;

    let manager = ArchiveManager::initialize(config).context("opening client archives")?;

    match cli.command {
        Command::Locales => {
            for locale in manager.available_locales() {
                let set = manager
                    .locale_archives(*locale)
                    .context("locale set missing")?;
                let marker = if *locale == manager.default_locale() {
                    " (default)"
                } else {
                    ""
                };
                println!("{locale}{marker}: {} archives", set.len());
            }
        }
        Command::Archives => {
            for info in manager.archives().iter().rev() {
                let locale = info.locale.map_or_else(String::new, |l| format!(" [{l}]"));
                println!("{:>3} {}{locale}", info.id.index(), info.path.display());
            }
        }
        Command::Extract {
            path,
            locale,
            archive,
            output,
        } => {
            let bytes = match (locale, archive) {
                (Some(locale), _) => manager.resolve_for_locale(&path, locale)?,
                (None, Some(id)) => manager.resolve_from(&path, ArchiveId::new(id))?,
                (None, None) => match manager.resolve_with_source(&path)? {
                    Some((source, bytes)) => {
                        tracing::info!("{path} found in {}", source.path.display());
                        Some(bytes)
                    }
                    None => None,
                },
            };

            let Some(bytes) = bytes else {
                bail!("{path} not found");
            };

            match output {
                Some(file) => std::fs::write(&file, &bytes)
                    .with_context(|| format!("writing {}", file.display()))?,
                None => std::io::stdout().lock().write_all(&bytes)?,
            }
        }
        Command::Dbc { name, records } => {
            let table = manager.resolve_record_table(&name)?;
            let header = table.header();
            println!(
                "{name}: {} records, {} fields, {} bytes per record, {} bytes of strings",
                header.record_count, header.field_count, header.record_size, header.string_block_size
            );

            for record in table.records().take(records as usize) {
                let fields: Vec<String> = (0..table.field_count())
                    .filter_map(|field| record.get_u32(field))
                    .map(|value| value.to_string())
                    .collect();
                println!("  {}", fields.join(" "));
            }
        }
    }

    Ok(())
}
