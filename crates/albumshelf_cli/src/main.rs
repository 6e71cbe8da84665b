//! Command-line front end for an album shelf library file.
//!
//! Reads and writes whole-library sync documents and performs single folder
//! and album edits against a SQLite store.

use albumshelf_core::{
    bootstrap, core_version, default_log_level, read_sync_json, write_sync_json, Album,
    CoreConfig, LibraryService, SqliteLibraryRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::Read as _;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "albumshelf")]
#[command(version, about = "Album shelf library CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// SQLite library file (`:memory:` for a throwaway store).
    #[arg(long, global = true, env = "ALBUMSHELF_DB", default_value = "albumshelf.sqlite3")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true, env = "ALBUMSHELF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotated log files. Logging is off when unset.
    #[arg(long, global = true, env = "ALBUMSHELF_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a user's library as a sync document
    Export {
        #[arg(long)]
        user: String,
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Replace a user's library with a sync document
    Import {
        #[arg(long)]
        user: String,
        /// Document file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Create one folder
    Mkdir {
        #[arg(long)]
        user: String,
        #[arg(long)]
        parent: Option<String>,
        name: String,
    },
    /// Append one album to a folder
    AddAlbum {
        #[arg(long)]
        user: String,
        #[arg(long)]
        folder: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        artist: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long, default_value_t = 0)]
        total_tracks: u32,
    },
    /// Print the core library version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::new(cli.db)
        .with_log_level(cli.log_level.as_deref().unwrap_or(default_log_level()));
    if let Some(log_dir) = cli.log_dir {
        config = config.with_log_dir(log_dir);
    }
    let open = || bootstrap(&config);

    match cli.command {
        Commands::Version => {
            println!("albumshelf_core version={}", core_version());
        }
        Commands::Export { user, pretty } => {
            let conn = open()?;
            let body = read_sync_json(&conn, &user)?;
            if pretty {
                let value: serde_json::Value = serde_json::from_str(&body)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{body}");
            }
        }
        Commands::Import { user, file } => {
            let conn = open()?;
            let body = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let response = write_sync_json(&conn, &user, &body);
            let status = if response.ok { "ok" } else { "error" };
            info!("event=cli_import module=cli status={status}");
            println!("{}", serde_json::to_string(&response)?);
            if !response.ok {
                return Err(response.message.into());
            }
        }
        Commands::Mkdir { user, parent, name } => {
            let conn = open()?;
            let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn)?);
            let folder = service.create_folder(&user, parent.as_deref(), name)?;
            println!("{}", serde_json::to_string(&folder)?);
        }
        Commands::AddAlbum {
            user,
            folder,
            name,
            artist,
            image_url,
            total_tracks,
        } => {
            let conn = open()?;
            let service = LibraryService::new(SqliteLibraryRepository::try_new(&conn)?);
            let mut album = Album::new(String::new(), name, artist, image_url);
            album.total_tracks = total_tracks;
            let album = service.add_album(&user, &folder, album)?;
            println!("{}", serde_json::to_string(&album)?);
        }
    }
    Ok(())
}
