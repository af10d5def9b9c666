//! Thin CLI wrapping [`pathvault::PathIndex`] for manual exercising and scripting.
//! Not part of the library's consistency protocol; see SPEC_FULL.md §6a.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use pathvault::{Config, FileType, NewFile, PathIndex};

#[derive(Parser)]
#[command(name = "pathvault", version, about = "Path-mapped storage index CLI")]
struct Cli {
    /// Directory holding the database file (ignored with --memory).
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Keyspace / database file stem.
    #[arg(long, global = true, default_value = "pathvault")]
    keyspace: String,

    /// Use an ephemeral in-memory database instead of a file.
    #[arg(long, global = true)]
    memory: bool,

    /// Filesystem tag to operate against.
    #[arg(long, global = true, default_value = "default")]
    filesystem: String,

    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Insert a path, pointing it at a blob id/storage key/checksum.
    Insert {
        path: String,
        #[arg(long)]
        file_id: String,
        #[arg(long)]
        storage: String,
        #[arg(long, default_value_t = 0)]
        size: u64,
        #[arg(long)]
        checksum: Option<String>,
    },
    /// Remove a path. Directories require --force if non-empty.
    Rm {
        path: String,
        #[arg(long)]
        force: bool,
    },
    /// List the children of a directory.
    Ls { path: String },
    /// Show metadata for a path.
    Stat { path: String },
    /// Create a directory and any missing ancestors.
    Mkdirs { path: String },
    /// Copy a path, sharing the underlying blob.
    Cp { src: String, dest: String },
    #[command(subcommand)]
    Reclaim(ReclaimCommand),
}

#[derive(Subcommand)]
enum ReclaimCommand {
    /// List blobs eligible for physical reclamation.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List and acknowledge (remove from the queue) eligible blobs.
    Sweep {
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    pathvault::utils::logger::setup_logging(cli.verbose);

    let mut config = Config::default();
    config.keyspace = cli.keyspace.clone();

    let mut index = if cli.memory {
        PathIndex::open_memory(config)?
    } else {
        PathIndex::open(config, &cli.data_dir).context("open database")?
    };

    run(&cli, &mut index)?;
    index.flush();
    index.close();
    Ok(())
}

fn run(cli: &Cli, index: &mut PathIndex) -> Result<()> {
    let fs = cli.filesystem.as_str();
    match &cli.command {
        Command::Insert {
            path,
            file_id,
            storage,
            size,
            checksum,
        } => {
            let new_file = NewFile {
                fileid: file_id.clone(),
                filestorage: storage.clone(),
                size: *size,
                creation: pathvault::time::now_millis(),
                expiration: None,
                checksum: checksum.clone(),
            };
            index.insert(fs, path, &new_file)?;
            info!("inserted {path}");
        }
        Command::Rm { path, force } => {
            if index.delete(fs, path, *force)? {
                info!("removed {path}");
            } else {
                println!("{path}: no such path");
            }
        }
        Command::Ls { path } => {
            for entry in index.list(fs, path, FileType::All)? {
                println!("{}", entry.path);
            }
        }
        Command::Stat { path } => match index.get_path_map(fs, path)? {
            Some(entry) => println!("{path}: {entry:?}"),
            None => println!("{path}: no such path"),
        },
        Command::Mkdirs { path } => {
            index.make_dirs(fs, path)?;
            info!("created {path}");
        }
        Command::Cp { src, dest } => {
            if index.copy(fs, src, dest, None, None)? {
                info!("copied {src} -> {dest}");
            } else {
                println!("{src}: no such path");
            }
        }
        Command::Reclaim(ReclaimCommand::List { limit }) => {
            for entry in index.list_orphaned_files(*limit)? {
                println!("{} {}", entry.fileid, entry.storage);
            }
        }
        Command::Reclaim(ReclaimCommand::Sweep { limit }) => {
            for entry in index.list_orphaned_files(*limit)? {
                println!("reclaiming {} {}", entry.fileid, entry.storage);
                index.remove_from_reclaim(&entry)?;
            }
        }
    }
    Ok(())
}
