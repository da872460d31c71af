use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use quotebook_core::{SearchOptions, SearchParams, TagMatch};
use quotebook_storage::persistent::DEFAULT_TABLE;
use quotebook_storage::snapshot::write_snapshot;
use quotebook_storage::{
    pick_random_from_store, search, search_then_random, PersistentStore, RandomStrategy, Storage,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Quotebook query and admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print matching quotes as JSON lines.
    Search {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Print one random match instead of all of them.
        #[arg(long)]
        random: bool,
    },
    /// Print one quote drawn uniformly from the whole store.
    Random {
        #[arg(long)]
        db: PathBuf,
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
        #[arg(long, default_value = "contiguous")]
        strategy: RandomStrategy,
    },
    /// Write a zstd snapshot of a database file.
    Export {
        db: PathBuf,
        out: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,
    },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Author name, or true/false to filter on presence.
    #[arg(long)]
    author: Option<String>,
    /// Title, or true/false to filter on presence.
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    like_count_min: Option<i64>,
    #[arg(long)]
    like_count_max: Option<i64>,
    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,
    #[arg(long, default_value = "all")]
    tags_type: TagMatch,
    /// Treat a zero like-count bound as a real bound.
    #[arg(long)]
    honor_zero_bounds: bool,
}

impl FilterArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            zero_bound_as_unset: !self.honor_zero_bounds,
        }
    }

    fn into_params(self) -> SearchParams {
        SearchParams {
            author: self.author,
            title: self.title,
            like_count_min: self.like_count_min,
            like_count_max: self.like_count_max,
            tags_str: self.tags,
            tags_type: self.tags_type,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Search {
            db,
            table,
            filters,
            random,
        } => {
            let store = PersistentStore::open(db, &table)?;
            let opts = filters.options();
            let req = filters.into_params().into_request(&opts);
            if random {
                match search_then_random(&store, &req, &opts, &mut rand::thread_rng())? {
                    Some(doc) => println!("{}", serde_json::to_string(&doc.quote)?),
                    None => bail!("no quote matched the filters"),
                }
            } else {
                for doc in search(&store, &req, &opts)? {
                    println!("{}", serde_json::to_string(&doc.quote)?);
                }
            }
        }
        Cmd::Random {
            db,
            table,
            strategy,
        } => {
            let store = PersistentStore::open(db, &table)?;
            let doc = pick_random_from_store(&store, &mut rand::thread_rng(), strategy)?;
            println!("{}", serde_json::to_string(&doc.quote)?);
        }
        Cmd::Export { db, out, table } => {
            let store = PersistentStore::open(db, &table)?;
            let out = out.unwrap_or_else(|| {
                PathBuf::from("snapshots").join(format!("quotes-{}.zst", ulid::Ulid::new()))
            });
            let manifest = write_snapshot(&out, &store.all())?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
    }
    Ok(())
}
