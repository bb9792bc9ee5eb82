use chrono::NaiveDate;
use env_logger::{Builder, Env};
use log::{error, info, warn};
use std::{error::Error, process};
use structopt::StructOpt;

use imapcp::{
    sync::{self, DateRange, FolderRestriction, SyncBuilder, SyncConfig, SyncEvent},
    ImapConfig,
};

/// Copies the folders and the emails of an IMAP account into another
/// one. Emails already present in the destination are skipped.
#[derive(StructOpt)]
#[structopt(name = "imapcp", max_term_width = 80)]
struct Opts {
    /// Source account, as user:password[:host[:port]].
    source: ImapConfig,

    /// Destination account, as user:password[:host[:port]].
    destination: ImapConfig,

    /// Skips the source folders matching this regular expression.
    /// Can be repeated.
    #[structopt(short, long, number_of_values = 1)]
    exclude: Vec<String>,

    /// Only copies this source folder, optionally under another name,
    /// as source[:destination].
    #[structopt(short, long)]
    folder: Option<FolderRestriction>,

    /// Shows what would be done without changing the destination.
    #[structopt(short, long)]
    simulate: bool,

    /// Strips whitespaces surrounding folder name segments.
    #[structopt(short, long)]
    trim: bool,

    /// Only creates the folders, without copying any email.
    #[structopt(short = "k", long = "skel")]
    skeleton: bool,

    /// Only copies emails dated from this day, as YYYY-MM-DD.
    #[structopt(long, parse(try_from_str = DateRange::parse_date))]
    from: Option<NaiveDate>,

    /// Only copies emails dated up to this day, as YYYY-MM-DD.
    #[structopt(long, parse(try_from_str = DateRange::parse_date))]
    to: Option<NaiveDate>,

    /// Number of connections opened per account.
    #[structopt(long, default_value = "1")]
    pool_size: usize,
}

fn config(opts: &Opts) -> sync::Result<SyncConfig> {
    let mut config = SyncConfig {
        folder: opts.folder.clone(),
        date_range: DateRange::new(opts.from, opts.to)?,
        skeleton: opts.skeleton,
        simulate: opts.simulate,
        trim: opts.trim,
        pool_size: opts.pool_size,
        ..SyncConfig::default()
    };

    for pattern in &opts.exclude {
        config = config.exclude(pattern)?;
    }

    Ok(config)
}

fn report(event: SyncEvent) {
    match event {
        SyncEvent::StateChanged(_) | SyncEvent::IndexProgress(..) => (),
        SyncEvent::DuplicateIdentities(..) => warn!("{}", event),
        event => info!("{}", event),
    }
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::from_args();

    let res = config(&opts).and_then(|config| {
        let builder = SyncBuilder::new(config).on_progress(report);
        sync::run(&opts.source, &opts.destination, &builder)
    });

    match res {
        Ok(report) => info!("{}", report),
        Err(err) => {
            error!("{}", err);
            let mut source = err.source();
            while let Some(err) = source {
                error!("caused by: {}", err);
                source = err.source();
            }
            process::exit(1);
        }
    }
}
