mod dashboard;
mod display;
mod entries;
mod notify;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use millrun_core::time::{parse_human_date, today};
use millrun_core::{logging, ChartMode, Config, DateRange, EntryFilter, EntryService, FileEntryStore, ProductionType, Shift};
use tracing::debug;

use crate::notify::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "millrun")]
#[command(about = "Textile production tracking for knitting, dyeing and garments lines", long_about = None)]
struct Cli {
    /// Owner id to act as (overrides MILLRUN_USER)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Production type: knitting, dyeing or garments
    #[arg(long = "type", short = 't', global = true)]
    kind: Option<String>,
    /// Directory holding the entry documents
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Record an entry (usage: add op:Asha sup:Ravi machine:K-07 start:2024-01-01T06:00 end:2024-01-01T14:00 actual:450 target:500 [notes...])
    Add {
        /// Fields as key:value; other words become notes
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Change fields of an existing entry
    Edit {
        /// Entry id or unique prefix
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete an entry
    Delete {
        /// Entry id or unique prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// List entries of the selected type
    List {
        /// Match operator, supervisor, machine and descriptive fields
        #[arg(long, short)]
        search: Option<String>,
        /// Only this date (YYYY-MM-DD, today, yesterday, -3d)
        #[arg(long, short)]
        date: Option<String>,
        /// morning, afternoon or night
        #[arg(long)]
        shift: Option<String>,
        /// 7days, 30days, 90days or all
        #[arg(long, short)]
        range: Option<String>,
    },
    /// Print summary statistics and tables
    Report {
        #[arg(long, short)]
        range: Option<String>,
    },
    /// Open the analytics dashboard
    Dashboard {
        #[arg(long, short)]
        range: Option<String>,
        /// Initial chart: daily, efficiency, quality or defects
        #[arg(long, short)]
        chart: Option<String>,
    },
    /// Show the field names add/edit accept
    Fields,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load();
    config.merge(Config {
        data_dir: cli.data_dir,
        user: cli.user,
        production_type: cli.kind.as_deref().map(str::parse).transpose()?,
        ..Config::default()
    });
    logging::init(config.log_filter.as_deref());
    debug!(?config, "configuration loaded");

    let store = FileEntryStore::new(config.data_dir.clone())?;
    let service = EntryService::new(store, ConsoleNotifier);
    let owner = config.user.as_deref();
    let kind: ProductionType = config.production_type();

    let range_or_default = |range: Option<String>| -> Result<DateRange> {
        match range {
            Some(r) => Ok(r.parse()?),
            None => Ok(config.date_range()),
        }
    };

    match cli.command {
        Some(Commands::Add { args }) => {
            entries::add(&service, owner, kind, &args)?;
        }
        Some(Commands::Edit { id, args }) => {
            entries::edit(&service, owner, &id, &args)?;
        }
        Some(Commands::Delete { id, yes }) => {
            entries::delete(&service, owner, &id, yes)?;
        }
        Some(Commands::List { search, date, shift, range }) => {
            // Lists show everything unless a range is asked for.
            let filter = EntryFilter {
                range: match range {
                    Some(r) => r.parse()?,
                    None => DateRange::All,
                },
                search,
                date: date.map(|d| parse_human_date(&d, today())).transpose()?,
                shift: shift.map(|s| s.parse::<Shift>()).transpose()?,
            };
            entries::list(&service, owner, kind, &filter)?;
        }
        Some(Commands::Report { range }) => {
            report::show(&service, owner, kind, range_or_default(range)?)?;
        }
        Some(Commands::Dashboard { range, chart }) => {
            let mode = chart.map(|c| c.parse::<ChartMode>()).transpose()?.unwrap_or_default();
            dashboard::run(service.store(), owner, kind, range_or_default(range)?, mode)?;
        }
        Some(Commands::Fields) => {
            entries::fields(kind);
        }
        None => {
            dashboard::run(service.store(), owner, kind, config.date_range(), ChartMode::default())?;
        }
    }
    Ok(())
}
