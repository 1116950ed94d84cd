use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use log::debug;

use crate::data::database::NeoDatabase;
use crate::data::filter::{create_filters, limit, AttributeFilter, Criteria};
use crate::data::time::parse_date;
use crate::output::write_results;

/// How many matches `query` prints when neither `--limit` nor `--outfile` is given.
const DEFAULT_PRINT_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Argument definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "neo-explorer", version, about = "Explore past and future close approaches of near-Earth objects")]
pub struct Cli {
    /// CSV file of near-Earth objects.
    #[arg(long, env = "NEO_FILE", default_value = "data/neos.csv")]
    pub neofile: PathBuf,

    /// JSON file of close approaches.
    #[arg(long, env = "CAD_FILE", default_value = "data/cad.json")]
    pub cadfile: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one NEO, looked up by designation or name.
    Inspect(InspectArgs),
    /// Find close approaches matching the given criteria.
    Query(QueryArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["pdes", "name"])))]
pub struct InspectArgs {
    /// Primary designation of the NEO.
    #[arg(short, long)]
    pub pdes: Option<String>,

    /// IAU name of the NEO.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also list the NEO's close approaches.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Default, Args)]
pub struct QueryArgs {
    /// Only approaches on this date (YYYY-MM-DD).
    #[arg(short, long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,

    /// Only approaches on or after this date (YYYY-MM-DD).
    #[arg(short, long, value_parser = date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Only approaches on or before this date (YYYY-MM-DD).
    #[arg(short, long, value_parser = date_arg)]
    pub end_date: Option<NaiveDate>,

    /// Minimum approach distance in au.
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Maximum approach distance in au.
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Minimum relative velocity in km/s.
    #[arg(long)]
    pub min_velocity: Option<f64>,

    /// Maximum relative velocity in km/s.
    #[arg(long)]
    pub max_velocity: Option<f64>,

    /// Minimum NEO diameter in km.
    #[arg(long)]
    pub min_diameter: Option<f64>,

    /// Maximum NEO diameter in km.
    #[arg(long)]
    pub max_diameter: Option<f64>,

    /// Only potentially hazardous NEOs.
    #[arg(long, conflicts_with = "not_hazardous")]
    pub hazardous: bool,

    /// Only NEOs that are not potentially hazardous.
    #[arg(long)]
    pub not_hazardous: bool,

    /// Extra filter expression such as `distance<=0.05` (repeatable).
    #[arg(short, long = "filter")]
    pub filters: Vec<AttributeFilter>,

    /// Maximum number of results. 0 means no limit.
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Write results to a .csv or .json file instead of printing them.
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

impl QueryArgs {
    pub fn criteria(&self) -> Criteria {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Criteria {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.min_distance,
            distance_max: self.max_distance,
            velocity_min: self.min_velocity,
            velocity_max: self.max_velocity,
            diameter_min: self.min_diameter,
            diameter_max: self.max_diameter,
            hazardous,
        }
    }

    /// Filters from the criteria flags followed by any `--filter` expressions.
    pub fn build_filters(&self) -> Vec<AttributeFilter> {
        let mut filters = create_filters(&self.criteria());
        filters.extend(self.filters.iter().copied());
        filters
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

pub fn run(cli: &Cli, db: &NeoDatabase, out: &mut impl Write) -> Result<()> {
    match &cli.command {
        Command::Inspect(args) => inspect(db, args, out),
        Command::Query(args) => query(db, args, out),
    }
}

pub fn inspect(db: &NeoDatabase, args: &InspectArgs, out: &mut impl Write) -> Result<()> {
    let neo = match (&args.pdes, &args.name) {
        (Some(pdes), _) => db.get_by_designation(pdes),
        (None, Some(name)) => db.get_by_name(name),
        (None, None) => None,
    };

    let Some(neo) = neo else {
        writeln!(out, "No matching NEOs exist in the database.")?;
        return Ok(());
    };

    writeln!(out, "{neo}")?;
    if args.verbose {
        for approach in db.approaches_of(neo) {
            writeln!(out, "- {approach}")?;
        }
    }
    Ok(())
}

pub fn query(db: &NeoDatabase, args: &QueryArgs, out: &mut impl Write) -> Result<()> {
    let filters = args.build_filters();
    for filter in &filters {
        debug!("Filter: {filter}");
    }
    let results = db.query(&filters);

    match &args.outfile {
        Some(path) => {
            let written = write_results(limit(results, args.limit), path)?;
            writeln!(out, "Wrote {written} close approaches to {}", path.display())?;
        }
        None => {
            let n = args.limit.or(Some(DEFAULT_PRINT_LIMIT));
            let mut printed = 0;
            for approach in limit(results, n) {
                writeln!(out, "{approach}")?;
                printed += 1;
            }
            if printed == 0 {
                writeln!(out, "No matching close approaches.")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_flags() {
        let cli = Cli::try_parse_from([
            "neo-explorer",
            "--neofile",
            "n.csv",
            "query",
            "--start-date",
            "2020-01-01",
            "--max-distance",
            "0.1",
            "--not-hazardous",
            "--filter",
            "velocity>=10",
            "--limit",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.neofile, PathBuf::from("n.csv"));
        let Command::Query(args) = cli.command else {
            panic!("expected query");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(criteria.distance_max, Some(0.1));
        assert_eq!(criteria.hazardous, Some(false));
        assert_eq!(args.limit, Some(5));
        assert_eq!(args.build_filters().len(), 4);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["neo-explorer", "inspect"]).is_err());
        assert!(Cli::try_parse_from(["neo-explorer", "query", "--date", "01/02/2020"]).is_err());
        assert!(Cli::try_parse_from(["neo-explorer", "query", "--filter", "mass<=1"]).is_err());
        assert!(Cli::try_parse_from(["neo-explorer", "query", "--hazardous", "--not-hazardous"]).is_err());
    }
}
