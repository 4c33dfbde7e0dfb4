use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use provpath_cli::commands::data::handle_validate_data_command;
use provpath_cli::commands::load_service;
use provpath_cli::commands::path::{
    handle_connected_command, handle_path_command, handle_reachable_command, parse_road_class,
    PathArgs,
};
use provpath_cli::commands::region::{
    handle_info_command, handle_regions_command, handle_search_command, handle_stats_command,
    DEFAULT_SEARCH_LIMIT,
};
use provpath_cli::output::OutputFormat;
use provpath_cli::terminal::ColorPalette;
use provpath_lib::{ResolverConfig, RoadClass};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shortest paths between administrative regions")]
struct Cli {
    /// Directory holding provinces.json and adjacency.json.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the fewest-hop path between two regions.
    Path {
        /// Starting region code or name.
        #[arg(long)]
        from: String,
        /// Destination region code or name.
        #[arg(long)]
        to: String,
        /// Road class for distance estimation (direct, highway, national, provincial).
        #[arg(long, value_parser = parse_road_class, default_value = "unspecified")]
        road_class: RoadClass,
        /// Require exact code or name matches.
        #[arg(long)]
        exact: bool,
        /// Skip the external routing lookup.
        #[arg(long)]
        no_real_distance: bool,
    },
    /// List regions reachable from a region.
    Reachable {
        #[arg(long)]
        from: String,
        /// Stop after this many hops.
        #[arg(long)]
        max_hops: Option<usize>,
    },
    /// Check whether two regions are connected.
    Connected { first: String, second: String },
    /// Show one region and its neighbors.
    Info { region: String },
    /// Search regions by name.
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// List every region.
    Regions,
    /// Show graph statistics.
    Stats,
    /// Check dataset integrity; fails if the graph is disconnected.
    ValidateData,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let palette = ColorPalette::detect();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let data_dir = cli.data_dir.as_deref();
    let format = cli.format;

    match cli.command {
        Command::Path {
            from,
            to,
            road_class,
            exact,
            no_real_distance,
        } => {
            let args = PathArgs {
                from,
                to,
                road_class,
                exact,
                real_distance: !no_real_distance,
            };
            let resolver = if args.real_distance {
                ResolverConfig::from_env().build_resolver()
            } else {
                None
            };
            let service = load_service(data_dir, resolver)?;
            handle_path_command(&service, &args, format, &palette, &mut out)?;
        }
        Command::Reachable { from, max_hops } => {
            let service = load_service(data_dir, None)?;
            handle_reachable_command(&service, &from, max_hops, format, &palette, &mut out)?;
        }
        Command::Connected { first, second } => {
            let service = load_service(data_dir, None)?;
            handle_connected_command(&service, &first, &second, format, &palette, &mut out)?;
        }
        Command::Info { region } => {
            let service = load_service(data_dir, None)?;
            handle_info_command(&service, &region, format, &palette, &mut out)?;
        }
        Command::Search { query, limit } => {
            let service = load_service(data_dir, None)?;
            handle_search_command(&service, &query, limit, format, &palette, &mut out)?;
        }
        Command::Regions => {
            let service = load_service(data_dir, None)?;
            handle_regions_command(&service, format, &palette, &mut out)?;
        }
        Command::Stats => {
            let service = load_service(data_dir, None)?;
            handle_stats_command(&service, format, &palette, &mut out)?;
        }
        Command::ValidateData => {
            handle_validate_data_command(data_dir, format, &palette, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Logs go to stderr so stdout stays parseable with `--format json`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
