//! zones_check - validate a parking zone file.
//!
//! Loads a zone file through the same path the daemon uses and prints
//! per-zone stats, so a freshly drawn spot layout can be checked
//! before deployment. Exits non-zero on any validation error.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use parkwatch::geometry::hull_area2;
use parkwatch::ZoneStore;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Validate a parking zone file and print per-zone stats"
)]
struct Args {
    /// Path to the zone JSON file.
    #[arg(long, env = "PARKWATCH_ZONES", default_value = "parking_spots.json")]
    zones: String,

    /// Echo hull vertices per zone.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let store = ZoneStore::load(&args.zones)?;
    println!("{}: {} zones", args.zones, store.len());
    for zone in store.iter() {
        let area = hull_area2(zone.hull()) as f64 / 2.0;
        println!(
            "zone {:>3}: {} vertices, {} hull vertices, area {:.1} px^2",
            zone.id,
            zone.points.len(),
            zone.hull().len(),
            area
        );
        if args.verbose {
            for p in zone.hull() {
                println!("    ({}, {})", p.x, p.y);
            }
        }
    }
    Ok(())
}
