mod reports;
mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fieldrepair_game::{ChassisLocation, Component, ComponentType, ModConfig, Vehicle};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "fieldrepair-tester", version = "0.1.0")]
#[command(about = "Seeded QA runs for Field Repairs vehicle damage allocation")]
struct Args {
    /// Mod configuration JSON (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vehicle listing JSON (a sample vehicle is used when omitted)
    #[arg(long)]
    vehicle: Option<PathBuf>,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Allocations per seed
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Print every roll
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    config.validate().context("invalid mod configuration")?;
    let vehicle = load_vehicle(args.vehicle.as_deref())?;
    let seeds = parse_seeds(&args.seeds)?;

    if args.report == "console" {
        println!("{}", "🔧 Field Repairs Allocation Tester".bright_cyan().bold());
        println!("{}", "==================================".cyan());
        println!(
            "Vehicle {} with {} components, {} rolls per repair",
            vehicle.id.bold(),
            vehicle.components.len(),
            config.damage_rolls.vehicle_rolls
        );
    }

    let mut reports = Vec::with_capacity(seeds.len());
    for seed in seeds {
        log::info!("running seed {seed}");
        reports.push(simulation::run_seed(
            &vehicle,
            &config,
            seed,
            args.iterations,
            args.verbose,
        )?);
    }

    match args.report.as_str() {
        "json" => reports::generate_json_report(&reports)?,
        _ => reports::generate_console_report(&reports),
    }

    if reports.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ModConfig> {
    let Some(path) = path else {
        return Ok(ModConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    ModConfig::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn load_vehicle(path: Option<&Path>) -> Result<Vehicle> {
    let Some(path) = path else {
        return Ok(sample_vehicle());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading vehicle {}", path.display()))?;
    Vehicle::from_json(&raw).with_context(|| format!("parsing vehicle {}", path.display()))
}

fn parse_seeds(raw: &str) -> Result<Vec<u64>> {
    split_csv(raw)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed {token:?}"))
        })
        .collect()
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Medium tracked vehicle used when no listing is supplied.
pub(crate) fn sample_vehicle() -> Vehicle {
    Vehicle::new(
        "manticore",
        vec![
            Component::new(1, "Crew Compartment", ComponentType::Cockpit).critical(),
            Component::new(2, "Fusion Engine", ComponentType::Upgrade)
                .with_category("EnginePart")
                .with_max_hits(3)
                .at(ChassisLocation::Rear),
            Component::new(3, "Engine Shielding", ComponentType::Upgrade)
                .with_category("EnginePart")
                .at(ChassisLocation::Rear),
            Component::new(4, "Heat Sink", ComponentType::HeatSink),
            Component::new(5, "LRM 10 Ammo", ComponentType::AmmunitionBox).at(ChassisLocation::Rear),
            Component::new(6, "SRM 6 Ammo", ComponentType::AmmunitionBox).at(ChassisLocation::Rear),
            Component::new(7, "PPC", ComponentType::Weapon).at(ChassisLocation::Turret),
            Component::new(8, "LRM 10", ComponentType::Weapon).at(ChassisLocation::Turret),
            Component::new(9, "SRM 6", ComponentType::Weapon).at(ChassisLocation::Turret),
            Component::new(10, "Medium Laser", ComponentType::Weapon).at(ChassisLocation::Front),
            Component::new(11, "Searchlight", ComponentType::Upgrade).at(ChassisLocation::Front),
            Component::new(12, "Turret Armor", ComponentType::Upgrade).with_category("Armor"),
        ],
    )
}
