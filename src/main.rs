use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::Vector3;

use rocket_guidance::gnc::DescentController;
use rocket_guidance::maneuver::{Apsis, ManeuverExecutor, ManeuverPlanner};
use rocket_guidance::sim::{SimVessel, Terrain};
use rocket_guidance::vessel::{AutoStageState, Clock, Telemetry};
use rocket_guidance::GuidanceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    Circularize,
    Transfer,
    Landing,
    All,
}

/// Fly guidance scenarios against the built-in simulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the default guidance configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GuidanceConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GuidanceConfig::default(),
    };

    println!();
    println!("====================================================================");
    println!("  GUIDANCE DEMO");
    println!("====================================================================");

    if matches!(args.scenario, Scenario::Circularize | Scenario::All) {
        circularize(&config)?;
    }
    if matches!(args.scenario, Scenario::Transfer | Scenario::All) {
        transfer(&config)?;
    }
    if matches!(args.scenario, Scenario::Landing | Scenario::All) {
        landing(&config)?;
    }

    println!("====================================================================");
    println!();
    Ok(())
}

fn section(title: &str) {
    println!();
    println!("  {}", title);
    println!("  ──────────────────────────────────────────────────────────────────");
}

fn circularize(config: &GuidanceConfig) -> Result<()> {
    section("Circularization (Kerbin, 80 x 150 km)");
    let mut vessel = SimVessel::kerbin_orbit(80_000.0, 150_000.0)
        .with_encounter_samples(config.sim.encounter_samples);
    let before = vessel.orbit()?;

    let planner = ManeuverPlanner::new(config.search.clone());
    let plan = planner.circularize(&mut vessel, Apsis::Apoapsis)?;

    let mut executor = ManeuverExecutor::new(config.executor.clone());
    let mut stager = AutoStageState::from_config(&config.executor);
    let report = executor.execute(&mut vessel, &plan, &mut stager)?;
    let after = vessel.orbit()?;

    println!(
        "  Node:          t={:>8.1} s   prograde {:>7.2} m/s",
        plan.epoch, plan.prograde
    );
    println!(
        "  Burn:          {:>8.2} s    ignition t={:.1} s   cutoff t={:.1} s",
        report.schedule.burn_duration, report.ignition_time, report.cutoff_time
    );
    println!(
        "  Before:        {:>8.0} x {:<8.0} m   e={:.4}",
        before.periapsis, before.apoapsis, before.eccentricity
    );
    println!(
        "  After:         {:>8.0} x {:<8.0} m   e={:.4}",
        after.periapsis, after.apoapsis, after.eccentricity
    );
    println!("  Residual:      {:>8.3} m/s", report.residual_dv);
    Ok(())
}

fn transfer(config: &GuidanceConfig) -> Result<()> {
    section("Transfer planning (Kerbin 100 km -> Mun)");
    let mut vessel = SimVessel::kerbin_orbit(100_000.0, 100_000.0)
        .with_mun_target()
        .with_encounter_samples(config.sim.encounter_samples);

    let planner = ManeuverPlanner::new(config.search.clone());
    let transfer = planner.plan_transfer(&mut vessel)?;
    let plan = transfer.plan;

    println!(
        "  Node:          t={:>8.1} s   ({:.1} s from now)",
        plan.epoch,
        plan.epoch - vessel.time()
    );
    println!(
        "  Delta-v:       {:>8.1} m/s  (radial {:.1}, normal {:.1}, prograde {:.1})",
        plan.delta_v(),
        plan.radial,
        plan.normal,
        plan.prograde
    );
    println!(
        "  Score:         {:>12.0} -> {:<12.0} ({} evaluations)",
        transfer.initial_score, transfer.score, transfer.evaluations
    );
    Ok(())
}

fn landing(config: &GuidanceConfig) -> Result<()> {
    section("Powered descent (Mun, 3000 m, -80 m/s)");
    let terrain = Terrain::Slope { base: 150.0, axis: Vector3::y(), grade: 0.1 };
    let mut vessel = SimVessel::mun_descent(3_000.0, -80.0).with_terrain(terrain);

    let mut controller = DescentController::new(config.descent.clone());
    let report = controller.land(&mut vessel)?;

    if let Some(t) = report.braking_start {
        println!("  Braking:       t={:>8.2} s", t);
    }
    if let Some(t) = report.gear_time {
        println!("  Gear:          t={:>8.2} s", t);
    }
    println!(
        "  Touchdown:     t={:>8.2} s   {:.2} m/s",
        report.touchdown_time,
        vessel.touchdown_speed().unwrap_or(0.0)
    );
    println!("  Max throttle:  {:>8.3}", report.max_throttle);
    println!(
        "  Terrain normal: ({:.3}, {:.3}, {:.3})",
        report.terrain_normal.x, report.terrain_normal.y, report.terrain_normal.z
    );
    let propellant: f64 = vessel.craft().stages.iter().map(|s| s.propellant_mass).sum();
    println!("  Propellant left: {:>6.1} kg", propellant);
    Ok(())
}
