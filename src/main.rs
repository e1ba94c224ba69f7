use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spacecraft_dynamics::attitude::dynamics::{angular_momentum_inertial, kinetic_energy};
use spacecraft_dynamics::sim::{presets, simulate, EventKind, Scenario, SimConfig};
use spacecraft_dynamics::RunStatus;

#[derive(Parser)]
#[command(name = "spacecraft-dynamics", about = "Run an attitude control scenario and print a report")]
struct Cli {
    /// Preset scenario
    #[arg(short, long, default_value = "large-slew")]
    scenario: String,

    /// RON file overriding the preset's run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rows in the sampled trajectory table
    #[arg(long, default_value_t = 30)]
    rows: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut scenario: Scenario = presets::by_name(&cli.scenario)?;
    if let Some(path) = &cli.config {
        scenario.config = SimConfig::from_ron_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let outcome = simulate(&scenario)?;
    let traj = &outcome.trajectory;
    let config = &scenario.config;

    let (Some(first), Some(last)) = (traj.initial_state(), traj.final_state()) else {
        anyhow::bail!("run produced no states");
    };
    let errors = traj.pointing_error(&scenario.reference);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  ATTITUDE CONTROL SIMULATION: {}", scenario.name);
    println!("====================================================================");
    println!();
    println!("  Configuration");
    println!("  ──────────────────────────────────────────────────────────────────");
    let moments = scenario.inertia.principal_moments();
    println!(
        "  Inertia:       {:>8.2} {:>8.2} {:>8.2} kg·m^2",
        moments.x, moments.y, moments.z
    );
    println!("  Control law:   {:?}", config.control_law);
    println!("  Integrator:    {:?}    dt: {} s    steps: {}", config.integrator, config.dt, config.step_count);
    match config.actuator_limits {
        Some(m) => println!("  Torque limit:  {:>8.3} {:>8.3} {:>8.3} N·m", m[0], m[1], m[2]),
        None => println!("  Torque limit:  none"),
    }
    println!("  Disturbances:  {}", config.disturbances.len());
    println!();

    println!("  Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for event in &outcome.events {
        let label = match &event.kind {
            EventKind::SaturationOnset => "SAT ON".to_string(),
            EventKind::SaturationCleared => "SAT OFF".to_string(),
            EventKind::Settled { threshold } => format!("SETTLED < {threshold} rad"),
            EventKind::Unsettled { threshold } => format!("UNSETTLED > {threshold} rad"),
            EventKind::Custom(s) => s.clone(),
        };
        println!("  {:<24} t={:>8.1}s", label, event.time);
    }
    if let Some(t) = traj.settling_time(&scenario.reference, 1f64.to_radians()) {
        println!("  {:<24} t={:>8.1}s", "WITHIN 1 DEG", t);
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    let status = match &outcome.status {
        RunStatus::Completed => "completed".to_string(),
        RunStatus::Cancelled => "cancelled".to_string(),
        RunStatus::Failed(e) => format!("FAILED: {e}"),
    };
    println!("  Status:        {status}");
    println!(
        "  Final error:   {:>10.4} deg",
        errors.last().map(|(_, e)| e.to_degrees()).unwrap_or(0.0)
    );
    println!("  Max rate:      {:>10.4} deg/s", traj.max_rate().to_degrees());
    println!("  Max torque:    {:>10.4} N·m", traj.max_applied_torque());
    println!(
        "  Saturated:     {:>10} steps (first at {})",
        outcome.saturation.steps,
        outcome
            .saturation
            .first_time
            .map(|t| format!("{t:.1} s"))
            .unwrap_or_else(|| "never".into())
    );
    let h0 = angular_momentum_inertial(first, &scenario.inertia).norm();
    let h1 = angular_momentum_inertial(last, &scenario.inertia).norm();
    println!("  |H|:           {:>10.4} -> {:.4} N·m·s", h0, h1);
    println!(
        "  Energy:        {:>10.5} -> {:.5} J",
        kinetic_energy(first, &scenario.inertia),
        kinetic_energy(last, &scenario.inertia)
    );
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>8}  {:>9}  {:>10}  {:>10}  {:>4}",
        "t (s)", "err (deg)", "rate (d/s)", "tau (N·m)", "sat"
    );
    println!("  {}", "─".repeat(50));

    let sample_interval = (traj.len() / cli.rows.max(1)).max(1);
    for (i, s) in traj.iter().enumerate() {
        if i % sample_interval != 0 && i != traj.len() - 1 {
            continue;
        }
        // Torque that produced this state; none for the initial state
        let record = i.checked_sub(1).and_then(|k| traj.records().get(k));
        let torque = record.map(|r| r.applied.norm()).unwrap_or(0.0);
        let sat = if record.is_some_and(|r| r.saturated) { "*" } else { "" };
        println!(
            "  {:>8.1}  {:>9.3}  {:>10.4}  {:>10.5}  {:>4}",
            s.time,
            errors[i].1.to_degrees(),
            s.omega.norm().to_degrees(),
            torque,
            sat
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", traj.steps(), config.dt);
    println!("====================================================================");
    println!();
    Ok(())
}
