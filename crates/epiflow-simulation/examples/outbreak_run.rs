//! Run a seeded 60-day outbreak over the Côte d'Ivoire geography and print
//! the headline numbers a dashboard would show.

use chrono::NaiveDate;

use epiflow_core::{ivory_coast_zones, Parameters};
use epiflow_mobility::generate;
use epiflow_simulation::Simulation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let zones = ivory_coast_zones();
    let start = NaiveDate::from_ymd_opt(2025, 6, 1).ok_or("bad start date")?;
    let matrix = generate(&zones, start);

    let mut sim = Simulation::with_rng_seed(zones, matrix, Parameters::default(), 2025)?;

    for _ in 0..60 {
        let report = sim.advance();
        for alert in &report.alerts {
            println!("[{}] {}", alert.date, alert.message);
        }
    }

    let global = sim.global_metrics();
    println!("\nday {} ({})", global.day, sim.current_date());
    println!("  active cases:    {}", global.total_active_cases);
    println!("  total cases:     {}", global.total_cases);
    println!("  recovered:       {}", global.total_recovered);
    println!("  high-risk zones: {}", global.high_risk_zones);
    println!("  7-day trend:     {:+.1}%", global.case_trend);
    println!("  mobility index:  {}%", sim.mobility_index());

    let forecast = sim.forecast();
    println!(
        "  forecast: {} cases in 7d, {} in 14d (±{:.0}%)",
        forecast.cases_7d,
        forecast.cases_14d,
        forecast.confidence_interval * 100.0
    );

    println!("\nbusiest corridors:");
    for edge in sim.mobility_matrix().top_flows(5) {
        println!("  {} -> {}: {} people/day", edge.origin, edge.dest, edge.volume);
    }

    println!("\nhighest-risk zones:");
    let mut metrics = sim.metrics();
    metrics.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    for m in metrics.iter().take(5) {
        println!(
            "  {:<16} risk {:>3} quarantine {:<8} active {:>7}",
            m.name, m.risk_score, m.quarantine.to_string(), m.active_cases
        );
    }

    Ok(())
}
