use crate::generator::RunReport;
use crate::stages::dispatch::SLACK_COLUMN;

pub fn print_run_report(report: &RunReport) {
    println!("\n--- Generation Report ---");
    if let Ok(horizon) = report.params.horizon() {
        println!(
            "Horizon: {} steps of {} min from {}",
            horizon.n_steps, horizon.dt_minutes, horizon.start
        );
    }
    println!(
        "Load points: {}, renewable generators: {}",
        report.load_characteristics.len(),
        report.renewable_characteristics.len()
    );
    for scenario in &report.scenarios {
        let stages: Vec<&str> = scenario.stages.iter().map(|s| s.as_str()).collect();
        println!(
            "{} [{}] -> {}",
            scenario.identity.name,
            stages.join(", "),
            scenario.identity.path.display()
        );
        if let Some(dispatch) = &scenario.dispatch {
            let slack = dispatch.slack.column(SLACK_COLUMN).unwrap_or_default();
            let unserved = slack.iter().filter(|v| **v > 0.0).count();
            let peak = slack.iter().copied().fold(0.0_f64, f64::max);
            println!("  dispatch: {unserved} steps with unserved demand, peak slack {peak:.2}");
        }
    }
}
