//! Forecast review example.
//!
//! Compares a forecast quarter against the last actual quarter and shows
//! how each line item's error budget changes with the tolerated NWC
//! deviation.

use nwc_analysis::analysis::deviation::compute_deviations;
use nwc_analysis::analysis::report::AnalysisReport;
use nwc_analysis::analysis::sensitivity::compute_allowed_error;
use nwc_analysis::analysis::totals::{aggregate_totals, Indicator};
use nwc_analysis::config::AnalysisConfig;
use nwc_analysis::core::line_item::{Category, LineItem, LineItemTable};
use nwc_analysis::core::period::PeriodId;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  nwc-analysis: Forecast Review Example   ║");
    println!("╚══════════════════════════════════════════╝\n");

    let baseline = PeriodId::new("Q4 Actual");
    let forecast = PeriodId::new("Q1 Forecast");

    let table = LineItemTable::new([baseline.clone(), forecast.clone()])
        .with_item(
            LineItem::new("Cash", Category::Asset)
                .with_value(baseline.clone(), Some(dec!(600)))
                .with_value(forecast.clone(), Some(dec!(580))),
        )
        .with_item(
            LineItem::new("Receivables", Category::Asset)
                .with_value(baseline.clone(), Some(dec!(1400)))
                .with_value(forecast.clone(), Some(dec!(1520))),
        )
        .with_item(
            LineItem::new("Prepayments", Category::Asset)
                .with_value(baseline.clone(), Some(dec!(0)))
                .with_value(forecast.clone(), Some(dec!(40))),
        )
        .with_item(
            LineItem::new("Payables", Category::Liability)
                .with_value(baseline.clone(), Some(dec!(800)))
                .with_value(forecast.clone(), Some(dec!(860))),
        )
        .with_item(
            LineItem::new("Deferred revenue", Category::Liability)
                .with_value(baseline.clone(), None)
                .with_value(forecast.clone(), Some(dec!(0))),
        );

    let totals = aggregate_totals(&table, &[baseline.clone(), forecast.clone()]);

    // --- Scenario 1: Deviation against the last actual ---
    println!("━━━ Scenario 1: {} vs {} ━━━\n", forecast, baseline);

    let deviations = compute_deviations(&table, &totals, &forecast, &baseline);
    println!("{}", deviations);
    if let Some(nwc) = deviations.aggregate(Indicator::Nwc) {
        println!(
            "NWC moves by {} ({})\n",
            nwc.deviation.absolute.display_amount(),
            nwc.deviation.relative.display_percent()
        );
    }

    // --- Scenario 2: Error budgets at different limits ---
    let forecast_nwc = totals.nwc(&forecast);
    for limit in [dec!(2), dec!(5), dec!(10)] {
        println!("━━━ Scenario 2: Error budget at ±{}% NWC ━━━\n", limit);
        let sensitivity = compute_allowed_error(&table, &forecast, forecast_nwc, limit);
        println!("{}", sensitivity);
    }

    // --- Scenario 3: Full run with a baseline that does not exist ---
    println!("━━━ Scenario 3: Unknown baseline ━━━\n");

    let config = AnalysisConfig {
        baseline_period: Some(PeriodId::new("Q3 Actual")),
        ..Default::default()
    };
    match AnalysisReport::run(&table, &config) {
        Ok(report) => {
            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}
