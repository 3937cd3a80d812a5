//! Basic NWC analysis example.
//!
//! Aggregates the demo dataset and scores each line item's materiality
//! under all three methods.

use nwc_analysis::analysis::materiality::{compute_materiality, MaterialityMethod};
use nwc_analysis::analysis::totals::aggregate_totals;
use nwc_analysis::core::line_item::Category;
use nwc_analysis::core::period::{PeriodKeywords, PeriodKind};
use nwc_analysis::simulation::demo::demo_table;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  nwc-analysis: Basic Analysis Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let table = demo_table();
    let keywords = PeriodKeywords::default();
    let actual = table.periods_of_kind(PeriodKind::Actual, &keywords);

    // --- Step 1: Totals ---
    println!("━━━ Step 1: Totals over {} actual periods ━━━\n", actual.len());

    let totals = aggregate_totals(&table, &actual);
    println!("{}", totals);

    // --- Step 2: Materiality ---
    for method in MaterialityMethod::ALL {
        println!("━━━ Step 2: Materiality ({}) ━━━\n", method.tag());
        println!("{}\n", method.description());

        let materiality = compute_materiality(&table, &totals, &actual, method);
        println!("{}", materiality);

        if let Some(last) = actual.last() {
            let assets: Vec<&str> = table.items_in(Category::Asset).map(|i| i.name()).collect();
            let all: Vec<&str> = table.items().iter().map(|i| i.name()).collect();
            println!(
                "{}: assets column {:.2}%, all rows {:.2}%\n",
                last,
                materiality.column_sum(last, assets),
                materiality.column_sum(last, all),
            );
        }
    }
}
