//! nwc-analysis CLI
//!
//! Run net working capital analysis from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyse the built-in demo dataset
//! nwc-analysis analyze
//!
//! # Analyse a CSV file, JSON output
//! nwc-analysis analyze --input nwc.csv --format json
//!
//! # Write the CSV template
//! nwc-analysis template --output nwc_template.csv
//! ```

use nwc_analysis::analysis::materiality::MaterialityMethod;
use nwc_analysis::analysis::report::AnalysisReport;
use nwc_analysis::config::AnalysisConfig;
use nwc_analysis::core::line_item::LineItemTable;
use nwc_analysis::core::loader::load_path;
use nwc_analysis::core::period::PeriodId;
use nwc_analysis::simulation::demo::demo_table;
use nwc_analysis::simulation::generator::{generate_random_table, TableConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"nwc-analysis — net working capital composition and forecast analysis

USAGE:
    nwc-analysis <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Totals, materiality, forecast deviation and sensitivity
    periods     List period columns and their classification
    template    Write the demo dataset as a CSV template
    generate    Generate a random line-item table (for testing)
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      CSV or workbook (.xlsx, .xls, .ods) with name, category
                        and period columns (default: demo data)
    --config <FILE>     JSON analysis config
    --method <M>        vs_CHOK (default), vs_TotalComponents or within_OA_CO
    --limit <PCT>       Tolerated NWC deviation in percent (default: 5)
    --forecast <P>      Forecast period (default: first forecast period)
    --baseline <P>      Baseline actual period (default: last actual period)
    --actual <LIST>     Comma-separated actual periods (default: all)
    --format <FORMAT>   Output format: text (default) or json
    --output <FILE>     Write to file instead of stdout

OPTIONS (periods):
    --input <FILE>      CSV or workbook file (default: demo data)
    --config <FILE>     JSON analysis config (for period keywords)

OPTIONS (template):
    --output <FILE>     Write to file instead of stdout

OPTIONS (generate):
    --items <N>         Number of line items (default: 10)
    --actual <N>        Number of actual periods (default: 4)
    --forecast <N>      Number of forecast periods (default: 1)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    nwc-analysis analyze
    nwc-analysis analyze --input nwc.csv --method within_OA_CO --limit 10
    nwc-analysis analyze --input nwc.csv --format json --output report.json
    nwc-analysis periods --input nwc.csv
    nwc-analysis generate --items 25 --actual 8 --forecast 2"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn next_value(args: &[String], i: &mut usize, flag: &str, expected: &str) -> String {
    *i += 1;
    args.get(*i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, expected)))
}

fn load_table(input: Option<&str>) -> (LineItemTable, String) {
    match input {
        Some(path) => {
            let table = load_path(path).unwrap_or_else(|e| fail(e));
            log::info!("loaded '{}'", path);
            (table, path.to_string())
        }
        None => (demo_table(), "demo".to_string()),
    }
}

fn load_config(path: Option<&str>) -> AnalysisConfig {
    match path {
        Some(path) => AnalysisConfig::from_json_path(path).unwrap_or_else(|e| fail(e)),
        None => AnalysisConfig::default(),
    }
}

fn emit(content: &str, output: Option<&str>) {
    match output {
        Some(path) => {
            fs::write(path, content)
                .unwrap_or_else(|e| fail(format!("writing to '{}': {}", path, e)));
            eprintln!("Wrote {}", path);
        }
        None => print!("{}", content),
    }
}

fn cmd_analyze(args: &[String]) {
    let mut input = None;
    let mut config_path = None;
    let mut method: Option<MaterialityMethod> = None;
    let mut limit: Option<Decimal> = None;
    let mut forecast = None;
    let mut baseline = None;
    let mut actual: Option<Vec<PeriodId>> = None;
    let mut format = "text".to_string();
    let mut output = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input = Some(next_value(args, &mut i, "--input", "a file path")),
            "--config" => config_path = Some(next_value(args, &mut i, "--config", "a file path")),
            "--method" => {
                let raw = next_value(args, &mut i, "--method", "a method name");
                method = Some(raw.parse().unwrap_or_else(|e| fail(e)));
            }
            "--limit" => {
                let raw = next_value(args, &mut i, "--limit", "a percentage");
                limit = Some(
                    raw.parse()
                        .unwrap_or_else(|e| fail(format!("invalid limit '{}': {}", raw, e))),
                );
            }
            "--forecast" => forecast = Some(next_value(args, &mut i, "--forecast", "a period label")),
            "--baseline" => baseline = Some(next_value(args, &mut i, "--baseline", "a period label")),
            "--actual" => {
                let raw = next_value(args, &mut i, "--actual", "a comma-separated list");
                actual = Some(raw.split(',').map(|s| PeriodId::new(s.trim())).collect());
            }
            "--format" => format = next_value(args, &mut i, "--format", "'text' or 'json'"),
            "--output" => output = Some(next_value(args, &mut i, "--output", "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let (table, source) = load_table(input.as_deref());
    let mut config = load_config(config_path.as_deref());
    if let Some(method) = method {
        config.materiality_method = method;
    }
    if let Some(limit) = limit {
        config.nwc_limit_pct = limit;
    }
    if let Some(forecast) = forecast {
        config.forecast_period = Some(PeriodId::new(forecast));
    }
    if let Some(baseline) = baseline {
        config.baseline_period = Some(PeriodId::new(baseline));
    }
    if actual.is_some() {
        config.actual_periods = actual;
    }

    let report = AnalysisReport::run(&table, &config)
        .unwrap_or_else(|e| fail(e))
        .with_source(source);

    let rendered = match format.as_str() {
        "json" => serde_json::to_string_pretty(&report).unwrap_or_else(|e| fail(e)) + "\n",
        "text" => report.to_string(),
        other => fail(format!("unknown format '{}', expected 'text' or 'json'", other)),
    };
    emit(&rendered, output.as_deref());
}

fn cmd_periods(args: &[String]) {
    let mut input = None;
    let mut config_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => input = Some(next_value(args, &mut i, "--input", "a file path")),
            "--config" => config_path = Some(next_value(args, &mut i, "--config", "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let (table, source) = load_table(input.as_deref());
    let config = load_config(config_path.as_deref());
    println!("Periods in {}:", source);
    for period in table.periods() {
        println!("  {:<30} {}", period.to_string(), config.keywords.classify(period));
    }
}

fn cmd_template(args: &[String]) {
    let mut output = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => output = Some(next_value(args, &mut i, "--output", "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }
    write_table_csv(&demo_table(), output.as_deref());
}

fn cmd_generate(args: &[String]) {
    let mut config = TableConfig::default();
    let mut output = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--items" => config.item_count = parse_count(args, &mut i, "--items"),
            "--actual" => config.actual_periods = parse_count(args, &mut i, "--actual"),
            "--forecast" => config.forecast_periods = parse_count(args, &mut i, "--forecast"),
            "--output" => output = Some(next_value(args, &mut i, "--output", "a file path")),
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let table = generate_random_table(&config);
    write_table_csv(&table, output.as_deref());
}

fn parse_count(args: &[String], i: &mut usize, flag: &str) -> usize {
    next_value(args, i, flag, "a number")
        .parse()
        .unwrap_or_else(|_| fail(format!("{} requires a number", flag)))
}

fn write_table_csv(table: &LineItemTable, output: Option<&str>) {
    let mut buf = Vec::new();
    table.to_csv(&mut buf).unwrap_or_else(|e| fail(e));
    let csv = String::from_utf8(buf).unwrap_or_else(|e| fail(e));
    emit(&csv, output);
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "periods" => cmd_periods(rest),
        "template" => cmd_template(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
