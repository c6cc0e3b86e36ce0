//! churn-runner: headless front end for the churn analytics core.
//!
//! Usage:
//!   churn-runner --seed 42 --preset full
//!   churn-runner --data telco.csv --group-by Contract,charges_group --export-csv out.csv
//!   churn-runner --config dashboard.json --report
//!   churn-runner --ipc-mode

use anyhow::Result;
use churn_core::{
    aggregate::{self, ChurnRateRow, RecordFilter, SummaryMetrics},
    config::{DashboardConfig, DatasetConfig},
    provider::DatasetProvider,
    record::{CustomerRecord, Field, NumericField},
    report::DashboardReport,
    scoring::{self, RiskAssessment, RiskProfile},
    synthetic::GeneratorPreset,
};
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Summary {
        #[serde(default)]
        filter: Selections,
    },
    ChurnRate {
        fields: Vec<String>,
        #[serde(default)]
        filter: Selections,
    },
    Correlation {
        field: String,
        #[serde(default)]
        filter: Selections,
    },
    Score {
        profile: RiskProfile,
    },
    Report {
        #[serde(default)]
        filter: Selections,
    },
    Quit,
}

/// Page filter selections: field name to allowed labels.
type Selections = BTreeMap<String, Vec<String>>;

#[derive(serde::Serialize)]
struct ChurnRateReply {
    fields: Vec<String>,
    rows:   Vec<ChurnRateRow>,
}

#[derive(serde::Serialize)]
struct CorrelationReply {
    field:       String,
    correlation: f64,
}

#[derive(serde::Serialize)]
struct ScoreReply {
    assessment:           RiskAssessment,
    tier_label:           &'static str,
    retention_strategies: &'static [&'static str],
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let want_report = args.iter().any(|a| a == "--report");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    apply_overrides(&mut config.dataset, &args)?;

    let group_by = flag_value(&args, "--group-by")
        .map(parse_fields)
        .transpose()?
        .unwrap_or_else(|| vec![Field::Contract]);
    let export_csv = flag_value(&args, "--export-csv").map(PathBuf::from);

    let provider = DatasetProvider::from_config(config.dataset.clone());

    if ipc_mode {
        return run_ipc_loop(&provider);
    }

    let records = provider.records()?;

    if want_report {
        let report = DashboardReport::build(&records)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&config.dataset, &records, &group_by)?;

    if let Some(path) = export_csv {
        let table = aggregate::churn_rate(records.iter(), &group_by)?;
        table.write_csv(File::create(&path)?)?;
        println!();
        println!("  exported {} groups to {}", table.len(), path.display());
    }

    Ok(())
}

fn apply_overrides(dataset: &mut DatasetConfig, args: &[String]) -> Result<()> {
    if let Some(path) = flag_value(args, "--data") {
        dataset.source_path = Some(PathBuf::from(path));
    }
    dataset.seed = parse_arg(args, "--seed", dataset.seed);
    if let Some(preset) = flag_value(args, "--preset") {
        dataset.preset = preset.parse::<GeneratorPreset>()?;
    }
    Ok(())
}

fn run_ipc_loop(provider: &DatasetProvider) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e)?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        // Failures answer the command and keep the loop alive.
        match handle_command(provider, cmd) {
            Ok(reply) => writeln!(stdout, "{reply}")?,
            Err(e) => {
                log::warn!("ipc command failed: {e:#}");
                write_error(&mut stdout, &e)?;
                continue;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(provider: &DatasetProvider, cmd: IpcCommand) -> Result<serde_json::Value> {
    let reply = match cmd {
        IpcCommand::Summary { filter } => {
            let filter = parse_filter(&filter)?;
            let records = provider.records()?;
            let kept = filter.apply(&records);
            serde_json::to_value(aggregate::summarize(kept.iter().copied())?)?
        }
        IpcCommand::ChurnRate { fields, filter } => {
            let parsed = fields
                .iter()
                .map(|f| f.parse::<Field>())
                .collect::<Result<Vec<_>, _>>()?;
            let filter = parse_filter(&filter)?;
            let records = provider.records()?;
            let kept = filter.apply(&records);
            let table = aggregate::churn_rate(kept.iter().copied(), &parsed)?;
            serde_json::to_value(ChurnRateReply { fields, rows: table.rows() })?
        }
        IpcCommand::Correlation { field, filter } => {
            let numeric: NumericField = field.parse()?;
            let filter = parse_filter(&filter)?;
            let records = provider.records()?;
            let kept = filter.apply(&records);
            let correlation = aggregate::correlation(kept.iter().copied(), numeric)?;
            serde_json::to_value(CorrelationReply { field, correlation })?
        }
        IpcCommand::Score { profile } => {
            profile.validate()?;
            let assessment = scoring::score(&profile);
            let tier = assessment.tier;
            serde_json::to_value(ScoreReply {
                assessment,
                tier_label: tier.label(),
                retention_strategies: tier.retention_strategies(),
            })?
        }
        IpcCommand::Report { filter } => {
            let filter = parse_filter(&filter)?;
            let records = provider.records()?;
            serde_json::to_value(DashboardReport::build_filtered(&records, &filter)?)?
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(reply)
}

fn parse_filter(selections: &Selections) -> Result<RecordFilter> {
    let filter = RecordFilter::from_labels(
        selections
            .iter()
            .map(|(field, labels)| (field.as_str(), labels.as_slice())),
    )?;
    Ok(filter)
}

fn write_error(stdout: &mut io::Stdout, err: &dyn std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": err.to_string() });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(dataset: &DatasetConfig, records: &[CustomerRecord], group_by: &[Field]) -> Result<()> {
    let SummaryMetrics {
        total_customers,
        churned_customers,
        churn_rate,
        avg_tenure,
        avg_monthly_charges,
    } = aggregate::summarize(records)?;

    let source = match &dataset.source_path {
        Some(path) => path.display().to_string(),
        None => format!("synthetic ({}, seed {})", dataset.preset.name(), dataset.seed),
    };

    println!("=== CHURN SUMMARY ===");
    println!("  generated:      {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  source:         {source}");
    println!("  customers:      {total_customers}");
    println!("  churned:        {churned_customers}");
    println!("  churn rate:     {churn_rate:.2}%");
    println!("  avg tenure:     {avg_tenure:.1} months");
    println!("  avg monthly:    ${avg_monthly_charges:.2}");

    println!();
    let names: Vec<&str> = group_by.iter().map(Field::name).collect();
    println!("=== CHURN BY {} ===", names.join(" x "));
    let table = aggregate::churn_rate(records, group_by)?;
    for row in table.ranked() {
        println!(
            "  {:<40} | {:>5} customers | {:>6.2}%",
            row.key.join(" / "),
            row.members,
            row.churn_rate
        );
    }

    println!();
    println!("=== CORRELATION WITH CHURN ===");
    for field in NumericField::ALL {
        match aggregate::correlation(records, *field) {
            Ok(r) => println!("  {:<15} {r:+.3}", field.name()),
            Err(e) => println!("  {:<15} n/a ({e})", field.name()),
        }
    }
    Ok(())
}

fn parse_fields(raw: &str) -> Result<Vec<Field>> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<Field>().map_err(anyhow::Error::from))
        .collect()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
