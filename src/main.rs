use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use daily_stress_forecast::calendar::{date_key, parse_date_key};
use daily_stress_forecast::logging::init_logging;
use daily_stress_forecast::report::{build_report, describe_day};
use daily_stress_forecast::{
    evaluate, expand_gated, impute, missing_dates, plan_restore, reconcile, source, Imputation,
    Metric, Reconciled, RestoreValues, Settings,
};

#[derive(Parser)]
#[command(name = "daily-stress-forecast")]
#[command(about = "Daily stress log reconciliation, backfill and forecast", long_about = None)]
struct Cli {
    /// JSON settings file (defaults to $DAILY_FORECAST_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reconciled per-day view
    Calendar {
        #[arg(long)]
        logs: PathBuf,
        #[arg(long, default_value_t = 14)]
        days: usize,
    },
    /// List missed days eligible for restore
    Missing {
        #[arg(long)]
        logs: PathBuf,
    },
    /// Suggest values for a missed day
    Impute {
        #[arg(long)]
        logs: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        #[arg(long)]
        samples: Option<usize>,
    },
    /// Show the gated multi-day forecast
    Forecast {
        #[arg(long)]
        eligibility: PathBuf,
        #[arg(long)]
        forecast: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Plan a restore for a missed day and print the entry as JSON
    Restore {
        #[arg(long)]
        logs: PathBuf,
        #[arg(long)]
        eligibility: PathBuf,
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        logs: PathBuf,
        #[arg(long)]
        eligibility: PathBuf,
        #[arg(long)]
        forecast: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date_key(raw).ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_reconciled(logs: &Path, today: NaiveDate) -> anyhow::Result<Reconciled> {
    let entries = source::load_logs(logs)?;
    Ok(reconcile(&entries, today))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Commands::Calendar { logs, days } => {
            let reconciled = load_reconciled(&logs, today)?;
            println!("Last {days} days up to {}:", date_key(today));
            for record in reconciled.days.values().rev().take(days) {
                println!("- {}", describe_day(record));
            }
        }
        Commands::Missing { logs } => {
            let reconciled = load_reconciled(&logs, today)?;
            let missing = missing_dates(reconciled.latest, today);

            if missing.is_empty() {
                println!("No missed days.");
                return Ok(());
            }

            println!("Missed days eligible for restore:");
            for date in missing {
                println!("- {}", date_key(date));
            }
        }
        Commands::Impute {
            logs,
            date,
            samples,
        } => {
            let reconciled = load_reconciled(&logs, today)?;
            let cap = samples.unwrap_or(settings.sample_cap);

            match impute(&reconciled, date, cap) {
                Imputation::InsufficientData => {
                    println!(
                        "Not enough logged days to estimate {}; enter values manually.",
                        date_key(date)
                    );
                }
                Imputation::Estimated(profile) => {
                    let display = profile.display_metrics();
                    println!(
                        "Suggested values for {} from {} days:",
                        date_key(date),
                        profile.sample_dates.len()
                    );
                    for metric in Metric::ALL {
                        match display.get(metric) {
                            Some(hours) => println!("- {}: {:.1}h", metric.label(), hours),
                            None => println!("- {}: no data", metric.label()),
                        }
                    }
                    match profile.mood {
                        Some(mood) => println!("- mood: {mood}"),
                        None => println!("- mood: no data"),
                    }
                }
            }
        }
        Commands::Forecast {
            eligibility,
            forecast,
            seed,
        } => {
            let snapshot = source::load_eligibility(&eligibility)?;
            let upstream = source::load_forecast(&forecast)?;
            let verdict = evaluate(&snapshot, &settings.gate);

            println!("Forecast mode: {}", verdict.mode);
            if let Some(reason) = verdict.reason.as_deref() {
                println!("{reason}");
                return Ok(());
            }

            let mut rng = rng_from(seed);
            let days = expand_gated(
                &verdict,
                &upstream,
                settings.forecast_days,
                &settings.advice,
                &mut rng,
            );
            if days.is_empty() {
                println!("No forecast available for '{}'.", upstream.forecast_date);
            }
            for day in days {
                println!(
                    "- {}: {} ({:.1}%) {}",
                    day.date_long, day.status, day.probability_percent, day.advice
                );
            }
        }
        Commands::Restore {
            logs,
            eligibility,
            date,
        } => {
            let reconciled = load_reconciled(&logs, today)?;
            let snapshot = source::load_eligibility(&eligibility)?;
            let missing = missing_dates(reconciled.latest, today);

            let values = impute(&reconciled, date, settings.sample_cap)
                .profile()
                .map(RestoreValues::from_profile)
                .unwrap_or_default();
            let entry = plan_restore(date, &values, &missing, &snapshot, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        Commands::Report {
            logs,
            eligibility,
            forecast,
            out,
            seed,
        } => {
            let reconciled = load_reconciled(&logs, today)?;
            let snapshot = source::load_eligibility(&eligibility)?;
            let upstream = source::load_forecast(&forecast)?;
            let missing = missing_dates(reconciled.latest, today);
            let verdict = evaluate(&snapshot, &settings.gate);

            let mut rng = rng_from(seed);
            let days = expand_gated(
                &verdict,
                &upstream,
                settings.forecast_days,
                &settings.advice,
                &mut rng,
            );
            let report = build_report(today, &reconciled, &missing, &verdict, &days, 14);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
