// Main entry point - BTC binary-market pricing engine demo

use clap::{Parser, Subcommand};
use chrono::Utc;

use bitcents::calibration::{self, CalibrationData};
use bitcents::config::SimConfig;
use bitcents::engine::{JobController, JobEvent, Sensitivity, SimRequest};
use bitcents::error::EngineError;
use bitcents::market_data::candles::CandleSet;
use bitcents::market_data::csv_loader::load_candles;
use bitcents::market_data::MarketDescriptor;
use bitcents::models::Target;

#[derive(Parser)]
#[command(name = "bitcents", about = "Monte Carlo fair-value engine for BTC binary markets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a binary target from a live spot and (optionally) candle CSVs
    Simulate {
        /// Market identifier used for caching
        #[arg(long, default_value = "BTC-DEMO")]
        market: String,
        /// Spot price, USD
        #[arg(long)]
        spot: f64,
        /// Above-strike target (exclusive with --range-low/--range-high)
        #[arg(long)]
        strike: Option<f64>,
        #[arg(long, requires = "range_high", conflicts_with = "strike")]
        range_low: Option<f64>,
        #[arg(long, requires = "range_low", conflicts_with = "strike")]
        range_high: Option<f64>,
        /// Hours until settlement (ignored when --close-time is given)
        #[arg(long, default_value_t = 1.0)]
        hours: f64,
        /// Market close time, ISO-8601 (e.g. 2025-06-01T15:00:00Z)
        #[arg(long)]
        close_time: Option<String>,
        #[arg(long, default_value_t = 20_000)]
        paths: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Volatility sensitivity multiplier in [0.9, 1.1]
        #[arg(long, default_value_t = 1.0)]
        vol_mult: f64,
        #[arg(long, default_value_t = 1.0)]
        jump_intensity_mult: f64,
        #[arg(long, default_value_t = 1.0)]
        jump_size_mult: f64,
        /// Capture histogram + sample paths into the report
        #[arg(long)]
        distribution: bool,
        #[arg(long)]
        minute_csv: Option<String>,
        #[arg(long)]
        hour_csv: Option<String>,
        #[arg(long)]
        day_csv: Option<String>,
    },
    /// Calibrate model parameters from three candle CSVs and print them
    Calibrate {
        minute_csv: String,
        hour_csv: String,
        day_csv: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Simulate {
            market,
            spot,
            strike,
            range_low,
            range_high,
            hours,
            close_time,
            paths,
            seed,
            vol_mult,
            jump_intensity_mult,
            jump_size_mult,
            distribution,
            minute_csv,
            hour_csv,
            day_csv,
        } => {
            simulate(SimulateArgs {
                market,
                spot,
                strike,
                range_low,
                range_high,
                hours,
                close_time,
                paths,
                seed,
                sensitivity: Sensitivity {
                    vol_mult,
                    jump_intensity_mult,
                    jump_size_mult,
                },
                distribution,
                minute_csv,
                hour_csv,
                day_csv,
            })
            .await
        }
        Command::Calibrate {
            minute_csv,
            hour_csv,
            day_csv,
        } => calibrate_report(&minute_csv, &hour_csv, &day_csv),
    };

    if let Err(err) = outcome {
        eprintln!("✗ {}", err);
        std::process::exit(1);
    }
}

struct SimulateArgs {
    market: String,
    spot: f64,
    strike: Option<f64>,
    range_low: Option<f64>,
    range_high: Option<f64>,
    hours: f64,
    close_time: Option<String>,
    paths: usize,
    seed: Option<u64>,
    sensitivity: Sensitivity,
    distribution: bool,
    minute_csv: Option<String>,
    hour_csv: Option<String>,
    day_csv: Option<String>,
}

fn load_calibration(
    minute_csv: Option<&str>,
    hour_csv: Option<&str>,
    day_csv: Option<&str>,
) -> Result<CalibrationData, EngineError> {
    match (minute_csv, hour_csv, day_csv) {
        (Some(minute), Some(hour), Some(day)) => {
            let set = CandleSet {
                minute: load_candles(minute)?,
                hour: load_candles(hour)?,
                day: load_candles(day)?,
            };
            Ok(calibration::calibrate(&set, Utc::now()))
        }
        (None, None, None) => Ok(CalibrationData::default_bundle(Utc::now())),
        _ => Err(EngineError::invalid(
            "provide all three of --minute-csv/--hour-csv/--day-csv, or none",
        )),
    }
}

async fn simulate(args: SimulateArgs) -> Result<(), EngineError> {
    // With an explicit close time the whole boundary goes through the
    // market descriptor, exactly as a feed-supplied market would.
    let (target, hours) = if let Some(close_time) = &args.close_time {
        let close_time = close_time
            .parse::<chrono::DateTime<Utc>>()
            .map_err(|e| EngineError::invalid(format!("bad --close-time: {}", e)))?;
        let descriptor = MarketDescriptor {
            ticker: args.market.clone(),
            close_time,
            strike_price: args.strike,
            range_low: args.range_low,
            range_high: args.range_high,
        };
        (descriptor.target()?, descriptor.hours_to_close(Utc::now())?)
    } else {
        let target = match (args.strike, args.range_low, args.range_high) {
            (Some(strike), None, None) => Target::Above { strike },
            (None, Some(low), Some(high)) => Target::Range { low, high },
            _ => {
                return Err(EngineError::invalid(
                    "specify --strike or both --range-low and --range-high",
                ))
            }
        };
        (target, args.hours)
    };

    let calibration = load_calibration(
        args.minute_csv.as_deref(),
        args.hour_csv.as_deref(),
        args.day_csv.as_deref(),
    )?;

    println!("{}", "=".repeat(70));
    println!("    BITCENTS: BTC BINARY MARKET FAIR VALUE");
    println!("{}", "=".repeat(70));
    if calibration.degraded {
        println!("⚠ Using default calibration bundle (no candle input)");
    } else {
        println!("✓ Calibrated from candle history");
    }
    println!("  daily RV:    {:.4}", calibration.daily_rv);
    println!("  intraday RV: {:.4}", calibration.intraday_rv);
    println!("  θ (theta):   {:.4}", calibration.heston.theta);
    println!("  ξ (xi):      {:.4}", calibration.heston.xi);
    println!("  κ (kappa):   {:.2}", calibration.heston.kappa);
    println!("  jumps:       λ={:.3}/h σ_j={:.3}", calibration.jumps.lambda, calibration.jumps.sigma_j);
    println!(
        "  regime:      {:?} {:?}",
        calibration.regime.current, calibration.regime.probabilities
    );

    let request = SimRequest {
        market_id: args.market,
        spot: args.spot,
        hours_to_close: hours,
        target,
        calibration,
        sensitivity: args.sensitivity,
        config: SimConfig {
            n_paths: args.paths,
            base_seed: args.seed,
            capture_distribution: args.distribution,
            ..SimConfig::default()
        },
    };

    let mut controller = JobController::new();
    let job = controller.submit(request)?;
    let mut events = controller
        .events(job)
        .ok_or_else(|| EngineError::invalid("event stream unavailable"))?;

    println!("\nSimulating {} paths...", args.paths);
    while let Some(event) = events.recv().await {
        match event {
            JobEvent::Progress(snapshot) => {
                println!(
                    "  batch {:>2}/{}: n={:<7} p={:.4}  CI=[{:.4}, {:.4}]",
                    snapshot.batch + 1,
                    snapshot.n_batches,
                    snapshot.cumulative_n,
                    snapshot.running_p,
                    snapshot.running_ci.0,
                    snapshot.running_ci.1
                );
            }
            JobEvent::Complete(result) => {
                println!("\n{}", "=".repeat(70));
                println!("RESULT");
                println!("{}", "=".repeat(70));
                println!("  target:      {:?}", result.target);
                println!("  probability: {:.4}", result.p);
                println!("  95% CI:      [{:.4}, {:.4}]", result.ci.0, result.ci.1);
                println!("  fair value:  {}¢", result.fair_cents);
                println!(
                    "  stderr:      {:.5}  (n={}, faults={}, clamped={})",
                    result.diagnostics.stderr,
                    result.diagnostics.n_paths,
                    result.diagnostics.faulted_paths,
                    result.diagnostics.clamped_steps
                );
                if let Some(dist) = &result.distribution {
                    println!(
                        "  terminal:    mean ${:.2}, sd ${:.2}",
                        dist.mean, dist.stddev
                    );
                    println!(
                        "  histogram:   {} bins, {} sample paths",
                        dist.histogram.len(),
                        dist.sample_paths.len()
                    );
                }
                break;
            }
            JobEvent::Error(message) => {
                return Err(EngineError::invalid(message));
            }
            JobEvent::Cancelled => {
                println!("cancelled");
                break;
            }
        }
    }
    Ok(())
}

fn calibrate_report(minute_csv: &str, hour_csv: &str, day_csv: &str) -> Result<(), EngineError> {
    let data = load_calibration(Some(minute_csv), Some(hour_csv), Some(day_csv))?;

    println!("{}", "=".repeat(70));
    println!("CALIBRATION");
    println!("{}", "=".repeat(70));
    println!("  degraded:    {}", data.degraded);
    println!("  daily RV:    {:.6}", data.daily_rv);
    println!("  weekly RV:   {:.6}", data.weekly_rv);
    println!("  intraday RV: {:.6}", data.intraday_rv);
    println!("  κ (kappa):   {:.4}", data.heston.kappa);
    println!("  θ (theta):   {:.6}  (vol {:.2}%)", data.heston.theta, data.heston.theta.sqrt() * 100.0);
    println!("  ξ (xi):      {:.4}", data.heston.xi);
    println!("  ρ (rho):     {:.2}", data.heston.rho);
    println!("  Feller:      2κθ/ξ² = {:.3}", data.heston.feller_ratio());
    println!("  jumps:       λ={:.4}/h  μ_j={:.2}  σ_j={:.4}  ({:?})", data.jumps.lambda, data.jumps.mu_j, data.jumps.sigma_j, data.jumps.kind);
    println!(
        "  regime:      {:?}  p={:?}",
        data.regime.current, data.regime.probabilities
    );
    Ok(())
}
