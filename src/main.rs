use analytics::wager::{petersburg_payoffs, recovery_curve, recovery_percent, wager_curve};
use analytics::{
    KellyReport, OutcomeDistribution, Ratio, SafeHaven, blend_with_haven, find_optimal_ratio,
    frequency_table, range_summaries,
};
use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use configuration::{Config, DistributionSettings, load_config};
use core_types::YearlyReturn;
use serde::Serialize;
use simulation::{Histogram, RandomWalk, WalkSettings, histogram, interval};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod output;

/// The main entry point for the haven analysis tool.
fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // The guard flushes buffered file logs when it goes out of scope at exit.
    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error setting up logging: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Outcome statistics for Kelly sizing and safe-haven analysis.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Print results as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend the two configured distributions and print the Kelly table.
    Blend(BlendArgs),
    /// Sweep every ratio on a grid and report the one with the best geometric mean.
    Sweep(SweepArgs),
    /// Simulate repeated all-in bets on a distribution.
    Walk(WalkArgs),
    /// Price a lottery ticket by its Bernoulli expected value.
    Wager(WagerArgs),
    /// Gain needed to recover from a loss.
    Recovery(RecoveryArgs),
    /// Analyse yearly index returns, optionally blended with a safe haven.
    Returns(ReturnsArgs),
}

#[derive(Parser)]
struct BlendArgs {
    /// Override the configured ratio, e.g. "0.4,0.6".
    #[arg(long, value_delimiter = ',')]
    ratio: Option<Vec<f64>>,
}

#[derive(Parser)]
struct SweepArgs {
    /// Override the configured grid step.
    #[arg(long)]
    step: Option<f64>,
}

#[derive(Parser)]
struct WalkArgs {
    /// Distribution to walk (defaults to the blend's first leg).
    #[arg(long)]
    distribution: Option<String>,

    #[arg(long)]
    walks: Option<usize>,

    #[arg(long)]
    rolls: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser)]
struct WagerArgs {
    /// Override the configured bet size.
    #[arg(long)]
    bet_size: Option<u64>,
}

#[derive(Parser)]
struct RecoveryArgs {
    /// Loss in percent, e.g. -50. Prints the whole curve when omitted.
    #[arg(long, allow_hyphen_values = true)]
    loss: Option<f64>,
}

#[derive(Parser)]
struct ReturnsArgs {
    /// JSON array of `{ "date", "price_return", "dividend_yield" }` records.
    #[arg(long)]
    input: PathBuf,

    /// Title of a configured safe haven to blend with the index.
    #[arg(long)]
    haven: Option<String>,

    /// Shares of index and haven, e.g. "0.9,0.1".
    #[arg(long, value_delimiter = ',', default_values_t = [0.9, 0.1])]
    ratio: Vec<f64>,

    /// Write the blended years to this CSV file.
    #[arg(long, requires = "haven")]
    csv: Option<PathBuf>,
}

// ==============================================================================
// Setup
// ==============================================================================

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let guard = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Some(guard)
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            None
        }
    };

    Ok(guard)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Blend(args) => handle_blend(&load_settings(&cli.config)?, args, json),
        Commands::Sweep(args) => handle_sweep(&load_settings(&cli.config)?, args, json),
        Commands::Walk(args) => handle_walk(&load_settings(&cli.config)?, args, json),
        Commands::Wager(args) => handle_wager(&load_settings(&cli.config)?, args, json),
        // Pure arithmetic, no configuration file needed.
        Commands::Recovery(args) => handle_recovery(args, json),
        Commands::Returns(args) => handle_returns(&load_settings(&cli.config)?, args, json),
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Config> {
    let config =
        load_config(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_distribution(settings: &DistributionSettings) -> anyhow::Result<OutcomeDistribution> {
    OutcomeDistribution::from_raw_weights(&settings.name, &settings.results, &settings.weights)
        .with_context(|| format!("invalid distribution '{}'", settings.name))
}

fn named_distribution(config: &Config, name: &str) -> anyhow::Result<OutcomeDistribution> {
    let settings = config
        .find_distribution(name)
        .ok_or_else(|| anyhow!("unknown distribution '{}'", name))?;
    build_distribution(settings)
}

/// The two blend legs, with the second repeated to line up with the first.
fn blend_legs(config: &Config) -> anyhow::Result<(OutcomeDistribution, OutcomeDistribution)> {
    let first = named_distribution(config, &config.blend.first)?;
    let mut second = named_distribution(config, &config.blend.second)?;
    if let Some(factor) = config.blend.repeat_second {
        second = second.repeat_each(factor)?;
    }
    Ok((first, second))
}

/// The ratio given on the command line, or the configured one.
fn blend_ratio(config: &Config, shares: Option<&[f64]>) -> anyhow::Result<Ratio> {
    let shares = shares.unwrap_or(config.blend.ratio.as_slice());
    Ok(Ratio::from_slice(shares)?)
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_blend(config: &Config, args: BlendArgs, json: bool) -> anyhow::Result<()> {
    let (first, second) = blend_legs(config)?;
    let ratio = blend_ratio(config, args.ratio.as_deref())?;

    let blend = analytics::combine(&first, &second, ratio)?;
    let report = KellyReport::with_basis(&blend, config.blend.cost_basis);
    info!(
        first = first.name(),
        second = second.name(),
        geom_mean = blend.geom_mean(),
        "Blend computed"
    );

    if json {
        return print_json(&report);
    }
    println!("{}", output::distribution_table(&first));
    println!("{}", output::distribution_table(&second));
    println!(
        "Ratio {} / {} ({:?} cost basis)",
        ratio.first(),
        ratio.second(),
        report.cost_basis
    );
    println!("{}", output::report_table(&report));
    Ok(())
}

fn handle_sweep(config: &Config, args: SweepArgs, json: bool) -> anyhow::Result<()> {
    let (first, second) = blend_legs(config)?;
    let step = args.step.unwrap_or(config.sweep.step);

    let optimal = find_optimal_ratio(first.outcomes(), second.outcomes(), step)?;
    info!(
        step,
        points = optimal.curve.len(),
        ratio = optimal.ratio,
        "Sweep finished"
    );

    if json {
        return print_json(&optimal);
    }
    println!("{}", output::curve_table(&optimal));
    println!(
        "Optimal: {} in {}, {} in {} -> geometric average {}",
        output::pct(optimal.ratio * 100.0),
        first.name(),
        output::pct((1.0 - optimal.ratio) * 100.0),
        second.name(),
        output::pct(optimal.geom_mean),
    );
    Ok(())
}

#[derive(Serialize)]
struct WalkSummary<'a> {
    distribution: &'a str,
    settings: WalkSettings,
    median_return: f64,
    final_p5: f64,
    final_median: f64,
    final_p95: f64,
    interval_90: (f64, f64),
    histogram: Histogram,
}

fn handle_walk(config: &Config, args: WalkArgs, json: bool) -> anyhow::Result<()> {
    let walk_config = &config.random_walk;
    let name = args
        .distribution
        .or_else(|| walk_config.distribution.clone())
        .unwrap_or_else(|| config.blend.first.clone());
    let dist = named_distribution(config, &name)?;

    let settings = WalkSettings {
        num_walks: args.walks.unwrap_or(walk_config.num_walks),
        num_rolls: args.rolls.unwrap_or(walk_config.num_rolls),
        seed: args.seed.unwrap_or(walk_config.seed),
    };
    let result = RandomWalk::new(dist.outcomes(), settings)?.run()?;
    let last = |path: &[f64]| path.last().copied().unwrap_or(1.0);

    let summary = WalkSummary {
        distribution: dist.name(),
        settings,
        median_return: result.median_return,
        final_p5: last(result.p5.as_slice()),
        final_median: last(result.median_walk()),
        final_p95: last(result.p95.as_slice()),
        interval_90: interval(&result.geom_returns, 5.0, 95.0)?,
        histogram: histogram(&result.geom_returns, walk_config.histogram_bins)?,
    };
    info!(
        distribution = summary.distribution,
        walks = settings.num_walks,
        rolls = settings.num_rolls,
        "Random walk finished"
    );

    if json {
        return print_json(&summary);
    }
    println!(
        "{} walks of {} rolls on '{}' (seed {})",
        settings.num_walks, settings.num_rolls, summary.distribution, settings.seed
    );
    println!("Median return per roll: {}", output::pct(summary.median_return));
    println!(
        "Final wealth: 5th pct {:.4}, median {:.4}, 95th pct {:.4}",
        summary.final_p5, summary.final_median, summary.final_p95
    );
    println!(
        "90% of walks averaged between {} and {} per roll",
        output::pct(summary.interval_90.0),
        output::pct(summary.interval_90.1)
    );
    println!("{}", output::histogram_table(&summary.histogram));
    Ok(())
}

fn handle_wager(config: &Config, args: WagerArgs, json: bool) -> anyhow::Result<()> {
    let wager = &config.wager;
    let payoffs = match &wager.payoffs {
        Some(payoffs) => payoffs.clone(),
        None => petersburg_payoffs(wager.rounds)?,
    };
    let bet_size = args.bet_size.unwrap_or(wager.bet_size);

    let curve = wager_curve(&payoffs, wager.wealth)?;
    let chosen = curve
        .point_at(bet_size)
        .ok_or_else(|| anyhow!("bet size {} exceeds wealth {}", bet_size, wager.wealth))?;
    info!(
        payoffs = payoffs.len(),
        wealth = wager.wealth,
        best_bet = curve.best.bet_size,
        "Wager curve computed"
    );

    if json {
        return print_json(&curve);
    }
    println!("{}", output::wager_table(&curve, chosen));
    Ok(())
}

fn handle_recovery(args: RecoveryArgs, json: bool) -> anyhow::Result<()> {
    match args.loss {
        Some(loss) => {
            let gain = recovery_percent(loss)?;
            if json {
                return print_json(&serde_json::json!({ "loss_pct": loss, "recovery_pct": gain }));
            }
            println!(
                "A loss of {} needs a gain of {} to recover",
                output::pct(loss),
                output::pct(gain)
            );
        }
        None => {
            let curve = recovery_curve();
            if json {
                return print_json(&curve);
            }
            for (loss, gain) in curve {
                println!("{:>5}% -> {}", loss, output::pct(gain));
            }
        }
    }
    Ok(())
}

fn handle_returns(config: &Config, args: ReturnsArgs, json: bool) -> anyhow::Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let returns: Vec<YearlyReturn> = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("cannot parse {}", args.input.display()))?;
    info!(years = returns.len(), "Yearly returns loaded");

    let counts = frequency_table(&returns);
    let summaries = range_summaries(&returns)?;

    let blend = match &args.haven {
        Some(title) => {
            let settings = config
                .find_safe_haven(title)
                .ok_or_else(|| anyhow!("unknown safe haven '{}'", title))?;
            let haven = SafeHaven::new(&settings.title, &settings.payoffs)?;
            Some(blend_with_haven(&returns, &haven, Ratio::from_slice(&args.ratio)?)?)
        }
        None => None,
    };

    if let (Some(path), Some(blend)) = (&args.csv, &blend) {
        let file = File::create(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        output::write_haven_csv(file, blend)?;
        info!(path = %path.display(), rows = blend.years.len(), "CSV written");
    }

    if json {
        return print_json(&serde_json::json!({
            "frequency": counts,
            "summaries": summaries,
            "blend": blend,
        }));
    }
    println!("{}", output::frequency_table(&counts));
    println!("{}", output::summaries_table(&summaries));
    if let Some(blend) = &blend {
        println!("{}", output::haven_table(blend, config.blend.cost_basis));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsError;
    use configuration::parse_config;

    const DICE_AND_CASH: &str = r#"
        [[distributions]]
        name = "dice_roll"
        results = [0.5, 1.05, 1.5]
        weights = [1, 4, 1]

        [[distributions]]
        name = "cash"
        results = [1.0]
        weights = [1]

        [blend]
        first = "dice_roll"
        second = "cash"
        ratio = [0.4, 0.6]
        repeat_second = 6
    "#;

    #[test]
    fn test_blend_legs_repeat_second_to_pair_with_first() {
        let config = parse_config(DICE_AND_CASH).unwrap();
        let (first, second) = blend_legs(&config).unwrap();

        assert_eq!(first.name(), "dice_roll");
        assert_eq!(second.name(), "cash");
        assert_eq!(first.outcomes().len(), 6);
        assert_eq!(second.outcomes(), &[1.0; 6]);
        assert!(analytics::combine(&first, &second, blend_ratio(&config, None).unwrap()).is_ok());
    }

    #[test]
    fn test_blend_legs_without_repeat_do_not_pair() {
        let config = parse_config(&DICE_AND_CASH.replace("repeat_second = 6", "")).unwrap();
        let (first, second) = blend_legs(&config).unwrap();

        assert_eq!(second.outcomes().len(), 1);
        let ratio = blend_ratio(&config, None).unwrap();
        assert!(matches!(
            analytics::combine(&first, &second, ratio),
            Err(AnalyticsError::LengthMismatch { left: 6, right: 1 })
        ));
    }

    #[test]
    fn test_command_line_ratio_overrides_config() {
        let config = parse_config(DICE_AND_CASH).unwrap();

        let configured = blend_ratio(&config, None).unwrap();
        assert_eq!((configured.first(), configured.second()), (0.4, 0.6));

        let overridden = blend_ratio(&config, Some(&[0.25, 0.75][..])).unwrap();
        assert_eq!((overridden.first(), overridden.second()), (0.25, 0.75));

        assert!(blend_ratio(&config, Some(&[0.6, 0.5][..])).is_err());
        assert!(blend_ratio(&config, Some(&[1.0][..])).is_err());
    }

    #[test]
    fn test_cli_parses_ratio_list() {
        let cli = Cli::try_parse_from(["haven", "--json", "blend", "--ratio", "0.3,0.7"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Blend(args) => assert_eq!(args.ratio, Some(vec![0.3, 0.7])),
            _ => panic!("expected the blend command"),
        }
    }
}
