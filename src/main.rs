use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rollkeeper::{
    prelude::*,
    utils::{format_emoji, format_percent, render_table},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tabletop dice roller with roll history and statistics", long_about = None)]
struct Args {
    /// Directory holding the config, history and companion files
    #[arg(short, long, default_value = ".rollkeeper", value_name = "DIR")]
    data_dir: PathBuf,

    /// Random seed for reproducibility
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a die, e.g. `d20+3 [blessed]`
    Roll {
        notation: String,

        /// Flat bonus added on top of any bonus in the notation
        #[arg(short, long, allow_negative_numbers = true)]
        bonus: Option<i32>,

        /// Wait for the configured reveal delay before printing the result
        #[arg(long, default_value_t = false)]
        animate: bool,
    },
    /// Show recent rolls, newest first
    History {
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete the roll history
    Clear,
    /// Summarize the roll history
    Stats {
        #[arg(short, long, value_enum, default_value_t = TimePeriod::All)]
        period: TimePeriod,

        /// Only include rolls of this die, e.g. `d20`
        #[arg(long, value_parser = parse_die)]
        die: Option<DieSpec>,

        #[arg(long, default_value_t = false)]
        detailed: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the entries shared with companion surfaces
    Last,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("Starting with args: {:?}", args);

    let config = Config::load(&args.data_dir)?;
    let roller = match args.seed {
        Some(seed) => Roller::from_seed(seed),
        None => Roller::new(),
    };
    let mut session = RollSession::new(
        roller,
        JsonFileStore::open(args.data_dir.join(&config.history_file)),
        JsonFileStore::open(args.data_dir.join(&config.companion_file)),
        &config,
    );

    match args.command {
        Command::Roll {
            notation,
            bonus,
            animate,
        } => {
            let request = parse_roll(&notation)?.add_bonus(bonus.unwrap_or(config.default_bonus))?;
            let record = session.roll(request)?;
            if animate {
                std::thread::sleep(session.reveal_delay());
            }
            let mut line = format_emoji("🎲", 3);
            record.pretty_print(&mut line)?;
            println!("{line}");
        }
        Command::History { limit, json } => {
            let records = session.history();
            let records = &records[..limit.unwrap_or(records.len()).min(records.len())];
            if json {
                println!("{}", serde_json::to_string_pretty(records)?);
            } else if records.is_empty() {
                println!("No rolls yet.");
            } else {
                for record in records {
                    let mut line = record.timestamp().format("%Y-%m-%d %H:%M:%S  ").to_string();
                    record.pretty_print(&mut line)?;
                    println!("{line}");
                }
            }
        }
        Command::Clear => {
            session.clear_history()?;
            println!("Roll history cleared.");
        }
        Command::Stats {
            period,
            die,
            detailed,
            json,
        } => {
            let mut filter = RecordFilter::new().period(period);
            if let Some(die) = die {
                filter = filter.die(die);
            }
            let now = chrono::Local::now();
            if detailed {
                let stats = session.detailed_statistics(&filter, &now);
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    print_detailed(&stats)?;
                }
            } else {
                let stats = session.statistics(&filter, &now);
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                } else {
                    let mut out = String::new();
                    stats.pretty_print(&mut out)?;
                    print!("{out}");
                }
            }
        }
        Command::Last => {
            let snapshot = session.companion();
            println!("Last Result: {}", snapshot.last_result);
            println!("Last Die: {}", snapshot.last_die_label);
            match snapshot.last_roll_time {
                Some(time) => println!(
                    "Last Roll: {}",
                    time.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("Last Roll: never"),
            }
        }
    }

    Ok(())
}

fn print_detailed(stats: &DetailedStatistics) -> anyhow::Result<()> {
    let mut out = String::new();
    stats.pretty_print(&mut out)?;
    print!("{out}");

    if !stats.per_die.is_empty() {
        let rows: Vec<Vec<String>> = stats
            .per_die
            .iter()
            .map(|p| {
                vec![
                    p.die.name(),
                    p.performance.count.to_string(),
                    format!("{:.2}", p.performance.average_base_roll),
                    format_percent(p.performance.success_rate),
                ]
            })
            .collect();
        println!();
        println!("{}", render_table(&["Die", "Rolls", "Average", "Success"], &rows));
    }

    if !stats.per_mode.is_empty() {
        let rows: Vec<Vec<String>> = stats
            .per_mode
            .iter()
            .map(|p| {
                vec![
                    p.mode.label().to_string(),
                    p.performance.count.to_string(),
                    format!("{:.2}", p.performance.average_base_roll),
                    format_percent(p.performance.success_rate),
                ]
            })
            .collect();
        println!();
        println!("{}", render_table(&["Mode", "Rolls", "Average", "Success"], &rows));
    }

    if !stats.distribution.is_empty() {
        println!();
        println!("Distribution:");
        let peak = stats.distribution.values().copied().max().unwrap_or(1);
        for (value, count) in &stats.distribution {
            let bar = "#".repeat((count * 30).div_ceil(peak));
            println!("{value:>4} | {bar} {count}");
        }
    }

    Ok(())
}
