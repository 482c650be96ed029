use std::path::PathBuf;

use cepheus::prelude::*;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed string for reproducible rolls
    #[arg(long, global = true, default_value = None)]
    seed: Option<String>,

    /// World cache file
    #[arg(long, global = true, default_value = "worlds.json", value_name = "FILE")]
    store: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a dice expression such as `3d6+2` or `4d6dl1`
    Roll {
        expression: String,

        /// Number of times to roll
        #[arg(short, long, default_value_t = 1)]
        times: usize,
    },
    /// Roll a digit-string expression such as `d66`
    Concat { expression: String },
    /// Split credits between crew members given as NAME=SHARES
    Loot {
        total: u64,

        #[arg(required = true, value_parser = parse_member)]
        members: Vec<(String, u32)>,

        /// Shares held back for the ship
        #[arg(long, default_value_t = 0)]
        ship_shares: u32,
    },
    /// Show the Imperial date after some time has passed
    Date {
        /// Starting date, DDD-YYYY
        #[arg(default_value = "001-1105")]
        start: ImperialDate,

        /// Days to advance
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        days: i64,

        /// Hours to advance
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        hours: i64,
    },
    /// Roll up a character's characteristics
    Character { name: String },
    /// List worlds cached in the store
    Worlds,
}

fn parse_member(s: &str) -> Result<(String, u32), String> {
    let (name, shares) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SHARES, got {:?}", s))?;
    let shares = shares
        .parse()
        .map_err(|e| format!("invalid share count in {:?}: {}", s, e))?;
    Ok((name.to_string(), shares))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("Starting with args: {:?}", args);

    let mut pool = match &args.seed {
        Some(seed) => Dicepool::new(seed),
        None => Dicepool::from_entropy(),
    };

    match args.command {
        Command::Roll { expression, times } => {
            let mut label = String::new();
            parse_sum(&expression)?.pretty_print(&mut label)?;
            for _ in 0..times {
                let roll = pool.evaluate(&expression)?;
                if args.json {
                    println!("{}", serde_json::to_string(&roll)?);
                } else {
                    let mut out = String::new();
                    roll.pretty_print(&mut out)?;
                    println!("{}: {}", label, out);
                }
            }
        }
        Command::Concat { expression } => {
            let roll = pool.evaluate_concat(&expression)?;
            if args.json {
                println!("{}", serde_json::to_string(&roll)?);
            } else {
                let mut label = String::new();
                parse_concat(&expression)?.pretty_print(&mut label)?;
                println!("{}: {}", label, roll.digits);
            }
        }
        Command::Loot {
            total,
            members,
            ship_shares,
        } => {
            let split = members
                .iter()
                .fold(LootSplit::new(total), |split, (name, shares)| {
                    split.member(name, *shares)
                })
                .ship_shares(ship_shares);
            let shares = split.split()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&shares)?);
            } else {
                let mut out = String::new();
                shares.pretty_print(&mut out)?;
                println!("{}", out);
            }
        }
        Command::Date { start, days, hours } => {
            let mut clock = ImperialClock::at(start);
            clock.advance(chrono::TimeDelta::days(days) + chrono::TimeDelta::hours(hours));
            println!("{}", clock);
        }
        Command::Character { name } => {
            let block = StatBlockBuilder::new(&name)
                .characteristics(Characteristics::roll(&mut pool)?)
                .build();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&block)?);
            } else {
                let mut out = String::new();
                block.pretty_print(&mut out)?;
                println!("{}", out);
            }
        }
        Command::Worlds => {
            log::info!("Loading world cache from {}", args.store.display());
            let store: JsonStore<World> = JsonStore::open(&args.store)?;
            for key in store.keys() {
                let world = store.read(key)?;
                println!("{:<28} {:<20} {}", key, world.name, world.uwp);
            }
        }
    }

    Ok(())
}
