use std::time::Duration;

use anyhow::{Context, bail};
use hashviz::{
    Scheduler, SearchMode, TABLE_SIZE, Visualizer, VisualizerConfig, VisualizerSnapshot,
    parse_value, run_blocking,
};
use tracing_subscriber::EnvFilter;

mod tui;

/// Print a usage message
fn print_usage() {
    println!("hashviz - Hash table search visualizer");
    println!("Usage:");
    println!("  hashviz [OPTIONS] [COMMAND] [ARGS]");
    println!();
    println!("Options:");
    println!("  --delay-ms N      Pause between search steps in ms (default: 600, trace: 0)");
    println!("  --fill-count N    Values inserted by a random fill (default: 10)");
    println!("  --seed N          Seed for random fill (default: random)");
    println!("  --help            Show this help message");
    println!();
    println!("Commands:");
    println!("  tui                             Interactive visualizer (default)");
    println!("  trace MODE TARGET [VALUES...]   Print every step of a search over VALUES");
    println!("                                  (MODE is linear or binary; VALUE may be 'random')");
    println!("  version                         Show version information");
}

/// Options collected from the command line
struct Options {
    config: VisualizerConfig,
    /// Set when --delay-ms was given explicitly
    delay_override: Option<Duration>,
}

/// Parse command line arguments
fn parse_args(mut args: Vec<String>) -> Result<(Options, String, Vec<String>), String> {
    let mut options = Options {
        config: VisualizerConfig::default(),
        delay_override: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--delay-ms" => {
                let value = option_value(&mut args, i, "--delay-ms")?;
                let ms = value.parse::<u64>().map_err(|_| "Invalid step delay".to_string())?;
                options.delay_override = Some(Duration::from_millis(ms));
            }
            "--fill-count" => {
                let value = option_value(&mut args, i, "--fill-count")?;
                options.config.random_fill_count =
                    value.parse::<usize>().map_err(|_| "Invalid fill count".to_string())?;
            }
            "--seed" => {
                let value = option_value(&mut args, i, "--seed")?;
                options.config.seed =
                    Some(value.parse::<u64>().map_err(|_| "Invalid seed".to_string())?);
            }
            _ => {
                i += 1;
            }
        }
    }

    let mut args = args.into_iter();
    let command = args.next().unwrap_or_else(|| "tui".to_string());
    Ok((options, command, args.collect()))
}

/// Remove `args[i]` and its value, returning the value
fn option_value(args: &mut Vec<String>, i: usize, name: &str) -> Result<String, String> {
    if i + 1 < args.len() {
        args.remove(i);
        Ok(args.remove(i))
    } else {
        Err(format!("Missing value for {}", name))
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle tui command
fn handle_tui(options: Options) -> anyhow::Result<()> {
    let mut config = options.config;
    if let Some(delay) = options.delay_override {
        config.step_delay = delay;
    }

    let scheduler = Scheduler::new(Visualizer::new(config)?);
    let mut app = tui::App::default();
    tui::run_app(&mut app, &scheduler)
}

fn print_step(snapshot: &VisualizerSnapshot) {
    let slot_text = |index: usize| match snapshot.slots[index] {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    };

    match (snapshot.highlight.sorted_index, snapshot.highlight.table_index) {
        (Some(mid), table_index) => {
            let location = table_index.map_or_else(String::new, |i| format!(" (table[{}])", i));
            println!("  step {:>2}: sorted[{}] = {}{}", snapshot.steps, mid, snapshot.sorted[mid], location);
        }
        (None, Some(index)) => {
            println!("  step {:>2}: table[{}] = {}", snapshot.steps, index, slot_text(index));
        }
        (None, None) => {}
    }
}

/// Handle trace command
fn handle_trace(options: Options, args: &[String]) -> anyhow::Result<()> {
    if args.len() < 2 {
        bail!("Missing MODE or TARGET argument");
    }

    let mode: SearchMode = args[0].parse()?;
    let target = parse_value(&args[1])?;

    let mut config = options.config;
    config.step_delay = options.delay_override.unwrap_or(Duration::ZERO);
    let delay = config.step_delay;
    let mut visualizer = Visualizer::new(config)?;

    for raw in &args[2..] {
        if raw == "random" {
            let values = visualizer.random_fill();
            println!("Random fill: {:?}", values);
        } else {
            let value = parse_value(raw).with_context(|| format!("value {:?}", raw))?;
            let index = visualizer.insert(value);
            println!("Insert {} -> slot {}", value, index);
        }
    }

    println!("Table:  {}", visualizer.table());
    if mode == SearchMode::Binary {
        println!("Sorted: {:?}", visualizer.table().sorted_view());
    }
    println!("Searching for {} ({} search)", target, mode);

    let generation = visualizer.search(target, mode);
    let mut last_step = 0;
    let result = run_blocking(&mut visualizer, generation, delay, |snapshot| {
        if snapshot.steps != last_step {
            last_step = snapshot.steps;
            print_step(snapshot);
        }
    });

    let elapsed = visualizer
        .session()
        .map(|session| session.elapsed().num_milliseconds())
        .unwrap_or_default();
    match result {
        Some(result) => println!("{} after {} steps in {} ms", result, last_step, elapsed),
        None => println!("Search superseded"),
    }

    Ok(())
}

/// Handle version command
fn handle_version() {
    println!("hashviz v{}", env!("CARGO_PKG_VERSION"));
    println!("Linear and binary search over a {}-slot overwrite hash table", TABLE_SIZE);
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help") {
        print_usage();
        return Ok(());
    }

    let (options, command, args) = match parse_args(args) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(1);
        }
    };

    // Keep log lines from tearing the alternate screen
    init_logging(if command == "tui" { "warn" } else { "info" });

    match command.as_str() {
        "tui" => handle_tui(options),
        "trace" => handle_trace(options, &args),
        "version" => {
            handle_version();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}
