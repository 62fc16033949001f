mod console;

use clap::Parser;
use console::{Console, ReturnCode};
use pandemic_core::config::GameConfig;
use pandemic_core::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pandemic")]
#[command(about = "Pandemic deck tracker and epidemic forecaster", long_about = None)]
struct Cli {
    /// Read commands from this file instead of standard input
    script: Option<PathBuf>,

    /// Cities file (`name category` pairs)
    #[arg(long)]
    cities: Option<PathBuf>,

    /// Funded event card (repeatable)
    #[arg(long = "event")]
    events: Vec<String>,

    /// Player cards dealt before play starts
    #[arg(long)]
    initial_draws: Option<u32>,

    /// Epidemic cards in the player deck
    #[arg(long)]
    epidemics: Option<u32>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ask for each setting before the game starts
    #[arg(long)]
    prompt: bool,

    /// Write the chosen settings back to the config file
    #[arg(long)]
    save_config: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    pandemic_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_config_path);
    let mut config = Config::load_or_default(&config_path)?;
    apply_overrides(&cli, &mut config.game);

    // Prompts and commands share one input stream
    let mut input: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    if cli.prompt {
        prompt_settings(&mut input, &mut config.game)?;
    }
    config.game.validate()?;

    if cli.save_config {
        config.save_to(&config_path)?;
        println!("Settings saved to {}", config_path.display());
    }

    let registry =
        Registry::load(&config.game.cities_file)?.with_events(config.game.events.iter().cloned());
    println!("{} cities loaded", registry.cities().len());

    let mut tracker = Tracker::new(
        registry,
        config.game.initial_draws,
        config.game.epidemics,
    )?;

    let console = build_console(tracker.registry());
    println!("(pandemic - don't forget to record initial draws and infects)");
    if cli.script.is_none() && io::stdin().is_terminal() {
        console
            .run_interactive(&mut tracker)
            .map_err(|e| Error::Other(format!("Line editor failed: {}", e)))?;
    } else {
        console.run(&mut tracker, &mut input)?;
    }

    Ok(())
}

fn apply_overrides(cli: &Cli, game: &mut GameConfig) {
    if let Some(ref cities) = cli.cities {
        game.cities_file = cities.clone();
    }
    if !cli.events.is_empty() {
        game.events = cli.events.clone();
    }
    if let Some(initial_draws) = cli.initial_draws {
        game.initial_draws = initial_draws;
    }
    if let Some(epidemics) = cli.epidemics {
        game.epidemics = epidemics;
    }
}

fn build_console(registry: &Registry) -> Console<Tracker> {
    let mut console = Console::new("(pandemic) ");
    console.register_command("draw", cmd_draw);
    console.register_command("undraw", cmd_undraw);
    console.register_command("infect", cmd_infect);
    console.register_command("uninfect", cmd_uninfect);
    console.register_command("epidemic", cmd_epidemic);
    console.register_command("unepidemic", cmd_unepidemic);
    console.register_command("epidemic_stats", cmd_epidemic_stats);
    console.register_command("infect_stats", cmd_infect_stats);
    console.register_command("card_stats", cmd_card_stats);
    console.register_command("turns", cmd_turns);
    let registry = registry.clone();
    console.register_completion(move |text: &str| registry.complete(text));
    console
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_draw(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.draw(&args[1..]);
    print_draws(tracker, steps, "Drew", false);
    ReturnCode::Ok
}

fn cmd_undraw(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.undraw(&args[1..]);
    print_draws(tracker, steps, "Put back", true);
    ReturnCode::Ok
}

fn cmd_infect(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.infect(&args[1..]);
    print_steps(&steps, "Infecting:", false);
    ReturnCode::Ok
}

fn cmd_uninfect(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.uninfect(&args[1..]);
    print_steps(&steps, "Uninfecting:", true);
    ReturnCode::Ok
}

fn cmd_epidemic(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.epidemic(&args[1..]);
    print_steps(&steps, "", false);
    print_report(tracker);
    ReturnCode::Ok
}

fn cmd_unepidemic(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    let steps = tracker.unepidemic(&args[1..]);
    print_steps(&steps, "", true);
    print_report(tracker);
    ReturnCode::Ok
}

fn cmd_epidemic_stats(tracker: &mut Tracker, _args: &[String]) -> ReturnCode {
    let stats = tracker.stats();
    println!(
        "{} epidemics so far, {} draws left ({} turns)",
        stats.epidemics, stats.draws_left, stats.turns_left
    );
    if let Some(report) = stats.report {
        println!("{}", report);
    }
    ReturnCode::Ok
}

fn cmd_turns(tracker: &mut Tracker, _args: &[String]) -> ReturnCode {
    println!("{} turns left", tracker.stats().turns_left);
    ReturnCode::Ok
}

fn cmd_infect_stats(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    if args.len() > 1 {
        for token in &args[1..] {
            match tracker.lookup(token) {
                Ok(info) => match info.infection {
                    Some(location) => println!("{} is in {}", info.card, location),
                    None => println!("{} is not an infection card", info.card),
                },
                Err(e) => println!("{}", e),
            }
        }
        return ReturnCode::Ok;
    }

    let infection = tracker.infection();
    for (depth, pile) in infection.piles().enumerate() {
        println!(
            "Pile {} ({} cards): {}",
            depth + 1,
            pile.len(),
            pile.names().collect::<Vec<_>>().join(", ")
        );
        if depth == 0 {
            println!(
                "  each has a {:.1}% chance to be the next infection",
                100.0 / pile.len() as f64
            );
        }
    }
    let discard = infection.discard();
    println!(
        "Discard ({} cards): {}",
        discard.len(),
        discard.names().collect::<Vec<_>>().join(", ")
    );
    ReturnCode::Ok
}

fn cmd_card_stats(tracker: &mut Tracker, args: &[String]) -> ReturnCode {
    if args.len() > 1 {
        for token in &args[1..] {
            match tracker.lookup(token) {
                Ok(info) => match info.player {
                    Some(location) => println!("{} is in {}", info.card, location),
                    None => println!("{} is not a player card", info.card),
                },
                Err(e) => println!("{}", e),
            }
        }
        return ReturnCode::Ok;
    }

    let deck = tracker.player_deck();
    println!("Player deck: {} cards left", deck.len());
    for (category, count) in deck.count_by_category() {
        println!("  {}: {}", category, count);
    }
    let drawn = tracker.player_drawn();
    println!(
        "Drawn ({} cards): {}",
        drawn.len(),
        drawn.names().collect::<Vec<_>>().join(", ")
    );
    ReturnCode::Ok
}

// ============================================================================
// Output helpers
// ============================================================================

/// Card moves, then the draw count, then any epidemic markers and the report
fn print_draws(tracker: &Tracker, steps: Vec<Step>, moved: &str, undo: bool) {
    let (epidemics, moves): (Vec<Step>, Vec<Step>) = steps
        .into_iter()
        .partition(|step| matches!(step, Step::Epidemic { .. }));
    print_steps(&moves, moved, undo);
    println!("{} draws so far.", tracker.n_draws());
    print_steps(&epidemics, moved, undo);
    print_report(tracker);
}

fn print_steps(steps: &[Step], moved: &str, undo: bool) {
    for step in steps {
        match step {
            Step::Moved(card) => println!("{} {}", moved, card),
            Step::Epidemic { count, card: None } if undo => {
                println!("Epidemic undone ({} so far)", count)
            }
            Step::Epidemic {
                count,
                card: Some(card),
            } if undo => println!(
                "Epidemic undone, {} back to the bottom ({} so far)",
                card, count
            ),
            Step::Epidemic { count, card: None } => println!("Epidemic {}", count),
            Step::Epidemic {
                count,
                card: Some(card),
            } => println!("Epidemic {}: {} from the bottom of the infection deck", count, card),
            Step::Failed(e) => println!("{}", e),
        }
    }
}

fn print_report(tracker: &Tracker) {
    if let Some(report) = tracker.report() {
        println!("{}", report);
    }
}

/// Ask for each game setting, keeping the current value on an empty answer
fn prompt_settings<R: BufRead>(input: &mut R, game: &mut GameConfig) -> Result<()> {
    let cities = input_with_default(input, "Input cities file", &game.cities_file.display())?;
    if let Some(cities) = cities {
        game.cities_file = PathBuf::from(cities);
    }

    let events = input_with_default(input, "Select funded events", &game.events.join(" "))?;
    if let Some(events) = events {
        game.events = events.split_whitespace().map(str::to_string).collect();
    }

    let initial_draws = input_with_default(
        input,
        "Select number of initial draws",
        &game.initial_draws,
    )?;
    if let Some(answer) = initial_draws {
        game.initial_draws = parse_number(&answer, game.initial_draws);
    }

    let epidemics = input_with_default(input, "Select number of epidemics", &game.epidemics)?;
    if let Some(answer) = epidemics {
        game.epidemics = parse_number(&answer, game.epidemics);
    }

    Ok(())
}

/// Print a prompt with its default and read one answer; `None` keeps the default
fn input_with_default<R: BufRead>(
    input: &mut R,
    message: &str,
    default: &dyn std::fmt::Display,
) -> Result<Option<String>> {
    print!("{} [{}]: ", message, default);
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();

    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

fn parse_number(answer: &str, default: u32) -> u32 {
    answer.parse().unwrap_or_else(|_| {
        eprintln!("'{}' is not a number. Using {}.", answer, default);
        default
    })
}
