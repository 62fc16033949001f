//! Integration tests for the pandemic binary.
//!
//! These tests drive whole sessions through stdin and verify:
//! - Startup configuration (flags, prompts, config file)
//! - Command transcripts for every deck operation
//! - Error reporting that leaves the session running

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CITIES: &str = "atlanta blue\nathens black\nmiami yellow\nlagos yellow\nparis blue\ntokyo red\n";

/// Helper to create a test directory holding a cities file
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("cities.txt"), CITIES).expect("Failed to write cities");
    temp_dir
}

fn cities_path(dir: &Path) -> PathBuf {
    dir.join("cities.txt")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::cargo_bin("pandemic").expect("Failed to find pandemic binary")
}

/// Six cities plus one event, two cards dealt
fn game_with_epidemics(dir: &Path, epidemics: &str) -> Command {
    let mut cmd = cli();
    cmd.arg("--cities")
        .arg(cities_path(dir))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(["--event", "airlift", "--initial-draws", "2"])
        .args(["--epidemics", epidemics]);
    cmd
}

/// A 7-card game: six cities, one event, two dealt, two epidemics
fn game(dir: &Path) -> Command {
    game_with_epidemics(dir, "2")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Pandemic deck tracker and epidemic forecaster",
        ));
}

#[test]
fn test_startup_reports_cities() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("6 cities loaded"))
        .stdout(predicate::str::contains("(pandemic) "));
}

#[test]
fn test_draw_and_forecast() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw atlanta paris\nepidemic_stats\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drew atlanta (blue)"))
        .stdout(predicate::str::contains("Drew paris (blue)"))
        .stdout(predicate::str::contains("0 draws so far."))
        .stdout(predicate::str::contains(
            "Epidemic is in the next 4 draws (50.0% chance to draw this turn)",
        ))
        .stdout(predicate::str::contains(
            "0 epidemics so far, 7 draws left (3 turns)",
        ));
}

#[test]
fn test_ambiguous_draw_lists_candidates() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw a\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "a was ambiguous. Could be: airlift, athens, atlanta.",
        ))
        .stdout(predicate::str::contains("-2 draws so far."));
}

#[test]
fn test_redraw_names_location() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw atlanta\ndraw atlanta\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "error: atlanta is not here, atlanta (blue) is in the drawn player cards.",
        ));
}

#[test]
fn test_invalid_card() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("infect gotham\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("gotham is an invalid card."));
}

#[test]
fn test_epidemic_reshuffles_infection_deck() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("infect tokyo\nepidemic miami\ninfect_stats\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Infecting: tokyo (red)"))
        .stdout(predicate::str::contains(
            "Epidemic 1: miami (yellow) from the bottom of the infection deck",
        ))
        .stdout(predicate::str::contains("No epidemics for 5 more draws. (2 turns)"))
        .stdout(predicate::str::contains("Pile 1 (2 cards): miami, tokyo"))
        .stdout(predicate::str::contains("each has a 50.0% chance"))
        .stdout(predicate::str::contains(
            "Pile 2 (4 cards): athens, atlanta, lagos, paris",
        ))
        .stdout(predicate::str::contains("Discard (0 cards)"));
}

#[test]
fn test_epidemic_marker_in_draw() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw atlanta paris lagos epidemic\nepidemic_stats\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Epidemic 1"))
        .stdout(predicate::str::contains("2 draws so far."))
        .stdout(predicate::str::contains("1 epidemics so far, 5 draws left (2 turns)"));
}

#[test]
fn test_draw_count_precedes_epidemic() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw atlanta epidemic\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Drew atlanta (blue)\n0 draws so far.\nEpidemic 1\n",
        ));
}

#[test]
fn test_undo_commands() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin(
            "draw atlanta\nundraw atlanta\ninfect paris\nuninfect paris\n\
             epidemic\nunepidemic\ncard_stats\n",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Put back atlanta (blue)"))
        .stdout(predicate::str::contains("Uninfecting: paris (blue)"))
        .stdout(predicate::str::contains("Epidemic undone (0 so far)"))
        .stdout(predicate::str::contains("Player deck: 7 cards left"))
        .stdout(predicate::str::contains("Drawn (0 cards)"));
}

#[test]
fn test_card_lookups() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("draw paris\ninfect paris\ncard_stats par\ninfect_stats par airlift\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "paris (blue) is in the drawn player cards",
        ))
        .stdout(predicate::str::contains(
            "paris (blue) is in the infection discard",
        ))
        .stdout(predicate::str::contains(
            "airlift (event) is not an infection card",
        ));
}

#[test]
fn test_unknown_command_keeps_session() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("dance\nturns\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command 'dance' not found."))
        .stdout(predicate::str::contains("3 turns left"));
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available commands are:"))
        .stdout(predicate::str::contains("\tepidemic_stats"))
        .stdout(predicate::str::contains("\tunepidemic"));
}

#[test]
fn test_completion_builtin() {
    let temp_dir = setup_test_dir();

    game(temp_dir.path())
        .write_stdin("complete l\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("common prefix: lagos"));
}

#[test]
fn test_script_argument() {
    let temp_dir = setup_test_dir();
    let script = temp_dir.path().join("game.txt");
    fs::write(&script, "draw airlift\nturns\n").unwrap();

    game(temp_dir.path())
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Drew airlift (event)"))
        .stdout(predicate::str::contains("3 turns left"));
}

#[test]
fn test_run_builtin_echoes_lines() {
    let temp_dir = setup_test_dir();
    let script = temp_dir.path().join("setup.txt");
    fs::write(&script, "# opening hands\ndraw atlanta athens\n").unwrap();

    game(temp_dir.path())
        .write_stdin(format!("run {}\n", script.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("[0] draw atlanta athens"))
        .stdout(predicate::str::contains("Drew athens (black)"));
}

#[test]
fn test_prompted_settings() {
    let temp_dir = setup_test_dir();
    let answers = format!(
        "{}\nairlift forecast\n2\n2\ndraw forecast\n",
        cities_path(temp_dir.path()).display()
    );

    cli()
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"))
        .arg("--prompt")
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Select funded events []"))
        .stdout(predicate::str::contains("Select number of initial draws [8]"))
        .stdout(predicate::str::contains("6 cities loaded"))
        .stdout(predicate::str::contains("Drew forecast (event)"));
}

#[test]
fn test_save_config() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");

    game_with_epidemics(temp_dir.path(), "3")
        .arg("--save-config")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved"));

    let saved = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(saved.contains("epidemics = 3"));

    // Saved settings apply on the next run
    cli()
        .arg("--config")
        .arg(&config_path)
        .write_stdin("epidemic_stats\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("8 draws left"));
}

#[test]
fn test_missing_cities_file_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--cities")
        .arg(temp_dir.path().join("missing.txt"))
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"))
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_zero_epidemics_fails() {
    let temp_dir = setup_test_dir();

    game_with_epidemics(temp_dir.path(), "0")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("epidemics must be at least 1"));
}
