use std::fs;
use std::path::PathBuf;

use matchday_terminal::LevelScale;
use matchday_terminal::roster::SkillLevel;
use matchday_terminal::roster_source::{JsonRosterFile, RosterProvider, parse_roster_json};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn parses_roster_fixture() {
    let roster = parse_roster_json(&read_fixture("roster_basic.json")).expect("fixture should parse");
    assert_eq!(roster.first.name, "Blue");
    assert_eq!(roster.second.name, "Red");
    assert_eq!(roster.player_count(), 6);
    assert_eq!(roster.first.players[0].level, SkillLevel::SemiPro1);
    // Identifier spelling is accepted too.
    assert_eq!(roster.first.players[2].level, SkillLevel::Amateur5);
}

#[test]
fn fixture_roster_rebalances_to_smaller_gap() {
    let scale = LevelScale::semi_pro();
    let mut provider = JsonRosterFile::new(fixture_path("roster_basic.json"));
    let roster = provider.fetch_roster().expect("fixture should load");

    assert_eq!(roster.strengths(scale), Ok((11, 18)));
    let balanced = roster.rebalanced(scale).expect("all levels are on the scale");
    let first: Vec<&str> = balanced.first.players.iter().map(|p| p.name.as_str()).collect();
    let second: Vec<&str> = balanced.second.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(first, ["M. Choi", "M. Lee", "Y. Lee"]);
    assert_eq!(second, ["F. Park", "G. Kim", "R. Heo"]);
    assert_eq!(balanced.strength_gap(scale), Ok(3));
}

#[test]
fn unknown_level_in_file_is_reported() {
    let mut provider = JsonRosterFile::new(fixture_path("roster_unknown_level.json"));
    let err = provider.fetch_roster().expect_err("unknown level should fail");
    let message = format!("{err:#}");
    assert!(message.contains("roster_unknown_level.json"), "{message}");
    assert!(message.contains("unknown skill level `Pro 1`"), "{message}");
}

#[test]
fn fixture_levels_fall_outside_amateur_scale() {
    let roster = parse_roster_json(&read_fixture("roster_basic.json")).unwrap();
    assert!(roster.rebalanced(LevelScale::amateur()).is_err());
}
