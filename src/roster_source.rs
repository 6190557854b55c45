use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::roster::{
    DEFAULT_FIRST_TEAM, DEFAULT_SECOND_TEAM, LevelScale, Player, Roster, SkillLevel, Team,
};

const FIRST_NAMES: [&str; 6] = ["M. Choi", "Y. Lee", "R. Heo", "H. Seo", "P. Cha", "J. Ban"];
const SECOND_NAMES: [&str; 6] = ["M. Lee", "F. Park", "G. Kim", "E. Do", "J. Myu", "C. Lim"];

/// Source of the two teams shown on the lead progress screen.
pub trait RosterProvider: Send {
    fn fetch_roster(&mut self) -> Result<Roster>;

    fn describe(&self) -> String;
}

/// Sample roster with levels drawn uniformly from a scale.
pub struct DemoRoster {
    scale: &'static LevelScale,
    rng: StdRng,
}

impl DemoRoster {
    pub fn new(scale: &'static LevelScale) -> Self {
        Self {
            scale,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(scale: &'static LevelScale, seed: u64) -> Self {
        Self {
            scale,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample_team(&mut self, name: &str, player_names: &[&str]) -> Team {
        let levels = self.scale.levels();
        let players = player_names
            .iter()
            .map(|player| {
                // Empty scales fall back to the weakest tier overall.
                let level = levels
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(SkillLevel::Amateur5);
                Player::new(*player, level)
            })
            .collect();
        Team::new(name, players)
    }
}

impl RosterProvider for DemoRoster {
    fn fetch_roster(&mut self) -> Result<Roster> {
        let first = self.sample_team(DEFAULT_FIRST_TEAM, &FIRST_NAMES);
        let second = self.sample_team(DEFAULT_SECOND_TEAM, &SECOND_NAMES);
        Ok(Roster::new(first, second))
    }

    fn describe(&self) -> String {
        format!("demo ({} scale)", self.scale.name())
    }
}

/// Roster read from a JSON document on disk.
pub struct JsonRosterFile {
    path: PathBuf,
}

impl JsonRosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RosterProvider for JsonRosterFile {
    fn fetch_roster(&mut self) -> Result<Roster> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read roster file {}", self.path.display()))?;
        parse_roster_json(&raw).with_context(|| format!("parse roster file {}", self.path.display()))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

pub fn parse_roster_json(raw: &str) -> Result<Roster> {
    let roster: Roster = serde_json::from_str(raw).context("invalid roster json")?;
    Ok(roster)
}

/// `ROSTER_SOURCE=file` reads `ROSTER_FILE`; anything else is the demo roster.
pub fn provider_from_env(scale: &'static LevelScale) -> Box<dyn RosterProvider> {
    let source = env::var("ROSTER_SOURCE")
        .unwrap_or_else(|_| "demo".to_string())
        .to_lowercase();
    if source == "file" {
        let path = env::var("ROSTER_FILE").unwrap_or_else(|_| "roster.json".to_string());
        return Box::new(JsonRosterFile::new(path));
    }
    match env::var("ROSTER_SEED")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
    {
        Some(seed) => Box::new(DemoRoster::with_seed(scale, seed)),
        None => Box::new(DemoRoster::new(scale)),
    }
}
