use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FIRST_TEAM: &str = "Blue";
pub const DEFAULT_SECOND_TEAM: &str = "Red";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error(
        "unknown skill level `{level}`{}",
        .player.as_ref().map(|p| format!(" (player {p})")).unwrap_or_default()
    )]
    UnknownSkillLevel {
        level: String,
        player: Option<String>,
    },

    #[error("skill level {0} appears twice in the scale")]
    DuplicateLevel(SkillLevel),

    #[error("skill levels {0} and {1} share score {2}")]
    TiedScore(SkillLevel, SkillLevel, u32),

    #[error("team strength exceeds {}", u32::MAX)]
    StrengthOverflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SkillLevel {
    SemiPro1,
    SemiPro2,
    Amateur1,
    Amateur2,
    Amateur3,
    Amateur4,
    Amateur5,
}

impl SkillLevel {
    pub const COUNT: usize = 7;

    pub const ALL: [SkillLevel; Self::COUNT] = [
        SkillLevel::SemiPro1,
        SkillLevel::SemiPro2,
        SkillLevel::Amateur1,
        SkillLevel::Amateur2,
        SkillLevel::Amateur3,
        SkillLevel::Amateur4,
        SkillLevel::Amateur5,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkillLevel::SemiPro1 => "Semi-pro 1",
            SkillLevel::SemiPro2 => "Semi-pro 2",
            SkillLevel::Amateur1 => "Amateur 1",
            SkillLevel::Amateur2 => "Amateur 2",
            SkillLevel::Amateur3 => "Amateur 3",
            SkillLevel::Amateur4 => "Amateur 4",
            SkillLevel::Amateur5 => "Amateur 5",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillLevel {
    type Err = RosterError;

    /// Accepts display labels ("Amateur 3") and identifiers ("amateur3",
    /// "semi_pro1"), ignoring case, spaces, dashes and underscores.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        SkillLevel::ALL
            .into_iter()
            .find(|level| {
                let candidate: String = level
                    .label()
                    .chars()
                    .filter(|c| !c.is_whitespace() && *c != '-')
                    .flat_map(char::to_lowercase)
                    .collect();
                candidate == key
            })
            .ok_or_else(|| RosterError::UnknownSkillLevel {
                level: raw.trim().to_string(),
                player: None,
            })
    }
}

impl TryFrom<String> for SkillLevel {
    type Error = RosterError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<SkillLevel> for String {
    fn from(level: SkillLevel) -> Self {
        level.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub level: SkillLevel,
}

impl Player {
    pub fn new(name: impl Into<String>, level: SkillLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: impl Into<String>, players: Vec<Player>) -> Self {
        Self {
            name: name.into(),
            players,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub first: Team,
    pub second: Team,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            first: Team::new(DEFAULT_FIRST_TEAM, Vec::new()),
            second: Team::new(DEFAULT_SECOND_TEAM, Vec::new()),
        }
    }
}

impl Roster {
    pub fn new(first: Team, second: Team) -> Self {
        Self { first, second }
    }

    pub fn player_count(&self) -> usize {
        self.first.len() + self.second.len()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.first.players.iter().chain(self.second.players.iter())
    }
}

/// Score table shared by everything that orders players by level.
///
/// Scores are strictly ordered: two distinct levels never share a score.
/// A scale may cover only part of [`SkillLevel`]; levels outside it have no
/// score and are rejected wherever a score is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelScale {
    name: String,
    scores: [Option<u32>; SkillLevel::COUNT],
}

static SEMI_PRO_SCALE: Lazy<LevelScale> = Lazy::new(|| {
    LevelScale::fixed(
        "semi-pro",
        &[
            (SkillLevel::SemiPro1, 7),
            (SkillLevel::SemiPro2, 6),
            (SkillLevel::Amateur1, 5),
            (SkillLevel::Amateur2, 4),
            (SkillLevel::Amateur3, 3),
            (SkillLevel::Amateur4, 2),
            (SkillLevel::Amateur5, 1),
        ],
    )
});

static AMATEUR_SCALE: Lazy<LevelScale> = Lazy::new(|| {
    LevelScale::fixed(
        "amateur",
        &[
            (SkillLevel::Amateur1, 1),
            (SkillLevel::Amateur2, 2),
            (SkillLevel::Amateur3, 3),
            (SkillLevel::Amateur4, 4),
            (SkillLevel::Amateur5, 5),
        ],
    )
});

impl LevelScale {
    pub fn new(name: impl Into<String>, entries: &[(SkillLevel, u32)]) -> Result<Self, RosterError> {
        let mut scores = [None; SkillLevel::COUNT];
        for &(level, score) in entries {
            if scores[level.index()].is_some() {
                return Err(RosterError::DuplicateLevel(level));
            }
            if let Some(other) = SkillLevel::ALL
                .into_iter()
                .find(|other| scores[other.index()] == Some(score))
            {
                return Err(RosterError::TiedScore(other, level, score));
            }
            scores[level.index()] = Some(score);
        }
        Ok(Self {
            name: name.into(),
            scores,
        })
    }

    // Built-in tables skip validation; `built_in_scales_are_strictly_ordered` covers them.
    fn fixed(name: &str, entries: &[(SkillLevel, u32)]) -> Self {
        let mut scores = [None; SkillLevel::COUNT];
        for &(level, score) in entries {
            scores[level.index()] = Some(score);
        }
        Self {
            name: name.to_string(),
            scores,
        }
    }

    /// Two semi-pro tiers above five amateur tiers; Amateur 1 is the top amateur tier.
    pub fn semi_pro() -> &'static LevelScale {
        &SEMI_PRO_SCALE
    }

    /// Five amateur tiers, Amateur 5 strongest.
    pub fn amateur() -> &'static LevelScale {
        &AMATEUR_SCALE
    }

    pub fn by_name(name: &str) -> Option<&'static LevelScale> {
        match name.trim().to_ascii_lowercase().as_str() {
            "semi-pro" | "semipro" | "semi_pro" => Some(Self::semi_pro()),
            "amateur" => Some(Self::amateur()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self, level: SkillLevel) -> Option<u32> {
        self.scores[level.index()]
    }

    pub fn try_score(&self, player: &Player) -> Result<u32, RosterError> {
        self.score(player.level)
            .ok_or_else(|| RosterError::UnknownSkillLevel {
                level: player.level.label().to_string(),
                player: Some(player.name.clone()),
            })
    }

    pub fn contains(&self, level: SkillLevel) -> bool {
        self.score(level).is_some()
    }

    /// Member levels, strongest first.
    pub fn levels(&self) -> Vec<SkillLevel> {
        let mut levels: Vec<SkillLevel> = SkillLevel::ALL
            .into_iter()
            .filter(|level| self.contains(*level))
            .collect();
        levels.sort_by_key(|level| std::cmp::Reverse(self.score(*level)));
        levels
    }
}
