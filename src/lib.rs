pub mod balance;
pub mod demo_feed;
pub mod kickoff;
pub mod roster;
pub mod roster_source;
pub mod state;

pub use balance::{rebalance, team_strength};
pub use roster::{LevelScale, Player, Roster, RosterError, SkillLevel, Team};
