use std::collections::{HashMap, HashSet, VecDeque};
use std::env;

use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime};

use crate::kickoff;
use crate::roster::{LevelScale, Roster, SkillLevel, Team};

pub const MAX_LEAD_ORGANIZERS: usize = 2;
pub const LEAD_MATCH_ID: &str = "3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    MatchList,
    MatchDetail { match_id: String },
    LeadProgress { match_id: String },
    MatchComplete { match_id: String },
}

impl Screen {
    pub fn match_id(&self) -> Option<&str> {
        match self {
            Screen::MatchList => None,
            Screen::MatchDetail { match_id }
            | Screen::LeadProgress { match_id }
            | Screen::MatchComplete { match_id } => Some(match_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadTab {
    Match,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Social,
    Tshirt,
    LeadOrganizer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub id: String,
    pub kind: MatchKind,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub joined: u32,
    pub capacity: u32,
    pub lead_assigned: bool,
}

impl MatchSummary {
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        kickoff::parse_kickoff(&self.date, &self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueInfo {
    pub equipment: String,
    pub lighting: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideEntry {
    pub title: &'static str,
    pub content: &'static str,
}

pub const EMERGENCY_GUIDE: [GuideEntry; 6] = [
    GuideEntry {
        title: "A player is running late",
        content: "Start on time with the players present and slot them in at the next rotation.",
    },
    GuideEntry {
        title: "A player did not show up",
        content: "Rebalance the teams with the players on site before kickoff.",
    },
    GuideEntry {
        title: "Venue problem (lights, equipment)",
        content: "Check the venue notes for the switch and locker locations, then contact the venue.",
    },
    GuideEntry {
        title: "Does the match go ahead in rain or snow?",
        content: "Matches run unless the venue closes the pitch.",
    },
    GuideEntry {
        title: "Someone got injured",
        content: "Stop play, check the player, and call emergency services if in doubt.",
    },
    GuideEntry {
        title: "A dispute broke out during the match",
        content: "Pause the match, separate the players, and note it in the match report.",
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub progress: String,
    pub issues: String,
    pub player_feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    Progress,
    Issues,
    PlayerFeedback,
}

impl ReportField {
    fn next(self) -> Self {
        match self {
            ReportField::Progress => ReportField::Issues,
            ReportField::Issues => ReportField::PlayerFeedback,
            ReportField::PlayerFeedback => ReportField::Progress,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub open: bool,
    pub field: ReportField,
    pub report: MatchReport,
}

impl ReportDraft {
    fn new() -> Self {
        Self {
            open: false,
            field: ReportField::Progress,
            report: MatchReport::default(),
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            ReportField::Progress => &mut self.report.progress,
            ReportField::Issues => &mut self.report.issues,
            ReportField::PlayerFeedback => &mut self.report.player_feedback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadOrganizer {
    pub name: String,
    pub level: SkillLevel,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetRoster(Roster),
    RosterError(String),
    LeadAssigned {
        match_id: String,
        organizer: LeadOrganizer,
    },
    ReportAccepted {
        match_id: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchRoster,
    SubmitReport {
        match_id: String,
        report: MatchReport,
    },
    ApplyLead {
        match_id: String,
        applicant: LeadOrganizer,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub selected: usize,
    pub matches: Vec<MatchSummary>,
    pub venue: VenueInfo,
    pub scale: &'static LevelScale,
    pub roster: Roster,
    /// Match the provider's roster belongs to.
    pub roster_match: String,
    pub roster_loading: bool,
    pub lead_tab: LeadTab,
    pub report: ReportDraft,
    pub lead_organizers: HashMap<String, Vec<LeadOrganizer>>,
    pub started: HashSet<String>,
    pub reveal_window: ChronoDuration,
    pub team_revealed: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let scale = env::var("LEVEL_SCALE")
            .ok()
            .and_then(|name| LevelScale::by_name(&name))
            .unwrap_or_else(LevelScale::semi_pro);
        let reveal_minutes = env_u64("TEAM_REVEAL_MINUTES", 5).clamp(1, 120);
        let mut state = Self::with_matches(scale, demo_matches(Local::now().date_naive()));
        state.reveal_window = ChronoDuration::minutes(reveal_minutes as i64);
        state
    }

    pub fn with_matches(scale: &'static LevelScale, matches: Vec<MatchSummary>) -> Self {
        Self {
            screen: Screen::MatchList,
            selected: 0,
            matches,
            venue: VenueInfo {
                equipment: "Vests and balls: locker right of the entrance".to_string(),
                lighting: "Light switch: wall left of the pitch gate".to_string(),
            },
            scale,
            roster: Roster::default(),
            roster_match: LEAD_MATCH_ID.to_string(),
            roster_loading: false,
            lead_tab: LeadTab::Match,
            report: ReportDraft::new(),
            lead_organizers: HashMap::new(),
            started: HashSet::new(),
            reveal_window: ChronoDuration::minutes(5),
            team_revealed: false,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn selected_match(&self) -> Option<&MatchSummary> {
        self.matches.get(self.selected)
    }

    /// Match shown by the current screen; the highlighted row on the list.
    pub fn current_match(&self) -> Option<&MatchSummary> {
        match self.screen.match_id() {
            Some(id) => self.matches.iter().find(|m| m.id == id),
            None => self.selected_match(),
        }
    }

    pub fn select_next(&mut self) {
        if self.matches.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % self.matches.len();
    }

    pub fn select_prev(&mut self) {
        if self.matches.is_empty() {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = self.matches.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn open_detail(&mut self) {
        if let Some(m) = self.selected_match() {
            self.screen = Screen::MatchDetail {
                match_id: m.id.clone(),
            };
        }
    }

    pub fn open_lead_progress(&mut self) {
        let Some(id) = self.current_match().map(|m| m.id.clone()) else {
            return;
        };
        self.lead_tab = LeadTab::Match;
        self.screen = Screen::LeadProgress { match_id: id };
    }

    pub fn open_complete(&mut self, now: NaiveDateTime) {
        let Some(id) = self.current_match().map(|m| m.id.clone()) else {
            return;
        };
        self.screen = Screen::MatchComplete { match_id: id };
        self.team_revealed = false;
        self.refresh_team_reveal(now);
    }

    pub fn back(&mut self) {
        self.screen = match &self.screen {
            Screen::MatchList | Screen::MatchDetail { .. } => Screen::MatchList,
            Screen::LeadProgress { match_id } | Screen::MatchComplete { match_id } => {
                Screen::MatchDetail {
                    match_id: match_id.clone(),
                }
            }
        };
    }

    pub fn toggle_lead_tab(&mut self) {
        self.lead_tab = match self.lead_tab {
            LeadTab::Match => LeadTab::Emergency,
            LeadTab::Emergency => LeadTab::Match,
        };
    }

    /// Replaces both teams with a balanced draft; on error the roster is kept.
    pub fn rebalance_roster(&mut self) {
        if self.roster.player_count() == 0 {
            self.push_log("[INFO] No players to reassign");
            return;
        }
        let before = self.roster.strength_gap(self.scale);
        match self.roster.rebalanced(self.scale) {
            Ok(roster) => {
                let after = roster.strength_gap(self.scale).unwrap_or_default();
                self.roster = roster;
                match before {
                    Ok(before) => {
                        self.push_log(format!("[INFO] Teams reassigned (gap {before} -> {after})"))
                    }
                    Err(_) => self.push_log(format!("[INFO] Teams reassigned (gap {after})")),
                }
            }
            Err(err) => self.push_log(format!("[WARN] Team reassignment failed: {err}")),
        }
    }

    pub fn team_strengths(&self) -> Option<(u32, u32)> {
        self.roster.strengths(self.scale).ok()
    }

    pub fn mark_started(&mut self) {
        let Some(m) = self.current_match() else {
            return;
        };
        let id = m.id.clone();
        let title = m.title.clone();
        if self.started.insert(id) {
            self.push_log(format!("[INFO] {title} started"));
        } else {
            self.push_log(format!("[INFO] {title} already running"));
        }
    }

    pub fn open_report(&mut self) {
        self.report.open = true;
        self.report.field = ReportField::Progress;
    }

    pub fn close_report(&mut self) {
        self.report.open = false;
    }

    pub fn cycle_report_field(&mut self) {
        self.report.field = self.report.field.next();
    }

    pub fn report_input(&mut self, ch: char) {
        self.report.field_mut().push(ch);
    }

    pub fn report_backspace(&mut self) {
        self.report.field_mut().pop();
    }

    /// Closes the modal and hands back the filled report, clearing the draft.
    pub fn take_report(&mut self) -> Option<MatchReport> {
        if !self.report.open {
            return None;
        }
        self.report.open = false;
        self.report.field = ReportField::Progress;
        Some(std::mem::take(&mut self.report.report))
    }

    pub fn lead_organizers_for(&self, match_id: &str) -> &[LeadOrganizer] {
        self.lead_organizers
            .get(match_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn can_apply_lead(&self, match_id: &str) -> bool {
        self.lead_organizers_for(match_id).len() < MAX_LEAD_ORGANIZERS
    }

    /// Reveals "my team" once the current match is inside the reveal window.
    pub fn refresh_team_reveal(&mut self, now: NaiveDateTime) {
        if self.team_revealed {
            return;
        }
        if !matches!(self.screen, Screen::MatchComplete { .. }) {
            return;
        }
        let Some(kickoff) = self.current_match().and_then(MatchSummary::kickoff) else {
            return;
        };
        if kickoff::within_reveal_window(kickoff, now, self.reveal_window) {
            self.team_revealed = true;
            self.push_log("[INFO] Team assignments are now visible");
        }
    }

    /// The viewer's team on the complete screen, once revealed and only for the roster's match.
    pub fn my_team(&self) -> Option<&Team> {
        if !self.team_revealed {
            return None;
        }
        match &self.screen {
            Screen::MatchComplete { match_id } if *match_id == self.roster_match => {
                Some(&self.roster.first)
            }
            _ => None,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetRoster(roster) => {
            state.roster_loading = false;
            let count = roster.player_count();
            state.roster = roster;
            match state.roster.strengths(state.scale) {
                Ok((first, second)) => state.push_log(format!(
                    "[INFO] Roster loaded: {count} players ({first} vs {second})"
                )),
                Err(err) => state.push_log(format!("[WARN] Roster loaded with {err}")),
            }
        }
        Delta::RosterError(err) => {
            state.roster_loading = false;
            state.push_log(format!("[WARN] Roster fetch error: {err}"));
        }
        Delta::LeadAssigned {
            match_id,
            organizer,
        } => {
            if !state.can_apply_lead(&match_id) {
                state.push_log("[WARN] Lead organizers are already assigned");
                return;
            }
            let name = organizer.name.clone();
            state
                .lead_organizers
                .entry(match_id.clone())
                .or_default()
                .push(organizer);
            if let Some(m) = state.matches.iter_mut().find(|m| m.id == match_id) {
                m.lead_assigned = true;
            }
            state.push_log(format!("[INFO] {name} assigned as lead organizer"));
        }
        Delta::ReportAccepted { match_id } => {
            state.push_log(format!("[INFO] Match report for {match_id} submitted"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn demo_matches(base: NaiveDate) -> Vec<MatchSummary> {
    let day = |offset: i64| {
        (base + ChronoDuration::days(offset))
            .format("%Y-%m-%d")
            .to_string()
    };
    vec![
        MatchSummary {
            id: "1".to_string(),
            kind: MatchKind::Social,
            title: "Social match".to_string(),
            date: day(0),
            time: "19:00".to_string(),
            location: "Riverside Football Ground".to_string(),
            joined: 14,
            capacity: 18,
            lead_assigned: false,
        },
        MatchSummary {
            id: "2".to_string(),
            kind: MatchKind::Tshirt,
            title: "T-shirt match".to_string(),
            date: day(1),
            time: "20:00".to_string(),
            location: "Southside Futsal Arena".to_string(),
            joined: 10,
            capacity: 12,
            lead_assigned: false,
        },
        MatchSummary {
            id: LEAD_MATCH_ID.to_string(),
            kind: MatchKind::LeadOrganizer,
            title: "Lead organizer match".to_string(),
            date: day(2),
            time: "21:00".to_string(),
            location: "Stadium Gasan Court".to_string(),
            joined: 12,
            capacity: 18,
            lead_assigned: false,
        },
    ]
}

pub fn match_kind_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Social => "SOCIAL",
        MatchKind::Tshirt => "T-SHIRT",
        MatchKind::LeadOrganizer => "LEAD",
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}
