use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use matchday_terminal::demo_feed;
use matchday_terminal::kickoff::format_kickoff;
use matchday_terminal::roster::{SkillLevel, Team};
use matchday_terminal::roster_source;
use matchday_terminal::state::{
    self, AppState, EMERGENCY_GUIDE, LeadOrganizer, LeadTab, MAX_LEAD_ORGANIZERS, MatchKind,
    ProviderCommand, ReportField, Screen, apply_delta, match_kind_label,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    applicant: LeadOrganizer,
    kickoff_check: Duration,
    last_kickoff_check: Instant,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let kickoff_check = state::env_u64("KICKOFF_CHECK_SECS", 30).max(5);
        let name = std::env::var("VIEWER_NAME").unwrap_or_else(|_| "Guest".to_string());
        let level = std::env::var("VIEWER_LEVEL")
            .ok()
            .and_then(|raw| raw.parse::<SkillLevel>().ok())
            .unwrap_or(SkillLevel::Amateur1);
        let mut state = AppState::new();
        state.roster_loading = cmd_tx.is_some();
        Self {
            state,
            should_quit: false,
            cmd_tx,
            applicant: LeadOrganizer { name, level },
            kickoff_check: Duration::from_secs(kickoff_check),
            last_kickoff_check: Instant::now(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.report.open {
            self.on_report_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('b') | KeyCode::Esc => self.state.back(),
            _ => match self.state.screen {
                Screen::MatchList => self.on_list_key(key),
                Screen::MatchDetail { .. } => self.on_detail_key(key),
                Screen::LeadProgress { .. } => self.on_lead_key(key),
                Screen::MatchComplete { .. } => self.on_complete_key(key),
            },
        }
    }

    fn on_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => self.state.open_detail(),
            _ => {}
        }
    }

    fn on_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('a') => self.state.open_complete(Local::now().naive_local()),
            KeyCode::Char('p') => self.state.open_lead_progress(),
            _ => {}
        }
    }

    fn on_lead_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Char('t') => self.state.toggle_lead_tab(),
            KeyCode::Char('r') if self.state.lead_tab == LeadTab::Match => {
                self.state.rebalance_roster()
            }
            KeyCode::Char('f') => self.request_roster(),
            KeyCode::Char('s') => self.state.mark_started(),
            KeyCode::Char('e') => self.state.open_report(),
            _ => {}
        }
    }

    fn on_complete_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('l') {
            self.request_lead_apply();
        }
    }

    fn on_report_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.close_report(),
            KeyCode::Tab => self.state.cycle_report_field(),
            KeyCode::Backspace => self.state.report_backspace(),
            KeyCode::Enter => self.submit_report(),
            KeyCode::Char(ch) => self.state.report_input(ch),
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} unavailable"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
            return false;
        }
        true
    }

    fn request_roster(&mut self) {
        if self.send(ProviderCommand::FetchRoster, "Roster fetch") {
            self.state.roster_loading = true;
            self.state.push_log("[INFO] Roster request sent");
        }
    }

    fn request_lead_apply(&mut self) {
        let Some(match_id) = self.state.screen.match_id().map(str::to_string) else {
            return;
        };
        if !self.state.can_apply_lead(&match_id) {
            self.state
                .push_log("[WARN] Lead organizers are already assigned");
            return;
        }
        let cmd = ProviderCommand::ApplyLead {
            match_id,
            applicant: self.applicant.clone(),
        };
        if self.send(cmd, "Lead application") {
            self.state.push_log("[INFO] Lead application sent");
        }
    }

    fn submit_report(&mut self) {
        let Some(match_id) = self.state.screen.match_id().map(str::to_string) else {
            self.state.close_report();
            return;
        };
        let Some(report) = self.state.take_report() else {
            return;
        };
        self.send(ProviderCommand::SubmitReport { match_id, report }, "Report submit");
    }

    fn maybe_check_kickoff(&mut self) {
        if self.last_kickoff_check.elapsed() >= self.kickoff_check {
            self.state.refresh_team_reveal(Local::now().naive_local());
            self.last_kickoff_check = Instant::now();
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut app = App::new(Some(cmd_tx));
    let provider = roster_source::provider_from_env(app.state.scale);
    demo_feed::spawn_demo_provider(tx, cmd_rx, provider);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_check_kickoff();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::MatchList => render_match_list(frame, chunks[1], &app.state),
        Screen::MatchDetail { .. } => render_match_detail(frame, chunks[1], &app.state),
        Screen::LeadProgress { .. } => render_lead_progress(frame, chunks[1], &app.state),
        Screen::MatchComplete { .. } => render_match_complete(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.report.open {
        render_report_modal(frame, frame.size(), &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match &state.screen {
        Screen::MatchList => "MATCHES".to_string(),
        Screen::MatchDetail { .. } => "MATCH DETAIL".to_string(),
        Screen::LeadProgress { .. } => format!("LEAD ORGANIZER | {}", lead_tab_label(state.lead_tab)),
        Screen::MatchComplete { .. } => "APPLICATION COMPLETE".to_string(),
    };
    match state.current_match() {
        Some(m) if !matches!(state.screen, Screen::MatchList) => {
            format!(" MATCHDAY | {title} | {}", m.title)
        }
        _ => format!(" MATCHDAY | {title}"),
    }
}

fn footer_text(state: &AppState) -> String {
    if state.report.open {
        return "Tab Next field | Enter Submit | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::MatchList => "j/k/↑/↓ Move | Enter/d Detail | ? Help | q Quit".to_string(),
        Screen::MatchDetail { .. } => {
            "a Apply | p Lead progress | b/Esc Back | ? Help | q Quit".to_string()
        }
        Screen::LeadProgress { .. } => {
            "Tab Switch tab | r Reassign teams | f Refetch roster | s Start | e End match | b/Esc Back | q Quit"
                .to_string()
        }
        Screen::MatchComplete { .. } => {
            "l Apply as lead organizer | b/Esc Back | ? Help | q Quit".to_string()
        }
    }
}

fn render_match_list(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.matches.is_empty() {
        let empty = Paragraph::new("No matches scheduled")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    const ROW_HEIGHT: u16 = 3;
    let visible = (area.height / ROW_HEIGHT).max(1) as usize;
    let (start, end) = visible_range(state.selected, state.matches.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let y = area.y + (i as u16) * ROW_HEIGHT;
        if y + ROW_HEIGHT > area.y + area.height {
            break;
        }
        let row_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height: ROW_HEIGHT,
        };
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let m = &state.matches[idx];
        let lead = if m.kind == MatchKind::LeadOrganizer && !m.lead_assigned {
            "  [no lead organizer]"
        } else {
            ""
        };
        let text = format!(
            "[{}] {}{lead}\n      {} | {} | {}/{}",
            match_kind_label(m.kind),
            m.title,
            format_kickoff(&m.date, &m.time),
            m.location,
            m.joined,
            m.capacity
        );
        frame.render_widget(Paragraph::new(text).style(row_style), row_area);
    }
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_match_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(m) = state.current_match() else {
        frame.render_widget(Paragraph::new("Match not found"), area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    if m.lead_assigned {
        let banner = Paragraph::new("Lead organizer assigned")
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner, rows[0]);
    } else {
        let banner = Paragraph::new(
            "! The match is cancelled automatically if no lead organizer is assigned.",
        )
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(banner, rows[0]);
    }

    let mut lines = vec![
        format!("{} [{}]", m.title, match_kind_label(m.kind)),
        format!("Kickoff:  {}", format_kickoff(&m.date, &m.time)),
        format!("Venue:    {}", m.location),
        format!("Players:  {}/{}", m.joined, m.capacity),
        String::new(),
    ];
    if m.kind == MatchKind::LeadOrganizer {
        lines.push("Lead organizer match:".to_string());
        lines.push("  - Run by an experienced lead organizer".to_string());
        lines.push("  - Structured rotations".to_string());
        lines.push("  - Balanced team assignment".to_string());
    }
    let body = Paragraph::new(lines.join("\n"))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Detail").borders(Borders::ALL));
    frame.render_widget(body, rows[1]);
}

fn render_lead_progress(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.lead_tab {
        LeadTab::Match => render_lead_match_tab(frame, area, state),
        LeadTab::Emergency => render_emergency_tab(frame, area),
    }
}

fn render_lead_match_tab(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let info_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let info = match state.current_match() {
        Some(m) => {
            let status = if state.started.contains(&m.id) {
                "running"
            } else {
                "not started"
            };
            format!(
                "{}\n{}  {}/{}\nStatus: {status}",
                format_kickoff(&m.date, &m.time),
                m.location,
                m.joined,
                m.capacity
            )
        }
        None => "No match selected".to_string(),
    };
    frame.render_widget(
        Paragraph::new(info).block(Block::default().title("Match").borders(Borders::ALL)),
        info_cols[0],
    );

    let venue = format!("{}\n{}", state.venue.equipment, state.venue.lighting);
    frame.render_widget(
        Paragraph::new(venue)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Venue").borders(Borders::ALL)),
        info_cols[1],
    );

    let title = if state.roster_loading {
        format!("Teams ({} scale, loading)", state.scale.name())
    } else {
        format!("Teams ({} scale)", state.scale.name())
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(rows[1]);
    frame.render_widget(block, rows[1]);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let strengths = state.team_strengths();
    render_team(
        frame,
        cols[0],
        &state.roster.first,
        strengths.map(|(first, _)| first),
        Color::Blue,
    );
    render_team(
        frame,
        cols[1],
        &state.roster.second,
        strengths.map(|(_, second)| second),
        Color::Red,
    );
}

fn render_team(frame: &mut Frame, area: Rect, team: &Team, strength: Option<u32>, color: Color) {
    let strength = strength
        .map(|s| s.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut lines = vec![
        Line::styled(
            format!("{} ({} players, strength {strength})", team.name, team.len()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ];
    for (idx, player) in team.players.iter().enumerate() {
        lines.push(Line::raw(format!(
            "{:>2} {:<16} {}",
            idx + 1,
            player.name,
            player.level
        )));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_emergency_tab(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for entry in EMERGENCY_GUIDE.iter() {
        lines.push(Line::styled(
            entry.title,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::raw(format!("  {}", entry.content)));
        lines.push(Line::raw(""));
    }
    let guide = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Emergency guide").borders(Borders::ALL));
    frame.render_widget(guide, area);
}

fn render_match_complete(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let match_id = state.screen.match_id().unwrap_or_default();
    let leads = state.lead_organizers_for(match_id);
    let mut lines: Vec<String> = leads
        .iter()
        .map(|lead| format!("{} ({})", lead.name, lead.level))
        .collect();
    if lines.is_empty() {
        lines.push("No lead organizer yet".to_string());
    }
    if leads.len() < MAX_LEAD_ORGANIZERS {
        lines.push(format!(
            "Press l to apply as lead organizer ({}/{MAX_LEAD_ORGANIZERS})",
            leads.len()
        ));
    }
    frame.render_widget(
        Paragraph::new(lines.join("\n"))
            .block(Block::default().title("Lead organizers").borders(Borders::ALL)),
        rows[0],
    );

    let block = Block::default().title("My team").borders(Borders::ALL);
    if let Some(team) = state.my_team() {
        let inner = block.inner(rows[1]);
        frame.render_widget(block, rows[1]);
        render_team(frame, inner, team, None, Color::Blue);
    } else if state.team_revealed {
        let none = Paragraph::new("No team assignment for this match.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(none, rows[1]);
    } else {
        let minutes = state.reveal_window.num_minutes();
        let hidden = Paragraph::new(format!(
            "Team assignments appear {minutes} minutes before kickoff."
        ))
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
        frame.render_widget(hidden, rows[1]);
    }
}

fn render_report_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title("Match report").borders(Borders::ALL);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    let report = &state.report.report;
    let fields = [
        (ReportField::Progress, "How did the match go?", &report.progress),
        (ReportField::Issues, "Anything unusual?", &report.issues),
        (
            ReportField::PlayerFeedback,
            "Player feedback",
            &report.player_feedback,
        ),
    ];
    for (row, (field, label, value)) in rows.iter().zip(fields) {
        let active = state.report.field == field;
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let text = if active {
            format!("{value}_")
        } else {
            value.to_string()
        };
        let widget = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(label).borders(Borders::ALL).border_style(style));
        frame.render_widget(widget, *row);
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn lead_tab_label(tab: LeadTab) -> &'static str {
    match tab {
        LeadTab::Match => "MATCH",
        LeadTab::Emergency => "EMERGENCY GUIDE",
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Matchday Terminal - Help",
        "",
        "Global:",
        "  b / Esc      Back",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Matches:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Match detail",
        "",
        "Match detail:",
        "  a            Apply to the match",
        "  p            Lead organizer progress",
        "",
        "Lead organizer progress:",
        "  Tab / t      Match / emergency guide",
        "  r            Reassign teams by level",
        "  f            Refetch roster",
        "  s            Start match",
        "  e            End match and write report",
        "",
        "Application complete:",
        "  l            Apply as lead organizer",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
