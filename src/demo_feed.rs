use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use crate::roster_source::RosterProvider;
use crate::state::{Delta, MAX_LEAD_ORGANIZERS, ProviderCommand};

const RESPONSE_DELAY: Duration = Duration::from_millis(150);

/// Answers UI commands on a background thread, standing in for the match backend.
pub fn spawn_demo_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    provider: Box<dyn RosterProvider>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || run_demo_provider(&tx, cmd_rx, provider))
}

pub fn run_demo_provider(
    tx: &Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    mut provider: Box<dyn RosterProvider>,
) {
    let mut leads: HashMap<String, usize> = HashMap::new();

    let _ = tx.send(Delta::Log(format!(
        "[INFO] Roster source: {}",
        provider.describe()
    )));
    send_roster(tx, provider.as_mut());

    // Ends when the UI drops its command sender.
    for cmd in cmd_rx {
        thread::sleep(RESPONSE_DELAY);
        match cmd {
            ProviderCommand::FetchRoster => send_roster(tx, provider.as_mut()),
            ProviderCommand::SubmitReport { match_id, report } => {
                // Acknowledged locally; there is no report backend.
                let filled = [&report.progress, &report.issues, &report.player_feedback]
                    .iter()
                    .filter(|field| !field.trim().is_empty())
                    .count();
                if filled == 0 {
                    let _ = tx.send(Delta::Log(format!(
                        "[WARN] Empty match report for {match_id}"
                    )));
                }
                let _ = tx.send(Delta::ReportAccepted { match_id });
            }
            ProviderCommand::ApplyLead {
                match_id,
                applicant,
            } => {
                let count = leads.entry(match_id.clone()).or_insert(0);
                if *count >= MAX_LEAD_ORGANIZERS {
                    let _ = tx.send(Delta::Log(
                        "[WARN] Lead organizers are already assigned".to_string(),
                    ));
                    continue;
                }
                *count += 1;
                let _ = tx.send(Delta::LeadAssigned {
                    match_id,
                    organizer: applicant,
                });
            }
        }
    }
}

fn send_roster(tx: &Sender<Delta>, provider: &mut dyn RosterProvider) {
    match provider.fetch_roster() {
        Ok(roster) => {
            let _ = tx.send(Delta::SetRoster(roster));
        }
        Err(err) => {
            let _ = tx.send(Delta::RosterError(format!("{err:#}")));
        }
    }
}
