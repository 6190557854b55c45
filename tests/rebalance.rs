use std::collections::HashMap;

use matchday_terminal::roster_source::{DemoRoster, RosterProvider};
use matchday_terminal::{LevelScale, Player, RosterError, SkillLevel, Team, rebalance, team_strength};

fn team(name: &str, players: &[(&str, SkillLevel)]) -> Team {
    Team::new(
        name,
        players
            .iter()
            .map(|(name, level)| Player::new(*name, *level))
            .collect(),
    )
}

fn multiset<'a>(players: impl Iterator<Item = &'a Player>) -> HashMap<(String, SkillLevel), usize> {
    let mut counts = HashMap::new();
    for p in players {
        *counts.entry((p.name.clone(), p.level)).or_insert(0) += 1;
    }
    counts
}

fn split_at(players: &[Player], at: usize) -> (Team, Team) {
    let at = at.min(players.len());
    (
        Team::new("Blue", players[..at].to_vec()),
        Team::new("Red", players[at..].to_vec()),
    )
}

#[test]
fn worked_example_matches_expected_draft() {
    let a = team(
        "Blue",
        &[("P1", SkillLevel::Amateur5), ("P2", SkillLevel::Amateur3)],
    );
    let b = team(
        "Red",
        &[("P3", SkillLevel::Amateur4), ("P4", SkillLevel::Amateur1)],
    );
    let scale = LevelScale::amateur();

    let (first, second) = rebalance(scale, &a, &b).expect("all levels are on the scale");

    let first_names: Vec<&str> = first.players.iter().map(|p| p.name.as_str()).collect();
    let second_names: Vec<&str> = second.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(first_names, ["P1", "P2"]);
    assert_eq!(second_names, ["P3", "P4"]);
    assert_eq!(team_strength(scale, &first.players), Ok(8));
    assert_eq!(team_strength(scale, &second.players), Ok(5));

    // Inputs are left untouched.
    assert_eq!(a.players[0].name, "P1");
    assert_eq!(b.players[1].name, "P4");
}

#[test]
fn output_is_a_partition_and_sizes_differ_by_at_most_one() {
    let scale = LevelScale::semi_pro();
    let mut demo = DemoRoster::with_seed(scale, 42);
    let mut pool: Vec<Player> = Vec::new();
    for _ in 0..3 {
        let roster = demo.fetch_roster().expect("demo roster");
        pool.extend(roster.players().cloned());
    }

    for total in 0..=pool.len() {
        for at in [0, total / 3, total / 2, total] {
            let (a, b) = split_at(&pool[..total], at);
            let (first, second) = rebalance(scale, &a, &b).expect("demo levels are on the scale");

            assert_eq!(
                multiset(first.players.iter().chain(second.players.iter())),
                multiset(a.players.iter().chain(b.players.iter())),
                "total={total} at={at}"
            );
            assert!(first.len().abs_diff(second.len()) <= 1);
            assert!(first.len() >= second.len());
        }
    }
}

#[test]
fn identical_input_gives_identical_output() {
    let scale = LevelScale::semi_pro();
    let roster = DemoRoster::with_seed(scale, 9)
        .fetch_roster()
        .expect("demo roster");

    let once = rebalance(scale, &roster.first, &roster.second).unwrap();
    let twice = rebalance(scale, &roster.first, &roster.second).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn first_pick_of_each_pair_goes_to_first_team() {
    let scale = LevelScale::semi_pro();
    let roster = DemoRoster::with_seed(scale, 3)
        .fetch_roster()
        .expect("demo roster");
    let (first, second) = rebalance(scale, &roster.first, &roster.second).unwrap();

    for (a, b) in first.players.iter().zip(second.players.iter()) {
        assert!(scale.score(a.level) >= scale.score(b.level));
    }
    let first_total = team_strength(scale, &first.players).unwrap();
    let second_total = team_strength(scale, &second.players).unwrap();
    assert!(first_total >= second_total);
}

#[test]
fn same_level_players_interleave_by_input_position() {
    let level = SkillLevel::Amateur3;
    let a = team("Blue", &[("a1", level), ("a2", level)]);
    let b = team("Red", &[("b1", level), ("b2", level), ("b3", level)]);

    let (first, second) = rebalance(LevelScale::amateur(), &a, &b).unwrap();
    let first_names: Vec<&str> = first.players.iter().map(|p| p.name.as_str()).collect();
    let second_names: Vec<&str> = second.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(first_names, ["a1", "b1", "b3"]);
    assert_eq!(second_names, ["a2", "b2"]);
}

#[test]
fn empty_teams_stay_empty() {
    let (first, second) = rebalance(
        LevelScale::semi_pro(),
        &Team::new("Blue", Vec::new()),
        &Team::new("Red", Vec::new()),
    )
    .unwrap();
    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(first.name, "Blue");
    assert_eq!(second.name, "Red");
}

#[test]
fn semi_pro_player_on_amateur_scale_is_rejected() {
    let a = team("Blue", &[("x", SkillLevel::Amateur2)]);
    let b = team("Red", &[("y", SkillLevel::SemiPro2)]);

    let err = rebalance(LevelScale::amateur(), &a, &b).unwrap_err();
    assert!(matches!(
        err,
        RosterError::UnknownSkillLevel { ref level, ref player }
            if level == "Semi-pro 2" && player.as_deref() == Some("y")
    ));
}

#[test]
fn custom_scale_drives_the_order() {
    // Inverted amateur order: Amateur 1 strongest.
    let scale = LevelScale::new(
        "inverted",
        &[
            (SkillLevel::Amateur1, 50),
            (SkillLevel::Amateur2, 40),
            (SkillLevel::Amateur3, 30),
        ],
    )
    .expect("strictly ordered scale");
    let a = team(
        "Blue",
        &[("weak", SkillLevel::Amateur3), ("mid", SkillLevel::Amateur2)],
    );
    let b = team("Red", &[("strong", SkillLevel::Amateur1)]);

    let (first, second) = rebalance(&scale, &a, &b).unwrap();
    let first_names: Vec<&str> = first.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(first_names, ["strong", "weak"]);
    assert_eq!(second.players[0].name, "mid");
}
