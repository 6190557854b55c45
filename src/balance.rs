use crate::roster::{LevelScale, Player, Roster, RosterError, Team};

/// Redistributes both teams' players into two new teams of near-equal strength.
///
/// Players from `team_a` then `team_b` are stable-sorted by descending score
/// and drafted alternately: even picks to the first team, odd picks to the
/// second. Equal scores keep their concatenation order, so identical input
/// always yields identical output. Output teams keep the input team names.
///
/// Fails with [`RosterError::UnknownSkillLevel`] on the first player whose
/// level has no score in `scale`; nothing is returned in that case.
pub fn rebalance(
    scale: &LevelScale,
    team_a: &Team,
    team_b: &Team,
) -> Result<(Team, Team), RosterError> {
    let mut ranked: Vec<(u32, &Player)> = Vec::with_capacity(team_a.len() + team_b.len());
    for player in team_a.players.iter().chain(team_b.players.iter()) {
        ranked.push((scale.try_score(player)?, player));
    }

    // `sort_by` is stable; ties stay in concatenation order.
    ranked.sort_by(|(a, _), (b, _)| b.cmp(a));

    let mut first = Vec::with_capacity(ranked.len().div_ceil(2));
    let mut second = Vec::with_capacity(ranked.len() / 2);
    for (idx, (_, player)) in ranked.into_iter().enumerate() {
        if idx % 2 == 0 {
            first.push(player.clone());
        } else {
            second.push(player.clone());
        }
    }

    Ok((
        Team::new(team_a.name.clone(), first),
        Team::new(team_b.name.clone(), second),
    ))
}

/// Sum of player scores; fails with [`RosterError::StrengthOverflow`] past `u32::MAX`.
pub fn team_strength(scale: &LevelScale, players: &[Player]) -> Result<u32, RosterError> {
    players.iter().try_fold(0u32, |sum, player| {
        sum.checked_add(scale.try_score(player)?)
            .ok_or(RosterError::StrengthOverflow)
    })
}

impl Roster {
    pub fn rebalanced(&self, scale: &LevelScale) -> Result<Roster, RosterError> {
        let (first, second) = rebalance(scale, &self.first, &self.second)?;
        Ok(Roster::new(first, second))
    }

    /// Per-team strength, first team then second.
    pub fn strengths(&self, scale: &LevelScale) -> Result<(u32, u32), RosterError> {
        Ok((
            team_strength(scale, &self.first.players)?,
            team_strength(scale, &self.second.players)?,
        ))
    }

    pub fn strength_gap(&self, scale: &LevelScale) -> Result<u32, RosterError> {
        let (first, second) = self.strengths(scale)?;
        Ok(first.abs_diff(second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::SkillLevel;

    fn team(name: &str, players: &[(&str, SkillLevel)]) -> Team {
        Team::new(
            name,
            players
                .iter()
                .map(|(name, level)| Player::new(*name, *level))
                .collect(),
        )
    }

    fn names(team: &Team) -> Vec<&str> {
        team.players.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn drafts_in_descending_score_order() {
        // Amateur scale: Amateur5=5, Amateur4=4, Amateur3=3, Amateur1=1.
        let scale = LevelScale::amateur();
        let a = team(
            "Blue",
            &[("P1", SkillLevel::Amateur5), ("P2", SkillLevel::Amateur3)],
        );
        let b = team(
            "Red",
            &[("P3", SkillLevel::Amateur4), ("P4", SkillLevel::Amateur1)],
        );

        let (first, second) = rebalance(scale, &a, &b).unwrap();
        assert_eq!(names(&first), ["P1", "P2"]);
        assert_eq!(names(&second), ["P3", "P4"]);
        assert_eq!(first.name, "Blue");
        assert_eq!(second.name, "Red");
        assert_eq!(team_strength(scale, &first.players), Ok(8));
        assert_eq!(team_strength(scale, &second.players), Ok(5));
    }

    #[test]
    fn equal_levels_alternate_in_input_order() {
        let scale = LevelScale::semi_pro();
        let a = team(
            "Blue",
            &[
                ("a1", SkillLevel::Amateur2),
                ("a2", SkillLevel::Amateur2),
                ("a3", SkillLevel::Amateur2),
            ],
        );
        let b = team(
            "Red",
            &[("b1", SkillLevel::Amateur2), ("b2", SkillLevel::Amateur2)],
        );

        let (first, second) = rebalance(scale, &a, &b).unwrap();
        assert_eq!(names(&first), ["a1", "a3", "b2"]);
        assert_eq!(names(&second), ["a2", "b1"]);
    }

    #[test]
    fn empty_and_single_player_inputs() {
        let scale = LevelScale::semi_pro();
        let (first, second) = rebalance(scale, &team("Blue", &[]), &team("Red", &[])).unwrap();
        assert!(first.is_empty());
        assert!(second.is_empty());

        let (first, second) = rebalance(
            scale,
            &team("Blue", &[]),
            &team("Red", &[("solo", SkillLevel::SemiPro2)]),
        )
        .unwrap();
        assert_eq!(names(&first), ["solo"]);
        assert!(second.is_empty());
    }

    #[test]
    fn level_outside_scale_is_an_error() {
        let a = team("Blue", &[("ok", SkillLevel::Amateur3)]);
        let b = team("Red", &[("pro", SkillLevel::SemiPro1)]);
        let err = rebalance(LevelScale::amateur(), &a, &b).unwrap_err();
        assert_eq!(
            err,
            RosterError::UnknownSkillLevel {
                level: "Semi-pro 1".to_string(),
                player: Some("pro".to_string()),
            }
        );
    }

    #[test]
    fn roster_gap_after_rebalance() {
        let scale = LevelScale::semi_pro();
        let roster = Roster::new(
            team(
                "Blue",
                &[("x", SkillLevel::SemiPro1), ("y", SkillLevel::SemiPro2)],
            ),
            team(
                "Red",
                &[("z", SkillLevel::Amateur5), ("w", SkillLevel::Amateur4)],
            ),
        );
        assert_eq!(roster.strength_gap(scale), Ok(10));
        let balanced = roster.rebalanced(scale).unwrap();
        assert_eq!(balanced.strengths(scale), Ok((9, 7)));
        assert_eq!(balanced.strength_gap(scale), Ok(2));
    }

    #[test]
    fn strength_overflow_is_an_error() {
        let scale = LevelScale::new(
            "wide",
            &[
                (SkillLevel::Amateur1, u32::MAX),
                (SkillLevel::Amateur2, u32::MAX - 1),
            ],
        )
        .unwrap();
        let a = team("Blue", &[("x", SkillLevel::Amateur1)]);
        let b = team("Red", &[("y", SkillLevel::Amateur2)]);

        let (first, second) = rebalance(&scale, &a, &b).unwrap();
        assert_eq!(team_strength(&scale, &first.players), Ok(u32::MAX));
        assert_eq!(team_strength(&scale, &second.players), Ok(u32::MAX - 1));

        let both = [a.players[0].clone(), b.players[0].clone()];
        assert_eq!(
            team_strength(&scale, &both),
            Err(RosterError::StrengthOverflow)
        );
        let stacked = Roster::new(Team::new("Blue", both.to_vec()), Team::new("Red", Vec::new()));
        assert_eq!(
            stacked.strength_gap(&scale),
            Err(RosterError::StrengthOverflow)
        );
    }
}
