//! Random team split: shuffle the active roster and chunk it into groups.

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use crate::{config::TEAM_SIZE_RANGE, dao::models::GeneratedTeam};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TeamGenerationError {
    /// Team size outside the accepted range.
    #[error("team size {0} is outside the allowed range")]
    InvalidTeamSize(usize),
    /// Nobody to split.
    #[error("no active players to split into teams")]
    NoActivePlayers,
}

/// Shuffle `players` and split them into `ceil(len / team_size)` teams.
///
/// Every team is full except possibly the last one, which holds the
/// remainder.
pub fn generate<R: Rng + ?Sized>(
    mut players: Vec<String>,
    team_size: usize,
    rng: &mut R,
) -> Result<Vec<GeneratedTeam>, TeamGenerationError> {
    if !TEAM_SIZE_RANGE.contains(&team_size) {
        return Err(TeamGenerationError::InvalidTeamSize(team_size));
    }
    if players.is_empty() {
        return Err(TeamGenerationError::NoActivePlayers);
    }

    players.shuffle(rng);
    let teams = players
        .chunks(team_size)
        .enumerate()
        .map(|(index, chunk)| GeneratedTeam {
            name: format!("Team {}", index + 1),
            players: chunk.to_vec(),
        })
        .collect();
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn roster(count: usize) -> Vec<String> {
        (1..=count).map(|n| format!("Player {n}")).collect()
    }

    #[test]
    fn every_player_lands_in_exactly_one_team() {
        let mut rng = StdRng::seed_from_u64(7);
        let teams = generate(roster(14), 6, &mut rng).unwrap();

        let mut assigned: Vec<String> = teams.iter().flat_map(|team| team.players.clone()).collect();
        assigned.sort();
        let mut expected = roster(14);
        expected.sort();
        assert_eq!(assigned, expected);
    }

    #[test]
    fn team_count_is_rounded_up() {
        let mut rng = StdRng::seed_from_u64(1);
        let sizes: Vec<usize> = generate(roster(14), 6, &mut rng)
            .unwrap()
            .iter()
            .map(|team| team.players.len())
            .collect();
        assert_eq!(sizes, [6, 6, 2]);

        let teams = generate(roster(12), 6, &mut rng).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[1].name, "Team 2");
    }

    #[test]
    fn same_seed_gives_same_split() {
        let first = generate(roster(10), 4, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = generate(roster(10), 4, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate(roster(4), 1, &mut rng),
            Err(TeamGenerationError::InvalidTeamSize(1))
        );
        assert_eq!(
            generate(Vec::new(), 6, &mut rng),
            Err(TeamGenerationError::NoActivePlayers)
        );
    }
}
