// Americano tournament lifecycle rules: round sizing, the round-assignment
// validation policy, and the edit window.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::AmericanoTournament;

/// Four players per court; leftovers sit the round out.
pub fn matches_per_round(num_players: i64) -> i64 {
    num_players / 4
}

fn parsed_play_date(t: &AmericanoTournament) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&t.play_date, "%Y-%m-%d").ok()
}

/// Editable while active, until the play date (inclusive).
pub fn is_open_for_edit(t: &AmericanoTournament, today: NaiveDate) -> bool {
    match parsed_play_date(t) {
        Some(play_date) => t.is_active && play_date >= today,
        None => false,
    }
}

/// Finished strictly after the play date.
pub fn is_finished(t: &AmericanoTournament, today: NaiveDate) -> bool {
    match parsed_play_date(t) {
        Some(play_date) => play_date < today,
        None => false,
    }
}

/// One match's submitted lineup, court, and result within a round
/// assignment write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub match_id: i64,
    pub team1_player1: Option<i64>,
    pub team1_player2: Option<i64>,
    pub team2_player1: Option<i64>,
    pub team2_player2: Option<i64>,
    pub court_number: Option<i64>,
    pub team1_points: Option<i64>,
    pub team2_points: Option<i64>,
}

impl MatchAssignment {
    fn player_slots(&self) -> [Option<i64>; 4] {
        [
            self.team1_player1,
            self.team1_player2,
            self.team2_player1,
            self.team2_player2,
        ]
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.player_slots().iter().all(|slot| slot.is_some())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("a player outside the tournament was assigned to a match")]
    PlayerOutsideTournament,
    #[error("a player cannot appear twice in the same match")]
    DuplicatePlayerInMatch,
    #[error("a player cannot appear in two matches of the same round")]
    DuplicatePlayerInRound,
}

/// Validate and sanitize a full round assignment before persistence.
///
/// Policy, checked match by match:
/// - every assigned player must belong to the tournament;
/// - a fully-assigned match must field four distinct players;
/// - fully-assigned matches of the round must not share a player
///   (partially-assigned matches are exempt from the cross-match check);
/// - a partially-assigned match keeps its partial lineup but never keeps
///   scores.
///
/// Returns the assignments with score fields sanitized, ready to persist.
pub fn sanitize_round_assignment(
    assignments: Vec<MatchAssignment>,
    tournament_players: &HashSet<i64>,
) -> Result<Vec<MatchAssignment>, AssignmentError> {
    let mut used_in_fully_assigned: HashSet<i64> = HashSet::new();
    let mut sanitized = Vec::with_capacity(assignments.len());

    for mut a in assignments {
        for pid in a.player_slots().into_iter().flatten() {
            if !tournament_players.contains(&pid) {
                return Err(AssignmentError::PlayerOutsideTournament);
            }
        }

        if a.is_fully_assigned() {
            let ids: Vec<i64> = a.player_slots().into_iter().flatten().collect();
            let distinct: HashSet<i64> = ids.iter().copied().collect();
            if distinct.len() != 4 {
                return Err(AssignmentError::DuplicatePlayerInMatch);
            }
            if ids.iter().any(|pid| used_in_fully_assigned.contains(pid)) {
                return Err(AssignmentError::DuplicatePlayerInRound);
            }
            used_in_fully_assigned.extend(ids);
        } else {
            a.team1_points = None;
            a.team2_points = None;
        }

        sanitized.push(a);
    }

    Ok(sanitized)
}
