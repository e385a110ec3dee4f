// Americano tournament standings engine.
//
// Reset-then-rebuild: the stored stats rows are zeroed, rebuilt in memory
// from the tournament's current match set, and written back wholesale
// (see `Database::recompute_americano_standings`). Because nothing is
// ever incrementally adjusted, editing a score, reassigning a round, or
// deleting a round can never double-count or leave residue.

use std::collections::HashMap;

use crate::db::{AmericanoMatch, StandingRow};
use crate::matches::{winning_team, Team};
use crate::rank::{assign_competition_ranks, Ranked};

/// Per-player counters rebuilt from zero on every recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsCounters {
    pub wins: i64,
    pub losses: i64,
    pub matches_played: i64,
    pub points_for: i64,
    pub points_against: i64,
}

/// Eligible view of a tournament match: all four seats filled and both
/// team scores recorded. Anything less contributes nothing to anyone.
struct EligibleMatch {
    team1: [i64; 2],
    team2: [i64; 2],
    team1_points: i64,
    team2_points: i64,
}

fn eligible(m: &AmericanoMatch) -> Option<EligibleMatch> {
    Some(EligibleMatch {
        team1: [m.team1_player1_id?, m.team1_player2_id?],
        team2: [m.team2_player1_id?, m.team2_player2_id?],
        team1_points: m.team1_points?,
        team2_points: m.team2_points?,
    })
}

/// Fold the tournament's match set into per-player counters.
///
/// Every member of `player_ids` gets an entry, zero-valued if it appears
/// in no eligible match. Ineligible matches (missing seat or missing
/// score) are skipped whole. A participant that is not a tournament
/// member is ignored seat by seat; the match still counts for the members
/// in it. Equal scores are a tie: both teams accrue the match and the
/// points, neither a win nor a loss.
pub fn recompute_stats(
    player_ids: &[i64],
    matches: &[AmericanoMatch],
) -> HashMap<i64, StatsCounters> {
    let mut stats: HashMap<i64, StatsCounters> = player_ids
        .iter()
        .map(|&id| (id, StatsCounters::default()))
        .collect();

    for m in matches {
        let Some(em) = eligible(m) else { continue };

        for pid in em.team1.iter().chain(em.team2.iter()) {
            if let Some(st) = stats.get_mut(pid) {
                st.matches_played += 1;
            }
        }

        for pid in &em.team1 {
            if let Some(st) = stats.get_mut(pid) {
                st.points_for += em.team1_points;
                st.points_against += em.team2_points;
            }
        }
        for pid in &em.team2 {
            if let Some(st) = stats.get_mut(pid) {
                st.points_for += em.team2_points;
                st.points_against += em.team1_points;
            }
        }

        let (winners, losers) = match winning_team(em.team1_points, em.team2_points) {
            Some(Team::One) => (&em.team1, &em.team2),
            Some(Team::Two) => (&em.team2, &em.team1),
            None => continue,
        };
        for pid in winners {
            if let Some(st) = stats.get_mut(pid) {
                st.wins += 1;
            }
        }
        for pid in losers {
            if let Some(st) = stats.get_mut(pid) {
                st.losses += 1;
            }
        }
    }

    stats
}

/// Rank-relevant key: wins, points differential, points for. The name
/// tiebreak stays out so equally-scored players share a position. Used by
/// both the sort and the position walker.
fn rank_key(r: &StandingRow) -> (i64, i64, i64) {
    (r.wins, r.points_diff(), r.points_for)
}

/// Sort standings rows and assign competition positions.
///
/// Wins desc, points differential desc, points for desc, then player name
/// (case-insensitive) for a deterministic total order.
pub fn rank_standings(mut rows: Vec<StandingRow>) -> Vec<Ranked<StandingRow>> {
    rows.sort_by(|a, b| {
        let (a_wins, a_diff, a_for) = rank_key(a);
        let (b_wins, b_diff, b_for) = rank_key(b);
        b_wins
            .cmp(&a_wins)
            .then(b_diff.cmp(&a_diff))
            .then(b_for.cmp(&a_for))
            .then_with(|| a.player_name.to_lowercase().cmp(&b.player_name.to_lowercase()))
    });
    assign_competition_ranks(rows, rank_key)
}
