// Global head-to-head ranking engine.
//
// The ranking is recomputed from scratch on every call: fold the scoped
// eligible match set into per-player counters, sort with the documented
// tie-break chain, then assign competition positions. Nothing is cached
// between invocations, so edits and deletions can never leave stale
// aggregates behind.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::{Match, Player};
use crate::matches::{winning_team, Gender, MatchGenderType, Team};
use crate::rank::{assign_competition_ranks, Ranked};

/// Which slice of the match log a ranking is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingScope {
    All,
    Male,
    Female,
    Mixed,
}

impl RankingScope {
    /// Parse a scope string. Unknown values normalize to `All`.
    pub fn from_str_name(s: &str) -> Self {
        match s {
            "male" => Self::Male,
            "female" => Self::Female,
            "mixed" => Self::Mixed,
            _ => Self::All,
        }
    }

    pub fn to_str_name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Male => "male",
            Self::Female => "female",
            Self::Mixed => "mixed",
        }
    }

    /// The match gender category this scope selects, if any.
    fn match_filter(&self) -> Option<MatchGenderType> {
        match self {
            Self::All => None,
            Self::Male => Some(MatchGenderType::Men),
            Self::Female => Some(MatchGenderType::Women),
            Self::Mixed => Some(MatchGenderType::Mixed),
        }
    }

    /// Whether a player belongs to the scope's reported population.
    /// Male/female scopes restrict to players with that recorded gender;
    /// all/mixed report everyone.
    fn includes_player(&self, player: &Player) -> bool {
        match self {
            Self::All | Self::Mixed => true,
            Self::Male => player.gender.as_deref() == Some(Gender::Male.to_str_name()),
            Self::Female => player.gender.as_deref() == Some(Gender::Female.to_str_name()),
        }
    }
}

/// Aggregated per-player line of the global ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStanding {
    pub player_id: i64,
    pub name: String,
    pub wins: i64,
    pub matches_played: i64,
}

impl PlayerStanding {
    /// Win percentage over all counted matches; 0.0 before the first one.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches_played as f64 * 100.0
        }
    }

    /// Losses are derived, never stored: played minus won, floored at
    /// zero. Tied matches count as played but neither won nor lost.
    pub fn losses(&self) -> i64 {
        (self.matches_played - self.wins).max(0)
    }

    /// Win rate rounded to two decimals as an integer, so floating-point
    /// noise cannot split a tie group.
    fn win_rate_centis(&self) -> i64 {
        (self.win_rate() * 100.0).round() as i64
    }
}

/// Rank-relevant key: everything the sort orders by except the final name
/// tiebreak. Used by both the sort and the position walker so the two can
/// never disagree on what constitutes a tie.
fn rank_key(s: &PlayerStanding) -> (i64, i64, i64) {
    (s.wins, s.win_rate_centis(), s.matches_played)
}

/// A computed scoped ranking: the ranked table plus the scoped players
/// with no counted matches, listed separately.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub scope: &'static str,
    pub ranked: Vec<Ranked<PlayerStanding>>,
    pub unranked: Vec<Player>,
}

/// Eligible view of a match: all four participants assigned and both
/// scores present. Anything less contributes nothing to anyone.
struct EligibleMatch {
    team1: [i64; 2],
    team2: [i64; 2],
    team1_score: i64,
    team2_score: i64,
}

fn eligible(m: &Match) -> Option<EligibleMatch> {
    Some(EligibleMatch {
        team1: [m.team1_player1_id?, m.team1_player2_id?],
        team2: [m.team2_player1_id?, m.team2_player2_id?],
        team1_score: m.team1_score?,
        team2_score: m.team2_score?,
    })
}

/// Compute the scoped ranking over the full match log.
///
/// Counters start at zero for every invocation; matches that are
/// ineligible, or outside the scope's gender category, are skipped whole.
/// A tied score counts the match as played for all four participants but
/// credits no win to either side.
pub fn compute_ranking(players: &[Player], matches: &[Match], scope: RankingScope) -> Ranking {
    let filter = scope.match_filter();

    // (matches_played, wins) per player id.
    let mut stats: HashMap<i64, (i64, i64)> = HashMap::new();

    for m in matches {
        if let Some(wanted) = filter {
            if m.gender_type.as_deref() != Some(wanted.to_str_name()) {
                continue;
            }
        }
        let Some(em) = eligible(m) else { continue };

        for pid in em.team1.iter().chain(em.team2.iter()) {
            let entry = stats.entry(*pid).or_insert((0, 0));
            entry.0 += 1;
        }

        let winners = match winning_team(em.team1_score, em.team2_score) {
            Some(Team::One) => &em.team1,
            Some(Team::Two) => &em.team2,
            None => continue,
        };
        for pid in winners {
            if let Some(entry) = stats.get_mut(pid) {
                entry.1 += 1;
            }
        }
    }

    let mut ranked_rows = Vec::new();
    let mut unranked = Vec::new();

    for p in players.iter().filter(|p| scope.includes_player(p)) {
        match stats.get(&p.id) {
            Some(&(matches_played, wins)) if matches_played > 0 => {
                ranked_rows.push(PlayerStanding {
                    player_id: p.id,
                    name: p.name.clone(),
                    wins,
                    matches_played,
                });
            }
            _ => unranked.push(p.clone()),
        }
    }

    unranked.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    // Wins desc, rounded win rate desc, matches asc (fewer matches with
    // the same record ranks higher), then name for a total order.
    ranked_rows.sort_by(|a, b| {
        let (a_wins, a_rate, a_matches) = rank_key(a);
        let (b_wins, b_rate, b_matches) = rank_key(b);
        b_wins
            .cmp(&a_wins)
            .then(b_rate.cmp(&a_rate))
            .then(a_matches.cmp(&b_matches))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    Ranking {
        scope: scope.to_str_name(),
        ranked: assign_competition_ranks(ranked_rows, rank_key),
        unranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, name: &str, gender: Option<&str>) -> Player {
        Player {
            id,
            name: name.to_string(),
            gender: gender.map(|g| g.to_string()),
            created_at: String::new(),
        }
    }

    fn match_row(
        id: i64,
        team1: [i64; 2],
        team2: [i64; 2],
        score1: i64,
        score2: i64,
        gender_type: &str,
    ) -> Match {
        Match {
            id,
            team1_player1_id: Some(team1[0]),
            team1_player2_id: Some(team1[1]),
            team2_player1_id: Some(team2[0]),
            team2_player2_id: Some(team2[1]),
            team1_score: Some(score1),
            team2_score: Some(score2),
            date_played: "2026-05-01".to_string(),
            gender_type: Some(gender_type.to_string()),
            created_at: String::new(),
        }
    }

    fn four_players() -> Vec<Player> {
        vec![
            player(1, "P1", Some("M")),
            player(2, "P2", Some("M")),
            player(3, "P3", Some("M")),
            player(4, "P4", Some("M")),
        ]
    }

    fn standing_of<'r>(ranking: &'r Ranking, id: i64) -> &'r Ranked<PlayerStanding> {
        ranking
            .ranked
            .iter()
            .find(|r| r.row.player_id == id)
            .unwrap()
    }

    #[test]
    fn test_simple_2v2_result() {
        let players = four_players();
        let matches = vec![match_row(1, [1, 2], [3, 4], 15, 10, "M")];

        let ranking = compute_ranking(&players, &matches, RankingScope::All);
        assert_eq!(ranking.ranked.len(), 4);
        assert!(ranking.unranked.is_empty());

        for id in [1, 2] {
            let s = &standing_of(&ranking, id).row;
            assert_eq!(s.wins, 1);
            assert_eq!(s.losses(), 0);
            assert_eq!(s.matches_played, 1);
        }
        for id in [3, 4] {
            let s = &standing_of(&ranking, id).row;
            assert_eq!(s.wins, 0);
            assert_eq!(s.losses(), 1);
            assert_eq!(s.matches_played, 1);
        }
    }

    #[test]
    fn test_incomplete_match_contributes_nothing() {
        let players = four_players();
        let mut m = match_row(1, [1, 2], [3, 4], 15, 10, "M");
        m.team2_score = None;

        let ranking = compute_ranking(&players, &[m], RankingScope::All);
        assert!(ranking.ranked.is_empty());
        assert_eq!(ranking.unranked.len(), 4);
    }

    #[test]
    fn test_missing_participant_contributes_nothing() {
        let players = four_players();
        let mut m = match_row(1, [1, 2], [3, 4], 15, 10, "M");
        m.team1_player2_id = None;

        let ranking = compute_ranking(&players, &[m], RankingScope::All);
        assert!(ranking.ranked.is_empty());
    }

    #[test]
    fn test_tie_counts_participation_but_no_wins() {
        let players = four_players();
        let matches = vec![match_row(1, [1, 2], [3, 4], 12, 12, "M")];

        let ranking = compute_ranking(&players, &matches, RankingScope::All);
        for id in 1..=4 {
            let s = &standing_of(&ranking, id).row;
            assert_eq!(s.wins, 0);
            assert_eq!(s.matches_played, 1);
            // Derived losses absorb the tie: 1 played, 0 won.
            assert_eq!(s.losses(), 1);
            assert_eq!(s.win_rate(), 0.0);
        }
    }

    #[test]
    fn test_win_rate_and_derived_losses() {
        let s = PlayerStanding {
            player_id: 1,
            name: "A".to_string(),
            wins: 1,
            matches_played: 3,
        };
        assert!((s.win_rate() - 33.333333).abs() < 0.001);
        assert_eq!(s.losses(), 2);

        let empty = PlayerStanding {
            player_id: 2,
            name: "B".to_string(),
            wins: 0,
            matches_played: 0,
        };
        assert_eq!(empty.win_rate(), 0.0);
        assert_eq!(empty.losses(), 0);
    }

    #[test]
    fn test_tie_break_chain_and_positions() {
        // Alice and Bob: 1 win in 2 matches each, so identical keys and a
        // shared rank. Cesc: 0 wins / 1 match. Dana: 0 wins / 5 matches. Same
        // wins and rate, fewer matches ranks higher, so Cesc sits above
        // Dana.
        let players = vec![
            player(1, "Alice", None),
            player(2, "Bob", None),
            player(3, "Cesc", None),
            player(4, "Dana", None),
            player(5, "E1", None),
            player(6, "E2", None),
            player(7, "E3", None),
        ];
        let mut matches = vec![
            // Alice+Bob win one together, lose one together.
            match_row(1, [1, 2], [5, 6], 15, 5, "X"),
            match_row(2, [1, 2], [5, 7], 5, 15, "X"),
            // Cesc: one loss.
            match_row(3, [3, 5], [6, 7], 3, 15, "X"),
        ];
        // Dana: five losses.
        for i in 0..5 {
            matches.push(match_row(10 + i, [4, 5], [6, 7], 0, 15, "X"));
        }

        let ranking = compute_ranking(&players, &matches, RankingScope::All);

        let alice = standing_of(&ranking, 1);
        let bob = standing_of(&ranking, 2);
        let cesc = standing_of(&ranking, 3);
        let dana = standing_of(&ranking, 4);

        // Alice and Bob share a tie group, with only the first labelled.
        assert_eq!(alice.display_position, bob.display_position);
        assert!(alice.show_position);
        assert!(!bob.show_position);

        assert!(alice.display_position < cesc.display_position);
        assert!(cesc.display_position < dana.display_position);
        assert_eq!(cesc.row.wins, 0);
        assert_eq!(dana.row.wins, 0);
        assert_eq!(cesc.row.matches_played, 1);
        assert_eq!(dana.row.matches_played, 5);
    }

    #[test]
    fn test_rank_skip_after_tie_group() {
        // A: 3 wins, B and C: 2 wins each, D: 1 win, all unbeaten on the
        // matches they appear in; X1/X2 lose everything.
        let players = vec![
            player(1, "A", None),
            player(2, "B", None),
            player(3, "C", None),
            player(4, "D", None),
            player(9, "X1", None),
            player(10, "X2", None),
        ];
        let matches = vec![
            match_row(1, [1, 2], [9, 10], 15, 0, "X"),
            match_row(2, [1, 3], [9, 10], 15, 0, "X"),
            match_row(3, [1, 4], [9, 10], 15, 0, "X"),
            match_row(4, [2, 3], [9, 10], 15, 0, "X"),
        ];

        let ranking = compute_ranking(&players, &matches, RankingScope::All);
        // Positions read 1, 2, 2, 4: the tie for 2nd consumes rank 3.
        assert_eq!(standing_of(&ranking, 1).display_position, 1);
        assert_eq!(standing_of(&ranking, 2).display_position, 2);
        assert_eq!(standing_of(&ranking, 3).display_position, 2);
        assert_eq!(standing_of(&ranking, 4).display_position, 4);
        assert!(!standing_of(&ranking, 3).show_position);

        // X1/X2 tie on 0 wins over 4 matches, after D.
        assert_eq!(standing_of(&ranking, 9).display_position, 5);
        assert_eq!(standing_of(&ranking, 10).display_position, 5);

        let shown = ranking.ranked.iter().filter(|r| r.show_position).count();
        assert_eq!(shown, 4); // one per tie group
    }

    #[test]
    fn test_name_tiebreak_is_case_insensitive_and_total() {
        let players = vec![
            player(1, "beto", None),
            player(2, "Ana", None),
            player(3, "Carlos", None),
            player(9, "X1", None),
            player(10, "X2", None),
            player(11, "X3", None),
            player(12, "X4", None),
        ];
        let matches = vec![
            // beto+Ana and Carlos+X1 win one each; a drawn filler match
            // then dilutes X1's rate so only the named three end at one
            // win over one match.
            match_row(1, [1, 2], [10, 11], 15, 3, "X"),
            match_row(2, [3, 9], [10, 11], 15, 3, "X"),
            match_row(3, [9, 12], [10, 11], 7, 7, "X"),
        ];

        let ranking = compute_ranking(&players, &matches, RankingScope::All);
        // Identical records order alphabetically but share rank 1.
        let names: Vec<&str> = ranking
            .ranked
            .iter()
            .take(3)
            .map(|r| r.row.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "beto", "Carlos"]);
        assert!(ranking.ranked[0..3].iter().all(|r| r.display_position == 1));
        assert!(ranking.ranked[0].show_position);
        assert!(!ranking.ranked[1].show_position);
        assert!(!ranking.ranked[2].show_position);
    }

    #[test]
    fn test_scope_filters_matches_and_population() {
        let players = vec![
            player(1, "M1", Some("M")),
            player(2, "M2", Some("M")),
            player(3, "M3", Some("M")),
            player(4, "M4", Some("M")),
            player(5, "F1", Some("F")),
            player(6, "F2", Some("F")),
        ];
        let matches = vec![
            match_row(1, [1, 2], [3, 4], 15, 10, "M"),
            match_row(2, [1, 5], [2, 6], 15, 10, "X"),
        ];

        let male = compute_ranking(&players, &matches, RankingScope::Male);
        // Only the men's match counts, and only male players are reported.
        assert_eq!(male.ranked.len(), 4);
        assert!(male.unranked.is_empty());
        assert_eq!(standing_of(&male, 1).row.matches_played, 1);
        assert!(male.ranked.iter().all(|r| r.row.player_id <= 4));

        let female = compute_ranking(&players, &matches, RankingScope::Female);
        // No women's match recorded: both women are unranked.
        assert!(female.ranked.is_empty());
        assert_eq!(female.unranked.len(), 2);

        let mixed = compute_ranking(&players, &matches, RankingScope::Mixed);
        // The mixed match counts, and the whole club is the population.
        assert_eq!(mixed.ranked.len(), 4);
        assert_eq!(mixed.unranked.len(), 2);

        let all = compute_ranking(&players, &matches, RankingScope::All);
        assert_eq!(standing_of(&all, 1).row.matches_played, 2);
        assert_eq!(standing_of(&all, 1).row.wins, 2);
    }

    #[test]
    fn test_unranked_sorted_by_name() {
        let players = vec![
            player(1, "zoe", None),
            player(2, "Ana", None),
            player(3, "Mia", None),
        ];
        let ranking = compute_ranking(&players, &[], RankingScope::All);
        let names: Vec<&str> = ranking.unranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Mia", "zoe"]);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let players = four_players();
        let matches = vec![
            match_row(1, [1, 2], [3, 4], 15, 10, "M"),
            match_row(2, [1, 3], [2, 4], 9, 15, "M"),
        ];

        let first = compute_ranking(&players, &matches, RankingScope::All);
        let second = compute_ranking(&players, &matches, RankingScope::All);
        assert_eq!(first.ranked, second.ranked);
    }

    #[test]
    fn test_scope_parsing_defaults_to_all() {
        assert_eq!(RankingScope::from_str_name("male"), RankingScope::Male);
        assert_eq!(RankingScope::from_str_name("female"), RankingScope::Female);
        assert_eq!(RankingScope::from_str_name("mixed"), RankingScope::Mixed);
        assert_eq!(RankingScope::from_str_name("all"), RankingScope::All);
        assert_eq!(RankingScope::from_str_name("bogus"), RankingScope::All);
    }

    #[test]
    fn test_rounded_rate_merges_float_noise() {
        // 1/3 and 33.33/100-style rates: keys equal only when the rounded
        // centi-percent matches.
        let a = PlayerStanding {
            player_id: 1,
            name: "A".to_string(),
            wins: 1,
            matches_played: 3,
        };
        let b = PlayerStanding {
            player_id: 2,
            name: "B".to_string(),
            wins: 1,
            matches_played: 3,
        };
        assert_eq!(super::rank_key(&a), super::rank_key(&b));
    }
}
