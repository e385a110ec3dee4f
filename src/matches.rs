// Match-record vocabulary shared by the ranking and standings engines:
// player genders, per-match gender categories, winning-side determination,
// and the entry-validation helpers used by match submission flows.

use serde::{Deserialize, Serialize};

/// A player's recorded gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse the single-letter DB value.
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn to_str_name(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

/// Gender category of a match, derived from its four participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchGenderType {
    Men,
    Women,
    Mixed,
}

impl MatchGenderType {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Self::Men),
            "F" => Some(Self::Women),
            "X" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn to_str_name(&self) -> &'static str {
        match self {
            Self::Men => "M",
            Self::Women => "F",
            Self::Mixed => "X",
        }
    }
}

/// Which side of the net won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    One,
    Two,
}

/// Winner by strict score comparison. Equal scores are a tie and credit
/// neither side.
pub fn winning_team(team1_score: i64, team2_score: i64) -> Option<Team> {
    if team1_score > team2_score {
        Some(Team::One)
    } else if team2_score > team1_score {
        Some(Team::Two)
    } else {
        None
    }
}

/// Category from the four participants' genders, one entry per slot
/// (`None` for an unassigned player or an unrecorded gender).
///
/// All four male means men, all four female means women. Anything else
/// (a mix, a missing player, a missing gender) is mixed. Mixed is the
/// catch-all.
pub fn compute_gender_type(genders: &[Option<Gender>; 4]) -> MatchGenderType {
    if genders.iter().all(|g| *g == Some(Gender::Male)) {
        MatchGenderType::Men
    } else if genders.iter().all(|g| *g == Some(Gender::Female)) {
        MatchGenderType::Women
    } else {
        MatchGenderType::Mixed
    }
}

/// A player cannot appear more than once in the same match.
pub fn has_duplicate_players(player_ids: &[i64; 4]) -> bool {
    for i in 0..player_ids.len() {
        for j in (i + 1)..player_ids.len() {
            if player_ids[i] == player_ids[j] {
                return true;
            }
        }
    }
    false
}

/// Parse a submitted score field. Non-negative integers only; anything
/// else reads as unset.
pub fn parse_score(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Some(n),
        _ => None,
    }
}

/// Parse a submitted player-id field. Empty or malformed reads as unset.
pub fn parse_player_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winning_team_strict_comparison() {
        assert_eq!(winning_team(15, 10), Some(Team::One));
        assert_eq!(winning_team(10, 15), Some(Team::Two));
        assert_eq!(winning_team(12, 12), None);
        assert_eq!(winning_team(0, 0), None);
    }

    #[test]
    fn test_gender_type_all_male() {
        let g = [Some(Gender::Male); 4];
        assert_eq!(compute_gender_type(&g), MatchGenderType::Men);
    }

    #[test]
    fn test_gender_type_all_female() {
        let g = [Some(Gender::Female); 4];
        assert_eq!(compute_gender_type(&g), MatchGenderType::Women);
    }

    #[test]
    fn test_gender_type_mix_is_mixed() {
        let g = [
            Some(Gender::Male),
            Some(Gender::Male),
            Some(Gender::Female),
            Some(Gender::Male),
        ];
        assert_eq!(compute_gender_type(&g), MatchGenderType::Mixed);
    }

    #[test]
    fn test_gender_type_missing_gender_is_mixed() {
        let g = [
            Some(Gender::Male),
            Some(Gender::Male),
            Some(Gender::Male),
            None,
        ];
        assert_eq!(compute_gender_type(&g), MatchGenderType::Mixed);
    }

    #[test]
    fn test_gender_type_no_players_is_mixed() {
        assert_eq!(compute_gender_type(&[None; 4]), MatchGenderType::Mixed);
    }

    #[test]
    fn test_duplicate_players() {
        assert!(has_duplicate_players(&[1, 2, 3, 1]));
        assert!(has_duplicate_players(&[5, 5, 5, 5]));
        assert!(!has_duplicate_players(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("15"), Some(15));
        assert_eq!(parse_score(" 0 "), Some(0));
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("  "), None);
        assert_eq!(parse_score("-3"), None);
        assert_eq!(parse_score("abc"), None);
    }

    #[test]
    fn test_parse_player_id() {
        assert_eq!(parse_player_id("42"), Some(42));
        assert_eq!(parse_player_id(""), None);
        assert_eq!(parse_player_id("x"), None);
    }

    #[test]
    fn test_gender_round_trips() {
        assert_eq!(Gender::from_str_name("M"), Some(Gender::Male));
        assert_eq!(Gender::from_str_name("F"), Some(Gender::Female));
        assert_eq!(Gender::from_str_name("?"), None);
        assert_eq!(
            MatchGenderType::from_str_name("X"),
            Some(MatchGenderType::Mixed)
        );
        assert_eq!(MatchGenderType::Mixed.to_str_name(), "X");
    }
}
