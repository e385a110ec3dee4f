// Database access layer (SQLite via sqlx).

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::matches::{compute_gender_type, Gender};
use crate::standings;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
    /// "M" / "F", or NULL while unrecorded.
    pub gender: Option<String>,
    pub created_at: String,
}

/// A head-to-head 2v2 match. Participants and scores are nullable: a row
/// may be saved half-filled and only becomes eligible for ranking once all
/// four players and both scores are present.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: i64,
    pub team1_player1_id: Option<i64>,
    pub team1_player2_id: Option<i64>,
    pub team2_player1_id: Option<i64>,
    pub team2_player2_id: Option<i64>,
    pub team1_score: Option<i64>,
    pub team2_score: Option<i64>,
    pub date_played: String,
    /// "M" / "F" / "X", stamped from the participants' genders on every
    /// write; NULL only on legacy rows (see `backfill_gender_types`).
    pub gender_type: Option<String>,
    pub created_at: String,
}

/// Fields accepted when recording or editing a match.
#[derive(Debug, Clone, Default)]
pub struct MatchWrite {
    pub team1_player1_id: Option<i64>,
    pub team1_player2_id: Option<i64>,
    pub team2_player1_id: Option<i64>,
    pub team2_player2_id: Option<i64>,
    pub team1_score: Option<i64>,
    pub team2_score: Option<i64>,
    pub date_played: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AmericanoTournament {
    pub id: i64,
    pub name: String,
    pub play_date: String,
    pub num_players: i64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AmericanoRound {
    pub id: i64,
    pub tournament_id: i64,
    pub number: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AmericanoMatch {
    pub id: i64,
    pub round_id: i64,
    pub court_number: Option<i64>,
    pub team1_player1_id: Option<i64>,
    pub team1_player2_id: Option<i64>,
    pub team2_player1_id: Option<i64>,
    pub team2_player2_id: Option<i64>,
    pub team1_points: Option<i64>,
    pub team2_points: Option<i64>,
}

/// One standings line: the persisted per-player counters joined with the
/// player's name. The counters are zeroed and rebuilt wholesale by the
/// standings engine, never incrementally adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StandingRow {
    pub player_id: i64,
    pub player_name: String,
    pub wins: i64,
    pub losses: i64,
    pub matches_played: i64,
    pub points_for: i64,
    pub points_against: i64,
}

impl StandingRow {
    pub fn points_diff(&self) -> i64 {
        self.points_for - self.points_against
    }
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL COLLATE NOCASE UNIQUE,
                gender TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                team1_player1_id INTEGER REFERENCES players(id),
                team1_player2_id INTEGER REFERENCES players(id),
                team2_player1_id INTEGER REFERENCES players(id),
                team2_player2_id INTEGER REFERENCES players(id),
                team1_score INTEGER,
                team2_score INTEGER,
                date_played TEXT NOT NULL,
                gender_type TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_matches_gender_type ON matches(gender_type)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS americano_tournaments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                play_date TEXT NOT NULL,
                num_players INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS americano_players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament_id INTEGER NOT NULL REFERENCES americano_tournaments(id) ON DELETE CASCADE,
                player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                UNIQUE(tournament_id, player_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS americano_rounds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament_id INTEGER NOT NULL REFERENCES americano_tournaments(id) ON DELETE CASCADE,
                number INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(tournament_id, number)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS americano_matches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                round_id INTEGER NOT NULL REFERENCES americano_rounds(id) ON DELETE CASCADE,
                court_number INTEGER,
                team1_player1_id INTEGER REFERENCES players(id) ON DELETE SET NULL,
                team1_player2_id INTEGER REFERENCES players(id) ON DELETE SET NULL,
                team2_player1_id INTEGER REFERENCES players(id) ON DELETE SET NULL,
                team2_player2_id INTEGER REFERENCES players(id) ON DELETE SET NULL,
                team1_points INTEGER,
                team2_points INTEGER
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS americano_player_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament_id INTEGER NOT NULL REFERENCES americano_tournaments(id) ON DELETE CASCADE,
                player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                wins INTEGER NOT NULL DEFAULT 0,
                losses INTEGER NOT NULL DEFAULT 0,
                matches_played INTEGER NOT NULL DEFAULT 0,
                points_for INTEGER NOT NULL DEFAULT 0,
                points_against INTEGER NOT NULL DEFAULT 0,
                UNIQUE(tournament_id, player_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Players ───────────────────────────────────────────────────────

    pub async fn create_player(
        &self,
        name: &str,
        gender: Option<&str>,
    ) -> Result<Player, sqlx::Error> {
        let row = sqlx::query_as::<_, Player>(
            "INSERT INTO players (name, gender) VALUES (?, ?) RETURNING id, name, gender, created_at",
        )
        .bind(name)
        .bind(gender)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_player(&self, id: i64) -> Result<Option<Player>, sqlx::Error> {
        let row = sqlx::query_as::<_, Player>(
            "SELECT id, name, gender, created_at FROM players WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Case-insensitive lookup (the name column carries NOCASE collation).
    pub async fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, sqlx::Error> {
        let row = sqlx::query_as::<_, Player>(
            "SELECT id, name, gender, created_at FROM players WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch the player with this name, creating it without a gender if it
    /// does not exist yet. Falls back to a re-fetch when the unique
    /// constraint is hit by a concurrent writer.
    pub async fn get_or_create_player(&self, name: &str) -> Result<Player, sqlx::Error> {
        let name = name.trim();
        if let Some(player) = self.get_player_by_name(name).await? {
            return Ok(player);
        }
        match self.create_player(name, None).await {
            Ok(player) => Ok(player),
            Err(e) if e.to_string().contains("UNIQUE") => {
                self.get_player_by_name(name).await?.ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_players(&self) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Player>(
            "SELECT id, name, gender, created_at FROM players ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ── Matches ───────────────────────────────────────────────────────

    /// Genders of the four slots, in order. A missing player or an
    /// unrecorded gender reads as `None`.
    async fn slot_genders(
        &self,
        slots: [Option<i64>; 4],
    ) -> Result<[Option<Gender>; 4], sqlx::Error> {
        let mut genders = [None; 4];
        for (i, slot) in slots.into_iter().enumerate() {
            if let Some(id) = slot {
                genders[i] = self
                    .get_player(id)
                    .await?
                    .and_then(|p| p.gender)
                    .and_then(|g| Gender::from_str_name(&g));
            }
        }
        Ok(genders)
    }

    pub async fn create_match(&self, write: &MatchWrite) -> Result<Match, sqlx::Error> {
        let genders = self
            .slot_genders([
                write.team1_player1_id,
                write.team1_player2_id,
                write.team2_player1_id,
                write.team2_player2_id,
            ])
            .await?;
        let gender_type = compute_gender_type(&genders).to_str_name();

        let row = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (
                team1_player1_id, team1_player2_id, team2_player1_id, team2_player2_id,
                team1_score, team2_score, date_played, gender_type
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, team1_player1_id, team1_player2_id, team2_player1_id,
                      team2_player2_id, team1_score, team2_score, date_played,
                      gender_type, created_at
            "#,
        )
        .bind(write.team1_player1_id)
        .bind(write.team1_player2_id)
        .bind(write.team2_player1_id)
        .bind(write.team2_player2_id)
        .bind(write.team1_score)
        .bind(write.team2_score)
        .bind(&write.date_played)
        .bind(gender_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a match in place, restamping its gender category from the
    /// new lineup.
    pub async fn update_match(
        &self,
        id: i64,
        write: &MatchWrite,
    ) -> Result<Option<Match>, sqlx::Error> {
        let genders = self
            .slot_genders([
                write.team1_player1_id,
                write.team1_player2_id,
                write.team2_player1_id,
                write.team2_player2_id,
            ])
            .await?;
        let gender_type = compute_gender_type(&genders).to_str_name();

        let result = sqlx::query(
            r#"
            UPDATE matches SET
                team1_player1_id = ?, team1_player2_id = ?,
                team2_player1_id = ?, team2_player2_id = ?,
                team1_score = ?, team2_score = ?,
                date_played = ?, gender_type = ?
            WHERE id = ?
            "#,
        )
        .bind(write.team1_player1_id)
        .bind(write.team1_player2_id)
        .bind(write.team2_player1_id)
        .bind(write.team2_player2_id)
        .bind(write.team1_score)
        .bind(write.team2_score)
        .bind(&write.date_played)
        .bind(gender_type)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_match(id).await
    }

    pub async fn get_match(&self, id: i64) -> Result<Option<Match>, sqlx::Error> {
        let row = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, team1_player1_id, team1_player2_id, team2_player1_id,
                   team2_player2_id, team1_score, team2_score, date_played,
                   gender_type, created_at
            FROM matches WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, team1_player1_id, team1_player2_id, team2_player1_id,
                   team2_player2_id, team1_score, team2_score, date_played,
                   gender_type, created_at
            FROM matches ORDER BY date_played DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_match(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp the gender category on legacy rows where it is NULL.
    /// Returns the number of matches updated.
    pub async fn backfill_gender_types(&self) -> Result<u64, sqlx::Error> {
        let rows = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, team1_player1_id, team1_player2_id, team2_player1_id,
                   team2_player2_id, team1_score, team2_score, date_played,
                   gender_type, created_at
            FROM matches WHERE gender_type IS NULL ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stamped = Vec::with_capacity(rows.len());
        for m in &rows {
            let genders = self
                .slot_genders([
                    m.team1_player1_id,
                    m.team1_player2_id,
                    m.team2_player1_id,
                    m.team2_player2_id,
                ])
                .await?;
            stamped.push((m.id, compute_gender_type(&genders).to_str_name()));
        }

        let mut tx = self.pool.begin().await?;
        for (id, gender_type) in &stamped {
            sqlx::query("UPDATE matches SET gender_type = ? WHERE id = ?")
                .bind(gender_type)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(stamped.len() as u64)
    }

    // ── Americano tournaments ─────────────────────────────────────────

    /// Create a tournament with its roster. Membership rows and
    /// zero-valued stats rows are initialized in the same transaction.
    pub async fn create_americano_tournament(
        &self,
        name: &str,
        play_date: &str,
        player_ids: &[i64],
    ) -> Result<AmericanoTournament, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let tournament = sqlx::query_as::<_, AmericanoTournament>(
            r#"
            INSERT INTO americano_tournaments (name, play_date, num_players)
            VALUES (?, ?, ?)
            RETURNING id, name, play_date, num_players, is_active, created_at
            "#,
        )
        .bind(name)
        .bind(play_date)
        .bind(player_ids.len() as i64)
        .fetch_one(&mut *tx)
        .await?;

        for pid in player_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO americano_players (tournament_id, player_id) VALUES (?, ?)",
            )
            .bind(tournament.id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "INSERT OR IGNORE INTO americano_player_stats (tournament_id, player_id) VALUES (?, ?)",
            )
            .bind(tournament.id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(tournament)
    }

    pub async fn get_americano_tournament(
        &self,
        id: i64,
    ) -> Result<Option<AmericanoTournament>, sqlx::Error> {
        let row = sqlx::query_as::<_, AmericanoTournament>(
            "SELECT id, name, play_date, num_players, is_active, created_at FROM americano_tournaments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Active tournaments whose play date is today or later, soonest first.
    pub async fn list_ongoing_tournaments(
        &self,
        today: &str,
    ) -> Result<Vec<AmericanoTournament>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AmericanoTournament>(
            r#"
            SELECT id, name, play_date, num_players, is_active, created_at
            FROM americano_tournaments
            WHERE is_active = 1 AND play_date >= ?
            ORDER BY play_date, name
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Tournaments whose play date has passed, most recent first.
    pub async fn list_finished_tournaments(
        &self,
        today: &str,
    ) -> Result<Vec<AmericanoTournament>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AmericanoTournament>(
            r#"
            SELECT id, name, play_date, num_players, is_active, created_at
            FROM americano_tournaments
            WHERE play_date < ?
            ORDER BY play_date DESC, name
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_americano_tournament(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM americano_tournaments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn americano_tournament_players(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Player>(
            r#"
            SELECT p.id, p.name, p.gender, p.created_at
            FROM players p
            JOIN americano_players ap ON ap.player_id = p.id
            WHERE ap.tournament_id = ?
            ORDER BY p.name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn americano_player_ids(&self, tournament_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT player_id FROM americano_players WHERE tournament_id = ? ORDER BY player_id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ── Americano rounds & matches ────────────────────────────────────

    /// Create the next round (number = count + 1) with one empty match per
    /// four tournament players. Returns None if the tournament is missing.
    pub async fn create_next_round(
        &self,
        tournament_id: i64,
    ) -> Result<Option<AmericanoRound>, sqlx::Error> {
        let Some(tournament) = self.get_americano_tournament(tournament_id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM americano_rounds WHERE tournament_id = ?")
                .bind(tournament_id)
                .fetch_one(&mut *tx)
                .await?;

        let round = sqlx::query_as::<_, AmericanoRound>(
            r#"
            INSERT INTO americano_rounds (tournament_id, number) VALUES (?, ?)
            RETURNING id, tournament_id, number, created_at
            "#,
        )
        .bind(tournament_id)
        .bind(count + 1)
        .fetch_one(&mut *tx)
        .await?;

        for _ in 0..crate::americano::matches_per_round(tournament.num_players) {
            sqlx::query("INSERT INTO americano_matches (round_id) VALUES (?)")
                .bind(round.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Some(round))
    }

    pub async fn list_rounds(&self, tournament_id: i64) -> Result<Vec<AmericanoRound>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AmericanoRound>(
            "SELECT id, tournament_id, number, created_at FROM americano_rounds WHERE tournament_id = ? ORDER BY number",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_round(&self, round_id: i64) -> Result<Option<AmericanoRound>, sqlx::Error> {
        let row = sqlx::query_as::<_, AmericanoRound>(
            "SELECT id, tournament_id, number, created_at FROM americano_rounds WHERE id = ?",
        )
        .bind(round_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Matches of a round, courts first in court order, then court-less
    /// matches by id.
    pub async fn list_round_matches(
        &self,
        round_id: i64,
    ) -> Result<Vec<AmericanoMatch>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AmericanoMatch>(
            r#"
            SELECT id, round_id, court_number, team1_player1_id, team1_player2_id,
                   team2_player1_id, team2_player2_id, team1_points, team2_points
            FROM americano_matches
            WHERE round_id = ?
            ORDER BY court_number IS NULL, court_number, id
            "#,
        )
        .bind(round_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All matches of a tournament across its rounds, in round order.
    pub async fn list_tournament_matches(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<AmericanoMatch>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AmericanoMatch>(
            r#"
            SELECT m.id, m.round_id, m.court_number, m.team1_player1_id,
                   m.team1_player2_id, m.team2_player1_id, m.team2_player2_id,
                   m.team1_points, m.team2_points
            FROM americano_matches m
            JOIN americano_rounds r ON r.id = m.round_id
            WHERE r.tournament_id = ?
            ORDER BY r.number, m.id
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Persist one validated match assignment (lineup, court, scores).
    pub async fn apply_match_assignment(
        &self,
        a: &crate::americano::MatchAssignment,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE americano_matches SET
                team1_player1_id = ?, team1_player2_id = ?,
                team2_player1_id = ?, team2_player2_id = ?,
                court_number = ?, team1_points = ?, team2_points = ?
            WHERE id = ?
            "#,
        )
        .bind(a.team1_player1)
        .bind(a.team1_player2)
        .bind(a.team2_player1)
        .bind(a.team2_player2)
        .bind(a.court_number)
        .bind(a.team1_points)
        .bind(a.team2_points)
        .bind(a.match_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a round (its matches cascade) and renumber the remaining
    /// rounds of the tournament back to a contiguous 1..N.
    pub async fn delete_round(&self, round_id: i64) -> Result<bool, sqlx::Error> {
        let Some(round) = self.get_round(round_id).await? else {
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM americano_rounds WHERE id = ?")
            .bind(round_id)
            .execute(&mut *tx)
            .await?;

        let remaining = sqlx::query_as::<_, AmericanoRound>(
            "SELECT id, tournament_id, number, created_at FROM americano_rounds WHERE tournament_id = ? ORDER BY number",
        )
        .bind(round.tournament_id)
        .fetch_all(&mut *tx)
        .await?;

        for (i, r) in remaining.iter().enumerate() {
            let wanted = (i + 1) as i64;
            if r.number != wanted {
                sqlx::query("UPDATE americano_rounds SET number = ? WHERE id = ?")
                    .bind(wanted)
                    .bind(r.id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    // ── Americano standings ───────────────────────────────────────────

    /// Recompute the tournament's standings from scratch and overwrite the
    /// stored stats rows in one transaction: read the match set, rebuild
    /// the counters, bulk write. See `standings::recompute_stats` for the
    /// aggregation rules.
    pub async fn recompute_americano_standings(
        &self,
        tournament_id: i64,
    ) -> Result<(), sqlx::Error> {
        let player_ids = self.americano_player_ids(tournament_id).await?;
        let matches = self.list_tournament_matches(tournament_id).await?;
        let stats = standings::recompute_stats(&player_ids, &matches);

        let mut tx = self.pool.begin().await?;

        // Every member has a stats row, and every row restarts from zero.
        for pid in &player_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO americano_player_stats (tournament_id, player_id) VALUES (?, ?)",
            )
            .bind(tournament_id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
        }
        sqlx::query(
            r#"
            UPDATE americano_player_stats
            SET wins = 0, losses = 0, matches_played = 0, points_for = 0, points_against = 0
            WHERE tournament_id = ?
            "#,
        )
        .bind(tournament_id)
        .execute(&mut *tx)
        .await?;

        for (pid, st) in &stats {
            sqlx::query(
                r#"
                UPDATE americano_player_stats
                SET wins = ?, losses = ?, matches_played = ?, points_for = ?, points_against = ?
                WHERE tournament_id = ? AND player_id = ?
                "#,
            )
            .bind(st.wins)
            .bind(st.losses)
            .bind(st.matches_played)
            .bind(st.points_for)
            .bind(st.points_against)
            .bind(tournament_id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Stored standings joined with player names, unordered; the standings
    /// engine sorts and assigns positions.
    pub async fn americano_standings(
        &self,
        tournament_id: i64,
    ) -> Result<Vec<StandingRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, StandingRow>(
            r#"
            SELECT s.player_id, p.name AS player_name, s.wins, s.losses,
                   s.matches_played, s.points_for, s.points_against
            FROM americano_player_stats s
            JOIN players p ON p.id = s.player_id
            WHERE s.tournament_id = ?
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
