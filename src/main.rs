// Management CLI for the padel club database: scoped rankings, Americano
// standings, and operational backfills.

use clap::{Parser, Subcommand};
use serde_json::json;

use padel_club::config::Config;
use padel_club::db::Database;
use padel_club::ranking::{compute_ranking, RankingScope};
use padel_club::standings::rank_standings;

#[derive(Parser)]
#[command(name = "padel-club", about = "Padel club rankings and Americano standings")]
struct Cli {
    /// Override the database URL (defaults to $DATABASE_URL).
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the club's players.
    Players,
    /// Compute and print the global ranking for a scope.
    Ranking {
        /// all, male, female or mixed.
        #[arg(long, default_value = "all")]
        scope: String,
        #[arg(long)]
        json: bool,
    },
    /// Recompute and print a tournament's Americano standings.
    Standings {
        #[arg(long)]
        tournament: i64,
        #[arg(long)]
        json: bool,
    },
    /// Stamp the gender category on matches that lack one.
    BackfillGenderTypes,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load();
    let database_url = cli.database_url.unwrap_or(config.database_url);

    let db = Database::new(&database_url)
        .await
        .expect("Failed to initialize database");

    match cli.command {
        Command::Players => players(&db).await,
        Command::Ranking { scope, json } => ranking(&db, &scope, json).await,
        Command::Standings { tournament, json } => standings(&db, tournament, json).await,
        Command::BackfillGenderTypes => backfill_gender_types(&db).await,
    }
}

async fn players(db: &Database) {
    let players = db.list_players().await.expect("Failed to list players");
    if players.is_empty() {
        println!("(no players)");
        return;
    }
    for p in players {
        match p.gender.as_deref() {
            Some(g) => println!("- {} ({g})", p.name),
            None => println!("- {}", p.name),
        }
    }
}

async fn ranking(db: &Database, scope: &str, as_json: bool) {
    let scope = RankingScope::from_str_name(scope);
    let players = db.list_players().await.expect("Failed to list players");
    let matches = db.list_matches().await.expect("Failed to list matches");

    let ranking = compute_ranking(&players, &matches, scope);

    if as_json {
        let ranked: Vec<_> = ranking
            .ranked
            .iter()
            .map(|r| {
                json!({
                    "position": r.display_position,
                    "show_position": r.show_position,
                    "name": r.row.name,
                    "wins": r.row.wins,
                    "losses": r.row.losses(),
                    "matches_played": r.row.matches_played,
                    "win_rate": r.row.win_rate(),
                })
            })
            .collect();
        let unranked: Vec<_> = ranking.unranked.iter().map(|p| p.name.clone()).collect();
        let out = json!({
            "scope": ranking.scope,
            "ranked": ranked,
            "unranked": unranked,
        });
        println!("{}", serde_json::to_string_pretty(&out).expect("valid json"));
        return;
    }

    println!("Ranking ({})", ranking.scope);
    println!(
        "{:>4}  {:<24} {:>4} {:>6} {:>7} {:>8}",
        "#", "player", "wins", "losses", "played", "rate"
    );
    for r in &ranking.ranked {
        let position = if r.show_position {
            r.display_position.to_string()
        } else {
            String::new()
        };
        println!(
            "{:>4}  {:<24} {:>4} {:>6} {:>7} {:>7.2}%",
            position,
            r.row.name,
            r.row.wins,
            r.row.losses(),
            r.row.matches_played,
            r.row.win_rate()
        );
    }
    if !ranking.unranked.is_empty() {
        println!();
        println!("Unranked (no matches in scope):");
        for p in &ranking.unranked {
            println!("- {}", p.name);
        }
    }
}

async fn standings(db: &Database, tournament_id: i64, as_json: bool) {
    let Some(tournament) = db
        .get_americano_tournament(tournament_id)
        .await
        .expect("Failed to fetch tournament")
    else {
        eprintln!("Tournament {tournament_id} not found");
        std::process::exit(1);
    };

    db.recompute_americano_standings(tournament_id)
        .await
        .expect("Failed to recompute standings");
    let rows = db
        .americano_standings(tournament_id)
        .await
        .expect("Failed to fetch standings");
    let ranked = rank_standings(rows);

    if as_json {
        let standings: Vec<_> = ranked
            .iter()
            .map(|r| {
                json!({
                    "position": r.display_position,
                    "show_position": r.show_position,
                    "player": r.row.player_name,
                    "wins": r.row.wins,
                    "losses": r.row.losses,
                    "matches_played": r.row.matches_played,
                    "points_for": r.row.points_for,
                    "points_against": r.row.points_against,
                    "points_diff": r.row.points_diff(),
                })
            })
            .collect();
        let out = json!({
            "tournament": tournament.name,
            "play_date": tournament.play_date,
            "standings": standings,
        });
        println!("{}", serde_json::to_string_pretty(&out).expect("valid json"));
        return;
    }

    println!("{} ({})", tournament.name, tournament.play_date);
    println!(
        "{:>4}  {:<24} {:>4} {:>6} {:>7} {:>4} {:>4} {:>5}",
        "#", "player", "wins", "losses", "played", "PF", "PA", "diff"
    );
    for r in &ranked {
        let position = if r.show_position {
            r.display_position.to_string()
        } else {
            String::new()
        };
        println!(
            "{:>4}  {:<24} {:>4} {:>6} {:>7} {:>4} {:>4} {:>+5}",
            position,
            r.row.player_name,
            r.row.wins,
            r.row.losses,
            r.row.matches_played,
            r.row.points_for,
            r.row.points_against,
            r.row.points_diff()
        );
    }
}

async fn backfill_gender_types(db: &Database) {
    let updated = db
        .backfill_gender_types()
        .await
        .expect("Failed to backfill gender types");
    if updated == 0 {
        println!("No matches to backfill.");
    } else {
        tracing::info!("Backfilled gender category for {updated} matches");
        println!("Done. Updated {updated} matches.");
    }
}
