use clap::{Parser, Subcommand};
use log::info;
use rand::Rng;
use server::{RankingService, ScoreUpdate};
use shared::TopEntry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding every player's best score
    #[arg(long, env = "RANKING_SCORE_FILE", default_value = "ranking.data")]
    score_file: PathBuf,

    /// File holding the current top 3
    #[arg(long, env = "RANKING_TOP3_FILE", default_value = "top3.data")]
    top3_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the ranking files if they do not exist yet
    Init,

    /// Show the top 3 players
    Top {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a player's best score
    Get { username: String },

    /// Submit a score for a player
    Submit { username: String, score: u64 },

    /// Run concurrent game sessions submitting random scores (writes to the ranking files)
    Simulate {
        /// Number of concurrent sessions
        #[arg(short, long, default_value = "8")]
        sessions: u32,

        /// Scores submitted by each session
        #[arg(short, long, default_value = "20")]
        rounds: u32,

        /// Highest score a session can report
        #[arg(short, long, default_value = "1000")]
        max_score: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    if let Command::Init = args.command {
        let created =
            RankingService::ensure_backing_files(&args.score_file, &args.top3_file).await?;
        if created.is_empty() {
            println!("Ranking files already exist");
        }
        for path in created {
            println!("Created {}", path.display());
        }
        return Ok(());
    }

    let rankings = Arc::new(RankingService::new());
    rankings
        .load_rankings(&args.score_file, &args.top3_file)
        .await?;

    match args.command {
        Command::Init => {}
        Command::Top { json } => {
            let top = rankings.get_top3().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else {
                print_top(&top);
            }
        }
        Command::Get { username } => {
            let score = rankings.get_user_highscore(&username).await;
            println!("{} : {}", username, score);
        }
        Command::Submit { username, score } => {
            match rankings.submit_score(&username, score).await? {
                ScoreUpdate::Unchanged { best } => {
                    println!("{} does not beat {}'s best score of {}", score, username, best);
                }
                ScoreUpdate::PersonalBest => {
                    println!("New best score for {}: {}", username, score);
                }
                ScoreUpdate::TopThree => {
                    println!("New best score for {}: {} (top 3)", username, score);
                    print_top(&rankings.get_top3().await);
                }
            }
        }
        Command::Simulate {
            sessions,
            rounds,
            max_score,
        } => {
            let improvements = simulate(&rankings, sessions, rounds, max_score).await?;
            println!(
                "{} sessions submitted {} scores, {} were new best scores",
                sessions,
                u64::from(sessions) * u64::from(rounds),
                improvements
            );
            print_top(&rankings.get_top3().await);
        }
    }

    Ok(())
}

/// Spawns one task per session, all reporting scores to the same service
async fn simulate(
    rankings: &Arc<RankingService>,
    sessions: u32,
    rounds: u32,
    max_score: u64,
) -> Result<u64, Box<dyn std::error::Error>> {
    info!("Starting {} simulated sessions", sessions);

    let mut handles = Vec::with_capacity(sessions as usize);
    for _ in 0..sessions {
        let rankings = Arc::clone(rankings);
        handles.push(tokio::spawn(async move {
            let mut improvements = 0u64;
            for _ in 0..rounds {
                let (player, score) = {
                    let mut rng = rand::thread_rng();
                    (rng.gen_range(0..sessions), rng.gen_range(0..=max_score))
                };
                let username = format!("player{}", player);
                if rankings.refresh_user_highscore(&username, score).await? {
                    improvements += 1;
                }
            }
            Ok::<u64, server::RankingError>(improvements)
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await??;
    }
    Ok(total)
}

fn print_top(top: &[TopEntry]) {
    for (place, entry) in top.iter().enumerate() {
        println!("{}. {} : {}", place + 1, entry.username, entry.score);
    }
}
