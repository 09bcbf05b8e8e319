use crate::analysis::champion_stats::ChampionStats;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ChampionRow {
    #[tabled(rename = "Champion")]
    champion: String,
    #[tabled(rename = "Games")]
    games: u32,
    #[tabled(rename = "Wins")]
    wins: u32,
    #[tabled(rename = "Kills")]
    kills: u32,
    #[tabled(rename = "Deaths")]
    deaths: u32,
    #[tabled(rename = "Assists")]
    assists: u32,
    #[tabled(rename = "Win Rate")]
    win_rate: String,
    #[tabled(rename = "KDA")]
    kda: String,
}

impl From<&ChampionStats> for ChampionRow {
    fn from(stats: &ChampionStats) -> Self {
        ChampionRow {
            champion: stats.name.clone(),
            games: stats.games,
            wins: stats.wins,
            kills: stats.kills,
            deaths: stats.deaths,
            assists: stats.assists,
            win_rate: stats.win_rate_label(),
            kda: stats.kda.to_string(),
        }
    }
}

/// Plain table, rows in the order given.
pub fn champion_table(ranked: &[ChampionStats]) -> String {
    let mut table = Table::new(ranked.iter().map(ChampionRow::from));
    table.with(Style::rounded());
    table.to_string()
}

pub fn display_champion_stats(ranked: &[ChampionStats], player_name: &str) {
    println!(
        "\n{}",
        format!("🎮 Most Played Champions for {} ", player_name)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if ranked.is_empty() {
        println!("{}", "No games found for this player".yellow());
        return;
    }

    let games: u32 = ranked.iter().map(|s| s.games).sum();
    let wins: u32 = ranked.iter().map(|s| s.wins).sum();
    let losses: u32 = ranked.iter().map(ChampionStats::losses).sum();
    let win_rate = wins as f64 / games as f64 * 100.0;
    println!(
        "{} {} W / {} L ({:.1}% WR) across {} champions\n",
        "📈 Overall:".bold(),
        wins.to_string().green(),
        losses.to_string().red(),
        win_rate,
        ranked.len()
    );

    println!("{}\n", champion_table(ranked));
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
