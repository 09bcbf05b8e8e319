use crate::api::models::{MatchDto, ParticipantDto, PlayerIdentity};
use crate::error::AppError;
use crate::rate_limit::Throttle;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Running totals for one champion while matches are being folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionTally {
    pub games: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

impl ChampionTally {
    fn record(&mut self, participant: &ParticipantDto) {
        self.games += 1;
        if participant.win {
            self.wins += 1;
        }
        self.kills += participant.kills;
        self.deaths += participant.deaths;
        self.assists += participant.assists;
    }

    fn finish(self, name: String) -> ChampionStats {
        let win_rate = if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64 * 100.0
        };

        let kda = if self.deaths == 0 {
            Kda::Perfect
        } else {
            Kda::Ratio((self.kills + self.assists) as f64 / self.deaths as f64)
        };

        ChampionStats {
            name,
            games: self.games,
            wins: self.wins,
            kills: self.kills,
            deaths: self.deaths,
            assists: self.assists,
            win_rate,
            kda,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kda {
    /// No deaths at all.
    Perfect,
    Ratio(f64),
}

impl fmt::Display for Kda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kda::Perfect => f.write_str("Perfect"),
            Kda::Ratio(ratio) => f.write_str(&fixed2(*ratio)),
        }
    }
}

/// Final per-champion numbers, only available once every match is folded.
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionStats {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Percentage; shown with two decimals by `win_rate_label`.
    pub win_rate: f64,
    pub kda: Kda,
}

impl ChampionStats {
    pub fn win_rate_label(&self) -> String {
        format!("{}%", fixed2(self.win_rate))
    }

    pub fn losses(&self) -> u32 {
        self.games - self.wins
    }
}

// Two decimals from the exact binary value, so 3/40 (stored just under 0.075)
// gives 0.07. Exact ties such as 3.125 go up to 3.13.
fn fixed2(value: f64) -> String {
    let exact = format!("{:.40}", value);
    let tie = exact
        .split_once('.')
        .map(|(_, frac)| frac[2..].starts_with('5') && frac[3..].bytes().all(|b| b == b'0'))
        .unwrap_or(false);

    if tie {
        format!("{:.2}", value + 0.005)
    } else {
        format!("{:.2}", value)
    }
}

pub struct ChampionStatsTracker {
    tallies: HashMap<String, ChampionTally>,
}

impl ChampionStatsTracker {
    pub fn new() -> Self {
        ChampionStatsTracker {
            tallies: HashMap::new(),
        }
    }

    pub fn add_game(&mut self, participant: &ParticipantDto) {
        self.tallies
            .entry(participant.champion_name.clone())
            .or_default()
            .record(participant);
    }

    pub fn finish(self) -> HashMap<String, ChampionStats> {
        self.tallies
            .into_iter()
            .map(|(name, tally)| (name.clone(), tally.finish(name)))
            .collect()
    }
}

impl Default for ChampionStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetches every match in order through `fetch_match`, one at a time, and
/// folds the queried player's record into per-champion stats.
///
/// Matches the player does not appear in are skipped. The first fetch error
/// aborts the whole run; nothing folded before it is returned.
pub fn aggregate<F>(
    identity: &PlayerIdentity,
    match_ids: &[String],
    fetch_match: &Throttle<F>,
) -> Result<HashMap<String, ChampionStats>, AppError>
where
    F: Fn(&str) -> Result<MatchDto, AppError>,
{
    let mut tracker = ChampionStatsTracker::new();

    for match_id in match_ids {
        let Some(detail) = fetch_match.call(match_id.as_str()) else {
            debug!(%match_id, "fetch superseded, match not counted");
            continue;
        };
        let detail = detail?;

        match detail.participant(identity) {
            Some(participant) => tracker.add_game(participant),
            None => warn!(%match_id, puuid = identity.short(), "player missing from match, skipping"),
        }
    }

    Ok(tracker.finish())
}

/// Most played first. Equal game counts fall back to champion name.
pub fn ranked_by_games(stats: HashMap<String, ChampionStats>) -> Vec<ChampionStats> {
    let mut ranked: Vec<ChampionStats> = stats.into_values().collect();
    ranked.sort_by(|a, b| b.games.cmp(&a.games).then_with(|| a.name.cmp(&b.name)));
    ranked
}
