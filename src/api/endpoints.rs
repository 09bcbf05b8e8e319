// URL builders for the Riot endpoints this tool uses.
// Path segments go through `Url::path_segments_mut`, which percent-encodes them.

use crate::error::AppError;
use url::Url;

/// Upstream caps match-v5 id listings at 100 per request.
pub const MAX_MATCH_IDS_PER_REQUEST: u32 = 100;

fn with_segments(base: &Url, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::ConfigError(format!("{} cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Platform host: /lol/summoner/v4/summoners/by-name/{name}
pub fn summoner_by_name(platform: &Url, name: &str) -> Result<Url, AppError> {
    with_segments(platform, &["lol", "summoner", "v4", "summoners", "by-name", name])
}

/// Regional host: /riot/account/v1/accounts/by-riot-id/{game}/{tag}
pub fn account_by_riot_id(regional: &Url, game_name: &str, tag_line: &str) -> Result<Url, AppError> {
    with_segments(
        regional,
        &["riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line],
    )
}

/// Regional host: /lol/match/v5/matches/by-puuid/{puuid}/ids?start=&count=
pub fn match_ids_by_puuid(regional: &Url, puuid: &str, start: u32, count: u32) -> Result<Url, AppError> {
    let mut url = with_segments(regional, &["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"])?;
    url.query_pairs_mut()
        .append_pair("start", &start.to_string())
        .append_pair("count", &count.min(MAX_MATCH_IDS_PER_REQUEST).to_string());
    Ok(url)
}

/// Regional host: /lol/match/v5/matches/{matchId}
pub fn match_by_id(regional: &Url, match_id: &str) -> Result<Url, AppError> {
    with_segments(regional, &["lol", "match", "v5", "matches", match_id])
}
