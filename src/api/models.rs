use serde::Deserialize;
use std::fmt;

/// Opaque account id (PUUID) resolved from a display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PlayerIdentity(String);

impl PlayerIdentity {
    #[allow(dead_code)]
    pub fn new(puuid: impl Into<String>) -> Self {
        PlayerIdentity(puuid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to recognise an id in logs.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Account V1 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: PlayerIdentity,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

// Summoner V4 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub puuid: PlayerIdentity,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summoner_level: i64,
}

// Match V5 response
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDto {
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub win: bool,
}

impl MatchDto {
    /// The participant record belonging to `identity`, if they played in this match.
    pub fn participant(&self, identity: &PlayerIdentity) -> Option<&ParticipantDto> {
        self.info
            .participants
            .iter()
            .find(|p| p.puuid == identity.as_str())
    }
}
