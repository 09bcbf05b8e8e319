use crate::config::Config;
use crate::error::AppError;
use crate::rate_limit::UpstreamQuota;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::endpoints;
use super::models::*;

/// How a player was named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerName<'a> {
    /// Legacy summoner name, looked up on the platform host.
    Summoner(&'a str),
    /// `GameName#TAG`, looked up through account-v1 on the regional host.
    RiotId { game_name: &'a str, tag_line: &'a str },
}

impl<'a> PlayerName<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, AppError> {
        let raw = raw.trim();
        match raw.split_once('#') {
            None if raw.is_empty() => Err(AppError::InvalidRiotId(raw.to_string())),
            None => Ok(PlayerName::Summoner(raw)),
            Some((game_name, tag_line)) => {
                let (game_name, tag_line) = (game_name.trim(), tag_line.trim());
                if game_name.is_empty() || tag_line.is_empty() || tag_line.contains('#') {
                    return Err(AppError::InvalidRiotId(raw.to_string()));
                }
                Ok(PlayerName::RiotId { game_name, tag_line })
            }
        }
    }
}

pub struct RiotApiClient {
    config: Config,
    agent: ureq::Agent,
    quota: UpstreamQuota,
}

impl RiotApiClient {
    pub fn new(config: Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .user_agent(concat!("champ_stats/", env!("CARGO_PKG_VERSION")))
            .build();

        RiotApiClient {
            config,
            agent,
            quota: UpstreamQuota::riot_defaults(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sends a GET and decodes the JSON body. A 404 turns into `PlayerNotFound`
    /// when `player` is given, otherwise into a plain HTTP error.
    fn execute_request<T: DeserializeOwned>(&self, mut url: Url, player: Option<&str>) -> Result<T, AppError> {
        let host = url.host_str().unwrap_or_default().to_string();
        let path = url.path().to_string();

        self.quota.acquire(&host);
        debug!(%host, %path, "GET");

        // Added last so the key never shows up in logs or error messages.
        url.query_pairs_mut()
            .append_pair("api_key", self.config.api_key.expose_secret());

        match self.agent.request_url("GET", &url).call() {
            Ok(resp) => resp
                .into_json::<T>()
                .map_err(|e| AppError::JsonError(format!("{}: {}", path, e))),
            Err(ureq::Error::Status(code, resp)) => match (code, player) {
                (404, Some(name)) => Err(AppError::PlayerNotFound(name.to_string())),
                (429, _) => {
                    warn!(%host, "rate limited by the Riot API");
                    Err(AppError::RateLimited)
                }
                _ => Err(AppError::HttpError(format!(
                    "{} {} from {}",
                    code,
                    resp.status_text(),
                    path
                ))),
            },
            Err(ureq::Error::Transport(transport)) => Err(AppError::HttpError(format!(
                "{} while requesting {}: {}",
                transport.kind(),
                path,
                transport.message().unwrap_or("no details")
            ))),
        }
    }

    pub fn resolve_identity(&self, display_name: &str) -> Result<PlayerIdentity, AppError> {
        match PlayerName::parse(display_name)? {
            PlayerName::Summoner(name) => {
                let url = endpoints::summoner_by_name(&self.config.platform_url, name)?;
                let summoner: SummonerDto = self.execute_request(url, Some(name))?;
                debug!(summoner = %summoner.name, level = summoner.summoner_level, "resolved summoner");
                Ok(summoner.puuid)
            }
            PlayerName::RiotId { game_name, tag_line } => {
                let url = endpoints::account_by_riot_id(&self.config.regional_url, game_name, tag_line)?;
                let player = format!("{}#{}", game_name, tag_line);
                let account: AccountDto = self.execute_request(url, Some(&player))?;
                debug!(game_name = ?account.game_name, tag_line = ?account.tag_line, "resolved account");
                Ok(account.puuid)
            }
        }
    }

    /// Most recent first; `start` 0 is the latest match.
    pub fn list_recent_match_ids(
        &self,
        identity: &PlayerIdentity,
        start: u32,
        count: u32,
    ) -> Result<Vec<String>, AppError> {
        let url = endpoints::match_ids_by_puuid(&self.config.regional_url, identity.as_str(), start, count)?;
        self.execute_request(url, None)
    }

    pub fn fetch_match(&self, match_id: &str) -> Result<MatchDto, AppError> {
        let url = endpoints::match_by_id(&self.config.regional_url, match_id)?;
        self.execute_request(url, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base: &str) -> RiotApiClient {
        let config = Config::from_lookup(|key| match key {
            "RIOT_API_KEY" => Some("test-key".to_string()),
            "RIOT_PLATFORM_URL" | "RIOT_REGIONAL_URL" => Some(base.to_string()),
            "RIOT_HTTP_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        RiotApiClient::new(config)
    }

    #[test]
    fn player_names_parse() {
        assert_eq!(PlayerName::parse(" Faker ").unwrap(), PlayerName::Summoner("Faker"));
        assert_eq!(
            PlayerName::parse("Caps#EUW").unwrap(),
            PlayerName::RiotId { game_name: "Caps", tag_line: "EUW" }
        );

        for bad in ["", "#EUW", "Caps#", "a#b#c"] {
            assert!(matches!(PlayerName::parse(bad), Err(AppError::InvalidRiotId(_))), "{bad}");
        }
    }

    #[tokio::test]
    async fn resolves_summoner_name_on_platform_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/summoner/v4/summoners/by-name/Faker"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sid", "puuid": "puuid-faker-0001", "name": "Faker", "summonerLevel": 700
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let identity = client.resolve_identity("Faker").unwrap();
        assert_eq!(identity, PlayerIdentity::new("puuid-faker-0001"));
    }

    #[tokio::test]
    async fn resolves_riot_id_through_account_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/riot/account/v1/accounts/by-riot-id/Caps/EUW"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "puuid": "puuid-caps", "gameName": "Caps", "tagLine": "EUW"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        assert_eq!(client.resolve_identity("Caps#EUW").unwrap().as_str(), "puuid-caps");
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/summoner/v4/summoners/by-name/Ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.resolve_identity("Ghost").unwrap_err();
        assert_eq!(err, AppError::PlayerNotFound("Ghost".to_string()));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn other_statuses_are_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/summoner/v4/summoners/by-name/Busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lol/summoner/v4/summoners/by-name/Broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        assert_eq!(client.resolve_identity("Busy").unwrap_err(), AppError::RateLimited);

        let err = client.resolve_identity("Broken").unwrap_err();
        assert!(matches!(err, AppError::HttpError(ref msg) if msg.starts_with("503")));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn lists_match_ids_with_window_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/match/v5/matches/by-puuid/puuid-1/ids"))
            .and(query_param("start", "0"))
            .and(query_param("count", "50"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["EUW1_2", "EUW1_1"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let ids = client
            .list_recent_match_ids(&PlayerIdentity::new("puuid-1"), 0, 50)
            .unwrap();
        assert_eq!(ids, vec!["EUW1_2".to_string(), "EUW1_1".to_string()]);
    }

    #[tokio::test]
    async fn fetches_and_decodes_match_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/match/v5/matches/EUW1_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": { "matchId": "EUW1_1" },
                "info": { "participants": [
                    { "puuid": "puuid-1", "championName": "Ahri", "kills": 5, "deaths": 0, "assists": 10, "win": true }
                ]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let detail = client.fetch_match("EUW1_1").unwrap();
        let me = detail.participant(&PlayerIdentity::new("puuid-1")).unwrap();
        assert_eq!((me.kills, me.deaths, me.assists, me.win), (5, 0, 10, true));
    }

    #[tokio::test]
    async fn malformed_or_missing_match_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lol/match/v5/matches/EUW1_bad"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lol/match/v5/matches/EUW1_gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        assert!(matches!(client.fetch_match("EUW1_bad"), Err(AppError::JsonError(_))));
        assert!(matches!(client.fetch_match("EUW1_gone"), Err(AppError::HttpError(_))));
    }

    #[test]
    fn transport_failures_do_not_leak_the_key() {
        // Nothing listens on port 1.
        let client = client_for("http://127.0.0.1:1");
        let err = client.fetch_match("EUW1_1").unwrap_err();

        assert!(err.is_upstream());
        assert!(!err.to_string().contains("test-key"));
    }
}
