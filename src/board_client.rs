use crate::{
    command::Command,
    config::{
        BoardConfig,
        Endpoints,
    },
    error::{
        BoardError,
        Result,
    },
    snapshot::{
        CanStartDto,
        GameSnapshot,
        GameStatus,
        GameStatusDto,
        StatusEnvelope,
    },
};
use std::{
    fmt,
    time::Duration,
};
use tracing::{
    debug,
    warn,
};

/// HTTP access to the scoreboard's status and control endpoints.
#[derive(Clone)]
pub struct BoardClient {
    base_url: String,
    http: reqwest::Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl BoardClient {
    pub fn new(config: &BoardConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url,
            http,
            endpoints: config.endpoints.clone(),
            timeout: config.request_timeout,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Current game state. While the game is stopped the can-start flag is
    /// fetched as well; if that second request fails the flag is left unset.
    pub async fn fetch_snapshot(&self) -> Result<GameSnapshot> {
        let body = self.get_ok(&self.endpoints.status).await?;
        let dto: GameStatusDto = serde_json::from_slice(&body)?;
        let mut snapshot = GameSnapshot::from(dto);
        if snapshot.status == GameStatus::Stopped {
            snapshot.can_start = match self.can_start().await {
                Ok(can_start) => Some(can_start),
                Err(err) => {
                    warn!(%err, "can-start query failed");
                    None
                }
            };
        }
        Ok(snapshot)
    }

    pub async fn can_start(&self) -> Result<bool> {
        let body = self.get_ok(&self.endpoints.can_start).await?;
        let dto: CanStartDto = serde_json::from_slice(&body)?;
        Ok(dto.can_start)
    }

    /// Sends `command` without a local guard; see [`Command::check`].
    pub async fn send(&self, command: &Command) -> Result<()> {
        let path = command.path(&self.endpoints);
        self.get_ok(&path).await?;
        debug!(%command, "command accepted by scoreboard");
        Ok(())
    }

    async fn get_ok(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| self.classify(err))?;
        let status = res.status();
        let bytes = res.bytes().await.map_err(|err| self.classify(err))?;
        if !status.is_success() {
            return Err(BoardError::Server {
                url,
                status: status.to_string(),
            });
        }
        let envelope: StatusEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.status != "ok" {
            return Err(BoardError::Server {
                url,
                status: envelope.status,
            });
        }
        Ok(bytes.to_vec())
    }

    fn classify(&self, err: reqwest::Error) -> BoardError {
        if err.is_timeout() {
            BoardError::Timeout {
                millis: self.timeout.as_millis() as u64,
            }
        } else {
            BoardError::Network(err)
        }
    }
}

impl fmt::Display for BoardClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
