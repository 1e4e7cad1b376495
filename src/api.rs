use crate::check::BrokerTarget;
use crate::model::QueueRecord;
use log::debug;
use reqwest::Client;
use std::fmt;

/// Port of the management plugin's HTTP listener.
pub const API_PORT: u16 = 15672;

#[derive(Debug)]
pub enum FetchError {
    /// Connection failure, timeout or a non-2xx status.
    Transport(reqwest::Error),
    /// The body was not a JSON array of queue objects.
    MalformedBody(serde_json::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "{}", e),
            FetchError::MalformedBody(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::MalformedBody(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::MalformedBody(e)
    }
}

#[async_trait::async_trait]
pub trait QueueSource: Send + Sync {
    fn url(&self) -> &str;
    async fn fetch_queues(&self) -> Result<Vec<QueueRecord>, FetchError>;
}

pub struct ManagementClient {
    client: Client,
    url: String,
    username: String,
    password: String,
}

impl ManagementClient {
    pub fn new(target: &BrokerTarget) -> Self {
        Self::with_port(target, API_PORT)
    }

    /// Same as `new` but against a listener on another port.
    pub fn with_port(target: &BrokerTarget, port: u16) -> Self {
        Self {
            client: Client::new(),
            url: queues_url(&target.host, port, &target.vhost),
            username: target.username.clone(),
            password: target.password.clone(),
        }
    }
}

/// `vhost` is used as given; callers pass it already percent-encoded.
pub fn queues_url(host: &str, port: u16, vhost: &str) -> String {
    format!("http://{}:{}/api/queues/{}", host, port, vhost)
}

#[async_trait::async_trait]
impl QueueSource for ManagementClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_queues(&self) -> Result<Vec<QueueRecord>, FetchError> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?;

        debug!("RabbitMQ API responded with {}", response.status());

        let body = response.text().await?;
        let queues = serde_json::from_str::<Vec<QueueRecord>>(&body)?;

        debug!("Parsed {} queue records", queues.len());
        Ok(queues)
    }
}
