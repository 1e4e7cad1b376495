use envconfig::Envconfig;

/// Environment fallbacks for anything not given on the command line.
#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "RABBITMQ_HOST", default = "localhost")]
    pub host: String,

    #[envconfig(from = "RABBITMQ_VHOST", default = "%2F")]
    pub vhost: String,

    #[envconfig(from = "RABBITMQ_USERNAME", default = "guest")]
    pub username: String,

    #[envconfig(from = "RABBITMQ_PASSWORD", default = "guest")]
    pub password: String,

    #[envconfig(from = "RUST_LOG", default = "warn")]
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Self::init_from_env()
    }

    /// `env_logger` filter for this run. `--debug` only raises this
    /// crate's level; dependencies stay at the configured one.
    pub fn log_filter(&self, debug: bool) -> String {
        if debug {
            format!("{},rabbitmq_queue_probe=debug", self.log_level)
        } else {
            self.log_level.clone()
        }
    }
}
