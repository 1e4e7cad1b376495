use crate::check::{
    BrokerTarget, Check, CheckMode, CheckRequest, CheckResult, Status,
};
use crate::config::Config;
use crate::queue_list::parse_queue_list;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "check_rabbitmq_queues",
    about = "Check RabbitMQ queues through the management API"
)]
pub struct Cli {
    #[arg(
        short = 'c',
        long,
        value_name = "COMMAND",
        help = "queue_synchronisation, queue_count, queue_consumers or \
                queue_messages"
    )]
    pub command: Option<String>,

    #[arg(
        short = 'e',
        long,
        value_name = "N",
        allow_hyphen_values = true,
        help = "Threshold; its meaning depends on the command"
    )]
    pub expected: Option<String>,

    #[arg(
        short = 'q',
        long = "queue_list",
        value_name = "NAME:COUNT,...",
        help = "Required consumers per queue, used by queue_consumers"
    )]
    pub queue_list: Option<String>,

    #[arg(
        short = 'v',
        long,
        value_name = "VHOST",
        help = "Percent-encoded virtual host [env: RABBITMQ_VHOST]"
    )]
    pub vhost: Option<String>,

    #[arg(short = 'u', long, help = "[env: RABBITMQ_USERNAME]")]
    pub username: Option<String>,

    #[arg(short = 'p', long, help = "[env: RABBITMQ_PASSWORD]")]
    pub password: Option<String>,

    #[arg(
        short = 'H',
        long,
        help = "Broker hostname, port 15672 is implied [env: RABBITMQ_HOST]"
    )]
    pub host: Option<String>,

    #[arg(long, help = "Print diagnostics before the result")]
    pub debug: bool,
}

impl Cli {
    /// Resolves flags and environment into a request, or into the result
    /// to report straight away when the invocation cannot be run.
    ///
    /// The command is looked at first so an unknown command gives the same
    /// answer whatever else was passed.
    pub fn into_request(self, config: &Config) -> Result<CheckRequest, CheckResult> {
        let mode = match self.command.as_deref().map(str::parse::<CheckMode>) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                log::warn!("{}", e);
                return Err(CheckResult::unknown_command());
            }
            None => return Err(CheckResult::unknown_command()),
        };

        let check = match mode {
            CheckMode::QueueConsumers => {
                let list = self
                    .queue_list
                    .as_deref()
                    .ok_or_else(|| missing_flag("--queue_list", mode))?;
                let required = parse_queue_list(list).map_err(|e| {
                    CheckResult::new(
                        Status::Unknown,
                        format!("invalid --queue_list: {:#}", e),
                    )
                })?;
                Check::QueueConsumers { required }
            }
            CheckMode::QueueCount => Check::QueueCount {
                expected: self.expected_for(mode)?,
            },
            CheckMode::QueueSynchronisation => Check::QueueSynchronisation {
                min_synchronised_slaves: self.expected_for(mode)?,
            },
            CheckMode::QueueMessages => Check::QueueMessages {
                max_messages: self.expected_for(mode)?,
            },
        };

        Ok(CheckRequest {
            check,
            target: BrokerTarget {
                host: self.host.unwrap_or_else(|| config.host.clone()),
                vhost: self.vhost.unwrap_or_else(|| config.vhost.clone()),
                username: self
                    .username
                    .unwrap_or_else(|| config.username.clone()),
                password: self
                    .password
                    .unwrap_or_else(|| config.password.clone()),
            },
            debug: self.debug,
        })
    }

    // Parsed here rather than by clap so a bad threshold cannot mask an
    // unknown command.
    fn expected_for(&self, mode: CheckMode) -> Result<u64, CheckResult> {
        let raw = self
            .expected
            .as_deref()
            .ok_or_else(|| missing_flag("--expected", mode))?;

        raw.trim().parse::<u64>().map_err(|e| {
            CheckResult::new(
                Status::Unknown,
                format!("invalid --expected '{}': {}", raw, e),
            )
        })
    }
}

fn missing_flag(flag: &str, mode: CheckMode) -> CheckResult {
    CheckResult::new(Status::Unknown, format!("{} is required for {}", flag, mode))
}
