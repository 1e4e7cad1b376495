use crate::model::QueueRecord;
use crate::queue_list::ConsumerRequirements;
use anyhow::bail;
use std::fmt;

/// The four checks selectable with `--command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    QueueSynchronisation,
    QueueCount,
    QueueConsumers,
    QueueMessages,
}

impl CheckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckMode::QueueSynchronisation => "queue_synchronisation",
            CheckMode::QueueCount => "queue_count",
            CheckMode::QueueConsumers => "queue_consumers",
            CheckMode::QueueMessages => "queue_messages",
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "queue_synchronisation" => Ok(CheckMode::QueueSynchronisation),
            "queue_count" => Ok(CheckMode::QueueCount),
            "queue_consumers" => Ok(CheckMode::QueueConsumers),
            "queue_messages" => Ok(CheckMode::QueueMessages),
            _ => bail!("Unknown check command: {}", s),
        }
    }
}

/// A check together with the threshold it compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    QueueSynchronisation { min_synchronised_slaves: u64 },
    QueueCount { expected: u64 },
    QueueConsumers { required: ConsumerRequirements },
    QueueMessages { max_messages: u64 },
}

impl Check {
    pub fn mode(&self) -> CheckMode {
        match self {
            Check::QueueSynchronisation { .. } => {
                CheckMode::QueueSynchronisation
            }
            Check::QueueCount { .. } => CheckMode::QueueCount,
            Check::QueueConsumers { .. } => CheckMode::QueueConsumers,
            Check::QueueMessages { .. } => CheckMode::QueueMessages,
        }
    }

    pub fn evaluate(&self, queues: &[QueueRecord]) -> CheckResult {
        match self {
            Check::QueueSynchronisation {
                min_synchronised_slaves,
            } => check_queue_synchronisation(queues, *min_synchronised_slaves),
            Check::QueueCount { expected } => {
                check_queue_count(queues, *expected)
            }
            Check::QueueConsumers { required } => {
                check_queue_consumers(queues, required)
            }
            Check::QueueMessages { max_messages } => {
                check_queue_messages(queues, *max_messages)
            }
        }
    }
}

/// Where to find the management API and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerTarget {
    pub host: String,
    // Already percent-encoded, e.g. `%2F` for the default vhost.
    pub vhost: String,
    pub username: String,
    pub password: String,
}

/// Everything one probe invocation needs. Built once from flags and
/// environment, never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub check: Check,
    pub target: BrokerTarget,
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Critical,
    Unknown,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// Supervisor exit code. Every failure, including UNKNOWN, is 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Critical | Status::Unknown => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: Status,
    pub summary: String,
    pub details: Vec<String>,
    pub diagnostics: Vec<String>,
}

impl CheckResult {
    pub fn new(status: Status, summary: impl Into<String>) -> Self {
        Self {
            status,
            summary: summary.into(),
            details: vec![],
            diagnostics: vec![],
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn unknown_command() -> Self {
        Self::new(Status::Unknown, "unknown plugin error")
    }

    pub fn api_error(url: &str, detail: impl fmt::Display) -> Self {
        Self::new(Status::Critical, "RabbitMQ API Error").with_details(vec![
            format!(
                "Error occurred querying RabbitMQ API ({}):{}",
                url, detail
            ),
        ])
    }

    pub fn malformed_response(url: &str, detail: impl fmt::Display) -> Self {
        Self::new(Status::Critical, "RabbitMQ API Error").with_details(vec![
            format!(
                "Unexpected response from RabbitMQ API ({}):{}",
                url, detail
            ),
        ])
    }

    /// The text the supervisor shows: a status line, then one line per
    /// queue finding. Diagnostics are not part of it.
    pub fn render(&self) -> String {
        let mut out = format!("{} : {}", self.status.label(), self.summary);
        for line in &self.details {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }
}

pub fn check_queue_count(queues: &[QueueRecord], expected: u64) -> CheckResult {
    let found = queues.len() as u64;

    if found == expected {
        CheckResult::new(Status::Ok, format!("{} queues found", found))
    } else {
        CheckResult::new(
            Status::Critical,
            format!("Expected {} queues and found {}", expected, found),
        )
    }
}

pub fn check_queue_consumers(
    queues: &[QueueRecord],
    required: &ConsumerRequirements,
) -> CheckResult {
    let mut details = vec![];
    let mut mismatched = vec![];

    for queue in queues {
        let Some(expected) = required.get(&queue.name) else {
            continue;
        };

        details.push(format!(
            "{} : consumers => {}",
            queue.name, queue.consumers
        ));

        if queue.consumers != expected {
            mismatched.push(format!("{} (expected {})", queue.name, expected));
        }
    }

    let result = if mismatched.is_empty() {
        CheckResult::new(
            Status::Ok,
            format!("{} queues have the expected consumers", details.len()),
        )
    } else {
        CheckResult::new(
            Status::Critical,
            format!("consumer count mismatch on {}", mismatched.join(", ")),
        )
    };

    result.with_details(details)
}

pub fn check_queue_synchronisation(
    queues: &[QueueRecord],
    min_synchronised_slaves: u64,
) -> CheckResult {
    let mut details = vec![];
    let mut under_replicated = vec![];

    for queue in queues {
        let slaves = queue.synchronised_slaves();
        details.push(format!(
            "{} : synchronised_slaves => {}",
            queue.name, slaves
        ));

        if (slaves as u64) < min_synchronised_slaves {
            under_replicated.push(queue.name.as_str());
        }
    }

    let result = if under_replicated.is_empty() {
        CheckResult::new(
            Status::Ok,
            format!(
                "{} queues have at least {} synchronised slaves",
                queues.len(),
                min_synchronised_slaves
            ),
        )
    } else {
        CheckResult::new(
            Status::Critical,
            format!(
                "fewer than {} synchronised slaves on {}",
                min_synchronised_slaves,
                under_replicated.join(", ")
            ),
        )
    };

    result.with_details(details)
}

pub fn check_queue_messages(
    queues: &[QueueRecord],
    max_messages: u64,
) -> CheckResult {
    let mut details = vec![];
    let mut backlogged = vec![];

    for queue in queues {
        // No `messages` field means the broker has no recent stats for the
        // queue. Skip it rather than treating it as empty.
        let Some(messages) = queue.messages else {
            continue;
        };

        details.push(format!("{} : messages => {}", queue.name, messages));

        if messages > max_messages {
            backlogged.push(queue.name.as_str());
        }
    }

    let result = if backlogged.is_empty() {
        CheckResult::new(
            Status::Ok,
            format!("no queue has more than {} messages", max_messages),
        )
    } else {
        CheckResult::new(
            Status::Critical,
            format!(
                "more than {} messages on {}",
                max_messages,
                backlogged.join(", ")
            ),
        )
    };

    result.with_details(details)
}
