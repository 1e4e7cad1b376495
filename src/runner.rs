use crate::api::{FetchError, QueueSource};
use crate::check::{Check, CheckRequest, CheckResult};
use log::{info, warn};

/// Fetches the queue list once and applies the requested check.
///
/// Never fails: transport and parse problems come back as CRITICAL
/// results so the caller has exactly one thing to report.
pub async fn run(request: &CheckRequest, source: &dyn QueueSource) -> CheckResult {
    let mut diagnostics = vec![];

    if request.debug {
        diagnostics.push(format!("DEBUG : command => {}", request.check.mode()));
        diagnostics.push(format!("DEBUG : url => {}", source.url()));
        if let Check::QueueConsumers { required } = &request.check {
            for (name, count) in required.iter() {
                diagnostics.push(format!(
                    "DEBUG : required consumers {} => {}",
                    name, count
                ));
            }
        }
    }

    let queues = match source.fetch_queues().await {
        Ok(queues) => queues,
        Err(FetchError::Transport(e)) => {
            warn!("Error querying {}: {}", source.url(), e);
            return CheckResult::api_error(source.url(), e)
                .with_diagnostics(diagnostics);
        }
        Err(FetchError::MalformedBody(e)) => {
            warn!("Unexpected response body from {}: {}", source.url(), e);
            return CheckResult::malformed_response(source.url(), e)
                .with_diagnostics(diagnostics);
        }
    };

    if request.debug {
        diagnostics.push(format!("DEBUG : queues returned => {}", queues.len()));
        if let Check::QueueConsumers { required } = &request.check {
            for (name, _) in required.iter() {
                if !queues.iter().any(|q| q.name == name) {
                    diagnostics.push(format!(
                        "DEBUG : queue {} listed but not returned",
                        name
                    ));
                }
            }
        }
    }

    let result = request.check.evaluate(&queues);
    info!(
        "{} finished with {}",
        request.check.mode(),
        result.status.label()
    );

    result.with_diagnostics(diagnostics)
}
