use serde::Deserialize;

/// One element of the array returned by `GET /api/queues/{vhost}`.
///
/// The broker returns many more fields than these; everything else is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueRecord {
    pub name: String,

    pub consumers: u64,

    // Omitted by the broker for queues without recent activity. Absent
    // means "no data", not zero.
    #[serde(default)]
    pub messages: Option<u64>,

    #[serde(default)]
    pub synchronised_slave_nodes: Vec<String>,
}

impl QueueRecord {
    pub fn synchronised_slaves(&self) -> usize {
        self.synchronised_slave_nodes.len()
    }
}
