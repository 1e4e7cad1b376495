//! Health-check probe for the RabbitMQ management API.
//!
//! One invocation fetches `/api/queues/{vhost}`, applies a single check and
//! produces a single [`check::CheckResult`]. Only the binary turns that
//! result into output and an exit code.

pub mod api;
pub mod check;
pub mod cli;
pub mod config;
pub mod model;
pub mod queue_list;
pub mod runner;
