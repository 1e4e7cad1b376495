//! Supervisor-facing entry point.
//!
//! Behaviour:
//!   • Performs a single authenticated GET against the management API.
//!   • Prints `OK : ...`, `CRITICAL : ...` or `UNKNOWN : ...` on stdout,
//!     followed by one line per queue checked.
//!   • Exits 0 when healthy and 2 for every kind of failure.
//!
//! Logging goes to stderr through `env_logger` so stdout stays parseable.

use ::clap::Parser;
use ::rabbitmq_queue_probe::{api, cli::Cli, config::Config, runner};
use ::std::process::exit;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("UNKNOWN : invalid environment configuration: {}", e);
            exit(2);
        }
    };

    ::env_logger::Builder::new()
        .parse_filters(&config.log_filter(cli.debug))
        .init();

    let result = match cli.into_request(&config) {
        Ok(request) => {
            let client = api::ManagementClient::new(&request.target);
            runner::run(&request, &client).await
        }
        Err(result) => result,
    };

    for line in &result.diagnostics {
        println!("{}", line);
    }
    println!("{}", result.render());

    exit(result.exit_code());
}
