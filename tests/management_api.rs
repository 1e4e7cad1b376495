use rabbitmq_queue_probe::{
    api::{ManagementClient, QueueSource},
    check::{BrokerTarget, Check, CheckRequest, Status},
    queue_list::parse_queue_list,
    runner,
};
use std::net::SocketAddr;
use warp::{http::StatusCode, Filter};

const QUEUES: &str = r#"[
    {
        "name": "a",
        "consumers": 2,
        "messages": 50,
        "synchronised_slave_nodes": ["rabbit@b", "rabbit@c"]
    },
    {
        "name": "b",
        "consumers": 1,
        "messages": 150,
        "synchronised_slave_nodes": ["rabbit@b"]
    },
    {
        "name": "idle",
        "consumers": 0,
        "synchronised_slave_nodes": ["rabbit@b", "rabbit@c"]
    }
]"#;

/// Serves `body` on `GET /api/queues/{vhost}` to clients presenting
/// guest/guest, and 401 to everyone else.
async fn start_broker(body: &'static str, status: StatusCode) -> SocketAddr {
    let expected_auth = format!("Basic {}", base64::encode("guest:guest"));

    let route = warp::get()
        .and(warp::path!("api" / "queues" / String))
        .and(warp::header::optional::<String>("authorization"))
        .map(move |_vhost: String, auth: Option<String>| {
            if auth.as_deref() != Some(expected_auth.as_str()) {
                return warp::reply::with_status(
                    "Not authorized".to_string(),
                    StatusCode::UNAUTHORIZED,
                );
            }
            warp::reply::with_status(body.to_string(), status)
        });

    let (addr, server) =
        warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn target(password: &str) -> BrokerTarget {
    BrokerTarget {
        host: "127.0.0.1".to_string(),
        vhost: "%2F".to_string(),
        username: "guest".to_string(),
        password: password.to_string(),
    }
}

fn request(check: Check) -> CheckRequest {
    CheckRequest {
        check,
        target: target("guest"),
        debug: false,
    }
}

#[tokio::test]
async fn test_fetch_queues() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let queues = client.fetch_queues().await.unwrap();

    assert_eq!(queues.len(), 3);
    assert_eq!(queues[0].name, "a");
    assert_eq!(queues[2].messages, None);
}

#[tokio::test]
async fn test_queue_count_against_broker() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let ok = runner::run(&request(Check::QueueCount { expected: 3 }), &client)
        .await;
    let critical =
        runner::run(&request(Check::QueueCount { expected: 4 }), &client)
            .await;

    assert_eq!(ok.exit_code(), 0);
    assert_eq!(ok.render(), "OK : 3 queues found");
    assert_eq!(critical.exit_code(), 2);
    assert_eq!(
        critical.render(),
        "CRITICAL : Expected 4 queues and found 3"
    );
}

#[tokio::test]
async fn test_queue_consumers_against_broker() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());
    let required = parse_queue_list("a:2,b:3").unwrap();

    let result =
        runner::run(&request(Check::QueueConsumers { required }), &client)
            .await;

    assert_eq!(result.exit_code(), 2);
    assert_eq!(
        result.render(),
        "CRITICAL : consumer count mismatch on b (expected 3)\n\
         a : consumers => 2\n\
         b : consumers => 1"
    );
}

#[tokio::test]
async fn test_queue_synchronisation_against_broker() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let result = runner::run(
        &request(Check::QueueSynchronisation {
            min_synchronised_slaves: 2,
        }),
        &client,
    )
    .await;

    assert_eq!(result.status, Status::Critical);
    assert_eq!(result.summary, "fewer than 2 synchronised slaves on b");
    assert_eq!(result.details.len(), 3);
}

#[tokio::test]
async fn test_queue_messages_against_broker() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let result = runner::run(
        &request(Check::QueueMessages { max_messages: 100 }),
        &client,
    )
    .await;

    assert_eq!(result.status, Status::Critical);
    assert_eq!(
        result.render(),
        "CRITICAL : more than 100 messages on b\n\
         a : messages => 50\n\
         b : messages => 150"
    );

    let result = runner::run(
        &request(Check::QueueMessages { max_messages: 150 }),
        &client,
    )
    .await;

    assert_eq!(result.status, Status::Ok);
}

#[tokio::test]
async fn test_rejected_credentials_are_an_api_error() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("wrong"), addr.port());
    let url = format!("http://127.0.0.1:{}/api/queues/%2F", addr.port());

    let result =
        runner::run(&request(Check::QueueCount { expected: 3 }), &client)
            .await;

    assert_eq!(result.exit_code(), 2);
    assert_eq!(result.summary, "RabbitMQ API Error");
    assert!(result.details[0].starts_with(&format!(
        "Error occurred querying RabbitMQ API ({}):",
        url
    )));
}

#[tokio::test]
async fn test_server_error_is_an_api_error() {
    let addr = start_broker("oops", StatusCode::INTERNAL_SERVER_ERROR).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let result =
        runner::run(&request(Check::QueueCount { expected: 0 }), &client)
            .await;

    assert_eq!(result.status, Status::Critical);
    assert!(result.details[0].starts_with("Error occurred querying"));
}

#[tokio::test]
async fn test_connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ManagementClient::with_port(&target("guest"), port);
    let url = format!("http://127.0.0.1:{}/api/queues/%2F", port);

    for check in [
        Check::QueueCount { expected: 1 },
        Check::QueueMessages { max_messages: 1 },
        Check::QueueSynchronisation {
            min_synchronised_slaves: 1,
        },
        Check::QueueConsumers {
            required: parse_queue_list("a:1").unwrap(),
        },
    ] {
        let result = runner::run(&request(check), &client).await;

        assert_eq!(result.exit_code(), 2);
        assert!(result.render().starts_with("CRITICAL : RabbitMQ API Error\n"));
        assert!(result.details[0].contains(&url));
    }
}

#[tokio::test]
async fn test_malformed_body_is_critical() {
    let addr = start_broker(r#"{"not":"an array"}"#, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());

    let result =
        runner::run(&request(Check::QueueCount { expected: 0 }), &client)
            .await;

    assert_eq!(result.status, Status::Critical);
    assert!(result.details[0].starts_with("Unexpected response from"));
}

#[tokio::test]
async fn test_repeated_runs_agree() {
    let addr = start_broker(QUEUES, StatusCode::OK).await;
    let client = ManagementClient::with_port(&target("guest"), addr.port());
    let request = request(Check::QueueSynchronisation {
        min_synchronised_slaves: 1,
    });

    let first = runner::run(&request, &client).await;
    let second = runner::run(&request, &client).await;

    assert_eq!(first, second);
    assert_eq!(first.exit_code(), 0);
}
