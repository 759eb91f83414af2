use minion_core::{Endpoint, Job, RetryPolicy, WorkQueue};
use minion_server::QueueServer;
use minion_worker::{Minion, MinionConfig, MinionState};
use std::collections::HashSet;

#[tokio::test]
async fn test_single_minion_drains_queue_over_tcp() {
    let server = QueueServer::start("127.0.0.1:0", "tp").await.unwrap();

    let tasks = server.task_queue();
    tasks.put(Job::run(0, 50)).await.unwrap();
    tasks.put(Job::run(1, 50)).await.unwrap();
    tasks.put(Job::Stop).await.unwrap();

    let mut config = MinionConfig::new(Endpoint::new("127.0.0.1", server.local_addr().port(), "tp"));
    config.retry = RetryPolicy::default();
    let minion = Minion::new(config);

    let completed = minion.run().await.unwrap();
    assert_eq!(completed, 2);
    assert_eq!(minion.state(), MinionState::Stopped);

    let results = server.result_queue();
    let mut identifiers = HashSet::new();
    for _ in 0..2 {
        let outcome = results.get().await.unwrap();
        assert!(outcome.elapsed_secs > 0.0);
        identifiers.insert(outcome.identifier);
    }
    assert_eq!(identifiers, HashSet::from([0, 1]));
    assert!(results.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_minion_gives_up_without_server() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let mut config = MinionConfig::new(Endpoint::new("127.0.0.1", port, "tp"));
    config.retry.retries = 2;
    config.retry.delay = std::time::Duration::from_millis(10);

    let minion = Minion::new(config);
    assert!(minion.run().await.is_err());
    assert_eq!(minion.state(), MinionState::Connecting);
}
