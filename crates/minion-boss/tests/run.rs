use minion_boss::{Boss, BossConfig, BossError, MinionLaunch};
use minion_core::{Endpoint, RetryPolicy};
use std::collections::HashSet;
use std::time::Duration;

fn config() -> BossConfig {
    let mut config = BossConfig::new(Endpoint::new("127.0.0.1", 0, "tp"));
    config.retry = RetryPolicy {
        retries: 50,
        delay: Duration::from_millis(100),
    };
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_in_process_returns_sorted_results() {
    let boss = Boss::new(config(), MinionLaunch::InProcess);

    let results = boss.run(10, 4, 50).await.unwrap();

    let identifiers: Vec<u64> = results.iter().map(|r| r.identifier).collect();
    assert_eq!(identifiers, (0..10).collect::<Vec<_>>());
    assert_eq!(identifiers.iter().collect::<HashSet<_>>().len(), 10);
    assert!(results.iter().all(|r| r.elapsed_secs > 0.0));
}

#[tokio::test]
async fn test_more_minions_than_tasks() {
    let boss = Boss::new(config(), MinionLaunch::InProcess);

    let results = boss.run(2, 5, 10).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_collect_timeout_without_minions() {
    let mut config = config();
    config.collect_timeout_secs = Some(0);
    let boss = Boss::new(config, MinionLaunch::InProcess);

    match boss.run(3, 0, 10).await {
        Err(BossError::Timeout { received, expected }) => {
            assert_eq!(received, 0);
            assert_eq!(expected, 3);
        }
        other => panic!("expected timeout, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let boss = Boss::new(
        BossConfig::new(Endpoint::new("127.0.0.1", port, "tp")),
        MinionLaunch::InProcess,
    );
    assert!(matches!(boss.run(1, 1, 10).await, Err(BossError::Server(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_with_minion_processes() {
    let launch = MinionLaunch::Process {
        program: env!("CARGO_BIN_EXE_boss").into(),
        args: vec!["minion".to_string()],
    };
    let boss = Boss::new(config(), launch);

    let results = boss.run(3, 2, 20).await.unwrap();

    let identifiers: Vec<u64> = results.iter().map(|r| r.identifier).collect();
    assert_eq!(identifiers, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_missing_minion_binary() {
    let launch = MinionLaunch::Process {
        program: "/nonexistent/minion".into(),
        args: vec![],
    };
    let boss = Boss::new(config(), launch);

    assert!(matches!(
        boss.run(1, 1, 10).await,
        Err(BossError::Spawn { index: 0, .. })
    ));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_minion_is_reported_after_shutdown() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    // minion-0 exits at once; minion-1 is a real minion and drains the queue
    let script = format!(
        "case \"$*\" in *minion-0*) exit 3;; esac; exec '{}' minion \"$@\"",
        env!("CARGO_BIN_EXE_boss")
    );
    let launch = MinionLaunch::Process {
        program: "sh".into(),
        args: vec!["-c".to_string(), script, "sh".to_string()],
    };
    let boss = Boss::new(
        BossConfig::new(Endpoint::new("127.0.0.1", port, "tp")),
        launch,
    );

    match boss.run(3, 2, 10).await {
        Err(BossError::Minion { index, reason }) => {
            assert_eq!(index, 0);
            assert!(reason.contains("exit"));
        }
        other => panic!("expected minion failure, got {:?}", other.map(|r| r.len())),
    }

    // The server was shut down before the error came back
    tokio::net::TcpListener::bind(("127.0.0.1", port)).await.unwrap();
}

#[test]
fn test_json_output_is_not_mixed_with_logs() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_boss"))
        .args(["--port", "0", "--format", "json", "run", "-n", "2", "-m", "1", "-s", "10", "--in-process"])
        .env("RUST_LOG", "info")
        .env_remove("MINION_SECRET")
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let identifiers: Vec<u64> = results
        .iter()
        .map(|r| r["identifier"].as_u64().unwrap())
        .collect();
    assert_eq!(identifiers, vec![0, 1]);

    let logs = String::from_utf8_lossy(&output.stderr);
    assert!(logs.contains("Queue server listening"));
}
