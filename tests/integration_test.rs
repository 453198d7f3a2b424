use bytes::Bytes;
use quorumlog::{
    BrokerClient, BrokerConfig, BrokerOptions, ConsumerClient, GetCommittedLogOutcome, GetLogOutcome, LeaderCallError,
    LeaderClient, LeaderConfig, LeaderHandle, LeaderOptions, PeerId, PeerRole, ProducerConfig, ReplicatedEntry,
    Sequence,
};
use slog::Drain;
use std::error::Error;
use std::net::SocketAddr;
use tokio::time::{Duration, Instant};

#[tokio::test]
async fn single_voter_scenario_over_the_wire() -> Result<(), Box<dyn Error>> {
    let port_base = 51000;
    let _leader = create_leader(port_base, LeaderOptions::default()).await?;

    // This test plays the broker by hand. Nothing listens on its callback endpoint, so the
    // leader's new-entry notifications fail and get logged.
    let broker = LeaderClient::connect(logger("broker"), leader_uri(port_base), Duration::from_secs(1)).await?;
    let peer_id = PeerId::new("peer-1");
    broker
        .register_broker(&peer_id, &local_uri(port_base + 9), PeerRole::Voter)
        .await?;

    let mut producer = quorumlog::try_create_producer(ProducerConfig {
        leader_uri: leader_uri(port_base),
        callback_bind_addr: Some(local_addr(port_base + 1)),
        callback_endpoint: None,
        info_logger: logger("producer"),
        rpc_timeout: None,
    })
    .await?;
    let mut commits = producer.commit_notifications().expect("Producer has a callback address");
    let mut consumer = ConsumerClient::connect(logger("consumer"), leader_uri(port_base), Duration::from_secs(1)).await?;

    let sequence = producer.register_new_log(Bytes::from_static(b"A")).await?;
    assert_eq!(sequence, Sequence::new(0));

    let outcome = broker.get_log(&peer_id, Sequence::new(0)).await?;
    assert_eq!(outcome, GetLogOutcome::Entries(vec![entry(0, "A")]));

    // Asking again from the old position is a resync to the advanced cursor.
    let outcome = broker.get_log(&peer_id, Sequence::new(0)).await?;
    assert_eq!(
        outcome,
        GetLogOutcome::Resync {
            correct_cursor: Sequence::new(1)
        }
    );

    assert!(broker.confirm_log_stored(&peer_id, Sequence::new(0)).await?);
    // A repeated ack reports the entry as committed but doesn't commit it again.
    assert!(broker.confirm_log_stored(&peer_id, Sequence::new(0)).await?);

    let committed = tokio::time::timeout(Duration::from_secs(5), commits.next())
        .await
        .expect("Timeout waiting for commit notification");
    assert_eq!(committed, Some(entry(0, "A")));

    assert_eq!(
        consumer.fetch_committed(0).await?,
        GetCommittedLogOutcome::Entries(vec![entry(0, "A")])
    );
    assert_eq!(
        consumer.fetch_committed(1).await?,
        GetCommittedLogOutcome::NoNewData { committed_count: 1 }
    );
    match consumer.fetch_committed(7).await {
        Err(LeaderCallError::OutOfRange { committed_count }) => assert_eq!(committed_count, 1),
        other => panic!("Expected OutOfRange, got {:?}", other),
    }

    // A cursor past the committed log snaps back to its end.
    consumer.seek(7);
    assert!(consumer.poll_committed().await?.is_empty());
    assert_eq!(consumer.cursor(), 1);

    Ok(())
}

#[tokio::test]
async fn unknown_peers_are_rejected_over_the_wire() -> Result<(), Box<dyn Error>> {
    let port_base = 51100;
    let _leader = create_leader(port_base, LeaderOptions::default()).await?;
    let client = LeaderClient::connect(logger("client"), leader_uri(port_base), Duration::from_secs(1)).await?;
    let stranger = PeerId::new("stranger");

    match client.heartbeat(&stranger).await {
        Err(LeaderCallError::UnknownPeer) => {}
        other => panic!("Expected UnknownPeer, got {:?}", other),
    }
    match client.confirm_log_stored(&stranger, Sequence::new(0)).await {
        Err(LeaderCallError::UnknownPeer) => {}
        other => panic!("Expected UnknownPeer, got {:?}", other),
    }
    assert_eq!(
        client.get_log(&stranger, Sequence::new(0)).await?,
        GetLogOutcome::Rejected(quorumlog::RejectReason::UnknownPeer)
    );

    Ok(())
}

#[tokio::test]
async fn broker_replicates_and_commits() -> Result<(), Box<dyn Error>> {
    let port_base = 52000;
    let _leader = create_leader(port_base, LeaderOptions::default()).await?;
    let broker = create_broker(port_base, 2, "broker-1", PeerRole::Voter).await?;

    let mut producer = quorumlog::try_create_producer(ProducerConfig {
        leader_uri: leader_uri(port_base),
        callback_bind_addr: Some(local_addr(port_base + 1)),
        callback_endpoint: None,
        info_logger: logger("producer"),
        rpc_timeout: None,
    })
    .await?;
    let mut commits = producer.commit_notifications().expect("Producer has a callback address");

    for payload in &["A", "B", "C"] {
        producer.register_new_log(Bytes::from_static(payload.as_bytes())).await?;
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut committed = Vec::new();
    while committed.len() < 3 {
        let next = tokio::time::timeout_at(deadline, commits.next())
            .await
            .expect("Timeout waiting for commits")
            .expect("Producer callback server exited");
        committed.push(next);
    }
    committed.sort_by_key(|entry| entry.sequence);
    assert_eq!(committed, vec![entry(0, "A"), entry(1, "B"), entry(2, "C")]);
    assert_eq!(broker.local_log(), committed);

    let mut consumer = ConsumerClient::connect(logger("consumer"), leader_uri(port_base), Duration::from_secs(1)).await?;
    let polled = consumer.poll_committed().await?;
    assert_eq!(polled.len(), 3);
    assert_eq!(consumer.cursor(), 3);
    assert!(consumer.poll_committed().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn observer_is_promoted_after_voter_expires() -> Result<(), Box<dyn Error>> {
    let port_base = 53000;
    let leader = create_leader(
        port_base,
        LeaderOptions {
            quorum_size: Some(1),
            liveness_check_interval: Some(Duration::from_millis(100)),
            expiry_threshold: Some(Duration::from_millis(600)),
            callback_timeout: Some(Duration::from_millis(200)),
            ..LeaderOptions::default()
        },
    )
    .await?;
    let voter = create_broker(port_base, 2, "broker-1", PeerRole::Voter).await?;
    let observer = create_broker(port_base, 3, "broker-2", PeerRole::Observer).await?;

    leader.append(Bytes::from_static(b"A"), None).await?;
    wait_for_committed_count(&leader, 1, Duration::from_secs(5)).await;
    assert_eq!(voter.local_log(), vec![entry(0, "A")]);
    assert!(observer.local_log().is_empty());

    // Silence the voter.
    drop(voter);

    // The broker hears about its promotion before the leader records it.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let peers = leader.peers().await?;
        let promoted = peers.len() == 1 && peers[0].id() == observer.peer_id() && peers[0].role() == PeerRole::Voter;
        if promoted && observer.role() == PeerRole::Voter {
            break;
        }
        assert!(Instant::now() < deadline, "Timeout waiting for promotion. Peers: {:?}", peers);
        sleep(Duration::from_millis(50)).await;
    }

    // The promoted peer now counts toward quorum.
    leader.append(Bytes::from_static(b"B"), None).await?;
    wait_for_committed_count(&leader, 2, Duration::from_secs(5)).await;
    assert_eq!(observer.local_log(), vec![entry(0, "A"), entry(1, "B")]);

    Ok(())
}

#[tokio::test]
async fn expired_broker_re_registers_on_heartbeat_and_catches_up() -> Result<(), Box<dyn Error>> {
    let port_base = 54000;
    let leader = create_leader(
        port_base,
        LeaderOptions {
            quorum_size: Some(1),
            liveness_check_interval: Some(Duration::from_millis(100)),
            expiry_threshold: Some(Duration::from_millis(500)),
            callback_timeout: Some(Duration::from_millis(200)),
            ..LeaderOptions::default()
        },
    )
    .await?;
    // Heartbeats are slower than expiry, and polling never kicks in.
    let broker = create_broker_with_options(
        port_base,
        2,
        "broker-1",
        PeerRole::Voter,
        BrokerOptions {
            heartbeat_interval: Some(Duration::from_millis(1500)),
            heartbeat_jitter: Some(Duration::from_millis(0)),
            poll_interval: Some(Duration::from_secs(60)),
            rpc_timeout: None,
        },
    )
    .await?;

    leader.append(Bytes::from_static(b"A"), None).await?;
    wait_for_committed_count(&leader, 1, Duration::from_secs(5)).await;

    let deadline = Instant::now() + Duration::from_secs(5);
    while !leader.peers().await?.is_empty() {
        assert!(Instant::now() < deadline, "Timeout waiting for the broker to expire");
        sleep(Duration::from_millis(50)).await;
    }

    // No voters, so this waits for the broker to come back.
    leader.append(Bytes::from_static(b"B"), None).await?;
    wait_for_committed_count(&leader, 2, Duration::from_secs(10)).await;
    assert_eq!(broker.local_log(), vec![entry(0, "A"), entry(1, "B")]);

    Ok(())
}

async fn create_leader(port_base: u16, options: LeaderOptions) -> Result<LeaderHandle, Box<dyn Error>> {
    let leader = quorumlog::try_create_leader(LeaderConfig {
        bind_addr: local_addr(port_base),
        info_logger: logger("leader"),
        options,
    })
    .await?;

    // Give the server a moment to bind.
    sleep(Duration::from_millis(100)).await;
    Ok(leader)
}

async fn create_broker(
    port_base: u16,
    port_offset: u16,
    id: &str,
    role: PeerRole,
) -> Result<BrokerClient, Box<dyn Error>> {
    let options = BrokerOptions {
        heartbeat_interval: Some(Duration::from_millis(100)),
        heartbeat_jitter: Some(Duration::from_millis(20)),
        poll_interval: Some(Duration::from_millis(100)),
        rpc_timeout: None,
    };
    create_broker_with_options(port_base, port_offset, id, role, options).await
}

async fn create_broker_with_options(
    port_base: u16,
    port_offset: u16,
    id: &str,
    role: PeerRole,
    options: BrokerOptions,
) -> Result<BrokerClient, Box<dyn Error>> {
    let broker = quorumlog::try_create_broker(BrokerConfig {
        peer_id: id.to_string(),
        leader_uri: leader_uri(port_base),
        callback_bind_addr: local_addr(port_base + port_offset),
        callback_endpoint: None,
        role,
        info_logger: logger(id),
        options,
    })
    .await?;

    Ok(broker)
}

async fn wait_for_committed_count(leader: &LeaderHandle, count: u64, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        match leader.committed_log(count).await {
            Ok(GetCommittedLogOutcome::NoNewData { committed_count }) if committed_count == count => return,
            _ => {}
        }
        assert!(Instant::now() < deadline, "Timeout waiting for {} commits", count);
        sleep(Duration::from_millis(50)).await;
    }
}

fn entry(sequence: u64, payload: &'static str) -> ReplicatedEntry {
    ReplicatedEntry {
        sequence: Sequence::new(sequence),
        payload: Bytes::from_static(payload.as_bytes()),
    }
}

fn local_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

fn local_uri(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

fn leader_uri(port_base: u16) -> String {
    local_uri(port_base)
}

fn logger(name: &str) -> slog::Logger {
    create_root_logger_for_stdout(name.to_string())
}

fn create_root_logger_for_stdout(name: String) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Name" => name))
}

async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
