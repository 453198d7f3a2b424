use bytes::Bytes;
use chrono::Utc;
use clap::{Parser, Subcommand};
use quorumlog::{
    BrokerConfig, BrokerOptions, ConsumerClient, GetCommittedLogOutcome, LeaderConfig, LeaderOptions, PeerRole,
    ProducerConfig,
};
use slog::Drain;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "quorumlog", about = "Single-leader quorum-replicated log")]
struct Cli {
    /// Also write logs to a timestamped file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the leader until ctrl-c.
    Leader {
        #[arg(long, default_value = "127.0.0.1:50051")]
        bind: SocketAddr,
        #[arg(long)]
        quorum_size: Option<usize>,
        #[arg(long)]
        target_voters: Option<usize>,
        #[arg(long)]
        max_log_entries: Option<u64>,
        #[arg(long)]
        liveness_interval_ms: Option<u64>,
        #[arg(long)]
        expiry_ms: Option<u64>,
        #[arg(long)]
        callback_timeout_ms: Option<u64>,
    },
    /// Run a broker until ctrl-c.
    Broker {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "http://127.0.0.1:50051")]
        leader: String,
        /// Where this broker's callback service listens.
        #[arg(long)]
        bind: SocketAddr,
        /// URI the leader uses to reach this broker. Defaults to http://{bind}.
        #[arg(long)]
        advertise: Option<String>,
        /// "voter" or "observer".
        #[arg(long, default_value = "voter")]
        role: PeerRole,
        #[arg(long)]
        heartbeat_ms: Option<u64>,
        #[arg(long)]
        jitter_ms: Option<u64>,
        #[arg(long)]
        poll_ms: Option<u64>,
    },
    /// Append payloads, optionally waiting for their commits.
    Produce {
        #[arg(long, default_value = "http://127.0.0.1:50051")]
        leader: String,
        /// Listen here for commit notifications and wait for all of them before exiting.
        #[arg(long)]
        callback_bind: Option<SocketAddr>,
        #[arg(long, default_value_t = 10_000)]
        wait_ms: u64,
        #[arg(required = true)]
        payloads: Vec<String>,
    },
    /// Print the committed log.
    Consume {
        #[arg(long, default_value = "http://127.0.0.1:50051")]
        leader: String,
        #[arg(long, default_value_t = 0)]
        start: u64,
        /// Keep polling for new commits.
        #[arg(long)]
        follow: bool,
        #[arg(long, default_value_t = 1000)]
        poll_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Leader {
            bind,
            quorum_size,
            target_voters,
            max_log_entries,
            liveness_interval_ms,
            expiry_ms,
            callback_timeout_ms,
        } => {
            let info_logger = create_root_logger(cli.log_dir, "leader".to_string())?;
            let _leader = quorumlog::try_create_leader(LeaderConfig {
                bind_addr: bind,
                info_logger: info_logger.clone(),
                options: LeaderOptions {
                    quorum_size,
                    target_voter_count: target_voters,
                    max_log_entries,
                    liveness_check_interval: liveness_interval_ms.map(Duration::from_millis),
                    expiry_threshold: expiry_ms.map(Duration::from_millis),
                    callback_timeout: callback_timeout_ms.map(Duration::from_millis),
                },
            })
            .await?;

            tokio::signal::ctrl_c().await?;
            slog::info!(info_logger, "Shutting down leader");
        }
        Command::Broker {
            id,
            leader,
            bind,
            advertise,
            role,
            heartbeat_ms,
            jitter_ms,
            poll_ms,
        } => {
            let info_logger = create_root_logger(cli.log_dir, id.clone())?;
            let broker = quorumlog::try_create_broker(BrokerConfig {
                peer_id: id,
                leader_uri: leader,
                callback_bind_addr: bind,
                callback_endpoint: advertise,
                role,
                info_logger: info_logger.clone(),
                options: BrokerOptions {
                    heartbeat_interval: heartbeat_ms.map(Duration::from_millis),
                    heartbeat_jitter: jitter_ms.map(Duration::from_millis),
                    poll_interval: poll_ms.map(Duration::from_millis),
                    ..BrokerOptions::default()
                },
            })
            .await?;

            tokio::signal::ctrl_c().await?;
            slog::info!(
                info_logger,
                "Shutting down broker. Role: {}, local log length: {}",
                broker.role().as_str(),
                broker.local_log().len()
            );
        }
        Command::Produce {
            leader,
            callback_bind,
            wait_ms,
            payloads,
        } => {
            let info_logger = create_root_logger(cli.log_dir, "producer".to_string())?;
            let mut producer = quorumlog::try_create_producer(ProducerConfig {
                leader_uri: leader,
                callback_bind_addr: callback_bind,
                callback_endpoint: None,
                info_logger,
                rpc_timeout: None,
            })
            .await?;

            let num_payloads = payloads.len();
            for payload in payloads {
                let sequence = producer.register_new_log(Bytes::from(payload.clone())).await?;
                println!("appended {:?} at {:?}", payload, sequence);
            }

            if let Some(mut commits) = producer.commit_notifications() {
                let deadline = tokio::time::Instant::now() + Duration::from_millis(wait_ms);
                for _ in 0..num_payloads {
                    match tokio::time::timeout_at(deadline, commits.next()).await {
                        Ok(Some(committed)) => println!("committed {:?}", committed),
                        Ok(None) => break,
                        Err(_) => {
                            println!("Timed out waiting for commits");
                            break;
                        }
                    }
                }
            }
        }
        Command::Consume {
            leader,
            start,
            follow,
            poll_ms,
        } => {
            let info_logger = create_root_logger(cli.log_dir, "consumer".to_string())?;
            let mut consumer = ConsumerClient::connect(info_logger, leader, Duration::from_secs(1)).await?;

            if !follow {
                match consumer.fetch_committed(start).await? {
                    GetCommittedLogOutcome::Entries(entries) => {
                        for entry in entries {
                            println!("{:?}", entry);
                        }
                    }
                    GetCommittedLogOutcome::NoNewData { committed_count } => {
                        println!("No new data. Committed count: {}", committed_count);
                    }
                }
                return Ok(());
            }

            consumer.seek(start);
            loop {
                for entry in consumer.poll_committed().await? {
                    println!("{:?}", entry);
                }
                tokio::time::sleep(Duration::from_millis(poll_ms)).await;
            }
        }
    }

    Ok(())
}

fn create_root_logger(log_dir: Option<PathBuf>, name: String) -> Result<slog::Logger, Box<dyn Error>> {
    match log_dir {
        Some(directory) => create_root_logger_for_file(directory, name),
        None => Ok(create_root_logger_for_stdout(name)),
    }
}

fn create_root_logger_for_file(directory: PathBuf, name: String) -> Result<slog::Logger, Box<dyn Error>> {
    fs::create_dir_all(&directory)?;
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let log_path = directory.join(format!("{}_{}_info.log", name, now));
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let decorator = slog_term::PlainDecorator::new(file);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Ok(slog::Logger::root(drain, slog::o!("Name" => name)))
}

fn create_root_logger_for_stdout(name: String) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Name" => name))
}
