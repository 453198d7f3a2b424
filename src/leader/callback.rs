use crate::commitlog::Sequence;
use crate::grpc::grpc_broker_callback_client::GrpcBrokerCallbackClient;
use crate::grpc::grpc_producer_callback_client::GrpcProducerCallbackClient;
use crate::grpc::{ProtoNotifyCommittedReq, ProtoNotifyNewEntryReq, ProtoNotifyPromotionReq};
use crate::leader::log_entry::ProducerRef;
use crate::leader::peers::{PeerEndpoint, PeerId};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

#[derive(Debug, thiserror::Error)]
pub(crate) enum CallbackError {
    #[error("Invalid callback endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("Peer unreachable: {0}")]
    PeerUnreachable(String),
    #[error("Timed out calling peer")]
    Timeout,
    #[error("Peer refused callback: {0:?}")]
    Refused(tonic::Status),
}

/// CallbackTransport is the leader's outbound, one-way surface to brokers and producers.
///
/// Every call is fire-and-forget from the engine's point of view. Callers run these on spawned
/// tasks, and a failure is logged and dropped.
#[async_trait::async_trait]
pub(crate) trait CallbackTransport: Send + Sync + 'static {
    /// Hint to a voter that there is something new to pull.
    async fn notify_new_entry(&self, endpoint: &PeerEndpoint, log_len: u64) -> Result<(), CallbackError>;

    /// Asks an observer to start acting as a voter.
    async fn notify_promotion(&self, endpoint: &PeerEndpoint, peer_id: &PeerId) -> Result<(), CallbackError>;

    /// Tells a producer that its entry reached quorum.
    async fn notify_committed(
        &self,
        producer: &ProducerRef,
        sequence: Sequence,
        payload: Bytes,
    ) -> Result<(), CallbackError>;
}

/// GrpcCallbackTransport keeps one lazily connected channel per callback URI. A channel is
/// dropped from the cache when a call over it fails, so the next call dials again.
pub(crate) struct GrpcCallbackTransport {
    channels: Mutex<HashMap<String, Channel>>,
}

impl GrpcCallbackTransport {
    pub(crate) fn new() -> Self {
        GrpcCallbackTransport {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn lock_channels(&self) -> MutexGuard<'_, HashMap<String, Channel>> {
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn channel(&self, uri: &str) -> Result<Channel, CallbackError> {
        let mut channels = self.lock_channels();
        if let Some(channel) = channels.get(uri) {
            return Ok(channel.clone());
        }

        let channel = Endpoint::from_shared(uri.to_string())
            .map_err(|_| CallbackError::InvalidEndpoint(uri.to_string()))?
            .connect_lazy()
            .map_err(|e| CallbackError::PeerUnreachable(format!("{}: {}", uri, e)))?;
        channels.insert(uri.to_string(), channel.clone());

        Ok(channel)
    }

    fn call_failed(&self, uri: &str, status: Status) -> CallbackError {
        self.lock_channels().remove(uri);
        match status.code() {
            Code::Unavailable => CallbackError::PeerUnreachable(format!("{}: {}", uri, status.message())),
            _ => CallbackError::Refused(status),
        }
    }
}

#[async_trait::async_trait]
impl CallbackTransport for GrpcCallbackTransport {
    async fn notify_new_entry(&self, endpoint: &PeerEndpoint, log_len: u64) -> Result<(), CallbackError> {
        let channel = self.channel(endpoint.as_str())?;
        GrpcBrokerCallbackClient::new(channel)
            .notify_new_entry(ProtoNotifyNewEntryReq { log_len })
            .await
            .map(|_| ())
            .map_err(|status| self.call_failed(endpoint.as_str(), status))
    }

    async fn notify_promotion(&self, endpoint: &PeerEndpoint, peer_id: &PeerId) -> Result<(), CallbackError> {
        let channel = self.channel(endpoint.as_str())?;
        GrpcBrokerCallbackClient::new(channel)
            .notify_promotion(ProtoNotifyPromotionReq {
                peer_id: peer_id.as_str().to_string(),
            })
            .await
            .map(|_| ())
            .map_err(|status| self.call_failed(endpoint.as_str(), status))
    }

    async fn notify_committed(
        &self,
        producer: &ProducerRef,
        sequence: Sequence,
        payload: Bytes,
    ) -> Result<(), CallbackError> {
        let channel = self.channel(producer.as_str())?;
        GrpcProducerCallbackClient::new(channel)
            .notify_committed(ProtoNotifyCommittedReq {
                sequence: sequence.as_u64(),
                payload: payload.to_vec(),
            })
            .await
            .map(|_| ())
            .map_err(|status| self.call_failed(producer.as_str(), status))
    }
}

/// Runs `call` with a deadline, collapsing a timeout into `CallbackError::Timeout`.
pub(crate) async fn with_timeout<F>(timeout: tokio::time::Duration, call: F) -> Result<(), CallbackError>
where
    F: std::future::Future<Output = Result<(), CallbackError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_elapsed) => Err(CallbackError::Timeout),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channels_are_cached_per_uri() {
        let transport = GrpcCallbackTransport::new();

        transport.channel("http://127.0.0.1:1").unwrap();
        transport.channel("http://127.0.0.1:1").unwrap();
        transport.channel("http://127.0.0.1:2").unwrap();
        assert_eq!(transport.lock_channels().len(), 2);

        match transport.channel("not a uri") {
            Err(CallbackError::InvalidEndpoint(uri)) => assert_eq!(uri, "not a uri"),
            other => panic!("Expected InvalidEndpoint, got {:?}", other.map(|_| ())),
        }
        assert_eq!(transport.lock_channels().len(), 2);
    }

    #[tokio::test]
    async fn failed_call_drops_the_cached_channel() {
        let transport = GrpcCallbackTransport::new();
        transport.channel("http://127.0.0.1:1").unwrap();

        let error = transport.call_failed("http://127.0.0.1:1", Status::unavailable("connection refused"));

        assert!(matches!(error, CallbackError::PeerUnreachable(_)));
        assert!(transport.lock_channels().is_empty());
        assert!(matches!(
            transport.call_failed("http://127.0.0.1:1", Status::internal("boom")),
            CallbackError::Refused(_)
        ));
    }
}
