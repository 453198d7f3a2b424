// ------- Shared --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogEntry {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogEntries {
    #[prost(message, repeated, tag = "1")]
    pub entries: ::prost::alloc::vec::Vec<ProtoLogEntry>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoServerFault {
    #[prost(string, tag = "1")]
    pub message: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUnknownPeer {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotVoter {}
// ------- RegisterBroker --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterBrokerReq {
    #[prost(string, tag = "1")]
    pub peer_id: ::prost::alloc::string::String,
    /// Callback URI of the broker, e.g. "http://127.0.0.1:6001".
    #[prost(string, tag = "2")]
    pub endpoint: ::prost::alloc::string::String,
    /// "voter" or "observer"
    #[prost(string, tag = "3")]
    pub role: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterBrokerResult {
    #[prost(oneof = "proto_register_broker_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_register_broker_result::Result>,
}
/// Nested message and enum types in `ProtoRegisterBrokerResult`.
pub mod proto_register_broker_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoRegisterBrokerSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoRegisterBrokerError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterBrokerSuccess {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterBrokerError {
    #[prost(oneof = "proto_register_broker_error::Err", tags = "1")]
    pub err: ::core::option::Option<proto_register_broker_error::Err>,
}
/// Nested message and enum types in `ProtoRegisterBrokerError`.
pub mod proto_register_broker_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        ServerFault(super::ProtoServerFault),
    }
}
// ------- GetLog --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLogReq {
    #[prost(string, tag = "1")]
    pub peer_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub start_index: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLogResult {
    #[prost(oneof = "proto_get_log_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_get_log_result::Result>,
}
/// Nested message and enum types in `ProtoGetLogResult`.
pub mod proto_get_log_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoGetLogSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoGetLogError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLogSuccess {
    #[prost(oneof = "proto_get_log_success::Outcome", tags = "1, 2, 3")]
    pub outcome: ::core::option::Option<proto_get_log_success::Outcome>,
}
/// Nested message and enum types in `ProtoGetLogSuccess`.
pub mod proto_get_log_success {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Entries(super::ProtoLogEntries),
        #[prost(message, tag = "2")]
        Resync(super::ProtoResync),
        #[prost(message, tag = "3")]
        NoData(super::ProtoNoData),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoResync {
    #[prost(uint64, tag = "1")]
    pub correct_cursor: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNoData {
    #[prost(uint64, tag = "1")]
    pub current_cursor: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetLogError {
    #[prost(oneof = "proto_get_log_error::Err", tags = "1, 2, 3")]
    pub err: ::core::option::Option<proto_get_log_error::Err>,
}
/// Nested message and enum types in `ProtoGetLogError`.
pub mod proto_get_log_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        UnknownPeer(super::ProtoUnknownPeer),
        #[prost(message, tag = "2")]
        NotVoter(super::ProtoNotVoter),
        #[prost(message, tag = "3")]
        ServerFault(super::ProtoServerFault),
    }
}
// ------- ConfirmLogStored --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConfirmLogStoredReq {
    #[prost(string, tag = "1")]
    pub peer_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "2")]
    pub start_index: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConfirmLogStoredResult {
    #[prost(oneof = "proto_confirm_log_stored_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_confirm_log_stored_result::Result>,
}
/// Nested message and enum types in `ProtoConfirmLogStoredResult`.
pub mod proto_confirm_log_stored_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoConfirmLogStoredSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoConfirmLogStoredError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConfirmLogStoredSuccess {
    #[prost(bool, tag = "1")]
    pub committed: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoConfirmLogStoredError {
    #[prost(oneof = "proto_confirm_log_stored_error::Err", tags = "1, 2, 3, 4")]
    pub err: ::core::option::Option<proto_confirm_log_stored_error::Err>,
}
/// Nested message and enum types in `ProtoConfirmLogStoredError`.
pub mod proto_confirm_log_stored_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        UnknownPeer(super::ProtoUnknownPeer),
        #[prost(message, tag = "2")]
        NotVoter(super::ProtoNotVoter),
        #[prost(message, tag = "3")]
        UnknownEntry(super::ProtoUnknownEntry),
        #[prost(message, tag = "4")]
        ServerFault(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoUnknownEntry {
    #[prost(uint64, tag = "1")]
    pub log_len: u64,
}
// ------- UpdateBrokerTimestamp --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatReq {
    #[prost(string, tag = "1")]
    pub peer_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatResult {
    #[prost(oneof = "proto_heartbeat_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_heartbeat_result::Result>,
}
/// Nested message and enum types in `ProtoHeartbeatResult`.
pub mod proto_heartbeat_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoHeartbeatSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoHeartbeatError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatSuccess {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatError {
    #[prost(oneof = "proto_heartbeat_error::Err", tags = "1, 2")]
    pub err: ::core::option::Option<proto_heartbeat_error::Err>,
}
/// Nested message and enum types in `ProtoHeartbeatError`.
pub mod proto_heartbeat_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        UnknownPeer(super::ProtoUnknownPeer),
        #[prost(message, tag = "2")]
        ServerFault(super::ProtoServerFault),
    }
}
// ------- RegisterNewLog --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterNewLogReq {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
    /// Callback URI of the producer. Empty if the producer doesn't want a commit notification.
    #[prost(string, tag = "2")]
    pub producer_callback: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterNewLogResult {
    #[prost(oneof = "proto_register_new_log_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_register_new_log_result::Result>,
}
/// Nested message and enum types in `ProtoRegisterNewLogResult`.
pub mod proto_register_new_log_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoRegisterNewLogSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoRegisterNewLogError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterNewLogSuccess {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoRegisterNewLogError {
    #[prost(oneof = "proto_register_new_log_error::Err", tags = "1, 2")]
    pub err: ::core::option::Option<proto_register_new_log_error::Err>,
}
/// Nested message and enum types in `ProtoRegisterNewLogError`.
pub mod proto_register_new_log_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        CapacityExceeded(super::ProtoCapacityExceeded),
        #[prost(message, tag = "2")]
        ServerFault(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoCapacityExceeded {
    #[prost(uint64, tag = "1")]
    pub max_entries: u64,
}
// ------- GetCommittedLog --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetCommittedLogReq {
    #[prost(uint64, tag = "1")]
    pub start_index: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetCommittedLogResult {
    #[prost(oneof = "proto_get_committed_log_result::Result", tags = "1, 2")]
    pub result: ::core::option::Option<proto_get_committed_log_result::Result>,
}
/// Nested message and enum types in `ProtoGetCommittedLogResult`.
pub mod proto_get_committed_log_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "1")]
        Ok(super::ProtoGetCommittedLogSuccess),
        #[prost(message, tag = "2")]
        Err(super::ProtoGetCommittedLogError),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetCommittedLogSuccess {
    #[prost(oneof = "proto_get_committed_log_success::Outcome", tags = "1, 2")]
    pub outcome: ::core::option::Option<proto_get_committed_log_success::Outcome>,
}
/// Nested message and enum types in `ProtoGetCommittedLogSuccess`.
pub mod proto_get_committed_log_success {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "1")]
        Entries(super::ProtoLogEntries),
        #[prost(message, tag = "2")]
        NoNewData(super::ProtoNoNewData),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNoNewData {
    #[prost(uint64, tag = "1")]
    pub committed_count: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoGetCommittedLogError {
    #[prost(oneof = "proto_get_committed_log_error::Err", tags = "1, 2")]
    pub err: ::core::option::Option<proto_get_committed_log_error::Err>,
}
/// Nested message and enum types in `ProtoGetCommittedLogError`.
pub mod proto_get_committed_log_error {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Err {
        #[prost(message, tag = "1")]
        OutOfRange(super::ProtoOutOfRange),
        #[prost(message, tag = "2")]
        ServerFault(super::ProtoServerFault),
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOutOfRange {
    #[prost(uint64, tag = "1")]
    pub committed_count: u64,
}
// ------- Callbacks --------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotifyNewEntryReq {
    #[prost(uint64, tag = "1")]
    pub log_len: u64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotifyPromotionReq {
    #[prost(string, tag = "1")]
    pub peer_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotifyCommittedReq {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoNotifyAck {}
#[doc = r" Generated client implementations."]
pub mod grpc_leader_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Served by the leader. Called by brokers, producers and consumers."]
    pub struct GrpcLeaderClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcLeaderClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcLeaderClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn register_broker(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoRegisterBrokerReq>,
        ) -> Result<tonic::Response<super::ProtoRegisterBrokerResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/RegisterBroker");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn get_log(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoGetLogReq>,
        ) -> Result<tonic::Response<super::ProtoGetLogResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/GetLog");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn confirm_log_stored(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoConfirmLogStoredReq>,
        ) -> Result<tonic::Response<super::ProtoConfirmLogStoredResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/ConfirmLogStored");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn update_broker_timestamp(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/UpdateBrokerTimestamp");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn register_new_log(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoRegisterNewLogReq>,
        ) -> Result<tonic::Response<super::ProtoRegisterNewLogResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/RegisterNewLog");
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn get_committed_log(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoGetCommittedLogReq>,
        ) -> Result<tonic::Response<super::ProtoGetCommittedLogResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/quorumlog.GrpcLeader/GetCommittedLog");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcLeaderClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcLeaderClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcLeaderClient {{ ... }}")
        }
    }
}
#[doc = r" Generated client implementations."]
pub mod grpc_broker_callback_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Served by every broker. Called by the leader."]
    pub struct GrpcBrokerCallbackClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcBrokerCallbackClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcBrokerCallbackClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn notify_new_entry(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoNotifyNewEntryReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/quorumlog.GrpcBrokerCallback/NotifyNewEntry",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
        pub async fn notify_promotion(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoNotifyPromotionReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/quorumlog.GrpcBrokerCallback/NotifyPromotion",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcBrokerCallbackClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcBrokerCallbackClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcBrokerCallbackClient {{ ... }}")
        }
    }
}
#[doc = r" Generated client implementations."]
pub mod grpc_producer_callback_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Served by a producer that wants to hear about commits. Called by the leader."]
    pub struct GrpcProducerCallbackClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcProducerCallbackClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcProducerCallbackClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        pub async fn notify_committed(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoNotifyCommittedReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/quorumlog.GrpcProducerCallback/NotifyCommitted",
            );
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcProducerCallbackClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcProducerCallbackClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcProducerCallbackClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_leader_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcLeaderServer."]
    #[async_trait]
    pub trait GrpcLeader: Send + Sync + 'static {
        async fn register_broker(
            &self,
            request: tonic::Request<super::ProtoRegisterBrokerReq>,
        ) -> Result<tonic::Response<super::ProtoRegisterBrokerResult>, tonic::Status>;
        async fn get_log(
            &self,
            request: tonic::Request<super::ProtoGetLogReq>,
        ) -> Result<tonic::Response<super::ProtoGetLogResult>, tonic::Status>;
        async fn confirm_log_stored(
            &self,
            request: tonic::Request<super::ProtoConfirmLogStoredReq>,
        ) -> Result<tonic::Response<super::ProtoConfirmLogStoredResult>, tonic::Status>;
        async fn update_broker_timestamp(
            &self,
            request: tonic::Request<super::ProtoHeartbeatReq>,
        ) -> Result<tonic::Response<super::ProtoHeartbeatResult>, tonic::Status>;
        async fn register_new_log(
            &self,
            request: tonic::Request<super::ProtoRegisterNewLogReq>,
        ) -> Result<tonic::Response<super::ProtoRegisterNewLogResult>, tonic::Status>;
        async fn get_committed_log(
            &self,
            request: tonic::Request<super::ProtoGetCommittedLogReq>,
        ) -> Result<tonic::Response<super::ProtoGetCommittedLogResult>, tonic::Status>;
    }
    #[doc = " Served by the leader. Called by brokers, producers and consumers."]
    #[derive(Debug)]
    pub struct GrpcLeaderServer<T: GrpcLeader> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcLeader> GrpcLeaderServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcLeaderServer<T>
    where
        T: GrpcLeader,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/quorumlog.GrpcLeader/RegisterBroker" => {
                    #[allow(non_camel_case_types)]
                    struct RegisterBrokerSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoRegisterBrokerReq>
                        for RegisterBrokerSvc<T>
                    {
                        type Response = super::ProtoRegisterBrokerResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoRegisterBrokerReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).register_broker(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = RegisterBrokerSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcLeader/GetLog" => {
                    #[allow(non_camel_case_types)]
                    struct GetLogSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoGetLogReq> for GetLogSvc<T> {
                        type Response = super::ProtoGetLogResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoGetLogReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_log(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = GetLogSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcLeader/ConfirmLogStored" => {
                    #[allow(non_camel_case_types)]
                    struct ConfirmLogStoredSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoConfirmLogStoredReq>
                        for ConfirmLogStoredSvc<T>
                    {
                        type Response = super::ProtoConfirmLogStoredResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoConfirmLogStoredReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).confirm_log_stored(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = ConfirmLogStoredSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcLeader/UpdateBrokerTimestamp" => {
                    #[allow(non_camel_case_types)]
                    struct UpdateBrokerTimestampSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoHeartbeatReq>
                        for UpdateBrokerTimestampSvc<T>
                    {
                        type Response = super::ProtoHeartbeatResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoHeartbeatReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut =
                                async move { (*inner).update_broker_timestamp(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = UpdateBrokerTimestampSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcLeader/RegisterNewLog" => {
                    #[allow(non_camel_case_types)]
                    struct RegisterNewLogSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoRegisterNewLogReq>
                        for RegisterNewLogSvc<T>
                    {
                        type Response = super::ProtoRegisterNewLogResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoRegisterNewLogReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).register_new_log(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = RegisterNewLogSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcLeader/GetCommittedLog" => {
                    #[allow(non_camel_case_types)]
                    struct GetCommittedLogSvc<T: GrpcLeader>(pub Arc<T>);
                    impl<T: GrpcLeader> tonic::server::UnaryService<super::ProtoGetCommittedLogReq>
                        for GetCommittedLogSvc<T>
                    {
                        type Response = super::ProtoGetCommittedLogResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoGetCommittedLogReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).get_committed_log(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = GetCommittedLogSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcLeader> Clone for GrpcLeaderServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcLeader> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcLeader> tonic::transport::NamedService for GrpcLeaderServer<T> {
        const NAME: &'static str = "quorumlog.GrpcLeader";
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_broker_callback_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcBrokerCallbackServer."]
    #[async_trait]
    pub trait GrpcBrokerCallback: Send + Sync + 'static {
        async fn notify_new_entry(
            &self,
            request: tonic::Request<super::ProtoNotifyNewEntryReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status>;
        async fn notify_promotion(
            &self,
            request: tonic::Request<super::ProtoNotifyPromotionReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status>;
    }
    #[doc = " Served by every broker. Called by the leader."]
    #[derive(Debug)]
    pub struct GrpcBrokerCallbackServer<T: GrpcBrokerCallback> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcBrokerCallback> GrpcBrokerCallbackServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcBrokerCallbackServer<T>
    where
        T: GrpcBrokerCallback,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/quorumlog.GrpcBrokerCallback/NotifyNewEntry" => {
                    #[allow(non_camel_case_types)]
                    struct NotifyNewEntrySvc<T: GrpcBrokerCallback>(pub Arc<T>);
                    impl<T: GrpcBrokerCallback>
                        tonic::server::UnaryService<super::ProtoNotifyNewEntryReq>
                        for NotifyNewEntrySvc<T>
                    {
                        type Response = super::ProtoNotifyAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoNotifyNewEntryReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).notify_new_entry(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = NotifyNewEntrySvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/quorumlog.GrpcBrokerCallback/NotifyPromotion" => {
                    #[allow(non_camel_case_types)]
                    struct NotifyPromotionSvc<T: GrpcBrokerCallback>(pub Arc<T>);
                    impl<T: GrpcBrokerCallback>
                        tonic::server::UnaryService<super::ProtoNotifyPromotionReq>
                        for NotifyPromotionSvc<T>
                    {
                        type Response = super::ProtoNotifyAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoNotifyPromotionReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).notify_promotion(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = NotifyPromotionSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcBrokerCallback> Clone for GrpcBrokerCallbackServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcBrokerCallback> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcBrokerCallback> tonic::transport::NamedService for GrpcBrokerCallbackServer<T> {
        const NAME: &'static str = "quorumlog.GrpcBrokerCallback";
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_producer_callback_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcProducerCallbackServer."]
    #[async_trait]
    pub trait GrpcProducerCallback: Send + Sync + 'static {
        async fn notify_committed(
            &self,
            request: tonic::Request<super::ProtoNotifyCommittedReq>,
        ) -> Result<tonic::Response<super::ProtoNotifyAck>, tonic::Status>;
    }
    #[doc = " Served by a producer that wants to hear about commits. Called by the leader."]
    #[derive(Debug)]
    pub struct GrpcProducerCallbackServer<T: GrpcProducerCallback> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcProducerCallback> GrpcProducerCallbackServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcProducerCallbackServer<T>
    where
        T: GrpcProducerCallback,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/quorumlog.GrpcProducerCallback/NotifyCommitted" => {
                    #[allow(non_camel_case_types)]
                    struct NotifyCommittedSvc<T: GrpcProducerCallback>(pub Arc<T>);
                    impl<T: GrpcProducerCallback>
                        tonic::server::UnaryService<super::ProtoNotifyCommittedReq>
                        for NotifyCommittedSvc<T>
                    {
                        type Response = super::ProtoNotifyAck;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoNotifyCommittedReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).notify_committed(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = NotifyCommittedSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcProducerCallback> Clone for GrpcProducerCallbackServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcProducerCallback> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcProducerCallback> tonic::transport::NamedService for GrpcProducerCallbackServer<T> {
        const NAME: &'static str = "quorumlog.GrpcProducerCallback";
    }
}
