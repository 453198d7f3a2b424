mod broker;
mod callback_server;
mod consumer;
mod leader_client;
mod producer;

pub use broker::try_create_broker;
pub use broker::BrokerClient;
pub use broker::BrokerClientCreationError;
pub use broker::BrokerConfig;
pub use broker::BrokerOptions;
pub use consumer::ConsumerClient;
pub use leader_client::ConnectError;
pub use leader_client::LeaderCallError;
pub use leader_client::LeaderClient;
pub use producer::try_create_producer;
pub use producer::CommitNotifications;
pub use producer::ProducerClient;
pub use producer::ProducerClientCreationError;
pub use producer::ProducerConfig;
