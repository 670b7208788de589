//! flowsiem Delivery
//!
//! Everything between a classified event and the SIEM manager.
//!
//! Provides:
//! - Token exchange and the authenticated event sink
//! - Fixed-size batching with best-effort, no-retry delivery
//! - File persistence for classify-now, send-later runs

pub mod auth;
pub mod batch;
pub mod connector;
pub mod endpoint;
pub mod persistence;
pub mod sink;

pub use auth::{AuthToken, Authenticator, Credentials, TokenAuthenticator};
pub use batch::{AccumulatorStats, BatchAccumulator, BatchTarget, SinkTarget};
pub use connector::{HttpConnector, SiemConnector};
pub use endpoint::{SiemConfig, SiemEndpoint};
pub use persistence::PersistenceStore;
pub use sink::{DeliveryReport, EventSink, HttpEventSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::auth::{AuthToken, Credentials};
    pub use crate::batch::{BatchAccumulator, BatchTarget, SinkTarget};
    pub use crate::connector::SiemConnector;
    pub use crate::persistence::PersistenceStore;
    pub use crate::sink::{DeliveryReport, EventSink};
}
