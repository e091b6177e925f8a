pub mod auth;
pub mod config;
pub mod crypto;
pub mod payment;
pub mod secrets;
pub mod store;

// Convenience re-exports
pub use auth::{
    AuthError, AuthorizationDecision, Authorizer, AuthorizerRequest, AuthorizerResponse, Effect,
    TokenPolicy,
};
pub use config::{ConfigError, PaygateConfig};
pub use crypto::{CryptoError, EncryptedBlob, KeyEncoding, SymmetricKey};
pub use payment::{
    handler::resolve_data_key, CardPayload, HandlerResponse, PaymentError, PaymentHandler,
    ProxyEvent,
};
pub use secrets::{EnvSecretSource, SecretSource, SecretValue, StaticSecretSource};
pub use store::{ObjectStoreRecordStore, RecordStore, StoreError, StoreSpec, StoredRecord};
