pub mod authorizer;
pub mod config;
pub mod decision;
pub mod error;
pub mod gateway;
pub mod validation;

pub use authorizer::Authorizer;
pub use config::{
    PrincipalMode, TokenPolicy, DEFAULT_PRINCIPAL_ID, DEFAULT_SIGNING_SECRET,
    PAYMENT_PROCESS_SCOPE,
};
pub use decision::{AuthorizationDecision, Effect};
pub use error::AuthError;
pub use gateway::{
    AuthorizerRequest, AuthorizerResponse, PolicyDocument, PolicyStatement, INVOKE_ACTION,
    POLICY_VERSION,
};
pub use validation::{Claims, TokenVerifier};
