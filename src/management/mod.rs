mod credentials;
mod session;

pub use credentials::CredentialStore;
pub use credentials::StoredCredential;
pub use session::Credentials;
pub use session::SampledTracks;
pub use session::SessionContext;
pub use session::SessionManager;
