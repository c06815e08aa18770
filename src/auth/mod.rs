// Authentication module
// Registration, login, dual JWT tokens, email verification and password reset

pub mod error;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod models;
pub mod notifier;
pub mod opaque;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    delete_me_handler, login_handler, me_handler, refresh_handler, register_handler,
    request_password_reset_handler, resend_verification_handler, reset_password_handler,
    update_me_handler, verify_email_handler,
};
pub use memory::InMemoryCredentialStore;
pub use middleware::{authenticate, require_auth, AuthenticatedAccount};
pub use models::{
    Account, AccountId, AccountResponse, AuthResponse, LoginRequest, RefreshRequest,
    RegisterRequest, TokenPair,
};
pub use notifier::{LogNotifier, Notifier, NotifyError};
pub use password::{HashCost, PasswordService};
pub use repository::{CredentialStore, PgCredentialStore};
pub use service::AuthService;
pub use token::{Claims, TokenService, TokenType};
