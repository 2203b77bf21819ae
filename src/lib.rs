pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod repository;
pub mod session;
pub mod validation;
pub mod view;

pub use api::ApiClient;
pub use auth::{AuthService, LoginFailure};
pub use error::{ClientError, Result};
pub use session::{Session, SessionStore};
pub use view::{CollectionView, ViewScope};
