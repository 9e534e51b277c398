pub mod config;
pub mod context;
pub mod error;
pub mod template;

pub use config::{DeployConfig, HostConfig};
pub use context::DeployContext;
pub use error::AppError;
pub use template::Template;
