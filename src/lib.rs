//! capgate - HTTP gateway in front of an external capacitor network optimizer.
//!
//! A request flows through [`request`] (validation), [`command`] (argv),
//! [`optimizer`] (subprocess with a time budget) and [`result`] (JSON
//! parsing); [`error`] maps every failure onto an HTTP response.

pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod http_server;
pub mod optimizer;
pub mod request;
pub mod result;
pub mod state;

pub use command::{build_command, InvocationCommand};
pub use config::{CorsConfig, ServerConfig};
pub use error::{GatewayError, ServerError};
pub use optimizer::{check_outcome, Optimizer, ProcessOutcome, SubprocessOptimizer};
pub use request::{ConfigPayload, ConfigRequest};
pub use state::AppState;
