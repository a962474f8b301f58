pub mod config;
pub mod error;
pub mod state;
pub mod traits;

pub use config::AppConfig;
pub use error::{FlowError, Result};
pub use state::{StateUpdate, WorkflowState};
