pub mod context;
pub mod error;
pub mod template;

pub use context::CommandContext;
pub use error::ContextError;
pub use template::{REDACTED, preview, resolve};
