pub mod system;

pub use system::{EnvironmentContext, build_system_prompt};
