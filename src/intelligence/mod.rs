pub mod prompts;
pub mod provider;

pub use prompts::*;
pub use provider::*;
