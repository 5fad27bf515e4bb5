pub mod types;
pub mod loader;
pub mod validator;
pub mod server;

pub use types::*;
pub use loader::*;
pub use validator::*;
pub use server::*;
