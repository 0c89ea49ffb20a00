/*!
 * Sentinela Core
 *
 * Tipos, traits e utilitários compartilhados para a workspace Sentinela
 */

pub mod alert;
pub mod config;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;
pub mod utils;

// Re-exportações públicas
pub use alert::*;
pub use error::{Error, Result};
pub use registry::MaliciousRegistry;
pub use types::*;
