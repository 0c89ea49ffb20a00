/*! sentinela-remediation
 *
 * Remediação de carteiras comprometidas por delegação EIP-7702:
 * verificações prévias, cancelamento da delegação e transferência
 * emergencial dos fundos para um endereço seguro.
 */

pub mod authorization;
pub mod errors;
mod canceller;
mod emergency;
mod preflight;
mod set_code_tx;
mod submission;

pub use authorization::{authorization_hash, recover_authority, sign_authorization};
pub use canceller::*;
pub use emergency::*;
pub use errors::*;
pub use preflight::*;
pub use set_code_tx::*;
pub use submission::{GasSettings, SubmissionStage};
