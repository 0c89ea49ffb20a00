/*!
 * Sentinela Detector
 *
 * Detecção de delegação EIP-7702 no código de contas, classificação de
 * risco, avaliação de ameaças e monitoramento periódico de carteiras.
 */

pub mod delegation;
mod bytecode_rules;
mod risk_classifier;
mod threat_assessor;
mod wallet_inspector;
mod tx_inspector;
mod wallet_scanner;
mod monitor;

pub use delegation::{detect, DelegationRule, Detection};
pub use bytecode_rules::*;
pub use risk_classifier::*;
pub use threat_assessor::*;
pub use wallet_inspector::*;
pub use tx_inspector::*;
pub use wallet_scanner::*;
pub use monitor::*;
