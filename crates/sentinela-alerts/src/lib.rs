/*! sentinela-alerts
 *
 * Destinos de alertas de ameaça: armazenamento limitado em memória com
 * estatísticas e envio para um webhook HTTP.
 */

mod fanout;
mod store;
mod webhook;

pub use fanout::*;
pub use store::*;
pub use webhook::*;
