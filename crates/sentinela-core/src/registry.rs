/*!
 * Registro de endereços maliciosos
 *
 * Conjunto estático de carteiras e contratos ligados ao ataque de delegação.
 * Atualizações exigem uma nova versão do binário.
 */

use ethereum_types::Address;
use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::utils::{format_address, hex_to_address};

/// Endereços conhecidos (minúsculas)
pub const KNOWN_MALICIOUS: &[&str] = &[
    // delegator usado pelo mac-chi.vercel.app
    "0xee224caafbc78cc9a208bd22f8e7362b76eef4fa",
    "0x275b2f6af83f99c40fdabf5bc6b22e1b6c3f75b7",
];

static DEFAULT_REGISTRY: Lazy<MaliciousRegistry> =
    Lazy::new(|| MaliciousRegistry::from_entries(KNOWN_MALICIOUS.iter().copied()));

/// Conjunto somente leitura de endereços maliciosos
#[derive(Debug, Clone, Default)]
pub struct MaliciousRegistry {
    entries: HashSet<String>,
}

impl MaliciousRegistry {
    /// Registro padrão do processo
    pub fn global() -> &'static MaliciousRegistry {
        &DEFAULT_REGISTRY
    }

    /// Constrói um registro a partir de strings hexadecimais; entradas inválidas são ignoradas
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(hex_to_address)
            .map(|a| format_address(&a))
            .collect();
        Self { entries }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains(&format_address(address))
    }

    /// Consulta por string, sem diferenciar maiúsculas
    pub fn contains_str(&self, address: &str) -> bool {
        self.entries.contains(&address.trim().to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
