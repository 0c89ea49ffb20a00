/*!
 * Sentinela Utils
 *
 * Utilitários comuns usados em toda a workspace Sentinela
 */

use ethereum_types::{Address, U256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

use crate::error::{Error, Result};

/// Casas decimais da moeda nativa
pub const NATIVE_DECIMALS: u8 = 18;

/// Remove o prefixo `0x`, se houver
pub fn strip_hex_prefix(hex: &str) -> &str {
    hex.strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex)
}

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    Address::from_str(strip_hex_prefix(hex)).ok()
}

/// Valida e converte um endereço informado pelo usuário.
///
/// Aceita endereços todo em minúsculas ou maiúsculas; com caixa mista o
/// checksum EIP-55 precisa conferir.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let body = strip_hex_prefix(trimmed);
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress(input.to_string()));
    }

    let address = Address::from_str(body).map_err(|_| Error::InvalidAddress(input.to_string()))?;

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address) != format!("0x{}", body) {
        return Err(Error::InvalidAddress(format!("{} (checksum inválido)", input)));
    }

    Ok(address)
}

/// Formata um endereço com checksum EIP-55
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Formata um Address para exibição (minúsculas)
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Codifica bytes como hexadecimal com prefixo `0x`
pub fn encode_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Seletor de função (4 primeiros bytes do Keccak da assinatura)
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `value * 10^decimals`
pub fn parse_units(value: &str, decimals: u8) -> Result<U256> {
    let value = value.trim();
    let (integer, fraction) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if fraction.len() > decimals as usize {
        return Err(Error::Validation(format!(
            "{} tem mais de {} casas decimais",
            value, decimals
        )));
    }

    let integer = if integer.is_empty() { "0" } else { integer };
    let mut digits = String::with_capacity(integer.len() + decimals as usize);
    digits.push_str(integer);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }

    U256::from_dec_str(&digits).map_err(|_| Error::Validation(format!("valor inválido: {}", value)))
}

/// Converte um valor na moeda nativa para wei
pub fn parse_ether(value: &str) -> Result<U256> {
    parse_units(value, NATIVE_DECIMALS)
}

/// `amount` gwei em wei
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(9)
}

/// Formata um valor com decimais para exibição
pub fn format_units(amount: &U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let divisor = U256::exp10(decimals as usize);
    let integer_part = *amount / divisor;
    let fractional_part = *amount % divisor;

    // Parte fracionária com zeros à esquerda
    let fractional_str = fractional_part.to_string();
    let mut padded_fractional = "0".repeat(decimals as usize - fractional_str.len());
    padded_fractional.push_str(&fractional_str);

    while padded_fractional.ends_with('0') {
        padded_fractional.pop();
    }

    if padded_fractional.is_empty() {
        format!("{}.0", integer_part)
    } else {
        format!("{}.{}", integer_part, padded_fractional)
    }
}

/// Formata wei na moeda nativa
pub fn format_ether(amount: &U256) -> String {
    format_units(amount, NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ether_handles_fractions() {
        assert_eq!(parse_ether("1").unwrap(), U256::exp10(18));
        assert_eq!(parse_ether("0.1").unwrap(), U256::exp10(17));
        assert_eq!(parse_ether("1.000000001").unwrap(), U256::exp10(18) + U256::exp10(9));
        assert!(parse_ether("0.0000000000000000001").is_err());
        assert!(parse_ether("abc").is_err());
    }

    #[test]
    fn format_ether_trims_zeros() {
        assert_eq!(format_ether(&U256::zero()), "0.0");
        assert_eq!(format_ether(&U256::exp10(18)), "1.0");
        assert_eq!(format_ether(&(U256::exp10(17) * 5)), "0.5");
    }

    #[test]
    fn checksum_matches_eip55_vector() {
        let addr = hex_to_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(to_checksum(&addr), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn parse_address_validates_checksum() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert!(parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_ok());
        assert!(parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
        assert!(matches!(
            parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(parse_address("0x1234"), Err(Error::InvalidAddress(_))));
        assert!(matches!(parse_address("not an address"), Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn selector_of_transfer() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }
}
