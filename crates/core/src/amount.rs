//! Token amounts in base units.

/// Amount of a token in its smallest unit.
///
/// `u128` comfortably holds `10^9` whole tokens at 18 decimals (`10^27`).
pub type Amount = u128;

/// Scale `whole` tokens into base units for a token with `decimals` places.
///
/// Returns `None` on overflow.
pub fn units(whole: u128, decimals: u8) -> Option<Amount> {
    10u128
        .checked_pow(u32::from(decimals))
        .and_then(|scale| whole.checked_mul(scale))
}

/// Serde adapter writing amounts as decimal strings.
///
/// JSON numbers are not portable past `u64`, and `serde_json::Value` cannot
/// hold them at all. Use with `#[serde(with = "spacedao_core::amount::decimal")]`.
pub mod decimal {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| D::Error::custom(format!("invalid amount {raw:?}: {e}")))
    }
}
