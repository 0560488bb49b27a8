use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Display metadata of a token: name, ticker symbol, decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenMetadata {
    name: Cow<'static, str>,
    symbol: Cow<'static, str>,
    decimals: u8,
}

impl TokenMetadata {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        symbol: impl Into<Cow<'static, str>>,
        decimals: u8,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    pub const fn from_static(name: &'static str, symbol: &'static str, decimals: u8) -> Self {
        Self {
            name: Cow::Borrowed(name),
            symbol: Cow::Borrowed(symbol),
            decimals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}
