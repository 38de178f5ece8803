//! Exchange identifiers and Yahoo symbol formatting.

use std::fmt;
use std::str::FromStr;

/// Exchanges Hobart screens across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// NASDAQ.
    Nasdaq,
    /// New York Stock Exchange.
    Nyse,
    /// Toronto Stock Exchange.
    Tsx,
    /// Canadian Securities Exchange.
    Cse,
}

impl Exchange {
    /// Every supported exchange.
    pub const ALL: [Self; 4] = [Self::Nasdaq, Self::Nyse, Self::Tsx, Self::Cse];

    /// Short code used for symbol files and persistence.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Nasdaq => "nas",
            Self::Nyse => "nyse",
            Self::Tsx => "tsx",
            Self::Cse => "cse",
        }
    }

    /// Parse a short code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "nas" | "nasdaq" => Some(Self::Nasdaq),
            "nyse" => Some(Self::Nyse),
            "tsx" => Some(Self::Tsx),
            "cse" => Some(Self::Cse),
            _ => None,
        }
    }

    /// Format a listed symbol the way Yahoo Finance expects it.
    ///
    /// US listings pass through unchanged; Canadian listings carry an
    /// exchange suffix.
    pub fn yahoo_symbol(self, symbol: &str) -> String {
        let symbol = symbol.to_uppercase();
        match self {
            Self::Tsx => format!("{symbol}.TO"),
            Self::Cse => format!("{symbol}.CN"),
            Self::Nasdaq | Self::Nyse => symbol,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nasdaq => "NASDAQ",
            Self::Nyse => "NYSE",
            Self::Tsx => "TSX",
            Self::Cse => "CSE",
        };
        f.write_str(name)
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unknown exchange: {s}"))
    }
}
