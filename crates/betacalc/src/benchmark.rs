//! Benchmark index presets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Benchmark used when none is given.
pub const DEFAULT_BENCHMARK: &str = "^NSEI";

/// Well-known benchmark indices and their Yahoo Finance symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BenchmarkIndex {
    /// NIFTY 50
    Nifty50,

    /// S&P BSE SENSEX
    Sensex,

    /// NIFTY Bank
    NiftyBank,

    /// NIFTY IT
    NiftyIt,

    /// S&P 500
    Sp500,

    /// NASDAQ Composite
    Nasdaq,

    /// Dow Jones Industrial Average
    DowJones,

    /// FTSE 100
    Ftse100,

    /// Nikkei 225
    Nikkei225,
}

impl BenchmarkIndex {
    /// Returns all presets.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Nifty50,
            Self::Sensex,
            Self::NiftyBank,
            Self::NiftyIt,
            Self::Sp500,
            Self::Nasdaq,
            Self::DowJones,
            Self::Ftse100,
            Self::Nikkei225,
        ]
    }

    /// Yahoo Finance symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Nifty50 => "^NSEI",
            Self::Sensex => "^BSESN",
            Self::NiftyBank => "^NSEBANK",
            Self::NiftyIt => "^CNXIT",
            Self::Sp500 => "^GSPC",
            Self::Nasdaq => "^IXIC",
            Self::DowJones => "^DJI",
            Self::Ftse100 => "^FTSE",
            Self::Nikkei225 => "^N225",
        }
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nifty50 => "NIFTY 50",
            Self::Sensex => "S&P BSE SENSEX",
            Self::NiftyBank => "NIFTY Bank",
            Self::NiftyIt => "NIFTY IT",
            Self::Sp500 => "S&P 500",
            Self::Nasdaq => "NASDAQ Composite",
            Self::DowJones => "Dow Jones Industrial Average",
            Self::Ftse100 => "FTSE 100",
            Self::Nikkei225 => "Nikkei 225",
        }
    }

    /// Lowercase aliases accepted on input, besides the symbol itself.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Nifty50 => &["nifty", "nifty50", "nifty 50"],
            Self::Sensex => &["sensex", "bse"],
            Self::NiftyBank => &["banknifty", "niftybank", "nifty bank"],
            Self::NiftyIt => &["niftyit", "nifty it"],
            Self::Sp500 => &["sp500", "s&p500", "s&p 500", "spx"],
            Self::Nasdaq => &["nasdaq", "ixic"],
            Self::DowJones => &["dow", "djia", "dowjones"],
            Self::Ftse100 => &["ftse", "ftse100"],
            Self::Nikkei225 => &["nikkei", "nikkei225"],
        }
    }

    /// Find the preset whose symbol or alias matches `input`, ignoring case.
    pub fn lookup(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        Self::all().into_iter().find(|index| {
            index.symbol().eq_ignore_ascii_case(&needle) || index.aliases().contains(&needle.as_str())
        })
    }
}

impl fmt::Display for BenchmarkIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BenchmarkIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("Unknown benchmark index: {s}"))
    }
}

/// Resolve user input to a Yahoo Finance symbol.
///
/// Preset names map to their symbol; anything else is treated as a raw
/// symbol and upper-cased. Returns `None` for blank input.
pub fn resolve_benchmark(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(BenchmarkIndex::lookup(trimmed).map_or_else(
        || trimmed.to_ascii_uppercase(),
        |index| index.symbol().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("nifty", "^NSEI")]
    #[case("NIFTY 50", "^NSEI")]
    #[case("^nsei", "^NSEI")]
    #[case("sensex", "^BSESN")]
    #[case("S&P 500", "^GSPC")]
    #[case("dow", "^DJI")]
    #[case("^HSI", "^HSI")]
    #[case(" ^bvsp ", "^BVSP")]
    fn test_resolve_benchmark(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(resolve_benchmark(input).unwrap(), expected);
    }

    #[test]
    fn test_blank_benchmark() {
        assert_eq!(resolve_benchmark("  "), None);
    }

    #[test]
    fn test_default_is_a_preset() {
        assert_eq!(
            BenchmarkIndex::lookup(DEFAULT_BENCHMARK),
            Some(BenchmarkIndex::Nifty50)
        );
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for index in BenchmarkIndex::all() {
            assert!(seen.insert(index.symbol().to_ascii_lowercase()));
            for alias in index.aliases() {
                assert_eq!(*alias, alias.to_ascii_lowercase());
                assert!(seen.insert((*alias).to_string()), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "banknifty".parse::<BenchmarkIndex>().unwrap(),
            BenchmarkIndex::NiftyBank
        );
        assert!("nope".parse::<BenchmarkIndex>().is_err());
    }
}
