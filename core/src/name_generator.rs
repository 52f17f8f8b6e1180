//! Deterministic handle generation for synthetic league peers.
//!
//! All generation is deterministic (same RNG seed = same handles).

use crate::rng::CohortRng;

/// Deterministic handle generator using curated word lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a display handle, e.g. "DividendNinja42".
    pub fn generate_handle(rng: &mut CohortRng) -> String {
        let prefix = rng.pick(Self::prefixes()).copied().unwrap_or("Investor");
        let suffix = rng.pick(Self::suffixes()).copied().unwrap_or("Pro");
        // Roughly a third of handles carry a number, like real sign-ups.
        if rng.next_u64_below(3) == 0 {
            format!("{prefix}{suffix}{}", rng.next_u64_below(99) + 1)
        } else {
            format!("{prefix}{suffix}")
        }
    }

    /// Generate a country flag for the standings table.
    pub fn generate_country(rng: &mut CohortRng) -> &'static str {
        rng.pick(Self::countries()).copied().unwrap_or("🇺🇸")
    }

    fn prefixes() -> &'static [&'static str] {
        &[
            "Value", "Growth", "Dividend", "Index", "Bond", "Stock", "Crypto", "Trend",
            "Market", "Fund", "Wealth", "Swing", "Momentum", "Quant", "Chart", "Green",
            "Global", "Patient", "Safety", "Risk", "Tech", "Contrarian", "LongTerm", "Compound",
        ]
    }

    fn suffixes() -> &'static [&'static str] {
        &[
            "Pro", "King", "Ninja", "Hunter", "Builder", "Seeker", "Master", "Fan",
            "Expert", "Trader", "Holder", "Investor", "Saver", "Whiz", "Scout", "Ace",
        ]
    }

    fn countries() -> &'static [&'static str] {
        &["🇺🇸", "🇬🇧", "🇨🇦", "🇦🇺", "🇩🇪", "🇫🇷", "🇯🇵", "🇸🇬", "🇮🇳", "🇧🇷"]
    }
}
