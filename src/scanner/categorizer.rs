//! Keyword-based topic classification

use crate::types::Category;

/// Keyword sets in evaluation order. Earlier categories win on overlap.
pub const DEFAULT_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Sports,
        &[
            "nba", "nfl", "nhl", "mlb", "premier league", "champions league", "vs.", "game",
            "match", "winner", "playoff", "super bowl", "world cup", "olympics", "tennis", "golf",
            "f1", "formula", "boxing", "ufc", "mma", "spread:", "o/u", "lol:", "esports",
        ],
    ),
    (
        Category::Crypto,
        &[
            "bitcoin", "btc", "ethereum", "eth", "crypto", "solana", "sol", "token", "blockchain",
            "defi", "nft", "altcoin", "memecoin",
        ],
    ),
    (
        Category::Politics,
        &[
            "president", "election", "congress", "senate", "house", "democrat", "republican",
            "vote", "governor", "mayor", "trump", "biden", "cabinet", "nomination",
            "supreme court", "impeach", "legislation", "bill pass",
        ],
    ),
    (
        Category::Economics,
        &[
            "fed", "interest rate", "inflation", "gdp", "unemployment", "recession", "fomc",
            "treasury", "tariff", "trade",
        ],
    ),
    (
        Category::Geopolitics,
        &[
            "war", "strike", "invasion", "military", "iran", "russia", "china", "ukraine",
            "israel", "gaza", "hamas", "nato", "sanctions",
        ],
    ),
    (
        Category::Tech,
        &[
            "ai", "openai", "google", "apple", "tesla", "amazon", "meta", "microsoft", "chatgpt",
            "model", "launch", "acquisition",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "oscar", "grammy", "emmy", "movie", "album", "celebrity", "kardashian",
            "taylor swift", "elon musk tweet",
        ],
    ),
];

/// Classify with the built-in keyword table
pub fn categorize(question: &str) -> Category {
    let q = question.to_lowercase();
    DEFAULT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| q.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Editable keyword table, evaluated top to bottom
#[derive(Debug, Clone)]
pub struct Categorizer {
    table: Vec<(Category, Vec<String>)>,
}

impl Default for Categorizer {
    fn default() -> Self {
        let table = DEFAULT_KEYWORDS
            .iter()
            .map(|(category, keywords)| {
                (*category, keywords.iter().map(|k| k.to_string()).collect())
            })
            .collect();
        Self { table }
    }
}

impl Categorizer {
    /// Keywords are lowercased; order of `table` is the priority order
    pub fn with_table(table: Vec<(Category, Vec<String>)>) -> Self {
        let table = table
            .into_iter()
            .map(|(category, keywords)| {
                (category, keywords.into_iter().map(|k| k.to_lowercase()).collect())
            })
            .collect();
        Self { table }
    }

    pub fn categorize(&self, question: &str) -> Category {
        let q = question.to_lowercase();
        self.table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| q.contains(k.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    /// Add keywords to an existing category, or append it at lowest priority
    pub fn add_keywords(&mut self, category: Category, keywords: &[&str]) {
        let keywords = keywords.iter().map(|k| k.to_lowercase());
        match self.table.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => existing.extend(keywords),
            None => self.table.push((category, keywords.collect())),
        }
    }
}
