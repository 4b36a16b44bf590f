use serde::Serialize;

/// Coarse market band derived from the resolved multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    HighCostMetro,
    Metro,
    Standard,
    LowCost,
    NationalAverage,
}

impl CostTier {
    fn from_multiplier(multiplier: f64) -> Self {
        if multiplier >= 1.25 {
            Self::HighCostMetro
        } else if multiplier >= 1.05 {
            Self::Metro
        } else if multiplier >= 0.95 {
            Self::Standard
        } else {
            Self::LowCost
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighCostMetro => "High-Cost Metro",
            Self::Metro => "Metro",
            Self::Standard => "Standard Market",
            Self::LowCost => "Low-Cost Market",
            Self::NationalAverage => "National Average",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
    State,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalAdjustment {
    pub location: String,
    pub tier: CostTier,
    pub multiplier: f64,
    pub match_kind: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
}

#[derive(Debug, Clone)]
struct StateEntry {
    name: &'static str,
    abbreviation: &'static str,
    multiplier: f64,
}

/// City and state cost indices. Lookups never fail; unknown places resolve to 1.0.
#[derive(Debug, Clone)]
pub struct RegionalResolver {
    cities: Vec<(&'static str, f64)>,
    states: Vec<StateEntry>,
}

/// Minimum input length before a city key may contain the input (reverse substring match).
const REVERSE_MATCH_MIN_LEN: usize = 4;

fn normalize(location: &str) -> String {
    location
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
}

/// True when the location names the state in full or carries its abbreviation as a token.
pub(crate) fn mentions_state(location: &str, name: &str, abbreviation: &str) -> bool {
    let normalized = normalize(location);
    normalized.contains(name) || tokens(&normalized).any(|token| token == abbreviation)
}

impl RegionalResolver {
    pub fn standard() -> Self {
        Self {
            cities: vec![
                ("new york", 1.35),
                ("san francisco", 1.40),
                ("los angeles", 1.25),
                ("boston", 1.28),
                ("seattle", 1.20),
                ("chicago", 1.15),
                ("washington", 1.18),
                ("denver", 1.05),
                ("austin", 0.98),
                ("dallas", 0.95),
                ("houston", 0.94),
                ("atlanta", 0.96),
                ("miami", 1.05),
                ("nashville", 1.02),
                ("manchester", 0.99),
                ("phoenix", 0.97),
                ("charlotte", 0.93),
                ("memphis", 0.90),
                ("birmingham", 0.88),
            ],
            states: [
                ("california", "ca", 1.22),
                ("new york", "ny", 1.25),
                ("massachusetts", "ma", 1.20),
                ("new jersey", "nj", 1.18),
                ("district of columbia", "dc", 1.15),
                ("washington", "wa", 1.12),
                ("illinois", "il", 1.08),
                ("oregon", "or", 1.06),
                ("pennsylvania", "pa", 1.04),
                ("minnesota", "mn", 1.03),
                ("nevada", "nv", 1.03),
                ("colorado", "co", 1.02),
                ("michigan", "mi", 0.98),
                ("new hampshire", "nh", 0.98),
                ("virginia", "va", 0.97),
                ("florida", "fl", 0.96),
                ("utah", "ut", 0.96),
                ("arizona", "az", 0.95),
                ("ohio", "oh", 0.94),
                ("tennessee", "tn", 0.93),
                ("missouri", "mo", 0.93),
                ("texas", "tx", 0.92),
                ("georgia", "ga", 0.92),
                ("north carolina", "nc", 0.91),
                ("alabama", "al", 0.87),
                ("mississippi", "ms", 0.85),
            ]
            .into_iter()
            .map(|(name, abbreviation, multiplier)| StateEntry {
                name,
                abbreviation,
                multiplier,
            })
            .collect(),
        }
    }

    /// Resolve a free-text location: exact city, city substring, state, then national average.
    pub fn resolve(&self, location: &str) -> RegionalAdjustment {
        let normalized = normalize(location);
        let city_part = normalized
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default();

        if let Some((key, multiplier)) = self
            .cities
            .iter()
            .find(|(key, _)| *key == normalized || *key == city_part)
        {
            return self.matched(location, *multiplier, MatchKind::Exact, key);
        }

        // Longest key wins so "new york" is not shadowed by a shorter overlap.
        let substring = self
            .cities
            .iter()
            .filter(|(key, _)| {
                normalized.contains(key)
                    || (normalized.len() >= REVERSE_MATCH_MIN_LEN
                        && key.contains(normalized.as_str()))
            })
            .max_by_key(|(key, _)| key.len());
        if let Some((key, multiplier)) = substring {
            return self.matched(location, *multiplier, MatchKind::Substring, key);
        }

        if let Some(state) = self
            .states
            .iter()
            .find(|state| mentions_state(&normalized, state.name, state.abbreviation))
        {
            return self.matched(location, state.multiplier, MatchKind::State, state.name);
        }

        RegionalAdjustment {
            location: location.to_string(),
            tier: CostTier::NationalAverage,
            multiplier: 1.0,
            match_kind: MatchKind::Default,
            matched_key: None,
        }
    }

    fn matched(
        &self,
        location: &str,
        multiplier: f64,
        match_kind: MatchKind,
        key: &str,
    ) -> RegionalAdjustment {
        RegionalAdjustment {
            location: location.to_string(),
            tier: CostTier::from_multiplier(multiplier),
            multiplier,
            match_kind,
            matched_key: Some(key.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RegionalResolver {
        RegionalResolver::standard()
    }

    #[test]
    fn exact_city_match_uses_city_index() {
        let adjustment = resolver().resolve("Nashville, TN");
        assert_eq!(adjustment.match_kind, MatchKind::Exact);
        assert_eq!(adjustment.multiplier, 1.02);
        assert_eq!(adjustment.tier, CostTier::Standard);
    }

    #[test]
    fn substring_match_finds_city_inside_longer_text() {
        let adjustment = resolver().resolve("Downtown San Francisco Bay Area");
        assert_eq!(adjustment.match_kind, MatchKind::Substring);
        assert_eq!(adjustment.multiplier, 1.40);
        assert_eq!(adjustment.tier, CostTier::HighCostMetro);
    }

    #[test]
    fn reverse_substring_requires_four_characters() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("Nash").match_kind, MatchKind::Substring);
        assert_eq!(resolver.resolve("ton").match_kind, MatchKind::Default);
    }

    #[test]
    fn state_abbreviation_matches_as_whole_token() {
        let resolver = resolver();
        let adjustment = resolver.resolve("Franklin, TN");
        assert_eq!(adjustment.match_kind, MatchKind::State);
        assert_eq!(adjustment.multiplier, 0.93);

        // "ca" inside "Pecan Grove" must not read as California.
        assert_eq!(resolver.resolve("Pecan Grove").match_kind, MatchKind::Default);
    }

    #[test]
    fn unknown_location_defaults_to_national_average() {
        let adjustment = resolver().resolve("Somewhere remote");
        assert_eq!(adjustment.tier, CostTier::NationalAverage);
        assert_eq!(adjustment.multiplier, 1.0);
        assert!(adjustment.matched_key.is_none());
    }

    #[test]
    fn california_detection_accepts_name_or_code() {
        assert!(mentions_state("Fresno, CA", "california", "ca"));
        assert!(mentions_state("Sacramento California", "california", "ca"));
        assert!(!mentions_state("Chicago, IL", "california", "ca"));
    }
}
