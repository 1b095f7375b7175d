//! Option-value slugification and normalized variant keys.

/// Normalize a raw option value into a matchable token.
///
/// Lower-cases the input, folds every run of characters outside `[a-z0-9]`
/// into a single hyphen, and trims leading/trailing hyphens. The result is a
/// fixed point: slugifying a slug returns it unchanged.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Normalized key for the set of currently selected option values.
///
/// Built by slugifying each candidate, dropping empties, de-duplicating and
/// sorting the tokens, then joining with commas. The key is a pure function
/// of the token *set*: two keys built from the same tokens in any order
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariantKey(String);

impl VariantKey {
    /// Build a key from raw (not yet slugified) candidate values.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slugs: Vec<String> = tokens
            .into_iter()
            .map(|t| slugify(t.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        slugs.sort_unstable();
        slugs.dedup();
        VariantKey(slugs.join(","))
    }

    /// Re-normalize a comma-joined key string (e.g. a `variant` query param).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::from_tokens(raw.split(','))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the individual tokens of the key.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').filter(|t| !t.is_empty())
    }

    /// Whether `token` is one of the key's tokens.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens().any(|t| t == token)
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a size set with the given trigger token applies to `key`.
///
/// Pure membership: the trigger must be one of the key's tokens. Both sides
/// are expected to already be slugs.
#[must_use]
pub fn set_matches(trigger_token: &str, key: &VariantKey) -> bool {
    !trigger_token.is_empty() && key.contains(trigger_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_simple_value() {
        assert_eq!(slugify("Custom Size"), "custom-size");
    }

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("XL / Tall"), "xl-tall");
        assert_eq!(slugify("Uncle Arnie's"), "uncle-arnie-s");
    }

    #[test]
    fn slugify_trims_edge_hyphens() {
        assert_eq!(slugify("  --Custom--Size--  "), "custom-size");
    }

    #[test]
    fn slugify_non_ascii_becomes_separator() {
        assert_eq!(slugify("BRĒZ"), "br-z");
    }

    #[test]
    fn slugify_is_idempotent() {
        for raw in ["Custom Size", "XL / Tall", "brez", "  weird__Input 12 "] {
            let once = slugify(raw);
            assert_eq!(slugify(&once), once, "not a fixed point for {raw:?}");
        }
    }

    #[test]
    fn slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn key_is_order_independent() {
        let a = VariantKey::from_tokens(["Custom Size", "Red", "XL"]);
        let b = VariantKey::from_tokens(["XL", "Custom Size", "Red"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "custom-size,red,xl");
    }

    #[test]
    fn key_dedupes_tokens() {
        let key = VariantKey::from_tokens(["Red", "red", "RED!"]);
        assert_eq!(key.as_str(), "red");
    }

    #[test]
    fn key_drops_empty_candidates() {
        let key = VariantKey::from_tokens(["", "  ", "Blue"]);
        assert_eq!(key.as_str(), "blue");
        assert!(VariantKey::from_tokens(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn parse_renormalizes() {
        let key = VariantKey::parse("XL,custom-size,xl,");
        assert_eq!(key.as_str(), "custom-size,xl");
        assert_eq!(VariantKey::parse(key.as_str()), key);
    }

    #[test]
    fn contains_is_exact_token_membership() {
        let key = VariantKey::parse("custom-size,red");
        assert!(key.contains("custom-size"));
        assert!(key.contains("red"));
        assert!(!key.contains("custom"));
        assert!(!key.contains("size"));
    }

    #[test]
    fn set_matches_requires_membership() {
        let key = VariantKey::from_tokens(["Custom Size", "XL"]);
        assert!(set_matches("custom-size", &key));
        assert!(!set_matches("made-to-order", &key));
        assert!(!set_matches("", &key));
    }
}
