// Case-insensitive predicates over cached listing fields.

/// Substring match in the spirit of SQL `ILIKE '%x%'`. `%` wildcards in the
/// pattern are ignored, so `"%aspen%"` and `"aspen"` behave the same.
pub fn ilike(value: Option<&str>, pattern: &str) -> bool {
    let Some(value) = value else {
        return false;
    };
    let needle = pattern.replace('%', "").to_lowercase();
    value.to_lowercase().contains(needle.trim())
}

/// Case-insensitive equality for categorical fields such as city or status.
pub fn eq_ci(value: Option<&str>, expected: &str) -> bool {
    match value {
        Some(value) => value.trim().to_lowercase() == expected.trim().to_lowercase(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ilike_matches_substrings() {
        assert!(!ilike(None, "%x%"));
        assert!(ilike(Some("Aspen Meadows"), "aspen"));
        assert!(ilike(Some("Aspen Meadows"), "%MEADOW%"));
        assert!(!ilike(Some("Aspen Meadows"), "snowmass"));
    }

    #[test]
    fn eq_ci_ignores_case() {
        assert!(eq_ci(Some("Aspen"), "aspen"));
        assert!(!eq_ci(None, "aspen"));
        assert!(!eq_ci(Some("Aspen Village"), "aspen"));
    }
}
