use std::collections::HashMap;

use crate::config::StateEntry;

/// Maps the geography encodings found upstream (two-letter code, FIPS, full
/// name) onto two-letter state codes.
#[derive(Debug, Clone)]
pub struct StateResolver {
    names_by_code: HashMap<String, String>,
    code_by_fips: HashMap<String, String>,
    code_by_name: HashMap<String, String>,
}

impl StateResolver {
    pub fn new(states: &[StateEntry]) -> Self {
        let mut names_by_code = HashMap::new();
        let mut code_by_fips = HashMap::new();
        let mut code_by_name = HashMap::new();

        for state in states {
            names_by_code.insert(state.code.clone(), state.name.clone());
            code_by_fips.insert(state.fips.clone(), state.code.clone());
            code_by_name.insert(state.name.to_lowercase(), state.code.clone());
        }

        StateResolver {
            names_by_code,
            code_by_fips,
            code_by_name,
        }
    }

    /// Resolve any supported encoding, trying code, then FIPS, then name.
    pub fn resolve(&self, area: &str) -> Option<&str> {
        let area = area.trim();
        if area.is_empty() {
            return None;
        }

        if self.names_by_code.contains_key(area) {
            return self.names_by_code.get_key_value(area).map(|(code, _)| code.as_str());
        }

        if let Some(code) = self.from_fips(area) {
            return Some(code);
        }

        self.code_by_name.get(&area.to_lowercase()).map(String::as_str)
    }

    /// Resolve a numeric FIPS code; `"6"` and `"06"` are equivalent.
    pub fn from_fips(&self, fips: &str) -> Option<&str> {
        let fips = fips.trim();
        if fips.is_empty() || !fips.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let padded = format!("{:0>2}", fips);
        self.code_by_fips.get(&padded).map(String::as_str)
    }

    pub fn name(&self, code: &str) -> Option<&str> {
        self.names_by_code.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn resolver() -> StateResolver {
        StateResolver::new(&Config::default().states)
    }

    #[test]
    fn test_resolve_each_encoding() {
        let r = resolver();
        assert_eq!(r.resolve("CA"), Some("CA"));
        assert_eq!(r.resolve("06"), Some("CA"));
        assert_eq!(r.resolve("6"), Some("CA"));
        assert_eq!(r.resolve("California"), Some("CA"));
        assert_eq!(r.resolve(" district of columbia "), Some("DC"));
    }

    #[test]
    fn test_unknown_geography() {
        let r = resolver();
        assert_eq!(r.resolve("99"), None);
        assert_eq!(r.resolve("PR"), None);
        assert_eq!(r.resolve("Atlantis"), None);
        assert_eq!(r.resolve(""), None);
    }

    #[test]
    fn test_from_fips_only_accepts_digits() {
        let r = resolver();
        assert_eq!(r.from_fips("48"), Some("TX"));
        assert_eq!(r.from_fips("TX"), None);
        assert_eq!(r.from_fips("72"), None);
    }

    #[test]
    fn test_name_lookup() {
        let r = resolver();
        assert_eq!(r.name("NY"), Some("New York"));
        assert_eq!(r.name("ZZ"), None);
    }
}
