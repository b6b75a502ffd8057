/// Locale-aware name ordering
///
/// Company and type listings are sorted with a proper collator instead of
/// byte order, so Czech names with diacritics ("Čedok", "Řempo") land
/// where a Czech reader expects them. Strength is secondary: case is
/// ignored, accents are not.
///
/// The collator is an explicit object handed through application state —
/// there is no process-wide locale setting anywhere in the service.
///
/// # Example
///
/// ```
/// use firmrate_shared::collation::NameCollator;
///
/// let collator = NameCollator::new("cs").unwrap();
///
/// let mut names = vec![
///     "Zemědělské družstvo".to_string(),
///     "Čedok".to_string(),
///     "Alza".to_string(),
/// ];
/// collator.sort(&mut names);
/// assert_eq!(names, vec!["Alza", "Čedok", "Zemědělské družstvo"]);
/// ```

use icu::collator::{Collator, CollatorOptions, Strength};
use icu::locid::Locale;
use std::cmp::Ordering;

/// Error type for collator construction
#[derive(Debug, thiserror::Error)]
pub enum CollationError {
    /// The locale tag could not be parsed
    #[error("Invalid locale tag: {0}")]
    InvalidLocale(String),

    /// No collation data for the locale
    #[error("Failed to build collator: {0}")]
    Data(String),
}

/// Collator for company and type name listings
pub struct NameCollator {
    collator: Collator,
}

impl NameCollator {
    /// Builds a collator for a BCP-47 locale tag (e.g. "cs")
    ///
    /// # Errors
    ///
    /// Returns an error if the tag does not parse or the locale has no
    /// collation data.
    pub fn new(locale_tag: &str) -> Result<Self, CollationError> {
        let locale: Locale = locale_tag
            .parse()
            .map_err(|_| CollationError::InvalidLocale(locale_tag.to_string()))?;

        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);

        let collator = Collator::try_new(&locale.into(), options)
            .map_err(|e| CollationError::Data(e.to_string()))?;

        Ok(Self { collator })
    }

    /// Compares two names under the configured locale
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }

    /// Sorts names in place under the configured locale
    pub fn sort(&self, names: &mut [String]) {
        names.sort_by(|a, b| self.collator.compare(a, b));
    }

    /// Sorts arbitrary items in place by a name key
    pub fn sort_by_key<T>(&self, items: &mut [T], key: impl Fn(&T) -> &str) {
        items.sort_by(|a, b| self.collator.compare(key(a), key(b)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_locale() {
        assert!(NameCollator::new("not a locale!").is_err());
    }

    #[test]
    fn test_case_insensitive() {
        let collator = NameCollator::new("cs").unwrap();
        assert_eq!(collator.compare("alza", "Alza"), Ordering::Equal);
    }

    #[test]
    fn test_diacritics_order_czech() {
        // In Czech collation, 'č' sorts after 'c' but before 'd'
        let collator = NameCollator::new("cs").unwrap();

        let mut names = vec![
            "Doma".to_string(),
            "Čedok".to_string(),
            "Centrum".to_string(),
        ];
        collator.sort(&mut names);
        assert_eq!(names, vec!["Centrum", "Čedok", "Doma"]);
    }

    #[test]
    fn test_ch_digraph_czech() {
        // Czech treats "ch" as its own letter between 'h' and 'i'
        let collator = NameCollator::new("cs").unwrap();

        let mut names = vec![
            "Ivo".to_string(),
            "Chemik".to_string(),
            "Hotel".to_string(),
        ];
        collator.sort(&mut names);
        assert_eq!(names, vec!["Hotel", "Chemik", "Ivo"]);
    }

    #[test]
    fn test_sort_by_key() {
        struct Item {
            name: String,
        }

        let collator = NameCollator::new("cs").unwrap();
        let mut items = vec![
            Item { name: "Šumava".to_string() },
            Item { name: "Sever".to_string() },
        ];
        collator.sort_by_key(&mut items, |i| &i.name);
        assert_eq!(items[0].name, "Sever");
        assert_eq!(items[1].name, "Šumava");
    }
}
