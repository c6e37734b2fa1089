//! Read-only lookup of descriptive meanings for fine color keys
//!
//! The core never loads or owns a meaning table.
//! Callers build one (e.g. from a JSON file) and pass it in where meanings are needed.
//! A missing key is not an error, it just means there is nothing to say about that color.

use std::collections::HashMap;

/// Descriptive text for a color category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meaning {
	/// A one line interpretation
	#[cfg_attr(feature = "serde", serde(default))]
	pub short: String,
	/// An extended interpretation
	#[cfg_attr(feature = "serde", serde(default))]
	pub long: String,
	/// The associated chakra, if any
	#[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
	pub chakra: Option<String>,
}

/// A case-insensitive mapping from fine color keys to [`Meaning`]s
pub trait MeaningLookup {
	/// Returns the meaning for `key`, ignoring case
	fn lookup(&self, key: &str) -> Option<&Meaning>;
}

/// An immutable [`MeaningLookup`] backed by a hash map with lowercase keys
///
/// With the `serde` feature, this deserializes from a map of keys to meanings:
///
/// ```json
/// { "red": { "short": "...", "long": "...", "chakra": "Root" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "HashMap<String, Meaning>"))]
pub struct MeaningTable {
	/// Lowercase key -> meaning
	entries: HashMap<String, Meaning>,
}

impl MeaningTable {
	/// Create an empty table
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// The number of entries in this table
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether this table has no entries
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K: AsRef<str>> FromIterator<(K, Meaning)> for MeaningTable {
	fn from_iter<I: IntoIterator<Item = (K, Meaning)>>(iter: I) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(key, meaning)| (key.as_ref().to_lowercase(), meaning))
				.collect(),
		}
	}
}

impl From<HashMap<String, Meaning>> for MeaningTable {
	fn from(entries: HashMap<String, Meaning>) -> Self {
		entries.into_iter().collect()
	}
}

impl MeaningLookup for MeaningTable {
	fn lookup(&self, key: &str) -> Option<&Meaning> {
		self.entries.get(&key.to_lowercase())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn meaning(short: &str) -> Meaning {
		Meaning {
			short: short.to_owned(),
			long: format!("{short}, but longer"),
			chakra: None,
		}
	}

	#[test]
	fn lookup_ignores_case() {
		let table = [("Red", meaning("passion")), ("blue", meaning("calm"))]
			.into_iter()
			.collect::<MeaningTable>();

		assert_eq!(table.len(), 2);
		assert_eq!(table.lookup("red"), Some(&meaning("passion")));
		assert_eq!(table.lookup("RED"), Some(&meaning("passion")));
		assert_eq!(table.lookup("Blue"), Some(&meaning("calm")));
	}

	#[test]
	fn missing_key_is_none() {
		let table = MeaningTable::new();
		assert!(table.is_empty());
		assert_eq!(table.lookup("turquoise"), None);
	}

	#[test]
	#[cfg(feature = "serde")]
	#[allow(clippy::unwrap_used)]
	fn deserialize_from_json() {
		let json = r#"{
			"Green": { "short": "growth", "long": "growth and renewal", "chakra": "Heart" },
			"grey": { "short": "balance" }
		}"#;

		let table: MeaningTable = serde_json::from_str(json).unwrap();

		let green = table.lookup("green").unwrap();
		assert_eq!(green.short, "growth");
		assert_eq!(green.chakra.as_deref(), Some("Heart"));

		let grey = table.lookup("GREY").unwrap();
		assert_eq!(grey.long, "");
		assert_eq!(grey.chakra, None);
	}
}
