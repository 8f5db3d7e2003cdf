use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// The fixed taxonomy every collected record is bucketed into.
///
/// The declaration order is the order [`Category::all`] returns and the
/// order the balancer visits categories in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
	Readme,
	Docs,
	Guide,
	Reference,
	Changelog,
	Code,
	Other,
}

impl Category {
	pub const fn all() -> &'static [Category] {
		&[
			Self::Readme,
			Self::Docs,
			Self::Guide,
			Self::Reference,
			Self::Changelog,
			Self::Code,
			Self::Other,
		]
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Readme => "readme",
			Self::Docs => "docs",
			Self::Guide => "guide",
			Self::Reference => "reference",
			Self::Changelog => "changelog",
			Self::Code => "code",
			Self::Other => "other",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One scanned candidate entry of the corpus.
///
/// Records are produced by an external scanner and only ever read by the
/// filtering stages, which hand back new vectors instead of editing records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedRecord {
	/// Unique identifier, also the tie-breaker for deterministic ordering.
	pub record_id: String,
	/// Lowercase hex SHA-256 of the record content.
	pub content_sha256: String,
	/// Normalized word tokens used for near-duplicate detection.
	#[serde(default)]
	pub token_set: BTreeSet<String>,
	pub category: Category,
	#[serde(default)]
	pub is_readme: bool,
}

impl CollectedRecord {
	/// Build a record from raw content, hashing it and extracting its tokens.
	pub fn from_content(
		record_id: impl Into<String>,
		content: &str,
		category: Category,
		is_readme: bool,
	) -> Self {
		Self {
			record_id: record_id.into(),
			content_sha256: sha256_hex(content.as_bytes()),
			token_set: tokenize(content),
			category,
			is_readme,
		}
	}
}

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
	hex::encode(Sha256::digest(bytes))
}

/// Split text into the set of lower-cased alphanumeric words.
pub fn tokenize(text: &str) -> BTreeSet<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
		.collect()
}
