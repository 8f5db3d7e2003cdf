use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::balance::BalanceRange;
use crate::balance::apply_balance;
use crate::dedup::drop_exact_duplicates;
use crate::dedup::drop_near_duplicates;
use crate::readme::cap_readmes;
use crate::record::Category;
use crate::record::CollectedRecord;

/// Settings for the filtering stages applied to collected records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationOptions {
	/// Jaccard similarity at or above which a record counts as a near
	/// duplicate. Near-duplicate removal is skipped when unset.
	#[serde(default)]
	pub near_duplicate_threshold: Option<f64>,
	/// Largest share of readme records allowed. Capping is skipped when
	/// unset.
	#[serde(default)]
	pub max_readme_share: Option<f64>,
	/// Allowed share ranges keyed by category.
	#[serde(default)]
	pub balance: BTreeMap<Category, BalanceRange>,
}

/// Counts and output of a full curation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurationReport {
	pub input_count: usize,
	pub exact_duplicates_dropped: usize,
	pub near_duplicates_dropped: usize,
	pub readmes_dropped: usize,
	pub balance_dropped: usize,
	pub kept: Vec<CollectedRecord>,
	pub violations: Vec<String>,
}

impl CurationReport {
	pub fn total_dropped(&self) -> usize {
		self.exact_duplicates_dropped
			+ self.near_duplicates_dropped
			+ self.readmes_dropped
			+ self.balance_dropped
	}

	/// Whether every configured balance range was satisfied.
	pub fn is_balanced(&self) -> bool {
		self.violations.is_empty()
	}
}

/// Run exact dedup, near dedup, readme capping and balancing in order.
pub fn curate(records: Vec<CollectedRecord>, options: &CurationOptions) -> CurationReport {
	let input_count = records.len();

	let (records, exact_duplicates_dropped) = drop_exact_duplicates(records);
	tracing::debug!(dropped = exact_duplicates_dropped, kept = records.len(), "exact dedup");

	let (records, near_duplicates_dropped) = match options.near_duplicate_threshold {
		Some(threshold) => drop_near_duplicates(records, threshold),
		None => (records, 0),
	};
	tracing::debug!(dropped = near_duplicates_dropped, kept = records.len(), "near dedup");

	let (records, readmes_dropped) = match options.max_readme_share {
		Some(max_share) => cap_readmes(records, max_share),
		None => (records, 0),
	};
	tracing::debug!(dropped = readmes_dropped, kept = records.len(), "readme cap");

	let outcome = apply_balance(records, &options.balance);
	tracing::debug!(
		dropped = outcome.dropped,
		kept = outcome.kept.len(),
		violations = outcome.violations.len(),
		"balance"
	);

	CurationReport {
		input_count,
		exact_duplicates_dropped,
		near_duplicates_dropped,
		readmes_dropped,
		balance_dropped: outcome.dropped,
		kept: outcome.kept,
		violations: outcome.violations,
	}
}
