use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::record::Category;
use crate::record::CollectedRecord;

/// Violation reported when balancing removes every record.
pub const NO_RECORDS_REMAIN: &str = "no records remain after balancing for configured balance ranges";

/// Allowed share of the final corpus for one category.
///
/// Only `max` drives removal. Balancing can drop records but never add them,
/// so `min` is checked after the fact and surfaces as a violation only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceRange {
	#[serde(default)]
	pub min: f64,
	pub max: f64,
}

impl BalanceRange {
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}

	fn contains(self, share: f64) -> bool {
		share >= self.min && share <= self.max
	}
}

/// The result of [`apply_balance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceOutcome {
	/// Surviving records in input order.
	pub kept: Vec<CollectedRecord>,
	/// Records removed across all passes.
	pub dropped: usize,
	/// Advisory messages for categories whose final share is out of range,
	/// sorted lexicographically.
	pub violations: Vec<String>,
}

/// Enforce per-category share ceilings.
///
/// Each pass computes ceilings against the records still kept and drops the
/// overflow of every category, highest record ids first. Dropping one
/// category's overflow changes every other share, so passes repeat until one
/// drops nothing. The final shares are then compared against the full ranges
/// and any mismatch is reported; violations never fail the call.
pub fn apply_balance(
	records: Vec<CollectedRecord>,
	ranges: &BTreeMap<Category, BalanceRange>,
) -> BalanceOutcome {
	if ranges.is_empty() || records.is_empty() {
		return BalanceOutcome {
			kept: records,
			..BalanceOutcome::default()
		};
	}

	let mut dropped_ids: HashSet<String> = HashSet::new();
	let mut dropped = 0;
	let mut passes = 0_usize;

	loop {
		let kept = kept_indices(&records, &dropped_ids);
		if kept.is_empty() {
			break;
		}

		passes += 1;
		let dropped_this_pass = apply_balance_pass(&records, &kept, ranges, &mut dropped_ids);
		tracing::debug!(pass = passes, total = kept.len(), dropped = dropped_this_pass, "balance pass");

		dropped += dropped_this_pass;
		if dropped_this_pass == 0 {
			break;
		}
	}

	let kept: Vec<CollectedRecord> = records
		.into_iter()
		.filter(|record| !dropped_ids.contains(&record.record_id))
		.collect();
	let violations = check_balance_violations(&kept, ranges);

	BalanceOutcome {
		kept,
		dropped,
		violations,
	}
}

fn kept_indices(records: &[CollectedRecord], dropped_ids: &HashSet<String>) -> Vec<usize> {
	records
		.iter()
		.enumerate()
		.filter(|(_, record)| !dropped_ids.contains(&record.record_id))
		.map(|(index, _)| index)
		.collect()
}

fn apply_balance_pass(
	records: &[CollectedRecord],
	kept: &[usize],
	ranges: &BTreeMap<Category, BalanceRange>,
	dropped_ids: &mut HashSet<String>,
) -> usize {
	let total = kept.len();
	let mut groups: BTreeMap<Category, Vec<&CollectedRecord>> = BTreeMap::new();
	for &index in kept {
		let record = &records[index];
		groups.entry(record.category).or_default().push(record);
	}

	let mut dropped_this_pass = 0;
	for category in Category::all() {
		let Some(range) = ranges.get(category) else {
			continue;
		};
		if range.max <= 0.0 {
			continue;
		}
		let Some(group) = groups.get_mut(category) else {
			continue;
		};

		let max_count = ((range.max * total as f64).ceil() as usize).max(1);
		if group.len() <= max_count {
			continue;
		}

		group.sort_by(|a, b| a.record_id.cmp(&b.record_id));
		for overflow in &group[max_count..] {
			if dropped_ids.insert(overflow.record_id.clone()) {
				dropped_this_pass += 1;
			}
		}
	}

	dropped_this_pass
}

pub(crate) fn check_balance_violations(
	records: &[CollectedRecord],
	ranges: &BTreeMap<Category, BalanceRange>,
) -> Vec<String> {
	if records.is_empty() {
		return vec![NO_RECORDS_REMAIN.to_string()];
	}

	let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
	for record in records {
		*counts.entry(record.category).or_default() += 1;
	}

	let total = records.len() as f64;
	let mut violations: Vec<String> = ranges
		.iter()
		.filter_map(|(category, range)| {
			let share = counts.get(category).copied().unwrap_or(0) as f64 / total;
			(!range.contains(share)).then(|| {
				format!(
					"{category} share {share:.4} outside [{:.4}, {:.4}]",
					range.min, range.max
				)
			})
		})
		.collect();
	violations.sort();

	violations
}
