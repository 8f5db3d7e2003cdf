use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::record::CollectedRecord;

/// Keep the first record seen for every distinct content hash.
///
/// Returns the surviving records in input order and the number dropped.
pub fn drop_exact_duplicates(records: Vec<CollectedRecord>) -> (Vec<CollectedRecord>, usize) {
	let mut seen = HashSet::with_capacity(records.len());
	let mut kept = Vec::with_capacity(records.len());
	let mut dropped = 0;

	for record in records {
		if seen.contains(&record.content_sha256) {
			dropped += 1;
			continue;
		}
		seen.insert(record.content_sha256.clone());
		kept.push(record);
	}

	(kept, dropped)
}

/// Drop every record whose token set is at least `threshold` similar to a
/// record that was already kept.
///
/// Comparison is pairwise against the kept set, so the cost grows
/// quadratically. That is fine for the corpus sizes this is used with; larger
/// inputs need an indexed approximation such as MinHash with LSH buckets.
pub fn drop_near_duplicates(
	records: Vec<CollectedRecord>,
	threshold: f64,
) -> (Vec<CollectedRecord>, usize) {
	let mut kept: Vec<CollectedRecord> = Vec::with_capacity(records.len());
	let mut dropped = 0;

	for candidate in records {
		if near_duplicate_of_any(&candidate, &kept, threshold) {
			dropped += 1;
			continue;
		}
		kept.push(candidate);
	}

	(kept, dropped)
}

fn near_duplicate_of_any(
	candidate: &CollectedRecord,
	kept: &[CollectedRecord],
	threshold: f64,
) -> bool {
	kept.iter()
		.any(|current| jaccard(&candidate.token_set, &current.token_set) >= threshold)
}

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`, or `0.0` when either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let intersection = a.intersection(b).count();
	let union = a.len() + b.len() - intersection;
	if union == 0 {
		return 0.0;
	}

	intersection as f64 / union as f64
}
