use crate::record::CollectedRecord;

/// Bound readme records to at most `max_share` of the result.
///
/// The cap is derived from the non-readme count so that readmes make up no
/// more than `max_share` of the combined output, with at least one readme
/// always allowed. When the cap applies, the readmes with the lowest record
/// ids survive and the whole result is sorted by record id.
///
/// A share outside the open interval `(0, 1)` disables the cap. With no
/// non-readme records left to anchor the share, every readme is dropped.
pub fn cap_readmes(records: Vec<CollectedRecord>, max_share: f64) -> (Vec<CollectedRecord>, usize) {
	if max_share <= 0.0 || max_share >= 1.0 || records.is_empty() {
		return (records, 0);
	}

	let readme_count = records.iter().filter(|record| record.is_readme).count();
	let non_readme_count = records.len() - readme_count;
	if non_readme_count == 0 {
		return (Vec::new(), readme_count);
	}

	let max_readmes = max_readme_count(max_share, non_readme_count);
	if readme_count <= max_readmes {
		return (records, 0);
	}

	let (mut readmes, non_readmes): (Vec<_>, Vec<_>) =
		records.into_iter().partition(|record| record.is_readme);

	readmes.sort_by(|a, b| a.record_id.cmp(&b.record_id));
	readmes.truncate(max_readmes);
	let dropped = readme_count - readmes.len();

	let mut combined = non_readmes;
	combined.extend(readmes);
	combined.sort_by(|a, b| a.record_id.cmp(&b.record_id));

	(combined, dropped)
}

fn max_readme_count(max_share: f64, non_readme_count: usize) -> usize {
	let allowed = ((max_share * non_readme_count as f64) / (1.0 - max_share)).floor();
	(allowed as usize).max(1)
}
