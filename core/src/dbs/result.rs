use crate::sql::{Datetime, Object};
use std::collections::BTreeMap;

/// One row of the current result set. Identity covers both the payload
/// and the event timestamp, so a recomputation over a shifted window
/// counts as a new row even when the payload is unchanged.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) struct ResultRow {
	pub(crate) data: Object,
	pub(crate) time: Datetime,
}

/// The bag difference `cur \ prev`, preserving multiplicities: a row
/// occurring n times in `cur` and m times in `prev` appears
/// `max(n - m, 0)` times, in `cur` order.
pub(crate) fn bag_difference(cur: &[ResultRow], prev: &[ResultRow]) -> Vec<ResultRow> {
	let mut counts: BTreeMap<&ResultRow, usize> = BTreeMap::new();
	for r in prev {
		*counts.entry(r).or_default() += 1;
	}
	let mut out = Vec::new();
	for r in cur {
		match counts.get_mut(r) {
			Some(c) if *c > 0 => *c -= 1,
			_ => out.push(r.clone()),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sql::Value;

	fn row(n: i64, t: i64) -> ResultRow {
		ResultRow {
			data: Object(map! { String::from("n") => Value::from(n) }),
			time: Datetime::from_nanos(t),
		}
	}

	#[test]
	fn unchanged_rows_are_not_emitted() {
		let prev = vec![row(1, 1), row(2, 2)];
		let cur = vec![row(1, 1), row(2, 2), row(3, 3)];
		assert_eq!(bag_difference(&cur, &prev), vec![row(3, 3)]);
		assert_eq!(bag_difference(&prev, &cur), Vec::<ResultRow>::new());
	}

	#[test]
	fn multiplicities_are_preserved() {
		let prev = vec![row(1, 1)];
		let cur = vec![row(1, 1), row(1, 1)];
		assert_eq!(bag_difference(&cur, &prev), vec![row(1, 1)]);
	}

	#[test]
	fn identical_sets_diff_to_nothing() {
		let cur = vec![row(1, 1), row(1, 1)];
		assert!(bag_difference(&cur, &cur).is_empty());
	}

	#[test]
	fn timestamp_is_part_of_row_identity() {
		let prev = vec![row(1, 1)];
		let cur = vec![row(1, 2)];
		assert_eq!(bag_difference(&cur, &prev), vec![row(1, 2)]);
	}
}
