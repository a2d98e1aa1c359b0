use crate::{IndentationChange, Line, MatchingLine};
use serde::Serialize;
use std::collections::HashSet;

/// A maximal contiguous run of paired removed/added lines believed to be the same text moved
/// elsewhere. Derived fields are maintained incrementally as the extension engine grows the
/// block; see the module-level invariants in the crate docs.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingBlock {
	pub lines: Vec<MatchingLine>,

	#[serde(skip)]
	pub first_removed: Option<Line>,
	#[serde(skip)]
	pub first_added: Option<Line>,
	#[serde(skip)]
	pub last_removed: Option<Line>,
	#[serde(skip)]
	pub last_added: Option<Line>,

	#[serde(skip)]
	pub indentation_change: Option<IndentationChange>,

	#[serde(skip)]
	pub not_empty_lines: u32,
	#[serde(skip)]
	pub weighted_lines_count: f64,
	#[serde(skip)]
	pub char_count: usize,
	#[serde(skip)]
	pub weighted_chars_count: f64,
	#[serde(skip)]
	pub match_density: f64,

	#[serde(skip)]
	pub removed_line_numbers: HashSet<u32>,
	#[serde(skip)]
	pub added_line_numbers: HashSet<u32>,

	/// Set by the dominance filter's removed-axis pass, read by its added-axis pass.
	#[serde(skip)]
	pub remove_inside_larger: bool,
}

impl MatchingBlock {
	/// Seeds a new block from its first matched pair.
	pub fn from_line(removed: Line, added: Line, match_probability: f64) -> Self {
		let indentation_change = removed.calculate_indentation_change(&added);
		let char_count = removed.char_len() + added.char_len();
		let weighted_chars_count = char_count as f64 * match_probability;
		let match_density = if char_count == 0 { 0.0 } else { weighted_chars_count / char_count as f64 };

		let not_empty_lines = if removed.is_empty() { 0 } else { 1 };
		let weighted_lines_count = if removed.is_empty() { 0.0 } else { match_probability };

		let mut removed_line_numbers = HashSet::new();
		removed_line_numbers.insert(removed.line_no);
		let mut added_line_numbers = HashSet::new();
		added_line_numbers.insert(added.line_no);

		let first_removed = removed.clone();
		let first_added = added.clone();
		let last_removed = removed.clone();
		let last_added = added.clone();

		Self {
			lines: vec![MatchingLine::new(Some(removed), Some(added), match_probability)],
			first_removed: Some(first_removed),
			first_added: Some(first_added),
			last_removed: Some(last_removed),
			last_added: Some(last_added),
			indentation_change: Some(indentation_change),
			not_empty_lines,
			weighted_lines_count,
			char_count,
			weighted_chars_count,
			match_density,
			removed_line_numbers,
			added_line_numbers,
			remove_inside_larger: false,
		}
	}

	/// Attempts to extend the block with `(removed, added)`. Succeeds only if both sides are
	/// immediately consecutive with the block's current tail and the pair respects the block's
	/// fixed indentation change.
	pub fn try_extend(&mut self, removed: &Line, added: &Line, match_probability: f64) -> bool {
		let (Some(last_removed), Some(last_added)) = (&self.last_removed, &self.last_added) else {
			return false;
		};
		if !last_removed.is_line_before(removed) || !last_added.is_line_before(added) {
			return false;
		}
		let Some(change) = &self.indentation_change else {
			return false;
		};
		if !change.matches(removed, added) {
			return false;
		}

		if !removed.is_empty() {
			self.not_empty_lines += 1;
			self.weighted_lines_count += match_probability;
		}
		self.char_count += removed.char_len() + added.char_len();
		self.weighted_chars_count += (removed.char_len() + added.char_len()) as f64 * match_probability;
		self.match_density = if self.char_count == 0 { 0.0 } else { self.weighted_chars_count / self.char_count as f64 };
		self.removed_line_numbers.insert(removed.line_no);
		self.added_line_numbers.insert(added.line_no);

		self.lines.push(MatchingLine::new(Some(removed.clone()), Some(added.clone()), match_probability));
		self.last_removed = Some(removed.clone());
		self.last_added = Some(added.clone());
		true
	}

	/// Appends a padding entry carrying only the added side, advancing `last_added` without
	/// contributing to the counters.
	pub fn extend_with_empty_added(&mut self, added: Line) {
		self.last_added = Some(added.clone());
		self.lines.push(MatchingLine::new(None, Some(added), 0.0));
	}

	/// Appends a padding entry carrying only the removed side, advancing `last_removed` without
	/// contributing to the counters.
	pub fn extend_with_empty_removed(&mut self, removed: Line) {
		self.last_removed = Some(removed.clone());
		self.lines.push(MatchingLine::new(Some(removed), None, 0.0));
	}

	/// Drops trailing padding entries (a missing side on either half). Returns `false` if the
	/// block has no real pair left, in which case the caller must discard it.
	///
	/// The backward scan uses an exclusive lower bound of index 0 — the first line of a block is
	/// never inspected by this scan — mirrored verbatim from the reference behavior.
	pub fn clear_empty_lines_at_end(&mut self) -> bool {
		let len = self.lines.len();
		let mut last_index = None;
		if len > 1 {
			for i in (1..len).rev() {
				let ml = &self.lines[i];
				if ml.removed_line.is_none() || ml.added_line.is_none() {
					self.last_removed = None;
					self.last_added = None;
				} else {
					last_index = Some(i);
					break;
				}
			}
		}

		let Some(last_index) = last_index else {
			return false;
		};
		self.lines.truncate(last_index + 1);

		let new_len = self.lines.len();
		if new_len > 1 {
			for i in (1..new_len).rev() {
				if self.last_removed.is_some() && self.last_added.is_some() {
					break;
				}
				let ml = &self.lines[i];
				if self.last_removed.is_none() {
					if let Some(r) = &ml.removed_line {
						self.last_removed = Some(r.clone());
					}
				}
				if self.last_added.is_none() {
					if let Some(a) = &ml.added_line {
						self.last_added = Some(a.clone());
					}
				}
			}
		}

		self.last_removed.is_some() && self.last_added.is_some()
	}

	pub fn file_removed(&self) -> &str {
		self.last_removed.as_ref().map(|l| l.file.as_str()).unwrap_or_default()
	}

	pub fn file_added(&self) -> &str {
		self.last_added.as_ref().map(|l| l.file.as_str()).unwrap_or_default()
	}

	/// Field-wise union of `a` and `b`, used by the gap-merge pass. Does not synthesize the lines
	/// that lay between the two originals; `lines` is simply their concatenation.
	pub fn merge(a: MatchingBlock, b: MatchingBlock) -> MatchingBlock {
		let char_count = a.char_count + b.char_count;
		let weighted_chars_count = a.weighted_chars_count + b.weighted_chars_count;
		let match_density = if char_count == 0 { 0.0 } else { weighted_chars_count / char_count as f64 };

		let mut lines = a.lines;
		lines.extend(b.lines);

		let mut removed_line_numbers = a.removed_line_numbers;
		removed_line_numbers.extend(b.removed_line_numbers);
		let mut added_line_numbers = a.added_line_numbers;
		added_line_numbers.extend(b.added_line_numbers);

		MatchingBlock {
			lines,
			first_removed: a.first_removed.or(b.first_removed),
			first_added: a.first_added.or(b.first_added),
			last_removed: b.last_removed.or(a.last_removed),
			last_added: b.last_added.or(a.last_added),
			indentation_change: a.indentation_change,
			not_empty_lines: a.not_empty_lines + b.not_empty_lines,
			weighted_lines_count: a.weighted_lines_count + b.weighted_lines_count,
			char_count,
			weighted_chars_count,
			match_density,
			removed_line_numbers,
			added_line_numbers,
			remove_inside_larger: false,
		}
	}
}
