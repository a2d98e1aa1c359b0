use crate::config::min_match_score;
use crate::{FuzzyIndex, Line, MatchingBlock};
use std::collections::HashMap;
use tracing::trace;

/// The streaming block-extension engine: a single pass over removed lines that grows candidate
/// blocks against matching added lines, emitting a block once it can no longer be extended.
pub struct ExtensionEngine<'a> {
	index: &'a FuzzyIndex,
	trim_text_to_added_lines: &'a HashMap<String, Vec<Line>>,
	added_by_position: &'a HashMap<(String, u32), Line>,
	removed_by_position: &'a HashMap<(String, u32), Line>,
}

impl<'a> ExtensionEngine<'a> {
	pub fn new(
		index: &'a FuzzyIndex,
		trim_text_to_added_lines: &'a HashMap<String, Vec<Line>>,
		added_by_position: &'a HashMap<(String, u32), Line>,
		removed_by_position: &'a HashMap<(String, u32), Line>,
	) -> Self {
		Self {
			index,
			trim_text_to_added_lines,
			added_by_position,
			removed_by_position,
		}
	}

	/// Runs the full pass over `removed_lines`, in input order, and returns every closed block.
	pub fn run(&self, removed_lines: &[Line]) -> Vec<MatchingBlock> {
		let mut detected: Vec<MatchingBlock> = Vec::new();
		let mut current: Vec<MatchingBlock> = Vec::new();
		let mut next: Vec<MatchingBlock> = Vec::new();

		for removed in removed_lines {
			let candidates: Vec<(f64, String)> = if !removed.is_empty() {
				let threshold = min_match_score(&removed.trim_text);
				self.extend_with_blank_added_runs(&mut current);
				self.index.query(&removed.trim_text, threshold, false)
			} else {
				vec![(1.0, String::new())]
			};

			if candidates.is_empty() {
				// No candidates at any gram size: a normal outcome, not an error. Skip this
				// removed line without closing the currently open blocks.
				continue;
			}

			for (probability, text) in &candidates {
				let Some(added_lines) = self.trim_text_to_added_lines.get(text) else {
					continue;
				};
				for added in added_lines {
					let mut consumed = Vec::new();
					for (i, block) in current.iter_mut().enumerate() {
						if block.try_extend(removed, added, *probability) {
							consumed.push(i);
						}
					}
					for &i in consumed.iter().rev() {
						next.push(current.remove(i));
					}
					if consumed.is_empty() && !removed.is_empty() {
						next.push(MatchingBlock::from_line(removed.clone(), added.clone(), *probability));
					}
				}
			}

			if removed.is_empty() {
				let mut still_open = Vec::with_capacity(current.len());
				for block in current.drain(..) {
					match self.next_removed_line(&block) {
						Some(next_removed) if next_removed.is_empty() => {
							let mut block = block;
							block.extend_with_empty_removed(next_removed);
							next.push(block);
						}
						_ => still_open.push(block),
					}
				}
				current = still_open;
			}

			detected.extend(current.drain(..));
			current = std::mem::take(&mut next);
		}

		detected.extend(current);
		trace!(detected = detected.len(), "extension engine produced raw blocks");
		detected
	}

	fn extend_with_blank_added_runs(&self, current: &mut [MatchingBlock]) {
		for block in current.iter_mut() {
			loop {
				let Some(next_added) = self.next_added_line(block) else { break };
				if next_added.is_empty() {
					block.extend_with_empty_added(next_added);
				} else {
					break;
				}
			}
		}
	}

	fn next_added_line(&self, block: &MatchingBlock) -> Option<Line> {
		let last = block.last_added.as_ref()?;
		self.added_by_position.get(&(last.file.clone(), last.line_no + 1)).cloned()
	}

	fn next_removed_line(&self, block: &MatchingBlock) -> Option<Line> {
		let last = block.last_removed.as_ref()?;
		self.removed_by_position.get(&(last.file.clone(), last.line_no + 1)).cloned()
	}
}
