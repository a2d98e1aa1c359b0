use crate::config::MIN_CHAR_COUNT;
use crate::MatchingBlock;
use std::collections::HashMap;
use tracing::debug;

/// Groups blocks by `(removed_file, added_file)` and merges runs of blocks whose first/removed
/// gap is within `max_gap + 1` and whose added-side gap is likewise within bounds. Does not
/// synthesize the lines lying between the two merged blocks.
pub fn join_nearby_blocks(blocks: Vec<MatchingBlock>, max_gap: u32) -> Vec<MatchingBlock> {
	let max_space_between = max_gap + 1;

	let mut grouped: HashMap<(String, String), Vec<MatchingBlock>> = HashMap::new();
	for block in blocks {
		let key = (block.file_removed().to_string(), block.file_added().to_string());
		grouped.entry(key).or_default().push(block);
	}

	let mut result = Vec::new();
	for (_key, mut group) in grouped {
		group.sort_by(|a, b| {
			let a_first = a.first_removed.as_ref().map(|l| l.line_no).unwrap_or(0);
			let b_first = b.first_removed.as_ref().map(|l| l.line_no).unwrap_or(0);
			a_first
				.cmp(&b_first)
				.then(b.match_density.partial_cmp(&a.match_density).unwrap_or(std::cmp::Ordering::Equal))
		});

		let mut merged_indices = vec![false; group.len()];
		let mut merged_list = Vec::new();

		for i in 0..group.len() {
			let mut block = group[i].clone();
			let mut was_merged = false;
			for j in (i + 1)..group.len() {
				let next = &group[j];
				let cur_last_removed = block.last_removed.as_ref().unwrap().line_no;
				let next_first_removed = next.first_removed.as_ref().unwrap().line_no;
				if next_first_removed as i64 - cur_last_removed as i64 > max_space_between as i64 {
					break;
				}

				let cur_last_added = block.last_added.as_ref().unwrap().line_no;
				let next_first_added = next.first_added.as_ref().unwrap().line_no;

				if next_first_removed > cur_last_removed
					&& next_first_added as i64 - cur_last_added as i64 <= max_space_between as i64
					&& next_first_added > cur_last_added
				{
					block = MatchingBlock::merge(block, group[j].clone());
					was_merged = true;
					merged_indices[i] = true;
					merged_indices[j] = true;
				}
			}
			if was_merged {
				merged_list.push(block);
			}
		}

		for (i, was_merged) in merged_indices.iter().enumerate() {
			if !was_merged {
				result.push(group[i].clone());
			}
		}
		result.extend(merged_list);
	}

	result
}

/// Keeps a block iff `weighted_lines_count >= min_lines_count` AND `char_count >= 20`.
pub fn filter_out_small_blocks(blocks: Vec<MatchingBlock>, min_lines_count: u32) -> Vec<MatchingBlock> {
	blocks
		.into_iter()
		.filter(|b| b.weighted_lines_count >= min_lines_count as f64 && b.char_count >= MIN_CHAR_COUNT)
		.collect()
}

/// Trims trailing padding entries from each block, dropping blocks that become empty.
pub fn clear_trailing_empty_lines_and_drop_empty(blocks: Vec<MatchingBlock>) -> Vec<MatchingBlock> {
	blocks
		.into_iter()
		.filter_map(|mut block| if block.clear_empty_lines_at_end() { Some(block) } else { None })
		.collect()
}

/// Two-axis dominance filter: suppresses blocks wholly contained inside a stronger block on the
/// removed axis, then on the added axis. Pass B's subset-negation condition is preserved verbatim
/// per the reference behavior (see the design notes) even though it reads unusual.
pub fn filter_out_blocks_inside_other_blocks(mut blocks: Vec<MatchingBlock>) -> Vec<MatchingBlock> {
	// -- Pass A: removed axis
	blocks.sort_by(|a, b| {
		a.file_removed()
			.cmp(b.file_removed())
			.then(a.first_removed.as_ref().unwrap().line_no.cmp(&b.first_removed.as_ref().unwrap().line_no))
			.then(b.last_removed.as_ref().unwrap().line_no.cmp(&a.last_removed.as_ref().unwrap().line_no))
			.then(b.weighted_lines_count.partial_cmp(&a.weighted_lines_count).unwrap_or(std::cmp::Ordering::Equal))
	});

	let mut dominator: Option<usize> = None;
	for i in 0..blocks.len() {
		let Some(dom_idx) = dominator else {
			dominator = Some(i);
			continue;
		};
		let contained = {
			let dom = &blocks[dom_idx];
			let b = &blocks[i];
			b.file_removed() == dom.file_removed()
				&& b.first_removed.as_ref().unwrap().line_no >= dom.first_removed.as_ref().unwrap().line_no
				&& b.last_removed.as_ref().unwrap().line_no <= dom.last_removed.as_ref().unwrap().line_no
				&& b.weighted_lines_count < dom.weighted_lines_count
				&& b.removed_line_numbers.is_subset(&dom.removed_line_numbers)
		};
		if contained {
			blocks[i].remove_inside_larger = true;
		} else {
			dominator = Some(i);
		}
	}

	// -- Pass B: added axis
	blocks.sort_by(|a, b| {
		a.file_removed()
			.cmp(b.file_removed())
			.then(a.first_added.as_ref().unwrap().line_no.cmp(&b.first_added.as_ref().unwrap().line_no))
			.then(b.last_added.as_ref().unwrap().line_no.cmp(&a.last_added.as_ref().unwrap().line_no))
			.then(b.weighted_lines_count.partial_cmp(&a.weighted_lines_count).unwrap_or(std::cmp::Ordering::Equal))
	});

	let mut survivors = Vec::new();
	let mut dominator: Option<usize> = None;
	for i in 0..blocks.len() {
		if blocks[i].remove_inside_larger {
			continue;
		}
		let Some(dom_idx) = dominator else {
			dominator = Some(survivors.len());
			survivors.push(blocks[i].clone());
			continue;
		};
		let dom = &survivors[dom_idx];
		let b = &blocks[i];
		let discard = b.file_added() == dom.file_added()
			&& b.first_added.as_ref().unwrap().line_no >= dom.first_added.as_ref().unwrap().line_no
			&& b.last_added.as_ref().unwrap().line_no <= dom.last_added.as_ref().unwrap().line_no
			&& b.weighted_lines_count < dom.weighted_lines_count
			&& !b.added_line_numbers.is_subset(&dom.added_line_numbers);

		if !discard {
			dominator = Some(survivors.len());
			survivors.push(blocks[i].clone());
		}
	}

	debug!(survivors = survivors.len(), "dominance filter kept blocks");
	survivors
}

/// Applies the size/density filter, trailing-empty trim, and dominance filter, in that order.
pub fn filter_blocks(blocks: Vec<MatchingBlock>, min_lines_count: u32) -> Vec<MatchingBlock> {
	let blocks = filter_out_small_blocks(blocks, min_lines_count);
	let blocks = clear_trailing_empty_lines_and_drop_empty(blocks);
	filter_out_blocks_inside_other_blocks(blocks)
}
