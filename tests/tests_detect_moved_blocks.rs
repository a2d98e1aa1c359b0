//! Integration tests for the moved-block detection pipeline, covering the scenarios from the
//! crate's design notes (simple move, duplicate-paste fan-out, reindentation, blank-line
//! bridging, dominance suppression, and fuzzy small edits).
//!
//! Line texts across a single test are picked to be lexically distinct from one another, so that
//! n-gram cosine similarity between unrelated lines stays comfortably under the 0.5 threshold and
//! only the intended pairs match.

use blockmove::{detect_moved_blocks, DetectorConfig, LineRecord};

type Result<T> = core::result::Result<T, Box<dyn std::error::Error>>; // For tests.

fn rec(file: &str, line_no: u32, ws: &str, text: &str) -> LineRecord {
	LineRecord {
		file: file.to_string(),
		line_no,
		trim_text: text.to_string(),
		leading_whitespaces: ws.to_string(),
	}
}

#[test]
fn test_simple_move() -> Result<()> {
	// -- Setup: removed "R" 1..5, only 1..4 reappear in "A" at 12..15
	let items = ["umbrella_stand", "tangerine_peel", "obelisk_shadow", "nautilus_shell", "kerosene_lamp"];
	let removed: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("R", i as u32 + 1, "", t)).collect();
	let mut added = vec![rec("A", 10, "", "----"), rec("A", 11, "", "----")];
	added.extend(items[..4].iter().enumerate().map(|(i, t)| rec("A", i as u32 + 12, "", t)));
	added.push(rec("A", 16, "", "----"));

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check
	assert_eq!(blocks.len(), 1);
	let block = &blocks[0];
	assert_eq!(block.not_empty_lines, 4);
	assert_eq!(block.first_removed.as_ref().unwrap().line_no, 1);
	assert_eq!(block.last_removed.as_ref().unwrap().line_no, 4);
	assert_eq!(block.first_added.as_ref().unwrap().line_no, 12);
	assert_eq!(block.last_added.as_ref().unwrap().line_no, 15);

	Ok(())
}

#[test]
fn test_move_split_across_two_added_files() -> Result<()> {
	// -- Setup: removed "R" 1..9; "A1" carries items 2..4, "A2" carries items 3..6
	// -- (duplicate-paste fan-out: items 3 and 4 each appear in both added files)
	let items = ["acorn_press", "basalt_ridge", "citrus_grove", "dahlia_field", "ember_glow", "fennel_root", "garnet_vein", "hazel_copse", "iris_marsh"];
	let removed: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("R", i as u32 + 1, "", t)).collect();

	let a1: Vec<LineRecord> = items[1..4].iter().enumerate().map(|(i, t)| rec("A1", i as u32 + 13, "", t)).collect();
	let a2: Vec<LineRecord> = items[2..6].iter().enumerate().map(|(i, t)| rec("A2", i as u32 + 14, "", t)).collect();
	let mut added = a1;
	added.extend(a2);

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check
	assert_eq!(blocks.len(), 2);

	let to_a1 = blocks.iter().find(|b| b.file_added() == "A1").expect("block moved into A1");
	assert_eq!(to_a1.not_empty_lines, 3);
	assert_eq!(to_a1.first_removed.as_ref().unwrap().line_no, 2);
	assert_eq!(to_a1.last_removed.as_ref().unwrap().line_no, 4);

	let to_a2 = blocks.iter().find(|b| b.file_added() == "A2").expect("block moved into A2");
	assert_eq!(to_a2.not_empty_lines, 4);
	assert_eq!(to_a2.first_removed.as_ref().unwrap().line_no, 3);
	assert_eq!(to_a2.last_removed.as_ref().unwrap().line_no, 6);

	Ok(())
}

#[test]
fn test_uniform_reindentation() -> Result<()> {
	// -- Setup: removed lines at column 0, added lines prefixed with three spaces
	let items = ["vellum_page", "spindle_arm", "hollow_reed", "bramble_hedge"];
	let removed: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("R", i as u32 + 1, "", t)).collect();
	let added: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("A", i as u32 + 20, "   ", t)).collect();

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check
	assert_eq!(blocks.len(), 1);
	assert_eq!(blocks[0].not_empty_lines, 4);

	Ok(())
}

#[test]
fn test_blank_line_bridging() -> Result<()> {
	// -- Setup: removed carries an internal blank line; added is one line shorter (no blank)
	let removed = vec![
		rec("R", 1, "", "granite_slab"),
		rec("R", 2, "", "thistle_down"),
		rec("R", 3, "", "plumage_sheen"),
		rec("R", 4, "", ""),
		rec("R", 5, "", "marigold_bed"),
	];
	let added = vec![
		rec("A", 11, "", "granite_slab"),
		rec("A", 12, "", "thistle_down"),
		rec("A", 13, "", "plumage_sheen"),
		rec("A", 14, "", "marigold_bed"),
	];

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check
	assert_eq!(blocks.len(), 1);
	let block = &blocks[0];
	assert_eq!(block.not_empty_lines, 4);
	assert_eq!(block.first_removed.as_ref().unwrap().line_no, 1);
	assert_eq!(block.last_removed.as_ref().unwrap().line_no, 5);
	assert_eq!(block.first_added.as_ref().unwrap().line_no, 11);
	assert_eq!(block.last_added.as_ref().unwrap().line_no, 14);

	Ok(())
}

#[test]
fn test_dominance_suppresses_internal_submatches() -> Result<()> {
	// -- Setup: a 9-line repeating pattern moved whole; internal repeats would otherwise also
	// -- satisfy the size filter on their own.
	let pattern = ["linen_cloth", "copper_wire", "driftwood_log"];
	let removed: Vec<LineRecord> = (0..9u32).map(|i| rec("R", i + 1, "", pattern[(i as usize) % 3])).collect();
	let added: Vec<LineRecord> = (0..9u32).map(|i| rec("A", i + 11, "", pattern[(i as usize) % 3])).collect();

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check: exactly one block covering the full range, not the internal sub-matches
	assert_eq!(blocks.len(), 1);
	assert_eq!(blocks[0].first_removed.as_ref().unwrap().line_no, 1);
	assert_eq!(blocks[0].last_removed.as_ref().unwrap().line_no, 9);

	Ok(())
}

#[test]
fn test_fuzzy_small_edit_tolerance() -> Result<()> {
	// -- Setup: added lines carry a trailing "~~" suffix not present in the removed lines
	let removed = vec![
		rec("R", 1, "", "handle_incoming_event"),
		rec("R", 2, "", "dispatch_worker_task"),
		rec("R", 3, "", "resolve_symbol_alias"),
	];
	let added = vec![
		rec("A", 5, "", "handle_incoming_event~~"),
		rec("A", 6, "", "dispatch_worker_task~~"),
		rec("A", 7, "", "resolve_symbol_alias~~"),
	];

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;

	// -- Check
	assert_eq!(blocks.len(), 1);
	assert_eq!(blocks[0].not_empty_lines, 3);

	Ok(())
}

#[test]
fn test_output_is_serializable() -> Result<()> {
	// -- Setup
	let items = ["aardvark_den", "bumblebee_hive", "caribou_trail", "dolphin_arc"];
	let removed: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("R", i as u32 + 1, "", t)).collect();
	let added: Vec<LineRecord> = items.iter().enumerate().map(|(i, t)| rec("A", i as u32 + 1, "", t)).collect();

	// -- Exec
	let blocks = detect_moved_blocks(&removed, &added, DetectorConfig::default())?;
	let json = serde_json::to_string(&blocks)?;

	// -- Check
	assert!(json.contains("\"trim_text\""));
	assert!(json.contains("\"match_probability\""));

	Ok(())
}
