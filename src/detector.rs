use crate::config::DetectorConfig;
use crate::extension::ExtensionEngine;
use crate::{postprocess, Error, FuzzyIndex, Line, LineRecord, MatchingBlock, Result};
use std::collections::HashMap;
use tracing::info;

/// Detects moved code blocks between a set of removed lines and a set of added lines.
///
/// One `Detector` processes one `(removed_lines, added_lines)` input set to completion; it owns
/// its fuzzy index and extension state exclusively and is not shared across concurrent
/// detections. Build a fresh detector per request.
pub struct Detector {
	config: DetectorConfig,
	removed_lines: Vec<Line>,
	index: FuzzyIndex,
	trim_text_to_added_lines: HashMap<String, Vec<Line>>,
	added_by_position: HashMap<(String, u32), Line>,
	removed_by_position: HashMap<(String, u32), Line>,
}

impl Detector {
	/// Builds a detector from already-normalized [`Line`]s.
	pub fn new(removed_lines: Vec<Line>, added_lines: Vec<Line>, config: DetectorConfig) -> Result<Self> {
		config.validate()?;

		let mut index = FuzzyIndex::new(config.gram_size_lower, config.gram_size_upper);
		let mut trim_text_to_added_lines: HashMap<String, Vec<Line>> = HashMap::new();
		let mut added_by_position = HashMap::new();

		for line in added_lines {
			index.add(&line.trim_text);
			added_by_position.insert((line.file.clone(), line.line_no), line.clone());
			trim_text_to_added_lines.entry(line.trim_text.clone()).or_default().push(line);
		}

		let mut removed_by_position = HashMap::new();
		for line in &removed_lines {
			removed_by_position.insert((line.file.clone(), line.line_no), line.clone());
		}

		Ok(Self {
			config,
			removed_lines,
			index,
			trim_text_to_added_lines,
			added_by_position,
			removed_by_position,
		})
	}

	/// Builds a detector from raw [`LineRecord`]s, normalizing each into a [`Line`]. Fails fast on
	/// the first malformed record; an empty sequence on either side is not an error.
	pub fn from_records(removed: &[LineRecord], added: &[LineRecord], config: DetectorConfig) -> Result<Self> {
		let removed_lines = removed.iter().map(Line::from_record).collect::<Result<Vec<_>>>()?;
		let added_lines = added.iter().map(Line::from_record).collect::<Result<Vec<_>>>()?;
		Self::new(removed_lines, added_lines, config)
	}

	pub fn config(&self) -> &DetectorConfig {
		&self.config
	}

	/// Runs the full detection pipeline: stream-extend, merge nearby blocks, filter by
	/// size/density, trim trailing empties, then apply the two-axis dominance filter.
	pub fn detect(&self) -> Vec<MatchingBlock> {
		let engine = ExtensionEngine::new(&self.index, &self.trim_text_to_added_lines, &self.added_by_position, &self.removed_by_position);
		let detected = engine.run(&self.removed_lines);
		let raw_count = detected.len();

		let merged = postprocess::join_nearby_blocks(detected, self.config.max_gap);
		let filtered = postprocess::filter_blocks(merged, self.config.min_lines_count);

		info!(
			raw = raw_count,
			filtered = filtered.len(),
			dropped = raw_count.saturating_sub(filtered.len()),
			"detected moved blocks"
		);

		filtered
	}
}

/// Convenience entry point mirroring [`Detector::from_records`] + [`Detector::detect`] for callers
/// that don't need to reuse the built index across requests.
pub fn detect_moved_blocks(removed: &[LineRecord], added: &[LineRecord], config: DetectorConfig) -> Result<Vec<MatchingBlock>> {
	Detector::from_records(removed, added, config).map(|d| d.detect())
}
