use crate::{Error, Result};

/// Construction-time knobs for a [`crate::Detector`]. There is no persisted state, no
/// environment-variable contract, and no on-disk format — a fresh config is built per request.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
	/// Minimum `weighted_lines_count` an emitted block must reach.
	pub min_lines_count: u32,
	/// Maximum gap (in blank/unrelated lines) tolerated when merging nearby blocks.
	pub max_gap: u32,
	pub gram_size_lower: usize,
	pub gram_size_upper: usize,
}

impl Default for DetectorConfig {
	fn default() -> Self {
		Self {
			min_lines_count: 2,
			max_gap: 2,
			gram_size_lower: 2,
			gram_size_upper: 3,
		}
	}
}

impl DetectorConfig {
	pub fn validate(&self) -> Result<()> {
		if self.min_lines_count == 0 {
			return Err(Error::invalid_config("min_lines_count must be >= 1"));
		}
		if self.gram_size_lower == 0 {
			return Err(Error::invalid_config("gram_size_lower must be >= 1"));
		}
		if self.gram_size_lower > self.gram_size_upper {
			return Err(Error::invalid_config("gram_size_lower must be <= gram_size_upper"));
		}
		Ok(())
	}
}

/// Minimum match score required for a fuzzy-index candidate, per the length-based threshold
/// policy: short removed texts (≤ 2 chars) need a lower bar since they carry fewer grams.
pub fn min_match_score(trim_text: &str) -> f64 {
	if trim_text.chars().count() > 2 { 0.5 } else { 0.35 }
}

/// Fixed density-filter floor on total matched characters; not a construction-time knob.
pub const MIN_CHAR_COUNT: usize = 20;
