use crate::Line;
use serde::Serialize;

/// One paired row of a [`crate::MatchingBlock`]. At least one side is present; padding entries
/// created during gap-fill carry only one side with `match_probability = 0`.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingLine {
	pub removed_line: Option<Line>,
	pub added_line: Option<Line>,
	pub match_probability: f64,
}

impl MatchingLine {
	pub fn new(removed_line: Option<Line>, added_line: Option<Line>, match_probability: f64) -> Self {
		Self {
			removed_line,
			added_line,
			match_probability,
		}
	}
}
