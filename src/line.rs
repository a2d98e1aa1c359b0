use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Wire/input shape for a single removed or added line, as an upstream diff parser would produce it.
///
/// The core does not trust the caller's pre-split `leading_whitespaces`/`trim_text`; it
/// re-derives the split on [`Line`] construction (see [`Line::from_record`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRecord {
	pub file: String,
	pub line_no: u32,
	pub trim_text: String,
	pub leading_whitespaces: String,
}

/// An immutable, normalized source line.
///
/// Invariant: `leading_whitespace ++ trim_text` equals the original textual content (trailing
/// whitespace of `trim_text` is preserved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
	pub file: String,
	pub line_no: u32,
	#[serde(rename = "leading_whitespaces")]
	pub leading_whitespace: String,
	pub trim_text: String,
}

impl Line {
	/// Builds a `Line` from a [`LineRecord`], re-normalizing the whitespace/trim split from the
	/// concatenation of both fields rather than trusting the caller's split.
	pub fn from_record(record: &LineRecord) -> Result<Self> {
		if record.file.is_empty() {
			return Err(Error::malformed_line_record(&record.file, record.line_no, "file must not be empty"));
		}
		if record.line_no == 0 {
			return Err(Error::malformed_line_record(&record.file, record.line_no, "line_no must be >= 1"));
		}

		let text = format!("{}{}", record.leading_whitespaces, record.trim_text);
		let (leading_whitespace, trim_text) = split_leading_whitespace(&text);

		Ok(Self {
			file: record.file.clone(),
			line_no: record.line_no,
			leading_whitespace,
			trim_text,
		})
	}

	pub fn is_empty(&self) -> bool {
		self.trim_text.is_empty()
	}

	/// True iff `self` and `other` are in the same file and `self.line_no + 1 == other.line_no`.
	pub fn is_line_before(&self, other: &Line) -> bool {
		self.file == other.file && self.line_no + 1 == other.line_no
	}

	/// Computes the indentation change needed to go from `self`'s leading whitespace to `other`'s.
	pub fn calculate_indentation_change(&self, other: &Line) -> IndentationChange {
		let a = &self.leading_whitespace;
		let b = &other.leading_whitespace;
		if a.len() > b.len() {
			let cut = a.len() - b.len();
			IndentationChange {
				kind: IndentationKind::Removed,
				whitespace: a[..cut].to_string(),
			}
		} else {
			let cut = b.len() - a.len();
			IndentationChange {
				kind: IndentationKind::Added,
				whitespace: b[..cut].to_string(),
			}
		}
	}

	pub fn char_len(&self) -> usize {
		self.trim_text.chars().count()
	}
}

/// Splits `text` into `(leading_whitespace, trim_text)` using "characters up to the first
/// non-whitespace character" (space/tab only; that matches how indentation is expressed in
/// source code).
fn split_leading_whitespace(text: &str) -> (String, String) {
	let first_non_ws = text.find(|c: char| c != ' ' && c != '\t');
	match first_non_ws {
		Some(idx) => (text[..idx].to_string(), text[idx..].to_string()),
		None => (text.to_string(), String::new()),
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentationKind {
	Removed,
	Added,
}

/// The indentation delta between two lines, fixed at block-creation time and checked against
/// every subsequent non-empty pair added to that block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentationChange {
	pub kind: IndentationKind,
	pub whitespace: String,
}

impl IndentationChange {
	/// True iff non-empty `removed` and `added` match under this indentation change. Empty lines
	/// always match trivially under any indentation change.
	pub fn matches(&self, removed: &Line, added: &Line) -> bool {
		if removed.is_empty() || added.is_empty() {
			return true;
		}
		match self.kind {
			IndentationKind::Removed => removed.leading_whitespace == format!("{}{}", self.whitespace, added.leading_whitespace),
			IndentationKind::Added => format!("{}{}", self.whitespace, removed.leading_whitespace) == added.leading_whitespace,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rec(file: &str, line_no: u32, ws: &str, text: &str) -> LineRecord {
		LineRecord {
			file: file.to_string(),
			line_no,
			trim_text: text.to_string(),
			leading_whitespaces: ws.to_string(),
		}
	}

	#[test]
	fn test_from_record_splits_whitespace() -> Result<()> {
		// -- Setup
		let record = rec("a.rs", 1, "", "  let x = 1;");

		// -- Exec
		let line = Line::from_record(&record)?;

		// -- Check
		assert_eq!(line.leading_whitespace, "  ");
		assert_eq!(line.trim_text, "let x = 1;");

		Ok(())
	}

	#[test]
	fn test_from_record_rejects_zero_line_no() {
		// -- Setup
		let record = rec("a.rs", 0, "", "x");

		// -- Exec
		let res = Line::from_record(&record);

		// -- Check
		assert!(res.is_err());
	}

	#[test]
	fn test_is_line_before() -> Result<()> {
		// -- Setup
		let a = Line::from_record(&rec("a.rs", 3, "", "x"))?;
		let b = Line::from_record(&rec("a.rs", 4, "", "y"))?;
		let c = Line::from_record(&rec("b.rs", 4, "", "y"))?;

		// -- Check
		assert!(a.is_line_before(&b));
		assert!(!a.is_line_before(&c));

		Ok(())
	}

	#[test]
	fn test_indentation_change_added() -> Result<()> {
		// -- Setup
		let removed = Line::from_record(&rec("r.rs", 1, "", "foo()"))?;
		let added = Line::from_record(&rec("a.rs", 10, "   ", "foo()"))?;

		// -- Exec
		let change = removed.calculate_indentation_change(&added);

		// -- Check
		assert_eq!(change.kind, IndentationKind::Added);
		assert_eq!(change.whitespace, "   ");
		assert!(change.matches(&removed, &added));

		Ok(())
	}

	#[test]
	fn test_indentation_change_removed() -> Result<()> {
		// -- Setup
		let removed = Line::from_record(&rec("r.rs", 1, "    ", "foo()"))?;
		let added = Line::from_record(&rec("a.rs", 10, "  ", "foo()"))?;

		// -- Exec
		let change = removed.calculate_indentation_change(&added);

		// -- Check
		assert_eq!(change.kind, IndentationKind::Removed);
		assert_eq!(change.whitespace, "  ");
		assert!(change.matches(&removed, &added));

		Ok(())
	}

	#[test]
	fn test_empty_lines_match_under_any_change() -> Result<()> {
		// -- Setup
		let removed = Line::from_record(&rec("r.rs", 1, "    ", "foo()"))?;
		let added = Line::from_record(&rec("a.rs", 10, "  ", "foo()"))?;
		let change = removed.calculate_indentation_change(&added);

		let empty_removed = Line::from_record(&rec("r.rs", 2, "", ""))?;
		let empty_added = Line::from_record(&rec("a.rs", 11, "      ", ""))?;

		// -- Check
		assert!(change.matches(&empty_removed, &added));
		assert!(change.matches(&removed, &empty_added));

		Ok(())
	}
}
