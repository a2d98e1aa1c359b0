use derive_more::{Display, From};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display, From)]
#[display("{self:?}")]
pub enum Error {
	#[display("{_0}")]
	#[from(String, &String, &str)]
	Custom(String),

	// -- Line records
	#[display("Malformed line record for file '{file}': {reason}")]
	MalformedLineRecord { file: String, line_no: u32, reason: String },

	// -- Config
	#[display("Invalid detector config: {reason}")]
	InvalidConfig { reason: String },
}

// region:    --- Custom

impl Error {
	pub fn malformed_line_record(file: impl Into<String>, line_no: u32, reason: impl Into<String>) -> Self {
		Self::MalformedLineRecord {
			file: file.into(),
			line_no,
			reason: reason.into(),
		}
	}

	pub fn invalid_config(reason: impl Into<String>) -> Self {
		Self::InvalidConfig { reason: reason.into() }
	}
}

// endregion: --- Custom

// region:    --- Error Boilerplate

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
