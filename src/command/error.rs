use failure::Fail;

use crate::mode::Mode;

use super::Verb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
	Protocol,
	Range,
	Mode,
}

/// Every way a command line can be rejected. `Display` is the reply text
/// following `ERROR: `.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
pub enum CommandError {
	#[fail(display = "Unknown command")]
	Unknown,
	#[fail(display = "Format is {}", usage)]
	Format { usage: &'static str },
	#[fail(display = "Address must be 0-8191")]
	AddressRange,
	#[fail(display = "Data must be 0-255")]
	DataRange,
	#[fail(display = "Value must be 0-255")]
	ValueRange,
	#[fail(display = "{} command only available in {} mode", verb, required)]
	WrongMode { verb: Verb, required: Mode },
}

impl CommandError {
	pub fn format(verb: Verb) -> Self {
		CommandError::Format { usage: verb.usage() }
	}

	pub fn wrong_mode(verb: Verb, required: Mode) -> Self {
		CommandError::WrongMode { verb, required }
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			CommandError::Unknown | CommandError::Format { .. } => ErrorKind::Protocol,
			CommandError::AddressRange | CommandError::DataRange | CommandError::ValueRange => ErrorKind::Range,
			CommandError::WrongMode { .. } => ErrorKind::Mode,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reply_texts() {
		assert_eq!(CommandError::Unknown.to_string(), "Unknown command");
		assert_eq!(
			CommandError::format(Verb::ProgramAddress).to_string(),
			"Format is PA;ADDRESS;DATA (e.g., PA;4096;215)",
		);
		assert_eq!(
			CommandError::wrong_mode(Verb::ValidateAddress, Mode::Validator).to_string(),
			"VA command only available in Validator mode",
		);
		assert_eq!(CommandError::AddressRange.to_string(), "Address must be 0-8191");
	}

	#[test]
	fn kinds() {
		assert_eq!(CommandError::Unknown.kind(), ErrorKind::Protocol);
		assert_eq!(CommandError::format(Verb::WriteDataBus).kind(), ErrorKind::Protocol);
		assert_eq!(CommandError::ValueRange.kind(), ErrorKind::Range);
		assert_eq!(CommandError::wrong_mode(Verb::ProgramAddress, Mode::Programmer).kind(), ErrorKind::Mode);
	}
}
