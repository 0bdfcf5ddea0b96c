use std::fmt;

use crate::bus::ADDRESS_MAX;
use crate::mode::Mode;

mod error;
mod line;

pub use self::error::{
	CommandError,
	ErrorKind,
};
pub use self::line::LineBuffer;

pub const DELIMITER: char = ';';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
	Switch(Mode),
	ReadAddress,
	ReadData,
	ProgramAddress,
	ValidateAddress,
	WriteDataBus,
	Status,
}

impl Verb {
	pub fn lookup(verb: &str) -> Option<Verb> {
		if let Some(mode) = Mode::from_verb(verb) {
			return Some(Verb::Switch(mode));
		}
		Some(match verb {
			"RDA" => Verb::ReadAddress,
			"RDD" => Verb::ReadData,
			"PA" => Verb::ProgramAddress,
			"VA" => Verb::ValidateAddress,
			"WDB" => Verb::WriteDataBus,
			"STATUS" | "?" => Verb::Status,
			_ => return None,
		})
	}

	pub fn name(self) -> &'static str {
		match self {
			Verb::Switch(mode) => mode.verb(),
			Verb::ReadAddress => "RDA",
			Verb::ReadData => "RDD",
			Verb::ProgramAddress => "PA",
			Verb::ValidateAddress => "VA",
			Verb::WriteDataBus => "WDB",
			Verb::Status => "STATUS",
		}
	}

	pub fn usage(self) -> &'static str {
		match self {
			Verb::ProgramAddress => "PA;ADDRESS;DATA (e.g., PA;4096;215)",
			Verb::ValidateAddress => "VA;ADDRESS (e.g., VA;4096)",
			Verb::WriteDataBus => "WDB;VALUE (e.g., WDB;123 or WDB;0xFF)",
			_ => self.name(),
		}
	}

	pub fn required_mode(self) -> Option<Mode> {
		match self {
			Verb::ProgramAddress => Some(Mode::Programmer),
			Verb::ValidateAddress => Some(Mode::Validator),
			Verb::WriteDataBus => Some(Mode::Debug),
			_ => None,
		}
	}

	fn takes_arguments(self) -> bool {
		self.required_mode().is_some()
	}
}

impl fmt::Display for Verb {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
	Switch(Mode),
	ReadAddress,
	ReadData,
	ProgramAddress { address: u16, data: u8 },
	ValidateAddress { address: u16 },
	WriteDataBus { value: u8 },
	Status,
}

/// Copy at most `capacity - 1` bytes of `line` and upper-case them.
pub fn tokenize(line: &[u8], capacity: usize) -> String {
	let len = line.len().min(capacity.saturating_sub(1));
	let mut token = line[..len].to_vec();
	token.make_ascii_uppercase();
	String::from_utf8_lossy(&token).into_owned()
}

// Parse the leading digits of `field`. `None` if there are none; values
// that do not fit saturate, so they fail the range check later.
fn parse_number(field: &str, radix: u32) -> Option<u32> {
	let field = field.trim_start();
	let end = field.find(|c: char| !c.is_digit(radix)).unwrap_or_else(|| field.len());
	let digits = &field[..end];
	if digits.is_empty() {
		return None;
	}
	Some(u32::from_str_radix(digits, radix).unwrap_or(u32::max_value()))
}

fn parse_value(field: &str) -> Option<u32> {
	let field = field.trim_start();
	if field.starts_with("0X") || field.starts_with("0x") {
		parse_number(&field[2..], 16)
	} else {
		parse_number(field, 10)
	}
}

fn check_address(address: u32) -> Result<u16, CommandError> {
	if address > u32::from(ADDRESS_MAX) {
		return Err(CommandError::AddressRange);
	}
	Ok(address as u16)
}

fn check_byte(value: u32, err: CommandError) -> Result<u8, CommandError> {
	if value > 0xff {
		return Err(err);
	}
	Ok(value as u8)
}

fn check_mode(verb: Verb, mode: Mode) -> Result<(), CommandError> {
	match verb.required_mode() {
		Some(required) if required != mode => Err(CommandError::wrong_mode(verb, required)),
		_ => Ok(()),
	}
}

// the verb must match in full: `PAX;1;2` is unknown, not a `PA`
pub fn parse(token: &str, mode: Mode) -> Result<Command, CommandError> {
	let (verb, args) = match token.find(DELIMITER) {
		Some(pos) => (&token[..pos], Some(&token[pos + 1..])),
		None => (token, None),
	};
	let verb = Verb::lookup(verb).ok_or(CommandError::Unknown)?;

	if !verb.takes_arguments() {
		if args.is_some() {
			return Err(CommandError::Unknown);
		}
		return Ok(match verb {
			Verb::Switch(mode) => Command::Switch(mode),
			Verb::ReadAddress => Command::ReadAddress,
			Verb::ReadData => Command::ReadData,
			_ => Command::Status,
		});
	}

	match verb {
		Verb::ProgramAddress => {
			check_mode(verb, mode)?;
			let args = args.ok_or_else(|| CommandError::format(verb))?;
			let pos = args.find(DELIMITER).ok_or_else(|| CommandError::format(verb))?;
			let address = parse_number(&args[..pos], 10).ok_or_else(|| CommandError::format(verb))?;
			let data = parse_number(&args[pos + 1..], 10).ok_or_else(|| CommandError::format(verb))?;
			let address = check_address(address)?;
			let data = check_byte(data, CommandError::DataRange)?;
			Ok(Command::ProgramAddress { address, data })
		},
		Verb::ValidateAddress => {
			check_mode(verb, mode)?;
			let args = args.ok_or_else(|| CommandError::format(verb))?;
			let address = parse_number(args, 10).ok_or_else(|| CommandError::format(verb))?;
			let address = check_address(address)?;
			Ok(Command::ValidateAddress { address })
		},
		_ => {
			// range before mode: an out-of-range value is a range error
			// whatever mode we are in
			let args = args.ok_or_else(|| CommandError::format(verb))?;
			let value = parse_value(args).ok_or_else(|| CommandError::format(verb))?;
			let value = check_byte(value, CommandError::ValueRange)?;
			check_mode(verb, mode)?;
			Ok(Command::WriteDataBus { value })
		},
	}
}
