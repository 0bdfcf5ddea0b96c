use std::fmt;

mod config;

pub use self::config::{
	ModeConfig,
	mode_config,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
	Sniffer,
	Emulator,
	Programmer,
	Validator,
	Debug,
}

impl Mode {
	pub const ALL: [Mode; 5] = [
		Mode::Sniffer,
		Mode::Emulator,
		Mode::Programmer,
		Mode::Validator,
		Mode::Debug,
	];

	pub fn name(self) -> &'static str {
		match self {
			Mode::Sniffer => "Sniffer",
			Mode::Emulator => "Emulator",
			Mode::Programmer => "Programmer",
			Mode::Validator => "Validator",
			Mode::Debug => "Debug",
		}
	}

	pub fn verb(self) -> &'static str {
		match self {
			Mode::Sniffer => "SNF",
			Mode::Emulator => "EMU",
			Mode::Programmer => "PRG",
			Mode::Validator => "VAL",
			Mode::Debug => "DBG",
		}
	}

	pub fn from_verb(verb: &str) -> Option<Mode> {
		Mode::ALL.iter().cloned().find(|mode| mode.verb() == verb)
	}

	pub fn config(self) -> &'static ModeConfig {
		mode_config(self)
	}
}

impl Default for Mode {
	fn default() -> Self {
		Mode::Sniffer
	}
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Holder of the current mode. Only the controller's transition path gets
/// to write it; everything else reads a copy.
#[derive(Debug, Default)]
pub struct ModeCell {
	current: Mode,
}

impl ModeCell {
	pub fn get(&self) -> Mode {
		self.current
	}

	pub(crate) fn replace(&mut self, mode: Mode) -> Mode {
		std::mem::replace(&mut self.current, mode)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn boots_as_sniffer() {
		assert_eq!(ModeCell::default().get(), Mode::Sniffer);
	}

	#[test]
	fn verbs_map_back() {
		for &mode in &Mode::ALL {
			assert_eq!(Mode::from_verb(mode.verb()), Some(mode));
		}
		assert_eq!(Mode::from_verb("snf"), None);
		assert_eq!(Mode::from_verb("STATUS"), None);
	}

	#[test]
	fn replace_returns_previous() {
		let mut cell = ModeCell::default();
		assert_eq!(cell.replace(Mode::Debug), Mode::Sniffer);
		assert_eq!(cell.get(), Mode::Debug);
	}
}
