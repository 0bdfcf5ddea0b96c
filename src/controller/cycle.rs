use crate::board::{
	Board,
	BoardExt,
	ControlLine,
};
use crate::bus::{
	ADDRESS_MAX,
	decode_data,
	encode_address,
	encode_data,
};
use crate::command::{
	CommandError,
	Verb,
};
use crate::transport::Transport;

use super::Controller;

impl<B: Board, T: Transport> Controller<B, T> {
	fn require_mode(&self, verb: Verb) -> Result<(), CommandError> {
		match verb.required_mode() {
			Some(required) if required != self.mode() => Err(CommandError::wrong_mode(verb, required)),
			_ => Ok(()),
		}
	}

	/// One byte-program cycle: put address and data on the bus, then pulse
	/// CE/WE with a hold between every edge. Nothing is read back.
	pub fn program_byte(&mut self, address: u16, data: u8) -> Result<(), CommandError> {
		self.require_mode(Verb::ProgramAddress)?;
		if address > ADDRESS_MAX {
			return Err(CommandError::AddressRange);
		}

		encode_address(&mut self.board, address);
		encode_data(&mut self.board, data);

		let step = self.config.write_step;
		self.board.hold(step);
		self.board.set_line(ControlLine::ChipEnable, true);
		self.board.hold(step);
		self.board.set_line(ControlLine::WriteEnable, true);
		self.board.hold(step);
		self.board.set_line(ControlLine::WriteEnable, false);
		self.board.hold(step);
		self.board.set_line(ControlLine::ChipEnable, false);

		self.board.toggle_status_led();
		debug!("programmed 0x{:02x} @ {}", data, address);
		Ok(())
	}

	pub fn validate_byte(&mut self, address: u16) -> Result<u8, CommandError> {
		self.require_mode(Verb::ValidateAddress)?;
		if address > ADDRESS_MAX {
			return Err(CommandError::AddressRange);
		}

		encode_address(&mut self.board, address);
		let settle = self.config.read_settle;
		self.board.hold(settle);
		let data = decode_data(&mut self.board);
		debug!("read 0x{:02x} @ {}", data, address);
		Ok(data)
	}

	pub fn write_data_bus(&mut self, value: u8) -> Result<(), CommandError> {
		self.require_mode(Verb::WriteDataBus)?;
		encode_data(&mut self.board, value);
		Ok(())
	}
}
