use std::fmt::{
	self,
	Write as _,
};

use crate::board::{
	Board,
	BoardExt,
	ControlLine,
};
use crate::bus::{
	ADDRESS_BUS,
	DATA_BUS,
	decode_address,
	decode_data,
};
use crate::command::{
	self,
	Command,
	CommandError,
	LineBuffer,
};
use crate::config::ControllerConfig;
use crate::mode::{
	Mode,
	ModeCell,
	ModeConfig,
};
use crate::response::{
	GroupedBinary,
	ResponseLine,
};
use crate::rom::Rom;
use crate::transport::{
	Transport,
	TransportError,
};

macro_rules! reply {
	($ctl:expr, $($arg:tt)*) => {
		$ctl.reply(format_args!($($arg)*))
	};
}

mod cycle;
mod emulate;

pub struct Controller<B: Board, T: Transport> {
	board: B,
	transport: T,
	mode: ModeCell,
	rom: Rom,
	config: ControllerConfig,
	line: LineBuffer,
}

impl<B: Board, T: Transport> Controller<B, T> {
	/// Bring the socket up in the safe default: everything listening, the
	/// device enabled and serving its own bus, writes disabled.
	pub fn new(board: B, transport: T, rom: Rom, config: ControllerConfig) -> Self {
		let line = LineBuffer::new(config.line_capacity);
		let mut controller = Controller {
			board,
			transport,
			mode: ModeCell::default(),
			rom,
			config,
			line,
		};

		let boot = controller.mode.get();
		controller.board.configure_control_lines();
		controller.apply_directions(boot.config());
		controller.apply_control_defaults(boot.config());
		info!("bus controller up in {} mode (ROM image: {} bytes)", boot, controller.rom.len());

		controller
	}

	pub fn mode(&self) -> Mode {
		self.mode.get()
	}

	pub fn board(&self) -> &B {
		&self.board
	}

	pub fn board_mut(&mut self) -> &mut B {
		&mut self.board
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	pub fn transport_mut(&mut self) -> &mut T {
		&mut self.transport
	}

	// every terminator dispatches, so the `\n` of a CRLF pair gets its own
	// (unknown command) reply
	pub fn receive(&mut self, chunk: &[u8]) {
		for &byte in chunk {
			if let Some(line) = self.line.push(byte) {
				self.dispatch_line(&line);
			}
		}
	}

	pub fn dispatch_line(&mut self, line: &[u8]) {
		let token = command::tokenize(line, self.config.token_capacity);
		let mode = self.mode();
		debug!("command {:?} in {} mode", token, mode);
		match command::parse(&token, mode) {
			Ok(command) => self.execute(command),
			Err(e) => self.reply_error(e),
		}
	}

	pub fn execute(&mut self, command: Command) {
		match command {
			Command::Switch(target) => self.transition(target),
			Command::ReadAddress => {
				let address = self.read_address_bus();
				reply!(self, "RDA: {} ({})", GroupedBinary::address(address), address);
			},
			Command::ReadData => {
				let data = self.read_data_bus();
				reply!(self, "RDD: {} ({}/0x{:02X})", GroupedBinary::data(data), data, data);
			},
			Command::ProgramAddress { address, data } => match self.program_byte(address, data) {
				Ok(()) => reply!(self, "DB:{} AB: {}", data, address),
				Err(e) => self.reply_error(e),
			},
			Command::ValidateAddress { address } => match self.validate_byte(address) {
				Ok(data) => reply!(self, "VA: Addr={} Data={} (0x{:02X})", address, data, data),
				Err(e) => self.reply_error(e),
			},
			Command::WriteDataBus { value } => match self.write_data_bus(value) {
				Ok(()) => reply!(self, "WDB: Written {} (0x{:02X}) to data bus", value, value),
				Err(e) => self.reply_error(e),
			},
			Command::Status => {
				let mode = self.mode();
				reply!(self, "Current State: {}", mode);
			},
		}
	}

	/// Switch modes. Write enable and the device's output drivers go off
	/// before any bus changes direction; the target's enables come last.
	pub fn transition(&mut self, target: Mode) {
		if self.mode() == target {
			debug!("already in {} mode", target);
			reply!(self, "Already in requested state");
			return;
		}

		let config = target.config();
		self.board.set_line(ControlLine::WriteEnable, false);
		self.board.set_line(ControlLine::OutputEnable, false);
		self.apply_directions(config);
		let previous = self.mode.replace(target);
		self.apply_control_defaults(config);

		info!("mode {} -> {}", previous, target);
		reply!(self, "STATE: {} Mode", target);
	}

	pub fn read_address_bus(&mut self) -> u16 {
		decode_address(&mut self.board)
	}

	pub fn read_data_bus(&mut self) -> u8 {
		decode_data(&mut self.board)
	}

	fn apply_directions(&mut self, config: &ModeConfig) {
		ADDRESS_BUS.configure(&mut self.board, config.address_bus);
		DATA_BUS.configure(&mut self.board, config.data_bus);
	}

	fn apply_control_defaults(&mut self, config: &ModeConfig) {
		self.board.set_direction(config.direction);
		self.board.set_line(ControlLine::ChipEnable, config.chip_enable);
		self.board.set_line(ControlLine::OutputEnable, config.output_enable);
	}

	fn reply_error(&mut self, err: CommandError) {
		debug!("rejected ({:?}): {}", err.kind(), err);
		reply!(self, "ERROR: {}", err);
	}

	fn reply(&mut self, args: fmt::Arguments) {
		let mut line = ResponseLine::new(self.config.response_capacity);
		// ResponseLine truncates, it never fails
		let _ = line.write_fmt(args);
		if line.is_truncated() {
			warn!("reply cut to {} bytes: {:?}", self.config.response_capacity, line.as_str());
		}

		match self.transport.send_line(line.as_str()) {
			Ok(()) => (),
			Err(TransportError::Busy) => {
				warn!("host link busy, dropped reply {:?}", line.as_str());
			},
			Err(e) => {
				error!("failed to send reply {:?}: {}", line.as_str(), e);
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::board::{
		BusDirection,
		PinRole,
	};
	use crate::sim::SimBoard;
	use crate::transport::RecordingTransport;

	use rstest::rstest;

	type TestController = Controller<SimBoard, RecordingTransport>;

	fn controller() -> TestController {
		Controller::new(SimBoard::new(), RecordingTransport::new(), Rom::empty(), ControllerConfig::default())
	}

	fn send(ctl: &mut TestController, line: &str) -> Vec<String> {
		ctl.receive(line.as_bytes());
		ctl.receive(b"\n");
		ctl.transport_mut().take_lines()
	}

	fn snapshot(ctl: &mut TestController) -> (Option<PinRole>, Option<PinRole>, bool, bool, bool, BusDirection) {
		let address = ctl.board().field_role(&ADDRESS_BUS);
		let data = ctl.board().field_role(&DATA_BUS);
		let board = ctl.board_mut();
		(
			address,
			data,
			board.line_asserted(ControlLine::ChipEnable),
			board.line_asserted(ControlLine::OutputEnable),
			board.line_asserted(ControlLine::WriteEnable),
			board.direction(),
		)
	}

	#[test]
	fn boots_in_sniffer() {
		let mut ctl = controller();
		assert_eq!(ctl.mode(), Mode::Sniffer);
		assert_eq!(
			snapshot(&mut ctl),
			(Some(PinRole::Input), Some(PinRole::Input), true, true, false, BusDirection::DeviceToController),
		);
		assert!(ctl.transport().lines().is_empty());
	}

	#[rstest]
	#[case(Mode::Emulator)]
	#[case(Mode::Programmer)]
	#[case(Mode::Validator)]
	#[case(Mode::Debug)]
	fn transition_applies_mode_config(#[case] target: Mode) {
		let mut ctl = controller();
		assert_eq!(send(&mut ctl, target.verb()), vec![format!("STATE: {} Mode", target)]);
		assert_eq!(ctl.mode(), target);

		let config = target.config();
		assert_eq!(
			snapshot(&mut ctl),
			(
				Some(config.address_bus),
				Some(config.data_bus),
				config.chip_enable,
				config.output_enable,
				false,
				config.direction,
			),
		);
		assert_eq!(ctl.board().contentions(), 0);
	}

	#[rstest]
	#[case(Mode::Sniffer)]
	#[case(Mode::Emulator)]
	#[case(Mode::Programmer)]
	#[case(Mode::Validator)]
	#[case(Mode::Debug)]
	fn same_mode_is_a_no_op(#[case] mode: Mode) {
		let mut ctl = controller();
		if mode != Mode::Sniffer {
			send(&mut ctl, mode.verb());
		}
		let before = snapshot(&mut ctl);
		assert_eq!(send(&mut ctl, mode.verb()), vec!["Already in requested state".to_owned()]);
		assert_eq!(snapshot(&mut ctl), before);
		assert_eq!(ctl.mode(), mode);
	}

	#[test]
	fn every_path_between_modes_is_contention_free() {
		let mut ctl = controller();
		for &from in &Mode::ALL {
			for &to in &Mode::ALL {
				ctl.transition(from);
				ctl.transition(to);
			}
		}
		assert_eq!(ctl.board().contentions(), 0);
	}

	#[test]
	fn status_follows_transitions() {
		let mut ctl = controller();
		assert_eq!(send(&mut ctl, "STATUS"), vec!["Current State: Sniffer".to_owned()]);
		send(&mut ctl, "dbg");
		assert_eq!(send(&mut ctl, "?"), vec!["Current State: Debug".to_owned()]);
	}

	#[test]
	fn crlf_answers_both_terminators() {
		// erased device: the sniffed data bus reads 0xFF
		let mut ctl = controller();
		ctl.receive(b"STATUS\r\nRDD\r\n");
		assert_eq!(ctl.transport_mut().take_lines(), vec![
			"Current State: Sniffer".to_owned(),
			"ERROR: Unknown command".to_owned(),
			"RDD: 1111 1111 (255/0xFF)".to_owned(),
			"ERROR: Unknown command".to_owned(),
		]);
	}

	#[test]
	fn empty_line_is_an_unknown_command() {
		let mut ctl = controller();
		ctl.receive(b"\n");
		ctl.receive(b"STATUS\r\n");
		assert_eq!(ctl.transport_mut().take_lines(), vec![
			"ERROR: Unknown command".to_owned(),
			"Current State: Sniffer".to_owned(),
			"ERROR: Unknown command".to_owned(),
		]);
		assert_eq!(ctl.mode(), Mode::Sniffer);
	}

	#[test]
	fn tiny_line_buffer_still_works() {
		let config = ControllerConfig {
			line_capacity: 1,
			..ControllerConfig::default()
		};
		let mut ctl = Controller::new(SimBoard::new(), RecordingTransport::new(), Rom::empty(), config);
		assert_eq!(send(&mut ctl, "?"), vec!["Current State: Sniffer".to_owned()]);
	}

	#[test]
	fn busy_transport_drops_reply_but_keeps_state() {
		let mut ctl = controller();
		ctl.transport_mut().set_busy(true);
		ctl.receive(b"PRG\n");
		assert_eq!(ctl.mode(), Mode::Programmer);
		assert_eq!(ctl.transport().rejected(), 1);
		ctl.transport_mut().set_busy(false);
		assert_eq!(send(&mut ctl, "STATUS"), vec!["Current State: Programmer".to_owned()]);
	}

	#[test]
	fn long_replies_are_cut() {
		let config = ControllerConfig {
			response_capacity: 10,
			..ControllerConfig::default()
		};
		let mut ctl = Controller::new(SimBoard::new(), RecordingTransport::new(), Rom::empty(), config);
		assert_eq!(send(&mut ctl, "STATUS"), vec!["Current St".to_owned()]);
	}
}
