use std::fmt;

use super::{
	Board,
	Pin,
	PinRole,
	Port,
	Speed,
};

// control lines towards the memory socket
const CE_PIN: Pin = Pin::new(Port::B, 8);
const OE_PIN: Pin = Pin::new(Port::C, 15);
const WE_PIN: Pin = Pin::new(Port::C, 14);

// bus transceiver direction; low means device to controller
pub const DIRECTION_PIN: Pin = Pin::new(Port::B, 10);
pub const STATUS_LED_PIN: Pin = Pin::new(Port::C, 13);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlLine {
	ChipEnable,
	OutputEnable,
	WriteEnable,
}

impl ControlLine {
	pub const ALL: [ControlLine; 3] = [
		ControlLine::ChipEnable,
		ControlLine::OutputEnable,
		ControlLine::WriteEnable,
	];

	pub fn pin(self) -> Pin {
		match self {
			ControlLine::ChipEnable => CE_PIN,
			ControlLine::OutputEnable => OE_PIN,
			ControlLine::WriteEnable => WE_PIN,
		}
	}
}

impl fmt::Display for ControlLine {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			ControlLine::ChipEnable => write!(f, "CE"),
			ControlLine::OutputEnable => write!(f, "OE"),
			ControlLine::WriteEnable => write!(f, "WE"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BusDirection {
	DeviceToController,
	ControllerToDevice,
}

impl fmt::Display for BusDirection {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			BusDirection::DeviceToController => write!(f, "device->controller"),
			BusDirection::ControllerToDevice => write!(f, "controller->device"),
		}
	}
}

pub trait BoardExt: Board {
	fn set_pin(&mut self, pin: Pin, high: bool) {
		let latch = self.read_output(pin.port);
		let latch = if high { latch | pin.mask } else { latch & !pin.mask };
		self.write_output(pin.port, latch);
	}

	fn pin_is_high(&mut self, pin: Pin) -> bool {
		0 != self.read_output(pin.port) & pin.mask
	}

	fn toggle_pin(&mut self, pin: Pin) {
		let latch = self.read_output(pin.port);
		self.write_output(pin.port, latch ^ pin.mask);
	}

	fn set_line(&mut self, line: ControlLine, asserted: bool) {
		// active low
		self.set_pin(line.pin(), !asserted);
	}

	fn line_asserted(&mut self, line: ControlLine) -> bool {
		!self.pin_is_high(line.pin())
	}

	fn set_direction(&mut self, direction: BusDirection) {
		self.set_pin(DIRECTION_PIN, direction == BusDirection::ControllerToDevice);
	}

	fn direction(&mut self) -> BusDirection {
		if self.pin_is_high(DIRECTION_PIN) {
			BusDirection::ControllerToDevice
		} else {
			BusDirection::DeviceToController
		}
	}

	fn toggle_status_led(&mut self) {
		self.toggle_pin(STATUS_LED_PIN);
	}

	// bring-up: every control line becomes a slow push-pull output. The
	// latch is loaded first so the strobes start out deasserted.
	fn configure_control_lines(&mut self) {
		for &line in &ControlLine::ALL {
			self.set_line(line, false);
			self.configure(line.pin().port, line.pin().mask, PinRole::Output(Speed::Low));
		}
		for &pin in &[DIRECTION_PIN, STATUS_LED_PIN] {
			self.set_pin(pin, false);
			self.configure(pin.port, pin.mask, PinRole::Output(Speed::Low));
		}
	}
}

impl<B: Board + ?Sized> BoardExt for B {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sim::SimBoard;

	#[test]
	fn lines_are_active_low() {
		let mut board = SimBoard::new();
		board.configure_control_lines();
		for &line in &ControlLine::ALL {
			assert!(!board.line_asserted(line), "{} asserted after bring-up", line);
		}

		board.set_line(ControlLine::WriteEnable, false);
		assert!(board.pin_is_high(WE_PIN));
		assert!(!board.line_asserted(ControlLine::WriteEnable));

		board.set_line(ControlLine::ChipEnable, true);
		assert!(!board.pin_is_high(CE_PIN));
		assert!(board.line_asserted(ControlLine::ChipEnable));
	}

	#[test]
	fn direction_round_trips() {
		let mut board = SimBoard::new();
		board.configure_control_lines();
		assert_eq!(board.direction(), BusDirection::DeviceToController);
		board.set_direction(BusDirection::ControllerToDevice);
		assert_eq!(board.direction(), BusDirection::ControllerToDevice);
		assert!(board.pin_is_high(DIRECTION_PIN));
	}

	#[test]
	fn led_toggle_leaves_neighbours_alone() {
		let mut board = SimBoard::new();
		board.configure_control_lines();
		board.set_line(ControlLine::WriteEnable, false);
		board.set_line(ControlLine::OutputEnable, false);
		let before = board.read_output(Port::C);

		board.toggle_status_led();
		assert_eq!(board.read_output(Port::C), before ^ STATUS_LED_PIN.mask);
		board.toggle_status_led();
		assert_eq!(board.read_output(Port::C), before);
	}
}
