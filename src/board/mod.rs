use std::fmt;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

mod control;

pub use self::control::{
	BoardExt,
	BusDirection,
	ControlLine,
	DIRECTION_PIN,
	STATUS_LED_PIN,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Port {
	A,
	B,
	C,
}

impl Port {
	pub const ALL: [Port; 3] = [Port::A, Port::B, Port::C];

	pub fn index(self) -> usize {
		match self {
			Port::A => 0,
			Port::B => 1,
			Port::C => 2,
		}
	}
}

impl fmt::Display for Port {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Port::A => write!(f, "GPIOA"),
			Port::B => write!(f, "GPIOB"),
			Port::C => write!(f, "GPIOC"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin {
	pub port: Port,
	pub mask: u32,
}

impl Pin {
	pub const fn new(port: Port, number: u32) -> Self {
		Pin {
			port,
			mask: 1 << number,
		}
	}
}

impl fmt::Display for Pin {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}.{}", self.port, self.mask.trailing_zeros())
	}
}

// output slew class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Speed {
	Low,
	High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRole {
	Input,
	Output(Speed),
}

impl PinRole {
	pub fn is_output(self) -> bool {
		match self {
			PinRole::Input => false,
			PinRole::Output(_) => true,
		}
	}
}

impl fmt::Display for PinRole {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			PinRole::Input => write!(f, "input"),
			PinRole::Output(Speed::Low) => write!(f, "output (low speed)"),
			PinRole::Output(Speed::High) => write!(f, "output (high speed)"),
		}
	}
}

/// Register level access to the GPIO ports wired to the memory socket.
///
/// `read_input` returns the electrical level of every pin of a port (for
/// pins configured as outputs that is the level being driven), while
/// `read_output`/`write_output` access the output latch. Callers are
/// expected to do read-modify-write on the latch; the board never masks
/// anything on its own.
pub trait Board {
	fn read_input(&mut self, port: Port) -> u32;
	fn read_output(&mut self, port: Port) -> u32;
	fn write_output(&mut self, port: Port, value: u32);

	fn configure(&mut self, port: Port, mask: u32, role: PinRole);

	/// busy for (at least) `duration`
	fn hold(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, B: ?Sized + Board> Board for &'a mut B {
	fn read_input(&mut self, port: Port) -> u32 {
		B::read_input(*self, port)
	}
	fn read_output(&mut self, port: Port) -> u32 {
		B::read_output(*self, port)
	}
	fn write_output(&mut self, port: Port, value: u32) {
		B::write_output(*self, port, value)
	}
	fn configure(&mut self, port: Port, mask: u32, role: PinRole) {
		B::configure(*self, port, mask, role)
	}
	fn hold(&mut self, duration: Duration) {
		B::hold(*self, duration)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pin_masks() {
		assert_eq!(Pin::new(Port::A, 0).mask, 0x0001);
		assert_eq!(Pin::new(Port::C, 15).mask, 0x8000);
		assert_eq!(Pin::new(Port::B, 13).to_string(), "GPIOB.13");
	}

	#[test]
	fn port_indices_are_distinct() {
		let indices: Vec<usize> = Port::ALL.iter().map(|p| p.index()).collect();
		assert_eq!(indices, vec![0, 1, 2]);
	}
}
