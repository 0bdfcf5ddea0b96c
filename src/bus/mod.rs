use std::fmt;

use crate::board::{
	Board,
	Pin,
	PinRole,
	Port,
};

pub const ADDRESS_WIDTH: usize = 13;
pub const ADDRESS_MAX: u16 = (1 << ADDRESS_WIDTH) - 1;
pub const ADDRESS_SPACE: usize = 1 << ADDRESS_WIDTH;

pub const DATA_WIDTH: usize = 8;

const ADDRESS_PINS: [Pin; ADDRESS_WIDTH] = [
	Pin::new(Port::A, 0),
	Pin::new(Port::A, 1),
	Pin::new(Port::A, 2),
	Pin::new(Port::A, 3),
	Pin::new(Port::A, 4),
	Pin::new(Port::A, 5),
	Pin::new(Port::A, 6),
	Pin::new(Port::A, 7),
	Pin::new(Port::A, 8),
	Pin::new(Port::A, 9),
	Pin::new(Port::A, 10),
	Pin::new(Port::B, 12),
	Pin::new(Port::B, 13),
];

// upper nibble is wired in reverse (bit 3 on PB7); shares port B with the top
// two address bits
const DATA_PINS: [Pin; DATA_WIDTH] = [
	Pin::new(Port::B, 0),
	Pin::new(Port::B, 1),
	Pin::new(Port::B, 2),
	Pin::new(Port::B, 7),
	Pin::new(Port::B, 6),
	Pin::new(Port::B, 5),
	Pin::new(Port::B, 4),
	Pin::new(Port::B, 3),
];

/// One logical bus: bit `i` of the value lives on `pins[i]`.
#[derive(Debug)]
pub struct BusField {
	name: &'static str,
	pins: &'static [Pin],
}

pub static ADDRESS_BUS: BusField = BusField {
	name: "address",
	pins: &ADDRESS_PINS,
};

pub static DATA_BUS: BusField = BusField {
	name: "data",
	pins: &DATA_PINS,
};

impl BusField {
	pub fn max_value(&self) -> u32 {
		(1u32 << self.pins.len()) - 1
	}

	pub fn pins(&self) -> &'static [Pin] {
		self.pins
	}

	pub fn port_mask(&self, port: Port) -> u32 {
		self.pins.iter()
			.filter(|pin| pin.port == port)
			.fold(0, |mask, pin| mask | pin.mask)
	}

	pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
		Port::ALL.iter().cloned().filter(move |&port| 0 != self.port_mask(port))
	}

	/// spread `value` over per-port pin bits (indexed by `Port::index`);
	/// bits above the field width are ignored
	pub fn scatter(&self, value: u32) -> [u32; 3] {
		let mut levels = [0u32; 3];
		for (bit, pin) in self.pins.iter().enumerate() {
			if 0 != value & (1 << bit) {
				levels[pin.port.index()] |= pin.mask;
			}
		}
		levels
	}

	pub fn gather(&self, levels: &[u32; 3]) -> u32 {
		let mut value = 0u32;
		for (bit, pin) in self.pins.iter().enumerate() {
			if 0 != levels[pin.port.index()] & pin.mask {
				value |= 1 << bit;
			}
		}
		value
	}

	pub fn encode<B: Board + ?Sized>(&self, board: &mut B, value: u32) {
		let levels = self.scatter(value);
		for port in self.ports() {
			let mask = self.port_mask(port);
			let latch = board.read_output(port);
			board.write_output(port, (latch & !mask) | levels[port.index()]);
		}
	}

	pub fn decode<B: Board + ?Sized>(&self, board: &mut B) -> u32 {
		let mut levels = [0u32; 3];
		for port in self.ports() {
			levels[port.index()] = board.read_input(port);
		}
		self.gather(&levels)
	}

	pub fn configure<B: Board + ?Sized>(&self, board: &mut B, role: PinRole) {
		for port in self.ports() {
			board.configure(port, self.port_mask(port), role);
		}
	}
}

impl fmt::Display for BusField {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} bus", self.name)
	}
}

pub fn encode_address<B: Board + ?Sized>(board: &mut B, address: u16) {
	ADDRESS_BUS.encode(board, u32::from(address));
}

pub fn decode_address<B: Board + ?Sized>(board: &mut B) -> u16 {
	ADDRESS_BUS.decode(board) as u16
}

pub fn encode_data<B: Board + ?Sized>(board: &mut B, data: u8) {
	DATA_BUS.encode(board, u32::from(data));
}

pub fn decode_data<B: Board + ?Sized>(board: &mut B) -> u8 {
	DATA_BUS.decode(board) as u8
}
