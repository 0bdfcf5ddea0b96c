use crate::board::Board;
use crate::bus::{
	decode_address,
	encode_data,
};
use crate::mode::Mode;
use crate::transport::Transport;

use super::Controller;

impl<B: Board, T: Transport> Controller<B, T> {
	/// One pass of the main loop. In emulator mode this answers the address
	/// currently on the bus with the matching ROM byte and returns both;
	/// otherwise it does nothing.
	pub fn poll(&mut self) -> Option<(u16, u8)> {
		if self.mode() != Mode::Emulator {
			return None;
		}

		let address = decode_address(&mut self.board);
		let data = self.rom.byte_at(address);
		encode_data(&mut self.board, data);
		trace!("emulate: {} -> 0x{:02x}", address, data);
		Some((address, data))
	}
}
