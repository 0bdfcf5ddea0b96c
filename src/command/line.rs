use std::mem;

/// Accumulates received bytes into command lines.
///
/// `\n` and `\r` end a line. A line that reaches `capacity - 1` bytes is cut
/// there: the byte arriving at the limit is dropped and the stored prefix is
/// handed out as if it had been terminated.
#[derive(Debug)]
pub struct LineBuffer {
	buf: Vec<u8>,
	capacity: usize,
}

impl LineBuffer {
	// anything below 2 would leave no room for a single byte
	pub fn new(capacity: usize) -> Self {
		let capacity = capacity.max(2);
		LineBuffer {
			buf: Vec::with_capacity(capacity),
			capacity,
		}
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
		let terminator = byte == b'\n' || byte == b'\r';
		if terminator || self.buf.len() >= self.capacity - 1 {
			if !terminator {
				warn!("command line exceeds {} bytes, cut off", self.capacity - 1);
			}
			let line = mem::replace(&mut self.buf, Vec::with_capacity(self.capacity));
			return Some(line);
		}
		self.buf.push(byte);
		None
	}
}
