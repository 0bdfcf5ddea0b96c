use std::io::{
	self,
	Write,
};

use failure::Fail;

#[derive(Debug, Fail)]
pub enum TransportError {
	#[fail(display = "transmitter busy")]
	Busy,
	#[fail(display = "{}", _0)]
	Io(#[cause] io::Error),
}

impl From<io::Error> for TransportError {
	fn from(e: io::Error) -> Self {
		TransportError::Io(e)
	}
}

/// Outbound half of the host link. Lines are passed without terminator.
pub trait Transport {
	fn send_line(&mut self, line: &str) -> Result<(), TransportError>;
}

impl<'a, T: ?Sized + Transport> Transport for &'a mut T {
	fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
		T::send_line(*self, line)
	}
}

#[derive(Debug)]
pub struct WriteTransport<W: Write> {
	writer: W,
}

impl<W: Write> WriteTransport<W> {
	pub fn new(writer: W) -> Self {
		WriteTransport { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: Write> Transport for WriteTransport<W> {
	fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
		self.writer.write_all(line.as_bytes())?;
		self.writer.write_all(b"\r\n")?;
		self.writer.flush()?;
		Ok(())
	}
}

/// Keeps every accepted line in memory. Can be told to reject sends as if
/// the transmitter were still busy.
#[derive(Debug, Default)]
pub struct RecordingTransport {
	lines: Vec<String>,
	busy: bool,
	rejected: usize,
}

impl RecordingTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub fn take_lines(&mut self) -> Vec<String> {
		std::mem::replace(&mut self.lines, Vec::new())
	}

	pub fn set_busy(&mut self, busy: bool) {
		self.busy = busy;
	}

	pub fn rejected(&self) -> usize {
		self.rejected
	}
}

impl Transport for RecordingTransport {
	fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
		if self.busy {
			self.rejected += 1;
			return Err(TransportError::Busy);
		}
		self.lines.push(line.to_owned());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn write_transport_appends_crlf() {
		let mut transport = WriteTransport::new(Vec::new());
		transport.send_line("Current State: Sniffer").unwrap();
		transport.send_line("RDA: 0000 0000 0000 0 (0)").unwrap();
		assert_eq!(
			transport.into_inner(),
			b"Current State: Sniffer\r\nRDA: 0000 0000 0000 0 (0)\r\n".to_vec(),
		);
	}

	#[test]
	fn recording_transport_rejects_while_busy() {
		let mut transport = RecordingTransport::new();
		transport.send_line("one").unwrap();
		transport.set_busy(true);
		match transport.send_line("two") {
			Err(TransportError::Busy) => (),
			other => panic!("expected Busy, got {:?}", other),
		}
		transport.set_busy(false);
		transport.send_line("three").unwrap();
		assert_eq!(transport.take_lines(), vec!["one".to_owned(), "three".to_owned()]);
		assert_eq!(transport.rejected(), 1);
		assert!(transport.lines().is_empty());
	}
}
