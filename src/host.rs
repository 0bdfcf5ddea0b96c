use crate::board::Board;
use crate::bus::ADDRESS_SPACE;
use crate::controller::Controller;
use crate::mode::Mode;
use crate::rom::Rom;
use crate::transport::RecordingTransport;

pub const PROGRESS_INTERVAL: usize = 100;

/// One command line out, one reply line back.
pub trait Link {
	fn exchange(&mut self, command: &str) -> crate::AResult<String>;
}

impl<'a, L: ?Sized + Link> Link for &'a mut L {
	fn exchange(&mut self, command: &str) -> crate::AResult<String> {
		L::exchange(*self, command)
	}
}

impl<B: Board> Link for Controller<B, RecordingTransport> {
	fn exchange(&mut self, command: &str) -> crate::AResult<String> {
		self.receive(command.as_bytes());
		self.receive(b"\n");
		let mut lines = self.transport_mut().take_lines();
		ensure!(lines.len() == 1, "{:?}: expected one reply line, got {:?}", command, lines);
		Ok(lines.remove(0))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
	pub address: u16,
	pub expected: u8,
	pub actual: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
	/// addresses that matched before validation stopped
	pub checked: usize,
	pub mismatch: Option<Mismatch>,
}

impl Validation {
	pub fn is_ok(&self) -> bool {
		self.mismatch.is_none()
	}
}

pub fn enter_mode<L: Link + ?Sized>(link: &mut L, mode: Mode) -> crate::AResult<()> {
	let reply = link.exchange(mode.verb())?;
	if reply != format!("STATE: {} Mode", mode) && reply != "Already in requested state" {
		bail!("switching to {} mode failed: {}", mode, reply);
	}
	Ok(())
}

/// Program every byte of `image` starting at address 0, then cycle through
/// sniffer back into programmer mode to leave the controller in a known state.
pub fn program_image<L, F>(link: &mut L, image: &Rom, mut progress: F) -> crate::AResult<()>
where
	L: Link + ?Sized,
	F: FnMut(usize, usize),
{
	enter_mode(link, Mode::Programmer)?;

	let total = image.len();
	for (address, &data) in image.as_bytes().iter().enumerate() {
		let reply = link.exchange(&format!("PA;{};{}", address, data))?;
		let expected = format!("DB:{} AB: {}", data, address);
		ensure!(reply == expected, "programming address {} failed: {}", address, reply);
		if 0 == address % PROGRESS_INTERVAL {
			progress(address, total);
		}
	}
	progress(total, total);

	enter_mode(link, Mode::Sniffer)?;
	enter_mode(link, Mode::Programmer)?;
	info!("programmed {} bytes", total);
	Ok(())
}

pub fn parse_va_reply(reply: &str) -> crate::AResult<u8> {
	let rest = match reply.find("Data=") {
		Some(pos) => &reply[pos + "Data=".len()..],
		None => bail!("unexpected reply: {}", reply),
	};
	let value = rest.split_whitespace().next().unwrap_or("");
	value.parse::<u8>().map_err(|e| format_err!("unexpected reply {:?}: {}", reply, e))
}

pub fn validate_image<L, F>(link: &mut L, image: &Rom, mut progress: F) -> crate::AResult<Validation>
where
	L: Link + ?Sized,
	F: FnMut(usize, usize),
{
	enter_mode(link, Mode::Validator)?;

	let total = image.len();
	for (address, &expected) in image.as_bytes().iter().enumerate() {
		let actual = read_byte(link, address as u16)?;
		if actual != expected {
			warn!("mismatch at {}: expected {}, got {}", address, expected, actual);
			return Ok(Validation {
				checked: address,
				mismatch: Some(Mismatch { address: address as u16, expected, actual }),
			});
		}
		if 0 == address % PROGRESS_INTERVAL {
			progress(address, total);
		}
	}
	progress(total, total);

	info!("validated {} bytes", total);
	Ok(Validation { checked: total, mismatch: None })
}

fn read_byte<L: Link + ?Sized>(link: &mut L, address: u16) -> crate::AResult<u8> {
	let reply = link.exchange(&format!("VA;{}", address))?;
	with_context!(("reading address {}", address), parse_va_reply(&reply))
}

pub fn read_image<L: Link + ?Sized>(link: &mut L, count: usize) -> crate::AResult<Rom> {
	ensure!(count <= ADDRESS_SPACE, "can't read {} bytes, device has {}", count, ADDRESS_SPACE);
	enter_mode(link, Mode::Validator)?;

	let mut bytes = Vec::with_capacity(count);
	for address in 0..count {
		bytes.push(read_byte(link, address as u16)?);
	}
	Rom::new(bytes)
}
