use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::bus::ADDRESS_SPACE;

// value read back from memory that was never programmed
pub const UNPROGRAMMED: u8 = 0xff;

pub const ECF_EXTENSION: &str = "ecfROM";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rom {
	bytes: Vec<u8>,
}

impl Rom {
	pub fn new(bytes: Vec<u8>) -> crate::AResult<Self> {
		ensure!(bytes.len() <= ADDRESS_SPACE,
			"ROM image too large: {} bytes (at most {})", bytes.len(), ADDRESS_SPACE
		);
		Ok(Rom { bytes })
	}

	pub fn empty() -> Self {
		Rom { bytes: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn byte_at(&self, address: u16) -> u8 {
		self.bytes.get(usize::from(address)).cloned().unwrap_or(UNPROGRAMMED)
	}

	pub fn parse_ecf(text: &str) -> crate::AResult<Self> {
		let mut bytes = Vec::new();
		for (line_no, line) in text.lines().enumerate() {
			let line = line.trim();
			let value: u32 = match line.parse() {
				Ok(v) => v,
				Err(e) => bail!("line {}: invalid byte {:?}: {}", line_no + 1, line, e),
			};
			ensure!(value <= 0xff, "line {}: byte value {} out of range 0-255", line_no + 1, value);
			bytes.push(value as u8);
		}
		Rom::new(bytes)
	}

	pub fn to_ecf(&self) -> String {
		let mut text = String::with_capacity(self.bytes.len() * 4);
		for b in &self.bytes {
			// writing into a String can't fail
			let _ = writeln!(text, "{}", b);
		}
		text
	}

	/// load by extension: `.ecfROM` is text, anything else raw binary
	pub fn load(path: &Path) -> crate::AResult<Self> {
		with_context!(("loading ROM image {}", path.display()), {
			if is_ecf_path(path) {
				Rom::parse_ecf(&fs::read_to_string(path)?)
			} else {
				Rom::new(fs::read(path)?)
			}
		})
	}

	pub fn save(&self, path: &Path) -> crate::AResult<()> {
		with_context!(("writing ROM image {}", path.display()), {
			if is_ecf_path(path) {
				fs::write(path, self.to_ecf())?;
			} else {
				fs::write(path, &self.bytes)?;
			}
			Ok(())
		})
	}
}

fn is_ecf_path(path: &Path) -> bool {
	path.extension()
		.map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ECF_EXTENSION))
		.unwrap_or(false)
}
