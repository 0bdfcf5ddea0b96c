use std::fmt;

/// A reply under construction. Text beyond `capacity` bytes is dropped
/// (at a char boundary) instead of growing the line.
#[derive(Debug, Clone)]
pub struct ResponseLine {
	text: String,
	capacity: usize,
	truncated: bool,
}

impl ResponseLine {
	pub fn new(capacity: usize) -> Self {
		ResponseLine {
			text: String::with_capacity(capacity),
			capacity,
			truncated: false,
		}
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}

	pub fn is_truncated(&self) -> bool {
		self.truncated
	}

	pub fn clear(&mut self) {
		self.text.clear();
		self.truncated = false;
	}
}

impl fmt::Write for ResponseLine {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		for c in s.chars() {
			if self.text.len() + c.len_utf8() > self.capacity {
				self.truncated = true;
				break;
			}
			self.text.push(c);
		}
		Ok(())
	}
}

impl fmt::Display for ResponseLine {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.text)
	}
}

#[derive(Debug, Clone, Copy)]
pub struct GroupedBinary {
	value: u32,
	groups: &'static [u32],
}

// address: bits 12-9, 8-5, 4-1, 0
pub const ADDRESS_GROUPS: &[u32] = &[4, 4, 4, 1];
pub const DATA_GROUPS: &[u32] = &[4, 4];

impl GroupedBinary {
	pub fn new(value: u32, groups: &'static [u32]) -> Self {
		GroupedBinary { value, groups }
	}

	pub fn address(address: u16) -> Self {
		Self::new(u32::from(address), ADDRESS_GROUPS)
	}

	pub fn data(data: u8) -> Self {
		Self::new(u32::from(data), DATA_GROUPS)
	}
}

impl fmt::Display for GroupedBinary {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut bit: u32 = self.groups.iter().sum();
		for (i, &width) in self.groups.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			for _ in 0..width {
				bit -= 1;
				f.write_str(if 0 != self.value & (1 << bit) { "1" } else { "0" })?;
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fmt::Write;

	#[test]
	fn address_grouping() {
		assert_eq!(GroupedBinary::address(4096).to_string(), "1000 0000 0000 0");
		assert_eq!(GroupedBinary::address(8191).to_string(), "1111 1111 1111 1");
		assert_eq!(GroupedBinary::address(3).to_string(), "0000 0000 0001 1");
	}

	#[test]
	fn data_grouping() {
		assert_eq!(GroupedBinary::data(0xd7).to_string(), "1101 0111");
		assert_eq!(GroupedBinary::data(0).to_string(), "0000 0000");
	}

	#[test]
	fn truncates_instead_of_growing() {
		let mut line = ResponseLine::new(8);
		write!(line, "VA: Addr={} Data={}", 4096, 215).unwrap();
		assert_eq!(line.as_str(), "VA: Addr");
		assert!(line.is_truncated());

		line.clear();
		write!(line, "ok").unwrap();
		assert_eq!(line.as_str(), "ok");
		assert!(!line.is_truncated());
	}
}
