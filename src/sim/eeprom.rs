use crate::bus::ADDRESS_SPACE;
use crate::rom::UNPROGRAMMED;

#[derive(Debug, Clone)]
pub struct SimEeprom {
	cells: Vec<u8>,
	writes: usize,
}

impl Default for SimEeprom {
	fn default() -> Self {
		SimEeprom {
			cells: vec![UNPROGRAMMED; ADDRESS_SPACE],
			writes: 0,
		}
	}
}

impl SimEeprom {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_contents(contents: &[u8]) -> Self {
		let mut eeprom = Self::new();
		let len = contents.len().min(ADDRESS_SPACE);
		eeprom.cells[..len].copy_from_slice(&contents[..len]);
		eeprom
	}

	pub fn read(&self, address: u16) -> u8 {
		self.cells[usize::from(address) % ADDRESS_SPACE]
	}

	pub fn write(&mut self, address: u16, data: u8) {
		self.cells[usize::from(address) % ADDRESS_SPACE] = data;
		self.writes += 1;
	}

	pub fn writes(&self) -> usize {
		self.writes
	}

	pub fn contents(&self) -> &[u8] {
		&self.cells
	}
}
