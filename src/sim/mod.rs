use std::time::Duration;

use crate::board::{
	Board,
	BusDirection,
	ControlLine,
	DIRECTION_PIN,
	Pin,
	PinRole,
	Port,
	Speed,
};
use crate::bus::{
	ADDRESS_BUS,
	BusField,
	DATA_BUS,
};

mod eeprom;

pub use self::eeprom::SimEeprom;

#[derive(Debug, Clone, Copy, Default)]
struct PortState {
	latch: u32,
	outputs: u32,
	fast: u32,
}

#[derive(Debug, Default)]
pub struct SimBoard {
	ports: [PortState; 3],
	eeprom: SimEeprom,
	external_address: Option<u16>,
	write_strobe: bool,
	held: Duration,
	holds: usize,
	contentions: usize,
}

impl SimBoard {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_eeprom(eeprom: SimEeprom) -> Self {
		SimBoard {
			eeprom,
			..Self::default()
		}
	}

	pub fn eeprom(&self) -> &SimEeprom {
		&self.eeprom
	}

	pub fn eeprom_mut(&mut self) -> &mut SimEeprom {
		&mut self.eeprom
	}

	/// address put on the bus by whatever else is attached (a CPU reading
	/// the socket); only visible on lines the controller isn't driving
	pub fn set_external_address(&mut self, address: Option<u16>) {
		self.external_address = address;
		self.settle();
	}

	pub fn output_mask(&self, port: Port) -> u32 {
		self.ports[port.index()].outputs
	}

	pub fn role(&self, pin: Pin) -> PinRole {
		let state = &self.ports[pin.port.index()];
		if 0 == state.outputs & pin.mask {
			PinRole::Input
		} else if 0 != state.fast & pin.mask {
			PinRole::Output(Speed::High)
		} else {
			PinRole::Output(Speed::Low)
		}
	}

	/// role shared by all pins of `field`; `None` if they disagree
	pub fn field_role(&self, field: &BusField) -> Option<PinRole> {
		let mut roles = field.pins().iter().map(|&pin| self.role(pin));
		let first = roles.next()?;
		if roles.all(|role| role == first) {
			Some(first)
		} else {
			None
		}
	}

	pub fn held(&self) -> Duration {
		self.held
	}

	pub fn holds(&self) -> usize {
		self.holds
	}

	/// how often both sides were found driving the data bus
	pub fn contentions(&self) -> usize {
		self.contentions
	}

	fn pin_level(&self, pin: Pin) -> bool {
		0 != self.ports[pin.port.index()].latch & pin.mask
	}

	fn is_output(&self, pin: Pin) -> bool {
		0 != self.ports[pin.port.index()].outputs & pin.mask
	}

	// undriven strobes are pulled up on the socket, i.e. deasserted
	fn strobe(&self, line: ControlLine) -> bool {
		let pin = line.pin();
		self.is_output(pin) && !self.pin_level(pin)
	}

	fn direction(&self) -> BusDirection {
		if self.is_output(DIRECTION_PIN) && self.pin_level(DIRECTION_PIN) {
			BusDirection::ControllerToDevice
		} else {
			BusDirection::DeviceToController
		}
	}

	fn device_drives_data(&self) -> bool {
		self.strobe(ControlLine::ChipEnable)
			&& self.strobe(ControlLine::OutputEnable)
			&& !self.strobe(ControlLine::WriteEnable)
	}

	fn controller_drives_data(&self) -> bool {
		DATA_BUS.ports().any(|port| 0 != self.ports[port.index()].outputs & DATA_BUS.port_mask(port))
	}

	fn driven_levels(&self) -> [u32; 3] {
		let mut levels = [0u32; 3];
		for (level, state) in levels.iter_mut().zip(self.ports.iter()) {
			*level = state.latch & state.outputs;
		}
		levels
	}

	fn external_levels(&self) -> [u32; 3] {
		let mut levels = [0u32; 3];
		if let Some(address) = self.external_address {
			levels = ADDRESS_BUS.scatter(u32::from(address));
		}
		if self.device_drives_data() && self.direction() == BusDirection::DeviceToController {
			let data = DATA_BUS.scatter(u32::from(self.eeprom.read(self.bus_address())));
			for (level, d) in levels.iter_mut().zip(data.iter()) {
				*level |= d;
			}
		}
		levels
	}

	// address seen by the memory device
	fn bus_address(&self) -> u16 {
		let external = match self.external_address {
			Some(address) => ADDRESS_BUS.scatter(u32::from(address)),
			None => [0; 3],
		};
		let mut levels = [0u32; 3];
		for (i, state) in self.ports.iter().enumerate() {
			levels[i] = (state.latch & state.outputs) | (external[i] & !state.outputs);
		}
		ADDRESS_BUS.gather(&levels) as u16
	}

	fn settle(&mut self) {
		if self.device_drives_data()
			&& (self.controller_drives_data() || self.direction() == BusDirection::ControllerToDevice)
		{
			self.contentions += 1;
			warn!("bus contention: device and controller both driving data lines");
		}

		let strobe = self.strobe(ControlLine::WriteEnable);
		if self.write_strobe && !strobe && self.strobe(ControlLine::ChipEnable) {
			if self.direction() == BusDirection::ControllerToDevice {
				let address = self.bus_address();
				let data = DATA_BUS.gather(&self.driven_levels()) as u8;
				debug!("eeprom: write 0x{:02x} @ {}", data, address);
				self.eeprom.write(address, data);
			} else {
				warn!("eeprom: write strobe with transceiver pointing at the controller, ignored");
			}
		}
		self.write_strobe = strobe;
	}
}

impl Board for SimBoard {
	fn read_input(&mut self, port: Port) -> u32 {
		let state = self.ports[port.index()];
		let external = self.external_levels()[port.index()];
		(state.latch & state.outputs) | (external & !state.outputs)
	}

	fn read_output(&mut self, port: Port) -> u32 {
		self.ports[port.index()].latch
	}

	fn write_output(&mut self, port: Port, value: u32) {
		self.ports[port.index()].latch = value;
		self.settle();
	}

	fn configure(&mut self, port: Port, mask: u32, role: PinRole) {
		{
			let state = &mut self.ports[port.index()];
			match role {
				PinRole::Input => {
					state.outputs &= !mask;
					state.fast &= !mask;
				},
				PinRole::Output(speed) => {
					state.outputs |= mask;
					match speed {
						Speed::Low => state.fast &= !mask,
						Speed::High => state.fast |= mask,
					}
				},
			}
		}
		self.settle();
	}

	fn hold(&mut self, duration: Duration) {
		self.held += duration;
		self.holds += 1;
	}
}
