use crate::board::{
	BusDirection,
	PinRole,
	Speed,
};

use super::Mode;

/// Electrical setup of one mode. `chip_enable`/`output_enable` are the
/// logical (asserted) states, not pin levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeConfig {
	pub address_bus: PinRole,
	pub data_bus: PinRole,
	pub chip_enable: bool,
	pub output_enable: bool,
	pub direction: BusDirection,
}

impl ModeConfig {
	pub fn device_drives_data(&self) -> bool {
		self.chip_enable && self.output_enable
	}

	pub fn controller_drives_data(&self) -> bool {
		self.data_bus.is_output()
	}
}

const BUS_OUT: PinRole = PinRole::Output(Speed::High);

static SNIFFER: ModeConfig = ModeConfig {
	address_bus: PinRole::Input,
	data_bus: PinRole::Input,
	chip_enable: true,
	output_enable: true,
	direction: BusDirection::DeviceToController,
};

// device disabled, we take its place on the data bus
static EMULATOR: ModeConfig = ModeConfig {
	address_bus: PinRole::Input,
	data_bus: BUS_OUT,
	chip_enable: false,
	output_enable: false,
	direction: BusDirection::DeviceToController,
};

static PROGRAMMER: ModeConfig = ModeConfig {
	address_bus: BUS_OUT,
	data_bus: BUS_OUT,
	chip_enable: true,
	output_enable: false,
	direction: BusDirection::ControllerToDevice,
};

static VALIDATOR: ModeConfig = ModeConfig {
	address_bus: BUS_OUT,
	data_bus: PinRole::Input,
	chip_enable: true,
	output_enable: true,
	direction: BusDirection::DeviceToController,
};

static DEBUG: ModeConfig = ModeConfig {
	address_bus: PinRole::Input,
	data_bus: BUS_OUT,
	chip_enable: false,
	output_enable: false,
	direction: BusDirection::DeviceToController,
};

pub fn mode_config(mode: Mode) -> &'static ModeConfig {
	match mode {
		Mode::Sniffer => &SNIFFER,
		Mode::Emulator => &EMULATOR,
		Mode::Programmer => &PROGRAMMER,
		Mode::Validator => &VALIDATOR,
		Mode::Debug => &DEBUG,
	}
}
