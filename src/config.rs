use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
	/// receive line buffer, including the implicit terminator slot; values
	/// below 2 are raised to 2
	pub line_capacity: usize,
	/// command token, including the implicit terminator slot
	pub token_capacity: usize,
	pub response_capacity: usize,
	/// hold between the steps of a write cycle
	pub write_step: Duration,
	/// address-to-data settle time when validating
	pub read_settle: Duration,
}

impl Default for ControllerConfig {
	fn default() -> Self {
		ControllerConfig {
			line_capacity: 256,
			token_capacity: 16,
			response_capacity: 64,
			write_step: Duration::from_micros(2),
			read_settle: Duration::from_micros(1),
		}
	}
}
