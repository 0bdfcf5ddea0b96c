#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod board;
pub mod bus;
pub mod command;
pub mod config;
pub mod controller;
pub mod host;
pub mod mode;
pub mod response;
pub mod rom;
pub mod sim;
pub mod transport;

pub use self::config::ControllerConfig;
pub use self::controller::Controller;
pub use self::mode::Mode;
pub use self::rom::Rom;
