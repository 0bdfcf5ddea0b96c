#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate parallel_eeprom_bus;
use parallel_eeprom_bus::*;

use std::io::{
	self,
	Read,
};
use std::path::Path;
use std::process::exit;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use parallel_eeprom_bus::bus::ADDRESS_MAX;
use parallel_eeprom_bus::host;
use parallel_eeprom_bus::sim::{
	SimBoard,
	SimEeprom,
};
use parallel_eeprom_bus::transport::{
	RecordingTransport,
	WriteTransport,
};

// idle wait of the serve loop when there is nothing to emulate
const IDLE: Duration = Duration::from_millis(1);

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn get_opt_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	if matches.is_present(name) {
		get_param(matches, name).map(Some)
	} else {
		Ok(None)
	}
}

fn load_opt_rom(matches: &clap::ArgMatches, name: &str) -> AResult<Option<Rom>> {
	match matches.value_of_os(name) {
		Some(path) => Ok(Some(Rom::load(Path::new(path))?)),
		None => Ok(None),
	}
}

// simulated board set up from the global options (clap propagates them
// into the subcommand matches)
fn board(matches: &clap::ArgMatches) -> AResult<SimBoard> {
	let eeprom = match load_opt_rom(matches, "eeprom")? {
		Some(contents) => SimEeprom::with_contents(contents.as_bytes()),
		None => SimEeprom::new(),
	};
	let mut board = SimBoard::with_eeprom(eeprom);

	if let Some(address) = get_opt_param::<u16>(matches, "address")? {
		ensure!(address <= ADDRESS_MAX, "external address {} out of range 0-{}", address, ADDRESS_MAX);
		board.set_external_address(Some(address));
	}
	Ok(board)
}

fn session(matches: &clap::ArgMatches) -> AResult<Controller<SimBoard, RecordingTransport>> {
	let rom = load_opt_rom(matches, "rom")?.unwrap_or_else(Rom::empty);
	Ok(Controller::new(board(matches)?, RecordingTransport::new(), rom, ControllerConfig::default()))
}

fn serve(matches: &clap::ArgMatches) -> AResult<()> {
	let rom = load_opt_rom(matches, "rom")?.unwrap_or_else(Rom::empty);
	let transport = WriteTransport::new(io::stdout());
	let mut controller = Controller::new(board(matches)?, transport, rom, ControllerConfig::default());

	let (tx, rx) = mpsc::channel::<Vec<u8>>();
	thread::spawn(move || {
		let stdin = io::stdin();
		let mut stdin = stdin.lock();
		let mut buf = [0u8; 256];
		loop {
			match stdin.read(&mut buf) {
				Ok(0) => break,
				Ok(n) => {
					if tx.send(buf[..n].to_vec()).is_err() {
						break;
					}
				},
				Err(ref e) if e.kind() == io::ErrorKind::Interrupted => (),
				Err(e) => {
					error!("reading stdin failed: {}", e);
					break;
				},
			}
		}
	});

	loop {
		match rx.try_recv() {
			Ok(chunk) => controller.receive(&chunk),
			Err(mpsc::TryRecvError::Disconnected) => break,
			Err(mpsc::TryRecvError::Empty) => {
				if controller.poll().is_none() {
					thread::sleep(IDLE);
				}
			},
		}
	}

	info!("host link closed in {} mode", controller.mode());
	Ok(())
}

fn progress(what: &'static str) -> impl FnMut(usize, usize) {
	move |done, total| {
		let percent = if 0 == total { 100 } else { done * 100 / total };
		info!("{}... {}/{} ({}%)", what, done, total, percent);
	}
}

fn program(matches: &clap::ArgMatches) -> AResult<()> {
	let image = Rom::load(Path::new(matches.value_of_os("IMAGE").unwrap_or_default()))?;
	let mut controller = session(matches)?;

	host::program_image(&mut controller, &image, progress("Programming"))?;

	if let Some(out) = matches.value_of_os("out") {
		let contents = Rom::new(controller.board().eeprom().contents().to_vec())?;
		contents.save(Path::new(out))?;
		info!("EEPROM contents written to {}", Path::new(out).display());
	}
	Ok(())
}

fn validate(matches: &clap::ArgMatches) -> AResult<()> {
	let image = Rom::load(Path::new(matches.value_of_os("IMAGE").unwrap_or_default()))?;
	let mut controller = session(matches)?;

	let result = host::validate_image(&mut controller, &image, progress("Validating"))?;
	match result.mismatch {
		None => {
			println!("Image verified successfully ({} bytes)", result.checked);
		},
		Some(m) => {
			eprintln!(
				"Mismatch at address {}: expected {} (0x{:02X}), got {} (0x{:02X})",
				m.address, m.expected, m.expected, m.actual, m.actual,
			);
			exit(2);
		},
	}
	Ok(())
}

fn dump(matches: &clap::ArgMatches) -> AResult<()> {
	let count = get_opt_param::<usize>(matches, "count")?.unwrap_or(256);
	let mut controller = session(matches)?;

	let image = host::read_image(&mut controller, count)?;
	for (i, b) in image.as_bytes().iter().enumerate() {
		if 0 == i % 16 {
			print!("{:04x} ", i);
		} else if 0 == i % 8 {
			print!(" ");
		}
		print!(" {:02x}", b);
		if 15 == i % 16 {
			println!();
		}
	}
	if 0 != image.len() % 16 {
		println!();
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg rom: --rom +takes_value +global "image served in emulator mode (.ecfROM text or raw binary)")
		(@arg eeprom: --eeprom +takes_value +global "initial contents of the simulated EEPROM")
		(@arg address: --address +takes_value +global "address driven on the bus by the simulated external master")
		(@subcommand serve =>
			(about: "run the controller on stdin/stdout against the simulated board")
		)
		(@subcommand program =>
			(about: "program an image into the simulated EEPROM")
			(@arg out: -o --out +takes_value "write resulting EEPROM contents to file")
			(@arg IMAGE: +required "image to program (.ecfROM text or raw binary)")
		)
		(@subcommand validate =>
			(about: "validate the simulated EEPROM against an image")
			(@arg IMAGE: +required "image to compare with (.ecfROM text or raw binary)")
		)
		(@subcommand dump =>
			(about: "read the simulated EEPROM through the validator")
			(@arg count: -n --count +takes_value "number of bytes to read (default 256)")
		)
	).get_matches();

	match matches.subcommand() {
		("serve", Some(sub_m)) => {
			serve(sub_m)
		},
		("program", Some(sub_m)) => {
			program(sub_m)
		},
		("validate", Some(sub_m)) => {
			validate(sub_m)
		},
		("dump", Some(sub_m)) => {
			dump(sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
