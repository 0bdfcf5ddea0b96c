use parallel_eeprom_bus::host::{
	self,
	Link,
	Mismatch,
};
use parallel_eeprom_bus::sim::{
	SimBoard,
	SimEeprom,
};
use parallel_eeprom_bus::transport::RecordingTransport;
use parallel_eeprom_bus::{
	Controller,
	ControllerConfig,
	Mode,
	Rom,
};

fn session() -> Controller<SimBoard, RecordingTransport> {
	Controller::new(SimBoard::new(), RecordingTransport::new(), Rom::empty(), ControllerConfig::default())
}

#[test]
fn ecf_image_round_trip() {
	let text = "169\n0\n141\n0\n2\n76\n0\n128\n";
	let image = Rom::parse_ecf(text).unwrap();
	let mut link = session();

	host::program_image(&mut link, &image, |_, _| ()).unwrap();
	assert_eq!(link.exchange("STATUS").unwrap(), "Current State: Programmer");

	let result = host::validate_image(&mut link, &image, |_, _| ()).unwrap();
	assert_eq!(result.checked, 8);
	assert!(result.is_ok());

	let read = host::read_image(&mut link, 10).unwrap();
	assert_eq!(&read.as_bytes()[..8], image.as_bytes());
	assert_eq!(&read.as_bytes()[8..], &[0xff, 0xff]);
	assert_eq!(read.to_ecf().lines().take(8).collect::<Vec<_>>().join("\n") + "\n", text);
}

#[test]
fn corrupted_cell_is_reported() {
	let image = Rom::new((0..=255u8).collect()).unwrap();
	let mut link = session();
	host::program_image(&mut link, &image, |_, _| ()).unwrap();

	link.board_mut().eeprom_mut().write(200, 0);
	let result = host::validate_image(&mut link, &image, |_, _| ()).unwrap();
	assert_eq!(result.checked, 200);
	assert_eq!(result.mismatch, Some(Mismatch { address: 200, expected: 200, actual: 0 }));
	assert_eq!(link.mode(), Mode::Validator);
}

#[test]
fn validating_blank_device() {
	let mut link = Controller::new(
		SimBoard::with_eeprom(SimEeprom::new()),
		RecordingTransport::new(),
		Rom::empty(),
		ControllerConfig::default(),
	);
	let image = Rom::new(vec![0xff, 0xff, 0x00]).unwrap();
	let result = host::validate_image(&mut link, &image, |_, _| ()).unwrap();
	assert_eq!(result.mismatch, Some(Mismatch { address: 2, expected: 0, actual: 0xff }));
}

#[test]
fn whole_device() {
	let image = Rom::new((0..8192u32).map(|i| (i ^ (i >> 8)) as u8).collect()).unwrap();
	let mut link = session();

	let mut last = None;
	host::program_image(&mut link, &image, |done, total| last = Some((done, total))).unwrap();
	assert_eq!(last, Some((8192, 8192)));
	assert_eq!(link.board().eeprom().contents(), image.as_bytes());

	assert!(host::validate_image(&mut link, &image, |_, _| ()).unwrap().is_ok());
	assert_eq!(link.board().contentions(), 0);
}
