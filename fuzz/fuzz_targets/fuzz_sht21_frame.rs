//! Fuzz target: SHT21 measurement frames
//!
//! Serves arbitrary bytes as the sensor's I2C replies and asserts that the
//! driver never panics and only ever returns readings inside the
//! physically meaningful range.
//!
//! cargo fuzz run fuzz_sht21_frame

#![no_main]

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use humifan::sensors::sht21::Sht21;
use libfuzzer_sys::fuzz_target;

struct Replay<'a> {
    data: &'a [u8],
}

impl ErrorType for Replay<'_> {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for Replay<'_> {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Read(buf) = op {
                if self.data.len() < buf.len() {
                    return Err(ErrorKind::Other);
                }
                let (head, tail) = self.data.split_at(buf.len());
                buf.copy_from_slice(head);
                self.data = tail;
            }
        }
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fuzz_target!(|data: &[u8]| {
    let mut sensor = Sht21::new(Replay { data }, NoDelay);
    let _ = sensor.init();

    while let (Ok(rh), Ok(t)) = (sensor.read_humidity(), sensor.read_temperature()) {
        assert!((0.0..=100.0).contains(&rh), "humidity {rh} out of range");
        assert!((-46.85..=128.88).contains(&t), "temperature {t} out of range");
    }
});
