//! Driver for the Si1143 proximity/pulse sensor.
//!
//! Only as much of the chip as the pulse plug uses: three proximity channels measured
//! autonomously every 10ms, one per LED. PS1 is the red LED, PS2 and PS3 the two IR LEDs,
//! all read through the large IR photodiode.

use crate::hal::PulseSensor;
use crate::heartbeat::Sample;
use embedded_hal::i2c::{Error as _, I2c};
use log::warn;

pub const ADDRESS: u8 = 0x5A;

/// What PART_ID reads on an Si1143
const PART_ID_SI1143: u8 = 0x43;

mod reg {
    pub const PART_ID: u8 = 0x00;
    pub const INT_CFG: u8 = 0x03;
    pub const IRQ_ENABLE: u8 = 0x04;
    pub const IRQ_MODE2: u8 = 0x06;
    pub const HW_KEY: u8 = 0x07;
    pub const MEAS_RATE: u8 = 0x08;
    pub const ALS_RATE: u8 = 0x09;
    pub const PS_RATE: u8 = 0x0A;
    pub const PS_LED21: u8 = 0x0F;
    pub const PS_LED3: u8 = 0x10;
    pub const PARAM_WR: u8 = 0x17;
    pub const COMMAND: u8 = 0x18;
    pub const PS1_DATA0: u8 = 0x26;
}

/// RAM parameters, written through PARAM_WR and a PARAM_SET command
mod param {
    pub const CH_LIST: u8 = 0x01;
    pub const PSLED12_SELECT: u8 = 0x02;
    pub const PSLED3_SELECT: u8 = 0x03;
    pub const PS1_ADCMUX: u8 = 0x07;
    pub const PS2_ADCMUX: u8 = 0x08;
    pub const PS3_ADCMUX: u8 = 0x09;
    pub const PS_ADC_COUNTER: u8 = 0x0A;
    pub const PS_ADC_GAIN: u8 = 0x0B;
}

mod command {
    pub const PARAM_SET: u8 = 0xA0;
    pub const PSALS_AUTO: u8 = 0x0F;
}

/// Unlocks the chip
const HW_KEY_VALUE: u8 = 0x17;

/// Large IR photodiode
const ADCMUX_LARGE_IR: u8 = 0x03;

/// Register set up, in order
const REGISTERS: [(u8, u8); 9] = [
    (reg::HW_KEY, HW_KEY_VALUE),
    (reg::INT_CFG, 0x03),    // interrupts on
    (reg::IRQ_ENABLE, 0x10), // interrupt on PS3
    (reg::IRQ_MODE2, 0x01),  // on every PS3 measurement
    (reg::MEAS_RATE, 0x84),  // wake up every 10ms
    (reg::ALS_RATE, 0x08),   // measure on every wake up
    (reg::PS_RATE, 0x08),
    (reg::PS_LED21, 0x39), // LED current, IR1 high nibble, red low nibble
    (reg::PS_LED3, 0x02),  // LED current, IR2
];

/// Parameter set up, in order. Gain above 4 can damage the LEDs.
const PARAMETERS: [(u8, u8); 8] = [
    (param::CH_LIST, 0x77),        // all measurements on
    (param::PS_ADC_GAIN, 0x00),
    (param::PSLED12_SELECT, 0x21), // PS1 pulses red, PS2 pulses IR1
    (param::PSLED3_SELECT, 0x04),  // PS3 pulses IR2
    (param::PS1_ADCMUX, ADCMUX_LARGE_IR),
    (param::PS2_ADCMUX, ADCMUX_LARGE_IR),
    (param::PS3_ADCMUX, ADCMUX_LARGE_IR),
    (param::PS_ADC_COUNTER, 0b0111_0000),
];

pub struct Si1143<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Si1143<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Program the measurement set up and start the autonomous measurement loop
    pub fn configure(&mut self) -> Result<(), I2C::Error> {
        for (register, value) in REGISTERS {
            self.set_reg(register, value)?;
        }
        for (parameter, value) in PARAMETERS {
            self.write_param(parameter, value)?;
        }
        self.set_reg(reg::COMMAND, command::PSALS_AUTO)
    }

    #[cfg(test)]
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn set_reg(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[register, value])
    }

    fn get_reg(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8];
        self.i2c.write_read(ADDRESS, &[register], &mut buf)?;
        Ok(buf[0])
    }

    fn write_param(&mut self, parameter: u8, value: u8) -> Result<(), I2C::Error> {
        self.set_reg(reg::PARAM_WR, value)?;
        self.set_reg(reg::COMMAND, command::PARAM_SET | parameter)
    }

    fn read_channels(&mut self) -> Result<Sample, I2C::Error> {
        let mut buf = [0u8; 6];
        self.i2c.write_read(ADDRESS, &[reg::PS1_DATA0], &mut buf)?;
        let channel = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]) as u32;
        Ok(Sample::new(channel(0), channel(2), channel(4)))
    }
}

impl<I2C: I2c> PulseSensor for Si1143<I2C> {
    fn is_present(&mut self) -> bool {
        matches!(self.get_reg(reg::PART_ID), Ok(PART_ID_SI1143))
    }

    fn fetch_sample(&mut self) -> Sample {
        self.read_channels().unwrap_or_else(|e| {
            warn!("SI1143: Read failed: {:?}", e.kind());
            Sample::default()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug)]
    struct BusError;

    impl embedded_hal::i2c::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Records writes and answers reads from a register map
    struct FakeBus {
        registers: [u8; 0x40],
        writes: Vec<(u8, u8)>,
        broken: bool,
    }

    impl Default for FakeBus {
        fn default() -> Self {
            Self {
                registers: [0; 0x40],
                writes: Vec::new(),
                broken: false,
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = BusError;
    }

    impl I2c for FakeBus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), BusError> {
            if self.broken || address != ADDRESS {
                return Err(BusError);
            }
            let mut pointer = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        pointer = bytes[0] as usize;
                        if let [register, value] = bytes[..] {
                            self.writes.push((register, value));
                            self.registers[register as usize] = value;
                        }
                    }
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = self.registers[pointer + i];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    pub fn if_it_finds_the_part() {
        let mut bus = FakeBus::default();
        bus.registers[reg::PART_ID as usize] = PART_ID_SI1143;
        assert!(Si1143::new(bus).is_present());

        let bus = FakeBus::default();
        assert!(!Si1143::new(bus).is_present());
    }

    #[test]
    pub fn if_configuration_follows_the_sequence() {
        let mut sensor = Si1143::new(FakeBus::default());
        sensor.configure().expect("the fake bus never fails");
        let writes = sensor.release().writes;

        assert_eq!(writes.len(), REGISTERS.len() + 2 * PARAMETERS.len() + 1);
        assert_eq!(writes[0], (reg::HW_KEY, 0x17));
        assert_eq!(writes[4], (reg::MEAS_RATE, 0x84));
        // Parameters go through PARAM_WR then a PARAM_SET command
        assert_eq!(writes[9], (reg::PARAM_WR, 0x77));
        assert_eq!(writes[10], (reg::COMMAND, 0xA1));
        assert_eq!(writes[11], (reg::PARAM_WR, 0x00));
        assert_eq!(writes[12], (reg::COMMAND, 0xAB));
        assert_eq!(writes.last(), Some(&(reg::COMMAND, command::PSALS_AUTO)));
    }

    #[test]
    pub fn if_channels_are_little_endian() {
        let mut bus = FakeBus::default();
        let base = reg::PS1_DATA0 as usize;
        bus.registers[base..base + 6].copy_from_slice(&[0x34, 0x12, 0xCD, 0xAB, 0x01, 0x00]);
        let mut sensor = Si1143::new(bus);
        assert_eq!(sensor.fetch_sample(), Sample::new(0x1234, 0xABCD, 0x0001));
    }

    #[test]
    pub fn if_a_bus_error_reads_blank() {
        let bus = FakeBus {
            broken: true,
            ..FakeBus::default()
        };
        let mut sensor = Si1143::new(bus);
        assert!(sensor.fetch_sample().is_blank());
    }
}
