//! Super I/O register access through `/dev/port`
//!
//! Used on LEB-7242, whose COM1 transceiver mode and termination are wired
//! to Super I/O GPIO pins the vendor library does not expose.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::PathBuf;

use tracing::trace;

use crate::{PspError, Result};

pub const DEV_PORT: &str = "/dev/port";

pub const SIO_INDEX: u16 = 0x2E;
pub const SIO_DATA: u16 = 0x2F;
const SIO_UNLOCK: u8 = 0x87;
const SIO_LOCK: u8 = 0xAA;

const REG_LDN: u8 = 0x07;
const LDN_GPIO: u8 = 0x06;
const REG_GPIO_ENABLE: u8 = 0x30;
const REG_MULTI_FUNC_1: u8 = 0x27;
const REG_MULTI_FUNC_2: u8 = 0x29;
const REG_MULTI_FUNC_3: u8 = 0x2C;
const REG_GPIO1_OUT_EN: u8 = 0xE0;
const REG_GPIO1_OUT_DATA: u8 = 0xE1;
const REG_GPIO2_OUT_EN: u8 = 0xD0;
const REG_GPIO2_OUT_DATA: u8 = 0xD1;

/// Byte-wide x86 port I/O
pub trait PortIo {
    fn inb(&mut self, port: u16) -> Result<u8>;
    fn outb(&mut self, port: u16, value: u8) -> Result<()>;
}

pub struct DevPort {
    file: File,
}

impl DevPort {
    pub fn open() -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(DEV_PORT)
            .map_err(|source| PspError::FileRead { path: PathBuf::from(DEV_PORT), source })?;
        Ok(Self { file })
    }
}

impl PortIo for DevPort {
    fn inb(&mut self, port: u16) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.file.read_exact_at(&mut byte, port as u64)?;
        Ok(byte[0])
    }

    fn outb(&mut self, port: u16, value: u8) -> Result<()> {
        self.file.write_all_at(&[value], port as u64)?;
        Ok(())
    }
}

/// Super I/O in extended function mode; call [`SuperIo::exit`] to lock it again
pub struct SuperIo<'a> {
    io: &'a mut dyn PortIo,
}

impl<'a> SuperIo<'a> {
    pub fn enter(io: &'a mut dyn PortIo) -> Result<Self> {
        io.outb(SIO_INDEX, SIO_UNLOCK)?;
        io.outb(SIO_INDEX, SIO_UNLOCK)?;
        Ok(Self { io })
    }

    pub fn read(&mut self, reg: u8) -> Result<u8> {
        self.io.outb(SIO_INDEX, reg)?;
        self.io.inb(SIO_DATA)
    }

    pub fn write(&mut self, reg: u8, value: u8) -> Result<()> {
        trace!("sio reg 0x{:02X} <- 0x{:02X}", reg, value);
        self.io.outb(SIO_INDEX, reg)?;
        self.io.outb(SIO_DATA, value)
    }

    pub fn update(&mut self, reg: u8, f: impl FnOnce(u8) -> u8) -> Result<()> {
        let value = self.read(reg)?;
        self.write(reg, f(value))
    }

    pub fn exit(self) -> Result<()> {
        self.io.outb(SIO_INDEX, SIO_LOCK)
    }
}

/// Route GPIO13/16/20 to the COM1 transceiver and select `mode`
/// (0 loopback, 1 RS-232, 2 RS-485, 3 RS-422)
pub fn com1_switch_mode(io: &mut dyn PortIo, mode: u8) -> Result<()> {
    let mut sio = SuperIo::enter(io)?;
    // multi function pins into gpio13 / gpio16
    sio.update(REG_MULTI_FUNC_1, |x| (x & 0xF2) | 0x04)?;
    sio.update(REG_MULTI_FUNC_2, |x| x & 0xF9)?;
    sio.update(REG_MULTI_FUNC_3, |x| x | 0x48)?;
    // and gpio20
    sio.update(REG_MULTI_FUNC_1, |x| (x & 0xF2) | 0x08)?;
    sio.update(REG_MULTI_FUNC_2, |x| x & 0xF7)?;
    sio.update(REG_MULTI_FUNC_3, |x| x | 0x01)?;

    sio.write(REG_LDN, LDN_GPIO)?;
    sio.update(REG_GPIO_ENABLE, |x| x | 0x01)?;
    sio.update(REG_GPIO1_OUT_EN, |x| x | 0x48)?;
    sio.update(REG_GPIO2_OUT_EN, |x| x | 0x01)?;
    // gpio16 carries the mode, gpio13 high enables termination
    sio.update(REG_GPIO1_OUT_DATA, |x| (x & 0xBF) | (mode << 5) | 0x08)?;
    sio.update(REG_GPIO2_OUT_DATA, |x| (x & 0xFE) | mode)?;
    sio.exit()
}

/// Drive GPIO13, the COM1 RS-422/485 termination switch
pub fn com1_termination(io: &mut dyn PortIo, enable: bool) -> Result<()> {
    let mut sio = SuperIo::enter(io)?;
    sio.write(REG_LDN, LDN_GPIO)?;
    sio.update(REG_GPIO1_OUT_DATA, |x| (x & 0xF7) | if enable { 0x08 } else { 0 })?;
    sio.exit()
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Register file behind the index/data pair, plus every byte written to the index port
    #[derive(Debug)]
    pub struct Chip {
        pub regs: [u8; 256],
        pub index: u8,
        pub index_writes: Vec<u8>,
    }

    impl Default for Chip {
        fn default() -> Self {
            Self { regs: [0; 256], index: 0, index_writes: Vec::new() }
        }
    }

    #[derive(Clone, Default)]
    pub struct FakePorts(pub Arc<Mutex<Chip>>);

    impl PortIo for FakePorts {
        fn inb(&mut self, port: u16) -> Result<u8> {
            let chip = self.0.lock().unwrap();
            assert_eq!(port, SIO_DATA);
            Ok(chip.regs[chip.index as usize])
        }

        fn outb(&mut self, port: u16, value: u8) -> Result<()> {
            let mut chip = self.0.lock().unwrap();
            if port == SIO_INDEX {
                chip.index = value;
                chip.index_writes.push(value);
            } else {
                let index = chip.index as usize;
                chip.regs[index] = value;
            }
            Ok(())
        }
    }
}
