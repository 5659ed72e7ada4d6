//! lannerpsp - safe wrappers for the Lanner Platform Support Package
//!
//! The vendor ships `liblmbio.so` and `liblmbapi.so`, a C API covering the
//! hardware monitor, GPIO, LEDs, watchdog, LCM panel and other board
//! peripherals. This crate loads them at run time, opens an Init/DeInit
//! session around every call and turns the vendor return codes into
//! [`PspError`] values.
//!
//! ```no_run
//! use lannerpsp::{Hwm, Psp, PspConfig};
//!
//! let psp = Psp::open(&PspConfig::load()?)?;
//! let hwm = Hwm::new(&psp)?;
//! println!("CPU1 {:.1} C", hwm.cpu_temp(1)?);
//! # Ok::<(), lannerpsp::PspError>(())
//! ```

pub mod api;
pub mod callback;
pub mod com_port;
pub mod config;
pub mod dll;
pub mod ffi;
pub mod gpio;
pub mod gps;
pub mod gsr;
pub mod hwm;
pub mod hwm_conf;
pub mod hwm_sensors;
pub mod lcm;
pub mod logger;
pub mod native;
pub mod platform;
pub mod poe;
pub mod psp;
pub mod rfm;
pub mod sio;
pub mod sled;
pub mod swr;
pub mod utils;
pub mod wdt;

pub use psp_error::{
    psp_exc_msg, PspError, Result, ReturnCode, ERR_BOARD_NOT_MATCH, ERR_BUSY_IN_USES,
    ERR_DRIVER_NOT_LOAD, ERR_ERROR, ERR_INVALID, ERR_IPMI_IBF0, ERR_IPMI_IDLESTATE, ERR_IPMI_OBF1,
    ERR_IPMI_READSTATE, ERR_IPMI_WRITESTATE, ERR_NOT_EXIST, ERR_NOT_OPENED, ERR_NOT_SUPPORT,
    ERR_SUCCESS,
};

pub use api::{LmbApi, VoltageRail};
pub use com_port::{ComPort, ComPortInfo, UartMode};
pub use config::PspConfig;
pub use dll::{Dll, DllVersion};
pub use gpio::{Gpio, GpioInfo};
pub use gps::Gps;
pub use gsr::{Gsr, GsrData, GsrOffset};
pub use hwm::{Hwm, HwmSensor, HwmType, SensorReading};
pub use hwm_conf::HwmConf;
pub use hwm_sensors::{SensorKind, SensorTable};
pub use lcm::{Lcm, LcmKeyEvent};
pub use poe::{Poe, PoeInfo};
pub use psp::Psp;
pub use rfm::Rfm;
pub use sled::{GpsStatusLed, LteStatusLed, LteStressLed, SystemLed};
pub use swr::{Swr, SwrEvent};
pub use wdt::{Wdt, WdtInfo};

#[cfg(test)]
pub mod test_utils;
