//! LCD module on the front panel
//!
//! UART modules must be attached with `LMB_LCM_OpenPort` before a reset;
//! the display calls only need DeviceOpen/DeviceClose around them.

use std::ffi::CString;
use std::fmt;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::debug;

use crate::api::LmbApi;
use crate::callback::{self, EventSlot};
use crate::config::{PspConfig, DEFAULT_LCM_BAUD_RATE, DEFAULT_LCM_PORT};
use crate::dll::{Dll, DllVersion};
use crate::ffi::{buf_to_string, string_to_buf, LcmInfoRaw, LcmKeyCallback, LcmKeyMsg};
use crate::psp::Psp;
use crate::{PspError, Result};

/// Polling period handed to `LMB_LCM_KeysCallback`, in milliseconds
const KEYS_POLL_MS: u32 = 150;

lazy_static! {
    static ref KEY_EVENTS: EventSlot<LcmKeyEvent> = EventSlot::new();
}

extern "C" fn on_key(msg: LcmKeyMsg) {
    KEY_EVENTS.publish(LcmKeyEvent::from(msg));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LcmKeyEvent {
    pub keys: u8,
    pub status: u8,
    pub time: String,
}

impl From<LcmKeyMsg> for LcmKeyEvent {
    fn from(msg: LcmKeyMsg) -> Self {
        Self { keys: msg.keys, status: msg.status, time: msg.time.to_string() }
    }
}

impl fmt::Display for LcmKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Callback> LCM Item = 0x{:02X}, Status = 0x{:02X}, time is {}",
            self.keys, self.status, self.time
        )
    }
}

pub struct Lcm {
    psp: Psp,
    version: DllVersion,
    port: String,
    baud_rate: u32,
}

impl Lcm {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        Ok(Self {
            psp: psp.clone(),
            version,
            port: DEFAULT_LCM_PORT.to_string(),
            baud_rate: DEFAULT_LCM_BAUD_RATE,
        })
    }

    /// Take port and speed from the loaded configuration
    pub fn with_config(self, config: &PspConfig) -> Self {
        self.with_port(&config.lcm_port, config.lcm_baud_rate)
    }

    pub fn with_port(mut self, port: &str, baud_rate: u32) -> Self {
        self.port = port.to_string();
        self.baud_rate = baud_rate;
        self
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Port and speed the module answers on, as `port=/dev/ttyS1, speed=19200`
    pub fn search_port(&self) -> Result<String> {
        let mut port = [0u8; 64];
        string_to_buf(&self.port, &mut port);
        let mut speed = self.baud_rate as i32;
        let code = match self.version.dll() {
            (2, 1..=3) => self.psp.run(|lib| lib.lcm_search_port(&mut port, &mut speed))?,
            (3, 0) => self.psp.run(|lib| lib.lcm_search_port_sized(&mut port, &mut speed))?,
            (major, minor) => {
                return Err(PspError::not_implemented(format!(
                    "LMB_LCM_SearchPort is not implemented for PSP {major}.{minor}"
                )))
            }
        };
        PspError::check("LMB_LCM_SearchPort", code)?;
        Ok(format!("port={}, speed={}", buf_to_string(&port), speed))
    }

    /// Run `f` between DeviceOpen and DeviceClose; `f`'s error wins
    fn with_device<T>(&self, f: impl FnOnce(&dyn LmbApi) -> Result<T>) -> Result<T> {
        self.psp.run(|lib| {
            PspError::check("LMB_LCM_DeviceOpen", lib.lcm_device_open()?)?;
            let out = f(lib);
            let closed = lib
                .lcm_device_close()
                .and_then(|code| PspError::check("LMB_LCM_DeviceClose", code));
            let out = out?;
            closed?;
            Ok(out)
        })
    }

    pub fn reset(&self) -> Result<()> {
        let port = CString::new(self.port.as_str())
            .map_err(|_| PspError::invalid(format!("bad LCM port {:?}", self.port)))?;
        self.psp.run(|lib| {
            PspError::check("LMB_LCM_OpenPort", lib.lcm_open_port(&port, self.baud_rate as i32)?)?;
            let mut info = LcmInfoRaw::default();
            let code = lib.lcm_device_info(&mut info)?;
            if code != 0 {
                debug!("LMB_LCM_DeviceInfo returned {}, assuming LPT module", code);
                return Err(PspError::not_support("LPT type not support reset"));
            }
            debug!(
                "LCM model {:04X}, firmware {:04X}, speed {}",
                info.mode_no, info.version, info.baud_rate
            );
            PspError::check("LMB_LCM_Reset", lib.lcm_reset()?)?;
            PspError::check("LMB_LCM_DeviceClose", lib.lcm_device_close()?)
        })
    }

    /// Bit N set means key N+1 is pressed
    pub fn get_keys_status(&self) -> Result<u8> {
        let keys = self.with_device(|lib| {
            let mut keys = 0u8;
            PspError::check("LMB_LCM_KeysStatus", lib.lcm_keys_status(&mut keys)?)?;
            Ok(keys)
        })?;
        debug!("LCM keys status is {:02x}", keys);
        Ok(keys)
    }

    pub fn set_backlight(&self, enable: bool) -> Result<()> {
        self.with_device(|lib| PspError::check("LMB_LCM_LightCtrl", lib.lcm_light_ctrl(enable as u8)?))
    }

    /// Rows and columns count from 1
    pub fn set_cursor(&self, row: u32, column: u32) -> Result<()> {
        self.with_device(|lib| PspError::check("LMB_LCM_SetCursor", lib.lcm_set_cursor(column, row)?))
    }

    pub fn write(&self, msg: &str) -> Result<()> {
        let text = CString::new(msg)
            .map_err(|_| PspError::invalid("'msg' must not contain NUL bytes"))?;
        self.with_device(|lib| PspError::check("LMB_LCM_WriteString", lib.lcm_write_string(&text)?))
    }

    pub fn clear(&self) -> Result<()> {
        self.with_device(|lib| PspError::check("LMB_LCM_DisplayClear", lib.lcm_display_clear()?))
    }

    /// Deliver key events to `on_event` for `duration`
    pub fn watch_keys(&self, duration: Duration, on_event: impl FnMut(LcmKeyEvent)) -> Result<()> {
        self.psp.run(|lib| {
            callback::watch(
                &KEY_EVENTS,
                duration,
                || {
                    let code = lib.lcm_keys_callback(Some(on_key as LcmKeyCallback), KEYS_POLL_MS)?;
                    PspError::check("LMB_LCM_KeysCallback", code)?;
                    debug!("hooked LCM keys callback");
                    Ok(())
                },
                || PspError::check("LMB_LCM_KeysCallback", lib.lcm_keys_callback(None, KEYS_POLL_MS)?),
                on_event,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::IntrusionTime;
    use crate::test_utils::{mock_on_platform, psp_from};
    use mockall::Sequence;
    use serial_test::serial;

    #[test]
    fn test_search_port_by_version() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_search_port()
            .withf(|port, speed| buf_to_string(port) == "/dev/ttyS1" && *speed == 19200)
            .returning(|_, speed| {
                *speed = 57600;
                Ok(0)
            });
        let lcm = Lcm::new(&psp_from(mock)).unwrap();
        assert_eq!(lcm.search_port().unwrap(), "port=/dev/ttyS1, speed=57600");

        let mut mock = mock_on_platform("LEC-7230", 3, 0);
        mock.expect_lcm_search_port_sized().times(1).returning(|_, _| Ok(0));
        let lcm = Lcm::new(&psp_from(mock)).unwrap().with_port("/dev/ttyS2", 9600);
        assert_eq!(lcm.search_port().unwrap(), "port=/dev/ttyS2, speed=9600");

        let lcm = Lcm::new(&psp_from(mock_on_platform("V3S", 1, 9))).unwrap();
        assert!(matches!(lcm.search_port(), Err(PspError::NotImplemented(_))));
    }

    #[test]
    fn test_display_calls_wrapped_in_device_open_close() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        let mut seq = Sequence::new();
        mock.expect_lcm_device_open().times(1).in_sequence(&mut seq).returning(|| Ok(0));
        mock.expect_lcm_set_cursor()
            .withf(|column, row| *column == 1 && *row == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(0));
        mock.expect_lcm_device_close().times(1).in_sequence(&mut seq).returning(|| Ok(0));
        let lcm = Lcm::new(&psp_from(mock)).unwrap();
        lcm.set_cursor(2, 1).unwrap();
    }

    #[test]
    fn test_failed_call_still_closes_device() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_device_open().returning(|| Ok(0));
        mock.expect_lcm_write_string()
            .withf(|text| text.to_bytes() == b"Lanner")
            .returning(|_| Ok(-1));
        mock.expect_lcm_device_close().times(1).returning(|| Ok(0));
        let lcm = Lcm::new(&psp_from(mock)).unwrap();
        let err = lcm.write("Lanner").unwrap_err();
        assert!(err.to_string().starts_with("LMB_LCM_WriteString return code"));
        assert!(matches!(lcm.write("a\0b"), Err(PspError::Invalid(_))));
    }

    #[test]
    fn test_keys_status() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_device_open().returning(|| Ok(0));
        mock.expect_lcm_keys_status().returning(|k| {
            *k = 0b0010;
            Ok(0)
        });
        mock.expect_lcm_device_close().returning(|| Ok(0));
        assert_eq!(Lcm::new(&psp_from(mock)).unwrap().get_keys_status().unwrap(), 2);
    }

    #[test]
    fn test_reset_rejects_lpt() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_open_port()
            .withf(|port, speed| port.to_bytes() == b"/dev/ttyS1" && *speed == 19200)
            .returning(|_, _| Ok(0));
        mock.expect_lcm_device_info().returning(|_| Ok(-5));
        mock.expect_lcm_reset().never();
        let lcm = Lcm::new(&psp_from(mock)).unwrap();
        let err = lcm.reset().unwrap_err();
        assert!(matches!(err, PspError::NotSupport(ref m) if m == "LPT type not support reset"));
    }

    #[test]
    fn test_reset_uart() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_open_port().returning(|_, _| Ok(0));
        mock.expect_lcm_device_info().returning(|info| {
            info.baud_rate = 19200;
            Ok(0)
        });
        mock.expect_lcm_reset().times(1).returning(|| Ok(0));
        mock.expect_lcm_device_close().times(1).returning(|| Ok(0));
        Lcm::new(&psp_from(mock)).unwrap().reset().unwrap();
    }

    #[test]
    fn test_key_event_text() {
        let event = LcmKeyEvent::from(LcmKeyMsg {
            keys: 0x08,
            status: 0x08,
            time: IntrusionTime { year: 2022, month: 8, day: 2, hour: 16, minute: 48, second: 28 },
        });
        assert_eq!(
            event.to_string(),
            "<Callback> LCM Item = 0x08, Status = 0x08, time is 2022/08/02 16:48:28"
        );
    }

    #[test]
    #[serial]
    fn test_watch_keys() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_lcm_keys_callback()
            .withf(|cb, period| cb.is_some() && *period == 150)
            .times(1)
            .returning(|cb, _| {
                if let Some(cb) = cb {
                    cb(LcmKeyMsg { keys: 4, status: 4, ..Default::default() });
                    cb(LcmKeyMsg { keys: 4, status: 0, ..Default::default() });
                }
                Ok(0)
            });
        mock.expect_lcm_keys_callback()
            .withf(|cb, _| cb.is_none())
            .times(1)
            .returning(|_, _| Ok(0));
        let lcm = Lcm::new(&psp_from(mock)).unwrap();

        let mut events = Vec::new();
        lcm.watch_keys(Duration::from_millis(50), |e| events.push(e)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].keys, events[0].status), (4, 4));
        assert_eq!(events[1].status, 0);
        assert!(!KEY_EVENTS.is_hooked());
    }
}
