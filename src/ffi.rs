//! C structures and constants shared with liblmbapi
//!
//! Layouts follow the vendor headers (`lmbinc.h`, `lmbipmi.h`) field for field.

use std::ffi::CStr;
use std::os::raw::c_char;

// ============================================================================
// Timer / Watchdog
// ============================================================================

pub const BASE_SECOND: u8 = 1;
pub const BASE_MINUTE: u8 = 2;

pub const WDT_TYPE_UNKNOWN: u8 = 0;
pub const WDT_TYPE_SIO: u8 = 1;
pub const WDT_TYPE_TCO: u8 = 2;

// ============================================================================
// ODM UART modes
// ============================================================================

pub const URMODE_LOOPBACK: i8 = 0;
pub const URMODE_RS232: i8 = 1;
pub const URMODE_RS485: i8 = 2;
pub const URMODE_RS422: i8 = 3;

// ============================================================================
// Hardware monitor
// ============================================================================

pub const HWM_TYPE_NONE: u32 = 0;
pub const HWM_TYPE_SIO: u32 = 1;
pub const HWM_TYPE_IPMI: u32 = 2;
pub const HWM_TYPE_SMBUS: u32 = 3;
pub const HWM_TYPE_AST1400: u32 = 4;

pub const IPMI_INVALID_VALUE: i8 = 0x01;
pub const IPMI_INVALID_UC: i8 = 0x02;
pub const IPMI_INVALID_LC: i8 = 0x04;

pub const IPMI_NAME_MAX_SIZE: usize = 16;

pub const DLL_VERSION_ID_SIZE: usize = 15;

/// Decode a NUL terminated C character array
pub fn c_chars_to_string(chars: &[c_char]) -> String {
    let bytes: Vec<u8> = chars
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decode a NUL terminated byte buffer filled by the vendor library
pub fn buf_to_string(buf: &[u8]) -> String {
    match CStr::from_bytes_until_nul(buf) {
        Ok(s) => s.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(buf).into_owned(),
    }
}

/// Copy a string into a zeroed buffer, keeping a trailing NUL
pub fn string_to_buf(s: &str, buf: &mut [u8]) {
    buf.fill(0);
    let n = s.len().min(buf.len().saturating_sub(1));
    buf[..n].copy_from_slice(&s.as_bytes()[..n]);
}

/// DLL_VERSION
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DllVersionRaw {
    pub dll_major: u16,
    pub dll_minor: u16,
    pub dll_build: u16,
    pub platform_id: [c_char; DLL_VERSION_ID_SIZE],
    pub board_major: u16,
    pub board_minor: u16,
    pub board_build: u16,
}

/// WDT_INFO
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct WdtInfoRaw {
    pub wdt_type: u8,
    pub count_max: u16,
    pub minute_support: u8,
}

/// INTRUSION_TIME
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntrusionTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl std::fmt::Display for IntrusionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// INTRUSION_MSG
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntrusionMsg {
    pub occur_item: u32,
    pub status: u32,
    pub time: IntrusionTime,
}

/// LCM_INFO
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct LcmInfoRaw {
    pub mode_no: u16,
    pub version: u16,
    pub baud_rate: u32,
}

/// LCMKEY_MSG
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LcmKeyMsg {
    pub keys: u8,
    pub status: u8,
    pub time: IntrusionTime,
}

/// AXIS_RAWDATA
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisRawData {
    pub x_axis: i16,
    pub y_axis: i16,
    pub z_axis: i16,
    pub g_range: i16,
}

/// IPMI_SENSOR_INFO
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct IpmiSensorInfo {
    pub name: [c_char; IPMI_NAME_MAX_SIZE + 1],
    pub invalid_flag: i8,
    pub value: f32,
    pub hi_critical: f32,
    pub lo_critical: f32,
    pub unit: [c_char; IPMI_NAME_MAX_SIZE + 1],
}

/// Callback type for `LMB_SWR_IntrCallback`
pub type IntrusionCallback = extern "C" fn(IntrusionMsg);

/// Callback type for `LMB_LCM_KeysCallback`
pub type LcmKeyCallback = extern "C" fn(LcmKeyMsg);
