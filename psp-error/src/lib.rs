//! Unified error handling for lannerpsp
//!
//! This crate provides the single error type used across the PSP wrappers,
//! together with the table of return codes produced by the vendor library.
//! Vendor failures keep the exact message text so callers can show it as is.

use std::io;
use std::path::PathBuf;

/// Result type alias using PspError
pub type Result<T> = std::result::Result<T, PspError>;

// ============================================================================
// Vendor Return Codes
// ============================================================================

pub const ERR_SUCCESS: i32 = 0;
pub const ERR_ERROR: i32 = -1;
pub const ERR_NOT_EXIST: i32 = -2;
pub const ERR_NOT_OPENED: i32 = -3;
pub const ERR_INVALID: i32 = -4;
pub const ERR_NOT_SUPPORT: i32 = -5;
pub const ERR_BUSY_IN_USES: i32 = -6;
pub const ERR_BOARD_NOT_MATCH: i32 = -7;
pub const ERR_DRIVER_NOT_LOAD: i32 = -8;

// IPMI access errors
pub const ERR_IPMI_IDLESTATE: i32 = -257;
pub const ERR_IPMI_WRITESTATE: i32 = -258;
pub const ERR_IPMI_READSTATE: i32 = -259;
pub const ERR_IPMI_IBF0: i32 = -260;
pub const ERR_IPMI_OBF1: i32 = -261;

/// Decoded vendor return code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Success,
    Error,
    NotExist,
    NotOpened,
    Invalid,
    NotSupport,
    BusyInUses,
    BoardNotMatch,
    DriverNotLoad,
    IpmiIdleState,
    IpmiWriteState,
    IpmiReadState,
    IpmiIbf0,
    IpmiObf1,
    Unknown(i32),
}

impl ReturnCode {
    pub const fn from_raw(code: i32) -> Self {
        match code {
            ERR_SUCCESS => Self::Success,
            ERR_ERROR => Self::Error,
            ERR_NOT_EXIST => Self::NotExist,
            ERR_NOT_OPENED => Self::NotOpened,
            ERR_INVALID => Self::Invalid,
            ERR_NOT_SUPPORT => Self::NotSupport,
            ERR_BUSY_IN_USES => Self::BusyInUses,
            ERR_BOARD_NOT_MATCH => Self::BoardNotMatch,
            ERR_DRIVER_NOT_LOAD => Self::DriverNotLoad,
            ERR_IPMI_IDLESTATE => Self::IpmiIdleState,
            ERR_IPMI_WRITESTATE => Self::IpmiWriteState,
            ERR_IPMI_READSTATE => Self::IpmiReadState,
            ERR_IPMI_IBF0 => Self::IpmiIbf0,
            ERR_IPMI_OBF1 => Self::IpmiObf1,
            other => Self::Unknown(other),
        }
    }

    pub const fn raw(self) -> i32 {
        match self {
            Self::Success => ERR_SUCCESS,
            Self::Error => ERR_ERROR,
            Self::NotExist => ERR_NOT_EXIST,
            Self::NotOpened => ERR_NOT_OPENED,
            Self::Invalid => ERR_INVALID,
            Self::NotSupport => ERR_NOT_SUPPORT,
            Self::BusyInUses => ERR_BUSY_IN_USES,
            Self::BoardNotMatch => ERR_BOARD_NOT_MATCH,
            Self::DriverNotLoad => ERR_DRIVER_NOT_LOAD,
            Self::IpmiIdleState => ERR_IPMI_IDLESTATE,
            Self::IpmiWriteState => ERR_IPMI_WRITESTATE,
            Self::IpmiReadState => ERR_IPMI_READSTATE,
            Self::IpmiIbf0 => ERR_IPMI_IBF0,
            Self::IpmiObf1 => ERR_IPMI_OBF1,
            Self::Unknown(code) => code,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Human readable text used inside vendor error messages
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Error => "general error",
            Self::NotExist => "device or file not exist",
            Self::NotOpened => "library not opened yet",
            Self::Invalid => "parameter out of range or invalid",
            Self::NotSupport => "hardware or function not support",
            Self::BusyInUses => "device is busy now",
            Self::BoardNotMatch => "board BIOSID and library not matched",
            Self::DriverNotLoad => "the lmbiodrv driver or i2c-dev driver not loading",
            Self::IpmiIdleState => "IPMI idle state error",
            Self::IpmiWriteState => "IPMI write state error",
            Self::IpmiReadState => "IPMI read state error",
            Self::IpmiIbf0 => "IPMI input wait error",
            Self::IpmiObf1 => "IPMI output wait error",
            Self::Unknown(_) => "unknown error",
        }
    }
}

impl From<i32> for ReturnCode {
    fn from(code: i32) -> Self {
        Self::from_raw(code)
    }
}

/// Format the result of a vendor call, e.g.
/// `LMB_DLL_Init return code ( 0xfffffffe --> device or file not exist )`.
pub fn psp_exc_msg(func_name: &str, ret_code: i32) -> String {
    format!(
        "{} return code ( 0x{:08x} --> {} )",
        func_name,
        ret_code as u32,
        ReturnCode::from_raw(ret_code).description()
    )
}

/// Unified error type for all lannerpsp operations
#[derive(thiserror::Error, Debug)]
pub enum PspError {
    // ============================================================================
    // Vendor Library Errors
    // ============================================================================
    /// Generic PSP failure, also used for codes without a dedicated variant
    #[error("{0}")]
    General(String),

    #[error("{0}")]
    NotExist(String),

    #[error("{0}")]
    NotOpened(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotSupport(String),

    #[error("{0}")]
    BusyInUses(String),

    #[error("{0}")]
    BoardNotMatch(String),

    #[error("{0}")]
    DriverNotLoad(String),

    // ============================================================================
    // IPMI KCS Interface Errors
    // ============================================================================
    #[error("{0}")]
    IpmiIdleState(String),

    #[error("{0}")]
    IpmiWriteState(String),

    #[error("{0}")]
    IpmiReadState(String),

    #[error("{0}")]
    IpmiIbf0(String),

    #[error("{0}")]
    IpmiObf1(String),

    // ============================================================================
    // Library Loading Errors
    // ============================================================================
    #[error("Failed to load {path}: {reason}")]
    LibraryLoad {
        path: PathBuf,
        reason: String,
    },

    #[error("Symbol not found in vendor library: {0}")]
    SymbolNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not implemented on this platform: {0}")]
    NotImplemented(String),

    // ============================================================================
    // I/O and Configuration Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl PspError {
    /// Map a vendor return code to an error, `None` on success
    pub fn from_code(func_name: &str, ret_code: i32) -> Option<Self> {
        let msg = psp_exc_msg(func_name, ret_code);
        let err = match ReturnCode::from_raw(ret_code) {
            ReturnCode::Success => return None,
            ReturnCode::NotExist => Self::NotExist(msg),
            ReturnCode::NotOpened => Self::NotOpened(msg),
            ReturnCode::Invalid => Self::Invalid(msg),
            ReturnCode::NotSupport => Self::NotSupport(msg),
            ReturnCode::BusyInUses => Self::BusyInUses(msg),
            ReturnCode::BoardNotMatch => Self::BoardNotMatch(msg),
            ReturnCode::DriverNotLoad => Self::DriverNotLoad(msg),
            ReturnCode::IpmiIdleState => Self::IpmiIdleState(msg),
            ReturnCode::IpmiWriteState => Self::IpmiWriteState(msg),
            ReturnCode::IpmiReadState => Self::IpmiReadState(msg),
            ReturnCode::IpmiIbf0 => Self::IpmiIbf0(msg),
            ReturnCode::IpmiObf1 => Self::IpmiObf1(msg),
            ReturnCode::Error | ReturnCode::Unknown(_) => Self::General(msg),
        };
        Some(err)
    }

    /// Turn a vendor return code into `Ok(())` or the matching error
    pub fn check(func_name: &str, ret_code: i32) -> Result<()> {
        match Self::from_code(func_name, ret_code) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Create a generic error from a string
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create a not supported error
    pub fn not_support(msg: impl Into<String>) -> Self {
        Self::NotSupport(msg.into())
    }

    /// Create a not implemented error
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the IPMI KCS interface family
    pub fn is_ipmi(&self) -> bool {
        matches!(
            self,
            Self::IpmiIdleState(_)
                | Self::IpmiWriteState(_)
                | Self::IpmiReadState(_)
                | Self::IpmiIbf0(_)
                | Self::IpmiObf1(_)
        )
    }

    /// True when the vendor library reported the function as unavailable
    pub fn is_not_support(&self) -> bool {
        matches!(self, Self::NotSupport(_))
    }
}

// Allow converting from String to PspError
impl From<String> for PspError {
    fn from(s: String) -> Self {
        Self::General(s)
    }
}

// Allow converting from &str to PspError
impl From<&str> for PspError {
    fn from(s: &str) -> Self {
        Self::General(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_format() {
        assert_eq!(
            psp_exc_msg("LMB_DLL_Init", ERR_NOT_EXIST),
            "LMB_DLL_Init return code ( 0xfffffffe --> device or file not exist )"
        );
        assert_eq!(
            psp_exc_msg("LMB_WDT_Start", ERR_SUCCESS),
            "LMB_WDT_Start return code ( 0x00000000 --> OK )"
        );
        assert_eq!(
            psp_exc_msg("LMB_HWM_GetSensorReport", ERR_IPMI_OBF1),
            "LMB_HWM_GetSensorReport return code ( 0xfffffefb --> IPMI output wait error )"
        );
        assert_eq!(
            psp_exc_msg("X", -99),
            "X return code ( 0xffffff9d --> unknown error )"
        );
    }

    #[test]
    fn test_code_roundtrip() {
        for code in [0, -1, -2, -3, -4, -5, -6, -7, -8, -257, -258, -259, -260, -261, 42] {
            assert_eq!(ReturnCode::from_raw(code).raw(), code);
        }
        assert!(ReturnCode::from(0).is_success());
        assert_eq!(ReturnCode::from(-12), ReturnCode::Unknown(-12));
    }

    #[test]
    fn test_check_maps_variants() {
        assert!(PspError::check("f", ERR_SUCCESS).is_ok());
        assert!(matches!(PspError::check("f", ERR_ERROR), Err(PspError::General(_))));
        assert!(matches!(PspError::check("f", ERR_NOT_EXIST), Err(PspError::NotExist(_))));
        assert!(matches!(PspError::check("f", ERR_NOT_OPENED), Err(PspError::NotOpened(_))));
        assert!(matches!(PspError::check("f", ERR_INVALID), Err(PspError::Invalid(_))));
        assert!(matches!(PspError::check("f", ERR_NOT_SUPPORT), Err(PspError::NotSupport(_))));
        assert!(matches!(PspError::check("f", ERR_BUSY_IN_USES), Err(PspError::BusyInUses(_))));
        assert!(matches!(PspError::check("f", ERR_BOARD_NOT_MATCH), Err(PspError::BoardNotMatch(_))));
        assert!(matches!(PspError::check("f", ERR_DRIVER_NOT_LOAD), Err(PspError::DriverNotLoad(_))));
        assert!(matches!(PspError::check("f", 7), Err(PspError::General(_))));
    }

    #[test]
    fn test_ipmi_family() {
        for code in [ERR_IPMI_IDLESTATE, ERR_IPMI_WRITESTATE, ERR_IPMI_READSTATE, ERR_IPMI_IBF0, ERR_IPMI_OBF1] {
            let err = PspError::from_code("LMB_IPMI_InfoByName", code).unwrap();
            assert!(err.is_ipmi());
        }
        assert!(!PspError::invalid("x").is_ipmi());
    }

    #[test]
    fn test_display_is_plain_message() {
        let err = PspError::invalid("'num' can only be set to (1~2) on this platform");
        assert_eq!(err.to_string(), "'num' can only be set to (1~2) on this platform");
        let err = PspError::from("boom");
        assert_eq!(err.to_string(), "boom");
    }
}
