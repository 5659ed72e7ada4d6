//! Serial port transceiver mode and termination

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::dll::{Dll, DllVersion};
use crate::ffi::{URMODE_LOOPBACK, URMODE_RS232, URMODE_RS422, URMODE_RS485};
use crate::psp::Psp;
use crate::sio::{self, DevPort, PortIo};
use crate::{PspError, Result};

const MODE_NAMES: [&str; 4] = ["Loopback", "RS-232", "RS-485", "RS-422"];
const TERM_NAMES: [&str; 2] = ["Disabled", "Enabled"];

type PortIoFactory = Arc<dyn Fn() -> Result<Box<dyn PortIo>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComPortInfo {
    pub num: u32,
    /// 232, 422 or 485; 0 in loopback
    pub mode: u32,
    pub mode_str: String,
    pub termination: bool,
    pub termination_str: String,
}

/// Transceiver modes a port can be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartMode {
    Rs232,
    Rs422,
    Rs485,
}

impl UartMode {
    pub fn from_number(mode: u32) -> Result<Self> {
        match mode {
            232 => Ok(UartMode::Rs232),
            422 => Ok(UartMode::Rs422),
            485 => Ok(UartMode::Rs485),
            _ => Err(PspError::invalid("'mode' value must be 232 or 422 or 485")),
        }
    }

    pub fn raw(self) -> i8 {
        match self {
            UartMode::Rs232 => URMODE_RS232,
            UartMode::Rs422 => URMODE_RS422,
            UartMode::Rs485 => URMODE_RS485,
        }
    }
}

impl fmt::Display for UartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MODE_NAMES[self.raw() as usize])
    }
}

pub struct ComPort {
    psp: Psp,
    version: DllVersion,
    num: u32,
    port_io: PortIoFactory,
}

impl ComPort {
    pub fn new(psp: &Psp, num: u32) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        match version.platform_id.as_str() {
            "LEB-7242" if num != 1 => {
                return Err(PspError::invalid("'num' can only be set to (1) on this platform"))
            }
            "LEC-7230" if !(1..=2).contains(&num) => {
                return Err(PspError::invalid("'num' can only be set to (1~2) on this platform"))
            }
            "LEB-7242" | "LEC-7230" => {}
            other => {
                return Err(PspError::not_implemented(format!("COM port control on {other}")))
            }
        }
        Ok(Self {
            psp: psp.clone(),
            version,
            num,
            port_io: Arc::new(|| Ok(Box::new(DevPort::open()?) as Box<dyn PortIo>)),
        })
    }

    /// Replace `/dev/port` as the Super I/O access path
    pub fn with_port_io(
        mut self,
        factory: impl Fn() -> Result<Box<dyn PortIo>> + Send + Sync + 'static,
    ) -> Self {
        self.port_io = Arc::new(factory);
        self
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    fn platform(&self) -> &str {
        &self.version.platform_id
    }

    pub fn get_info(&self) -> Result<ComPortInfo> {
        if self.platform() != "LEC-7230" {
            return Err(PspError::not_support("Not support on this platform"));
        }
        let (mut mode, mut term) = (0i8, 0i8);
        self.psp.run(|lib| {
            PspError::check("LMB_ODM_GetUartMode", lib.odm_get_uart_mode(self.num, &mut mode)?)?;
            PspError::check("LMB_ODM_TermStat", lib.odm_term_stat(self.num, &mut term)?)
        })?;

        let mode_number = match mode {
            URMODE_RS232 => 232,
            URMODE_RS422 => 422,
            URMODE_RS485 => 485,
            URMODE_LOOPBACK => 0,
            other => return Err(PspError::general(format!("unknown UART mode {other}"))),
        };
        let termination_str = usize::try_from(term)
            .ok()
            .and_then(|t| TERM_NAMES.get(t))
            .ok_or_else(|| PspError::general(format!("unknown termination state {term}")))?;
        Ok(ComPortInfo {
            num: self.num,
            mode: mode_number,
            mode_str: MODE_NAMES[mode as usize].to_string(),
            termination: term == 1,
            termination_str: termination_str.to_string(),
        })
    }

    /// Switch to RS-232, RS-422 or RS-485 (`232`, `422`, `485`)
    pub fn set_mode(&self, mode: u32) -> Result<()> {
        let mode = UartMode::from_number(mode)?;
        match self.platform() {
            "LEB-7242" => {
                let mut io = (self.port_io)()?;
                sio::com1_switch_mode(io.as_mut(), mode.raw() as u8)?;
            }
            "LEC-7230" => {
                let code = self.psp.run(|lib| lib.odm_set_uart_mode(self.num, mode.raw()))?;
                PspError::check("LMB_ODM_SetUartMode", code)?;
            }
            _ => return Err(PspError::not_support("Not support on this platform")),
        }
        debug!("set com port {} mode {}", self.num, mode);
        Ok(())
    }

    /// RS-422/RS-485 line termination
    pub fn set_termination(&self, enable: bool) -> Result<()> {
        match self.platform() {
            "LEB-7242" => {
                let mut io = (self.port_io)()?;
                sio::com1_termination(io.as_mut(), enable)?;
            }
            "LEC-7230" => {
                let code = self.psp.run(|lib| lib.odm_termination(self.num, enable as i8))?;
                PspError::check("LMB_ODM_Termination", code)?;
            }
            _ => return Err(PspError::not_support("Not support on this platform")),
        }
        debug!("set com port {} termination {}", self.num, TERM_NAMES[enable as usize]);
        Ok(())
    }
}
