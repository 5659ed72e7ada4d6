//! Watchdog timer

use serde::Serialize;
use tracing::{debug, info};

use crate::dll::{Dll, DllVersion};
use crate::ffi::{WdtInfoRaw, BASE_MINUTE, BASE_SECOND, WDT_TYPE_SIO, WDT_TYPE_TCO};
use crate::psp::Psp;
use crate::{PspError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WdtInfo {
    #[serde(rename = "type")]
    pub wdt_type: String,
    pub max_count: u16,
    pub is_minute_support: bool,
}

impl From<WdtInfoRaw> for WdtInfo {
    fn from(raw: WdtInfoRaw) -> Self {
        let wdt_type = match raw.wdt_type {
            WDT_TYPE_SIO => "SuperIO",
            WDT_TYPE_TCO => "TCO",
            _ => "Unknown",
        };
        Self {
            wdt_type: wdt_type.to_string(),
            max_count: raw.count_max,
            is_minute_support: raw.minute_support != 0,
        }
    }
}

pub struct Wdt {
    psp: Psp,
    version: DllVersion,
}

impl Wdt {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        Ok(Self { psp: psp.clone(), version })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn get_info(&self) -> Result<WdtInfo> {
        let mut raw = WdtInfoRaw::default();
        let code = self.psp.run(|lib| lib.wdt_query_info(&mut raw))?;
        PspError::check("LMB_WDT_QueryInfo", code)?;
        Ok(raw.into())
    }

    /// Program the countdown; `unit` is 1 for seconds, 2 for minutes
    pub fn config(&self, count: u32, unit: u8) -> Result<()> {
        let info = self.get_info()?;
        self.validate(&info, count, unit)?;
        let code = self.psp.run(|lib| lib.wdt_config(count, unit))?;
        PspError::check("LMB_WDT_Config", code)
    }

    fn validate(&self, info: &WdtInfo, count: u32, unit: u8) -> Result<()> {
        match unit {
            BASE_SECOND => {}
            BASE_MINUTE if info.is_minute_support => {}
            BASE_MINUTE => {
                return Err(PspError::not_support(format!(
                    "{} watchdog has no minute unit",
                    info.wdt_type
                )))
            }
            _ => return Err(PspError::invalid("'unit' value must be 1 (second) or 2 (minute)")),
        }
        if !(1..=u32::from(info.max_count)).contains(&count) {
            return Err(PspError::invalid(format!(
                "'count' value must be between 1 and {}",
                info.max_count
            )));
        }
        Ok(())
    }

    /// Configure and start counting down
    pub fn enable(&self, count: u32, unit: u8) -> Result<()> {
        self.config(count, unit)?;
        let code = self.psp.run(|lib| lib.wdt_start())?;
        PspError::check("LMB_WDT_Start", code)?;
        let unit_name = if unit == BASE_MINUTE { "minutes" } else { "seconds" };
        info!("enable watchdog timer for {count} {unit_name}");
        Ok(())
    }

    /// Reload the countdown
    pub fn reset(&self) -> Result<()> {
        let code = self.psp.run(|lib| lib.wdt_tick())?;
        PspError::check("LMB_WDT_Tick", code)?;
        debug!("reset watchdog timer");
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        let code = self.psp.run(|lib| lib.wdt_stop())?;
        PspError::check("LMB_WDT_Stop", code)?;
        info!("disable watchdog timer");
        Ok(())
    }
}
