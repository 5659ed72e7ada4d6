//! Radio frequency module power and SIM selection
//!
//! Both status words use bit 0 for the M.2 slot and bit 1 for the mPCIe
//! slot. Range checks on the values are left to the library.

use tracing::debug;

use crate::dll::{Dll, DllVersion};
use crate::platform;
use crate::psp::Psp;
use crate::{PspError, Result};

pub struct Rfm {
    psp: Psp,
    version: DllVersion,
}

impl Rfm {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::RFM.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Module power, 1 = powered
    pub fn get_power_status(&self) -> Result<u32> {
        let mut value = 0u32;
        let code = self.psp.run(|lib| lib.rfm_get_module(&mut value))?;
        PspError::check("LMB_RFM_GetModule", code)?;
        debug!("get module power status {:x}", value);
        Ok(value)
    }

    pub fn set_power_status(&self, value: u32) -> Result<()> {
        let code = self.psp.run(|lib| lib.rfm_set_module(value))?;
        PspError::check("LMB_RFM_SetModule", code)?;
        debug!("set module power status {}", value);
        Ok(())
    }

    /// Active SIM per slot, 0 = first SIM, 1 = second SIM
    pub fn get_sim_status(&self) -> Result<u32> {
        let mut value = 0u32;
        let code = self.psp.run(|lib| lib.rfm_get_sim(&mut value))?;
        PspError::check("LMB_RFM_GetSIM", code)?;
        debug!("get sim card status {:x}", value);
        Ok(value)
    }

    pub fn set_sim_status(&self, value: u32) -> Result<()> {
        let code = self.psp.run(|lib| lib.rfm_set_sim(value))?;
        PspError::check("LMB_RFM_SetSIM", code)?;
        debug!("set sim card status {}", value);
        Ok(())
    }
}
