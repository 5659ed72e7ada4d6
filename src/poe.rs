//! Power over Ethernet port power
//!
//! On vehicle boards the PoE switches sit behind the ignition MCU, whose
//! UART is released after every call.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::dll::{Dll, DllVersion};
use crate::platform;
use crate::psp::Psp;
use crate::utils::{bits_to_pins, mask_width};
use crate::{PspError, Result};

const ALL_PORTS: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoeInfo {
    pub number_of_poe_ports: u32,
    /// Port number (from 1) to powered state
    pub power_status: BTreeMap<u32, bool>,
}

pub struct Poe {
    psp: Psp,
    version: DllVersion,
    num: u32,
}

impl Poe {
    pub fn new(psp: &Psp, num: u32, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::POE.check(&version.platform_id)?;
        }
        let count = Self::supported_ports_count(psp)?;
        if !(1..=count).contains(&num) {
            return Err(PspError::invalid(format!(
                "'num' can only be set to (1~{count}) on this platform"
            )));
        }
        Ok(Self { psp: psp.clone(), version, num })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    /// Number of LAN ports with PoE
    pub fn supported_ports_count(psp: &Psp) -> Result<u32> {
        let mut ports = 0u32;
        let code = psp
            .run_io(|lib| lib.poe_query_devices(&mut ports))
            .map_err(|e| match e {
                PspError::SymbolNotFound(_) => PspError::not_support("Not supported on this platform"),
                e => e,
            })?;
        PspError::check("LMB_POE_QueryDevices", code)?;
        debug!("PoE ports = 0x{:08X}", ports);
        Ok(mask_width(ports))
    }

    /// Power state of every PoE port
    pub fn get_info(psp: &Psp) -> Result<PoeInfo> {
        let count = Self::supported_ports_count(psp)?;
        let mut status = 0u32;
        let code = psp.run_io(|lib| lib.ign_get_poe_power(ALL_PORTS, &mut status))?;
        PspError::check("LMB_IGN_GetPoePower", code)?;
        let power_status = bits_to_pins(status, count)
            .into_iter()
            .zip(1..)
            .map(|(on, port)| (port, on))
            .collect();
        Ok(PoeInfo { number_of_poe_ports: count, power_status })
    }

    /// Power on by auto detection
    pub fn enable(&self) -> Result<()> {
        let code = self.psp.run_io(|lib| lib.poe_set_port_power(self.num, 1))?;
        PspError::check("LMB_POE_SetPortPower", code)?;
        debug!("LAN{} port power on by auto", self.num);
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        let code = self.psp.run_io(|lib| lib.poe_set_port_power(self.num, 0))?;
        PspError::check("LMB_POE_SetPortPower", code)?;
        debug!("LAN{} port power off", self.num);
        Ok(())
    }

    pub fn get_power_status(&self) -> Result<bool> {
        let mut status = 0u32;
        let code = self.psp.run_io(|lib| lib.poe_get_port_status(self.num, &mut status))?;
        PspError::check("LMB_POE_GetPortStatus", code)?;
        Ok(status != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockLmbApi;
    use crate::test_utils::{mock_on_platform, psp_from};

    fn six_port_board() -> MockLmbApi {
        let mut mock = mock_on_platform("V6S", 2, 1);
        mock.expect_poe_query_devices().returning(|p| {
            *p = 0b11_1111;
            Ok(0)
        });
        mock.expect_ign_close_port().returning(|| Ok(0));
        mock
    }

    #[test]
    fn test_num_range() {
        let psp = psp_from(six_port_board());
        assert_eq!(Poe::supported_ports_count(&psp).unwrap(), 6);
        let err = Poe::new(&psp, 7, true).err().unwrap();
        assert_eq!(err.to_string(), "'num' can only be set to (1~6) on this platform");
        assert!(Poe::new(&psp, 0, true).is_err());
        assert_eq!(Poe::new(&psp, 6, true).unwrap().num(), 6);
    }

    #[test]
    fn test_query_symbol_missing() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_poe_query_devices()
            .returning(|_| Err(PspError::SymbolNotFound("LMB_POE_QueryDevices".into())));
        let psp = psp_from(mock);
        let err = Poe::supported_ports_count(&psp).unwrap_err();
        assert!(matches!(err, PspError::NotSupport(ref m) if m == "Not supported on this platform"));
        assert!(matches!(Poe::new(&psp, 1, true), Err(PspError::NotSupport(_))));
    }

    #[test]
    fn test_get_info() {
        let mut mock = six_port_board();
        mock.expect_ign_get_poe_power()
            .withf(|mask, _| *mask == 0xFFFF_FFFF)
            .returning(|_, s| {
                *s = 0b11_1101;
                Ok(0)
            });
        let info = Poe::get_info(&psp_from(mock)).unwrap();
        assert_eq!(info.number_of_poe_ports, 6);
        assert_eq!(info.power_status.get(&1), Some(&true));
        assert_eq!(info.power_status.get(&2), Some(&false));
        assert_eq!(info.power_status.values().filter(|on| **on).count(), 5);
    }

    #[test]
    fn test_enable_disable_status() {
        let mut mock = six_port_board();
        mock.expect_poe_set_port_power()
            .withf(|num, on| *num == 3 && *on == 1)
            .times(1)
            .returning(|_, _| Ok(0));
        mock.expect_poe_set_port_power()
            .withf(|num, on| *num == 3 && *on == 0)
            .times(1)
            .returning(|_, _| Ok(-3));
        mock.expect_poe_get_port_status().returning(|_, s| {
            *s = 1;
            Ok(0)
        });
        let poe = Poe::new(&psp_from(mock), 3, false).unwrap();
        poe.enable().unwrap();
        assert!(matches!(poe.disable(), Err(PspError::NotOpened(_))));
        assert!(poe.get_power_status().unwrap());
    }
}
