//! General purpose digital I/O
//!
//! LEB-2680 routes its DI/DO pins through the ignition MCU; every other
//! board uses the GPIO group 0 calls. Status words are bit masks with bit 0
//! holding pin 0.

use serde::Serialize;
use tracing::debug;

use crate::dll::{Dll, DllVersion};
use crate::platform;
use crate::psp::Psp;
use crate::utils::{bits_to_pins, mask_width, pins_mask};
use crate::{PspError, Result};

const MCU_PLATFORMS: &[&str] = &["LEB-2680"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpioInfo {
    pub number_of_di_pins: u32,
    pub number_of_do_pins: u32,
}

pub struct Gpio {
    psp: Psp,
    version: DllVersion,
}

impl Gpio {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::GPIO.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version })
    }

    fn uses_mcu(&self) -> bool {
        MCU_PLATFORMS.contains(&self.version.platform_id.as_str())
    }

    pub fn get_info(&self) -> Result<GpioInfo> {
        if self.uses_mcu() {
            let (mut out_mask, mut in_mask) = (0u32, 0u32);
            let code = self.psp.run_io(|lib| lib.ign_get_digital_pins(&mut out_mask, &mut in_mask))?;
            PspError::check("LMB_IGN_GetDigitalPins", code)?;
            Ok(GpioInfo {
                number_of_di_pins: mask_width(in_mask),
                number_of_do_pins: mask_width(out_mask),
            })
        } else {
            let (mut in_pins, mut out_pins) = (0u8, 0u8);
            let code = self.psp.run_io(|lib| lib.gpio_get_info(0, &mut in_pins, &mut out_pins))?;
            PspError::check("LMB_GPIO_GetInfo", code)?;
            Ok(GpioInfo {
                number_of_di_pins: in_pins as u32,
                number_of_do_pins: out_pins as u32,
            })
        }
    }

    /// DI status word, bit 0 = DI_0
    pub fn get_digital_in(&self) -> Result<u32> {
        let mut status = 0u32;
        if self.uses_mcu() {
            let mask = pins_mask(self.get_info()?.number_of_di_pins);
            let code = self.psp.run_io(|lib| lib.ign_get_digital_in(mask, &mut status))?;
            PspError::check("LMB_IGN_GetDigitalIn", code)?;
        } else {
            let code = self.psp.run_io(|lib| lib.gpio_gpi_read(0, &mut status))?;
            PspError::check("LMB_GPIO_GpiRead", code)?;
        }
        debug!("read DI status: 0x{:02X}", status);
        Ok(status)
    }

    /// DO status word, bit 0 = DO_0
    pub fn get_digital_out(&self) -> Result<u32> {
        let mut status = 0u32;
        if self.uses_mcu() {
            let mask = pins_mask(self.get_info()?.number_of_do_pins);
            let code = self.psp.run_io(|lib| lib.ign_get_digital_out(mask, &mut status))?;
            PspError::check("LMB_IGN_GetDigitalOut", code)?;
        } else {
            let code = self.psp.run_io(|lib| lib.gpio_gpo_read(0, &mut status))?;
            PspError::check("LMB_GPIO_GpoRead", code)?;
        }
        debug!("read DO status: 0x{:02X}", status);
        Ok(status)
    }

    /// Drive the DO pins; `0b1010` sets DO_3 and DO_1 high
    pub fn set_digital_out(&self, status: u32) -> Result<()> {
        if self.uses_mcu() {
            let mask = pins_mask(self.get_info()?.number_of_do_pins);
            let code = self.psp.run_io(|lib| lib.ign_set_digital_out(mask, status))?;
            PspError::check("LMB_IGN_SetDigitalOut", code)?;
        } else {
            let code = self.psp.run_io(|lib| lib.gpio_gpo_write(0, status))?;
            PspError::check("LMB_GPIO_GpoWrite", code)?;
        }
        debug!("write DO status: {}", status);
        Ok(())
    }

    pub fn digital_in_pins(&self) -> Result<Vec<bool>> {
        let pins = self.get_info()?.number_of_di_pins;
        Ok(bits_to_pins(self.get_digital_in()?, pins))
    }

    pub fn digital_out_pins(&self) -> Result<Vec<bool>> {
        let pins = self.get_info()?.number_of_do_pins;
        Ok(bits_to_pins(self.get_digital_out()?, pins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_on_platform, psp_from};

    #[test]
    fn test_check_platform_rejects_leb7242() {
        let psp = psp_from(mock_on_platform("LEB-7242", 2, 1));
        assert!(matches!(Gpio::new(&psp, true), Err(PspError::NotSupport(_))));
        assert!(Gpio::new(&psp, false).is_ok());
    }

    #[test]
    fn test_gpio_group_path() {
        let mut mock = mock_on_platform("LEC-7230", 3, 0);
        mock.expect_gpio_get_info()
            .withf(|group, _, _| *group == 0)
            .returning(|_, i, o| {
                *i = 4;
                *o = 4;
                Ok(0)
            });
        mock.expect_gpio_gpi_read().returning(|_, v| {
            *v = 0b0101;
            Ok(0)
        });
        mock.expect_gpio_gpo_write()
            .withf(|group, status| *group == 0 && *status == 0b1010)
            .times(1)
            .returning(|_, _| Ok(0));
        mock.expect_ign_close_port()
            .returning(|| Err(PspError::SymbolNotFound("LMB_IGN_ClosePort".into())));
        let gpio = Gpio::new(&psp_from(mock), true).unwrap();

        assert_eq!(gpio.get_info().unwrap(), GpioInfo { number_of_di_pins: 4, number_of_do_pins: 4 });
        assert_eq!(gpio.get_digital_in().unwrap(), 0b0101);
        assert_eq!(gpio.digital_in_pins().unwrap(), vec![true, false, true, false]);
        gpio.set_digital_out(0b1010).unwrap();
    }

    #[test]
    fn test_ignition_mcu_path() {
        let mut mock = mock_on_platform("LEB-2680", 2, 3);
        mock.expect_ign_get_digital_pins().returning(|o, i| {
            *o = 0b11;
            *i = 0b1111;
            Ok(0)
        });
        mock.expect_ign_get_digital_out()
            .withf(|mask, _| *mask == 0b11)
            .returning(|_, v| {
                *v = 0b10;
                Ok(0)
            });
        mock.expect_ign_set_digital_out()
            .withf(|mask, status| *mask == 0b11 && *status == 1)
            .times(1)
            .returning(|_, _| Ok(0));
        mock.expect_ign_close_port().returning(|| Ok(0));
        let gpio = Gpio::new(&psp_from(mock), true).unwrap();

        assert_eq!(gpio.get_info().unwrap(), GpioInfo { number_of_di_pins: 4, number_of_do_pins: 2 });
        assert_eq!(gpio.get_digital_out().unwrap(), 0b10);
        assert_eq!(gpio.digital_out_pins().unwrap(), vec![false, true]);
        gpio.set_digital_out(1).unwrap();
    }

    #[test]
    fn test_not_opened_maps() {
        let mut mock = mock_on_platform("V3S", 2, 1);
        mock.expect_gpio_gpo_read().returning(|_, _| Ok(-3));
        mock.expect_ign_close_port().returning(|| Ok(0));
        let gpio = Gpio::new(&psp_from(mock), false).unwrap();
        let err = gpio.get_digital_out().unwrap_err();
        assert!(matches!(err, PspError::NotOpened(_)));
        assert!(err.to_string().starts_with("LMB_GPIO_GpoRead return code"));
    }
}
