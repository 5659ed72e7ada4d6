//! Status LEDs: system, GPS, LTE status and LTE signal strength

use std::io::Write;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::LmbApi;
use crate::dll::{Dll, DllVersion};
use crate::platform;
use crate::psp::Psp;
use crate::utils::{red, show_delay};
use crate::{psp_exc_msg, PspError, Result, ERR_SUCCESS};

const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Apply each `(value, label)` step, printing the label or the error and
/// counting `secs` down between steps
fn run_steps(
    psp: &Psp,
    out: &mut dyn Write,
    secs: u32,
    tick: Duration,
    func: &str,
    steps: &[(i32, &str)],
    set: impl Fn(&dyn LmbApi, i32) -> Result<i32>,
) -> Result<()> {
    if secs == 0 {
        return Err(PspError::invalid("'secs' value must be > 0"));
    }
    psp.run(|lib| {
        for (i, (value, label)) in steps.iter().enumerate() {
            let code = set(lib, *value)?;
            if code == ERR_SUCCESS {
                writeln!(out, "{label}")?;
            } else {
                writeln!(out, "{}", red(&psp_exc_msg(func, code)))?;
            }
            if i + 1 < steps.len() {
                show_delay(out, secs, tick)?;
            }
        }
        Ok(())
    })
}

/// Front panel system LED; colours depend on the board
pub struct SystemLed {
    psp: Psp,
    version: DllVersion,
    tick: Duration,
}

impl SystemLed {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        Ok(Self { psp: psp.clone(), version, tick: DEFAULT_TICK })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Length of one countdown step in [`SystemLed::test`]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// 0 off, 1 green, 2 red/amber
    pub fn get_status(&self) -> Result<u8> {
        let mut status = 0xFFu8;
        let code = self.psp.run(|lib| lib.sled_get_system_led(&mut status))?;
        PspError::check("LMB_SLED_GetSystemLED", code)?;
        Ok(status)
    }

    fn set(&self, mode: u8, label: &str) -> Result<()> {
        let code = self.psp.run(|lib| lib.sled_set_system_led(mode))?;
        PspError::check("LMB_SLED_SetSystemLED", code)?;
        if self.get_status()? == mode {
            debug!("set status led {}", label);
        } else {
            warn!("set status led failure");
        }
        Ok(())
    }

    pub fn off(&self) -> Result<()> {
        self.set(0, "off")
    }

    pub fn green(&self) -> Result<()> {
        self.set(1, "green")
    }

    pub fn red(&self) -> Result<()> {
        self.set(2, "red/amber")
    }

    pub fn test(&self, secs: u32, out: &mut dyn Write) -> Result<()> {
        run_steps(
            &self.psp,
            out,
            secs,
            self.tick,
            "LMB_SLED_SetSystemLED",
            &[(1, "set status led green"), (2, "set status led red/amber"), (0, "set status led off")],
            |lib, v| lib.sled_set_system_led(v as u8),
        )
    }
}

pub struct GpsStatusLed {
    psp: Psp,
    version: DllVersion,
    tick: Duration,
}

impl GpsStatusLed {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::GPS_LED.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version, tick: DEFAULT_TICK })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn set(&self, mode: u8, label: &str) -> Result<()> {
        let code = self.psp.run(|lib| lib.sled_set_gps_led(mode))?;
        PspError::check("LMB_SLED_SetGPSLED", code)?;
        debug!("set gps led {}", label);
        Ok(())
    }

    pub fn off(&self) -> Result<()> {
        self.set(0, "off")
    }

    pub fn on(&self) -> Result<()> {
        self.set(1, "on")
    }

    pub fn blink(&self) -> Result<()> {
        self.set(2, "blink")
    }

    pub fn test(&self, secs: u32, out: &mut dyn Write) -> Result<()> {
        run_steps(
            &self.psp,
            out,
            secs,
            self.tick,
            "LMB_SLED_SetGPSLED",
            &[(1, "set gps led on"), (2, "set gps led blink"), (0, "set gps led off")],
            |lib, v| lib.sled_set_gps_led(v as u8),
        )
    }
}

/// LTE module state LED (red, green or yellow, steady or blinking)
pub struct LteStatusLed {
    psp: Psp,
    version: DllVersion,
    tick: Duration,
}

impl LteStatusLed {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::LTE_LED.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version, tick: DEFAULT_TICK })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn off(&self) -> Result<()> {
        let code = self.psp.run(|lib| lib.sled_set_lte_state_led(0))?;
        PspError::check("LMB_SLED_SetLteStateLED", code)?;
        debug!("set lte led off");
        Ok(())
    }

    /// Clear the current colour, then show `mode`
    fn set(&self, mode: u8, label: &str) -> Result<()> {
        self.psp.run(|lib| {
            PspError::check("LMB_SLED_SetLteStateLED", lib.sled_set_lte_state_led(0)?)?;
            PspError::check("LMB_SLED_SetLteStateLED", lib.sled_set_lte_state_led(mode)?)
        })?;
        debug!("set lte led {}", label);
        Ok(())
    }

    pub fn red(&self) -> Result<()> {
        self.set(1, "red on")
    }

    pub fn red_blink(&self) -> Result<()> {
        self.set(2, "red blink")
    }

    pub fn green(&self) -> Result<()> {
        self.set(3, "green on")
    }

    pub fn green_blink(&self) -> Result<()> {
        self.set(4, "green blink")
    }

    pub fn yellow(&self) -> Result<()> {
        self.set(5, "yellow on")
    }

    pub fn yellow_blink(&self) -> Result<()> {
        self.set(6, "yellow blink")
    }

    pub fn test(&self, secs: u32, out: &mut dyn Write) -> Result<()> {
        run_steps(
            &self.psp,
            out,
            secs,
            self.tick,
            "LMB_SLED_SetLteStateLED",
            &[
                (1, "set lte led red on"),
                (2, "set lte led red blink"),
                (0, "set lte led off"),
                (3, "set lte led green on"),
                (4, "set lte led green blink"),
                (0, "set lte led off"),
                (5, "set lte led yellow on"),
                (6, "set lte led yellow blink"),
                (0, "set lte led off"),
            ],
            |lib, v| lib.sled_set_lte_state_led(v as u8),
        )
    }
}

/// LTE signal strength bar
pub struct LteStressLed {
    psp: Psp,
    version: DllVersion,
    tick: Duration,
}

impl LteStressLed {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::LTE_STRESS_LED.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version, tick: DEFAULT_TICK })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn off(&self) -> Result<()> {
        let code = self.psp.run(|lib| lib.sled_set_lte_stress_led(-1))?;
        PspError::check("LMB_SLED_SetLteStressLED", code)?;
        debug!("set lte stress led off");
        Ok(())
    }

    pub fn set_strength(&self, percent: u32) -> Result<()> {
        if percent > 100 {
            return Err(PspError::invalid("'percent' value must be between 0 and 100"));
        }
        let code = self.psp.run(|lib| lib.sled_set_lte_stress_led(percent as i32))?;
        PspError::check("LMB_SLED_SetLteStressLED", code)?;
        debug!("set lte stress led {}%", percent);
        Ok(())
    }

    pub fn test(&self, secs: u32, out: &mut dyn Write) -> Result<()> {
        run_steps(
            &self.psp,
            out,
            secs,
            self.tick,
            "LMB_SLED_SetLteStressLED",
            &[
                (90, "lte stress led show level 8"),
                (78, "lte stress led show level 7"),
                (66, "lte stress led show level 6"),
                (54, "lte stress led show level 5"),
                (42, "lte stress led show level 4"),
                (30, "lte stress led show level 3"),
                (18, "lte stress led show level 2"),
                (6, "lte stress led show level 1"),
                (-1, "set lte stress led off"),
            ],
            |lib, v| lib.sled_set_lte_stress_led(v),
        )
    }
}
