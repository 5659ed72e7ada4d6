//! G-sensor (accelerometer)

use std::io::Write;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::api::LmbApi;
use crate::dll::{Dll, DllVersion};
use crate::ffi::AxisRawData;
use crate::platform;
use crate::psp::Psp;
use crate::utils::red;
use crate::{psp_exc_msg, PspError, Result, ERR_SUCCESS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GsrData {
    pub g_range: i16,
    pub raw_x: i16,
    pub raw_y: i16,
    pub raw_z: i16,
    pub mg_x: f64,
    pub mg_y: f64,
    pub mg_z: f64,
}

impl GsrData {
    /// Scale raw counts by the reported full-scale range
    pub fn from_raw(raw: &AxisRawData) -> Result<Self> {
        let step = match raw.g_range {
            2 | 4 | 8 | 16 => raw.g_range as f64 / 255.0,
            other => return Err(PspError::general(format!("'w_g_range' = {other}"))),
        };
        Ok(Self {
            g_range: raw.g_range,
            raw_x: raw.x_axis,
            raw_y: raw.y_axis,
            raw_z: raw.z_axis,
            mg_x: raw.x_axis as f64 * step,
            mg_y: raw.y_axis as f64 * step,
            mg_z: raw.z_axis as f64 * step,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GsrOffset {
    pub raw_x: i16,
    pub raw_y: i16,
    pub raw_z: i16,
}

pub struct Gsr {
    psp: Psp,
    version: DllVersion,
    tick: Duration,
}

impl Gsr {
    pub fn new(psp: &Psp, check_platform: bool) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        if check_platform {
            platform::GSR.check(&version.platform_id)?;
        }
        Ok(Self { psp: psp.clone(), version, tick: Duration::from_millis(500) })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Pause between rounds of [`Gsr::test`]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn get_data(&self) -> Result<GsrData> {
        let mut raw = AxisRawData::default();
        let code = self.psp.run(|lib| lib.gsr_get_axis_data(&mut raw))?;
        PspError::check("LMB_GSR_GetAxisData", code)?;
        GsrData::from_raw(&raw)
    }

    pub fn get_offset(&self) -> Result<GsrOffset> {
        let mut raw = AxisRawData::default();
        let code = self.psp.run(|lib| lib.gsr_get_axis_offset(&mut raw))?;
        PspError::check("LMB_GSR_GetAxisOffset", code)?;
        Ok(GsrOffset { raw_x: raw.x_axis, raw_y: raw.y_axis, raw_z: raw.z_axis })
    }

    /// Print `rounds` samples of axis data and offsets
    pub fn test(&self, rounds: u32, out: &mut dyn Write) -> Result<()> {
        self.psp.run(|lib| {
            for i in 0..rounds {
                writeln!(out, "---------> {i}")?;
                print_round(lib, out)?;
                thread::sleep(self.tick);
            }
            Ok(())
        })
    }
}

fn print_round(lib: &dyn LmbApi, out: &mut dyn Write) -> Result<()> {
    let mut raw = AxisRawData::default();
    let code = lib.gsr_get_axis_data(&mut raw)?;
    if code != ERR_SUCCESS {
        writeln!(out, "{}", red(&psp_exc_msg("LMB_GSR_GetAxisData", code)))?;
    } else {
        writeln!(out, "stuRawData.wRange= ±{}g", raw.g_range)?;
        match GsrData::from_raw(&raw) {
            Ok(data) => {
                writeln!(out, "Raw={}\t, X-Axis= {:03.8}", data.raw_x, data.mg_x)?;
                writeln!(out, "Raw={}\t, Y-Axis= {:03.8}", data.raw_y, data.mg_y)?;
                writeln!(out, "Raw={}\t, Z-Axis= {:03.8}", data.raw_z, data.mg_z)?;
            }
            Err(e) => writeln!(out, "{}", red(&e.to_string()))?,
        }
    }

    let code = lib.gsr_get_axis_offset(&mut raw)?;
    if code != ERR_SUCCESS {
        writeln!(out, "{}", red(&psp_exc_msg("LMB_GSR_GetAxisOffset", code)))?;
    } else {
        writeln!(out, "Offset X-Axis={}", raw.x_axis)?;
        writeln!(out, "Offset Y-Axis={}", raw.y_axis)?;
        writeln!(out, "Offset Z-Axis={}", raw.z_axis)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_on_platform, output, psp_from};

    fn axis(x: i16, y: i16, z: i16, g: i16) -> AxisRawData {
        AxisRawData { x_axis: x, y_axis: y, z_axis: z, g_range: g }
    }

    #[test]
    fn test_get_data_scales_by_range() {
        let mut mock = mock_on_platform("V3S", 2, 1);
        mock.expect_gsr_get_axis_data().returning(|d| {
            *d = axis(-3, -9, -218, 2);
            Ok(0)
        });
        let gsr = Gsr::new(&psp_from(mock), true).unwrap();

        let data = gsr.get_data().unwrap();
        assert_eq!(data.g_range, 2);
        assert_eq!(data.raw_z, -218);
        assert!((data.mg_x - (-3.0 * 2.0 / 255.0)).abs() < 1e-12);
        assert!((data.mg_z - (-1.7098039215686274)).abs() < 1e-12);
    }

    #[test]
    fn test_bad_range() {
        let err = GsrData::from_raw(&axis(1, 1, 1, 3)).unwrap_err();
        assert!(matches!(err, PspError::General(_)));
        assert_eq!(err.to_string(), "'w_g_range' = 3");
    }

    #[test]
    fn test_platform_gate() {
        let psp = psp_from(mock_on_platform("NCA-2510", 2, 3));
        assert!(matches!(Gsr::new(&psp, true), Err(PspError::NotSupport(_))));
    }

    #[test]
    fn test_offset_not_support() {
        let mut mock = mock_on_platform("V6S", 2, 1);
        mock.expect_gsr_get_axis_offset().returning(|_| Ok(-5));
        let gsr = Gsr::new(&psp_from(mock), false).unwrap();
        assert!(gsr.get_offset().unwrap_err().is_not_support());
    }

    #[test]
    fn test_test_output() {
        let mut mock = mock_on_platform("V3S", 2, 1);
        mock.expect_gsr_get_axis_data().times(2).returning(|d| {
            *d = axis(-5, -9, -216, 2);
            Ok(0)
        });
        mock.expect_gsr_get_axis_offset().times(2).returning(|d| {
            *d = axis(0, 0, 0, 2);
            Ok(0)
        });
        let gsr = Gsr::new(&psp_from(mock), false).unwrap().with_tick(Duration::ZERO);

        let mut buf = Vec::new();
        gsr.test(2, &mut buf).unwrap();
        let text = output(buf);
        assert!(text.starts_with("---------> 0\nstuRawData.wRange= ±2g\nRaw=-5\t, X-Axis= -0.03921569\n"));
        assert!(text.contains("Raw=-216\t, Z-Axis= -1.69411765\n"));
        assert!(text.contains("---------> 1\n"));
        assert_eq!(text.matches("Offset Y-Axis=0\n").count(), 2);
    }
}
