//! `hwm.conf` critical bound overrides
//!
//! INI file with one section per sensor id name:
//!
//! ```ini
//! [HWMID_VOLT_P12V]
//! min = 12*0.9
//! max = 12*1.1
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat, Value};
use tracing::debug;

use crate::{PspError, Result};

pub const DEFAULT_HWM_CONF_PATH: &str = "/opt/lanner/psp/bin/amd64/utils/hwm.conf";
pub const FALLBACK_HWM_CONF_PATH: &str = "/etc/lanner/hwm.conf";

/// Conf value marking a bound as "use the library's value"
const UNSET_BOUND: f64 = 999999.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct HwmConf {
    path: Option<PathBuf>,
    sections: HashMap<String, HashMap<String, String>>,
}

impl HwmConf {
    /// No overrides; every sensor uses the library's bounds
    pub fn empty() -> Self {
        Self::default()
    }

    /// First existing file among `explicit` and the two default locations
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain([
                PathBuf::from(DEFAULT_HWM_CONF_PATH),
                PathBuf::from(FALLBACK_HWM_CONF_PATH),
            ])
            .find(|p| p.is_file())
    }

    /// Load the located file, or an empty conf when none exists
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match Self::locate(explicit) {
            Some(path) => Self::load(&path),
            None => Ok(Self::empty()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PspError::config(format!("{} does not exist", path.display())));
        }
        let raw: HashMap<String, Value> = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| PspError::config(format!("{}: {e}", path.display())))?;

        let mut sections = HashMap::new();
        for (name, value) in raw {
            // keys outside any section come through as plain strings
            let Ok(table) = value.into_table() else {
                continue;
            };
            let mut keys = HashMap::new();
            for (key, v) in table {
                if let Ok(s) = v.into_string() {
                    keys.insert(key.to_ascii_lowercase(), s);
                }
            }
            sections.insert(name.to_ascii_uppercase(), keys);
        }
        debug!("loaded {} hwm.conf sections from {}", sections.len(), path.display());
        Ok(Self { path: Some(path.to_path_buf()), sections })
    }

    /// File the overrides came from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Override for `sensor`, or `None` when the library's bounds apply
    pub fn bounds(&self, sensor: &str) -> Result<Option<ConfBounds>> {
        let Some(keys) = self.sections.get(&sensor.to_ascii_uppercase()) else {
            return Ok(None);
        };
        let min = keys.get("min").map(|v| eval_product(v)).transpose()?;
        let max = keys.get("max").map(|v| eval_product(v)).transpose()?;
        if min == Some(UNSET_BOUND) {
            return Ok(None);
        }
        Ok(Some(ConfBounds { min, max }))
    }
}

/// Evaluate `a*b*...`, the only arithmetic the file format allows
pub fn eval_product(expr: &str) -> Result<f64> {
    expr.split('*')
        .map(|factor| {
            factor
                .trim()
                .parse::<f64>()
                .map_err(|_| PspError::config(format!("invalid bound value '{expr}'")))
        })
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn conf_file(text: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_eval_product() {
        assert_eq!(eval_product("90").unwrap(), 90.0);
        assert!((eval_product("12*0.9").unwrap() - 10.8).abs() < 1e-9);
        assert!((eval_product(" 3.3 * 1.1 ").unwrap() - 3.63).abs() < 1e-9);
        assert!(matches!(eval_product("12+1"), Err(PspError::Config(_))));
    }

    #[test]
    fn test_load_sections() {
        let file = conf_file(
            "[HWMID_VOLT_P12V]\nmin = 12*0.9\nmax = 12*1.1\n\n\
             [HWMID_TEMP_CPU1]\nmin = 999999\nmax = 90\n\n\
             [HWMID_RPM_FanCpu1]\nmin = 1000\n",
        );
        let conf = HwmConf::load(file.path()).unwrap();
        assert_eq!(conf.path(), Some(file.path()));

        let b = conf.bounds("HWMID_VOLT_P12V").unwrap().unwrap();
        assert!((b.min.unwrap() - 10.8).abs() < 1e-9);
        assert!((b.max.unwrap() - 13.2).abs() < 1e-9);

        assert_eq!(conf.bounds("HWMID_TEMP_CPU1").unwrap(), None);
        assert_eq!(
            conf.bounds("HWMID_RPM_FanCpu1").unwrap(),
            Some(ConfBounds { min: Some(1000.0), max: None })
        );
        assert_eq!(conf.bounds("HWMID_VOLT_P5V").unwrap(), None);
    }

    #[test]
    fn test_bad_value() {
        let file = conf_file("[HWMID_VOLT_P5V]\nmin = five\n");
        let conf = HwmConf::load(file.path()).unwrap();
        assert!(matches!(conf.bounds("HWMID_VOLT_P5V"), Err(PspError::Config(_))));
    }

    #[test]
    fn test_locate_prefers_explicit() {
        let file = conf_file("[HWMID_VOLT_P5V]\nmin = 4.5\n");
        assert_eq!(HwmConf::locate(Some(file.path())), Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_missing() {
        let err = HwmConf::load(Path::new("/nonexistent/hwm.conf")).unwrap_err();
        assert!(matches!(err, PspError::Config(_)));
        assert_eq!(HwmConf::empty().bounds("HWMID_VOLT_P5V").unwrap(), None);
    }
}
