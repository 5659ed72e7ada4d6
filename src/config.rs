//! Runtime configuration
//!
//! Values are layered: built-in defaults, then `/etc/lanner/lannerpsp.toml`
//! when it exists, then `LANNERPSP_*` environment variables
//! (`LANNERPSP_LMB_API_PATH`, `LANNERPSP_LCM_BAUD_RATE`, ...).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{PspError, Result};

pub const DEFAULT_LMB_IO_PATH: &str = "/opt/lanner/psp/bin/amd64/lib/liblmbio.so";
pub const DEFAULT_LMB_API_PATH: &str = "/opt/lanner/psp/bin/amd64/lib/liblmbapi.so";
pub const DEFAULT_LCM_PORT: &str = "/dev/ttyS1";
pub const DEFAULT_LCM_BAUD_RATE: u32 = 19200;
pub const SYSTEM_CONFIG_PATH: &str = "/etc/lanner/lannerpsp.toml";
pub const ENV_PREFIX: &str = "LANNERPSP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PspConfig {
    pub lmb_io_path: PathBuf,
    pub lmb_api_path: PathBuf,
    pub lcm_port: String,
    pub lcm_baud_rate: u32,
    /// Explicit `hwm.conf`; the standard locations are searched when unset
    #[serde(default)]
    pub hwm_conf_path: Option<PathBuf>,
}

impl Default for PspConfig {
    fn default() -> Self {
        Self {
            lmb_io_path: PathBuf::from(DEFAULT_LMB_IO_PATH),
            lmb_api_path: PathBuf::from(DEFAULT_LMB_API_PATH),
            lcm_port: DEFAULT_LCM_PORT.to_string(),
            lcm_baud_rate: DEFAULT_LCM_BAUD_RATE,
            hwm_conf_path: None,
        }
    }
}

impl PspConfig {
    /// Load from the system file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(SYSTEM_CONFIG_PATH))
    }

    /// Load using `file` in place of the system file. A missing file is not an error.
    pub fn load_from(file: &Path) -> Result<Self> {
        let file_name = file
            .to_str()
            .ok_or_else(|| PspError::config(format!("non UTF-8 path {}", file.display())))?;

        let settings = config::Config::builder()
            .set_default("lmb_io_path", DEFAULT_LMB_IO_PATH)
            .and_then(|b| b.set_default("lmb_api_path", DEFAULT_LMB_API_PATH))
            .and_then(|b| b.set_default("lcm_port", DEFAULT_LCM_PORT))
            .and_then(|b| b.set_default("lcm_baud_rate", DEFAULT_LCM_BAUD_RATE as i64))
            .map_err(|e| PspError::config(e.to_string()))?
            .add_source(config::File::new(file_name, config::FileFormat::Toml).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| PspError::config(e.to_string()))?;

        let cfg: PspConfig = settings
            .try_deserialize()
            .map_err(|e| PspError::config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lcm_port.is_empty() {
            return Err(PspError::config("lcm_port must not be empty"));
        }
        if self.lcm_baud_rate == 0 {
            return Err(PspError::config("lcm_baud_rate must be > 0"));
        }
        Ok(())
    }
}
