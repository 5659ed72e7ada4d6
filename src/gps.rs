//! GPS receiver port discovery

use tracing::debug;

use crate::dll::{Dll, DllVersion};
use crate::ffi::{buf_to_string, string_to_buf};
use crate::psp::Psp;
use crate::{PspError, Result};

pub const DEFAULT_GPS_PORT: &str = "/dev/ttyS1";

pub struct Gps {
    psp: Psp,
    version: DllVersion,
}

impl Gps {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        Ok(Self { psp: psp.clone(), version })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Serial device the GPS receiver is attached to
    pub fn search_port(&self) -> Result<String> {
        let mut port = [0u8; 64];
        string_to_buf(DEFAULT_GPS_PORT, &mut port);
        let code = self.psp.run(|lib| lib.gps_search_port(&mut port))?;
        PspError::check("LMB_GPS_SearchPort", code)?;
        let port = buf_to_string(&port);
        debug!("GPS port is {}", port);
        Ok(port)
    }
}
