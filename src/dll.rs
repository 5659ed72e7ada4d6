//! Library and board identification

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::ffi::{buf_to_string, c_chars_to_string, DllVersionRaw};
use crate::psp::Psp;
use crate::{PspError, Result};

const BIOS_ID_KEY: &[u8] = b"*LIID ";
const BIOS_ID_LEN: usize = 33 + BIOS_ID_KEY.len();
const BIOS_REGION_BASE: u64 = 0x000F_0000;
const BIOS_REGION_SIZE: usize = 0x10000;
const BIOS_ID_LEGACY_OFFSET: usize = 0xF58B;

/// PSP/SDK and board library versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DllVersion {
    pub dll_major: u16,
    pub dll_minor: u16,
    pub dll_build: u16,
    pub platform_id: String,
    pub board_major: u16,
    pub board_minor: u16,
    pub board_build: u16,
}

impl DllVersion {
    /// `(major, minor)` of the PSP/SDK library
    pub fn dll(&self) -> (u16, u16) {
        (self.dll_major, self.dll_minor)
    }
}

impl From<&DllVersionRaw> for DllVersion {
    fn from(raw: &DllVersionRaw) -> Self {
        Self {
            dll_major: raw.dll_major,
            dll_minor: raw.dll_minor,
            dll_build: raw.dll_build,
            platform_id: c_chars_to_string(&raw.platform_id),
            board_major: raw.board_major,
            board_minor: raw.board_minor,
            board_build: raw.board_build,
        }
    }
}

impl fmt::Display for DllVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PSP/SDK version: {}.{}.{}\nIODRV   version: {}.{}.{}.{}",
            self.dll_major,
            self.dll_minor,
            self.dll_build,
            self.platform_id,
            self.board_major,
            self.board_minor,
            self.board_build
        )
    }
}

pub struct Dll {
    psp: Psp,
}

impl Dll {
    pub fn new(psp: &Psp) -> Self {
        Self { psp: psp.clone() }
    }

    pub fn get_version(&self) -> Result<DllVersion> {
        let mut raw = DllVersionRaw::default();
        let code = self.psp.run(|lib| lib.dll_version(&mut raw))?;
        PspError::check("LMB_DLL_Version", code)?;
        let version = DllVersion::from(&raw);
        debug!("DLL version {}.{}.{} on {}", version.dll_major, version.dll_minor, version.dll_build, version.platform_id);
        Ok(version)
    }

    /// BIOS identification string, e.g. `LEB-7242B BIOS V1.12 "03/09/2022"`
    pub fn get_bios_id(&self) -> Result<String> {
        let mut buf = [0u8; 50];
        match self.psp.run(|lib| lib.dll_bios_id(&mut buf)) {
            Ok(code) => {
                PspError::check("LMB_DLL_BIOSID", code)?;
                Ok(buf_to_string(&buf).trim().to_string())
            }
            Err(PspError::SymbolNotFound(_)) => {
                debug!("LMB_DLL_BIOSID unavailable, reading BIOS region");
                read_bios_id_from(Path::new("/dev/mem"))
            }
            Err(e) => Err(e),
        }
    }
}

fn read_bios_id_from(mem_path: &Path) -> Result<String> {
    let mut f = File::open(mem_path).map_err(|source| PspError::FileRead {
        path: mem_path.to_path_buf(),
        source,
    })?;
    f.seek(SeekFrom::Start(BIOS_REGION_BASE))?;
    let mut region = vec![0u8; BIOS_REGION_SIZE];
    f.read_exact(&mut region)?;
    Ok(parse_bios_id(&region))
}

/// Extract the BIOS id from the 64 KiB region starting at 0xF0000
pub fn parse_bios_id(region: &[u8]) -> String {
    let start = if region.starts_with(BIOS_ID_KEY) { 0 } else { BIOS_ID_LEGACY_OFFSET };
    let end = (start + BIOS_ID_LEN).min(region.len());
    let raw = region.get(start..end).unwrap_or_default();
    let text = String::from_utf8_lossy(raw).replace("*LIID ", "");
    let text = text.trim();
    let head = match text.rfind('"') {
        Some(pos) => &text[..pos],
        None => text,
    };
    format!("{head}\"")
}
