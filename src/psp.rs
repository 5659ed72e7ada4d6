//! Native library handle and Init/DeInit sessions
//!
//! Every wrapper call runs inside one session: `LMB_DLL_Init`, the vendor
//! call(s), then `LMB_DLL_DeInit`. [`Psp::run`] is the usual entry point;
//! [`Psp::session`] hands out the guard directly when a caller needs to keep
//! the library open across several steps.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::{close_ign_port, LmbApi};
use crate::config::PspConfig;
use crate::native::NativeLmb;
use crate::utils::is_root;
use crate::{psp_exc_msg, PspError, Result, ERR_BOARD_NOT_MATCH, ERR_BUSY_IN_USES, ERR_NOT_EXIST, ERR_SUCCESS};

const INIT_HINT: &str =
    "\nplease confirm the API libraries is matched this platform or the lmbiodrv driver was loaded";

/// Shared handle to the vendor library
#[derive(Clone)]
pub struct Psp {
    api: Arc<dyn LmbApi>,
}

impl std::fmt::Debug for Psp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psp").finish_non_exhaustive()
    }
}

impl Psp {
    /// Load the vendor libraries named in `config`. Requires root.
    pub fn open(config: &PspConfig) -> Result<Self> {
        if !is_root() {
            return Err(PspError::PermissionDenied("Please uses root user !!!".to_string()));
        }
        let native = NativeLmb::load(&config.lmb_io_path, &config.lmb_api_path)?;
        Ok(Self::with_api(Arc::new(native)))
    }

    pub fn with_api(api: Arc<dyn LmbApi>) -> Self {
        Self { api }
    }

    pub fn session(&self) -> Result<Session<'_>> {
        Session::open(self.api.as_ref())
    }

    /// Run `f` inside one Init/DeInit session
    pub fn run<T>(&self, f: impl FnOnce(&dyn LmbApi) -> Result<T>) -> Result<T> {
        let session = self.session()?;
        let out = f(session.lib());
        let closed = session.close();
        match (out, closed) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(v), Ok(())) => Ok(v),
        }
    }

    /// [`Psp::run`], then release the ignition MCU's UART in the same session
    pub fn run_io<T>(&self, f: impl FnOnce(&dyn LmbApi) -> Result<T>) -> Result<T> {
        self.run(|lib| {
            let out = f(lib)?;
            close_ign_port(lib)?;
            Ok(out)
        })
    }
}

/// An initialized library; de-initializes on close or drop
pub struct Session<'a> {
    api: &'a dyn LmbApi,
    open: bool,
}

impl<'a> Session<'a> {
    fn open(api: &'a dyn LmbApi) -> Result<Self> {
        let code = api.dll_init()?;
        if code == ERR_SUCCESS {
            debug!("LMB_DLL_Init OK");
            return Ok(Self { api, open: true });
        }
        let msg = psp_exc_msg("LMB_DLL_Init", code) + INIT_HINT;
        error!("{}", msg);
        Err(match code {
            ERR_NOT_EXIST => PspError::NotExist(msg),
            ERR_BOARD_NOT_MATCH => PspError::BoardNotMatch(msg),
            _ => PspError::General(msg),
        })
    }

    pub fn lib(&self) -> &'a dyn LmbApi {
        self.api
    }

    pub fn close(mut self) -> Result<()> {
        self.open = false;
        deinit(self.api)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = deinit(self.api) {
                warn!("{}", e);
            }
        }
    }
}

fn deinit(api: &dyn LmbApi) -> Result<()> {
    let code = api.dll_deinit()?;
    let msg = psp_exc_msg("LMB_DLL_DeInit", code);
    match code {
        ERR_SUCCESS => Ok(()),
        ERR_BUSY_IN_USES => Err(PspError::BusyInUses(msg)),
        _ => Err(PspError::General(msg)),
    }
}
