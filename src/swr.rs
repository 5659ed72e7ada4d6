//! Software reset button

use std::fmt;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::debug;

use crate::callback::{self, EventSlot};
use crate::dll::{Dll, DllVersion};
use crate::ffi::{IntrusionCallback, IntrusionMsg};
use crate::psp::Psp;
use crate::{PspError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const POLLS_PER_SECOND: u32 = 10;
/// Polling period handed to `LMB_SWR_IntrCallback`, in milliseconds
const INTR_POLL_MS: u32 = 150;

lazy_static! {
    static ref SWR_EVENTS: EventSlot<SwrEvent> = EventSlot::new();
}

extern "C" fn on_intrusion(msg: IntrusionMsg) {
    SWR_EVENTS.publish(SwrEvent::from(msg));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwrEvent {
    pub item: u32,
    pub status: u32,
    pub time: String,
}

impl From<IntrusionMsg> for SwrEvent {
    fn from(msg: IntrusionMsg) -> Self {
        Self { item: msg.occur_item, status: msg.status, time: msg.time.to_string() }
    }
}

impl fmt::Display for SwrEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SWR Item = {:04X}, Status = {:04X}, time is {}", self.item, self.status, self.time)
    }
}

pub struct Swr {
    psp: Psp,
    version: DllVersion,
    poll: Duration,
}

impl Swr {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        Ok(Self { psp: psp.clone(), version, poll: POLL_INTERVAL })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    /// Interval between status reads while waiting
    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// 1 while the button is held
    pub fn get_status(&self) -> Result<u8> {
        let mut status = 0u8;
        let code = self.psp.run(|lib| lib.swr_get_status(&mut status))?;
        PspError::check("LMB_SWR_GetStatus", code)?;
        Ok(status)
    }

    pub fn is_pressed(&self) -> Result<bool> {
        Ok(self.get_status()? != 0)
    }

    fn wait_until(&self, pressed: bool, timeout: Option<Duration>) -> Result<bool> {
        if timeout.is_some_and(|t| t.is_zero()) {
            return Err(PspError::invalid("'timeout' value must be > 0"));
        }
        let start = Instant::now();
        loop {
            if self.is_pressed()? == pressed {
                return Ok(true);
            }
            if timeout.is_some_and(|t| start.elapsed() >= t) {
                return Ok(false);
            }
            thread::sleep(self.poll);
        }
    }

    /// Block until pressed; `false` when `timeout` ran out first
    pub fn wait_for_press(&self, timeout: Option<Duration>) -> Result<bool> {
        self.wait_until(true, timeout)
    }

    /// Block until released; `false` when `timeout` ran out first
    pub fn wait_for_release(&self, timeout: Option<Duration>) -> Result<bool> {
        self.wait_until(false, timeout)
    }

    /// Interactive check: wait up to `secs` for a press, counting down
    pub fn test(&self, secs: u32, out: &mut dyn Write) -> Result<bool> {
        if secs == 0 {
            return Err(PspError::invalid("'secs' value must be > 0"));
        }
        writeln!(out, "===> wait {secs} seconds for Software Reset Button trigger .......")?;
        let pressed = self.psp.run(|lib| {
            let mut status = 0u8;
            let mut index = secs;
            for count in 0..=secs.saturating_mul(POLLS_PER_SECOND) {
                if count % POLLS_PER_SECOND == 0 {
                    write!(out, "{index}. ")?;
                    out.flush()?;
                    index = index.saturating_sub(1);
                }
                lib.swr_get_status(&mut status)?;
                if status == 1 {
                    break;
                }
                thread::sleep(self.poll);
            }
            Ok(status == 1)
        })?;
        writeln!(out)?;
        if pressed {
            writeln!(out, "Software/Reset button pressed ! --> OK")?;
        } else {
            writeln!(out, "\x1b[1;31mSoftware/Reset button not detected ! --> ALARM\x1b[0m")?;
        }
        Ok(pressed)
    }

    /// Deliver button interrupts to `on_event` for `duration`
    pub fn watch(&self, duration: Duration, on_event: impl FnMut(SwrEvent)) -> Result<()> {
        self.psp.run(|lib| {
            callback::watch(
                &SWR_EVENTS,
                duration,
                || {
                    let code = lib.swr_intr_callback(Some(on_intrusion as IntrusionCallback), INTR_POLL_MS)?;
                    PspError::check("LMB_SWR_IntrCallback", code)?;
                    debug!("hooked software reset button callback");
                    Ok(())
                },
                || PspError::check("LMB_SWR_IntrCallback", lib.swr_intr_callback(None, INTR_POLL_MS)?),
                on_event,
            )
        })
    }
}
