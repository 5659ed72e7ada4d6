//! dlopen backed implementation of [`LmbApi`]
//!
//! `liblmbio.so` is opened first with `RTLD_GLOBAL` so that `liblmbapi.so`
//! can resolve its dependencies against it. Entry points are looked up on
//! every call; boards ship different library builds and a missing symbol
//! only matters to the wrapper that needs it.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::{debug, trace};

use crate::api::{LmbApi, VoltageRail};
use crate::ffi::{
    AxisRawData, DllVersionRaw, IntrusionCallback, IpmiSensorInfo, LcmInfoRaw, LcmKeyCallback,
    WdtInfoRaw,
};
use crate::{PspError, Result};

/// Handles to the two vendor libraries
pub struct NativeLmb {
    io: *mut c_void,
    api: *mut c_void,
}

// SAFETY: the handles are only passed to dlsym/dlclose, both thread safe.
unsafe impl Send for NativeLmb {}
// SAFETY: see above; no interior state is mutated after load.
unsafe impl Sync for NativeLmb {}

fn last_dl_error() -> String {
    // SAFETY: dlerror returns either NULL or a NUL terminated string owned
    // by the loader, valid until the next dl* call on this thread.
    unsafe {
        let err = libc::dlerror();
        if err.is_null() {
            "unknown dlopen failure".to_string()
        } else {
            CStr::from_ptr(err).to_string_lossy().into_owned()
        }
    }
}

fn open_library(path: &Path, flags: c_int) -> Result<*mut c_void> {
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        PspError::LibraryLoad {
            path: path.to_path_buf(),
            reason: "path contains a NUL byte".to_string(),
        }
    })?;
    // SAFETY: c_path is a valid NUL terminated string for the duration of the call.
    let handle = unsafe { libc::dlopen(c_path.as_ptr(), flags) };
    if handle.is_null() {
        return Err(PspError::LibraryLoad {
            path: path.to_path_buf(),
            reason: last_dl_error(),
        });
    }
    debug!("Loaded {}", path.display());
    Ok(handle)
}

impl NativeLmb {
    pub fn load(io_path: &Path, api_path: &Path) -> Result<Self> {
        let io = open_library(io_path, libc::RTLD_NOW | libc::RTLD_GLOBAL)?;
        let api = match open_library(api_path, libc::RTLD_NOW) {
            Ok(handle) => handle,
            Err(e) => {
                // SAFETY: io was returned by a successful dlopen above.
                unsafe { libc::dlclose(io) };
                return Err(e);
            }
        };
        Ok(Self { io, api })
    }

    /// Look up `name` and reinterpret it as the function pointer type `F`
    fn symbol<F: Copy>(&self, name: &str) -> Result<F> {
        debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<*mut c_void>());
        let c_name = CString::new(name).map_err(|_| PspError::SymbolNotFound(name.to_string()))?;
        // SAFETY: api is a live handle and c_name is NUL terminated.
        let ptr = unsafe { libc::dlsym(self.api, c_name.as_ptr()) };
        if ptr.is_null() {
            return Err(PspError::SymbolNotFound(name.to_string()));
        }
        // SAFETY: F is always an `unsafe extern "C" fn` pointer matching the
        // vendor prototype, which has the same size as a data pointer.
        Ok(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&ptr) })
    }
}

impl Drop for NativeLmb {
    fn drop(&mut self) {
        // SAFETY: both handles came from dlopen and are closed exactly once.
        unsafe {
            libc::dlclose(self.api);
            libc::dlclose(self.io);
        }
    }
}

/// Resolve a vendor function and call it, returning the raw code
macro_rules! lmb_call {
    ($self:ident, $name:expr, fn($($ty:ty),*) $(, $arg:expr)*) => {{
        let f: unsafe extern "C" fn($($ty),*) -> c_int = $self.symbol($name)?;
        // SAFETY: the prototype matches the vendor header and every pointer
        // argument is derived from a live Rust reference or buffer.
        let code = unsafe { f($($arg),*) };
        trace!(function = $name, code, "vendor call");
        Ok(code)
    }};
}

impl LmbApi for NativeLmb {
    fn dll_init(&self) -> Result<i32> {
        lmb_call!(self, "LMB_DLL_Init", fn())
    }

    fn dll_deinit(&self) -> Result<i32> {
        lmb_call!(self, "LMB_DLL_DeInit", fn())
    }

    fn dll_version(&self, version: &mut DllVersionRaw) -> Result<i32> {
        lmb_call!(self, "LMB_DLL_Version", fn(*mut DllVersionRaw), version)
    }

    fn dll_bios_id(&self, buf: &mut [u8]) -> Result<i32> {
        lmb_call!(self, "LMB_DLL_BIOSID", fn(*mut c_char, c_int),
            buf.as_mut_ptr() as *mut c_char, buf.len() as c_int)
    }

    fn gpio_get_info(&self, group: u32, in_pins: &mut u8, out_pins: &mut u8) -> Result<i32> {
        lmb_call!(self, "LMB_GPIO_GetInfo", fn(u32, *mut u8, *mut u8), group, in_pins, out_pins)
    }

    fn gpio_gpi_read(&self, group: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_GPIO_GpiRead", fn(u32, *mut u32), group, status)
    }

    fn gpio_gpo_read(&self, group: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_GPIO_GpoRead", fn(u32, *mut u32), group, status)
    }

    fn gpio_gpo_write(&self, group: u32, status: u32) -> Result<i32> {
        lmb_call!(self, "LMB_GPIO_GpoWrite", fn(u32, u32), group, status)
    }

    fn ign_get_digital_pins(&self, out_pins: &mut u32, in_pins: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_GetDigitalPins", fn(*mut u32, *mut u32), out_pins, in_pins)
    }

    fn ign_get_digital_in(&self, mask: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_GetDigitalIn", fn(u32, *mut u32), mask, status)
    }

    fn ign_get_digital_out(&self, mask: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_GetDigitalOut", fn(u32, *mut u32), mask, status)
    }

    fn ign_set_digital_out(&self, mask: u32, status: u32) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_SetDigitalOut", fn(u32, u32), mask, status)
    }

    fn ign_get_poe_power(&self, mask: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_GetPoePower", fn(u32, *mut u32), mask, status)
    }

    fn ign_close_port(&self) -> Result<i32> {
        lmb_call!(self, "LMB_IGN_ClosePort", fn())
    }

    fn gsr_get_axis_data(&self, data: &mut AxisRawData) -> Result<i32> {
        lmb_call!(self, "LMB_GSR_GetAxisData", fn(*mut AxisRawData), data)
    }

    fn gsr_get_axis_offset(&self, data: &mut AxisRawData) -> Result<i32> {
        lmb_call!(self, "LMB_GSR_GetAxisOffset", fn(*mut AxisRawData), data)
    }

    fn hwm_get_cpu_temp(&self, num: u32, value: &mut f32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetCpuTemp", fn(u32, *mut f32), num, value)
    }

    fn hwm_get_sys_temp(&self, num: u32, value: &mut f32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSysTemp", fn(u32, *mut f32), num, value)
    }

    fn hwm_get_vcore(&self, num: u32, value: &mut f32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetVcore", fn(u32, *mut f32), num, value)
    }

    fn hwm_get_voltage(&self, rail: VoltageRail, value: &mut f32) -> Result<i32> {
        lmb_call!(self, rail.symbol(), fn(*mut f32), value)
    }

    fn hwm_get_vddr(&self, num: u32, value: &mut f32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetVDDR", fn(u32, *mut f32), num, value)
    }

    fn hwm_get_power_supply(&self, num: u32, value: &mut u16) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetPowerSupply", fn(u32, *mut u16), num, value)
    }

    fn hwm_get_cpu_fan(&self, num: u32, rpm: &mut u16) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetCpuFan", fn(u32, *mut u16), num, rpm)
    }

    fn hwm_get_sys_fan(&self, num: u32, rpm: &mut u16) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSysFan", fn(u32, *mut u16), num, rpm)
    }

    fn hwm_get_sensor_type(&self, kind: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSensorType", fn(*mut u32), kind)
    }

    fn hwm_get_sensor_name(&self, sid: u32, buf: &mut [u8]) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSensorName", fn(u32, *mut c_char), sid,
            buf.as_mut_ptr() as *mut c_char)
    }

    fn hwm_get_sensor_display(&self, sid: u32, buf: &mut [u8]) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSensorDisplay", fn(u32, *mut c_char), sid,
            buf.as_mut_ptr() as *mut c_char)
    }

    fn hwm_get_sensor_report(&self, sid: u32, buf: &mut [u8]) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSensorReport", fn(u32, *mut c_char), sid,
            buf.as_mut_ptr() as *mut c_char)
    }

    fn hwm_get_sensor_critical(&self, sid: u32, lo: &mut u32, hi: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_HWM_GetSensorCritical", fn(u32, *mut u32, *mut u32), sid, lo, hi)
    }

    fn ipmi_info_by_name(&self, name: &CStr, info: &mut IpmiSensorInfo) -> Result<i32> {
        lmb_call!(self, "LMB_IPMI_InfoByName", fn(*const c_char, *mut IpmiSensorInfo),
            name.as_ptr(), info)
    }

    fn lcm_search_port(&self, port: &mut [u8], speed: &mut i32) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_SearchPort", fn(*mut c_char, *mut i32),
            port.as_mut_ptr() as *mut c_char, speed)
    }

    fn lcm_search_port_sized(&self, port: &mut [u8], speed: &mut i32) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_SearchPort", fn(*mut c_char, *mut i32, c_int),
            port.as_mut_ptr() as *mut c_char, speed, port.len() as c_int)
    }

    fn lcm_open_port(&self, port: &CStr, speed: i32) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_OpenPort", fn(*const c_char, i32), port.as_ptr(), speed)
    }

    fn lcm_device_open(&self) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_DeviceOpen", fn())
    }

    fn lcm_device_close(&self) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_DeviceClose", fn())
    }

    fn lcm_device_info(&self, info: &mut LcmInfoRaw) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_DeviceInfo", fn(*mut LcmInfoRaw), info)
    }

    fn lcm_reset(&self) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_Reset", fn())
    }

    fn lcm_keys_status(&self, keys: &mut u8) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_KeysStatus", fn(*mut u8), keys)
    }

    fn lcm_light_ctrl(&self, on: u8) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_LightCtrl", fn(u8), on)
    }

    fn lcm_set_cursor(&self, column: u32, row: u32) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_SetCursor", fn(u32, u32), column, row)
    }

    fn lcm_write_string(&self, text: &CStr) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_WriteString", fn(*const c_char), text.as_ptr())
    }

    fn lcm_display_clear(&self) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_DisplayClear", fn())
    }

    fn lcm_keys_callback(&self, callback: Option<LcmKeyCallback>, period_ms: u32) -> Result<i32> {
        lmb_call!(self, "LMB_LCM_KeysCallback", fn(Option<LcmKeyCallback>, u32), callback, period_ms)
    }

    fn odm_get_uart_mode(&self, num: u32, mode: &mut i8) -> Result<i32> {
        lmb_call!(self, "LMB_ODM_GetUartMode", fn(u32, *mut i8), num, mode)
    }

    fn odm_term_stat(&self, num: u32, term: &mut i8) -> Result<i32> {
        lmb_call!(self, "LMB_ODM_TermStat", fn(u32, *mut i8), num, term)
    }

    fn odm_set_uart_mode(&self, num: u32, mode: i8) -> Result<i32> {
        lmb_call!(self, "LMB_ODM_SetUartMode", fn(u32, i8), num, mode)
    }

    fn odm_termination(&self, num: u32, enable: i8) -> Result<i32> {
        lmb_call!(self, "LMB_ODM_Termination", fn(u32, i8), num, enable)
    }

    fn poe_query_devices(&self, ports: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_POE_QueryDevices", fn(*mut u32), ports)
    }

    fn poe_set_port_power(&self, num: u32, enable: u32) -> Result<i32> {
        lmb_call!(self, "LMB_POE_SetPortPower", fn(u32, u32), num, enable)
    }

    fn poe_get_port_status(&self, num: u32, status: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_POE_GetPortStatus", fn(u32, *mut u32), num, status)
    }

    fn rfm_get_module(&self, value: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_RFM_GetModule", fn(*mut u32), value)
    }

    fn rfm_set_module(&self, value: u32) -> Result<i32> {
        lmb_call!(self, "LMB_RFM_SetModule", fn(u32), value)
    }

    fn rfm_get_sim(&self, value: &mut u32) -> Result<i32> {
        lmb_call!(self, "LMB_RFM_GetSIM", fn(*mut u32), value)
    }

    fn rfm_set_sim(&self, value: u32) -> Result<i32> {
        lmb_call!(self, "LMB_RFM_SetSIM", fn(u32), value)
    }

    fn sled_get_system_led(&self, status: &mut u8) -> Result<i32> {
        lmb_call!(self, "LMB_SLED_GetSystemLED", fn(*mut u8), status)
    }

    fn sled_set_system_led(&self, status: u8) -> Result<i32> {
        lmb_call!(self, "LMB_SLED_SetSystemLED", fn(u8), status)
    }

    fn sled_set_gps_led(&self, status: u8) -> Result<i32> {
        lmb_call!(self, "LMB_SLED_SetGPSLED", fn(u8), status)
    }

    fn sled_set_lte_state_led(&self, status: u8) -> Result<i32> {
        lmb_call!(self, "LMB_SLED_SetLteStateLED", fn(u8), status)
    }

    fn sled_set_lte_stress_led(&self, percent: i32) -> Result<i32> {
        lmb_call!(self, "LMB_SLED_SetLteStressLED", fn(i32), percent)
    }

    fn gps_search_port(&self, port: &mut [u8]) -> Result<i32> {
        lmb_call!(self, "LMB_GPS_SearchPort", fn(*mut c_char), port.as_mut_ptr() as *mut c_char)
    }

    fn swr_get_status(&self, status: &mut u8) -> Result<i32> {
        lmb_call!(self, "LMB_SWR_GetStatus", fn(*mut u8), status)
    }

    fn swr_intr_callback(&self, callback: Option<IntrusionCallback>, period_ms: u32) -> Result<i32> {
        lmb_call!(self, "LMB_SWR_IntrCallback", fn(Option<IntrusionCallback>, u32), callback, period_ms)
    }

    fn wdt_query_info(&self, info: &mut WdtInfoRaw) -> Result<i32> {
        lmb_call!(self, "LMB_WDT_QueryInfo", fn(*mut WdtInfoRaw), info)
    }

    fn wdt_config(&self, count: u32, unit: u8) -> Result<i32> {
        lmb_call!(self, "LMB_WDT_Config", fn(u32, u8), count, unit)
    }

    fn wdt_start(&self) -> Result<i32> {
        lmb_call!(self, "LMB_WDT_Start", fn())
    }

    fn wdt_stop(&self) -> Result<i32> {
        lmb_call!(self, "LMB_WDT_Stop", fn())
    }

    fn wdt_tick(&self) -> Result<i32> {
        lmb_call!(self, "LMB_WDT_Tick", fn())
    }
}
