//! The vendor call surface
//!
//! `LmbApi` lists every liblmbapi entry point the wrappers use. Each method
//! returns the raw vendor return code; `Err` is reserved for failures to
//! reach the function at all (for example a symbol missing from an older
//! board library). Out-parameters are passed as `&mut` exactly like the C
//! pointers they stand for.
//!
//! The production implementation is [`crate::native::NativeLmb`]; tests
//! substitute a mock.

use std::ffi::CStr;

use crate::ffi::{
    AxisRawData, DllVersionRaw, IntrusionCallback, IpmiSensorInfo, LcmInfoRaw, LcmKeyCallback,
    WdtInfoRaw,
};
use crate::{PspError, Result};

/// Fixed voltage rails with a dedicated getter in the legacy HWM API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoltageRail {
    P12V,
    P5V,
    P3V3,
    P5Vsb,
    P3V3sb,
    Vbat,
}

impl VoltageRail {
    pub const ALL: [VoltageRail; 6] = [
        VoltageRail::P12V,
        VoltageRail::P5V,
        VoltageRail::P3V3,
        VoltageRail::P5Vsb,
        VoltageRail::P3V3sb,
        VoltageRail::Vbat,
    ];

    /// Vendor function reading this rail
    pub const fn symbol(self) -> &'static str {
        match self {
            VoltageRail::P12V => "LMB_HWM_Get12V",
            VoltageRail::P5V => "LMB_HWM_Get5V",
            VoltageRail::P3V3 => "LMB_HWM_Get3V3",
            VoltageRail::P5Vsb => "LMB_HWM_Get5Vsb",
            VoltageRail::P3V3sb => "LMB_HWM_Get3V3sb",
            VoltageRail::Vbat => "LMB_HWM_GetVbat",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            VoltageRail::P12V => "12V",
            VoltageRail::P5V => "5V",
            VoltageRail::P3V3 => "3.3V",
            VoltageRail::P5Vsb => "5VSB",
            VoltageRail::P3V3sb => "3.3VSB",
            VoltageRail::Vbat => "Vbat",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait LmbApi: Send + Sync {
    // DLL
    fn dll_init(&self) -> Result<i32>;
    fn dll_deinit(&self) -> Result<i32>;
    fn dll_version(&self, version: &mut DllVersionRaw) -> Result<i32>;
    fn dll_bios_id(&self, buf: &mut [u8]) -> Result<i32>;

    // GPIO
    fn gpio_get_info(&self, group: u32, in_pins: &mut u8, out_pins: &mut u8) -> Result<i32>;
    fn gpio_gpi_read(&self, group: u32, status: &mut u32) -> Result<i32>;
    fn gpio_gpo_read(&self, group: u32, status: &mut u32) -> Result<i32>;
    fn gpio_gpo_write(&self, group: u32, status: u32) -> Result<i32>;

    // Ignition MCU
    fn ign_get_digital_pins(&self, out_pins: &mut u32, in_pins: &mut u32) -> Result<i32>;
    fn ign_get_digital_in(&self, mask: u32, status: &mut u32) -> Result<i32>;
    fn ign_get_digital_out(&self, mask: u32, status: &mut u32) -> Result<i32>;
    fn ign_set_digital_out(&self, mask: u32, status: u32) -> Result<i32>;
    fn ign_get_poe_power(&self, mask: u32, status: &mut u32) -> Result<i32>;
    fn ign_close_port(&self) -> Result<i32>;

    // G-sensor
    fn gsr_get_axis_data(&self, data: &mut AxisRawData) -> Result<i32>;
    fn gsr_get_axis_offset(&self, data: &mut AxisRawData) -> Result<i32>;

    // Hardware monitor
    fn hwm_get_cpu_temp(&self, num: u32, value: &mut f32) -> Result<i32>;
    fn hwm_get_sys_temp(&self, num: u32, value: &mut f32) -> Result<i32>;
    fn hwm_get_vcore(&self, num: u32, value: &mut f32) -> Result<i32>;
    fn hwm_get_voltage(&self, rail: VoltageRail, value: &mut f32) -> Result<i32>;
    fn hwm_get_vddr(&self, num: u32, value: &mut f32) -> Result<i32>;
    fn hwm_get_power_supply(&self, num: u32, value: &mut u16) -> Result<i32>;
    fn hwm_get_cpu_fan(&self, num: u32, rpm: &mut u16) -> Result<i32>;
    fn hwm_get_sys_fan(&self, num: u32, rpm: &mut u16) -> Result<i32>;
    fn hwm_get_sensor_type(&self, kind: &mut u32) -> Result<i32>;
    fn hwm_get_sensor_name(&self, sid: u32, buf: &mut [u8]) -> Result<i32>;
    fn hwm_get_sensor_display(&self, sid: u32, buf: &mut [u8]) -> Result<i32>;
    fn hwm_get_sensor_report(&self, sid: u32, buf: &mut [u8]) -> Result<i32>;
    fn hwm_get_sensor_critical(&self, sid: u32, lo: &mut u32, hi: &mut u32) -> Result<i32>;
    fn ipmi_info_by_name(&self, name: &CStr, info: &mut IpmiSensorInfo) -> Result<i32>;

    // LCD module
    fn lcm_search_port(&self, port: &mut [u8], speed: &mut i32) -> Result<i32>;
    fn lcm_search_port_sized(&self, port: &mut [u8], speed: &mut i32) -> Result<i32>;
    fn lcm_open_port(&self, port: &CStr, speed: i32) -> Result<i32>;
    fn lcm_device_open(&self) -> Result<i32>;
    fn lcm_device_close(&self) -> Result<i32>;
    fn lcm_device_info(&self, info: &mut LcmInfoRaw) -> Result<i32>;
    fn lcm_reset(&self) -> Result<i32>;
    fn lcm_keys_status(&self, keys: &mut u8) -> Result<i32>;
    fn lcm_light_ctrl(&self, on: u8) -> Result<i32>;
    fn lcm_set_cursor(&self, column: u32, row: u32) -> Result<i32>;
    fn lcm_write_string(&self, text: &CStr) -> Result<i32>;
    fn lcm_display_clear(&self) -> Result<i32>;
    fn lcm_keys_callback(&self, callback: Option<LcmKeyCallback>, period_ms: u32) -> Result<i32>;

    // ODM UART
    fn odm_get_uart_mode(&self, num: u32, mode: &mut i8) -> Result<i32>;
    fn odm_term_stat(&self, num: u32, term: &mut i8) -> Result<i32>;
    fn odm_set_uart_mode(&self, num: u32, mode: i8) -> Result<i32>;
    fn odm_termination(&self, num: u32, enable: i8) -> Result<i32>;

    // Power over Ethernet
    fn poe_query_devices(&self, ports: &mut u32) -> Result<i32>;
    fn poe_set_port_power(&self, num: u32, enable: u32) -> Result<i32>;
    fn poe_get_port_status(&self, num: u32, status: &mut u32) -> Result<i32>;

    // Radio frequency module
    fn rfm_get_module(&self, value: &mut u32) -> Result<i32>;
    fn rfm_set_module(&self, value: u32) -> Result<i32>;
    fn rfm_get_sim(&self, value: &mut u32) -> Result<i32>;
    fn rfm_set_sim(&self, value: u32) -> Result<i32>;

    // Status LEDs
    fn sled_get_system_led(&self, status: &mut u8) -> Result<i32>;
    fn sled_set_system_led(&self, status: u8) -> Result<i32>;
    fn sled_set_gps_led(&self, status: u8) -> Result<i32>;
    fn sled_set_lte_state_led(&self, status: u8) -> Result<i32>;
    fn sled_set_lte_stress_led(&self, percent: i32) -> Result<i32>;

    // GPS
    fn gps_search_port(&self, port: &mut [u8]) -> Result<i32>;

    // Software reset button
    fn swr_get_status(&self, status: &mut u8) -> Result<i32>;
    fn swr_intr_callback(&self, callback: Option<IntrusionCallback>, period_ms: u32) -> Result<i32>;

    // Watchdog
    fn wdt_query_info(&self, info: &mut WdtInfoRaw) -> Result<i32>;
    fn wdt_config(&self, count: u32, unit: u8) -> Result<i32>;
    fn wdt_start(&self) -> Result<i32>;
    fn wdt_stop(&self) -> Result<i32>;
    fn wdt_tick(&self) -> Result<i32>;
}

/// Release the ignition MCU UART so other processes can reach it.
///
/// Boards without the MCU build their library without `LMB_IGN_ClosePort`;
/// the return code is not meaningful and is ignored.
pub fn close_ign_port(lib: &dyn LmbApi) -> Result<()> {
    match lib.ign_close_port() {
        Ok(_) | Err(PspError::SymbolNotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
