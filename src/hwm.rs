//! Hardware monitor
//!
//! Two interfaces coexist in the vendor library: fixed getters for the
//! common sensors (`LMB_HWM_GetCpuTemp`, `LMB_HWM_Get12V`, ...) and a
//! sensor-id interface returning reports as strings in milli-units. The
//! report walks the sensor-id interface and applies `hwm.conf` overrides.

use std::ffi::CString;
use std::fmt;
use std::io::Write;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{LmbApi, VoltageRail};
use crate::dll::{Dll, DllVersion};
use crate::ffi::{
    buf_to_string, IpmiSensorInfo, HWM_TYPE_AST1400, HWM_TYPE_IPMI, HWM_TYPE_SIO,
    HWM_TYPE_SMBUS,
};
use crate::hwm_conf::HwmConf;
use crate::hwm_sensors::{display_name, SensorKind, SensorTable};
use crate::psp::Psp;
use crate::utils::red;
use crate::{PspError, Result, ERR_NOT_SUPPORT, ERR_SUCCESS};

const ALARM: &str = "\x1b[1;31mALARM\x1b[m";
const REPORT_HEADER: &str = "Sensor Name        Value          LowCritical      UpperCritical   Result";
const REPORT_RULE_WIDTH: usize = 73;

/// Raw critical values the library uses for "no bound"
const NA_BOUNDS: [f64; 2] = [99999.0, 999999.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HwmType {
    None,
    SuperIo,
    Ipmi,
    SmBus,
    Ast1400,
}

impl HwmType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            HWM_TYPE_SIO => HwmType::SuperIo,
            HWM_TYPE_IPMI => HwmType::Ipmi,
            HWM_TYPE_SMBUS => HwmType::SmBus,
            HWM_TYPE_AST1400 => HwmType::Ast1400,
            _ => HwmType::None,
        }
    }
}

impl fmt::Display for HwmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HwmType::None => "None",
            HwmType::SuperIo => "SuperIO",
            HwmType::Ipmi => "IPMI",
            HwmType::SmBus => "SMBus",
            HwmType::Ast1400 => "AST-1400",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HwmSensor {
    pub sid: u32,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub sensor: HwmSensor,
    pub kind: SensorKind,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SensorReading {
    pub fn is_alarm(&self) -> bool {
        self.min.is_some_and(|min| self.value < min) || self.max.is_some_and(|max| self.value > max)
    }

    fn format_value(&self, v: f64) -> String {
        match self.kind {
            SensorKind::Temperature => format!("{:7}", v.trunc() as i64),
            SensorKind::Fan | SensorKind::Status => format!("{:5}", v as i64),
            _ => format!("{v:7.3}"),
        }
    }

    /// One line of the report, e.g.
    /// `12V              =  12.150 V\t(min =  10.800 V, max =  13.200 V)`
    pub fn row(&self) -> String {
        let unit = self.kind.unit();
        let bound = |b: Option<f64>| match b {
            Some(v) => format!("{} {unit}", self.format_value(v)),
            None => format!("--N/A-- {unit}"),
        };
        let mut row = format!(
            "{:<16} = {} {unit}\t(min = {}, max = {})",
            self.sensor.display_name,
            self.format_value(self.value),
            bound(self.min),
            bound(self.max)
        );
        if self.is_alarm() {
            row.push(' ');
            row.push_str(ALARM);
        }
        row
    }
}

pub struct Hwm {
    psp: Psp,
    version: DllVersion,
    table: SensorTable,
}

impl Hwm {
    pub fn new(psp: &Psp) -> Result<Self> {
        let version = Dll::new(psp).get_version()?;
        let (major, minor) = version.dll();
        let table = SensorTable::for_version(major, minor);
        debug!("hwm sensor table {:?} for PSP {}.{}", table, major, minor);
        Ok(Self { psp: psp.clone(), version, table })
    }

    pub fn version(&self) -> &DllVersion {
        &self.version
    }

    pub fn table(&self) -> SensorTable {
        self.table
    }

    fn read_f32(
        &self,
        func: &str,
        f: impl FnOnce(&dyn LmbApi, &mut f32) -> Result<i32>,
    ) -> Result<f32> {
        let mut value = 0f32;
        let code = self.psp.run(|lib| f(lib, &mut value))?;
        PspError::check(func, code)?;
        Ok(value)
    }

    fn read_u16(
        &self,
        func: &str,
        f: impl FnOnce(&dyn LmbApi, &mut u16) -> Result<i32>,
    ) -> Result<u16> {
        let mut value = 0u16;
        let code = self.psp.run(|lib| f(lib, &mut value))?;
        PspError::check(func, code)?;
        Ok(value)
    }

    pub fn cpu_temp(&self, num: u32) -> Result<f32> {
        self.read_f32("LMB_HWM_GetCpuTemp", |lib, v| lib.hwm_get_cpu_temp(num, v))
    }

    pub fn sys_temp(&self, num: u32) -> Result<f32> {
        self.read_f32("LMB_HWM_GetSysTemp", |lib, v| lib.hwm_get_sys_temp(num, v))
    }

    pub fn vcore(&self, num: u32) -> Result<f32> {
        self.read_f32("LMB_HWM_GetVcore", |lib, v| lib.hwm_get_vcore(num, v))
    }

    pub fn voltage(&self, rail: VoltageRail) -> Result<f32> {
        self.read_f32(rail.symbol(), |lib, v| lib.hwm_get_voltage(rail, v))
    }

    pub fn v12(&self) -> Result<f32> {
        self.voltage(VoltageRail::P12V)
    }

    pub fn v5(&self) -> Result<f32> {
        self.voltage(VoltageRail::P5V)
    }

    pub fn v3v3(&self) -> Result<f32> {
        self.voltage(VoltageRail::P3V3)
    }

    pub fn v5sb(&self) -> Result<f32> {
        self.voltage(VoltageRail::P5Vsb)
    }

    pub fn v3v3sb(&self) -> Result<f32> {
        self.voltage(VoltageRail::P3V3sb)
    }

    pub fn vbat(&self) -> Result<f32> {
        self.voltage(VoltageRail::Vbat)
    }

    pub fn vddr(&self, num: u32) -> Result<f32> {
        self.read_f32("LMB_HWM_GetVDDR", |lib, v| lib.hwm_get_vddr(num, v))
    }

    pub fn power_supply(&self, num: u32) -> Result<u16> {
        self.read_u16("LMB_HWM_GetPowerSupply", |lib, v| lib.hwm_get_power_supply(num, v))
    }

    pub fn cpu_fan(&self, num: u32) -> Result<u16> {
        self.read_u16("LMB_HWM_GetCpuFan", |lib, v| lib.hwm_get_cpu_fan(num, v))
    }

    pub fn sys_fan(&self, num: u32) -> Result<u16> {
        self.read_u16("LMB_HWM_GetSysFan", |lib, v| lib.hwm_get_sys_fan(num, v))
    }

    pub fn sensor_type(&self) -> Result<HwmType> {
        self.psp.run(read_type)
    }

    pub fn list_supported_sensors(&self) -> Result<Vec<HwmSensor>> {
        self.psp.run(|lib| {
            let mut sensors = Vec::new();
            for sid in 0..self.table.total() {
                let mut report = [0u8; 64];
                if lib.hwm_get_sensor_report(sid, &mut report)? == ERR_NOT_SUPPORT {
                    continue;
                }
                sensors.push(describe(lib, self.table, sid)?);
            }
            Ok(sensors)
        })
    }

    /// Current value and critical bounds of one sensor
    pub fn read_sensor(&self, sid: u32, conf: &HwmConf) -> Result<SensorReading> {
        self.psp.run(|lib| {
            let hwm_type = read_type(lib)?;
            read_in(lib, self.table, hwm_type, sid, conf)?
                .ok_or_else(|| PspError::not_support(format!("sensor id {sid} is not supported")))
        })
    }

    /// Print every supported sensor with its bounds, flagging alarms
    pub fn report(&self, conf: &HwmConf, out: &mut dyn Write) -> Result<()> {
        if let Some(path) = conf.path() {
            writeln!(
                out,
                "\x1b[1;31m<Note> found {} file, critical value will change !!!\x1b[m",
                path.display()
            )?;
        }
        self.psp.run(|lib| {
            let hwm_type = read_type(lib)?;
            if hwm_type == HwmType::None {
                writeln!(out, "\x1b[1;31m<Warning> Hardware Monitor Type is Unknown !!!\x1b[m")?;
                return Err(PspError::not_support("Hardware Monitor Type is Unknown"));
            }
            writeln!(out, "\x1b[1;34m===> Hardware Monitor Type is {hwm_type} <===\x1b[m")?;
            writeln!(out, "{REPORT_HEADER}")?;
            writeln!(out, "{}", "-".repeat(REPORT_RULE_WIDTH))?;

            for sid in 0..self.table.total() {
                match read_in(lib, self.table, hwm_type, sid, conf) {
                    Ok(Some(reading)) if reading.kind != SensorKind::Status => {
                        writeln!(out, "{}", reading.row())?;
                    }
                    Ok(_) => {}
                    Err(e @ PspError::SymbolNotFound(_)) => return Err(e),
                    Err(e) => writeln!(out, "{}", red(&e.to_string()))?,
                }
            }
            Ok(())
        })
    }
}

fn read_type(lib: &dyn LmbApi) -> Result<HwmType> {
    let mut raw = 0u32;
    PspError::check("LMB_HWM_GetSensorType", lib.hwm_get_sensor_type(&mut raw)?)?;
    Ok(HwmType::from_raw(raw))
}

/// Resolve id and display names, preferring what the library reports
fn describe(lib: &dyn LmbApi, table: SensorTable, sid: u32) -> Result<HwmSensor> {
    let mut buf = [0u8; 32];
    let name = match lib.hwm_get_sensor_name(sid, &mut buf)? {
        ERR_SUCCESS if buf[0] != 0 => buf_to_string(&buf),
        _ => table
            .name(sid)
            .map(str::to_string)
            .ok_or_else(|| PspError::invalid(format!("sensor id {sid} is out of range")))?,
    };

    let mut buf = [0u8; 32];
    let display_name = match lib.hwm_get_sensor_display(sid, &mut buf) {
        Ok(ERR_SUCCESS) if buf[0] != 0 => buf_to_string(&buf),
        _ => display_name(&name).map_or_else(|| name.clone(), str::to_string),
    };
    Ok(HwmSensor { sid, name, display_name })
}

/// `None` when the sensor is absent on this board
fn read_in(
    lib: &dyn LmbApi,
    table: SensorTable,
    hwm_type: HwmType,
    sid: u32,
    conf: &HwmConf,
) -> Result<Option<SensorReading>> {
    let mut report = [0u8; 64];
    let code = lib.hwm_get_sensor_report(sid, &mut report)?;
    if code == ERR_NOT_SUPPORT {
        return Ok(None);
    }
    PspError::check("LMB_HWM_GetSensorReport", code)?;

    let sensor = describe(lib, table, sid)?;
    let kind = SensorKind::from_name(&sensor.name)
        .ok_or_else(|| PspError::general(format!("unknown sensor kind for {}", sensor.name)))?;
    let raw = atoi(&buf_to_string(&report));
    let value = match kind {
        SensorKind::Fan | SensorKind::Status => raw as f64,
        _ => raw as f64 / 1000.0,
    };

    let (min, max) = match conf.bounds(&sensor.name)? {
        Some(b) => (b.min.filter(|v| !is_na(*v)), b.max.filter(|v| !is_na(*v))),
        None => vendor_bounds(lib, hwm_type, &sensor, kind)?,
    };
    Ok(Some(SensorReading { sensor, kind, value, min, max }))
}

fn vendor_bounds(
    lib: &dyn LmbApi,
    hwm_type: HwmType,
    sensor: &HwmSensor,
    kind: SensorKind,
) -> Result<(Option<f64>, Option<f64>)> {
    if hwm_type == HwmType::Ipmi {
        let name = CString::new(sensor.display_name.as_str())
            .map_err(|_| PspError::invalid(format!("bad sensor name {:?}", sensor.display_name)))?;
        let mut info = IpmiSensorInfo::default();
        let code = lib.ipmi_info_by_name(&name, &mut info)?;
        if code != ERR_SUCCESS {
            warn!("no IPMI critical values for {}: code {}", sensor.display_name, code);
            return Ok((None, None));
        }
        let bound = |v: f32| Some(v as f64).filter(|v| !is_na(*v));
        return Ok((bound(info.lo_critical), bound(info.hi_critical)));
    }

    let (mut lo, mut hi) = (0u32, 0u32);
    let code = lib.hwm_get_sensor_critical(sensor.sid, &mut lo, &mut hi)?;
    if code != ERR_SUCCESS {
        return Ok((None, None));
    }
    let scale = |raw: u32| {
        let raw = raw as f64;
        if is_na(raw) {
            None
        } else if kind == SensorKind::Fan {
            Some(raw)
        } else {
            Some(raw / 1000.0)
        }
    };
    Ok((scale(lo), scale(hi)))
}

fn is_na(v: f64) -> bool {
    NA_BOUNDS.contains(&v)
}

/// Leading integer of a report string, clamped to i32
fn atoi(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let mut value: i64 = 0;
    for c in digits.chars().take_while(char::is_ascii_digit) {
        value = (value * 10 + c.to_digit(10).unwrap_or(0) as i64).min(i32::MAX as i64 + 1);
    }
    (sign * value).clamp(i32::MIN as i64, i32::MAX as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockLmbApi;
    use crate::ffi::string_to_buf;
    use crate::test_utils::{mock_on_platform, output, psp_from};

    const SID_CPU1: u32 = 0;
    const SID_12V: u32 = 45;
    const SID_FAN_CPU1: u32 = 69;
    const SID_PSU1_STATUS: u32 = 93;

    fn v23_board(hwm_type: u32) -> MockLmbApi {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_hwm_get_sensor_type().returning(move |t| {
            *t = hwm_type;
            Ok(0)
        });
        mock.expect_hwm_get_sensor_report().returning(|sid, buf| {
            let text = match sid {
                SID_CPU1 => "45000",
                SID_12V => "12150",
                SID_FAN_CPU1 => "3200",
                SID_PSU1_STATUS => "1",
                _ => return Ok(-5),
            };
            string_to_buf(text, buf);
            Ok(0)
        });
        mock.expect_hwm_get_sensor_name().returning(|sid, buf| {
            string_to_buf(SensorTable::V23.name(sid).unwrap_or(""), buf);
            Ok(0)
        });
        mock.expect_hwm_get_sensor_display().returning(|_, _| Ok(-5));
        mock
    }

    fn with_sio_criticals(mut mock: MockLmbApi) -> MockLmbApi {
        mock.expect_hwm_get_sensor_critical().returning(|sid, lo, hi| {
            (*lo, *hi) = match sid {
                SID_CPU1 => (99999, 90000),
                SID_12V => (10800, 13200),
                SID_FAN_CPU1 => (500, 999999),
                _ => (0, 0),
            };
            Ok(0)
        });
        mock
    }

    #[test]
    fn test_atoi() {
        assert_eq!(atoi("45000"), 45000);
        assert_eq!(atoi("  -12 C"), -12);
        assert_eq!(atoi("+7"), 7);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi("99999999999"), i32::MAX as i64);
    }

    #[test]
    fn test_table_follows_version() {
        let hwm = Hwm::new(&psp_from(mock_on_platform("V3S", 2, 1))).unwrap();
        assert_eq!(hwm.table(), SensorTable::Legacy);
        let hwm = Hwm::new(&psp_from(mock_on_platform("LEC-7230", 3, 0))).unwrap();
        assert_eq!(hwm.table(), SensorTable::V30);
    }

    #[test]
    fn test_fixed_getters() {
        let mut mock = mock_on_platform("NCA-2510", 2, 3);
        mock.expect_hwm_get_cpu_temp()
            .withf(|num, _| *num == 1)
            .returning(|_, v| {
                *v = 42.0;
                Ok(0)
            });
        mock.expect_hwm_get_voltage()
            .withf(|rail, _| *rail == VoltageRail::P5Vsb)
            .returning(|_, v| {
                *v = 5.04;
                Ok(0)
            });
        mock.expect_hwm_get_sys_fan().returning(|_, v| {
            *v = 2400;
            Ok(0)
        });
        mock.expect_hwm_get_vddr().returning(|_, _| Ok(-5));
        let hwm = Hwm::new(&psp_from(mock)).unwrap();

        assert_eq!(hwm.cpu_temp(1).unwrap(), 42.0);
        assert_eq!(hwm.v5sb().unwrap(), 5.04);
        assert_eq!(hwm.sys_fan(2).unwrap(), 2400);
        let err = hwm.vddr(1).unwrap_err();
        assert!(err.is_not_support());
        assert!(err.to_string().starts_with("LMB_HWM_GetVDDR return code"));
    }

    #[test]
    fn test_sensor_type() {
        let hwm = Hwm::new(&psp_from(v23_board(HWM_TYPE_AST1400))).unwrap();
        assert_eq!(hwm.sensor_type().unwrap(), HwmType::Ast1400);
        assert_eq!(HwmType::Ast1400.to_string(), "AST-1400");
        assert_eq!(HwmType::from_raw(9), HwmType::None);
    }

    #[test]
    fn test_list_supported_sensors() {
        let hwm = Hwm::new(&psp_from(v23_board(HWM_TYPE_SIO))).unwrap();
        let sensors = hwm.list_supported_sensors().unwrap();
        let sids: Vec<u32> = sensors.iter().map(|s| s.sid).collect();
        assert_eq!(sids, vec![SID_CPU1, SID_12V, SID_FAN_CPU1, SID_PSU1_STATUS]);
        assert_eq!(sensors[0].name, "HWMID_TEMP_CPU1");
        assert_eq!(sensors[0].display_name, "CPU 1 temperature");
        assert_eq!(sensors[2].display_name, "CPU 1 fan speed");
    }

    #[test]
    fn test_read_sensor_vendor_bounds() {
        let hwm = Hwm::new(&psp_from(with_sio_criticals(v23_board(HWM_TYPE_SIO)))).unwrap();
        let conf = HwmConf::empty();

        let temp = hwm.read_sensor(SID_CPU1, &conf).unwrap();
        assert_eq!(temp.kind, SensorKind::Temperature);
        assert_eq!(temp.value, 45.0);
        assert_eq!((temp.min, temp.max), (None, Some(90.0)));
        assert!(!temp.is_alarm());

        let fan = hwm.read_sensor(SID_FAN_CPU1, &conf).unwrap();
        assert_eq!(fan.value, 3200.0);
        assert_eq!((fan.min, fan.max), (Some(500.0), None));

        assert!(hwm.read_sensor(3, &conf).unwrap_err().is_not_support());
    }

    #[test]
    fn test_read_sensor_ipmi_bounds() {
        let mut mock = v23_board(HWM_TYPE_IPMI);
        mock.expect_ipmi_info_by_name()
            .withf(|name, _| name.to_str() == Ok("12V"))
            .returning(|_, info| {
                info.lo_critical = 11.0;
                info.hi_critical = 12.0;
                Ok(0)
            });
        let hwm = Hwm::new(&psp_from(mock)).unwrap();

        let volt = hwm.read_sensor(SID_12V, &HwmConf::empty()).unwrap();
        assert_eq!((volt.min, volt.max), (Some(11.0), Some(12.0)));
        assert!(volt.is_alarm());
    }

    #[test]
    fn test_rows() {
        let reading = |name: &str, display: &str, kind, value, min, max| SensorReading {
            sensor: HwmSensor { sid: 0, name: name.into(), display_name: display.into() },
            kind,
            value,
            min,
            max,
        };
        assert_eq!(
            reading("HWMID_VOLT_P12V", "12V", SensorKind::Voltage, 12.15, Some(10.8), Some(13.2)).row(),
            "12V              =  12.150 V\t(min =  10.800 V, max =  13.200 V)"
        );
        assert_eq!(
            reading("HWMID_TEMP_CPU1", "CPU 1 temperature", SensorKind::Temperature, 45.6, None, Some(90.0))
                .row(),
            "CPU 1 temperature =      45 C\t(min = --N/A-- C, max =      90 C)"
        );
        assert_eq!(
            reading("HWMID_RPM_FanCpu1", "CPU 1 fan speed", SensorKind::Fan, 300.0, Some(500.0), None).row(),
            "CPU 1 fan speed  =   300 rpm\t(min =   500 rpm, max = --N/A-- rpm) \x1b[1;31mALARM\x1b[m"
        );
    }

    #[test]
    fn test_report_with_conf_override() {
        let hwm = Hwm::new(&psp_from(with_sio_criticals(v23_board(HWM_TYPE_SIO)))).unwrap();
        let mut file = tempfile::Builder::new().suffix(".conf").tempfile().unwrap();
        file.write_all(b"[HWMID_VOLT_P12V]\nmin = 12*0.9\nmax = 12\n").unwrap();
        let conf = HwmConf::load(file.path()).unwrap();

        let mut buf = Vec::new();
        hwm.report(&conf, &mut buf).unwrap();
        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("critical value will change"));
        assert_eq!(lines[1], "\x1b[1;34m===> Hardware Monitor Type is SuperIO <===\x1b[m");
        assert_eq!(lines[2], REPORT_HEADER);
        assert_eq!(lines[3].len(), 73);
        assert_eq!(
            lines[5],
            "12V              =  12.150 V\t(min =  10.800 V, max =  12.000 V) \x1b[1;31mALARM\x1b[m"
        );
        assert_eq!(lines.len(), 7);
        assert!(!text.contains("PSU 1 status"));
    }

    #[test]
    fn test_report_unknown_type() {
        let hwm = Hwm::new(&psp_from(v23_board(0))).unwrap();
        let mut buf = Vec::new();
        let err = hwm.report(&HwmConf::empty(), &mut buf).unwrap_err();
        assert!(err.is_not_support());
        assert!(output(buf).contains("Hardware Monitor Type is Unknown"));
    }
}
