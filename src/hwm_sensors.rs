//! Hardware monitor sensor id tables
//!
//! Sensor ids are positions in a vendor enum whose layout changed twice:
//! PSP 2.3 added CPU 3/4, PCH and DIMM temperatures, and PSP 3.0 inserted
//! `HWMID_VOLT_P1V8` after `HWMID_VOLT_P1V05`.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

/// Which id layout the loaded library uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorTable {
    Legacy,
    V23,
    V30,
}

impl SensorTable {
    /// Pick the layout from the PSP/SDK version
    pub fn for_version(major: u16, minor: u16) -> Self {
        match (major, minor) {
            (3, _) => SensorTable::V30,
            (2, 3) => SensorTable::V23,
            _ => SensorTable::Legacy,
        }
    }

    pub fn names(self) -> &'static [String] {
        match self {
            SensorTable::Legacy => &LEGACY,
            SensorTable::V23 => &V23,
            SensorTable::V30 => &V30,
        }
    }

    /// `HWMID_TOTAL` of the layout
    pub fn total(self) -> u32 {
        self.names().len() as u32
    }

    pub fn name(self, sid: u32) -> Option<&'static str> {
        self.names().get(sid as usize).map(String::as_str)
    }

    pub fn sid(self, name: &str) -> Option<u32> {
        self.names().iter().position(|n| n == name).map(|p| p as u32)
    }
}

/// Physical quantity of a sensor, derived from its id name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Status,
    Temperature,
    Voltage,
    Current,
    Power,
    Fan,
}

impl SensorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        if upper.contains("STATUS") {
            Some(SensorKind::Status)
        } else if upper.contains("CURRENT") {
            Some(SensorKind::Current)
        } else if upper.contains("POWER") {
            Some(SensorKind::Power)
        } else if upper.contains("TEMP") {
            Some(SensorKind::Temperature)
        } else if upper.contains("VOLT") || upper.contains("VCORE") {
            Some(SensorKind::Voltage)
        } else if upper.contains("RPM") || upper.contains("FAN") {
            Some(SensorKind::Fan)
        } else {
            None
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Status => "",
            SensorKind::Temperature => "C",
            SensorKind::Voltage => "V",
            SensorKind::Current => "A",
            SensorKind::Power => "W",
            SensorKind::Fan => "rpm",
        }
    }
}

/// Human readable name for a sensor id name, e.g. `CPU 1 temperature`
pub fn display_name(name: &str) -> Option<&'static str> {
    DISPLAY_NAMES.get(name).copied()
}

const DIMM_SLOTS: [&str; 16] = [
    "A0", "A1", "B0", "B1", "C0", "C1", "D0", "D1", "E0", "E1", "F0", "F1", "G0", "G1", "H0", "H1",
];

const PSU_FIELDS: [(&str, &str); 11] = [
    ("STATUS", "status"),
    ("VOLTIN", "Vin"),
    ("VOLTOUT", "Vout"),
    ("CURRENTIN", "Iin"),
    ("CURRENTOUT", "Iout"),
    ("POWERIN", "Pin"),
    ("POWEROUT", "Pout"),
    ("FAN1", "fan 1 speed"),
    ("FAN2", "fan 2 speed"),
    ("TEMP1", "temperature 1"),
    ("TEMP2", "temperature 2"),
];

const RAILS: [(&str, &str); 6] = [
    ("P12V", "12V"),
    ("P5V", "5V"),
    ("P3V3", "3.3V"),
    ("P5VSB", "Standby 5V"),
    ("P3V3SB", "Standby 3.3V"),
    ("VBAT", "Battery"),
];

/// Collects `(id name, display name)` pairs in enum order
#[derive(Default)]
struct Layout {
    entries: Vec<(String, String)>,
}

impl Layout {
    fn push(&mut self, name: String, display: String) {
        self.entries.push((name, display));
    }

    fn per_cpu(&mut self, cpus: u32, name: &str, display: &str) {
        for n in 1..=cpus {
            self.push(format!("HWMID_{name}{n}"), format!("CPU {n} {display}"));
        }
    }

    fn temperatures(&mut self, cpus: u32, systems: u32) {
        self.per_cpu(cpus, "TEMP_CPU", "temperature");
        for n in 1..=systems {
            self.push(format!("HWMID_TEMP_SYS{n}"), format!("SYS {n} temperature"));
        }
    }

    fn dimms(&mut self) {
        for cpu in 1..=2 {
            for slot in DIMM_SLOTS {
                self.push(
                    format!("HWMID_TEMP_DIMMP{cpu}{slot}"),
                    format!("CPU {cpu} DIMM {slot} temperature"),
                );
            }
        }
    }

    fn rails_and_ddr(&mut self) {
        for (id, display) in RAILS {
            self.push(format!("HWMID_VOLT_{id}"), display.to_string());
        }
        for n in 1..=8 {
            self.push(format!("HWMID_VOLT_DDRCH{n}"), format!("DDR channel {n}"));
        }
        self.push("HWMID_VOLT_PVNN".into(), "VNN".into());
        self.push("HWMID_VOLT_P1V05".into(), "1.05V".into());
    }

    fn vccio_vccsa(&mut self, cpus: u32) {
        self.per_cpu(cpus, "VOLT_PVCCIO_CPU", "VCCIO");
        self.per_cpu(cpus, "VOLT_PVCCSA_CPU", "VCCSA");
    }

    fn fans_and_psus(&mut self) {
        for n in 1..=2 {
            self.push(format!("HWMID_RPM_FanCpu{n}"), format!("CPU {n} fan speed"));
        }
        for n in 1..=2 {
            self.push(format!("HWMID_RPM_FanSys{n}"), format!("SYS {n} fan speed"));
        }
        for n in 1..=10 {
            for ab in ["A", "B"] {
                self.push(format!("HWMID_RPM_Fan{n}{ab}"), format!("Fan {n}{ab} speed"));
            }
        }
        for psu in 1..=2 {
            for (id, display) in PSU_FIELDS {
                self.push(format!("HWMID_PSU{psu}_{id}"), format!("PSU {psu} {display}"));
            }
        }
    }

    fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }
}

fn legacy_layout() -> Layout {
    let mut l = Layout::default();
    l.temperatures(2, 2);
    l.per_cpu(2, "VCORE_CPU", "Vcore");
    l.rails_and_ddr();
    l.vccio_vccsa(2);
    l.fans_and_psus();
    l
}

fn extended_layout(with_p1v8: bool) -> Layout {
    let mut l = Layout::default();
    l.temperatures(4, 4);
    l.push("HWMID_TEMP_PCH".into(), "PCH temperature".into());
    l.dimms();
    l.per_cpu(4, "VCORE_CPU", "Vcore");
    l.rails_and_ddr();
    if with_p1v8 {
        l.push("HWMID_VOLT_P1V8".into(), "1.8V".into());
    }
    l.vccio_vccsa(4);
    l.fans_and_psus();
    l
}

lazy_static! {
    static ref LEGACY: Vec<String> = legacy_layout().names();
    static ref V23: Vec<String> = extended_layout(false).names();
    static ref V30: Vec<String> = extended_layout(true).names();
    static ref DISPLAY_NAMES: HashMap<String, &'static str> = {
        let mut map = HashMap::new();
        for (name, display) in extended_layout(true).entries {
            map.insert(name, &*Box::leak(display.into_boxed_str()));
        }
        map.insert("HWMID_VOLT_VCCGT".to_string(), "VCC GT");
        map
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_totals() {
        assert_eq!(SensorTable::Legacy.total(), 72);
        assert_eq!(SensorTable::V23.total(), 115);
        assert_eq!(SensorTable::V30.total(), 116);
    }

    #[test]
    fn test_v23_positions() {
        let t = SensorTable::V23;
        assert_eq!(t.sid("HWMID_TEMP_SYS1"), Some(4));
        assert_eq!(t.sid("HWMID_TEMP_DIMMP1A0"), Some(9));
        assert_eq!(t.sid("HWMID_VCORE_CPU1"), Some(41));
        assert_eq!(t.sid("HWMID_VOLT_P12V"), Some(45));
        assert_eq!(t.sid("HWMID_VOLT_VBAT"), Some(50));
        assert_eq!(t.sid("HWMID_VOLT_DDRCH1"), Some(51));
        assert_eq!(t.sid("HWMID_RPM_Fan1A"), Some(73));
        assert_eq!(t.name(114), Some("HWMID_PSU2_TEMP2"));
        assert_eq!(t.sid("HWMID_VOLT_P1V8"), None);
    }

    #[test]
    fn test_v30_inserts_p1v8() {
        let t = SensorTable::V30;
        assert_eq!(t.sid("HWMID_VOLT_P1V05"), Some(60));
        assert_eq!(t.sid("HWMID_VOLT_P1V8"), Some(61));
        assert_eq!(t.sid("HWMID_VOLT_PVCCIO_CPU1"), Some(62));
        assert_eq!(t.sid("HWMID_RPM_Fan1A"), Some(74));
    }

    #[test]
    fn test_legacy_positions() {
        let t = SensorTable::Legacy;
        assert_eq!(t.sid("HWMID_TEMP_SYS1"), Some(2));
        assert_eq!(t.sid("HWMID_VCORE_CPU1"), Some(4));
        assert_eq!(t.sid("HWMID_VOLT_P12V"), Some(6));
        assert_eq!(t.sid("HWMID_VOLT_DDRCH1"), Some(12));
        assert_eq!(t.sid("HWMID_VOLT_P1V05"), Some(21));
        assert_eq!(t.sid("HWMID_RPM_FanCpu1"), Some(26));
        assert_eq!(t.sid("HWMID_RPM_Fan1A"), Some(30));
        assert_eq!(t.sid("HWMID_PSU1_STATUS"), Some(50));
        assert_eq!(t.sid("HWMID_PSU2_STATUS"), Some(61));
        assert_eq!(t.name(72), None);
    }

    #[test]
    fn test_version_selection() {
        assert_eq!(SensorTable::for_version(2, 1), SensorTable::Legacy);
        assert_eq!(SensorTable::for_version(2, 2), SensorTable::Legacy);
        assert_eq!(SensorTable::for_version(2, 3), SensorTable::V23);
        assert_eq!(SensorTable::for_version(3, 0), SensorTable::V30);
        assert_eq!(SensorTable::for_version(1, 9), SensorTable::Legacy);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name("HWMID_TEMP_CPU1"), Some("CPU 1 temperature"));
        assert_eq!(display_name("HWMID_TEMP_DIMMP2H1"), Some("CPU 2 DIMM H1 temperature"));
        assert_eq!(display_name("HWMID_VOLT_P5VSB"), Some("Standby 5V"));
        assert_eq!(display_name("HWMID_VOLT_PVCCSA_CPU3"), Some("CPU 3 VCCSA"));
        assert_eq!(display_name("HWMID_RPM_FanSys2"), Some("SYS 2 fan speed"));
        assert_eq!(display_name("HWMID_RPM_Fan10B"), Some("Fan 10B speed"));
        assert_eq!(display_name("HWMID_PSU2_CURRENTOUT"), Some("PSU 2 Iout"));
        assert_eq!(display_name("HWMID_VOLT_VCCGT"), Some("VCC GT"));
        assert_eq!(display_name("HWMID_UNKNOWN"), None);
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(SensorKind::from_name("HWMID_PSU1_STATUS"), Some(SensorKind::Status));
        assert_eq!(SensorKind::from_name("HWMID_TEMP_PCH"), Some(SensorKind::Temperature));
        assert_eq!(SensorKind::from_name("HWMID_PSU1_TEMP2"), Some(SensorKind::Temperature));
        assert_eq!(SensorKind::from_name("HWMID_VCORE_CPU2"), Some(SensorKind::Voltage));
        assert_eq!(SensorKind::from_name("HWMID_PSU2_VOLTIN"), Some(SensorKind::Voltage));
        assert_eq!(SensorKind::from_name("HWMID_PSU1_CURRENTIN"), Some(SensorKind::Current));
        assert_eq!(SensorKind::from_name("HWMID_PSU1_POWEROUT"), Some(SensorKind::Power));
        assert_eq!(SensorKind::from_name("HWMID_RPM_Fan3A"), Some(SensorKind::Fan));
        assert_eq!(SensorKind::from_name("HWMID_PSU1_FAN1"), Some(SensorKind::Fan));
        assert_eq!(SensorKind::from_name("HWMID_XYZ"), None);
    }
}
