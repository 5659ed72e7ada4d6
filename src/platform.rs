//! Per-feature platform lists
//!
//! The vendor library only knows which calls it implements, not which boards
//! were validated. Wrappers built with `check_platform` consult these lists.

use crate::{PspError, Result};

/// Boards a feature was validated on, and boards known to lack it
#[derive(Debug, Clone, Copy)]
pub struct PlatformSupport {
    pub feature: &'static str,
    pub supported: &'static [&'static str],
    pub unsupported: &'static [&'static str],
}

impl PlatformSupport {
    pub fn check(&self, platform_id: &str) -> Result<()> {
        if self.supported.contains(&platform_id) {
            Ok(())
        } else if self.unsupported.contains(&platform_id) {
            Err(PspError::not_support("Not supported on this platform"))
        } else {
            Err(PspError::not_implemented(format!(
                "{} has not been verified on {}",
                self.feature, platform_id
            )))
        }
    }
}

pub const GPIO: PlatformSupport = PlatformSupport {
    feature: "GPIO",
    supported: &["LEB-2680", "LEC-2290", "LEC-7230", "NCA-2510", "V3S", "V6S"],
    unsupported: &["LEB-7242"],
};

pub const GSR: PlatformSupport = PlatformSupport {
    feature: "G-sensor",
    supported: &["V3S", "V6S"],
    unsupported: &["LEB-7242", "LEC-7230", "NCA-2510"],
};

pub const POE: PlatformSupport = PlatformSupport {
    feature: "PoE",
    supported: &["LEB-2680", "LEC-2290", "V3S", "V6S"],
    unsupported: &["LEB-7242", "LEC-7230", "NCA-2510"],
};

pub const RFM: PlatformSupport = PlatformSupport {
    feature: "RF module",
    supported: &["LEB-7242"],
    unsupported: &["LEC-7230", "NCA-2510", "V3S", "V6S"],
};

pub const GPS_LED: PlatformSupport = PlatformSupport {
    feature: "GPS status LED",
    supported: &["LEB-7242"],
    unsupported: &["LEB-2680", "LEC-2290", "LEC-7230", "NCA-2510", "V3S", "V6S"],
};

pub const LTE_LED: PlatformSupport = PlatformSupport {
    feature: "LTE status LED",
    supported: &["LEB-7242"],
    unsupported: &["LEC-7230", "NCA-2510", "V3S", "V6S"],
};

pub const LTE_STRESS_LED: PlatformSupport = PlatformSupport {
    feature: "LTE stress LED",
    supported: &["LEB-7242"],
    unsupported: &["LEB-2680", "LEC-2290", "LEC-7230", "NCA-2510", "V3S", "V6S"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_outcomes() {
        assert!(GPIO.check("LEC-7230").is_ok());
        assert!(matches!(GPIO.check("LEB-7242"), Err(PspError::NotSupport(m)) if m == "Not supported on this platform"));
        assert!(matches!(GPIO.check("XYZ-0000"), Err(PspError::NotImplemented(_))));
    }

    #[test]
    fn test_lists_are_disjoint() {
        for support in [GPIO, GSR, POE, RFM, GPS_LED, LTE_LED, LTE_STRESS_LED] {
            for id in support.supported {
                assert!(!support.unsupported.contains(id), "{} lists {id} twice", support.feature);
            }
        }
    }
}
