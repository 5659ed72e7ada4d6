//! Test utilities and mock helpers
//!
//! Builders for `MockLmbApi` values with the Init/DeInit session and the
//! DLL version record already wired up, so each test only states the
//! vendor calls it cares about.

use std::os::raw::c_char;
use std::sync::Arc;

use crate::api::MockLmbApi;
use crate::ffi::{DllVersionRaw, DLL_VERSION_ID_SIZE};
use crate::psp::Psp;

pub fn psp_from(mock: MockLmbApi) -> Psp {
    Psp::with_api(Arc::new(mock))
}

/// Mock accepting any number of successful Init/DeInit calls
pub fn mock_with_session() -> MockLmbApi {
    let mut mock = MockLmbApi::new();
    mock.expect_dll_init().returning(|| Ok(0));
    mock.expect_dll_deinit().returning(|| Ok(0));
    mock
}

/// Version record `{major}.{minor}.2` for `platform`, board library 1.0.2
pub fn raw_version(platform: &str, major: u16, minor: u16) -> DllVersionRaw {
    let mut raw = DllVersionRaw {
        dll_major: major,
        dll_minor: minor,
        dll_build: 2,
        board_major: 1,
        board_minor: 0,
        board_build: 2,
        ..Default::default()
    };
    for (dst, src) in raw
        .platform_id
        .iter_mut()
        .zip(platform.bytes().take(DLL_VERSION_ID_SIZE - 1))
    {
        *dst = src as c_char;
    }
    raw
}

/// Session mock that reports `platform` running PSP `major.minor`
pub fn mock_on_platform(platform: &str, major: u16, minor: u16) -> MockLmbApi {
    let mut mock = mock_with_session();
    let platform = platform.to_string();
    mock.expect_dll_version().returning(move |v| {
        *v = raw_version(&platform, major, minor);
        Ok(0)
    });
    mock
}

pub fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("utf-8 output")
}
