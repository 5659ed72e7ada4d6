//! Small helpers shared by the wrappers and the CLI

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Effective uid is root
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// Binary digits of `n`, most significant first. `0` gives `[0]`.
pub fn convert_to_bit_array(n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }
    let width = 64 - n.leading_zeros();
    (0..width).rev().map(|i| ((n >> i) & 1) as u8).collect()
}

/// Number of pins described by an all-ones mask (`0b1111` -> 4)
pub fn mask_width(mask: u32) -> u32 {
    (mask as u64 + 1).ilog2()
}

/// Mask with the low `pins` bits set
pub fn pins_mask(pins: u32) -> u32 {
    if pins >= 32 {
        u32::MAX
    } else {
        (1u32 << pins) - 1
    }
}

/// Expand `status` into one flag per pin, pin 0 first
pub fn bits_to_pins(status: u32, pins: u32) -> Vec<bool> {
    (0..pins.min(32)).map(|i| status & (1 << i) != 0).collect()
}

/// Wrap `msg` in the bold red escape sequence
pub fn red(msg: &str) -> String {
    format!("\x1b[1;31m{msg}\x1b[0m")
}

/// Count down `secs` on `out`: `3. 2. 1. 0.`
pub fn show_delay(out: &mut dyn Write, secs: u32, tick: Duration) -> io::Result<()> {
    for remaining in (1..=secs).rev() {
        write!(out, "{remaining}. ")?;
        out.flush()?;
        thread::sleep(tick);
    }
    writeln!(out, "0.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_bit_array() {
        assert_eq!(convert_to_bit_array(0), vec![0]);
        assert_eq!(convert_to_bit_array(1), vec![1]);
        assert_eq!(convert_to_bit_array(6), vec![1, 1, 0]);
        assert_eq!(convert_to_bit_array(0b1001_0000), vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_masks() {
        assert_eq!(mask_width(0), 0);
        assert_eq!(mask_width(0xF), 4);
        assert_eq!(mask_width(0xFF), 8);
        assert_eq!(mask_width(u32::MAX), 32);
        assert_eq!(pins_mask(4), 0xF);
        assert_eq!(pins_mask(0), 0);
        assert_eq!(pins_mask(32), u32::MAX);
    }

    #[test]
    fn test_bits_to_pins() {
        assert_eq!(bits_to_pins(0b0101, 4), vec![true, false, true, false]);
        assert!(bits_to_pins(0xFF, 0).is_empty());
    }

    #[test]
    fn test_show_delay_output() {
        let mut out = Vec::new();
        show_delay(&mut out, 3, Duration::ZERO).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3. 2. 1. 0.\n");
    }

    #[test]
    fn test_red() {
        assert_eq!(red("x"), "\x1b[1;31mx\x1b[0m");
    }
}
