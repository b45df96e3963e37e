//! Address parsing and hexdump formatting.

use anyhow::{Context, Result};
use dolbones_core::GuestAddr;

/// Parse a guest address given in hex, with or without a 0x prefix.
pub fn parse_guest_address(s: &str) -> Result<GuestAddr> {
    s.parse()
        .with_context(|| format!("Invalid guest address '{}'", s))
}

/// Parse an address that must point into guest RAM.
pub fn parse_ram_address(s: &str) -> Result<GuestAddr> {
    let address = parse_guest_address(s)?;
    anyhow::ensure!(
        address.is_in_ram(),
        "{:#010x} is outside guest RAM (0x80000000..=0x81800000)",
        address
    );
    Ok(address)
}

/// Format bytes as `xxd`-style lines of 16, starting at guest `base`.
///
/// A run of lines identical to the one before is collapsed to a single `*`.
pub fn hexdump_lines(bytes: &[u8], base: GuestAddr) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous: Option<&[u8]> = None;
    let mut collapsed = false;

    for (i, chunk) in bytes.chunks(16).enumerate() {
        if previous == Some(chunk) {
            if !collapsed {
                lines.push("*".to_string());
                collapsed = true;
            }
            continue;
        }
        previous = Some(chunk);
        collapsed = false;

        let address = base.get().wrapping_add((i * 16) as u32);
        let mut line = format!("{:08x}  ", address);

        for half in 0..2 {
            for j in 0..8 {
                match chunk.get(half * 8 + j) {
                    Some(byte) => line.push_str(&format!("{:02x} ", byte)),
                    None => line.push_str("   "),
                }
            }
            line.push(' ');
        }

        line.push('|');
        for byte in chunk {
            if (0x20..0x7F).contains(byte) {
                line.push(*byte as char);
            } else {
                line.push('.');
            }
        }
        line.push('|');

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guest_address_with_prefix() {
        assert_eq!(parse_guest_address("0x80453080").unwrap().get(), 0x8045_3080);
        assert_eq!(parse_guest_address("0X80453080").unwrap().get(), 0x8045_3080);
    }

    #[test]
    fn test_parse_guest_address_without_prefix() {
        assert_eq!(parse_guest_address("80453080").unwrap().get(), 0x8045_3080);
        assert_eq!(parse_guest_address("DEADBEEF").unwrap().get(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_parse_guest_address_invalid() {
        assert!(parse_guest_address("GHIJK").is_err());
        assert!(parse_guest_address("0xZZZ").is_err());
        // wider than 32 bits
        assert!(parse_guest_address("0x1431B08A0").is_err());
    }

    #[test]
    fn test_parse_ram_address() {
        assert!(parse_ram_address("80000000").is_ok());
        assert!(parse_ram_address("81800000").is_ok());
        assert!(parse_ram_address("81800001").is_err());
        assert!(parse_ram_address("1234").is_err());
    }

    #[test]
    fn test_hexdump_line_format() {
        let bytes = b"Hello World\0\0\0\0\0";
        let lines = hexdump_lines(bytes, GuestAddr::new(0x8045_3080));
        assert_eq!(
            lines,
            vec![
                "80453080  48 65 6c 6c 6f 20 57 6f  72 6c 64 00 00 00 00 00  |Hello World.....|"
            ]
        );
    }

    #[test]
    fn test_hexdump_short_line_padding() {
        let lines = hexdump_lines(&[0x41, 0x42], GuestAddr::new(0x8000_0000));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("80000000  41 42 "));
        assert!(lines[0].ends_with("|AB|"));
        // same width as a full line up to the ascii column
        assert_eq!(lines[0].find('|'), Some(60));
    }

    #[test]
    fn test_hexdump_collapses_repeats() {
        let mut bytes = vec![0u8; 64];
        bytes.extend_from_slice(&[0xFF; 16]);
        let lines = hexdump_lines(&bytes, GuestAddr::new(0x8000_0000));

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("80000000  00 00"));
        assert_eq!(lines[1], "*");
        assert!(lines[2].starts_with("80000040  ff ff"));
    }
}
