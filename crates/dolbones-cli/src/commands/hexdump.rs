//! Hexdump command implementation.
//!
//! ```text
//! 80453080  00 00 00 02 00 00 00 00  c2 70 00 00 41 a0 00 00  |.........p..A...|
//! *
//! ```

use anyhow::Result;
use dolbones_core::ReadMemory;

use super::Session;
use super::hex_utils::{hexdump_lines, parse_ram_address};

/// Run the hexdump command
pub fn run(session: &Session, address: &str, size: usize) -> Result<()> {
    let address = parse_ram_address(address)?;
    let reader = session.attach()?;
    let bytes = reader.read_bytes(address, size)?;

    for line in hexdump_lines(&bytes, address) {
        println!("{}", line);
    }

    Ok(())
}
