//! Read command implementation.

use anyhow::Result;
use dolbones_core::{FloatArray, Layout, ReadMemory};

use super::Session;
use super::hex_utils::parse_ram_address;

/// Run the read command
pub fn run(session: &Session, address: &str, layout: &str, floats: Option<&[usize]>) -> Result<()> {
    let address = parse_ram_address(address)?;

    match floats {
        Some(shape) => {
            // fail on a bad shape before attaching
            FloatArray::element_count(shape)?;
            let reader = session.attach()?;
            let array = reader.read_float_array(address, shape)?;
            println!("{} f32{:?} @ {}", array.as_slice().len(), shape, address);
            for line in float_rows(&array) {
                println!("  {}", line);
            }
        }
        None => {
            let layout: Layout = layout.parse()?;
            let reader = session.attach()?;
            let value = reader.read_value(address, &layout)?;
            println!("{} ({} bytes) @ {}: {}", layout, layout.size(), address, value);
        }
    }
    Ok(())
}

/// One line per innermost row
fn float_rows(array: &FloatArray) -> Vec<String> {
    let width = array.shape().last().copied().unwrap_or(1).max(1);
    array
        .as_slice()
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|v| format!("{:>12.5}", v))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_rows() {
        let bytes: Vec<u8> = (0..6).flat_map(|i| (i as f32).to_be_bytes()).collect();
        let array = FloatArray::from_be_bytes(&bytes, &[2, 3]).unwrap();
        let rows = float_rows(&array);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].split_whitespace().collect::<Vec<_>>(), vec!["3.00000", "4.00000", "5.00000"]);
    }
}
