//! Replay command implementation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use dolbones_core::{Packet, ReplayReader};

/// Run the replay command
pub fn run(path: &Path, head: Option<usize>, json: bool) -> Result<()> {
    let reader = ReplayReader::open(path)
        .with_context(|| format!("Failed to open replay {}", path.display()))?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let limit = head.unwrap_or(usize::MAX);

    for (index, packet) in reader.take(limit).enumerate() {
        let packet = packet.with_context(|| format!("Bad record #{}", index))?;
        *counts.entry(packet.name()).or_default() += 1;

        if json {
            println!("{}", serde_json::to_string(&packet)?);
        } else {
            println!("{:>7}  {}", index, describe(&packet));
        }
    }

    if !json {
        println!();
        println!("=== Totals ===");
        for (name, count) in &counts {
            println!("  {:<16} {}", name, count);
        }
    }
    Ok(())
}

fn describe(packet: &Packet) -> String {
    match packet {
        Packet::Descriptions { sizes } => {
            let table: Vec<String> = sizes
                .iter()
                .map(|s| format!("{:#04x}={}", s.command, s.size))
                .collect();
            format!("{:<16} {}", packet.name(), table.join(" "))
        }
        Packet::Command { payload, split, .. } => format!(
            "{:<16} {} bytes{}",
            packet.name(),
            payload.len(),
            if *split { " (split)" } else { "" }
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dolbones_core::replay::CommandSize;

    #[test]
    fn test_describe() {
        let descriptions = Packet::Descriptions {
            sizes: vec![CommandSize { command: 0x37, size: 63 }],
        };
        assert_eq!(describe(&descriptions), "DESCRIPTIONS     0x37=63");

        let frame = Packet::Command {
            id: 0x60,
            payload: vec![0; 0x300],
            split: true,
        };
        assert_eq!(describe(&frame), "BONES            768 bytes (split)");

        let unnamed = Packet::Command {
            id: 0x99,
            payload: vec![1, 2],
            split: false,
        };
        assert_eq!(describe(&unnamed), "0x99             2 bytes");
    }
}
