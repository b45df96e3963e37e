//! Cross-check live joint reads against the emulator's bone-transform log.
//!
//! A patched emulator logs one line per bone for a single frame:
//!
//! ```text
//! [Frame: 120] [Bone Transforms] Idx: 3 (0x8123abc0), Pos: (0.0, 1.5, -2.0), Rot: (0, 0, 0, 1)
//! ```

use std::collections::BTreeMap;
use std::io::BufRead;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::game::JObj;
use crate::memory::GuestAddr;

const POSE_LINE: &str = r"\[Frame: (-?\d+)\] \[Bone Transforms\] Idx: (\d+) \(0x([0-9a-fA-F]+)\), Pos: \(([-+.\deE ,]+)\), Rot: \(([-+.\deE ,]+)\)";

/// One logged bone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedPose {
    pub address: GuestAddr,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

/// All bones logged for one frame, keyed by bone index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoseLog {
    pub frame: Option<i64>,
    pub poses: BTreeMap<usize, LoggedPose>,
}

fn parse_floats<const N: usize>(text: &str, line_no: usize) -> Result<[f32; N]> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::PoseLog(format!("line {}: bad number in '{}': {}", line_no, text, e)))?;

    values.as_slice().try_into().map_err(|_| {
        Error::PoseLog(format!(
            "line {}: expected {} components, got {}",
            line_no,
            N,
            values.len()
        ))
    })
}

impl PoseLog {
    /// Parse a log. Lines that are not bone transforms are skipped; every
    /// bone line must belong to the same frame and name each index once.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let pattern = Regex::new(POSE_LINE).map_err(|e| Error::PoseLog(e.to_string()))?;
        let mut log = PoseLog::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let Some(caps) = pattern.captures(&line) else {
                continue;
            };

            let frame: i64 = caps[1]
                .parse()
                .map_err(|e| Error::PoseLog(format!("line {}: bad frame: {}", line_no, e)))?;
            let index: usize = caps[2]
                .parse()
                .map_err(|e| Error::PoseLog(format!("line {}: bad index: {}", line_no, e)))?;
            let address = u32::from_str_radix(&caps[3], 16)
                .map_err(|e| Error::PoseLog(format!("line {}: bad address: {}", line_no, e)))?;

            match log.frame {
                None => log.frame = Some(frame),
                Some(expected) if expected != frame => {
                    return Err(Error::PoseLog(format!(
                        "line {}: frame {} but log started at frame {}",
                        line_no, frame, expected
                    )));
                }
                Some(_) => {}
            }

            if log.poses.contains_key(&index) {
                return Err(Error::PoseLog(format!(
                    "line {}: bone {} logged twice",
                    line_no, index
                )));
            }

            log.poses.insert(
                index,
                LoggedPose {
                    address: GuestAddr::new(address),
                    position: parse_floats(&caps[4], line_no)?,
                    rotation: parse_floats(&caps[5], line_no)?,
                },
            );
        }

        debug!("Parsed {} logged bones", log.poses.len());
        Ok(log)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }
}

/// `|a - b| <= atol + rtol * |b|`, per component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub atol: f32,
    pub rtol: f32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            atol: 1e-6,
            rtol: 1e-5,
        }
    }
}

impl Tolerance {
    pub fn all_close(&self, a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b)
                .all(|(x, y)| (x - y).abs() <= self.atol + self.rtol * y.abs())
    }
}

/// Logged vs. read transform for one bone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseComparison {
    pub index: usize,
    pub logged: LoggedPose,
    pub read_position: [f32; 3],
    pub read_rotation: [f32; 4],
    pub position_delta: [f32; 3],
    pub rotation_delta: [f32; 4],
    pub position_ok: bool,
    pub rotation_ok: bool,
}

impl PoseComparison {
    pub fn passed(&self) -> bool {
        self.position_ok && self.rotation_ok
    }
}

fn delta<const N: usize>(a: [f32; N], b: [f32; N]) -> [f32; N] {
    std::array::from_fn(|i| a[i] - b[i])
}

/// Compare each logged bone with the joint read for the same bone index.
/// `jobjs[i]` is the joint of bone `i`.
pub fn compare_poses(log: &PoseLog, jobjs: &[JObj], tolerance: Tolerance) -> Result<Vec<PoseComparison>> {
    log.poses
        .iter()
        .map(|(&index, logged)| {
            let jobj = jobjs.get(index).ok_or_else(|| {
                Error::PoseLog(format!(
                    "bone {} is logged but the fighter has {} bones",
                    index,
                    jobjs.len()
                ))
            })?;

            Ok(PoseComparison {
                index,
                logged: logged.clone(),
                read_position: jobj.translate,
                read_rotation: jobj.rotate,
                position_delta: delta(logged.position, jobj.translate),
                rotation_delta: delta(logged.rotation, jobj.rotate),
                position_ok: tolerance.all_close(&logged.position, &jobj.translate),
                rotation_ok: tolerance.all_close(&logged.rotation, &jobj.rotate),
            })
        })
        .collect()
}
