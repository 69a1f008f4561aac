use std::time::{SystemTime, UNIX_EPOCH};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene_graph::Scene;
use crate::structure::bounds::bounding_size;
use crate::structure::tree::ProjectedNode;

/// Decimal places kept for sizes and matrices in structure files.
pub const STRUCTURE_PRECISION: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One entry of a structure file.
///
/// `path` is captured from the names at export time and is the lookup key on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub type_: String,
    // Required but nullable.
    #[serde(deserialize_with = "Option::deserialize")]
    pub size: Option<Size3>,
    /// Column-major 4x4 local matrix.
    pub matrix: [f64; 16],
    pub children: Vec<ExportNode>,
}

/// Converts a projected tree into structure-file entries, depth first in source order.
pub fn to_export_nodes(scene: &Scene, tree: &[ProjectedNode], precision: u32) -> Vec<ExportNode> {
    tree.iter()
        .map(|node| convert_to_export_node(scene, node, "", precision))
        .collect()
}

fn convert_to_export_node(
    scene: &Scene,
    node: &ProjectedNode,
    parent_path: &str,
    precision: u32,
) -> ExportNode {
    let path = if parent_path.is_empty() {
        node.name.clone()
    } else {
        format!("{}/{}", parent_path, node.name)
    };

    let (size, matrix) = match scene.get_object(node.id) {
        Some(object) => (
            bounding_size(scene, node.id).map(|size| round_size(size, precision)),
            matrix_to_array(&object.transform.get_local_matrix(), precision),
        ),
        None => (None, matrix_to_array(&Mat4::IDENTITY, precision)),
    };

    let children = node
        .children
        .iter()
        .map(|child| convert_to_export_node(scene, child, &path, precision))
        .collect();

    ExportNode {
        name: node.name.clone(),
        path,
        type_: node.kind.as_str().to_string(),
        size,
        matrix,
        children,
    }
}

/// Rounds half away from zero, normalizing negative zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn round_size(size: Vec3, precision: u32) -> Size3 {
    Size3 {
        x: round_to(size.x as f64, precision),
        y: round_to(size.y as f64, precision),
        z: round_to(size.z as f64, precision),
    }
}

pub fn matrix_to_array(matrix: &Mat4, precision: u32) -> [f64; 16] {
    matrix
        .to_cols_array()
        .map(|value| round_to(value as f64, precision))
}

pub fn to_json(nodes: &[ExportNode]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(nodes)
}

/// `model-structure-YYYYMMDD-HHMMSS.json` for the given UTC time.
pub fn structure_file_name(time: SystemTime) -> String {
    let seconds = time
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let days = (seconds / 86_400) as i64;
    let second_of_day = seconds % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "model-structure-{:04}{:02}{:02}-{:02}{:02}{:02}.json",
        year,
        month,
        day,
        second_of_day / 3600,
        (second_of_day % 3600) / 60,
        second_of_day % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
