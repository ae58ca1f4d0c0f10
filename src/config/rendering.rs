use serde::{Deserialize, Serialize};

/// Which built-in mesh is uploaded at startup. Fixes the draw path for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    /// Four corners shared through an index list.
    Quad,
    /// Six vertices, two triangles, no index list.
    TrianglePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: [f32; 4],
    pub geometry: GeometryKind,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.3, 0.3, 1.0],
            geometry: GeometryKind::Quad,
        }
    }
}
