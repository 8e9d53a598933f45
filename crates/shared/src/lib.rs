use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unique identifier of a live shape
pub type ShapeId = String;

/// Current version of the persisted project schema
pub const SCHEMA_VERSION: u32 = 1;

/// Default display color of new shapes (0xRRGGBB)
pub const DEFAULT_COLOR: u32 = 0x00f2ff;

/// Upper bound on any tessellation segment count
pub const MAX_SEGMENTS: u32 = 512;

/// Primitive shape kind with its shape-defining parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Box {
        width: f64,
        height: f64,
        depth: f64,
    },
    Sphere {
        radius: f64,
        width_segments: u32,
        height_segments: u32,
    },
    Cylinder {
        radius_top: f64,
        radius_bottom: f64,
        height: f64,
        radial_segments: u32,
    },
    Cone {
        radius: f64,
        height: f64,
        radial_segments: u32,
    },
    Torus {
        radius: f64,
        tube: f64,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// Flat annulus in the local XY plane
    Ring {
        inner_radius: f64,
        outer_radius: f64,
        theta_segments: u32,
    },
}

impl Primitive {
    /// Unit box, also the fallback for unknown persisted kinds
    pub fn unit_box() -> Self {
        Primitive::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    /// Kind name used in the persisted schema
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "Box",
            Primitive::Sphere { .. } => "Sphere",
            Primitive::Cylinder { .. } => "Cylinder",
            Primitive::Cone { .. } => "Cone",
            Primitive::Torus { .. } => "Torus",
            Primitive::Ring { .. } => "Ring",
        }
    }

    /// Named parameters in the persisted schema
    pub fn parameters(&self) -> BTreeMap<String, f64> {
        let pairs: Vec<(&str, f64)> = match self {
            Primitive::Box {
                width,
                height,
                depth,
            } => vec![("width", *width), ("height", *height), ("depth", *depth)],
            Primitive::Sphere {
                radius,
                width_segments,
                height_segments,
            } => vec![
                ("radius", *radius),
                ("width_segments", *width_segments as f64),
                ("height_segments", *height_segments as f64),
            ],
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => vec![
                ("radius_top", *radius_top),
                ("radius_bottom", *radius_bottom),
                ("height", *height),
                ("radial_segments", *radial_segments as f64),
            ],
            Primitive::Cone {
                radius,
                height,
                radial_segments,
            } => vec![
                ("radius", *radius),
                ("height", *height),
                ("radial_segments", *radial_segments as f64),
            ],
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => vec![
                ("radius", *radius),
                ("tube", *tube),
                ("radial_segments", *radial_segments as f64),
                ("tubular_segments", *tubular_segments as f64),
            ],
            Primitive::Ring {
                inner_radius,
                outer_radius,
                theta_segments,
            } => vec![
                ("inner_radius", *inner_radius),
                ("outer_radius", *outer_radius),
                ("theta_segments", *theta_segments as f64),
            ],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    /// Rebuild a primitive from a persisted kind and its parameters.
    ///
    /// Only the loadable whitelist {Box, Sphere, Cylinder, Cone, Torus} is
    /// recognized (legacy `*Geometry` names included). Missing parameters take
    /// the palette defaults; segment counts are capped at [`MAX_SEGMENTS`].
    pub fn from_persisted(kind: &str, params: &BTreeMap<String, f64>) -> Option<Self> {
        // Legacy documents wrote camelCase keys
        let lookup = |name: &str| {
            params
                .get(name)
                .or_else(|| params.get(&snake_to_camel(name)))
                .copied()
        };
        let get = |name: &str, default: f64| lookup(name).unwrap_or(default);
        let seg = |name: &str, default: u32| {
            lookup(name)
                .filter(|v| v.is_finite() && *v >= 1.0)
                .map(|v| v.min(MAX_SEGMENTS as f64) as u32)
                .unwrap_or(default)
        };

        match kind {
            "Box" | "BoxGeometry" => Some(Primitive::Box {
                width: get("width", 1.0),
                height: get("height", 1.0),
                depth: get("depth", 1.0),
            }),
            "Sphere" | "SphereGeometry" => Some(Primitive::Sphere {
                radius: get("radius", 0.7),
                width_segments: seg("width_segments", 32),
                height_segments: seg("height_segments", 32),
            }),
            "Cylinder" | "CylinderGeometry" => Some(Primitive::Cylinder {
                radius_top: get("radius_top", 0.5),
                radius_bottom: get("radius_bottom", 0.5),
                height: get("height", 1.0),
                radial_segments: seg("radial_segments", 32),
            }),
            "Cone" | "ConeGeometry" => Some(Primitive::Cone {
                radius: get("radius", 0.5),
                height: get("height", 1.0),
                radial_segments: seg("radial_segments", 32),
            }),
            "Torus" | "TorusGeometry" => Some(Primitive::Torus {
                radius: get("radius", 0.5),
                tube: get("tube", 0.05),
                radial_segments: seg("radial_segments", 32),
                tubular_segments: seg("tubular_segments", 128),
            }),
            _ => None,
        }
    }
}

fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Object transform: position, Euler XYZ rotation (radians), non-uniform scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Identity transform placed at `position`
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_color() -> u32 {
    DEFAULT_COLOR
}

/// One persisted shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// Geometry kind name ("Box", "Sphere", ...)
    pub kind: String,
    /// Shape-defining parameters by name
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    pub position: [f64; 3],
    /// Euler XYZ, radians
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    /// 0xRRGGBB
    #[serde(default = "default_color")]
    pub color: u32,
}

impl ShapeRecord {
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }
}

/// Persisted project: versioned list of shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Project display name
    #[serde(default)]
    pub name: String,
    pub shapes: Vec<ShapeRecord>,
}

impl ProjectFile {
    pub fn new(name: impl Into<String>, shapes: Vec<ShapeRecord>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            name: name.into(),
            shapes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_kind_and_parameters_roundtrip() {
        let prim = Primitive::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.25,
            height: 2.0,
            radial_segments: 24,
        };
        let rebuilt = Primitive::from_persisted(prim.kind(), &prim.parameters()).unwrap();
        assert_eq!(rebuilt, prim);
    }

    #[test]
    fn ring_is_not_loadable() {
        let ring = Primitive::Ring {
            inner_radius: 0.3,
            outer_radius: 0.6,
            theta_segments: 128,
        };
        assert!(Primitive::from_persisted(ring.kind(), &ring.parameters()).is_none());
    }

    #[test]
    fn legacy_geometry_names_accepted() {
        let params = BTreeMap::from([("radius".to_string(), 2.0)]);
        match Primitive::from_persisted("SphereGeometry", &params) {
            Some(Primitive::Sphere { radius, .. }) => assert_eq!(radius, 2.0),
            other => panic!("Expected sphere, got {:?}", other),
        }
    }

    #[test]
    fn legacy_camel_case_keys_accepted() {
        let params = BTreeMap::from([
            ("radiusTop".to_string(), 0.25),
            ("radiusBottom".to_string(), 0.75),
            ("radialSegments".to_string(), 12.0),
        ]);
        match Primitive::from_persisted("CylinderGeometry", &params) {
            Some(Primitive::Cylinder {
                radius_top,
                radius_bottom,
                radial_segments,
                ..
            }) => {
                assert_eq!(radius_top, 0.25);
                assert_eq!(radius_bottom, 0.75);
                assert_eq!(radial_segments, 12);
            }
            other => panic!("Expected cylinder, got {:?}", other),
        }

        let params = BTreeMap::from([("tubularSegments".to_string(), 64.0)]);
        match Primitive::from_persisted("TorusGeometry", &params) {
            Some(Primitive::Torus { tubular_segments, .. }) => assert_eq!(tubular_segments, 64),
            other => panic!("Expected torus, got {:?}", other),
        }
    }

    #[test]
    fn segment_counts_are_capped() {
        let params = BTreeMap::from([
            ("width_segments".to_string(), 70_000.0),
            ("height_segments".to_string(), f64::INFINITY),
        ]);
        match Primitive::from_persisted("Sphere", &params) {
            Some(Primitive::Sphere {
                width_segments,
                height_segments,
                ..
            }) => {
                assert_eq!(width_segments, MAX_SEGMENTS);
                assert_eq!(height_segments, 32);
            }
            other => panic!("Expected sphere, got {:?}", other),
        }
    }

    #[test]
    fn record_defaults_fill_missing_fields() {
        let json = r#"{"kind": "Box", "position": [1.0, 2.0, 3.0]}"#;
        let record: ShapeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.scale, [1.0, 1.0, 1.0]);
        assert_eq!(record.rotation, [0.0, 0.0, 0.0]);
        assert_eq!(record.color, DEFAULT_COLOR);
        assert!(record.parameters.is_empty());
    }

    #[test]
    fn project_file_missing_version_is_current() {
        let json = r#"{"shapes": []}"#;
        let project: ProjectFile = serde_json::from_str(json).unwrap();
        assert_eq!(project.version, SCHEMA_VERSION);
    }
}
