//! Primitive palette and the drawn circle.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{Primitive, ShapeId, Transform};

use crate::error::EditError;
use crate::state::registry::{Geometry, MeshRegistry, Shape};
use crate::state::settings::EditorSettings;

/// Shapes offered by the primitive palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cylinder,
    Cone,
    Circle,
    Ring,
}

impl PrimitiveKind {
    /// Palette geometry for this kind
    pub fn primitive(self) -> Primitive {
        match self {
            PrimitiveKind::Cube => Primitive::unit_box(),
            PrimitiveKind::Sphere => Primitive::Sphere {
                radius: 0.7,
                width_segments: 32,
                height_segments: 32,
            },
            PrimitiveKind::Cylinder => Primitive::Cylinder {
                radius_top: 0.5,
                radius_bottom: 0.5,
                height: 1.0,
                radial_segments: 32,
            },
            PrimitiveKind::Cone => Primitive::Cone {
                radius: 0.5,
                height: 1.0,
                radial_segments: 32,
            },
            PrimitiveKind::Circle => Primitive::Torus {
                radius: 0.5,
                tube: 0.05,
                radial_segments: 32,
                tubular_segments: 128,
            },
            PrimitiveKind::Ring => Primitive::Ring {
                inner_radius: 0.3,
                outer_radius: 0.6,
                theta_segments: 128,
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PrimitiveKind::Cube => "Cube",
            PrimitiveKind::Sphere => "Sphere",
            PrimitiveKind::Cylinder => "Cylinder",
            PrimitiveKind::Cone => "Cone",
            PrimitiveKind::Circle => "Circle",
            PrimitiveKind::Ring => "Ring",
        }
    }
}

/// Scatter position in `[-1,1] x {0.5} x [-1,1]` taken from the random
/// bytes of a uuid v4 id
fn scatter_position(id: &str) -> [f64; 3] {
    let bytes = uuid::Uuid::parse_str(id)
        .map(|u| *u.as_bytes())
        .unwrap_or_default();
    let unit = |hi: u8, lo: u8| f64::from(u16::from_be_bytes([hi, lo])) / f64::from(u16::MAX);
    [
        unit(bytes[0], bytes[1]) * 2.0 - 1.0,
        0.5,
        unit(bytes[10], bytes[11]) * 2.0 - 1.0,
    ]
}

/// Add a palette primitive at `position`, or at a random spot near the origin
pub fn add_primitive(
    registry: &mut MeshRegistry,
    kind: PrimitiveKind,
    position: Option<Vec3>,
    settings: &EditorSettings,
) -> Result<ShapeId, EditError> {
    let mut shape = Shape::new(
        kind.display_name(),
        Geometry::Primitive(kind.primitive()),
        Transform::new(),
        settings.colors.default_color,
    );
    shape.transform.position = match position {
        Some(p) => p.as_dvec3().to_array(),
        None => scatter_position(&shape.id),
    };
    tracing::info!("add {} at {:?}", shape.name, shape.transform.position);
    registry.add(shape)
}

/// Torus for the circle-draw gesture; `lying_flat` turns it onto the ground plane
pub fn circle_shape(center: Vec3, radius: f32, lying_flat: bool, settings: &EditorSettings) -> Shape {
    let shaping = &settings.shaping;
    let mut transform = Transform::at(center.as_dvec3().to_array());
    if lying_flat {
        transform.rotation = [std::f64::consts::FRAC_PI_2, 0.0, 0.0];
    }
    Shape::new(
        "Circle",
        Geometry::Primitive(Primitive::Torus {
            radius: radius as f64,
            tube: shaping.circle_tube as f64,
            radial_segments: shaping.circle_radial_segments,
            tubular_segments: shaping.circle_tubular_segments,
        }),
        transform,
        settings.colors.default_color,
    )
}
