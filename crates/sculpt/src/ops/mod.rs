//! Geometry editing operations on registry shapes.

pub mod bend;
pub mod boolean;
pub mod csg;
pub mod merge;
pub mod primitives;
pub mod split;
pub mod tube;

pub use bend::bend_shape;
pub use boolean::{circular_bore, freeform_cut, SketchProfile};
pub use merge::{merge, merge_all};
pub use primitives::{add_primitive, circle_shape, PrimitiveKind};
pub use split::plane_split;
pub use tube::add_tube;
