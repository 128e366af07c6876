pub mod closure;
pub mod sampling;
pub mod spectrum;

pub use closure::{
    BsdfLobe, BsdfSample, Category, ClosureColor, ClosurePrimitive, ClosureRegistry, Cone,
    EmissionSample, EmissiveLobe, ParamBlock, ParamBuilder,
};
pub use spectrum::Spectrum;

use cgmath::{Point2, Vector2, Vector3};

pub type Float = f32;

pub type Point2f = Point2<Float>;
pub type Vec2f = Vector2<Float>;
pub type Vec3f = Vector3<Float>;
