//! Shading closures: weighted compositions of elementary light-transport
//! primitives.
//!
//! A renderer registers one [`ClosurePrimitive`] per lobe type it supports
//! (lambert, microfacet, emitter, ...) in a [`ClosureRegistry`] during
//! startup. Shader evaluation then builds a [`ClosureColor`] per shading
//! point by appending weighted primitive instances with packed parameters,
//! and the integrator walks the result, dispatching eval/sample/pdf through
//! the primitive's category.

use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Vec3f};
use anyhow::Result;
use std::fmt;

pub mod args;
pub mod color;
pub mod params;
pub mod registry;

pub use args::{Arg, ArgType};
pub use color::ClosureColor;
pub use params::{ParamBlock, ParamBuilder};
pub use registry::ClosureRegistry;

/// The categories of closure primitives an integrator can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Reflective and/or transmissive.
    Bsdf,
    /// Emissive, like a light.
    Emissive,
}

/// Cone of directions a BSDF lobe is sensitive to light from, for a given
/// outgoing direction. `axis` is normalized and `angle` is in (0, 2π]; an
/// angle greater than π lets a lobe gather light from the entire sphere.
#[derive(Debug, Clone, Copy)]
pub struct Cone {
    pub axis: Vec3f,
    pub angle: Float,
}

#[derive(Debug, Clone, Copy)]
pub struct BsdfSample {
    pub omega_in: Vec3f,
    pub pdf: Float,
}

#[derive(Debug, Clone, Copy)]
pub struct EmissionSample {
    pub direction: Vec3f,
    pub pdf: Float,
}

/// Capability contract for reflective/transmissive lobes.
///
/// All directions point away from the surface. Implementations must be pure
/// with respect to the parameter block: the same block and directions always
/// produce the same result, so one lobe instance may be called from many
/// threads at once.
pub trait BsdfLobe: Send + Sync {
    /// The cone of incoming directions this lobe responds to for the given
    /// outgoing direction, or `None` for singular lobes (perfect mirrors)
    /// and for outgoing directions in the wrong hemisphere. Callers must
    /// never pre-filter by cone when this returns `None`.
    fn get_cone(&self, params: ParamBlock<'_>, omega_out: Vec3f) -> Option<Cone>;

    /// Radiance transferred between `omega_out` and `omega_in`. Only called
    /// with `omega_in` inside the cone reported by [`get_cone`]; behavior
    /// for other directions is unspecified.
    ///
    /// [`get_cone`]: BsdfLobe::get_cone
    fn eval(&self, params: ParamBlock<'_>, omega_out: Vec3f, omega_in: Vec3f) -> Spectrum;

    /// Samples an incoming direction for `omega_out` from the random pair
    /// `u` in [0, 1)². Unlike the other methods this may be called even when
    /// [`get_cone`] returned `None`, so singular lobes can pick directions
    /// from infinitesimal cones.
    ///
    /// [`get_cone`]: BsdfLobe::get_cone
    fn sample(&self, params: ParamBlock<'_>, omega_out: Vec3f, u: Point2f) -> BsdfSample;

    /// Density of [`sample`]'s distribution at `omega_in`. Must match the
    /// pdf that [`sample`] reports; since this is only called for directions
    /// inside the cone, singular lobes must not return 1 here.
    ///
    /// [`sample`]: BsdfLobe::sample
    fn pdf(&self, params: ParamBlock<'_>, omega_out: Vec3f, omega_in: Vec3f) -> Float;
}

/// Capability contract for emissive lobes.
pub trait EmissiveLobe: Send + Sync {
    /// Outgoing radiance in the (normalized, away-from-surface) direction
    /// `r`, or `None` if this instance emits nothing, letting the caller
    /// skip further work.
    fn eval(&self, params: ParamBlock<'_>, r: Vec3f) -> Option<Spectrum>;

    /// Samples an emission direction from the random pair `u` in [0, 1)².
    fn sample(&self, params: ParamBlock<'_>, u: Point2f) -> EmissionSample;

    /// Density of [`sample`]'s distribution in the direction `r`. Must match
    /// the pdf that [`sample`] reports.
    ///
    /// [`sample`]: EmissiveLobe::sample
    fn pdf(&self, params: ParamBlock<'_>, r: Vec3f) -> Float;
}

enum Capability {
    Bsdf(Box<dyn BsdfLobe>),
    Emissive(Box<dyn EmissiveLobe>),
}

/// Immutable descriptor of one closure primitive type: its unique name, the
/// packed layout of its per-instance arguments, and the lobe implementation
/// behind it. Created once at registration time and shared by every
/// [`ClosureColor`] component that references it.
pub struct ClosurePrimitive {
    name: String,
    argcodes: String,
    args: Vec<Arg>,
    argmem: usize,
    capability: Capability,
}

impl ClosurePrimitive {
    pub fn bsdf(
        name: impl Into<String>,
        argcodes: &str,
        lobe: impl BsdfLobe + 'static,
    ) -> Result<Self> {
        Self::new(name.into(), argcodes, Capability::Bsdf(Box::new(lobe)))
    }

    pub fn emissive(
        name: impl Into<String>,
        argcodes: &str,
        lobe: impl EmissiveLobe + 'static,
    ) -> Result<Self> {
        Self::new(name.into(), argcodes, Capability::Emissive(Box::new(lobe)))
    }

    fn new(name: String, argcodes: &str, capability: Capability) -> Result<Self> {
        let (args, argmem) = args::parse_argcodes(argcodes)?;
        Ok(Self {
            name,
            argcodes: argcodes.to_owned(),
            args,
            argmem,
            capability,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments this primitive expects.
    pub fn nargs(&self) -> usize {
        self.args.len()
    }

    /// The encoded argument signature, e.g. `"vff"` for (vector, float,
    /// float).
    pub fn argcodes(&self) -> &str {
        &self.argcodes
    }

    pub fn argtype(&self, i: usize) -> ArgType {
        self.args[i].ty
    }

    /// Byte offset of the i-th argument within a parameter block.
    pub fn argoffset(&self, i: usize) -> usize {
        self.args[i].offset
    }

    /// Total parameter-block size in bytes for one instance.
    pub fn argmem(&self) -> usize {
        self.argmem
    }

    pub fn category(&self) -> Category {
        match self.capability {
            Capability::Bsdf(_) => Category::Bsdf,
            Capability::Emissive(_) => Category::Emissive,
        }
    }

    /// The BSDF capability, if this primitive is in the BSDF category.
    pub fn as_bsdf(&self) -> Option<&dyn BsdfLobe> {
        match &self.capability {
            Capability::Bsdf(lobe) => Some(lobe.as_ref()),
            Capability::Emissive(_) => None,
        }
    }

    /// The emissive capability, if this primitive is in the emissive
    /// category.
    pub fn as_emissive(&self) -> Option<&dyn EmissiveLobe> {
        match &self.capability {
            Capability::Bsdf(_) => None,
            Capability::Emissive(lobe) => Some(lobe.as_ref()),
        }
    }
}

impl fmt::Debug for ClosurePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosurePrimitive")
            .field("name", &self.name)
            .field("argcodes", &self.argcodes)
            .field("category", &self.category())
            .finish()
    }
}
