use crate::closure::{ArgType, ClosurePrimitive, ParamBlock};
use crate::spectrum::Spectrum;
use crate::Float;
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, AddAssign, MulAssign};
use std::sync::Arc;
use tracing::trace;

/// One weighted primitive instance inside a closure.
#[derive(Clone)]
struct Component {
    prim: Arc<ClosurePrimitive>,
    weight: Spectrum,
    /// Byte offset of this instance's parameters in the arena. Offsets are
    /// indices, never addresses, so arena growth cannot invalidate them.
    offset: usize,
}

/// A radiance closure: an ordered linear combination of weighted closure
/// primitive instances, with all instance parameters packed into one
/// contiguous byte arena.
///
/// Built per shading point, mutated through the composition operations while
/// the shader runs, then consumed once by the integrator via the read
/// accessors and discarded. [`clear`] retains the component and arena
/// capacity, so one value can be reused across samples without reallocating
/// in the hot path.
///
/// [`clear`]: ClosureColor::clear
#[derive(Clone, Default)]
pub struct ClosureColor {
    components: SmallVec<[Component; 4]>,
    arena: Vec<u8>,
}

impl ClosureColor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.arena.clear();
    }

    /// Resets to a single component with weight (1, 1, 1).
    pub fn set(&mut self, prim: &Arc<ClosurePrimitive>, params: &[u8]) {
        self.clear();
        self.add_component(prim, Spectrum::uniform(1.0), params);
    }

    /// Appends a weighted instance of `prim`, copying `prim.argmem()` bytes
    /// of `params` into a fresh arena region. Supplying a block whose layout
    /// does not match the primitive's signature is a caller contract
    /// violation that is not detected here.
    pub fn add_component(&mut self, prim: &Arc<ClosurePrimitive>, weight: Spectrum, params: &[u8]) {
        let offset = self.arena.len();
        self.arena.extend_from_slice(&params[..prim.argmem()]);
        trace!(prim = %prim.name(), offset, "added closure component");
        self.components.push(Component {
            prim: Arc::clone(prim),
            weight,
            offset,
        });
    }

    /// `self += other`: appends all of `other`'s components with their
    /// original weights, relocating their parameter bytes into this arena.
    pub fn add(&mut self, other: &ClosureColor) {
        let base = self.arena.len();
        self.arena.extend_from_slice(&other.arena);
        self.components
            .extend(other.components.iter().map(|c| Component {
                prim: Arc::clone(&c.prim),
                weight: c.weight,
                offset: base + c.offset,
            }));
    }

    /// Pure combine: the concatenation of `a`'s components followed by
    /// `b`'s, leaving both untouched.
    pub fn sum(a: &ClosureColor, b: &ClosureColor) -> ClosureColor {
        let mut out = ClosureColor {
            components: SmallVec::new(),
            arena: Vec::with_capacity(a.arena.len() + b.arena.len()),
        };
        ClosureColor::add(&mut out, a);
        ClosureColor::add(&mut out, b);
        out
    }

    /// Scales every component's weight, uniformly (`Float`) or per channel
    /// (`Spectrum`). Parameter bytes are untouched.
    pub fn mul<W: Into<Spectrum>>(&mut self, w: W) {
        let w = w.into();
        for c in &mut self.components {
            c.weight *= w;
        }
    }

    /// Overwrites the bytes of one argument in one already-added component,
    /// using the primitive's precomputed offset and size for that argument.
    pub fn set_parameter(&mut self, component: usize, param: usize, data: &[u8]) {
        let comp = &self.components[component];
        let size = comp.prim.argtype(param).size();
        let start = comp.offset + comp.prim.argoffset(param);
        self.arena[start..start + size].copy_from_slice(&data[..size]);
    }

    /// Number of primitive components in this closure.
    pub fn ncomponents(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn weight(&self, i: usize) -> Spectrum {
        self.components[i].weight
    }

    pub fn primitive(&self, i: usize) -> &Arc<ClosurePrimitive> {
        &self.components[i].prim
    }

    /// Typed view of the i-th component's packed parameters.
    pub fn param_block(&self, i: usize) -> ParamBlock<'_> {
        let c = &self.components[i];
        ParamBlock::new(&c.prim, &self.arena[c.offset..c.offset + c.prim.argmem()])
    }

    /// Walks the components in order, as the integrator consumes them: each
    /// item is `(primitive, weight, params)`.
    pub fn components(
        &self,
    ) -> impl Iterator<Item = (&Arc<ClosurePrimitive>, Spectrum, ParamBlock<'_>)> {
        (0..self.ncomponents()).map(move |i| (self.primitive(i), self.weight(i), self.param_block(i)))
    }
}

impl AddAssign<&ClosureColor> for ClosureColor {
    fn add_assign(&mut self, rhs: &ClosureColor) {
        self.add(rhs);
    }
}

impl Add for &ClosureColor {
    type Output = ClosureColor;

    fn add(self, rhs: &ClosureColor) -> ClosureColor {
        ClosureColor::sum(self, rhs)
    }
}

impl MulAssign<Float> for ClosureColor {
    fn mul_assign(&mut self, rhs: Float) {
        self.mul(rhs);
    }
}

impl MulAssign<Spectrum> for ClosureColor {
    fn mul_assign(&mut self, rhs: Spectrum) {
        self.mul(rhs);
    }
}

impl fmt::Display for ClosureColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.ncomponents() {
            if i > 0 {
                write!(f, " + ")?;
            }
            let w = self.weight(i);
            let prim = self.primitive(i);
            write!(f, "({}, {}, {}) * {} (", w[0], w[1], w[2], prim.name())?;
            let params = self.param_block(i);
            for a in 0..prim.nargs() {
                if a > 0 {
                    write!(f, ", ")?;
                }
                match prim.argtype(a) {
                    ArgType::Float => write!(f, "{}", params.float(a))?,
                    ArgType::Color => {
                        let c = params.color(a);
                        write!(f, "color({}, {}, {})", c[0], c[1], c[2])?
                    }
                    ArgType::Point | ArgType::Vector | ArgType::Normal => {
                        let v = params.vector(a);
                        write!(f, "({}, {}, {})", v.x, v.y, v.z)?
                    }
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::test_lobes::{Mirror, UniformEmitter};
    use crate::closure::{ClosurePrimitive, ParamBuilder};
    use crate::Vec3f;
    use pretty_assertions::assert_eq;

    fn mirror() -> Arc<ClosurePrimitive> {
        Arc::new(ClosurePrimitive::bsdf("mirror", "v", Mirror).unwrap())
    }

    fn emitter() -> Arc<ClosurePrimitive> {
        Arc::new(ClosurePrimitive::emissive("emitter", "c", UniformEmitter).unwrap())
    }

    fn normal_params(x: Float, y: Float, z: Float) -> ParamBuilder {
        ParamBuilder::new().push_vector(Vec3f::new(x, y, z))
    }

    #[test]
    fn test_set_resets_to_unit_weight() {
        let prim = mirror();
        let mut c = ClosureColor::new();
        c.add_component(&prim, Spectrum::uniform(0.25), normal_params(0.0, 0.0, 1.0).bytes());
        c.add_component(&prim, Spectrum::uniform(0.75), normal_params(0.0, 1.0, 0.0).bytes());

        c.clear();
        assert!(c.is_empty());

        c.set(&prim, normal_params(1.0, 0.0, 0.0).bytes());
        assert_eq!(c.ncomponents(), 1);
        assert_eq!(c.weight(0), Spectrum::uniform(1.0));
        assert!(Arc::ptr_eq(c.primitive(0), &prim));
        assert_eq!(c.param_block(0).vector(0), Vec3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_sum_concatenates_in_order() {
        let prim = mirror();
        let emit = emitter();

        let mut c1 = ClosureColor::new();
        c1.add_component(&prim, Spectrum::new(0.5, 0.5, 0.5), normal_params(0.0, 0.0, 1.0).bytes());

        let mut c2 = ClosureColor::new();
        c2.add_component(&prim, Spectrum::new(0.2, 0.3, 0.4), normal_params(0.0, 1.0, 0.0).bytes());
        let glow = ParamBuilder::new().push_color(Spectrum::new(1.0, 2.0, 3.0));
        c2.add_component(&emit, Spectrum::uniform(1.0), glow.bytes());

        let c3 = ClosureColor::sum(&c1, &c2);
        assert_eq!(c3.ncomponents(), c1.ncomponents() + c2.ncomponents());

        // first c1's entries, then c2's, weights and bytes unmodified
        assert_eq!(c3.weight(0), c1.weight(0));
        assert!(Arc::ptr_eq(c3.primitive(0), c1.primitive(0)));
        assert_eq!(c3.param_block(0).bytes(), c1.param_block(0).bytes());

        assert_eq!(c3.weight(1), c2.weight(0));
        assert_eq!(c3.param_block(1).bytes(), c2.param_block(0).bytes());
        assert_eq!(c3.weight(2), c2.weight(1));
        assert!(Arc::ptr_eq(c3.primitive(2), &emit));
        assert_eq!(c3.param_block(2).color(0), Spectrum::new(1.0, 2.0, 3.0));

        // operands untouched
        assert_eq!(c1.ncomponents(), 1);
        assert_eq!(c2.ncomponents(), 2);
    }

    #[test]
    fn test_add_assign_relocates_offsets() {
        let prim = mirror();
        let mut acc = ClosureColor::new();
        acc.add_component(&prim, Spectrum::uniform(1.0), normal_params(0.0, 0.0, 1.0).bytes());

        let mut layer = ClosureColor::new();
        layer.add_component(&prim, Spectrum::uniform(0.5), normal_params(0.0, 1.0, 0.0).bytes());
        layer.add_component(&prim, Spectrum::uniform(0.25), normal_params(1.0, 0.0, 0.0).bytes());

        acc += &layer;
        assert_eq!(acc.ncomponents(), 3);
        assert_eq!(acc.param_block(1).vector(0), Vec3f::new(0.0, 1.0, 0.0));
        assert_eq!(acc.param_block(2).vector(0), Vec3f::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_mul_scales_weights_only() {
        let prim = mirror();
        let mut c = ClosureColor::new();
        c.add_component(&prim, Spectrum::new(0.5, 0.5, 0.5), normal_params(0.0, 0.0, 1.0).bytes());
        c.add_component(&prim, Spectrum::new(0.2, 0.3, 0.4), normal_params(0.0, 1.0, 0.0).bytes());
        let bytes_before: Vec<u8> = c.param_block(0).bytes().to_vec();

        c.mul(-2.0);
        assert_eq!(c.ncomponents(), 2);
        assert_eq!(c.weight(0), Spectrum::new(-1.0, -1.0, -1.0));
        assert_eq!(c.weight(1), Spectrum::new(-0.4, -0.6, -0.8));
        assert_eq!(c.param_block(0).bytes(), &bytes_before[..]);

        c.mul(Spectrum::new(0.0, 1.0, 0.5));
        assert_eq!(c.weight(0), Spectrum::new(0.0, -1.0, -0.5));

        c *= 0.0;
        assert!(c.weight(0).is_black());
        assert!(c.weight(1).is_black());
        assert_eq!(c.ncomponents(), 2);
    }

    #[test]
    fn test_set_parameter_patches_one_component() {
        let prim = mirror();
        let mut c = ClosureColor::new();
        c.add_component(&prim, Spectrum::uniform(1.0), normal_params(0.0, 0.0, 1.0).bytes());
        c.add_component(&prim, Spectrum::uniform(1.0), normal_params(0.0, 1.0, 0.0).bytes());

        let patched = normal_params(0.5, 0.5, 0.5);
        c.set_parameter(0, 0, patched.bytes());

        assert_eq!(c.param_block(0).vector(0), Vec3f::new(0.5, 0.5, 0.5));
        assert_eq!(c.param_block(1).vector(0), Vec3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_arena_length_is_sum_of_argmem() {
        let prim = mirror();
        let emit = emitter();
        let mut c = ClosureColor::new();
        c.add_component(&prim, Spectrum::uniform(1.0), normal_params(0.0, 0.0, 1.0).bytes());
        let glow = ParamBuilder::new().push_color(Spectrum::uniform(4.0));
        c.add_component(&emit, Spectrum::uniform(1.0), glow.bytes());

        let total: usize = (0..c.ncomponents()).map(|i| c.primitive(i).argmem()).sum();
        let arena_len: usize = (0..c.ncomponents()).map(|i| c.param_block(i).bytes().len()).sum();
        assert_eq!(arena_len, total);
    }

    #[test]
    fn test_display() {
        let prim = mirror();
        let mut c = ClosureColor::new();
        c.add_component(&prim, Spectrum::new(0.5, 0.5, 0.5), normal_params(0.0, 0.0, 1.0).bytes());
        assert_eq!(format!("{}", c), "(0.5, 0.5, 0.5) * mirror ((0, 0, 1))");
    }
}
