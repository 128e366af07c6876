use crate::closure::{ArgType, ClosurePrimitive};
use crate::spectrum::Spectrum;
use crate::{Float, Vec3f};
use smallvec::SmallVec;

/// Typed read-only view over one component's packed parameter bytes.
///
/// Lobe implementations receive one of these per call and read their
/// arguments by index; the offsets come from the owning primitive's parsed
/// signature, so a block built against the same signature decodes without
/// any per-argument bookkeeping on the lobe side.
#[derive(Clone, Copy)]
pub struct ParamBlock<'a> {
    prim: &'a ClosurePrimitive,
    bytes: &'a [u8],
}

impl<'a> ParamBlock<'a> {
    pub(crate) fn new(prim: &'a ClosurePrimitive, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), prim.argmem());
        Self { prim, bytes }
    }

    pub fn primitive(&self) -> &'a ClosurePrimitive {
        self.prim
    }

    /// The raw packed bytes, `argmem()` long.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn float(&self, i: usize) -> Float {
        debug_assert_eq!(self.prim.argtype(i), ArgType::Float);
        read_float(self.bytes, self.prim.argoffset(i))
    }

    pub fn color(&self, i: usize) -> Spectrum {
        debug_assert_eq!(self.prim.argtype(i), ArgType::Color);
        let off = self.prim.argoffset(i);
        Spectrum::new_with(|c| read_float(self.bytes, off + c * 4))
    }

    /// Reads a point, vector or normal argument.
    pub fn vector(&self, i: usize) -> Vec3f {
        debug_assert!(matches!(
            self.prim.argtype(i),
            ArgType::Point | ArgType::Vector | ArgType::Normal
        ));
        let off = self.prim.argoffset(i);
        Vec3f::new(
            read_float(self.bytes, off),
            read_float(self.bytes, off + 4),
            read_float(self.bytes, off + 8),
        )
    }
}

fn read_float(bytes: &[u8], offset: usize) -> Float {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    Float::from_ne_bytes(buf)
}

/// Packs argument values into the byte layout declared by a primitive's
/// signature. Arguments must be pushed in signature order.
#[derive(Default)]
pub struct ParamBuilder {
    bytes: SmallVec<[u8; 64]>,
}

impl ParamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_float(mut self, x: Float) -> Self {
        self.bytes.extend_from_slice(&x.to_ne_bytes());
        self
    }

    pub fn push_vector(mut self, v: Vec3f) -> Self {
        for &x in &[v.x, v.y, v.z] {
            self.bytes.extend_from_slice(&x.to_ne_bytes());
        }
        self
    }

    pub fn push_color(mut self, c: Spectrum) -> Self {
        for ch in 0..3 {
            self.bytes.extend_from_slice(&c[ch].to_ne_bytes());
        }
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::test_lobes::UniformEmitter;

    #[test]
    fn test_builder_matches_block_layout() {
        let prim = ClosurePrimitive::emissive("emit_fc", "fcv", UniformEmitter).unwrap();
        let block = ParamBuilder::new()
            .push_float(2.5)
            .push_color(Spectrum::new(0.1, 0.2, 0.3))
            .push_vector(Vec3f::new(1.0, 0.0, -1.0));

        assert_eq!(block.bytes().len(), prim.argmem());

        let view = ParamBlock::new(&prim, block.bytes());
        assert_eq!(view.float(0), 2.5);
        assert_eq!(view.color(1), Spectrum::new(0.1, 0.2, 0.3));
        assert_eq!(view.vector(2), Vec3f::new(1.0, 0.0, -1.0));
    }
}
