use crate::Float;
use anyhow::{anyhow, Result};
use std::mem::size_of;

/// Type of a single closure-primitive argument, identified by the one-letter
/// codes used in a primitive's signature string (e.g. `"vff"` = vector,
/// float, float).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Float,
    Color,
    Point,
    Vector,
    Normal,
}

impl ArgType {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'f' => Some(ArgType::Float),
            'c' => Some(ArgType::Color),
            'p' => Some(ArgType::Point),
            'v' => Some(ArgType::Vector),
            'n' => Some(ArgType::Normal),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            ArgType::Float => 'f',
            ArgType::Color => 'c',
            ArgType::Point => 'p',
            ArgType::Vector => 'v',
            ArgType::Normal => 'n',
        }
    }

    /// Packed size of this argument in a parameter block, in bytes.
    pub fn size(self) -> usize {
        match self {
            ArgType::Float => size_of::<Float>(),
            _ => 3 * size_of::<Float>(),
        }
    }
}

/// One argument slot in a primitive's parameter-block layout.
#[derive(Debug, Clone, Copy)]
pub struct Arg {
    pub ty: ArgType,
    /// Byte offset of this argument within a parameter block.
    pub offset: usize,
}

/// Parses a signature string into argument slots with cumulative byte
/// offsets, returning the slots and the total parameter-block size.
pub(crate) fn parse_argcodes(codes: &str) -> Result<(Vec<Arg>, usize)> {
    let mut args = Vec::with_capacity(codes.len());
    let mut offset = 0;
    for code in codes.chars() {
        let ty = ArgType::from_code(code)
            .ok_or_else(|| anyhow!("unknown argument type code {:?} in signature {:?}", code, codes))?;
        args.push(Arg { ty, offset });
        offset += ty.size();
    }
    Ok((args, offset))
}
