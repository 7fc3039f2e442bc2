//! Literal value nodes and lossless numeric conversion.
//!
//! Default values, metadata values and enum values all accept some subset of
//! the literal grammar. The conversions here return `Option` so a caller can
//! tell "fits in the target type" apart from "does not": there is no silent
//! truncation anywhere in the pipeline.

use crate::ast::{Ident, QualIdent};
use crate::span::PosRange;
use crate::token::TokenInfo;

/// An unsigned integer literal (decimal, octal or hex).
#[derive(Clone, PartialEq, Debug)]
pub struct UintLit {
    pub value: u64,
    pub info: TokenInfo,
}

/// A floating point literal.
#[derive(Clone, PartialEq, Debug)]
pub struct FloatLit {
    pub value: f64,
    pub info: TokenInfo,
}

/// `inf` or `nan`, spelled as a keyword.
#[derive(Clone, PartialEq, Debug)]
pub struct SpecialFloatLit {
    pub value: f64,
    pub info: TokenInfo,
}

/// A sign applied to an integer literal, e.g. `-1` or `+42`.
#[derive(Clone, PartialEq, Debug)]
pub struct SignedIntLit {
    pub negative: bool,
    pub value: u64,
    pub range: PosRange,
}

/// A sign applied to a float or special float literal.
#[derive(Clone, PartialEq, Debug)]
pub struct SignedFloatLit {
    pub negative: bool,
    pub value: f64,
    pub range: PosRange,
}

/// `true` or `false`.
#[derive(Clone, PartialEq, Debug)]
pub struct BoolLit {
    pub value: bool,
    pub info: TokenInfo,
}

/// A string literal with escapes already decoded.
#[derive(Clone, PartialEq, Debug)]
pub struct StrLit {
    pub value: String,
    pub info: TokenInfo,
}

/// An integer literal with or without a sign, as enum values allow.
#[derive(Clone, PartialEq, Debug)]
pub enum IntLit {
    Uint(UintLit),
    Signed(SignedIntLit),
}

impl IntLit {
    pub fn range(&self) -> PosRange {
        match self {
            IntLit::Uint(n) => n.info.range,
            IntLit::Signed(n) => n.range,
        }
    }

    /// The literal as an `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            IntLit::Uint(n) => i64::try_from(n.value).ok(),
            IntLit::Signed(n) => signed_as_i64(n.negative, n.value),
        }
    }

    /// The literal as a `u64`, if it is non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            IntLit::Uint(n) => Some(n.value),
            IntLit::Signed(n) => {
                if n.negative && n.value != 0 {
                    None
                } else {
                    Some(n.value)
                }
            }
        }
    }

    /// The literal as an `i64` clamped to nothing: `None` unless the value
    /// lies within `min..=max`.
    pub fn as_i64_in(&self, min: i64, max: i64) -> Option<i64> {
        self.as_i64().filter(|v| (min..=max).contains(v))
    }
}

fn signed_as_i64(negative: bool, magnitude: u64) -> Option<i64> {
    if negative {
        // i64::MIN has no positive counterpart, handle it by one-off.
        if magnitude == i64::MAX as u64 + 1 {
            Some(i64::MIN)
        } else {
            i64::try_from(magnitude).ok().map(|v| -v)
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}

/// Any literal or identifier usable as a default value or metadata value.
#[derive(Clone, PartialEq, Debug)]
pub enum ValueNode {
    Ident(Ident),
    CompoundIdent(QualIdent),
    Str(StrLit),
    Bool(BoolLit),
    Uint(UintLit),
    SignedInt(SignedIntLit),
    Float(FloatLit),
    SpecialFloat(SpecialFloatLit),
    SignedFloat(SignedFloatLit),
}

impl ValueNode {
    pub fn range(&self) -> PosRange {
        match self {
            ValueNode::Ident(n) => n.range,
            ValueNode::CompoundIdent(n) => n.range,
            ValueNode::Str(n) => n.info.range,
            ValueNode::Bool(n) => n.info.range,
            ValueNode::Uint(n) => n.info.range,
            ValueNode::SignedInt(n) => n.range,
            ValueNode::Float(n) => n.info.range,
            ValueNode::SpecialFloat(n) => n.info.range,
            ValueNode::SignedFloat(n) => n.range,
        }
    }

    /// The value as an `i64`, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ValueNode::Uint(n) => i64::try_from(n.value).ok(),
            ValueNode::SignedInt(n) => signed_as_i64(n.negative, n.value),
            _ => None,
        }
    }

    /// The value as a `u64`, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ValueNode::Uint(n) => Some(n.value),
            ValueNode::SignedInt(n) => {
                if n.negative && n.value != 0 {
                    None
                } else {
                    Some(n.value)
                }
            }
            _ => None,
        }
    }

    /// The value as an `f64`. Integers convert with the usual loss of
    /// precision above 2^53; non-numeric values yield `None`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueNode::Uint(n) => Some(n.value as f64),
            ValueNode::SignedInt(n) => {
                let v = n.value as f64;
                Some(if n.negative { -v } else { v })
            }
            ValueNode::Float(n) => Some(n.value),
            ValueNode::SpecialFloat(n) => Some(n.value),
            ValueNode::SignedFloat(n) => Some(if n.negative { -n.value } else { n.value }),
            _ => None,
        }
    }
}
