// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf codecs for the built-in value types.
//!
//! These are used wherever a built-in value appears without a declared
//! primitive member type: `Any` members, list elements and roots. Members
//! declared as primitives are written inline by the structural codecs.

use super::Codec;
use crate::context::{ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::io::{Input, Output};
use crate::types::TypeHandle;
use crate::value::Value;

/// Generate an immutable leaf codec for one `Value` variant.
macro_rules! leaf_codec {
    (
        $(#[$doc:meta])*
        $codec:ident, $label:literal, $variant:ident, fixed = $fixed:expr,
        write = |$out:ident, $v:ident| $write:expr,
        read = |$input:ident| $read:expr
    ) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $codec;

        impl Codec for $codec {
            fn name(&self) -> &'static str {
                stringify!($codec)
            }

            fn write(
                &self,
                _engine: &Engine,
                _ctx: &mut WriteContext,
                $out: &mut Output,
                value: &Value,
            ) -> Result<()> {
                match value {
                    Value::$variant($v) => {
                        $write;
                        Ok(())
                    }
                    other => Err(Error::type_mismatch($label, other.type_name())),
                }
            }

            fn read(
                &self,
                _engine: &Engine,
                _ctx: &mut ReadContext,
                $input: &mut Input<'_>,
                _ty: &TypeHandle,
            ) -> Result<Value> {
                Ok(Value::$variant($read?))
            }

            fn is_immutable(&self) -> bool {
                true
            }

            fn is_fixed_size(&self) -> bool {
                $fixed
            }

            fn is_leaf(&self) -> bool {
                true
            }
        }
    };
}

leaf_codec!(
    /// One byte, 0 or 1.
    BoolCodec, "boolean", Bool, fixed = true,
    write = |out, v| out.write_bool(*v),
    read = |input| input.read_bool()
);

leaf_codec!(
    ByteCodec, "byte", Byte, fixed = true,
    write = |out, v| out.write_i8(*v),
    read = |input| input.read_i8()
);

leaf_codec!(
    ShortCodec, "short", Short, fixed = true,
    write = |out, v| out.write_i16(*v),
    read = |input| input.read_i16()
);

leaf_codec!(
    /// Zig-zag varint.
    IntCodec, "int", Int, fixed = false,
    write = |out, v| out.write_var_int(*v, false),
    read = |input| input.read_var_int(false)
);

leaf_codec!(
    /// Zig-zag varlong.
    LongCodec, "long", Long, fixed = false,
    write = |out, v| out.write_var_long(*v, false),
    read = |input| input.read_var_long(false)
);

leaf_codec!(
    FloatCodec, "float", Float, fixed = true,
    write = |out, v| out.write_f32(*v),
    read = |input| input.read_f32()
);

leaf_codec!(
    DoubleCodec, "double", Double, fixed = true,
    write = |out, v| out.write_f64(*v),
    read = |input| input.read_f64()
);

leaf_codec!(
    /// Scalar value as a positive varint.
    CharCodec, "char", Char, fixed = false,
    write = |out, v| out.write_char(*v),
    read = |input| input.read_char()
);

/// Length-prefixed UTF-8 with its own null encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn name(&self) -> &'static str {
        "StringCodec"
    }

    fn write(
        &self,
        _engine: &Engine,
        _ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        match value {
            Value::Str(s) => out.write_string(Some(s)),
            Value::Null => out.write_string(None),
            other => return Err(Error::type_mismatch("String", other.type_name())),
        }
        Ok(())
    }

    fn read(
        &self,
        _engine: &Engine,
        _ctx: &mut ReadContext,
        input: &mut Input<'_>,
        _ty: &TypeHandle,
    ) -> Result<Value> {
        Ok(input.read_string()?.map_or(Value::Null, Value::Str))
    }

    fn accepts_null(&self) -> bool {
        true
    }

    fn is_immutable(&self) -> bool {
        true
    }

    fn is_leaf(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Builtin;
    use crate::ErrorCategory;

    fn roundtrip(codec: &dyn Codec, value: Value, builtin: Builtin) -> (Vec<u8>, Value) {
        let engine = Engine::new();
        let mut out = Output::new();
        codec
            .write(&engine, &mut WriteContext::new(), &mut out, &value)
            .expect("write");
        let bytes = out.into_bytes();
        let mut input = Input::new(&bytes);
        let decoded = codec
            .read(
                &engine,
                &mut ReadContext::new(),
                &mut input,
                &TypeHandle::Builtin(builtin),
            )
            .expect("read");
        assert!(input.is_eof());
        (bytes, decoded)
    }

    #[test]
    fn test_leaf_boundaries_roundtrip() {
        let cases: [(&dyn Codec, Value, Builtin); 13] = [
            (&IntCodec, Value::Int(i32::MIN), Builtin::Int),
            (&IntCodec, Value::Int(i32::MAX), Builtin::Int),
            (&IntCodec, Value::Int(-1), Builtin::Int),
            (&LongCodec, Value::Long(i64::MIN), Builtin::Long),
            (&LongCodec, Value::Long(0), Builtin::Long),
            (&ShortCodec, Value::Short(i16::MIN), Builtin::Short),
            (&ByteCodec, Value::Byte(-1), Builtin::Byte),
            (&BoolCodec, Value::Bool(true), Builtin::Bool),
            (&FloatCodec, Value::Float(f32::MAX), Builtin::Float),
            (&DoubleCodec, Value::Double(f64::MIN_POSITIVE), Builtin::Double),
            (&CharCodec, Value::Char('\u{10FFFF}'), Builtin::Char),
            (&StringCodec, Value::from("écrit"), Builtin::Str),
            (&StringCodec, Value::Null, Builtin::Str),
        ];
        for (codec, value, builtin) in cases {
            let (_, decoded) = roundtrip(codec, value.clone(), builtin);
            assert_eq!(decoded, value, "{}", codec.name());
        }
    }

    #[test]
    fn test_int_codec_is_zigzag() {
        let (bytes, _) = roundtrip(&IntCodec, Value::Int(-1), Builtin::Int);
        assert_eq!(bytes, vec![0x01]);
        let (bytes, _) = roundtrip(&IntCodec, Value::Int(64), Builtin::Int);
        assert_eq!(bytes, vec![0x80, 0x01]);
    }

    #[test]
    fn test_leaf_rejects_wrong_variant() {
        let engine = Engine::new();
        let mut out = Output::new();
        let err = IntCodec
            .write(&engine, &mut WriteContext::new(), &mut out, &Value::from("7"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Value);
        assert!(out.is_empty());
    }

    #[test]
    fn test_leaf_flags() {
        assert!(IntCodec.is_immutable());
        assert!(!IntCodec.is_fixed_size());
        assert!(DoubleCodec.is_fixed_size());
        assert!(StringCodec.accepts_null());
        assert!(!BoolCodec.accepts_null());
    }
}
