//! [`Trackable`] implementations for std scalars and strings.

use super::{SurfaceBuilder, Trackable, Verdict};
use crate::error::OpError;
use crate::value::Value;

fn int_arg(name: &str, args: &[Value], index: usize) -> Result<i128, OpError> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| OpError::invalid_argument(name, format!("argument {index} must be an integer")))
}

fn text_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, OpError> {
    args.get(index)
        .and_then(Value::as_text)
        .ok_or_else(|| OpError::invalid_argument(name, format!("argument {index} must be text")))
}

macro_rules! trackable_integer {
    ($($t:ty),*) => {$(
        impl Trackable for $t {
            fn describe(surface: &mut SurfaceBuilder<Self>) {
                surface
                    .ordered()
                    .bytes(|n| Ok(n.to_be_bytes().to_vec()))
                    .native("count_ones", |n| Value::from(n.count_ones()))
                    .native("leading_zeros", |n| Value::from(n.leading_zeros()))
                    .method("checked_pow", &["exp"], |n, args| {
                        let exp = u32::try_from(int_arg("checked_pow", args, 0)?)
                            .map_err(|e| OpError::invalid_argument("checked_pow", e.to_string()))?;
                        // Overflow is `Unit`, as `None` is for the bare method.
                        let Some(power) = n.checked_pow(exp) else {
                            return Ok(Value::Unit);
                        };
                        i128::try_from(power).map(Value::Int).map_err(|_| OpError::OutOfRange {
                            name: "checked_pow".to_owned(),
                            value: power.to_string(),
                        })
                    });
            }
        }
    )*};
}

trackable_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! trackable_float {
    ($($t:ty),*) => {$(
        impl Trackable for $t {
            fn describe(surface: &mut SurfaceBuilder<Self>) {
                surface
                    .ordered()
                    .bytes(|x| Ok(x.to_be_bytes().to_vec()))
                    .native("is_nan", |x| Value::Bool(x.is_nan()))
                    .native("is_finite", |x| Value::Bool(x.is_finite()))
                    .method("powi", &["n"], |x, args| {
                        let n = i32::try_from(int_arg("powi", args, 0)?)
                            .map_err(|e| OpError::invalid_argument("powi", e.to_string()))?;
                        Ok(Value::from(x.powi(n)))
                    });
            }
        }
    )*};
}

trackable_float!(f32, f64);

impl Trackable for bool {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .bytes(|b| Ok(vec![u8::from(*b)]));
    }
}

impl Trackable for char {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .bytes(|c| Ok(c.to_string().into_bytes()))
            .native("is_alphabetic", |c| Value::Bool(c.is_alphabetic()))
            .native("len_utf8", |c| Value::from(c.len_utf8()));
    }
}

impl Trackable for String {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .compare_with::<&'static str, _>(|s, t, op| {
                Ok(Verdict::Bool(op.apply(s.as_str(), *t)))
            })
            .bytes(|s| Ok(s.as_bytes().to_vec()))
            .native("len", |s| Value::from(s.len()))
            .native("is_empty", |s| Value::Bool(s.is_empty()))
            .method("contains", &["needle"], |s, args| {
                Ok(Value::Bool(s.contains(text_arg("contains", args, 0)?)))
            })
            .method("starts_with", &["prefix"], |s, args| {
                Ok(Value::Bool(s.starts_with(text_arg("starts_with", args, 0)?)))
            })
            .method("to_uppercase", &[], |s, _| Ok(Value::Text(s.to_uppercase())));
    }
}

impl Trackable for &'static str {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .compare_with::<String, _>(|s, t, op| Ok(Verdict::Bool(op.apply(*s, t.as_str()))))
            .bytes(|s| Ok(s.as_bytes().to_vec()))
            .native("len", |s| Value::from(s.len()));
    }
}

impl Trackable for Vec<u8> {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .bytes(|b| Ok(b.clone()))
            .native("len", |b| Value::from(b.len()));
    }
}

impl Trackable for () {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface.ordered();
    }
}

#[cfg(test)]
mod tests {
    use crate::error::OpError;
    use crate::surface::registry::SurfaceRegistry;
    use crate::surface::{CmpOp, Forwarding};
    use crate::value::Value;

    #[test]
    fn integers_forward_bytes_and_natives() {
        let registry = SurfaceRegistry::new();
        let surface = registry.surface::<u16>();
        assert_eq!(surface.to_bytes(&0x0102_u16), Ok(vec![1, 2]));
        assert_eq!(surface.attribute(&7_u16, "count_ones"), Ok(Value::Int(3)));
        assert_eq!(
            surface.call(&3_u16, "checked_pow", &[Value::Int(2)]),
            Ok(Value::Int(9))
        );
        assert_eq!(
            surface.call(&300_u16, "checked_pow", &[Value::Int(2)]),
            Ok(Value::Unit)
        );
    }

    #[test]
    fn wide_powers_are_distinct_from_overflow() {
        let registry = SurfaceRegistry::new();
        let surface = registry.surface::<u128>();
        assert_eq!(
            surface.call(&2_u128, "checked_pow", &[Value::Int(100)]),
            Ok(Value::Int(1 << 100))
        );
        assert_eq!(
            surface.call(&2_u128, "checked_pow", &[Value::Int(127)]),
            Err(OpError::OutOfRange {
                name: "checked_pow".to_owned(),
                value: (1_u128 << 127).to_string(),
            })
        );
        assert_eq!(
            surface.call(&2_u128, "checked_pow", &[Value::Int(128)]),
            Ok(Value::Unit)
        );
        let i64_surface = registry.surface::<i64>();
        assert_eq!(
            i64_surface.call(&3_i64, "checked_pow", &[Value::Int(40)]),
            Ok(Value::Unit)
        );
        assert_eq!(
            i64_surface.call(&2_i64, "checked_pow", &[Value::Int(40)]),
            Ok(Value::Int(1 << 40))
        );
    }

    #[test]
    fn strings_compare_with_str_slices() {
        let registry = SurfaceRegistry::new();
        let surface = registry.surface::<String>();
        let verdict = surface
            .compare(&"apple".to_owned(), CmpOp::Lt, &"banana", "&str")
            .unwrap();
        assert_eq!(verdict.as_bool(), Some(true));
        assert_eq!(surface.forwarding("len"), Some(Forwarding::Attribute));
        assert_eq!(
            surface.call(&"haystack".to_owned(), "contains", &[Value::from("st")]),
            Ok(Value::Bool(true))
        );
        assert!(
            surface
                .call(&"haystack".to_owned(), "contains", &[Value::Int(1)])
                .is_err()
        );
    }

    #[test]
    fn floats_are_ordered_with_nan_unordered() {
        let registry = SurfaceRegistry::new();
        let surface = registry.surface::<f64>();
        let lt = surface.compare(&f64::NAN, CmpOp::Lt, &1.0_f64, "f64").unwrap();
        assert_eq!(lt.as_bool(), Some(false));
        assert_eq!(surface.attribute(&f64::NAN, "is_nan"), Ok(Value::Bool(true)));
    }
}
