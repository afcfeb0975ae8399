//! Type classification.
//!
//! Reduces a declared [`TypeDescriptor`] to the [`TypeCategory`] the binder
//! parses, erasing optional wrappers into a `nullable` flag:
//!
//! | declared | category | nullable |
//! |---|---|---|
//! | `int` / `float` / `str` | scalar | no |
//! | `bool` | `Bool` | no |
//! | `enum E` | `Enum(E)` | no |
//! | `list[T]` (T scalar) | `List(T)` | no |
//! | `optional[X]`, `union[X, none]` | category of X | yes |
//!
//! Everything else is a [`SchemaError`].

use std::collections::HashSet;

use crate::descriptor::TypeCategory;
use crate::error::SchemaError;
use crate::types::{EnumType, ScalarType, TypeDescriptor};

/// Outcome of classifying one declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub category: TypeCategory,
    pub nullable: bool,
}

/// Classifies the declared type of `field`.
///
/// # Errors
///
/// Returns a [`SchemaError`] for unresolved names, maps, bare `none`,
/// unions other than `X | none`, nested optionals or lists, mixed-type
/// lists, and malformed enumerations.
///
/// # Examples
///
/// ```
/// use config_schema_core::{classify, ScalarType, TypeCategory, TypeDescriptor};
///
/// let ty = TypeDescriptor::optional(TypeDescriptor::list(TypeDescriptor::Str));
/// let c = classify("ces", &ty).unwrap();
/// assert_eq!(c.category, TypeCategory::List(ScalarType::Str));
/// assert!(c.nullable);
///
/// assert!(classify("x", &TypeDescriptor::Named("Later".into())).is_err());
/// ```
pub fn classify(field: &str, ty: &TypeDescriptor) -> Result<Classified, SchemaError> {
    if let Some(inner) = optional_inner(field, ty)? {
        return Ok(Classified {
            category: classify_plain(field, inner, ty)?,
            nullable: true,
        });
    }
    Ok(Classified {
        category: classify_plain(field, ty, ty)?,
        nullable: false,
    })
}

/// Returns the wrapped type when `ty` is `optional[X]` or `union[X, none]`.
fn optional_inner<'a>(
    field: &str,
    ty: &'a TypeDescriptor,
) -> Result<Option<&'a TypeDescriptor>, SchemaError> {
    match ty {
        TypeDescriptor::Optional(inner) => Ok(Some(inner.as_ref())),
        TypeDescriptor::Union(members) => {
            let has_none = members.iter().any(|m| *m == TypeDescriptor::None);
            let mut rest: Vec<&TypeDescriptor> = Vec::new();
            for m in members.iter().filter(|m| **m != TypeDescriptor::None) {
                if !rest.contains(&m) {
                    rest.push(m);
                }
            }
            match rest.as_slice() {
                [single] if has_none => Ok(Some(*single)),
                // union[X] is just X; classify_plain reports the wrapper.
                [_] => Ok(None),
                _ => Err(unsupported(field, ty)),
            }
        }
        _ => Ok(None),
    }
}

fn classify_plain(
    field: &str,
    ty: &TypeDescriptor,
    declared: &TypeDescriptor,
) -> Result<TypeCategory, SchemaError> {
    match ty {
        TypeDescriptor::Int => Ok(TypeCategory::Int),
        TypeDescriptor::Float => Ok(TypeCategory::Float),
        TypeDescriptor::Str => Ok(TypeCategory::Str),
        TypeDescriptor::Bool => Ok(TypeCategory::Bool),
        TypeDescriptor::Enum(e) => {
            check_enum(field, e)?;
            Ok(TypeCategory::Enum(e.clone()))
        }
        TypeDescriptor::List(elem) => list_element(field, elem, declared).map(TypeCategory::List),
        TypeDescriptor::Union(members) if ty == declared => {
            // A single-member union without `none`.
            match members.iter().find(|m| **m != TypeDescriptor::None) {
                Some(only) => classify_plain(field, only, only),
                None => Err(unsupported(field, declared)),
            }
        }
        TypeDescriptor::Named(name) => Err(SchemaError::UnresolvedType {
            field: field.to_string(),
            name: name.clone(),
        }),
        TypeDescriptor::None
        | TypeDescriptor::Optional(_)
        | TypeDescriptor::Union(_)
        | TypeDescriptor::Map(..) => Err(unsupported(field, declared)),
    }
}

fn list_element(
    field: &str,
    elem: &TypeDescriptor,
    declared: &TypeDescriptor,
) -> Result<ScalarType, SchemaError> {
    if let Some(scalar) = elem.as_scalar() {
        return Ok(scalar);
    }
    match elem {
        TypeDescriptor::Union(members) => {
            let scalars: Option<Vec<ScalarType>> =
                members.iter().map(TypeDescriptor::as_scalar).collect();
            match scalars.as_deref() {
                Some([first, rest @ ..]) if rest.iter().all(|s| s == first) => Ok(*first),
                Some([_, ..]) => Err(SchemaError::MixedList {
                    field: field.to_string(),
                    ty: declared.to_string(),
                }),
                _ => Err(unsupported(field, declared)),
            }
        }
        TypeDescriptor::Named(name) => Err(SchemaError::UnresolvedType {
            field: field.to_string(),
            name: name.clone(),
        }),
        _ => Err(unsupported(field, declared)),
    }
}

fn check_enum(field: &str, e: &EnumType) -> Result<(), SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidEnum {
        field: field.to_string(),
        name: e.name.clone(),
        reason,
    };

    if e.scalar == ScalarType::Bool {
        return Err(invalid("cannot use bool literals".to_string()));
    }
    if e.members.is_empty() {
        return Err(invalid("has no members".to_string()));
    }

    let mut names = HashSet::new();
    for (i, member) in e.members.iter().enumerate() {
        if !names.insert(member.name.as_str()) {
            return Err(invalid(format!("declares member `{}` twice", member.name)));
        }
        if !e.scalar.admits(&member.value) {
            return Err(invalid(format!(
                "member `{}` has a {} literal, expected {}",
                member.name,
                member.value.kind(),
                e.scalar
            )));
        }
        if e.members[..i].iter().any(|m| m.value == member.value) {
            return Err(invalid(format!("repeats literal {}", member.value)));
        }
    }
    Ok(())
}

fn unsupported(field: &str, ty: &TypeDescriptor) -> SchemaError {
    SchemaError::UnsupportedType {
        field: field.to_string(),
        ty: ty.to_string(),
    }
}
