//! Structural queries over type nodes.

use smallvec::SmallVec;

use crate::data::Field;
use crate::{ArrayLength, DataModel, ModelError, Primitive, TypeData, TypeId, TypePool};

impl TypePool {
    #[inline]
    pub fn is_raw_function(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::RawFunction(_))
    }

    #[inline]
    pub fn is_integer_primitive(&self, id: TypeId) -> bool {
        matches!(self.get(id), TypeData::Primitive(p) if p.is_integer())
    }

    /// Syntactic children walked during type discovery.
    ///
    /// Function pointers yield their raw-function form; aggregates yield
    /// nothing (their fields are walked separately, under ownership rules).
    pub fn type_children(&self, id: TypeId) -> SmallVec<[TypeId; 4]> {
        match self.get(id) {
            TypeData::Pointer(to)
            | TypeData::ConstPointer(to)
            | TypeData::NamedPointer { to, .. } => smallvec::smallvec![*to],
            TypeData::Array { item, .. } => smallvec::smallvec![*item],
            TypeData::RawFunction(sig) => {
                let mut out: SmallVec<[TypeId; 4]> = sig.args.clone();
                out.push(sig.result);
                out
            }
            TypeData::FunctionPtr(_) => self.raw_function_of(id).into_iter().collect(),
            TypeData::Void
            | TypeData::Primitive(_)
            | TypeData::StructOrUnion(_)
            | TypeData::Enum(_) => SmallVec::new(),
        }
    }

    /// Fields of an aggregate with anonymous nested aggregates flattened
    /// into their members. Empty for opaque aggregates.
    pub fn enum_fields(&self, id: TypeId) -> Vec<&Field> {
        let mut out = Vec::new();
        self.collect_fields(id, &mut out);
        out
    }

    fn collect_fields<'a>(&'a self, id: TypeId, out: &mut Vec<&'a Field>) {
        let Some(fields) = self.aggregate(id).and_then(|agg| agg.fields.as_ref()) else {
            return;
        };
        for field in fields {
            if field.name.is_empty() && self.aggregate(field.ty).is_some() {
                self.collect_fields(field.ty, out);
            } else {
                out.push(field);
            }
        }
    }

    pub fn has_anonymous_struct_fields(&self, id: TypeId) -> bool {
        self.aggregate(id)
            .and_then(|agg| agg.fields.as_ref())
            .is_some_and(|fields| {
                fields
                    .iter()
                    .any(|f| f.name.is_empty() && self.aggregate(f.ty).is_some())
            })
    }

    /// Whether `sizeof` can be applied to a value of this type.
    pub fn sizeof_enabled(&self, id: TypeId) -> bool {
        match self.get(id) {
            TypeData::Void | TypeData::RawFunction(_) => false,
            TypeData::StructOrUnion(agg) => !agg.is_opaque(),
            TypeData::Array { item, length } => {
                !matches!(length, ArrayLength::Open) && self.sizeof_enabled(*item)
            }
            TypeData::Primitive(_)
            | TypeData::Pointer(_)
            | TypeData::ConstPointer(_)
            | TypeData::NamedPointer { .. }
            | TypeData::FunctionPtr(_)
            | TypeData::Enum(_) => true,
        }
    }

    /// Integer type backing an enum whose width is not given by a C name.
    ///
    /// Negative values select `int` or `long`; otherwise `unsigned int` or
    /// `unsigned long`, whichever first holds every value.
    pub fn enum_base_int(&self, id: TypeId, model: DataModel) -> Result<Primitive, ModelError> {
        let Some(data) = self.enum_data(id) else {
            return Err(ModelError::UnexpectedNode {
                name: self.plain_c_name(id),
                expected: "an enum",
            });
        };
        let smallest = data.enumerators.iter().map(|e| e.value).min().unwrap_or(0);
        let largest = data.enumerators.iter().map(|e| e.value).max().unwrap_or(0);
        let (sign, candidates) = if smallest < 0 {
            (1, [Primitive::Int, Primitive::Long])
        } else {
            (0, [Primitive::UnsignedInt, Primitive::UnsignedLong])
        };
        for candidate in candidates {
            let bits = 8 * model.size_of(candidate);
            let low = -(1i128 << (bits - 1));
            let high = 1i128 << (bits - sign);
            if smallest >= low && largest < high {
                return Ok(candidate);
            }
        }
        Err(ModelError::EnumTooWide {
            name: self.plain_c_name(id),
        })
    }
}
