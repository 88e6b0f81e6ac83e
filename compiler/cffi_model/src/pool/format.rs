//! C spelling of type nodes.
//!
//! Every node renders to a template with a single `&` marking where a
//! declarator goes: `int&`, `int *&`, `double(*&)(float)`, `int&[5]`.
//! Compound nodes splice their own pattern into the marker of their child.

use crate::data::FunctionSig;
use crate::{ArrayLength, ModelError, TypeData, TypeId, TypePool};

const MARKER: char = '&';

fn splice(template: &str, with: &str) -> String {
    template.replacen(MARKER, with, 1)
}

impl TypePool {
    /// The declarator template of a node.
    pub fn c_name_with_marker(&self, id: TypeId) -> String {
        match self.get(id) {
            TypeData::Void => "void&".to_owned(),
            TypeData::Primitive(prim) => format!("{}&", prim.name()),
            TypeData::Pointer(to) => self.pointer_marker(*to, " *&", "(*&)"),
            TypeData::ConstPointer(to) => self.pointer_marker(*to, " const *&", "(const *&)"),
            TypeData::NamedPointer { name, .. } => format!("{name}&"),
            TypeData::RawFunction(sig) => self.function_marker(sig, "(&)"),
            TypeData::FunctionPtr(sig) => self.function_marker(sig, "(*&)"),
            TypeData::Array { item, length } => {
                let brackets = match length {
                    ArrayLength::Open => "&[]".to_owned(),
                    ArrayLength::Unresolved => "&[/*...*/]".to_owned(),
                    ArrayLength::Fixed(n) => format!("&[{n}]"),
                    ArrayLength::Expr(expr) => format!("&[{expr}]"),
                };
                splice(&self.c_name_with_marker(*item), &brackets)
            }
            TypeData::StructOrUnion(agg) => match &agg.forcename {
                Some(forced) => format!("{forced}&"),
                None => format!("{} {}&", agg.kind.keyword(), agg.name),
            },
            TypeData::Enum(data) => match &data.forcename {
                Some(forced) => format!("{forced}&"),
                None => format!("enum {}&", data.name),
            },
        }
    }

    fn pointer_marker(&self, to: TypeId, plain: &str, around_array: &str) -> String {
        let pattern = if matches!(self.get(to), TypeData::Array { .. }) {
            around_array
        } else {
            plain
        };
        splice(&self.c_name_with_marker(to), pattern)
    }

    fn function_marker(&self, sig: &FunctionSig, head: &str) -> String {
        let mut args: Vec<String> = sig.args.iter().map(|&a| self.plain_c_name(a)).collect();
        if sig.ellipsis {
            args.push("...".to_owned());
        }
        if args.is_empty() {
            args.push("void".to_owned());
        }
        let pattern = format!("{head}({})", args.join(", "));
        splice(&self.c_name_with_marker(sig.result), &pattern)
    }

    /// The C spelling with no declarator, e.g. `double(*)(float)`.
    ///
    /// Never fails; anonymous aggregates keep their `$` names.
    pub fn plain_c_name(&self, id: TypeId) -> String {
        splice(&self.c_name_with_marker(id), "")
    }

    /// Ordering key used to lay out the type table.
    pub fn sort_key(&self, id: TypeId) -> String {
        format!("<{}>", self.plain_c_name(id))
    }

    /// The C spelling with `declarator` spliced in, e.g. `int *x0` or
    /// `int(*tmp)[5]`.
    ///
    /// `context` names the use site for the error raised when the type has
    /// no C spelling.
    pub fn c_name(&self, id: TypeId, declarator: &str, context: &str) -> Result<String, ModelError> {
        let template = self.c_name_with_marker(id);
        let declarator = declarator.trim();
        let declarator = if declarator.is_empty() {
            String::new()
        } else if declarator.starts_with('*') && template.contains("&[") {
            format!("({declarator})")
        } else if declarator.starts_with(['[', '(']) {
            declarator.to_owned()
        } else {
            format!(" {declarator}")
        };
        let result = splice(&template, &declarator);
        if result.contains('$') {
            return Err(ModelError::UnknownTypeName {
                name: self.plain_c_name(id),
                context: context.to_owned(),
            });
        }
        Ok(result)
    }
}
