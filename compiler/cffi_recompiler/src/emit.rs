//! Bytecode emission: one op per reserved slot.

use cffi_model::{ArrayLength, Primitive, TypeData, TypeId, TypePool};

use crate::collect::{Layout, Slot};
use crate::table::TypeTable;
use crate::{Op, OpCode, RecompileError, RecompileResult};

struct Emitter<'a> {
    pool: &'a TypePool,
    layout: &'a Layout,
    ops: Vec<Option<Op>>,
}

/// Fill every slot of `layout`.
///
/// Fails if a slot is left empty, which would mean the collector reserved
/// something the emitter does not know how to fill.
#[tracing::instrument(level = "debug", skip_all, fields(slots = layout.slots.len()))]
pub(crate) fn emit_bytecode(pool: &TypePool, layout: Layout) -> RecompileResult<TypeTable> {
    let mut emitter = Emitter {
        pool,
        layout: &layout,
        ops: vec![None; layout.slots.len()],
    };
    for &ty in &layout.order {
        emitter.emit(ty)?;
    }
    let ops = emitter.ops;

    let mut resolved = Vec::with_capacity(ops.len());
    for (at, (op, slot)) in ops.into_iter().zip(&layout.slots).enumerate() {
        let Some(op) = op else {
            return Err(RecompileError::internal(format!(
                "slot {at} ({}) was never filled",
                describe(pool, *slot)
            )));
        };
        resolved.push(op);
    }
    Ok(TypeTable::new(
        resolved,
        layout.index,
        layout.struct_unions,
        layout.enums,
    ))
}

fn describe(pool: &TypePool, slot: Slot) -> String {
    match slot {
        Slot::Type(ty) => format!("type '{}'", pool.plain_c_name(ty)),
        Slot::Arg(ty) => format!("argument '{}'", pool.plain_c_name(ty)),
        Slot::End => "function end".to_owned(),
        Slot::Len => "array length".to_owned(),
    }
}

fn primitive_op(prim: Option<Primitive>) -> Op {
    let tag = prim.map_or(Primitive::VOID_TAG, Primitive::tag);
    Op::new(OpCode::Primitive, i64::from(tag))
}

impl Emitter<'_> {
    fn index(&self, ty: TypeId) -> RecompileResult<usize> {
        self.layout.index.get(&ty).copied().ok_or_else(|| {
            RecompileError::internal(format!(
                "'{}' was never collected",
                self.pool.plain_c_name(ty)
            ))
        })
    }

    fn set(&mut self, at: usize, op: Op) -> RecompileResult<()> {
        match self.ops.get_mut(at) {
            Some(slot) => {
                *slot = Some(op);
                Ok(())
            }
            None => Err(RecompileError::internal(format!(
                "slot {at} is past the end of the type table"
            ))),
        }
    }

    fn emit(&mut self, ty: TypeId) -> RecompileResult<()> {
        let at = self.index(ty)?;
        let pool = self.pool;
        match pool.get(ty) {
            TypeData::Void => self.set(at, primitive_op(None)),
            TypeData::Primitive(prim) => self.set(at, primitive_op(Some(*prim))),
            TypeData::Pointer(to)
            | TypeData::ConstPointer(to)
            | TypeData::NamedPointer { to, .. } => {
                let target = self.index(*to)?;
                self.set(at, Op::slot(OpCode::Pointer, target))
            }
            TypeData::FunctionPtr(_) => {
                let raw = pool.raw_function_of(ty).ok_or_else(|| {
                    RecompileError::internal(format!(
                        "'{}' has no raw function form",
                        pool.plain_c_name(ty)
                    ))
                })?;
                let target = self.index(raw)?;
                self.set(at, Op::slot(OpCode::Pointer, target))
            }
            TypeData::RawFunction(sig) => {
                let result = self.index(sig.result)?;
                self.set(at, Op::slot(OpCode::Function, result))?;
                let mut slot = at + 1;
                for &arg in &sig.args {
                    let canonical = self.index(arg)?;
                    if canonical != slot {
                        let op = match pool.get(arg) {
                            TypeData::Void => primitive_op(None),
                            TypeData::Primitive(prim) => primitive_op(Some(*prim)),
                            _ => Op::slot(OpCode::Noop, canonical),
                        };
                        self.set(slot, op)?;
                    }
                    slot += 1;
                }
                self.set(slot, Op::new(OpCode::FunctionEnd, i64::from(sig.ellipsis)))
            }
            TypeData::Array { item, length } => {
                let item = self.index(*item)?;
                let literal = match length {
                    ArrayLength::Open => return self.set(at, Op::slot(OpCode::OpenArray, item)),
                    ArrayLength::Unresolved => {
                        return Err(RecompileError::configuration(format!(
                            "type {} badly placed: the '...' array length can only be used \
                             on global arrays or on fields of structures",
                            pool.sort_key(ty).replace("/*...*/", "...")
                        )))
                    }
                    ArrayLength::Fixed(n) => n.to_string(),
                    ArrayLength::Expr(expr) => expr.clone(),
                };
                if self.layout.slots.get(at + 1) != Some(&Slot::Len) {
                    return Err(RecompileError::internal(format!(
                        "no length slot reserved after '{}'",
                        pool.plain_c_name(ty)
                    )));
                }
                self.set(at, Op::slot(OpCode::Array, item))?;
                self.set(at + 1, Op::literal(literal))
            }
            TypeData::StructOrUnion(_) => {
                let n = self.layout.struct_unions.get(ty).ok_or_else(|| {
                    RecompileError::internal(format!(
                        "'{}' has no struct/union number",
                        pool.plain_c_name(ty)
                    ))
                })?;
                self.set(at, Op::slot(OpCode::StructUnion, n))
            }
            TypeData::Enum(_) => {
                let n = self.layout.enums.get(ty).ok_or_else(|| {
                    RecompileError::internal(format!(
                        "'{}' has no enum number",
                        pool.plain_c_name(ty)
                    ))
                })?;
                self.set(at, Op::slot(OpCode::Enum, n))
            }
        }
    }
}
