//! Source generation.
//!
//! # Architecture
//!
//! ```text
//! Ffi ──clone pool──► collecttype ──► Layout ──► emit ──► TypeTable
//!                                                             │
//!          ┌──────────────────────────────────────────────────┘
//!          ▼
//!   header + preamble ─► _cffi_types[] ─► decl (thunks) ─► ctx (rows)
//!          ─► _cffi_includes[] ─► _cffi_type_context ─► init functions
//! ```
//!
//! The whole file is built in memory; nothing is written until every phase
//! has succeeded.

use cffi_model::{Ffi, TypePool};

use crate::collect::Collector;
use crate::emit::emit_bytecode;
use crate::phase::{each_declaration, Phase, Session};
use crate::rows::{CtxBuilder, RowKind, Rows};
use crate::table::TypeTable;
use crate::thunk::DeclEmitter;
use crate::writer::CWriter;
use crate::{RecompileError, RecompileResult, RecompilerOptions};

const SEPARATOR: &str = "/************************************************************/";

/// Version handshake value stored by the PyPy entry point.
const PYPY_ABI_VERSION: &str = "0x10000f0";

/// Compiles one [`Ffi`] into C source.
///
/// The recompiler works on its own copy of the type pool: resolving `...`
/// array lengths adds nodes, and the caller's model must stay untouched
/// whether or not compilation succeeds.
pub struct Recompiler<'a> {
    ffi: &'a Ffi,
    options: RecompilerOptions,
    pool: TypePool,
    table: Option<TypeTable>,
}

impl<'a> Recompiler<'a> {
    pub fn new(ffi: &'a Ffi, options: RecompilerOptions) -> Self {
        Self {
            ffi,
            options,
            pool: ffi.pool.clone(),
            table: None,
        }
    }

    pub fn options(&self) -> &RecompilerOptions {
        &self.options
    }

    /// Discover every reachable type and build the type table.
    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.options.module_name))]
    pub fn collect_type_table(&mut self) -> RecompileResult<&TypeTable> {
        let mut collector = Collector::new(self.ffi, &mut self.pool);
        each_declaration(self.ffi, Phase::CollectType, |decl| {
            collector.declaration(decl)
        })?;
        let layout = collector.layout()?;
        let table = emit_bytecode(&self.pool, layout)?;
        tracing::debug!(slots = table.len(), types = table.type_count(), "type table built");
        Ok(self.table.insert(table))
    }

    /// The table built by the last [`Self::collect_type_table`].
    pub fn type_table(&self) -> Option<&TypeTable> {
        self.table.as_ref()
    }

    /// The complete C source, collecting the type table first if needed.
    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.options.module_name))]
    pub fn generate(&mut self) -> RecompileResult<String> {
        if self.table.is_none() {
            self.collect_type_table()?;
        }
        let Some(table) = self.table.as_ref() else {
            return Err(RecompileError::internal("type table missing after collection"));
        };
        let session = Session {
            ffi: self.ffi,
            pool: &self.pool,
            table,
            options: &self.options,
        };
        let source = write_source(&session)?;
        tracing::debug!(bytes = source.len(), "source generated");
        Ok(source)
    }
}

fn write_source(session: &Session<'_>) -> RecompileResult<String> {
    let options = session.options;
    let mut out = CWriter::new();

    out.line(format!("#include \"{}\"", options.runtime_header));
    out.newline();

    out.line(SEPARATOR);
    out.newline();
    out.line(&options.preamble);
    out.newline();
    out.line(SEPARATOR);
    out.newline();

    write_type_table(&mut out, session);

    let mut decls = DeclEmitter::new(session, &mut out);
    each_declaration(session.ffi, Phase::Decl, |decl| decls.declaration(decl))?;

    let mut ctx = CtxBuilder::new(session);
    each_declaration(session.ffi, Phase::Ctx, |decl| ctx.declaration(decl))?;
    let rows = ctx.finish()?;
    write_rows(&mut out, &rows);

    let has_includes = write_includes(&mut out, session)?;
    write_type_context(&mut out, session, &rows, has_includes);
    write_init(&mut out, options);

    Ok(out.take_output())
}

/// `static void *_cffi_types[]`, one commented line per slot.
fn write_type_table(out: &mut CWriter, session: &Session<'_>) {
    let table = session.table;
    out.line("static void *_cffi_types[] = {");
    let owners = table.canonical_types();
    for (i, (op, owner)) in table.ops().iter().zip(owners).enumerate() {
        let comment = owner.map_or_else(String::new, |ty| {
            format!(" // {}", session.pool.plain_c_name(ty))
        });
        out.line(format!("/* {i:>2} */ {},{comment}", op.as_c_expr()));
    }
    if table.is_empty() {
        out.line("  0");
    }
    out.line("};");
    out.newline();
}

/// The non-empty descriptor arrays.
fn write_rows(out: &mut CWriter, rows: &Rows) {
    for kind in RowKind::ALL {
        let list = rows.get(kind);
        if list.is_empty() {
            continue;
        }
        let name = kind.name();
        out.line(format!(
            "static const struct _cffi_{name}_s _cffi_{name}s[] = {{"
        ));
        for row in list {
            out.line(row);
        }
        // Only `#define`s: the array itself still needs one element.
        if list.iter().all(|row| row.starts_with('#')) {
            out.line("  { 0 }");
        }
        out.line("};");
        out.newline();
    }
}

/// `_cffi_includes[]`, naming the modules of included units.
fn write_includes(out: &mut CWriter, session: &Session<'_>) -> RecompileResult<bool> {
    let includes = session.ffi.includes();
    if includes.is_empty() {
        return Ok(false);
    }
    out.line("static const char * const _cffi_includes[] = {");
    for unit in includes {
        let Some(module) = &unit.module_name else {
            return Err(RecompileError::configuration(format!(
                "this ffi includes {}, but the latter has not been turned into a C module",
                unit.label
            )));
        };
        out.line(format!("  \"{module}\","));
    }
    out.line("  NULL");
    out.line("};");
    out.newline();
    Ok(true)
}

fn write_type_context(out: &mut CWriter, session: &Session<'_>, rows: &Rows, has_includes: bool) {
    out.line("static const struct _cffi_type_context_s _cffi_type_context = {");
    out.line("  _cffi_types,");
    for kind in RowKind::ALL {
        let name = kind.name();
        if rows.get(kind).is_empty() {
            out.line(format!("  NULL,  /* no {name}s */"));
        } else {
            out.line(format!("  _cffi_{name}s,"));
        }
    }
    for kind in RowKind::ALL {
        if kind != RowKind::Field {
            out.line(format!(
                "  {},  /* num_{}s */",
                rows.get(kind).len(),
                kind.name()
            ));
        }
    }
    if has_includes {
        out.line("  _cffi_includes,");
    } else {
        out.line("  NULL,  /* no includes */");
    }
    out.line(format!("  {},  /* num_types */", session.table.len()));
    out.line("  0,  /* flags */");
    out.line("};");
    out.newline();
}

/// Module entry points for PyPy, CPython 3 and CPython 2.
fn write_init(out: &mut CWriter, options: &RecompilerOptions) {
    let base = options.base_module_name();
    let module = &options.module_name;
    out.line("#ifdef PYPY_VERSION");
    out.line("PyMODINIT_FUNC");
    out.line(format!("_cffi_pypyinit_{base}(const void *p[])"));
    out.line("{");
    out.line(format!("    p[0] = (const void *){PYPY_ABI_VERSION};"));
    out.line("    p[1] = &_cffi_type_context;");
    out.line("}");
    out.line("#elif PY_MAJOR_VERSION >= 3");
    out.line("PyMODINIT_FUNC");
    out.line(format!("PyInit_{base}(void)"));
    out.line("{");
    out.line("  if (_cffi_init() < 0)");
    out.line("    return NULL;");
    out.line(format!(
        "  return _cffi_init_module(\"{module}\", &_cffi_type_context);"
    ));
    out.line("}");
    out.line("#else");
    out.line("PyMODINIT_FUNC");
    out.line(format!("init{base}(void)"));
    out.line("{");
    out.line("  if (_cffi_init() < 0)");
    out.line("    return;");
    out.line(format!("  _cffi_init_module(\"{module}\", &_cffi_type_context);"));
    out.line("}");
    out.line("#endif");
}
