//! cffi recompiler: C interface model → type table + C extension source.
//!
//! Given a parsed [`Ffi`](cffi_model::Ffi), the recompiler produces:
//!
//! 1. **`_cffi_types[]`**: a bytecode table describing every reachable C
//!    type by slot index, read by the runtime loader
//! 2. **Thunks**: per-declaration C wrappers and constant getters
//! 3. **Descriptor arrays**: globals, fields, struct/unions, enums and
//!    typenames, bundled into one `_cffi_type_context`
//! 4. **Entry points**: the module init function for each runtime flavor
//!
//! # Architecture
//!
//! ```text
//! Ffi
//!  ↓
//! Collector        (discover types, lay out slots)
//!  ↓
//! emit_bytecode    (fill slots → TypeTable)
//!  ↓
//! DeclEmitter      (C thunks)
//!  ↓
//! CtxBuilder       (descriptor rows, sorted and checked)
//!  ↓
//! write_if_changed (idempotent output)
//! ```
//!
//! Compilation is all-or-nothing: the complete source is built in memory
//! before anything touches the disk.
//!
//! # Tracing
//!
//! Phases are instrumented with `tracing`. Call [`init_tracing`] and set
//! `RUST_LOG=cffi_recompiler=debug` to see slot counts and row counts.

mod aggregate;
mod collect;
mod emit;
mod error;
mod flags;
mod lengths;
mod opcode;
mod options;
mod output;
mod phase;
mod rows;
mod source;
mod table;
mod thunk;
mod writer;

use std::sync::Once;

pub use error::{RecompileError, RecompileResult};
pub use flags::StructFlags;
pub use opcode::{Op, OpCode};
pub use options::{RecompilerOptions, DEFAULT_RUNTIME_HEADER};
pub use output::{make_c_source, recompile, write_if_changed, WriteOutcome};
pub use source::Recompiler;
pub use table::{AggregateIndex, TypeTable};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset; safe to call repeatedly.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
