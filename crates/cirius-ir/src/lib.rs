//! cirius-ir - Three-address intermediate representation.
//!
//! The IR is a flat ordered list of instruction records; control flow is
//! expressed only through `LABEL`, `GOTO`, and `IF_FALSE_GOTO`. Lowering
//! guarantees that every jump target appears exactly once as a label and
//! that every temporary is assigned before it is read, in linear order.
//! The optimizer rewrites the list in place and both back-end passes are
//! plain functions over it.

mod instr;
mod lower;
mod opt;

pub use instr::{Instr, Op, Operand};
pub use lower::lower;
pub use opt::optimize;
