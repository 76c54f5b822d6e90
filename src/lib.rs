//! A Befunge-93 / Funge-98 interpreter.
//!
//! [`playfield`] is the 2D program store, [`stack`] the per-IP value stack,
//! [`interpreter`] the instruction pointer, dispatch, and scheduler, and
//! [`env`]/[`debug`] the CLI host adapters built on top of the core.

pub mod debug;
pub mod env;
pub mod input;
pub mod interpreter;
pub mod playfield;
pub mod stack;

pub use env::{CmdLineEnv, InputMode};
pub use interpreter::{ExecMode, IOMode, Interpreter, InterpreterEnv, ProgramResult, RunMode};
pub use playfield::{strip_shebang, Dialect, Playfield};
