//! The interpreter core: the tick/run scheduler and the host-facing
//! [`InterpreterEnv`] trait the CLI front-end and tests implement.

pub mod instruction_set;
mod instructions;
pub mod ip;
pub mod motion;

use std::io::{self, Write};

use crate::input::InputSource;
use crate::playfield::{Cell, Playfield};
use instruction_set::{dispatch, InstructionResult};
use ip::InstructionPointer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOMode {
    Text,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramResult {
    Done(i32),
}

/// How the interpreter should be driven: straight through, or one step at
/// a time under the debugger.
pub enum RunMode {
    Run,
    Debug { steps_per_second: Option<f64> },
}

/// Everything the core needs from its host: where output goes, where
/// input comes from, and what capabilities (files, subprocesses) are
/// available. Mirrors the shape of a traditional Funge-98 host
/// environment trait, but over blocking `std::io` rather than an async
/// runtime — this interpreter has no use for concurrent I/O interleaving
/// beyond the single-threaded, one-instruction-per-IP-per-tick scheduler
/// already described by the concurrency model.
pub trait InterpreterEnv {
    fn get_iomode(&self) -> IOMode {
        IOMode::Text
    }

    fn output_writer(&mut self) -> &mut dyn Write;
    fn input_source(&mut self) -> &mut dyn InputSource;

    /// Non-fatal diagnostic from the core (e.g. "unknown instruction").
    /// The core never panics or writes to stderr directly; this is the
    /// only channel.
    fn warn(&mut self, _msg: &str) {}

    /// The `y` sysinfo handprint (field 3): an identifier for this
    /// implementation, packed the way `get_info` expects.
    fn handprint(&self) -> i64 {
        "wpfunge"
            .bytes()
            .enumerate()
            .map(|(i, b)| (b as i64) << (8 * i))
            .sum()
    }

    fn have_file_input(&self) -> bool {
        false
    }
    fn have_file_output(&self) -> bool {
        false
    }
    fn have_execute(&self) -> ExecMode {
        ExecMode::Disabled
    }

    fn read_file(&mut self, _filename: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "file input disabled"))
    }

    fn write_file(&mut self, _filename: &str, _data: &[u8], _append: bool) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "file output disabled"))
    }

    fn execute_command(&mut self, _command: &str) -> i32 {
        -1
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn argv(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The running program: the playfield, the live instruction pointers, and
/// the host environment they talk to.
pub struct Interpreter<Env: InterpreterEnv> {
    pub playfield: Playfield,
    pub ips: Vec<InstructionPointer>,
    pub env: Env,
    pub step_count: u64,
    next_id: i64,
    terminated: Option<i32>,
}

impl<Env: InterpreterEnv> Interpreter<Env> {
    pub fn new(playfield: Playfield, env: Env) -> Self {
        let mut ip = InstructionPointer::initial(0);
        ip.advance(&playfield);
        Self {
            playfield,
            ips: vec![ip],
            env,
            step_count: 0,
            next_id: 1,
            terminated: None,
        }
    }

    pub fn terminated(&self) -> Option<i32> {
        self.terminated
    }

    /// Run one tick: every live IP executes exactly one instruction, in
    /// order. Returns `Some` once the program has terminated (all IPs
    /// gone, or `q` fired); `None` to keep going.
    pub fn tick(&mut self) -> Option<ProgramResult> {
        if let Some(code) = self.terminated {
            return Some(ProgramResult::Done(code));
        }
        if self.ips.is_empty() {
            self.terminated = Some(0);
            return Some(ProgramResult::Done(0));
        }
        self.step_count += 1;
        let current = std::mem::take(&mut self.ips);
        let mut next = Vec::with_capacity(current.len());
        for mut ip in current {
            if self.terminated.is_some() {
                break;
            }
            let opcode: Cell = self.playfield.get(ip.position);
            match dispatch(&mut ip, &mut self.playfield, &mut self.env, opcode, &mut self.next_id) {
                InstructionResult::Continue => {
                    ip.advance(&self.playfield);
                    next.push(ip);
                }
                InstructionResult::Fork(child) => {
                    ip.advance(&self.playfield);
                    next.push(ip);
                    next.push(child);
                }
                InstructionResult::Stop => {}
                InstructionResult::Exit(code) => {
                    self.terminated = Some(code);
                }
                InstructionResult::Replace(ips) => {
                    next.extend(ips);
                }
            }
        }
        self.ips = next;
        if let Some(code) = self.terminated {
            return Some(ProgramResult::Done(code));
        }
        if self.ips.is_empty() {
            self.terminated = Some(0);
            return Some(ProgramResult::Done(0));
        }
        None
    }

    /// Run to completion.
    pub fn run(&mut self) -> ProgramResult {
        loop {
            if let Some(result) = self.tick() {
                return result;
            }
        }
    }
}
