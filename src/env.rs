//! The command-line host environment: stdout/stdin, the working
//! directory's files, and (optionally) subprocess execution.

use std::env;
use std::fs;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;

use crate::input::{BufferedInput, InputSource, InteractiveInput};
use crate::interpreter::{ExecMode, InterpreterEnv};

/// Which [`InputSource`] `&`/`~` should draw from: the program's own
/// command-line arguments, or the real, blocking terminal.
pub enum InputMode {
    Args(Vec<String>),
    Interactive,
}

pub struct CmdLineEnv {
    stdout: Stdout,
    input: Box<dyn InputSource>,
    working_dir: PathBuf,
    warn: bool,
    allow_files: bool,
    allow_execute: bool,
    argv: Vec<String>,
}

impl CmdLineEnv {
    pub fn new(input_mode: InputMode, warn: bool, allow_files: bool, allow_execute: bool) -> Self {
        let argv = match &input_mode {
            InputMode::Args(args) => args.clone(),
            InputMode::Interactive => Vec::new(),
        };
        let input: Box<dyn InputSource> = match input_mode {
            InputMode::Args(args) => Box::new(BufferedInput::from_args(&args)),
            InputMode::Interactive => Box::new(InteractiveInput::new()),
        };
        Self {
            stdout: io::stdout(),
            input,
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            warn,
            allow_files,
            allow_execute,
            argv,
        }
    }
}

impl InterpreterEnv for CmdLineEnv {
    fn output_writer(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }

    fn input_source(&mut self) -> &mut dyn InputSource {
        &mut *self.input
    }

    fn warn(&mut self, msg: &str) {
        if self.warn {
            eprintln!("wpfunge: {}", msg);
        }
    }

    fn have_file_input(&self) -> bool {
        self.allow_files
    }

    fn have_file_output(&self) -> bool {
        self.allow_files
    }

    fn have_execute(&self) -> ExecMode {
        if self.allow_execute {
            ExecMode::Enabled
        } else {
            ExecMode::Disabled
        }
    }

    fn read_file(&mut self, filename: &str) -> io::Result<Vec<u8>> {
        fs::read(self.working_dir.join(filename))
    }

    fn write_file(&mut self, filename: &str, data: &[u8], append: bool) -> io::Result<()> {
        use std::fs::OpenOptions;
        let path = self.working_dir.join(filename);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        file.write_all(data)
    }

    fn execute_command(&mut self, command: &str) -> i32 {
        use std::process::Command;
        let shell = if cfg!(windows) { "cmd" } else { "sh" };
        let flag = if cfg!(windows) { "/C" } else { "-c" };
        Command::new(shell)
            .arg(flag)
            .arg(command)
            .status()
            .ok()
            .and_then(|status| status.code())
            .unwrap_or(-1)
    }

    fn env_vars(&self) -> Vec<(String, String)> {
        env::vars().collect()
    }

    fn argv(&self) -> Vec<String> {
        self.argv.clone()
    }
}
