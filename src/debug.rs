//! A minimal single-step debugger: renders the playfield, the live IPs,
//! and the output produced so far, then either waits for a keypress or
//! sleeps for a fixed interval before the next tick.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, ExecutableCommand};

use crate::interpreter::{Interpreter, InterpreterEnv, ProgramResult};

/// Run `interpreter` under the debugger until it terminates.
///
/// `steps_per_second`: `None` steps once per keypress; `Some(rate)` steps
/// automatically at that rate (any key still quits early by letting the
/// program run to completion without further pauses).
pub fn run<Env: InterpreterEnv>(
    interpreter: &mut Interpreter<Env>,
    steps_per_second: Option<f64>,
) -> io::Result<ProgramResult> {
    let mut stdout = io::stdout();
    execute!(stdout, Hide)?;
    let result = drive(interpreter, steps_per_second, &mut stdout);
    execute!(stdout, Show)?;
    result
}

fn drive<Env: InterpreterEnv>(
    interpreter: &mut Interpreter<Env>,
    steps_per_second: Option<f64>,
    stdout: &mut io::Stdout,
) -> io::Result<ProgramResult> {
    loop {
        render(interpreter, stdout)?;
        match steps_per_second {
            None => {
                wait_for_keypress()?;
            }
            Some(rate) if rate > 0.0 => {
                thread::sleep(Duration::from_secs_f64(1.0 / rate));
            }
            Some(_) => {
                wait_for_keypress()?;
            }
        }
        if let Some(result) = interpreter.tick() {
            render(interpreter, stdout)?;
            return Ok(result);
        }
    }
}

fn wait_for_keypress() -> io::Result<()> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.code != KeyCode::Null {
                return Ok(());
            }
        }
    }
}

fn render<Env: InterpreterEnv>(interpreter: &Interpreter<Env>, stdout: &mut io::Stdout) -> io::Result<()> {
    stdout.execute(Clear(ClearType::All))?;
    execute!(stdout, MoveTo(0, 0))?;
    write!(stdout, "{}", interpreter.playfield.render())?;
    writeln!(stdout)?;
    writeln!(stdout, "step {}  ips: {}", interpreter.step_count, interpreter.ips.len())?;
    for ip in &interpreter.ips {
        writeln!(
            stdout,
            "  ip {}: pos={:?} delta={:?} stacks={}",
            ip.id,
            ip.position,
            ip.delta,
            ip.stack_count()
        )?;
    }
    stdout.flush()
}
