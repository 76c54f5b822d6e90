//! End-to-end scenarios exercising the interpreter through its public
//! surface: playfield construction, the scheduler, and a minimal in-memory
//! host environment.

use std::io::Write;

use wpfunge::input::{BufferedInput, InputSource};
use wpfunge::interpreter::{Interpreter, InterpreterEnv, ProgramResult};
use wpfunge::playfield::Dialect;
use wpfunge::Playfield;

struct TestEnv {
    out: Vec<u8>,
    input: Box<dyn InputSource>,
}

impl TestEnv {
    fn new(args: &[&str]) -> Self {
        Self {
            out: Vec::new(),
            input: Box::new(BufferedInput::from_args(
                &args.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            )),
        }
    }
}

impl InterpreterEnv for TestEnv {
    fn output_writer(&mut self) -> &mut dyn Write {
        &mut self.out
    }
    fn input_source(&mut self) -> &mut dyn InputSource {
        &mut *self.input
    }
}

fn run(field: Playfield, args: &[&str]) -> (String, i32) {
    let env = TestEnv::new(args);
    let mut interp = Interpreter::new(field, env);
    let ProgramResult::Done(code) = interp.run();
    (String::from_utf8_lossy(&interp.env.out).into_owned(), code)
}

fn run_line(src: &str, dialect: Dialect, args: &[&str]) -> (String, i32) {
    let mut field = Playfield::new(dialect);
    field.insert_block(src, 0, 0);
    run(field, args)
}

#[test]
fn hello_world_b93() {
    // `64+` pushes the newline (10) printed at the very end; the quoted
    // text is the message in reverse so popping it front-to-back prints it
    // forwards; `:#,_@` bounces between the comma and the duplicate-check
    // until the stack (and the trailing newline sentinel) is exhausted.
    let (out, code) = run_line(r#"64+"!dlroW ,olleH">:#,_@"#, Dialect::B93, &[]);
    assert_eq!(out, "Hello, World!\n");
    assert_eq!(code, 0);
}

#[test]
fn factorial_via_ampersand_input() {
    // Reads n, then builds [n, n-1, n-2, n-3, n-4] via repeated
    // duplicate-and-decrement, and folds it down to n! with four
    // multiplications.
    let (out, _) = run_line("&:1-:1-:1-:1-****.@", Dialect::B98, &["5"]);
    assert_eq!(out, "120 ");
}

#[test]
fn self_modifying_p_then_g() {
    // Writes 'A' to (2,5), reads it straight back and prints it, then
    // overwrites the same cell with '?' and shows the next `g` observes
    // the new value rather than a stale one.
    let (out, _) = run_line(r#""A"25p25g,"?"25p25g,@"#, Dialect::B98, &[]);
    assert_eq!(out, "A?");
}

#[test]
fn stack_stack_round_trip() {
    // Pushes 1,2,3; '3{' moves all three onto a fresh stack (plus the
    // saved storage offset); '3}' moves them straight back, restoring the
    // original layout with 3 on top.
    let (out, _) = run_line("1233{3}...@", Dialect::B98, &[]);
    assert_eq!(out, "3 2 1 ");
}

#[test]
fn split_runs_both_branches() {
    let mut field = Playfield::new(Dialect::B98);
    field.insert_block("@.1t1.@", -3, 0);
    let (out, code) = run(field, &[]);
    assert_eq!(out, "1 1 ");
    assert_eq!(code, 0);
}

#[test]
fn sysinfo_field_seven_is_dimensionality() {
    let (out, _) = run_line("7y.@", Dialect::B98, &[]);
    assert_eq!(out, "2 ");
}
