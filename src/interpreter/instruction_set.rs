//! Opcode dispatch: one cell in, zero or more IPs out.

use super::instructions;
use super::ip::InstructionPointer;
use super::motion::{self, DOWN, LEFT, RIGHT, UP};
use super::InterpreterEnv;
use crate::playfield::{Cell, Dialect, Playfield};

#[derive(Debug)]
pub enum InstructionResult {
    /// The instruction is done; the caller should call `ip.advance()`
    /// next.
    Continue,
    /// `t`, or `k` iterating a forking target: a new IP (already
    /// positioned by its own advance) joins the running set.
    Fork(InstructionPointer),
    /// `@`: this IP terminates.
    Stop,
    /// `q`: the whole program terminates with this exit code.
    Exit(i32),
    /// `k`: the current IP slot is replaced by zero or more IPs, already
    /// fully positioned — the caller must not advance them again.
    Replace(Vec<InstructionPointer>),
}

/// Dispatch a single opcode for `ip`. Does not call `ip.advance()` —
/// that's the caller's job once it knows whether a plain `Continue`
/// applies (see [`InstructionResult`]). This split is what lets `k`
/// reuse this exact function to drive its own repeated, un-advanced
/// iterations.
pub fn dispatch(
    ip: &mut InstructionPointer,
    field: &mut Playfield,
    env: &mut impl InterpreterEnv,
    opcode: Cell,
    next_id: &mut i64,
) -> InstructionResult {
    if ip.string_mode {
        exec_string_mode(ip, opcode);
        return InstructionResult::Continue;
    }

    let dialect = field.dialect();
    let is_b98_only = matches!(
        opcode as u8 as char,
        '[' | ']' | '\'' | '{' | '}' | '=' | '(' | ')' | 'i' | 'j' | 'k' | 'n' | 'o' | 'q' | 's' | 't'
            | 'u' | 'w' | 'x' | 'y' | 'z'
    );
    if dialect == Dialect::B93 && is_b98_only {
        unknown_opcode(ip, env, opcode);
        return InstructionResult::Continue;
    }

    match opcode as u8 as char {
        '0'..='9' => ip.push(opcode - b'0' as Cell),
        'a'..='f' => ip.push(opcode - b'a' as Cell + 10),

        '+' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push(a + b);
        }
        '-' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push(a - b);
        }
        '*' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push(a * b);
        }
        '/' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push(if b == 0 { 0 } else { a / b });
        }
        '%' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push(if b == 0 { 0 } else { a % b });
        }
        '!' => {
            let v = ip.pop();
            ip.push((v == 0) as Cell);
        }
        '`' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.push((a > b) as Cell);
        }

        '>' => ip.delta = RIGHT,
        '<' => ip.delta = LEFT,
        '^' => ip.delta = UP,
        'v' => ip.delta = DOWN,
        '?' => ip.delta = motion::random_delta(),
        '[' => ip.delta = motion::turn_left(ip.delta),
        ']' => ip.delta = motion::turn_right(ip.delta),
        'w' => {
            let (a, b) = ip.toss_mut().pop_pair();
            ip.delta = motion::compare_turn(ip.delta, a, b);
        }
        '_' => {
            let v = ip.pop();
            ip.delta = if v == 0 { RIGHT } else { LEFT };
        }
        '|' => {
            let v = ip.pop();
            ip.delta = if v == 0 { DOWN } else { UP };
        }
        'x' => {
            let dy = ip.pop();
            let dx = ip.pop();
            ip.delta = (dx, dy);
        }

        ':' => ip.toss_mut().duplicate_top(),
        '\\' => ip.toss_mut().swap_top_two(),
        '$' => {
            ip.pop();
        }

        '"' => ip.string_mode = true,

        '.' => {
            let v = ip.pop();
            let _ = write!(env.output_writer(), "{} ", v);
        }
        ',' => {
            let v = ip.pop();
            let ch = char::from_u32(v as u32 & 0xff).unwrap_or('\u{fffd}');
            let _ = write!(env.output_writer(), "{}", ch);
        }
        '&' => match env.input_source().read_int() {
            Some(v) => ip.push(v),
            None => ip.reflect(),
        },
        '~' => match env.input_source().read_char() {
            Some(v) => ip.push(v),
            None => ip.reflect(),
        },

        '#' => ip.position = field.step_once(ip.position, ip.delta),
        '\'' => {
            ip.position = field.step_once(ip.position, ip.delta);
            let v = field.get(ip.position);
            ip.push(v);
        }
        's' => {
            ip.position = field.step_once(ip.position, ip.delta);
            let v = ip.pop();
            field.set(ip.position, v);
        }

        'g' => {
            let dy = ip.pop();
            let dx = ip.pop();
            let v = field.get((ip.offset.0 + dx, ip.offset.1 + dy));
            ip.push(v);
        }
        'p' => {
            let dy = ip.pop();
            let dx = ip.pop();
            let v = ip.pop();
            field.set((ip.offset.0 + dx, ip.offset.1 + dy), v);
        }

        'j' => {
            let n = ip.pop();
            if n >= 0 {
                for _ in 0..n {
                    ip.position = field.step_once(ip.position, ip.delta);
                }
            } else {
                ip.reflect();
                for _ in 0..(-n) {
                    ip.position = field.step_once(ip.position, ip.delta);
                }
                ip.reflect();
            }
        }

        '{' => {
            let n = ip.pop();
            instructions::begin_block(ip, n);
        }
        '}' => {
            let n = ip.pop();
            instructions::end_block(ip, n);
        }
        'u' => {
            let n = ip.pop();
            instructions::stack_under_stack(ip, n);
        }

        'i' => instructions::input_file(ip, field, env),
        'o' => instructions::output_file(ip, field, env),
        '=' => instructions::execute(ip, env),
        'y' => instructions::sysinfo(ip, field, env),

        'n' => {
            ip.toss_mut().clear();
        }
        'z' => {} // no-op

        't' => {
            let id = *next_id;
            *next_id += 1;
            let mut child = ip.clone_with_id(id);
            child.reflect();
            child.advance(field);
            return InstructionResult::Fork(child);
        }

        'k' => {
            let taken = std::mem::replace(ip, InstructionPointer::initial(-1));
            return instructions::iterate(taken, field, env, next_id);
        }

        '(' => {
            let count = ip.pop();
            for _ in 0..count.max(0) {
                ip.pop();
            }
            ip.reflect();
        }
        ')' => {
            let count = ip.pop();
            for _ in 0..count.max(0) {
                ip.pop();
            }
        }

        '@' => return InstructionResult::Stop,
        'q' => {
            let code = ip.pop();
            return InstructionResult::Exit(code as i32);
        }

        ' ' => {} // no stack effect; in b98 `advance()` never actually lands here
        ';' => {
            // Only reachable in b93 (b98's advance() always skips `;`
            // before dispatch sees it); b93 has no comment syntax, so a
            // bare `;` is simply an unrecognized opcode.
            unknown_opcode(ip, env, opcode);
        }

        _ => unknown_opcode(ip, env, opcode),
    }

    InstructionResult::Continue
}

fn unknown_opcode(ip: &mut InstructionPointer, env: &mut impl InterpreterEnv, opcode: Cell) {
    let ch = char::from_u32(opcode as u32).unwrap_or('\u{fffd}');
    env.warn(&format!("unknown instruction '{}' ({})", ch, opcode));
    ip.reflect();
}

/// String-mode dispatch: push the opcode verbatim (closing the mode on
/// `"`). The caller's post-dispatch `advance()` does the actual
/// movement — this function must never move the IP itself. In b98, a
/// whole run of spaces was already collapsed into this single cell by
/// the *previous* `advance()` call (see `advance_string_b98`), so one
/// push here is already the entire SGML-style space-run representation;
/// b93 never collapses runs, so every space cell reaches here on its own
/// and is pushed individually with no special handling needed.
fn exec_string_mode(ip: &mut InstructionPointer, opcode: Cell) {
    if opcode as u8 as char == '"' {
        ip.string_mode = false;
        return;
    }
    ip.push(opcode);
}

use std::io::Write as _;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{BufferedInput, InputSource};
    use std::io::Write;

    struct TestEnv {
        out: Vec<u8>,
        input: Box<dyn InputSource>,
        warnings: Vec<String>,
    }

    impl InterpreterEnv for TestEnv {
        fn output_writer(&mut self) -> &mut dyn Write {
            &mut self.out
        }
        fn input_source(&mut self) -> &mut dyn InputSource {
            &mut *self.input
        }
        fn warn(&mut self, msg: &str) {
            self.warnings.push(msg.to_string());
        }
    }

    fn env_with_input(args: &[&str]) -> TestEnv {
        TestEnv {
            out: Vec::new(),
            input: Box::new(BufferedInput::from_args(
                &args.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            )),
            warnings: Vec::new(),
        }
    }

    fn run_program(src: &str, dialect: Dialect, args: &[&str]) -> (String, i32) {
        use crate::interpreter::Interpreter;
        let mut field = Playfield::new(dialect);
        field.insert_block(src, 0, 0);
        let env = env_with_input(args);
        let mut interp = Interpreter::new(field, env);
        let result = interp.run();
        let crate::interpreter::ProgramResult::Done(code) = result;
        (String::from_utf8_lossy(&interp.env.out).into_owned(), code)
    }

    #[test]
    fn hello_world() {
        // Pushing the reversed string leaves the first character on top,
        // so 13 plain `,` pops print it back in the right order.
        let (out, code) =
            run_program(r#""!dlrow ,olleH",,,,,,,,,,,,,@"#, Dialect::B98, &[]);
        assert_eq!(out, "Hello, world!");
        assert_eq!(code, 0);
    }

    #[test]
    fn b98_string_mode_collapses_space_run_to_one_cell() {
        // Quoted text is encountered 'b', three spaces, 'a'; pushing in
        // that order leaves 'a' on top, so the three trailing `,` print
        // "a b" — one space, not three and not zero.
        let (out, _) = run_program(r#""b   a",,,@"#, Dialect::B98, &[]);
        assert_eq!(out, "a b");
    }

    #[test]
    fn arithmetic_and_output() {
        let (out, _) = run_program("55+.@", Dialect::B98, &[]);
        assert_eq!(out, "10 ");
    }

    #[test]
    fn division_and_modulo_by_zero_push_zero() {
        let (out, _) = run_program("50/.50%.@", Dialect::B98, &[]);
        assert_eq!(out, "0 0 ");
    }

    #[test]
    fn b93_semicolon_is_unknown_and_reflects() {
        let (_out, code) = run_program("1;@", Dialect::B93, &[]);
        assert_eq!(code, 0);
    }

    #[test]
    fn q_exits_with_popped_code() {
        let (_out, code) = run_program("7q", Dialect::B98, &[]);
        assert_eq!(code, 7);
    }
}
