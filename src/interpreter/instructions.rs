//! The instructions complex enough to deserve their own function rather
//! than a one-line match arm: stack-stack transfer (`{`/`}`/`u`), file
//! I/O (`i`/`o`), `=`, `y`, and `k`.

use chrono::{Datelike, Timelike};

use super::instruction_set::{dispatch, InstructionResult};
use super::ip::InstructionPointer;
use super::InterpreterEnv;
use crate::playfield::{Cell, Dialect, Playfield};

/// `{`: push a new stack, transferring the top `n` TOSS cells into it
/// (bottom-to-top, so popping the new stack reproduces them in their
/// original order) and setting its storage offset to the cell beyond the
/// IP's current position. The old offset is saved onto the *old* TOSS
/// (which becomes SOSS), not the new one, so the new TOSS holds only the
/// transferred cells.
pub fn begin_block(ip: &mut InstructionPointer, n: i64) {
    let old_offset = ip.offset;
    let next_pos = (ip.position.0 + ip.delta.0, ip.position.1 + ip.delta.1);
    let cells = if n >= 0 {
        ip.toss_mut().take_top(n as usize)
    } else {
        vec![0; (-n) as usize]
    };
    ip.toss_mut().push(old_offset.0);
    ip.toss_mut().push(old_offset.1);
    ip.push_new_stack();
    ip.toss_mut().put_top(&cells);
    ip.offset = next_pos;
}

/// `}`: discard the current TOSS, transferring its top `n` cells down onto
/// the stack beneath (restoring the storage offset that matching `{`
/// saved there). Reflects if there is no SOSS to return to.
pub fn end_block(ip: &mut InstructionPointer, n: i64) {
    if ip.soss().is_none() {
        ip.reflect();
        return;
    }
    let cells = if n >= 0 {
        ip.toss_mut().take_top(n as usize)
    } else {
        vec![0; (-n) as usize]
    };
    ip.pop_stack();
    let saved_y = ip.toss_mut().pop();
    let saved_x = ip.toss_mut().pop();
    ip.toss_mut().put_top(&cells);
    ip.offset = (saved_x, saved_y);
}

/// `u`: transfer `n` cells directly between TOSS and SOSS without
/// disturbing the stack-stack itself. Positive `n` moves from SOSS to
/// TOSS, negative from TOSS to SOSS. Reflects if there is no SOSS.
pub fn stack_under_stack(ip: &mut InstructionPointer, n: i64) {
    if ip.soss().is_none() {
        ip.reflect();
        return;
    }
    if n >= 0 {
        let cells = ip.soss_mut().unwrap().take_top(n as usize);
        ip.toss_mut().put_top(&cells);
    } else {
        let cells = ip.toss_mut().take_top((-n) as usize);
        ip.soss_mut().unwrap().put_top(&cells);
    }
}

/// `i`: read a file named by a popped 0gnirts path and lay it into the
/// playfield at a popped `(x, y)` plus a popped flags cell (bit 0: binary
/// vs linebreak-normalized text). On any failure, this implementation
/// follows the flagged compatibility choice of pushing back
/// `(x0, y0, 0, 0)` rather than reflecting, so callers can detect failure
/// without losing track of where the read was attempted.
pub fn input_file(ip: &mut InstructionPointer, field: &mut Playfield, env: &mut impl InterpreterEnv) {
    let filename = ip.pop_0gnirts();
    let (x0, y0) = (ip.pop(), ip.pop());
    let flags = ip.pop();
    let binary = flags & 1 != 0;

    if !env.have_file_input() {
        ip.push(x0);
        ip.push(y0);
        ip.push(0);
        ip.push(0);
        return;
    }

    let name = String::from_utf8_lossy(&filename).into_owned();
    match env.read_file(&name) {
        Ok(data) => {
            let text = if binary {
                data.iter().map(|&b| b as char).collect::<String>()
            } else {
                String::from_utf8_lossy(&data).replace("\r\n", "\n")
            };
            let width = text.lines().map(str::len).max().unwrap_or(0) as i64;
            let height = text.lines().count() as i64;
            field.insert_block(&text, x0, y0);
            ip.push(width);
            ip.push(height);
            ip.push(x0);
            ip.push(y0);
        }
        Err(msg) => {
            env.warn(&format!("'i': failed to read {}: {}", name, msg));
            ip.push(x0);
            ip.push(y0);
            ip.push(0);
            ip.push(0);
        }
    }
}

/// `o`: the inverse of `i` — write a rectangular region of the playfield
/// out to a named file.
pub fn output_file(ip: &mut InstructionPointer, field: &Playfield, env: &mut impl InterpreterEnv) {
    let filename = ip.pop_0gnirts();
    let (x0, y0) = (ip.pop(), ip.pop());
    let (w, h) = (ip.pop(), ip.pop());
    let flags = ip.pop();
    let binary = flags & 1 != 0;

    if !env.have_file_output() {
        ip.reflect();
        return;
    }

    let mut text = String::new();
    for dy in 0..h.max(0) {
        for dx in 0..w.max(0) {
            let v = field.get((x0 + dx, y0 + dy));
            text.push(char::from_u32(v as u32).unwrap_or(' '));
        }
        if !binary {
            text.push('\n');
        }
    }
    let name = String::from_utf8_lossy(&filename).into_owned();
    if env.write_file(&name, text.as_bytes(), false).is_err() {
        ip.reflect();
    }
}

/// `=`: hand a popped 0gnirts command line to the host for execution,
/// pushing its exit code. Reflects if execution is disabled.
pub fn execute(ip: &mut InstructionPointer, env: &mut impl InterpreterEnv) {
    if env.have_execute() == super::ExecMode::Disabled {
        ip.reflect();
        return;
    }
    let command = ip.pop_0gnirts();
    let command = String::from_utf8_lossy(&command).into_owned();
    let code = env.execute_command(&command);
    ip.push(code as Cell);
}

/// `y`: push system information. `n == 0` pushes the whole vector
/// followed by its length; `0 < n <= len` pushes just that one field
/// (1-indexed); `n` beyond the vector indexes into the IP's own stack,
/// returning the `n`-th cell from the top (for runtime introspection).
pub fn sysinfo(ip: &mut InstructionPointer, field: &Playfield, env: &mut impl InterpreterEnv) {
    let n = ip.pop();
    let vector = build_sysinfo_vector(ip, field, env);

    if n == 0 {
        for &v in vector.iter().rev() {
            ip.push(v);
        }
        ip.push(vector.len() as Cell);
    } else if n > 0 && (n as usize) <= vector.len() {
        ip.push(vector[n as usize - 1]);
    } else {
        let idx = n as usize - vector.len();
        ip.push(ip.toss().nth_from_top(idx));
    }
}

fn build_sysinfo_vector(ip: &InstructionPointer, field: &Playfield, env: &mut impl InterpreterEnv) -> Vec<Cell> {
    let mut v = Vec::new();

    let flags = 0b0001_0001i64 // bit 0: `t` supported; bit 4: IO is buffered
        | if env.have_file_input() || env.have_file_output() { 0b0000_0010 } else { 0 }
        | if env.have_execute() == super::ExecMode::Enabled { 0b0000_1000 } else { 0 };
    v.push(flags);
    v.push(std::mem::size_of::<Cell>() as Cell); // cell size, bytes
    v.push(env.handprint());
    v.push(
        pkg_version::pkg_version_major!() as Cell * 256 * 256
            + pkg_version::pkg_version_minor!() as Cell * 256
            + pkg_version::pkg_version_patch!() as Cell,
    );
    v.push(0); // implementation paradigm: plain concurrent
    v.push(std::path::MAIN_SEPARATOR as Cell);
    v.push(2); // dimensionality

    v.push(ip.id);
    v.push(0); // team number, unused

    v.push(ip.position.0);
    v.push(ip.position.1);
    v.push(ip.delta.0);
    v.push(ip.delta.1);
    v.push(ip.offset.0);
    v.push(ip.offset.1);

    let (xmin, xmax, ymin, ymax) = field.extent();
    v.push(xmin);
    v.push(ymin);
    v.push(xmax - 1);
    v.push(ymax - 1);

    let now = chrono::Local::now();
    v.push(((now.year() - 1900) as Cell) * 256 * 256 + (now.month() as Cell) * 256 + now.day() as Cell);
    v.push((now.hour() as Cell) * 256 * 256 + (now.minute() as Cell) * 256 + now.second() as Cell);

    v.push(ip.stack_count() as Cell);
    v.extend(ip.stack_sizes().into_iter().map(|s| s as Cell));

    let argv = env.argv();
    for arg in &argv {
        v.extend(arg.bytes().map(|b| b as Cell));
        v.push(0);
    }
    v.push(0);

    for (key, val) in env.env_vars() {
        v.extend(format!("{}={}", key, val).bytes().map(|b| b as Cell));
        v.push(0);
    }
    v.push(0);

    v
}

/// `k`: pop `n`, advance once to find the target instruction, then
/// execute it `n` times (zero times, i.e. skipped entirely, if `n == 0`).
/// If the target forks (`t`), every resulting IP performs the *remaining*
/// iterations independently — an iteration that forks at step `i` leaves
/// both the original and the clone to run steps `i+1..n`.
pub fn iterate(
    ip: InstructionPointer,
    field: &mut Playfield,
    env: &mut impl InterpreterEnv,
    next_id: &mut i64,
) -> InstructionResult {
    let mut ip = ip;
    ip.advance(field);
    let n = ip.pop();

    if n == 0 {
        // The target is never dispatched: returning Continue here means
        // the caller's own post-dispatch advance() steps away from it.
        return InstructionResult::Continue;
    }
    if n < 0 {
        ip.reflect();
        return InstructionResult::Continue;
    }

    let target = field.get(ip.position);
    let mut working = vec![ip];

    for _ in 0..n {
        let mut next_working = Vec::with_capacity(working.len());
        for mut cur in working {
            match dispatch(&mut cur, field, env, target, next_id) {
                InstructionResult::Continue => next_working.push(cur),
                InstructionResult::Fork(child) => {
                    next_working.push(cur);
                    next_working.push(child);
                }
                InstructionResult::Stop => {}
                InstructionResult::Exit(code) => return InstructionResult::Exit(code),
                InstructionResult::Replace(more) => next_working.extend(more),
            }
        }
        working = next_working;
        if working.is_empty() {
            break;
        }
    }

    InstructionResult::Replace(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playfield::Dialect;

    #[test]
    fn begin_end_block_round_trips() {
        let mut ip = InstructionPointer::initial(0);
        ip.push(1);
        ip.push(2);
        ip.push(3);
        begin_block(&mut ip, 2);
        assert_eq!(ip.stack_count(), 2);
        assert_eq!(ip.toss().len(), 2);
        end_block(&mut ip, 2);
        assert_eq!(ip.stack_count(), 1);
        assert_eq!(ip.pop(), 3);
        assert_eq!(ip.pop(), 2);
        assert_eq!(ip.pop(), 1);
    }

    #[test]
    fn end_block_without_soss_reflects() {
        let mut ip = InstructionPointer::initial(0);
        ip.delta = (1, 0);
        end_block(&mut ip, 0);
        assert_eq!(ip.delta, (-1, 0));
    }

    #[test]
    fn stack_under_stack_moves_cells_between_toss_and_soss() {
        let mut ip = InstructionPointer::initial(0);
        ip.push(1);
        ip.push(2);
        ip.push_new_stack();
        ip.toss_mut().push(9);
        stack_under_stack(&mut ip, 1);
        assert_eq!(ip.toss().len(), 2);
        assert_eq!(ip.pop(), 2);
        assert_eq!(ip.pop(), 9);
    }

    #[test]
    fn iterate_zero_skips_target_entirely() {
        let mut field = Playfield::new(Dialect::B98);
        field.insert_block("0k1.", 0, 0);
        let mut ip = InstructionPointer::initial(0);
        ip.advance(&field); // land on '0'
        assert_eq!(field.get(ip.position), b'0' as Cell);
        ip.push(0); // what '0' would push, simulated directly for the test
        ip.advance(&field); // land on 'k'
        assert_eq!(field.get(ip.position), b'k' as Cell);
        let mut next_id = 1i64;
        struct NullEnv(Vec<u8>);
        impl InterpreterEnv for NullEnv {
            fn output_writer(&mut self) -> &mut dyn std::io::Write {
                &mut self.0
            }
            fn input_source(&mut self) -> &mut dyn crate::input::InputSource {
                unimplemented!()
            }
        }
        let mut env = NullEnv(Vec::new());
        let result = iterate(ip, &mut field, &mut env, &mut next_id);
        match result {
            InstructionResult::Continue => {}
            other => panic!("expected Continue, got {:?}", other),
        }
    }
}
