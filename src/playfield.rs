//! The 2D program store: a sparse mapping from integer coordinates to cells,
//! with the extent (tight bounding box) and dialect-specific wrap rules
//! described in the interpreter design.

use hashbrown::HashMap;

/// A signed integer cell. Funge-98 cells are conventionally the width of a
/// native word; we fix that at 64 bits rather than carrying the generic
/// cell-width machinery the teacher crate built for un/be/trefunge.
pub type Cell = i64;

/// A playfield coordinate.
pub type Pos = (i64, i64);

pub const SPACE: Cell = 0x20;
const SEMICOLON: Cell = b';' as Cell;
/// Substitute glyph used by [`Playfield::render`] for non-printable cells.
const RENDER_SUBSTITUTE: char = '\u{a4}';

/// Which dialect of the language a playfield (and the interpreter built
/// around it) is running. Fixed for the lifetime of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// The 1993 dialect: fixed 80x25 torus, no line comments, no
    /// string-space collapsing.
    B93,
    /// The 1998 dialect: unbounded sparse playfield, Lahey-space wrap,
    /// `;` line comments, SGML-style string spaces.
    B98,
}

const B93_WIDTH: i64 = 80;
const B93_HEIGHT: i64 = 25;

/// The 2D program store.
pub struct Playfield {
    dialect: Dialect,
    cells: HashMap<Pos, Cell>,
    xmin: i64,
    xmax: i64,
    ymin: i64,
    ymax: i64,
}

impl Playfield {
    pub fn new(dialect: Dialect) -> Self {
        let (xmax, ymax) = match dialect {
            Dialect::B93 => (B93_WIDTH, B93_HEIGHT),
            Dialect::B98 => (0, 0),
        };
        Self {
            dialect,
            cells: HashMap::new(),
            xmin: 0,
            xmax,
            ymin: 0,
            ymax,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Read a cell. Unwritten coordinates read as a space.
    pub fn get(&self, pos: Pos) -> Cell {
        *self.cells.get(&pos).unwrap_or(&SPACE)
    }

    /// Write a cell, growing the extent (b98) or wrapping into the fixed
    /// 80x25 torus (b93).
    pub fn set(&mut self, pos: Pos, value: Cell) {
        let pos = self.normalize(pos);
        self.grow_extent(pos);
        if value == SPACE {
            // A space is indistinguishable from "unwritten"; dropping it
            // keeps the map from growing without bound on blank writes.
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, value);
        }
    }

    /// In b93, writes and moves wrap modulo the fixed torus. In b98 the
    /// coordinate passes through unchanged (growth happens separately).
    fn normalize(&self, pos: Pos) -> Pos {
        match self.dialect {
            Dialect::B93 => (pos.0.rem_euclid(B93_WIDTH), pos.1.rem_euclid(B93_HEIGHT)),
            Dialect::B98 => pos,
        }
    }

    fn grow_extent(&mut self, pos: Pos) {
        if self.dialect == Dialect::B93 {
            return; // fixed torus, nothing to grow
        }
        if self.cells.is_empty() && self.xmin == self.xmax {
            // first write: seed a single-cell extent before widening below
            self.xmin = pos.0;
            self.xmax = pos.0 + 1;
            self.ymin = pos.1;
            self.ymax = pos.1 + 1;
            return;
        }
        if pos.0 < self.xmin {
            self.xmin = pos.0;
        }
        if pos.0 >= self.xmax {
            self.xmax = pos.0 + 1;
        }
        if pos.1 < self.ymin {
            self.ymin = pos.1;
        }
        if pos.1 >= self.ymax {
            self.ymax = pos.1 + 1;
        }
    }

    /// Write a block of text (lines split on `\n`) with its top-left corner
    /// at `(x0, y0)`. Cells the text doesn't cover are left untouched.
    pub fn insert_block(&mut self, text: &str, x0: i64, y0: i64) {
        for (dy, line) in text.lines().enumerate() {
            for (dx, ch) in line.chars().enumerate() {
                if ch != ' ' {
                    self.set((x0 + dx as i64, y0 + dy as i64), ch as Cell);
                }
            }
        }
    }

    /// `(xmin, xmax, ymin, ymax)`, half-open on the high end.
    pub fn extent(&self) -> (i64, i64, i64, i64) {
        (self.xmin, self.xmax, self.ymin, self.ymax)
    }

    fn in_extent(&self, pos: Pos) -> bool {
        pos.0 >= self.xmin && pos.0 < self.xmax && pos.1 >= self.ymin && pos.1 < self.ymax
    }

    /// Render the playfield as text, for the debugger. Non-printable cells
    /// become the generic substitute glyph.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in self.ymin..self.ymax {
            for x in self.xmin..self.xmax {
                let v = self.get((x, y));
                let ch = match v {
                    0x20..=0x7e => char::from_u32(v as u32).unwrap_or(RENDER_SUBSTITUTE),
                    _ => RENDER_SUBSTITUTE,
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// A single wrap-aware step: `pos + delta`, wrapped back into the
    /// extent if it falls outside. B93 uses plain modular arithmetic on the
    /// fixed torus; b98 uses the iterative Lahey-space back-step.
    pub fn step_once(&self, pos: Pos, delta: Pos) -> Pos {
        match self.dialect {
            Dialect::B93 => (
                (pos.0 + delta.0).rem_euclid(B93_WIDTH),
                (pos.1 + delta.1).rem_euclid(B93_HEIGHT),
            ),
            Dialect::B98 => self.wrap_lahey(pos, delta),
        }
    }

    /// Lahey-space wrap: if `pos + delta` falls outside the extent, step
    /// backwards along `delta` until exiting the extent on the opposite
    /// side, then step forward once. See the interpreter design notes for
    /// why this (rather than an analytic projection) is the reference
    /// algorithm.
    fn wrap_lahey(&self, pos: Pos, delta: Pos) -> Pos {
        let mut next = (pos.0 + delta.0, pos.1 + delta.1);
        if self.in_extent(next) {
            return next;
        }
        loop {
            next = (next.0 - delta.0, next.1 - delta.1);
            if !self.in_extent(next) {
                break;
            }
        }
        (next.0 + delta.0, next.1 + delta.1)
    }

    pub fn is_semicolon(v: Cell) -> bool {
        v == SEMICOLON
    }

    pub fn is_space(v: Cell) -> bool {
        v == SPACE
    }
}

/// Strip a leading `#!/usr/bin/env befunge` (or `-S befunge`) shebang line.
pub fn strip_shebang(src: &str) -> &str {
    let first_line_is_shebang = src
        .lines()
        .next()
        .map(|l| l.starts_with("#!/usr/bin/env befunge") || l.starts_with("#!/usr/bin/env -S befunge"))
        .unwrap_or(false);
    if first_line_is_shebang {
        match src.find('\n') {
            Some(idx) => &src[idx + 1..],
            None => "",
        }
    } else {
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_cell_is_space() {
        let field = Playfield::new(Dialect::B98);
        assert_eq!(field.get((5, 5)), SPACE);
    }

    #[test]
    fn b93_set_wraps_modulo() {
        let mut field = Playfield::new(Dialect::B93);
        field.set((85, 30), b'X' as Cell);
        assert_eq!(field.get((5, 5)), b'X' as Cell);
        assert_eq!(field.extent(), (0, 80, 0, 25));
    }

    #[test]
    fn b98_extent_grows_to_bounding_box() {
        let mut field = Playfield::new(Dialect::B98);
        field.set((3, 2), b'a' as Cell);
        field.set((-1, 5), b'b' as Cell);
        assert_eq!(field.extent(), (-1, 4, 2, 6));
    }

    #[test]
    fn b98_wrap_is_lahey_space() {
        let mut field = Playfield::new(Dialect::B98);
        field.set((0, 0), b'1' as Cell);
        field.set((9, 0), b'2' as Cell);
        // extent is now [0,10) x [0,1)
        assert_eq!(field.step_once((9, 0), (1, 0)), (0, 0));
        assert_eq!(field.step_once((0, 0), (-1, 0)), (9, 0));
    }

    #[test]
    fn shebang_is_stripped() {
        let src = "#!/usr/bin/env befunge\n123@";
        assert_eq!(strip_shebang(src), "123@");
        let src2 = "#!/usr/bin/env -S befunge\n123@";
        assert_eq!(strip_shebang(src2), "123@");
        assert_eq!(strip_shebang("123@"), "123@");
    }
}
