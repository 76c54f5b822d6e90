//! Delta/direction helpers shared by the directional opcodes.

use rand::Rng;

pub const UP: (i64, i64) = (0, -1);
pub const DOWN: (i64, i64) = (0, 1);
pub const LEFT: (i64, i64) = (-1, 0);
pub const RIGHT: (i64, i64) = (1, 0);

/// `?`: pick one of the four cardinal directions uniformly at random.
pub fn random_delta() -> (i64, i64) {
    match rand::thread_rng().gen_range(0..4) {
        0 => UP,
        1 => DOWN,
        2 => LEFT,
        _ => RIGHT,
    }
}

/// `[`: rotate the delta 90 degrees counterclockwise.
pub fn turn_left(delta: (i64, i64)) -> (i64, i64) {
    (delta.1, -delta.0)
}

/// `]`: rotate the delta 90 degrees clockwise.
pub fn turn_right(delta: (i64, i64)) -> (i64, i64) {
    (-delta.1, delta.0)
}

/// `w`: compare-and-turn. Turns left if `a < b`, right if `a > b`, and
/// leaves the delta untouched if `a == b`.
pub fn compare_turn(delta: (i64, i64), a: i64, b: i64) -> (i64, i64) {
    use std::cmp::Ordering::*;
    match a.cmp(&b) {
        Less => turn_left(delta),
        Greater => turn_right(delta),
        Equal => delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_then_right_is_identity() {
        let d = RIGHT;
        assert_eq!(turn_right(turn_left(d)), d);
    }

    #[test]
    fn four_left_turns_is_identity() {
        let mut d = RIGHT;
        for _ in 0..4 {
            d = turn_left(d);
        }
        assert_eq!(d, RIGHT);
    }

    #[test]
    fn compare_turn_directions() {
        assert_eq!(compare_turn(RIGHT, 1, 2), turn_left(RIGHT));
        assert_eq!(compare_turn(RIGHT, 2, 1), turn_right(RIGHT));
        assert_eq!(compare_turn(RIGHT, 1, 1), RIGHT);
    }
}
