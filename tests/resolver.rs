//! Move-resolution tests: cyclic dominance and the deterministic tie policy.

use bracket_royale_server::game::resolver::{beats, resolve};
use bracket_royale_server::game::types::{Move, Slot};

#[test]
fn each_move_beats_exactly_one_other() {
    assert_eq!(beats(Move::Rock), Move::Scissors);
    assert_eq!(beats(Move::Paper), Move::Rock);
    assert_eq!(beats(Move::Scissors), Move::Paper);
}

#[test]
fn dominance_is_cyclic() {
    assert_eq!(resolve(Move::Rock, Move::Scissors), Some(Slot::P1));
    assert_eq!(resolve(Move::Scissors, Move::Paper), Some(Slot::P1));
    assert_eq!(resolve(Move::Paper, Move::Rock), Some(Slot::P1));

    assert_eq!(resolve(Move::Scissors, Move::Rock), Some(Slot::P2));
    assert_eq!(resolve(Move::Paper, Move::Scissors), Some(Slot::P2));
    assert_eq!(resolve(Move::Rock, Move::Paper), Some(Slot::P2));
}

#[test]
fn identical_moves_do_not_resolve() {
    for mv in [Move::Rock, Move::Paper, Move::Scissors] {
        assert_eq!(resolve(mv, mv), None, "{mv:?} vs itself must tie");
    }
}
