use std::sync::Arc;
use std::thread;

use game::grid::{CELL_SIZE, FLOOR_BOUND, LEFT_BOUND, RIGHT_BOUND, SPAWN_Y};
use game::piece::{spawn_signal, Direction, GameState, SpawnRequests, PALETTE};
use game::rng::Rng;

fn state_with_one_piece(seed: u64) -> (GameState, SpawnRequests, Rng) {
    let (signal, requests) = spawn_signal();
    let state = GameState::new(signal);
    let mut rng = Rng::new(seed);
    state.spawn(&mut rng);
    (state, requests, rng)
}

fn drive_to_floor(state: &GameState) {
    let steps = (SPAWN_Y - FLOOR_BOUND) / CELL_SIZE;
    for _ in 0..steps {
        state.move_active(Direction::Down);
    }
}

#[test]
fn spawned_pieces_are_grid_aligned_and_in_bounds() {
    for seed in 1..64 {
        let (state, _requests, _rng) = state_with_one_piece(seed);
        let piece = state.active().unwrap();
        let (x, y) = piece.position();

        assert_eq!(x % CELL_SIZE, 0, "seed {seed}: x off-grid");
        assert!((LEFT_BOUND..=RIGHT_BOUND).contains(&x), "seed {seed}: x={x}");
        assert_eq!(y, SPAWN_Y);
        assert!(piece.orientation() < 4);
        assert!(PALETTE.contains(&piece.color()), "seed {seed}: off-palette");
    }
}

#[test]
fn left_moves_stop_at_the_boundary() {
    let (state, _requests, _rng) = state_with_one_piece(7);
    let piece = state.active().unwrap();

    for _ in 0..100 {
        state.move_active(Direction::Left);
        assert!(piece.position().0 >= LEFT_BOUND);
    }
    assert_eq!(piece.position().0, LEFT_BOUND);

    let y_before = piece.position().1;
    state.move_active(Direction::Left);
    assert_eq!(piece.position(), (LEFT_BOUND, y_before));
}

#[test]
fn right_moves_stop_at_the_boundary() {
    let (state, _requests, _rng) = state_with_one_piece(7);
    let piece = state.active().unwrap();

    for _ in 0..100 {
        state.move_active(Direction::Right);
        assert!(piece.position().0 <= RIGHT_BOUND);
    }
    assert_eq!(piece.position().0, RIGHT_BOUND);
}

#[test]
fn down_stops_at_the_floor_and_requests_a_spawn() {
    let (state, requests, _rng) = state_with_one_piece(11);
    let piece = state.active().unwrap();

    drive_to_floor(&state);
    assert_eq!(piece.position().1, FLOOR_BOUND);
    // Reaching the floor is not yet a request; the next rejected move is.
    assert!(!requests.take());

    state.move_active(Direction::Down);
    assert_eq!(piece.position().1, FLOOR_BOUND);
    assert!(requests.take());
    assert!(!requests.take());
}

#[test]
fn spawn_requests_collapse_while_pending() {
    let (state, requests, _rng) = state_with_one_piece(13);

    drive_to_floor(&state);
    for _ in 0..3 {
        state.move_active(Direction::Down);
    }

    assert!(requests.take());
    assert!(!requests.take());
}

#[test]
fn draining_a_request_spawns_exactly_one_piece() {
    let (state, requests, mut rng) = state_with_one_piece(17);

    drive_to_floor(&state);
    state.move_active(Direction::Down);
    state.move_active(Direction::Down);

    // One render frame: poll once, spawn once.
    if requests.take() {
        state.spawn(&mut rng);
    }

    let pieces = state.pieces();
    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].position().1, FLOOR_BOUND);
    assert_eq!(pieces[1].position().1, SPAWN_Y);

    // The landed piece no longer receives movement.
    state.move_active(Direction::Down);
    assert_eq!(pieces[0].position().1, FLOOR_BOUND);
    assert_eq!(pieces[1].position().1, SPAWN_Y - CELL_SIZE);
}

#[test]
fn rotation_is_periodic_for_rendering() {
    let (state, _requests, _rng) = state_with_one_piece(19);
    let piece = state.active().unwrap();

    let base = piece.orientation();
    for _ in 0..7 {
        state.rotate_active();
    }
    assert_eq!(piece.orientation(), base + 7);
    assert_eq!(piece.rotation_steps(), (base + 7) % 4);
}

#[test]
fn moves_without_any_piece_are_ignored() {
    let (signal, requests) = spawn_signal();
    let state = GameState::new(signal);

    state.move_active(Direction::Down);
    state.rotate_active();
    assert!(state.pieces().is_empty());
    assert!(!requests.take());
}

#[test]
fn concurrent_movement_preserves_bounds() {
    let (state, requests, _rng) = state_with_one_piece(23);
    let state = Arc::new(state);

    let faller = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for _ in 0..300 {
                state.move_active(Direction::Down);
            }
        })
    };
    let slider = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for i in 0..300 {
                let direction = if i % 2 == 0 {
                    Direction::Left
                } else {
                    Direction::Right
                };
                state.move_active(direction);
            }
        })
    };
    faller.join().unwrap();
    slider.join().unwrap();

    let piece = state.active().unwrap();
    let (x, y) = piece.position();
    assert!((LEFT_BOUND..=RIGHT_BOUND).contains(&x));
    assert!(y >= FLOOR_BOUND);
    assert_eq!(x % CELL_SIZE, 0);
    assert_eq!(y % CELL_SIZE, 0);

    // 300 falls from the spawn row always hit the floor at least once.
    assert!(requests.take());
}
