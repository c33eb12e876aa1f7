//! Falling-piece state shared between the fall timer, keyboard input and the
//! render thread.
//!
//! Mutable piece fields are independent relaxed atomics: the timer and input
//! writers race against the drawing reader with last-write-wins semantics per
//! field. A torn frame is acceptable here; whole-piece consistency is not a
//! goal. The piece list itself is only ever appended by the render thread.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use crate::grid::{CELL_SIZE, FLOOR_BOUND, LEFT_BOUND, RIGHT_BOUND, SPAWN_Y};
use crate::rng::Rng;
use crate::shapes::ShapeKind;

pub type Color = [f32; 3];

pub const PALETTE: [Color; 4] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Left,
    Right,
}

/// One falling unit. Position and orientation mutate after creation; shape,
/// reflection and color are fixed for the piece's lifetime.
#[derive(Debug)]
pub struct Piece {
    shape: ShapeKind,
    x: AtomicI32,
    y: AtomicI32,
    orientation: AtomicU32,
    reflected: bool,
    color: Color,
}

impl Piece {
    fn random(rng: &mut Rng) -> Self {
        let shape = ShapeKind::ALL[rng.next_u32() as usize % ShapeKind::ALL.len()];
        let columns = ((RIGHT_BOUND - LEFT_BOUND) / CELL_SIZE) as u32 + 1;
        let x = LEFT_BOUND + (rng.next_u32() % columns) as i32 * CELL_SIZE;
        Self {
            shape,
            x: AtomicI32::new(x),
            y: AtomicI32::new(SPAWN_Y),
            orientation: AtomicU32::new(rng.next_u32() % 4),
            reflected: rng.next_u32() & 1 == 1,
            color: PALETTE[rng.next_u32() as usize % PALETTE.len()],
        }
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn position(&self) -> (i32, i32) {
        (
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
        )
    }

    pub fn orientation(&self) -> u32 {
        self.orientation.load(Ordering::Relaxed)
    }

    /// Effective quarter-turns for rendering; the raw counter is unbounded.
    pub fn rotation_steps(&self) -> u32 {
        self.orientation() % 4
    }

    pub fn reflected(&self) -> bool {
        self.reflected
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn rotate(&self) {
        self.orientation.fetch_add(1, Ordering::Relaxed);
    }

    /// One-cell step with boundary checks. Returns false for a `Down` move
    /// that was rejected at the floor; lateral moves at a wall are plain
    /// no-ops and still count as handled.
    fn step(&self, direction: Direction) -> bool {
        match direction {
            Direction::Down => {
                let y = self.y.load(Ordering::Relaxed);
                if y > FLOOR_BOUND {
                    self.y.store(y - CELL_SIZE, Ordering::Relaxed);
                    true
                } else {
                    false
                }
            }
            Direction::Left => {
                let x = self.x.load(Ordering::Relaxed);
                if x > LEFT_BOUND {
                    self.x.store(x - CELL_SIZE, Ordering::Relaxed);
                }
                true
            }
            Direction::Right => {
                let x = self.x.load(Ordering::Relaxed);
                if x < RIGHT_BOUND {
                    self.x.store(x + CELL_SIZE, Ordering::Relaxed);
                }
                true
            }
        }
    }
}

/// Single-slot request asking the render thread to create the next piece.
/// Raising while one is already pending is a silent no-op.
pub struct SpawnSignal {
    tx: SyncSender<()>,
}

/// Receiving end of [`spawn_signal`]; polled once per rendered frame.
pub struct SpawnRequests {
    rx: Receiver<()>,
}

pub fn spawn_signal() -> (SpawnSignal, SpawnRequests) {
    let (tx, rx) = mpsc::sync_channel(1);
    (SpawnSignal { tx }, SpawnRequests { rx })
}

impl SpawnSignal {
    pub fn raise(&self) {
        // Full slot means a spawn is already pending; drop the request.
        let _ = self.tx.try_send(());
    }
}

impl SpawnRequests {
    pub fn take(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

/// All live pieces plus the spawn request slot.
///
/// The collection is append-only; pieces are never pruned once they land.
/// The most recently appended piece is the active one, the only piece that
/// receives movement and rotation.
pub struct GameState {
    pieces: Mutex<Vec<Arc<Piece>>>,
    spawn: SpawnSignal,
}

impl GameState {
    pub fn new(spawn: SpawnSignal) -> Self {
        Self {
            pieces: Mutex::new(Vec::new()),
            spawn,
        }
    }

    /// Creates a piece with random shape, grid-snapped X, orientation,
    /// reflection and color, and appends it as the new active piece.
    ///
    /// Called from the render thread only, which keeps the list
    /// single-appender and the GPU shape catalog confined to one thread.
    pub fn spawn(&self, rng: &mut Rng) -> Arc<Piece> {
        let piece = Arc::new(Piece::random(rng));
        self.pieces.lock().unwrap().push(Arc::clone(&piece));
        piece
    }

    pub fn active(&self) -> Option<Arc<Piece>> {
        self.pieces.lock().unwrap().last().map(Arc::clone)
    }

    /// Moves the active piece one cell. A `Down` move rejected at the floor
    /// leaves the piece in place and raises the spawn request instead.
    pub fn move_active(&self, direction: Direction) {
        let Some(piece) = self.active() else {
            return;
        };
        if !piece.step(direction) {
            self.spawn.raise();
        }
    }

    pub fn rotate_active(&self) {
        if let Some(piece) = self.active() {
            piece.rotate();
        }
    }

    /// Snapshot of every piece, oldest first, for drawing.
    pub fn pieces(&self) -> Vec<Arc<Piece>> {
        self.pieces.lock().unwrap().clone()
    }
}
