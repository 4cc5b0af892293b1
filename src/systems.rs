use bevy_ecs::prelude::*;
use log::{debug, info, trace};

use crate::components::{
    ActivePieces, Board, GameRng, GameStats, Input, Piece, PieceType, RunPhase,
};
use crate::game::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::sound::{SoundEffect, SoundQueue};

/// Builds a puzzle world in the `Idle` phase.
#[must_use]
pub fn create_puzzle_world(rng: GameRng) -> World {
    let mut world = World::new();
    world.insert_resource(Board::new(BOARD_WIDTH, BOARD_HEIGHT));
    world.insert_resource(GameStats::default());
    world.insert_resource(ActivePieces::default());
    world.insert_resource(Input::default());
    world.insert_resource(RunPhase::Idle);
    world.insert_resource(SoundQueue::default());
    world.insert_resource(rng);
    world
}

fn queue_sound(world: &mut World, effect: SoundEffect) {
    if let Some(mut queue) = world.get_resource_mut::<SoundQueue>() {
        queue.push(effect);
    }
}

fn queue_music(world: &mut World, playing: bool) {
    if let Some(mut queue) = world.get_resource_mut::<SoundQueue>() {
        queue.set_music(playing);
    }
}

fn is_running(world: &World) -> bool {
    world.resource::<RunPhase>().is_running()
}

/// A piece of uniformly random type in spawn position.
pub fn create_piece(world: &mut World) -> Piece {
    let mut rng = world.resource_mut::<GameRng>();
    Piece::new(PieceType::random(&mut rng.0))
}

/// Starts a run. A finished run is reset first; a run already in progress
/// is left alone.
pub fn start_game(world: &mut World) {
    let phase = *world.resource::<RunPhase>();
    match phase {
        RunPhase::Running => return,
        RunPhase::Terminal => reset_game(world),
        RunPhase::Idle => {}
    }

    info!("Starting puzzle run");
    *world.resource_mut::<RunPhase>() = RunPhase::Running;
    queue_music(world, true);

    let next = create_piece(world);
    world.resource_mut::<ActivePieces>().next = Some(next);
    spawn_piece(world);
}

/// Clears the board and statistics and returns to `Idle`.
pub fn reset_game(world: &mut World) {
    debug!("Resetting puzzle");
    world.insert_resource(Board::new(BOARD_WIDTH, BOARD_HEIGHT));
    world.resource_mut::<GameStats>().reset();
    *world.resource_mut::<ActivePieces>() = ActivePieces::default();
    *world.resource_mut::<Input>() = Input::default();
    *world.resource_mut::<RunPhase>() = RunPhase::Idle;
    queue_music(world, false);
}

/// Reset followed by start.
pub fn restart_game(world: &mut World) {
    reset_game(world);
    start_game(world);
}

/// Promotes the queued piece (or a fresh one) to current and queues a new
/// next piece. Ends the run when the new piece has no room.
pub fn spawn_piece(world: &mut World) {
    let queued = world.resource_mut::<ActivePieces>().next.take();
    let current = match queued {
        Some(piece) => piece,
        None => create_piece(world),
    };
    let upcoming = create_piece(world);

    let blocked = world.resource::<Board>().collides(
        &current.shape,
        current.position.x,
        current.position.y,
    );

    debug!(
        "Spawned {:?} at ({}, {}), next {:?}",
        current.piece_type, current.position.x, current.position.y, upcoming.piece_type
    );

    {
        let mut pieces = world.resource_mut::<ActivePieces>();
        pieces.current = Some(current);
        pieces.next = Some(upcoming);
    }

    if blocked {
        end_game(world);
    }
}

fn end_game(world: &mut World) {
    let score = world.resource::<GameStats>().score;
    info!("Puzzle over, final score {score}");
    *world.resource_mut::<RunPhase>() = RunPhase::Terminal;
    queue_music(world, false);
    queue_sound(world, SoundEffect::GameOver);
}

/// Shifts the current piece one column. Blocked moves are ignored.
pub fn move_piece(world: &mut World, dir: i32) -> bool {
    if !is_running(world) {
        return false;
    }

    let board = world.resource::<Board>().clone();
    let mut pieces = world.resource_mut::<ActivePieces>();
    let Some(piece) = pieces.current.as_mut() else {
        return false;
    };

    let new_x = piece.position.x + dir;
    if board.collides(&piece.shape, new_x, piece.position.y) {
        trace!("Move to column {new_x} blocked");
        return false;
    }

    piece.position.x = new_x;
    true
}

/// Moves the current piece down one row, or locks it when it cannot fall.
pub fn soft_drop(world: &mut World) {
    if !is_running(world) {
        return;
    }

    let can_fall = {
        let board = world.resource::<Board>();
        let pieces = world.resource::<ActivePieces>();
        let Some(piece) = pieces.current.as_ref() else {
            return;
        };
        !board.collides(&piece.shape, piece.position.x, piece.position.y + 1)
    };

    if can_fall {
        if let Some(piece) = world.resource_mut::<ActivePieces>().current.as_mut() {
            piece.position.y += 1;
        }
        world.resource_mut::<GameStats>().drop_counter = 0.0;
    } else {
        lock_piece(world);
    }
}

/// Turns the current piece a quarter clockwise in place. There is no kick:
/// a rotation that collides is discarded.
pub fn rotate_piece(world: &mut World) -> bool {
    if !is_running(world) {
        return false;
    }

    let board = world.resource::<Board>().clone();
    let mut pieces = world.resource_mut::<ActivePieces>();
    let Some(piece) = pieces.current.as_mut() else {
        return false;
    };

    let rotated = piece.shape.rotated_clockwise();
    if board.collides(&rotated, piece.position.x, piece.position.y) {
        trace!("Rotation blocked");
        return false;
    }

    piece.shape = rotated;
    true
}

/// Writes the current piece into the board, clears full rows, updates the
/// statistics and spawns the queued piece.
pub fn lock_piece(world: &mut World) {
    let Some(piece) = world.resource_mut::<ActivePieces>().current.take() else {
        return;
    };

    debug!(
        "Locking {:?} at ({}, {})",
        piece.piece_type, piece.position.x, piece.position.y
    );

    world.resource_mut::<Board>().lock_piece(&piece);
    queue_sound(world, SoundEffect::Drop);

    let cleared = world.resource_mut::<Board>().clear_lines();
    if cleared > 0 {
        let (points, level_before, level_after) = {
            let mut stats = world.resource_mut::<GameStats>();
            let level_before = stats.level;
            let points = stats.apply_line_clear(cleared);
            (points, level_before, stats.level)
        };
        info!("Cleared {cleared} lines for {points} points");
        if level_after != level_before {
            info!("Level up: {level_before} -> {level_after}");
        }
        queue_sound(world, SoundEffect::LineClear);
    }

    spawn_piece(world);
}

/// Applies and clears the pending input flags.
pub fn input_system(world: &mut World) {
    let input = std::mem::take(&mut *world.resource_mut::<Input>());

    if !is_running(world) || world.resource::<ActivePieces>().current.is_none() {
        return;
    }

    // The click plays whether or not the move succeeds
    if input.left || input.right {
        let dir = if input.left { -1 } else { 1 };
        move_piece(world, dir);
        queue_sound(world, SoundEffect::Move);
    }

    if input.down {
        soft_drop(world);
    }

    if input.rotate {
        rotate_piece(world);
        queue_sound(world, SoundEffect::Rotate);
    }
}

/// Advances the drop accumulator by `elapsed_ms` and performs one drop
/// once it exceeds the current interval.
pub fn tick_system(world: &mut World, elapsed_ms: f64) {
    if !is_running(world) {
        return;
    }

    let should_drop = {
        let mut stats = world.resource_mut::<GameStats>();
        stats.drop_counter += elapsed_ms;
        trace!(
            "Drop counter: {}, drop interval: {}",
            stats.drop_counter, stats.drop_interval
        );
        stats.drop_counter > stats.drop_interval
    };

    if should_drop {
        soft_drop(world);
        world.resource_mut::<GameStats>().drop_counter = 0.0;
    }
}
