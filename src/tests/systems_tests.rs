#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::components::*;
    use crate::sound::SoundEffect;
    use crate::systems::*;
    use crate::tests::test_utils::{
        current_piece, drain_sounds, fill_row, puzzle_world, running_puzzle_with, set_current,
    };

    #[test]
    fn test_new_world_is_idle() {
        let world = puzzle_world();
        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Idle);
        assert!(world.resource::<ActivePieces>().current.is_none());
        assert_eq!(world.resource::<Board>().filled_count(), 0);
    }

    #[test]
    fn test_start_spawns_current_and_next() {
        let mut world = puzzle_world();
        start_game(&mut world);

        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Running);
        let pieces = world.resource::<ActivePieces>();
        let current = pieces.current.as_ref().expect("current piece");
        assert!(pieces.next.is_some());
        assert_eq!(current.position.y, 0);

        let (_, music) = drain_sounds(&mut world);
        assert_eq!(music, Some(true));
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let mut world = running_puzzle_with(PieceType::T);
        move_piece(&mut world, 1);
        let before = current_piece(&world);

        start_game(&mut world);
        assert_eq!(current_piece(&world), before);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut world = running_puzzle_with(PieceType::I);
        world.resource_mut::<Board>().cells[19][0] = Some(PieceType::O);
        world.resource_mut::<GameStats>().score = 500;

        reset_game(&mut world);

        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Idle);
        assert_eq!(world.resource::<Board>().filled_count(), 0);
        assert_eq!(*world.resource::<GameStats>(), GameStats::default());
        assert!(world.resource::<ActivePieces>().current.is_none());
        assert!(world.resource::<ActivePieces>().next.is_none());
        assert_eq!(drain_sounds(&mut world).1, Some(false));
    }

    #[test]
    fn test_spawn_promotes_next_piece() {
        let mut world = running_puzzle_with(PieceType::I);
        world.resource_mut::<ActivePieces>().next = Some(Piece::new(PieceType::Z));

        spawn_piece(&mut world);

        assert_eq!(current_piece(&world).piece_type, PieceType::Z);
        assert!(world.resource::<ActivePieces>().next.is_some());
    }

    #[test]
    fn test_spawn_into_occupied_cells_ends_run() {
        let mut world = running_puzzle_with(PieceType::I);
        {
            let mut board = world.resource_mut::<Board>();
            fill_row(&mut board, 0, &[]);
            fill_row(&mut board, 1, &[]);
        }

        spawn_piece(&mut world);

        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Terminal);
        let (effects, music) = drain_sounds(&mut world);
        assert!(effects.contains(&SoundEffect::GameOver));
        assert_eq!(music, Some(false));
    }

    #[test]
    fn test_start_after_game_over_resets_board() {
        let mut world = running_puzzle_with(PieceType::I);
        {
            let mut board = world.resource_mut::<Board>();
            fill_row(&mut board, 0, &[]);
        }
        spawn_piece(&mut world);
        assert!(world.resource::<RunPhase>().is_game_over());

        start_game(&mut world);

        assert!(world.resource::<RunPhase>().is_running());
        assert_eq!(world.resource::<Board>().filled_count(), 0);
    }

    #[test]
    fn test_move_piece_left_and_right() {
        let mut world = running_puzzle_with(PieceType::O);

        assert!(move_piece(&mut world, -1));
        assert_eq!(current_piece(&world).position.x, 3);
        assert!(move_piece(&mut world, 1));
        assert!(move_piece(&mut world, 1));
        assert_eq!(current_piece(&world).position.x, 5);
    }

    #[test]
    fn test_move_into_wall_is_ignored() {
        let mut world = running_puzzle_with(PieceType::I);
        let mut piece = current_piece(&world);
        piece.position.x = 0;
        set_current(&mut world, piece);

        assert!(!move_piece(&mut world, -1));
        assert_eq!(current_piece(&world).position.x, 0);
    }

    #[test]
    fn test_move_requires_running_game() {
        let mut world = puzzle_world();
        assert!(!move_piece(&mut world, 1));
        assert!(!rotate_piece(&mut world));
    }

    #[test]
    fn test_rotate_piece() {
        let mut world = running_puzzle_with(PieceType::T);
        let mut piece = current_piece(&world);
        piece.position.y = 5;
        set_current(&mut world, piece);

        assert!(rotate_piece(&mut world));
        let rotated = current_piece(&world);
        assert_eq!(rotated.shape, PieceType::T.shape().rotated_clockwise());
        assert_eq!(rotated.position.y, 5);
    }

    #[test]
    fn test_blocked_rotation_is_discarded() {
        let mut world = running_puzzle_with(PieceType::I);
        let mut piece = current_piece(&world);
        piece.position.y = 19;
        set_current(&mut world, piece);

        assert!(!rotate_piece(&mut world));
        assert_eq!(current_piece(&world).shape, PieceType::I.shape());
    }

    #[test]
    fn test_soft_drop_moves_down_and_resets_counter() {
        let mut world = running_puzzle_with(PieceType::T);
        world.resource_mut::<GameStats>().drop_counter = 400.0;

        soft_drop(&mut world);

        assert_eq!(current_piece(&world).position.y, 1);
        assert!(world.resource::<GameStats>().drop_counter.abs() < f64::EPSILON);
    }

    #[test]
    fn test_soft_drop_on_floor_locks() {
        let mut world = running_puzzle_with(PieceType::I);
        let mut piece = current_piece(&world);
        piece.position.y = 19;
        set_current(&mut world, piece);

        soft_drop(&mut world);

        let board = world.resource::<Board>();
        assert_eq!(board.row_ids(19), vec![0, 0, 0, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(current_piece(&world).position.y, 0);
        assert!(drain_sounds(&mut world).0.contains(&SoundEffect::Drop));
    }

    #[test]
    fn test_lock_clears_completed_line() {
        let mut world = running_puzzle_with(PieceType::I);
        {
            let mut board = world.resource_mut::<Board>();
            fill_row(&mut board, 19, &[3, 4, 5, 6]);
        }
        let mut piece = current_piece(&world);
        piece.position.y = 19;
        set_current(&mut world, piece);

        lock_piece(&mut world);

        assert_eq!(world.resource::<Board>().filled_count(), 0);
        let stats = world.resource::<GameStats>();
        assert_eq!(stats.score, 100);
        assert_eq!(stats.lines_cleared, 1);
        assert_eq!(stats.level, 1);
        let (effects, _) = drain_sounds(&mut world);
        assert_eq!(effects, vec![SoundEffect::Drop, SoundEffect::LineClear]);
    }

    #[test]
    fn test_tick_drops_only_after_interval_is_exceeded() {
        let mut world = running_puzzle_with(PieceType::T);

        tick_system(&mut world, 1000.0);
        assert_eq!(current_piece(&world).position.y, 0);

        tick_system(&mut world, 1.0);
        assert_eq!(current_piece(&world).position.y, 1);
        assert!(world.resource::<GameStats>().drop_counter.abs() < f64::EPSILON);
    }

    #[test]
    fn test_tick_does_nothing_when_idle() {
        let mut world = puzzle_world();
        tick_system(&mut world, 5000.0);
        assert!(world.resource::<GameStats>().drop_counter.abs() < f64::EPSILON);
    }

    #[test]
    fn test_input_is_consumed() {
        let mut world = running_puzzle_with(PieceType::T);
        world.resource_mut::<Input>().right = true;

        input_system(&mut world);

        assert_eq!(current_piece(&world).position.x, 5);
        assert!(!world.resource::<Input>().any());
    }

    #[test]
    fn test_blocked_move_still_clicks() {
        let mut world = running_puzzle_with(PieceType::I);
        let mut piece = current_piece(&world);
        piece.position.x = 0;
        set_current(&mut world, piece);
        world.resource_mut::<Input>().left = true;

        input_system(&mut world);

        assert_eq!(current_piece(&world).position.x, 0);
        assert_eq!(drain_sounds(&mut world).0, vec![SoundEffect::Move]);
    }

    #[test]
    fn test_input_ignored_when_not_running() {
        let mut world = puzzle_world();
        world.resource_mut::<Input>().rotate = true;

        input_system(&mut world);

        assert!(!world.resource::<Input>().any());
        assert!(drain_sounds(&mut world).0.is_empty());
    }
}
