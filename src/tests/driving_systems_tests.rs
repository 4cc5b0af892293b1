#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use bevy_ecs::prelude::*;

    use crate::components::RunPhase;
    use crate::driving::*;
    use crate::driving_systems::*;
    use crate::sound::SoundEffect;
    use crate::tests::test_utils::{drain_sounds, driving_world};

    fn running_world() -> World {
        let mut world = driving_world();
        start_run(&mut world);
        drain_sounds(&mut world);
        world
    }

    // Places an obstacle directly on top of the player
    fn obstacle_on_player(world: &mut World) -> Entity {
        let player = world.resource::<Player>().bounds;
        let entity = spawn_obstacle_in_lane(world, lane_of(player.center_x()));
        world.get_mut::<Obstacle>(entity).expect("obstacle").bounds.y = player.y;
        entity
    }

    fn obstacle(world: &World, entity: Entity) -> Obstacle {
        world.get::<Obstacle>(entity).expect("obstacle").clone()
    }

    #[test]
    fn test_new_world_is_idle() {
        let mut world = driving_world();
        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Idle);
        assert_eq!(world.resource::<RunState>().lives, STARTING_LIVES);
        assert_eq!(obstacle_count(&mut world), 0);
    }

    #[test]
    fn test_frame_does_nothing_until_started() {
        let mut world = driving_world();
        for _ in 0..100 {
            frame_system(&mut world);
        }
        assert_eq!(obstacle_count(&mut world), 0);
        assert!(world.resource::<RunState>().road_offset.abs() < f32::EPSILON);
    }

    #[test]
    fn test_start_requests_music() {
        let mut world = driving_world();
        start_run(&mut world);
        assert!(world.resource::<RunPhase>().is_running());
        assert_eq!(drain_sounds(&mut world).1, Some(true));
    }

    #[test]
    fn test_spawn_escalates_speed() {
        let mut world = running_world();
        let entity = spawn_obstacle_in_lane(&mut world, 0);

        let spawned = obstacle(&world, entity);
        assert_eq!(spawned.lane, 0);
        assert!((spawned.bounds.y + OBSTACLE_HEIGHT).abs() < f32::EPSILON);
        let state = world.resource::<RunState>();
        assert!((state.game_speed - 3.02).abs() < 1e-4);
        assert!((state.spawn_interval - 59.7).abs() < 1e-4);
    }

    #[test]
    fn test_random_spawns_use_every_lane() {
        let mut world = running_world();
        let mut seen = [false; LANE_COUNT];
        for _ in 0..100 {
            let entity = spawn_obstacle(&mut world);
            seen[obstacle(&world, entity).lane] = true;
        }
        assert!(seen.iter().all(|&lane| lane));
    }

    #[test]
    fn test_first_obstacle_after_sixty_frames() {
        let mut world = running_world();
        for _ in 0..59 {
            frame_system(&mut world);
        }
        assert_eq!(obstacle_count(&mut world), 0);

        frame_system(&mut world);
        assert_eq!(obstacle_count(&mut world), 1);
    }

    #[test]
    fn test_obstacles_scroll_with_slowdown() {
        let mut world = running_world();
        let entity = spawn_obstacle_in_lane(&mut world, 0);
        world.resource_mut::<Player>().slowdown = 0.5;
        let speed = world.resource::<RunState>().game_speed;

        scroll_system(&mut world);

        let moved = obstacle(&world, entity).bounds.y + OBSTACLE_HEIGHT;
        assert!((moved - speed * 0.5).abs() < 1e-4);
        assert!((world.resource::<RunState>().road_offset - speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_crash_costs_one_life() {
        let mut world = running_world();
        let entity = obstacle_on_player(&mut world);

        assert!(collision_system(&mut world));

        let state = world.resource::<RunState>();
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert!(state.invincible);
        assert_eq!(state.invincibility_timer, INVINCIBILITY_FRAMES);
        assert!((world.resource::<Player>().slowdown - CRASH_SLOWDOWN).abs() < f32::EPSILON);

        let hit = obstacle(&world, entity);
        assert!(hit.hit);
        assert_eq!(hit.blink_timer, BLINK_FRAMES);
        assert_eq!(drain_sounds(&mut world).0, vec![SoundEffect::Crash]);
    }

    #[test]
    fn test_hit_obstacle_does_not_collide_again() {
        let mut world = running_world();
        obstacle_on_player(&mut world);
        assert!(collision_system(&mut world));

        world.resource_mut::<RunState>().invincible = false;
        assert!(!collision_system(&mut world));
        assert_eq!(world.resource::<RunState>().lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_invincibility_blocks_second_crash() {
        let mut world = running_world();
        obstacle_on_player(&mut world);
        assert!(collision_system(&mut world));

        let second = obstacle_on_player(&mut world);
        assert!(!collision_system(&mut world));
        assert!(!obstacle(&world, second).hit);
        assert_eq!(world.resource::<RunState>().lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut world = running_world();
        for _ in 0..STARTING_LIVES {
            world.resource_mut::<RunState>().invincible = false;
            obstacle_on_player(&mut world);
            collision_system(&mut world);
        }

        assert_eq!(world.resource::<RunState>().lives, 0);
        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Terminal);
        let (effects, music) = drain_sounds(&mut world);
        assert_eq!(effects.last(), Some(&SoundEffect::GameOver));
        assert_eq!(music, Some(false));

        // A finished run no longer advances
        let offset = world.resource::<RunState>().road_offset;
        frame_system(&mut world);
        assert!((world.resource::<RunState>().road_offset - offset).abs() < f32::EPSILON);
    }

    #[test]
    fn test_lives_never_go_below_zero() {
        let mut world = running_world();
        world.resource_mut::<RunState>().lives = 0;
        obstacle_on_player(&mut world);
        collision_system(&mut world);
        assert_eq!(world.resource::<RunState>().lives, 0);
    }

    #[test]
    fn test_dodged_obstacle_scores() {
        let mut world = running_world();
        let entity = spawn_obstacle_in_lane(&mut world, 0);
        world.get_mut::<Obstacle>(entity).expect("obstacle").bounds.y = ROAD_HEIGHT + 1.0;

        assert_eq!(cleanup_system(&mut world), 1);

        assert_eq!(world.resource::<RunState>().score, DODGE_POINTS);
        assert_eq!(obstacle_count(&mut world), 0);
        assert_eq!(drain_sounds(&mut world).0, vec![SoundEffect::Dodge]);
    }

    #[test]
    fn test_hit_obstacle_leaving_road_scores_nothing() {
        let mut world = running_world();
        let entity = spawn_obstacle_in_lane(&mut world, 0);
        {
            let mut hit = world.get_mut::<Obstacle>(entity).expect("obstacle");
            hit.hit = true;
            hit.blink_timer = 5;
            hit.bounds.y = ROAD_HEIGHT + 1.0;
        }

        assert_eq!(cleanup_system(&mut world), 0);
        assert_eq!(world.resource::<RunState>().score, 0);
        assert_eq!(obstacle_count(&mut world), 0);
    }

    #[test]
    fn test_blinking_obstacle_removed_when_timer_expires() {
        let mut world = running_world();
        let entity = obstacle_on_player(&mut world);
        collision_system(&mut world);

        for _ in 0..BLINK_FRAMES - 1 {
            scroll_system(&mut world);
            cleanup_system(&mut world);
        }
        assert_eq!(obstacle(&world, entity).blink_timer, 1);

        scroll_system(&mut world);
        cleanup_system(&mut world);
        assert!(world.get::<Obstacle>(entity).is_none());
    }

    #[test]
    fn test_steering_consumes_input() {
        let mut world = running_world();
        world.resource_mut::<SteeringInput>().lane_shift = 1;

        steering_system(&mut world);

        let player = world.resource::<Player>();
        assert!((player.target_x - 275.0).abs() < 1e-4);
        assert!(player.bounds.x > 155.0);
        assert_eq!(*world.resource::<SteeringInput>(), SteeringInput::default());
    }

    #[test]
    fn test_pointer_steering_sets_target() {
        let mut world = running_world();
        world.resource_mut::<SteeringInput>().pointer_x = Some(60.0);

        steering_system(&mut world);

        assert!((world.resource::<Player>().target_x - 35.0).abs() < 1e-4);
    }

    #[test]
    fn test_reset_clears_road() {
        let mut world = running_world();
        spawn_obstacle(&mut world);
        obstacle_on_player(&mut world);
        collision_system(&mut world);

        reset_run(&mut world);

        assert_eq!(obstacle_count(&mut world), 0);
        assert_eq!(*world.resource::<RunState>(), RunState::default());
        assert_eq!(*world.resource::<Player>(), Player::default());
        assert_eq!(*world.resource::<RunPhase>(), RunPhase::Idle);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut world = running_world();
        world.resource_mut::<RunState>().lives = 1;
        obstacle_on_player(&mut world);
        collision_system(&mut world);
        assert!(world.resource::<RunPhase>().is_game_over());

        start_run(&mut world);

        assert!(world.resource::<RunPhase>().is_running());
        assert_eq!(world.resource::<RunState>().lives, STARTING_LIVES);
        assert_eq!(obstacle_count(&mut world), 0);
    }
}
