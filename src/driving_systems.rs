use bevy_ecs::prelude::*;
use log::{debug, info, trace};

use crate::{
    components::{GameRng, RunPhase},
    driving::{
        BLINK_FRAMES, CRASH_SLOWDOWN, DODGE_POINTS, INVINCIBILITY_FRAMES, LANE_COUNT, Obstacle,
        Player, RunState, SteeringInput,
    },
    sound::{SoundEffect, SoundQueue},
};

/// Builds a driving world in the `Idle` phase.
#[must_use]
pub fn create_driving_world(rng: GameRng) -> World {
    let mut world = World::new();
    world.insert_resource(Player::default());
    world.insert_resource(RunState::default());
    world.insert_resource(SteeringInput::default());
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

fn despawn_obstacles(world: &mut World) {
    let entities: Vec<Entity> = world
        .query_filtered::<Entity, With<Obstacle>>()
        .iter(world)
        .collect();
    for entity in entities {
        world.despawn(entity);
    }
}

/// Starts a run. A finished run is reset first; a run already in progress
/// is left alone.
pub fn start_run(world: &mut World) {
    let phase = *world.resource::<RunPhase>();
    match phase {
        RunPhase::Running => return,
        RunPhase::Terminal => reset_run(world),
        RunPhase::Idle => {}
    }

    info!("Starting driving run");
    *world.resource_mut::<RunPhase>() = RunPhase::Running;
    queue_music(world, true);
}

/// Clears the road and returns to `Idle` with fresh lives and speed.
pub fn reset_run(world: &mut World) {
    debug!("Resetting driving run");
    despawn_obstacles(world);
    *world.resource_mut::<Player>() = Player::default();
    *world.resource_mut::<RunState>() = RunState::default();
    *world.resource_mut::<SteeringInput>() = SteeringInput::default();
    *world.resource_mut::<RunPhase>() = RunPhase::Idle;
    queue_music(world, false);
}

pub fn restart_run(world: &mut World) {
    reset_run(world);
    start_run(world);
}

/// Spawns an obstacle in a uniformly chosen lane.
pub fn spawn_obstacle(world: &mut World) -> Entity {
    let lane = world.resource_mut::<GameRng>().0.usize(0..LANE_COUNT);
    spawn_obstacle_in_lane(world, lane)
}

/// Spawns an obstacle above the top of `lane` and speeds the run up.
pub fn spawn_obstacle_in_lane(world: &mut World, lane: usize) -> Entity {
    let entity = world.spawn(Obstacle::in_lane(lane)).id();
    let mut state = world.resource_mut::<RunState>();
    state.escalate();
    trace!(
        "Obstacle in lane {lane}, speed {:.2}, interval {:.1}",
        state.game_speed, state.spawn_interval
    );
    entity
}

/// Applies queued steering and eases the player toward the target.
pub fn steering_system(world: &mut World) {
    let input = std::mem::take(&mut *world.resource_mut::<SteeringInput>());
    let mut player = world.resource_mut::<Player>();

    if let Some(x) = input.pointer_x {
        player.steer_to(x);
    }
    if input.lane_shift != 0 {
        player.shift_lane(input.lane_shift);
    }
    player.approach_target();
}

/// Scrolls the road and moves every obstacle down by the current speed.
pub fn scroll_system(world: &mut World) {
    let slowdown = world.resource::<Player>().slowdown;
    let distance = {
        let mut state = world.resource_mut::<RunState>();
        let distance = state.game_speed * slowdown;
        state.scroll(distance);
        distance
    };

    let mut query = world.query::<&mut Obstacle>();
    for mut obstacle in query.iter_mut(world) {
        obstacle.bounds.y += distance;
        if obstacle.blink_timer > 0 {
            obstacle.blink_timer -= 1;
        }
    }
}

/// Resolves at most one crash per frame. Returns whether a life was lost.
pub fn collision_system(world: &mut World) -> bool {
    if world.resource::<RunState>().invincible {
        return false;
    }

    let player_bounds = world.resource::<Player>().bounds;
    let crashed = {
        let mut query = world.query::<&mut Obstacle>();
        let mut crashed = None;
        for mut obstacle in query.iter_mut(world) {
            if !obstacle.hit && obstacle.bounds.overlaps(&player_bounds) {
                obstacle.hit = true;
                obstacle.blink_timer = BLINK_FRAMES;
                crashed = Some(obstacle.lane);
                break;
            }
        }
        crashed
    };

    let Some(lane) = crashed else {
        return false;
    };

    let lives = {
        let mut state = world.resource_mut::<RunState>();
        state.lives = state.lives.saturating_sub(1);
        state.invincible = true;
        state.invincibility_timer = INVINCIBILITY_FRAMES;
        state.lives
    };
    world.resource_mut::<Player>().slowdown = CRASH_SLOWDOWN;
    info!("Crashed in lane {lane}, {lives} lives left");
    queue_sound(world, SoundEffect::Crash);

    if lives == 0 {
        end_run(world);
    }
    true
}

/// Removes obstacles that left the road or finished blinking. Returns how
/// many were dodged.
pub fn cleanup_system(world: &mut World) -> u32 {
    let mut finished = Vec::new();
    let mut dodged = 0;
    {
        let mut query = world.query::<(Entity, &Obstacle)>();
        for (entity, obstacle) in query.iter(world) {
            if obstacle.hit && obstacle.blink_timer == 0 {
                finished.push(entity);
            } else if obstacle.is_off_screen() {
                if !obstacle.hit {
                    dodged += 1;
                }
                finished.push(entity);
            }
        }
    }

    for entity in finished {
        world.despawn(entity);
    }

    if dodged > 0 {
        world.resource_mut::<RunState>().score += DODGE_POINTS * dodged;
        queue_sound(world, SoundEffect::Dodge);
    }
    dodged
}

fn end_run(world: &mut World) {
    let score = world.resource::<RunState>().score;
    info!("Driving run over, final score {score}");
    *world.resource_mut::<RunPhase>() = RunPhase::Terminal;
    queue_music(world, false);
    queue_sound(world, SoundEffect::GameOver);
}

/// Advances a running game by one fixed frame.
pub fn frame_system(world: &mut World) {
    if !world.resource::<RunPhase>().is_running() {
        return;
    }

    steering_system(world);

    world.resource_mut::<Player>().recover();
    world.resource_mut::<RunState>().tick_invincibility();

    scroll_system(world);

    if world.resource_mut::<RunState>().tick_spawn_timer() {
        spawn_obstacle(world);
    }

    collision_system(world);
    if !world.resource::<RunPhase>().is_running() {
        return;
    }

    cleanup_system(world);
}

/// Number of obstacles currently on the road.
pub fn obstacle_count(world: &mut World) -> usize {
    world.query::<&Obstacle>().iter(world).count()
}
