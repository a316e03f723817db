//! Headless playtest driver
//!
//! Runs a scripted session against the gameplay core with no renderer
//! or physics engine attached: contacts are injected by the script and
//! every dispatched event is logged. Useful for eyeballing rule changes
//! and config files without booting a full client.
//!
//! Usage: `playtest [config.ron]`

use platformer_core::prelude::*;

struct EventLogger;

impl EventHandler for EventLogger {
    fn on_event(&mut self, event: &GameEvent) {
        log::info!("event: {event:?}");
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    }
    .validated();

    let mut world = GameWorld::with_seed(config, 0xDEAD_BEEF);
    world.events_mut().subscribe(Box::new(EventLogger));

    world.start_game();
    world.start_level(Vec2::new(0.0, 1.0));
    let walker = world.spawn_walker(Vec2::new(8.0, 1.0));
    world.spawn_turret(Vec2::new(14.0, 4.0));
    let boost = world.spawn_pickup(PickupKind::PowerUp, Vec2::new(4.0, 1.0));
    let unlock = world.spawn_pickup(PickupKind::WeaponUnlock, Vec2::new(6.0, 1.0));

    // Run forward, walk right, grab the pickups, trade hits with the
    // walker, then fall into a death zone and respawn.
    let mut tick = 0u32;
    let mut run_secs = |world: &mut GameWorld, secs: f32, input: PlayerInput| {
        let steps = (secs * 60.0) as u32;
        for _ in 0..steps {
            tick += 1;
            match tick {
                120 => world.push_contact(Contact::new(
                    ContactBody::Player,
                    ContactBody::Pickup(boost),
                )),
                180 => world.push_contact(Contact::new(
                    ContactBody::Player,
                    ContactBody::Pickup(unlock),
                )),
                240 => world.push_contact(Contact::new(
                    ContactBody::Player,
                    ContactBody::Enemy(walker),
                )),
                420 => world.push_contact(Contact::new(
                    ContactBody::Player,
                    ContactBody::Zone(Tag::DEATH_ZONE),
                )),
                _ => {}
            }
            world.tick(&input);
        }
    };

    let walk = PlayerInput {
        axis: 1.0,
        ..Default::default()
    };
    run_secs(&mut world, 3.0, walk);
    run_secs(&mut world, 2.0, PlayerInput {
        jump: true,
        ..Default::default()
    });
    run_secs(&mut world, 6.0, PlayerInput::default());

    let coordinator = world.coordinator();
    log::info!(
        "session over: state={:?} lives={} score={} enemies={} projectiles={}",
        coordinator.state(),
        coordinator.lives(),
        coordinator.score(),
        world.enemy_count(),
        world.projectile_count(),
    );
}
