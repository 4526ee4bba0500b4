//! End-to-end profile scenarios against the sandbox world.

mod common;

use ai_core::prototypes::{
    AllyProfile, BossPhase, DelayContext, EnrageTimerProfile, EntityRegistration,
    HideAndShootProfile, MeleeProfile, MoveToContext, MoveToDestination, MultishotProfile,
    OrbitContext, PhaseBossProfile, ProfileBase, ScavengerProfile, SelectEntityContext,
    SelectFilter, SelectPool, SenseConfig, TriggerSpawnersContext, UsePowerContext,
    WanderContext, WanderProfile, WeaponSwapProfile,
};
use ai_core::sandbox::{SandboxEntity, SandboxPower, WorldCommand};
use ai_core::{
    EntityId, EntityWorld, KeywordId, PowerRef, ProfilePrototype, ProfileRef, PropertyKind,
    SpawnerAction, Timestamp, Vector3,
};
use ai_runtime::profiles::{EnrageState, HideState, ScavengerState, WeaponState};
use ai_runtime::{ContextKind, Status};

use common::{Sim, entry};

const TICK_MS: u64 = 100;

fn shot() -> UsePowerContext {
    UsePowerContext {
        cooldown_min_ms: 2_000,
        cooldown_max_ms: 2_000,
        ..UsePowerContext::with_power(PowerRef(7))
    }
}

#[test]
fn multishot_fires_the_whole_volley_then_resets() {
    let profile = ProfilePrototype::Multishot(MultishotProfile {
        move_to: MoveToContext {
            range: 40.0,
            ..MoveToContext::default()
        },
        multishot_power: shot(),
        num_shots: 3,
        ..MultishotProfile::default()
    });
    let mut sim = Sim::new(5, vec![entry(1, "archer", profile)]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO).power(SandboxPower::instant(PowerRef(7), 50.0)),
        1,
    );
    sim.spawn(SandboxEntity::at(Vector3::flat(5.0, 0.0)).faction(1));

    let mut results = Vec::new();
    for _ in 0..3 {
        sim.think(agent);
        results.push(sim.controller(agent).procedural().last_power_result());
        if results.len() < 3 {
            assert!(sim.blackboard(agent).has(PropertyKind::AIMultishotCount));
        }
    }

    assert_eq!(results, vec![Status::Running, Status::Running, Status::Completed]);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIMultishotCount));
    assert_eq!(sim.activations(agent, PowerRef(7)).len(), 3);
    assert!(sim.blackboard(agent).power_cooldown(PowerRef(7)) > sim.now());
}

#[test]
fn melee_falls_back_to_wander_when_the_target_dies() {
    let melee = ProfilePrototype::Melee(MeleeProfile {
        base: ProfileBase {
            no_target_override: Some(ProfileRef(2)),
            ..Default::default()
        },
        move_to: MoveToContext {
            range: 30.0,
            ..MoveToContext::default()
        },
        orbit: Some(OrbitContext {
            randomize_direction: false,
            ..OrbitContext::default()
        }),
    });
    let wander = ProfilePrototype::Wander(WanderProfile {
        wander: WanderContext {
            radius_min: 10.0,
            radius_max: 20.0,
            arrival_range: 2.0,
            ..WanderContext::default()
        },
        ..WanderProfile::default()
    });
    let mut sim = Sim::new(9, vec![entry(1, "brute", melee), entry(2, "idle", wander)]);
    let agent = sim.add_agent(SandboxEntity::at(Vector3::ZERO), 1);
    let target = sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1));

    sim.think(agent);
    assert_eq!(sim.controller(agent).target(), Some(target));
    assert_eq!(
        sim.controller(agent).procedural().current_state(),
        Some(ContextKind::Orbit)
    );

    sim.kill(target);
    sim.think(agent);
    assert_eq!(sim.controller(agent).target(), None);
    assert!(sim.controller(agent).procedural().has_no_target_override());
    assert_eq!(sim.controller(agent).procedural().current_state(), None);

    sim.think(agent);
    assert_eq!(
        sim.controller(agent).procedural().current_state(),
        Some(ContextKind::Wander)
    );
}

#[test]
fn enrage_timer_runs_default_enraging_enraged() {
    let enrage = PowerRef(99);
    let profile = ProfilePrototype::EnrageTimer(EnrageTimerProfile {
        move_to: MoveToContext {
            range: 30.0,
            ..MoveToContext::default()
        },
        enrage_power: UsePowerContext {
            requires_target: false,
            ..UsePowerContext::with_power(enrage)
        },
        enrage_timer_minutes: 0.05,
        search_radius: 50.0,
        ..EnrageTimerProfile::default()
    });
    let mut sim = Sim::new(1, vec![entry(1, "warden", profile)]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO).power(SandboxPower::channeled(enrage, 10.0, 1_000)),
        1,
    );
    sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1).avatar());

    let state = |sim: &Sim| match sim.blackboard(agent).get_int(PropertyKind::AIEnrageState) {
        1 => EnrageState::Enraging,
        2 => EnrageState::Enraged,
        _ => EnrageState::Default,
    };

    let deadline = |sim: &Sim| {
        sim.world
            .entity(agent)
            .map(|e| e.properties.get_time(PropertyKind::EnrageStartTime))
    };

    while sim.now().as_millis() < 3_000 {
        sim.step(TICK_MS);
        assert_eq!(deadline(&sim), Some(Timestamp(3_000)), "at {}", sim.now());
        assert_eq!(state(&sim), EnrageState::Default, "at {}", sim.now());
    }

    sim.step(TICK_MS);
    assert_eq!(state(&sim), EnrageState::Enraging);

    for _ in 0..20 {
        sim.step(TICK_MS);
    }
    assert_eq!(state(&sim), EnrageState::Enraged);
    assert_eq!(sim.activations(agent, enrage).len(), 1);
}

#[test]
fn unusable_enrage_power_leaves_the_running_power_alone() {
    let channel = PowerRef(7);
    let enrage = PowerRef(99);
    let profile = ProfilePrototype::EnrageTimer(EnrageTimerProfile {
        base: ProfileBase {
            powers: vec![UsePowerContext::with_power(channel)],
            ..ProfileBase::default()
        },
        move_to: MoveToContext {
            range: 30.0,
            ..MoveToContext::default()
        },
        enrage_power: UsePowerContext::with_power(enrage),
        enrage_timer_minutes: 0.0,
        search_radius: 100.0,
        ..EnrageTimerProfile::default()
    });
    let mut sim = Sim::new(2, vec![entry(1, "warden", profile)]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO)
            .power(SandboxPower::channeled(channel, 50.0, 2_000))
            .power(SandboxPower::instant(enrage, 5.0)),
        1,
    );
    sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1).avatar());

    for _ in 0..5 {
        sim.step(TICK_MS);
    }

    assert_eq!(sim.activations(agent, channel), vec![Timestamp(0)]);
    assert!(sim.activations(agent, enrage).is_empty());
    assert_eq!(
        sim.count(|c| matches!(c, WorldCommand::EndPower { .. })),
        0
    );
    assert_eq!(
        sim.blackboard(agent).get_int(PropertyKind::AIEnrageState),
        EnrageState::Default as i64
    );
}

fn boss_phases() -> ProfilePrototype {
    ProfilePrototype::PhaseBoss(PhaseBossProfile {
        base: ProfileBase {
            powers: vec![UsePowerContext::with_power(PowerRef(30))],
            ..ProfileBase::default()
        },
        move_to: MoveToContext {
            range: 40.0,
            ..MoveToContext::default()
        },
        phases: vec![BossPhase {
            health_threshold_pct: 50.0,
            transition_power: Some(UsePowerContext {
                requires_target: false,
                ..UsePowerContext::with_power(PowerRef(31))
            }),
            powers: vec![UsePowerContext::with_power(PowerRef(32))],
            spawners: Some(TriggerSpawnersContext {
                radius: 100.0,
                action: SpawnerAction::Pulse,
                ..TriggerSpawnersContext::default()
            }),
            suppress_movement: false,
        }],
        ..PhaseBossProfile::default()
    })
}

#[test]
fn boss_enters_phase_at_health_threshold() {
    let mut sim = Sim::new(4, vec![entry(1, "boss", boss_phases())]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO)
            .power(SandboxPower::instant(PowerRef(30), 50.0))
            .power(SandboxPower::channeled(PowerRef(31), 10.0, 300))
            .power(SandboxPower::instant(PowerRef(32), 50.0)),
        1,
    );
    sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1));
    sim.spawn(SandboxEntity::at(Vector3::flat(30.0, 10.0)).spawner());
    let pulses = |sim: &Sim| {
        sim.count(|c| {
            matches!(
                c,
                WorldCommand::TriggerSpawner {
                    action: SpawnerAction::Pulse,
                    ..
                }
            )
        })
    };

    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, PowerRef(30)), vec![Timestamp(0)]);
    assert_eq!(pulses(&sim), 0);

    sim.world.set_health(agent, 40.0);
    sim.step(TICK_MS);
    assert_eq!(sim.blackboard(agent).get_int(PropertyKind::AICustomStateVal1), 1);
    assert_eq!(pulses(&sim), 1);
    assert_eq!(sim.activations(agent, PowerRef(31)), vec![Timestamp(100)]);

    // The channeled transition holds the boss until it finishes.
    for _ in 0..3 {
        sim.step(TICK_MS);
    }
    assert!(!sim.blackboard(agent).has(PropertyKind::AICustomStateVal2));
    assert!(sim.activations(agent, PowerRef(32)).is_empty());

    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, PowerRef(32)), vec![Timestamp(500)]);
    assert_eq!(sim.activations(agent, PowerRef(30)).len(), 1);
    assert_eq!(sim.activations(agent, PowerRef(31)).len(), 1);
    assert_eq!(pulses(&sim), 1);
}

const WEAPON: KeywordId = KeywordId(5);
const DROP: PowerRef = PowerRef(41);
const PICKUP: PowerRef = PowerRef(42);

fn weapon_swapper() -> ProfilePrototype {
    ProfilePrototype::WeaponSwap(WeaponSwapProfile {
        move_to: MoveToContext {
            range: 30.0,
            ..MoveToContext::default()
        },
        drop_weapon: Some(UsePowerContext {
            requires_target: false,
            ..UsePowerContext::with_power(DROP)
        }),
        unarmed_duration_ms: 300,
        weapon_select: SelectEntityContext {
            pool: SelectPool::AllInRange,
            range: 200.0,
            filters: vec![SelectFilter::HasKeyword(WEAPON)],
            register: EntityRegistration::InteractEntity,
            ..SelectEntityContext::default()
        },
        move_to_weapon: MoveToContext {
            destination: MoveToDestination::InteractEntity,
            range: 2.0,
            ..MoveToContext::default()
        },
        pickup_weapon: Some(UsePowerContext {
            requires_target: false,
            ..UsePowerContext::with_power(PICKUP)
        }),
        ..WeaponSwapProfile::default()
    })
}

fn weapon_arena() -> (Sim, EntityId, EntityId) {
    let mut sim = Sim::new(6, vec![entry(1, "duelist", weapon_swapper())]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO)
            .power(SandboxPower::instant(DROP, 10.0))
            .power(SandboxPower::instant(PICKUP, 10.0)),
        1,
    );
    sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1));
    let weapon = sim.spawn(
        SandboxEntity::at(Vector3::flat(-100.0, 0.0))
            .keyword(WEAPON)
            .stationary(),
    );
    (sim, agent, weapon)
}

fn weapon_state(sim: &Sim, agent: EntityId) -> i64 {
    sim.blackboard(agent).get_int(PropertyKind::AICustomStateVal1)
}

#[test]
fn weapon_vanishing_while_seeking_rearms() {
    let (mut sim, agent, weapon) = weapon_arena();

    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, DROP), vec![Timestamp(0)]);
    assert_eq!(weapon_state(&sim, agent), WeaponState::Unarmed as i64);

    for _ in 0..3 {
        sim.step(TICK_MS);
    }
    assert_eq!(weapon_state(&sim, agent), WeaponState::Seeking as i64);
    assert_eq!(
        sim.blackboard(agent).get_entity(PropertyKind::AIInteractEntityId),
        Some(weapon)
    );

    assert!(sim.world.destroy(weapon));
    sim.step(TICK_MS);
    assert_eq!(weapon_state(&sim, agent), WeaponState::Armed as i64);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIInteractEntityId));
    assert!(!sim.blackboard(agent).has(PropertyKind::AICustomTimeVal1));
    assert!(sim.activations(agent, PICKUP).is_empty());

    // Armed again, so the next attack drops the weapon anew.
    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, DROP).len(), 2);
    assert_eq!(weapon_state(&sim, agent), WeaponState::Unarmed as i64);
}

#[test]
fn weapon_is_recovered_and_picked_up() {
    let (mut sim, agent, _) = weapon_arena();

    let mut ticks = 0;
    while sim.activations(agent, PICKUP).is_empty() && ticks < 30 {
        sim.step(TICK_MS);
        ticks += 1;
    }

    assert_eq!(sim.activations(agent, PICKUP).len(), 1);
    assert_eq!(weapon_state(&sim, agent), WeaponState::Armed as i64);
    let pos = sim.world.entity(agent).map(|e| e.position);
    assert!(pos.is_some_and(|p| p.distance_2d(Vector3::flat(-100.0, 0.0)) <= 3.0));
}

const HIDE: PowerRef = PowerRef(20);
const SHOOT: PowerRef = PowerRef(21);
const UNHIDE: PowerRef = PowerRef(22);

fn sniper() -> (Sim, EntityId, EntityId) {
    let profile = ProfilePrototype::HideAndShoot(HideAndShootProfile {
        move_to: MoveToContext {
            range: 40.0,
            ..MoveToContext::default()
        },
        hide_power: UsePowerContext {
            requires_target: false,
            ..UsePowerContext::with_power(HIDE)
        },
        shoot_power: UsePowerContext {
            cooldown_min_ms: 2_000,
            cooldown_max_ms: 2_000,
            ..UsePowerContext::with_power(SHOOT)
        },
        num_shots: 3,
        unhide_power: UsePowerContext {
            requires_target: false,
            ..UsePowerContext::with_power(UNHIDE)
        },
        recover: DelayContext {
            min_ms: 500,
            max_ms: 500,
        },
        ..HideAndShootProfile::default()
    });
    let mut sim = Sim::new(8, vec![entry(1, "sniper", profile)]);
    let agent = sim.add_agent(
        SandboxEntity::at(Vector3::ZERO)
            .power(SandboxPower::instant(HIDE, 10.0))
            .power(SandboxPower::instant(SHOOT, 50.0))
            .power(SandboxPower::instant(UNHIDE, 10.0)),
        1,
    );
    let target = sim.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1));
    (sim, agent, target)
}

fn hide_state(sim: &Sim, agent: EntityId) -> i64 {
    sim.blackboard(agent).get_int(PropertyKind::AICustomStateVal1)
}

#[test]
fn hide_and_shoot_runs_a_full_cycle() {
    let (mut sim, agent, _) = sniper();

    for _ in 0..6 {
        sim.step(TICK_MS);
    }

    assert_eq!(sim.activations(agent, HIDE), vec![Timestamp(0)]);
    assert_eq!(
        sim.activations(agent, SHOOT),
        vec![Timestamp(100), Timestamp(200), Timestamp(300)]
    );
    assert_eq!(sim.activations(agent, UNHIDE), vec![Timestamp(400)]);
    assert_eq!(hide_state(&sim, agent), HideState::Recover as i64);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIMultishotCount));
    // Only the last shot of the volley leaves a cooldown behind.
    assert_eq!(sim.blackboard(agent).power_cooldown(SHOOT), Timestamp(2_300));

    for _ in 0..5 {
        sim.step(TICK_MS);
    }
    assert_eq!(hide_state(&sim, agent), HideState::Hide as i64);

    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, HIDE).len(), 2);
    assert_eq!(hide_state(&sim, agent), HideState::Shooting as i64);

    // The next volley waits out the cooldown instead of burning shots.
    for _ in 0..5 {
        sim.step(TICK_MS);
    }
    assert_eq!(sim.activations(agent, SHOOT).len(), 3);
    assert_eq!(hide_state(&sim, agent), HideState::Shooting as i64);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIMultishotCount));
}

#[test]
fn hide_and_shoot_unhides_when_the_target_dies_mid_volley() {
    let (mut sim, agent, target) = sniper();

    for _ in 0..3 {
        sim.step(TICK_MS);
    }
    assert_eq!(sim.activations(agent, SHOOT).len(), 2);

    sim.kill(target);
    sim.step(TICK_MS);
    assert_eq!(hide_state(&sim, agent), HideState::Unhide as i64);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIMultishotCount));

    sim.step(TICK_MS);
    assert_eq!(sim.activations(agent, SHOOT).len(), 2);
    assert_eq!(sim.activations(agent, UNHIDE), vec![Timestamp(400)]);
    assert_eq!(hide_state(&sim, agent), HideState::Recover as i64);
}

#[test]
fn ally_breaks_off_and_returns_to_its_master() {
    let profile = ProfilePrototype::Ally(AllyProfile {
        base: ProfileBase {
            senses: SenseConfig {
                aggro_range: Some(40.0),
                ..SenseConfig::default()
            },
            ..ProfileBase::default()
        },
        follow: MoveToContext {
            destination: MoveToDestination::AssistedEntity,
            range: 5.0,
            ..MoveToContext::default()
        },
        combat_move: MoveToContext {
            range: 3.0,
            ..MoveToContext::default()
        },
        max_distance_from_master: 30.0,
        ..AllyProfile::default()
    });
    let mut sim = Sim::new(3, vec![entry(1, "squire", profile)]);
    let master = sim.spawn(SandboxEntity::at(Vector3::ZERO).stationary());
    let agent = sim.add_agent(SandboxEntity::at(Vector3::flat(5.0, 0.0)), 1);
    let enemy = sim.spawn(
        SandboxEntity::at(Vector3::flat(25.0, 0.0))
            .faction(1)
            .stationary(),
    );
    sim.controller_mut(agent).set_assisted_entity(Some(master));

    sim.step(TICK_MS);
    assert_eq!(sim.controller(agent).target(), Some(enemy));
    assert_eq!(sim.last_follow(agent), Some(enemy));

    for _ in 0..60 {
        if let Some(e) = sim.world.entity_mut(enemy) {
            e.position.x += 3.0;
        }
        sim.step(TICK_MS);
    }

    assert_eq!(sim.controller(agent).target(), None);
    assert_eq!(sim.last_follow(agent), Some(master));
    let pos = sim.world.entity(agent).map(|e| e.position);
    assert!(pos.is_some_and(|p| p.distance_2d(Vector3::ZERO) <= 30.0));
}

const LOOT: KeywordId = KeywordId(9);

fn scavenger() -> ProfilePrototype {
    ProfilePrototype::Scavenger(ScavengerProfile {
        select: SelectEntityContext {
            pool: SelectPool::AllInRange,
            range: 200.0,
            filters: vec![SelectFilter::HasKeyword(LOOT)],
            register: EntityRegistration::InteractEntity,
            ..SelectEntityContext::default()
        },
        move_to: MoveToContext {
            destination: MoveToDestination::InteractEntity,
            range: 5.0,
            ..MoveToContext::default()
        },
        ..ScavengerProfile::default()
    })
}

#[test]
fn scavenger_selects_interacts_and_despawns() {
    let mut sim = Sim::new(10, vec![entry(1, "looter", scavenger())]);
    let agent = sim.add_agent(SandboxEntity::at(Vector3::ZERO), 1);
    let loot = sim.spawn(
        SandboxEntity::at(Vector3::flat(50.0, 0.0))
            .keyword(LOOT)
            .stationary(),
    );

    sim.step(TICK_MS);
    assert_eq!(
        sim.blackboard(agent).get_int(PropertyKind::AICustomStateVal1),
        ScavengerState::Moving as i64
    );

    let mut ticks = 0;
    while sim.world.entity(agent).is_some() && ticks < 30 {
        sim.step(TICK_MS);
        ticks += 1;
    }

    assert!(sim.world.entity(agent).is_none());
    assert_eq!(
        sim.count(|c| *c == WorldCommand::Interact { entity: agent, target: loot }),
        1
    );
    assert_eq!(
        sim.count(|c| *c == WorldCommand::Destroy { entity: agent }),
        1
    );
    assert!(sim.world.entity(loot).is_some());
}

#[test]
fn scavenger_restarts_when_its_pick_disappears() {
    let mut sim = Sim::new(11, vec![entry(1, "looter", scavenger())]);
    let agent = sim.add_agent(SandboxEntity::at(Vector3::ZERO), 1);
    let first = sim.spawn(
        SandboxEntity::at(Vector3::flat(80.0, 0.0))
            .keyword(LOOT)
            .stationary(),
    );
    let state = |sim: &Sim| sim.blackboard(agent).get_int(PropertyKind::AICustomStateVal1);

    sim.step(TICK_MS);
    assert_eq!(state(&sim), ScavengerState::Moving as i64);

    assert!(sim.world.destroy(first));
    sim.step(TICK_MS);
    assert_eq!(state(&sim), ScavengerState::Select as i64);
    assert!(!sim.blackboard(agent).has(PropertyKind::AIInteractEntityId));

    // Nothing to pick: the scavenger keeps looking.
    sim.step(TICK_MS);
    assert_eq!(state(&sim), ScavengerState::Select as i64);

    let second = sim.spawn(
        SandboxEntity::at(Vector3::flat(-60.0, 0.0))
            .keyword(LOOT)
            .stationary(),
    );
    sim.step(TICK_MS);
    assert_eq!(state(&sim), ScavengerState::Moving as i64);
    assert_eq!(
        sim.blackboard(agent).get_entity(PropertyKind::AIInteractEntityId),
        Some(second)
    );
}
