//! Merge rule engine: fuses touching items of equal tier.
//!
//! ## Pipeline
//!
//! 1. Rapier writes a `CollisionEvent::Started` for every new contact between
//!    colliders with `ActiveEvents::COLLISION_EVENTS`.
//! 2. [`landing_system`] clears the [`Airborne`] marker from any item that
//!    touched something for the first time.
//! 3. [`merge_items_system`] collects the contact pairs of the frame and hands
//!    them to [`plan_merges`], which decides every fusion up front.
//! 4. The plan is applied through `Commands`: both sources despawned, one item
//!    of the next tier spawned at their midpoint, score awarded, and an
//!    [`ItemsMerged`] message written for the particle layer.
//!
//! A fused item starts [`Airborne`] like a fresh drop.  It has not been
//! through a physics step yet, so its zero velocity says nothing about rest;
//! its first contact lands it again.
//!
//! Both systems run in `PostUpdate` after Rapier's writeback, so nothing here
//! mutates the physics world mid-step.

use crate::arena::{despawn_items, spawn_item, Airborne, Item};
use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use crate::menu::GameState;
use crate::session::GameSession;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;

/// A fusion that happened this frame.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ItemsMerged {
    /// Midpoint of the two consumed items; the fused item spawns here.
    pub position: Vec2,
    /// Tier of the fused item.
    pub tier: u8,
    /// Points awarded (the consumed tier's score).
    pub points: u32,
}

/// One fusion decided by [`plan_merges`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedMerge<H> {
    pub consumed: [H; 2],
    pub tier: u8,
    pub position: Vec2,
    pub points: u32,
}

pub struct MergePlugin;

impl Plugin for MergePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ItemsMerged>().add_systems(
            PostUpdate,
            (landing_system, merge_items_system)
                .chain()
                .after(PhysicsSet::Writeback)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Tier produced by two touching items, or `None` when they do not fuse.
///
/// Items fuse only when their tiers match and a successor tier exists.
#[inline]
pub fn fuse_rule(catalog: &ItemCatalog, a: u8, b: u8) -> Option<u8> {
    if a != b {
        return None;
    }
    catalog.successor(a)
}

/// Decide every fusion for a batch of contact pairs, in delivery order.
///
/// `probe` reports the tier and position of a live item, or `None` for walls
/// and handles that no longer exist.  A handle consumed by an earlier pair in
/// the batch is never reconsidered, so one item can take part in at most one
/// fusion per batch.
pub fn plan_merges<H, I, F>(catalog: &ItemCatalog, contacts: I, mut probe: F) -> Vec<PlannedMerge<H>>
where
    H: Copy + Eq + Hash,
    I: IntoIterator<Item = (H, H)>,
    F: FnMut(H) -> Option<(u8, Vec2)>,
{
    let mut consumed: HashSet<H> = HashSet::new();
    let mut plan = Vec::new();

    for (a, b) in contacts {
        if a == b || consumed.contains(&a) || consumed.contains(&b) {
            continue;
        }
        let (Some((tier_a, pos_a)), Some((tier_b, pos_b))) = (probe(a), probe(b)) else {
            continue;
        };
        let Some(tier) = fuse_rule(catalog, tier_a, tier_b) else {
            continue;
        };
        let points = catalog.get(tier_a).map_or(0, |t| t.score);

        consumed.insert(a);
        consumed.insert(b);
        plan.push(PlannedMerge {
            consumed: [a, b],
            tier,
            position: (pos_a + pos_b) * 0.5,
            points,
        });
    }
    plan
}

/// Remove [`Airborne`] from items that just made their first contact.
pub fn landing_system(
    mut commands: Commands,
    mut collisions: MessageReader<CollisionEvent>,
    q_airborne: Query<(), (With<Item>, With<Airborne>)>,
) {
    for event in collisions.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };
        for entity in [e1, e2] {
            if q_airborne.contains(entity) {
                commands.entity(entity).remove::<Airborne>();
            }
        }
    }
}

/// Apply this frame's fusions to the world and the session score.
pub fn merge_items_system(
    mut commands: Commands,
    mut collisions: MessageReader<CollisionEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    q_items: Query<(&Item, &Transform)>,
    mut session: ResMut<GameSession>,
    mut merged: MessageWriter<ItemsMerged>,
) {
    let contacts = collisions.read().filter_map(|event| match event {
        CollisionEvent::Started(e1, e2, _) => Some((*e1, *e2)),
        CollisionEvent::Stopped(..) => None,
    });
    let plan = plan_merges(&catalog, contacts, |entity| {
        q_items
            .get(entity)
            .ok()
            .map(|(item, transform)| (item.tier, transform.translation.truncate()))
    });

    for merge in plan {
        despawn_items(&mut commands, merge.consumed);
        let fused = spawn_item(&mut commands, &catalog, &config, merge.tier, merge.position);
        if let Some(fused) = fused {
            commands.entity(fused).insert(Airborne);
        }
        session.award(merge.points);
        merged.write(ItemsMerged {
            position: merge.position,
            tier: merge.tier,
            points: merge.points,
        });
        debug!(
            "Merged into tier {} at ({:.0}, {:.0}), +{} (score {})",
            merge.tier, merge.position.x, merge.position.y, merge.points, session.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
    use std::collections::HashMap;

    fn bodies(entries: &[(u32, u8, Vec2)]) -> HashMap<u32, (u8, Vec2)> {
        entries.iter().map(|&(h, t, p)| (h, (t, p))).collect()
    }

    #[test]
    fn rule_fuses_only_equal_non_max_tiers() {
        let catalog = ItemCatalog::default();
        assert_eq!(fuse_rule(&catalog, 0, 0), Some(1));
        assert_eq!(fuse_rule(&catalog, 8, 8), Some(9));
        assert_eq!(fuse_rule(&catalog, 9, 9), None);
        assert_eq!(fuse_rule(&catalog, 2, 3), None);
        assert_eq!(fuse_rule(&catalog, 40, 40), None);
    }

    #[test]
    fn plan_places_fused_item_at_midpoint() {
        let catalog = ItemCatalog::default();
        let world = bodies(&[(1, 0, Vec2::new(100.0, 50.0)), (2, 0, Vec2::new(140.0, 70.0))]);
        let plan = plan_merges(&catalog, [(1, 2)], |h| world.get(&h).copied());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].consumed, [1, 2]);
        assert_eq!(plan[0].tier, 1);
        assert_eq!(plan[0].position, Vec2::new(120.0, 60.0));
        assert_eq!(plan[0].points, 2);
    }

    #[test]
    fn plan_skips_differing_and_max_tiers() {
        let catalog = ItemCatalog::default();
        let world = bodies(&[
            (1, 3, Vec2::ZERO),
            (2, 4, Vec2::ZERO),
            (3, 9, Vec2::ZERO),
            (4, 9, Vec2::ZERO),
        ]);
        let plan = plan_merges(&catalog, [(1, 2), (3, 4)], |h| world.get(&h).copied());
        assert!(plan.is_empty());
    }

    #[test]
    fn consumed_body_is_not_reconsidered() {
        let catalog = ItemCatalog::default();
        // Body 2 touches both 1 and 3 in the same batch.
        let world = bodies(&[(1, 2, Vec2::ZERO), (2, 2, Vec2::X), (3, 2, Vec2::Y)]);
        let plan = plan_merges(&catalog, [(1, 2), (2, 3), (3, 1)], |h| world.get(&h).copied());
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].consumed, [1, 2]);
    }

    #[test]
    fn contacts_with_walls_or_missing_bodies_are_ignored() {
        let catalog = ItemCatalog::default();
        let world = bodies(&[(1, 0, Vec2::ZERO)]);
        let plan = plan_merges(&catalog, [(1, 99), (99, 1), (1, 1)], |h| world.get(&h).copied());
        assert!(plan.is_empty());
    }

    // ── ECS ──────────────────────────────────────────────────────────────────

    fn merge_test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.init_state::<GameState>();
        app.add_message::<CollisionEvent>();
        app.add_message::<ItemsMerged>();
        app.insert_resource(GameConfig::default());
        app.insert_resource(ItemCatalog::default());
        app.insert_resource(GameSession::default());
        app.add_systems(PostUpdate, (landing_system, merge_items_system).chain());
        app
    }

    fn spawn_test_item(app: &mut App, tier: u8, pos: Vec2) -> Entity {
        app.world_mut()
            .spawn((Item { tier }, Transform::from_translation(pos.extend(0.0))))
            .id()
    }

    fn touch(app: &mut App, a: Entity, b: Entity) {
        app.world_mut().write_message(CollisionEvent::Started(
            a,
            b,
            CollisionEventFlags::empty(),
        ));
    }

    fn items(world: &mut World) -> Vec<(u8, Vec2)> {
        world
            .query::<(&Item, &Transform)>()
            .iter(world)
            .map(|(i, t)| (i.tier, t.translation.truncate()))
            .collect()
    }

    #[test]
    fn two_tier_zero_items_fuse_and_score() {
        let mut app = merge_test_app();
        let a = spawn_test_item(&mut app, 0, Vec2::new(100.0, 40.0));
        let b = spawn_test_item(&mut app, 0, Vec2::new(140.0, 40.0));
        touch(&mut app, a, b);

        app.update();

        let world = app.world_mut();
        assert_eq!(items(world), vec![(1, Vec2::new(120.0, 40.0))]);
        assert!(world.get_entity(a).is_err());
        assert!(world.get_entity(b).is_err());
        assert_eq!(world.resource::<GameSession>().score, 2);
    }

    #[test]
    fn fused_item_starts_airborne() {
        let mut app = merge_test_app();
        let a = spawn_test_item(&mut app, 2, Vec2::new(200.0, 480.0));
        let b = spawn_test_item(&mut app, 2, Vec2::new(200.0, 540.0));
        touch(&mut app, a, b);

        app.update();

        let world = app.world_mut();
        let fused: Vec<u8> = world
            .query_filtered::<&Item, With<Airborne>>()
            .iter(world)
            .map(|i| i.tier)
            .collect();
        assert_eq!(fused, vec![3]);
    }

    #[test]
    fn max_tier_contact_changes_nothing() {
        let mut app = merge_test_app();
        let a = spawn_test_item(&mut app, 9, Vec2::new(100.0, 40.0));
        let b = spawn_test_item(&mut app, 9, Vec2::new(300.0, 40.0));
        touch(&mut app, a, b);

        app.update();

        let world = app.world_mut();
        assert_eq!(items(world).len(), 2);
        assert_eq!(world.resource::<GameSession>().score, 0);
    }

    #[test]
    fn differing_tiers_only_bounce() {
        let mut app = merge_test_app();
        let a = spawn_test_item(&mut app, 1, Vec2::new(100.0, 40.0));
        let b = spawn_test_item(&mut app, 2, Vec2::new(150.0, 40.0));
        touch(&mut app, a, b);

        app.update();

        let world = app.world_mut();
        let mut tiers: Vec<u8> = items(world).into_iter().map(|(t, _)| t).collect();
        tiers.sort_unstable();
        assert_eq!(tiers, vec![1, 2]);
        assert_eq!(world.resource::<GameSession>().score, 0);
    }

    #[test]
    fn first_contact_clears_airborne() {
        let mut app = merge_test_app();
        let falling = app
            .world_mut()
            .spawn((Item { tier: 3 }, Airborne, Transform::default()))
            .id();
        let floor = app.world_mut().spawn(Transform::default()).id();
        touch(&mut app, floor, falling);

        app.update();

        assert!(app.world().get::<Airborne>(falling).is_none());
        assert!(app.world().get::<Item>(falling).is_some());
    }
}
