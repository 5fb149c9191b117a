// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end behavior of the engine over a scene.

use ordoplay_timeline::{
    CommandDescriptor, CommandKind, EntityId, PropertyKey, PropertyValue, Scene, SceneEntity,
    TimelineEngine, TimelineEntity,
};

fn engine_for(scene: &Scene) -> TimelineEngine {
    let mut engine = TimelineEngine::new();
    engine.initialize_all(scene);
    engine
}

fn position(scene: &Scene, id: EntityId) -> [f32; 3] {
    scene.get(id).unwrap().transform.position
}

fn live_value(entity: &SceneEntity, key: PropertyKey) -> Option<PropertyValue> {
    match key {
        PropertyKey::Position => Some(PropertyValue::Vec3(entity.position())),
        PropertyKey::Rotation => Some(PropertyValue::Vec3(entity.rotation())),
        PropertyKey::Color => entity.color().map(PropertyValue::Color),
    }
}

fn resolved_baselines(engine: &TimelineEngine, id: EntityId) -> Vec<Option<PropertyValue>> {
    engine
        .pipeline(id)
        .unwrap()
        .commands()
        .iter()
        .map(|c| c.resolved_baseline())
        .collect()
}

/// Cube at the origin: move to (4,0,0) over 0..2, then add (0,2,0) over 2..4
fn move_then_add() -> (Scene, EntityId) {
    let mut scene = Scene::new("Example");
    let id = scene.add_entity(
        SceneEntity::new("Cube")
            .with_command(CommandDescriptor::move_to(0.0, 2.0, [4.0, 0.0, 0.0]))
            .with_command(CommandDescriptor::move_add(2.0, 4.0, [0.0, 2.0, 0.0])),
    );
    (scene, id)
}

#[test]
fn test_move_then_add_samples() {
    let (mut scene, id) = move_then_add();
    let mut engine = engine_for(&scene);

    engine.set_time(1.0, &mut scene);
    assert_eq!(position(&scene, id), [2.0, 0.0, 0.0]);

    engine.set_time(3.0, &mut scene);
    assert_eq!(position(&scene, id), [4.0, 1.0, 0.0]);

    engine.set_time(5.0, &mut scene);
    assert_eq!(position(&scene, id), [4.0, 2.0, 0.0]);
}

#[test]
fn test_parameter_edit_cascades_on_recalculate() {
    let (mut scene, id) = move_then_add();
    let mut engine = engine_for(&scene);

    scene.get_mut(id).unwrap().commands[0].kind = CommandKind::MoveTo {
        target: [10.0, 0.0, 0.0],
    };

    // Stale until the host asks for a recalculation
    engine.set_time(5.0, &mut scene);
    assert_eq!(position(&scene, id), [4.0, 2.0, 0.0]);

    engine.recalculate_all(&scene);
    engine.set_time(3.0, &mut scene);
    assert_eq!(position(&scene, id), [10.0, 1.0, 0.0]);
    engine.set_time(5.0, &mut scene);
    assert_eq!(position(&scene, id), [10.0, 2.0, 0.0]);
}

#[test]
fn test_outside_ranges_hold_last_finished_value() {
    let mut scene = Scene::new("Gaps");
    let id = scene.add_entity(
        SceneEntity::new("Cube")
            .with_position([1.0, 0.0, 0.0])
            .with_command(CommandDescriptor::move_add(1.0, 2.0, [2.0, 0.0, 0.0]))
            .with_command(CommandDescriptor::move_to(3.0, 4.0, [0.0, 5.0, 0.0]))
            .with_command(CommandDescriptor::rotate_add(5.0, 6.0, [0.0, 90.0, 0.0])),
    );
    let mut engine = engine_for(&scene);

    engine.set_time(0.5, &mut scene);
    assert_eq!(position(&scene, id), [1.0, 0.0, 0.0]);

    engine.set_time(2.5, &mut scene);
    assert_eq!(position(&scene, id), [3.0, 0.0, 0.0]);

    engine.set_time(4.5, &mut scene);
    assert_eq!(position(&scene, id), [0.0, 5.0, 0.0]);
    assert_eq!(scene.get(id).unwrap().transform.rotation, [0.0, 0.0, 0.0]);

    engine.set_time(7.0, &mut scene);
    assert_eq!(position(&scene, id), [0.0, 5.0, 0.0]);
    assert_eq!(scene.get(id).unwrap().transform.rotation, [0.0, 90.0, 0.0]);

    // Scrubbing back before every command writes nothing
    engine.set_time(0.5, &mut scene);
    assert_eq!(position(&scene, id), [0.0, 5.0, 0.0]);
    assert_eq!(scene.get(id).unwrap().transform.rotation, [0.0, 90.0, 0.0]);

    // Rewinding is explicit
    engine.restore_baselines(&mut scene);
    assert_eq!(position(&scene, id), [1.0, 0.0, 0.0]);
    assert_eq!(scene.get(id).unwrap().transform.rotation, [0.0, 0.0, 0.0]);
}

#[test]
fn test_before_start_leaves_host_values() {
    let mut scene = Scene::new("Host edits");
    let id = scene.add_entity(
        SceneEntity::new("Cube")
            .with_color(Some([0.0, 0.0, 0.0, 1.0]))
            .with_command(CommandDescriptor::move_to(2.0, 3.0, [4.0, 0.0, 0.0]))
            .with_command(CommandDescriptor::rotate_add(2.0, 3.0, [0.0, 45.0, 0.0]))
            .with_command(CommandDescriptor::set_color(2.0, 3.0, [1.0, 1.0, 1.0, 1.0])),
    );
    let mut engine = engine_for(&scene);

    let cube = scene.get_mut(id).unwrap();
    cube.transform.position = [7.0, 7.0, 7.0];
    cube.transform.rotation = [0.0, 0.0, 30.0];
    cube.color = Some([0.5, 0.5, 0.5, 1.0]);

    for time in [0.0, 1.0, 1.99] {
        engine.set_time(time, &mut scene);
        let cube = scene.get(id).unwrap();
        assert_eq!(cube.transform.position, [7.0, 7.0, 7.0]);
        assert_eq!(cube.transform.rotation, [0.0, 0.0, 30.0]);
        assert_eq!(cube.color, Some([0.5, 0.5, 0.5, 1.0]));
    }

    // Once started, commands interpolate from the baseline captured at rebuild
    engine.set_time(2.0, &mut scene);
    assert_eq!(position(&scene, id), [0.0, 0.0, 0.0]);
}

#[test]
fn test_rebuild_then_recalculate_is_idempotent() {
    let mut scene = Scene::new("Idempotent");
    let id = scene.add_entity(
        SceneEntity::new("Cube")
            .with_position([0.5, 0.5, 0.5])
            .with_rotation([0.0, 45.0, 0.0])
            .with_command(CommandDescriptor::move_add(0.0, 1.0, [1.0, 0.0, 0.0]))
            .with_command(CommandDescriptor::rotate_to(0.5, 1.5, [0.0, 180.0, 0.0]))
            .with_command(CommandDescriptor::move_add(1.0, 2.0, [0.0, 0.0, 3.0]))
            .with_command(CommandDescriptor::set_color(0.0, 2.0, [0.0, 1.0, 0.0, 1.0])),
    );
    let mut engine = engine_for(&scene);

    assert!(engine.rebuild_entity(&scene, id));
    let rebuilt = resolved_baselines(&engine, id);
    engine.recalculate_all(&scene);
    assert_eq!(resolved_baselines(&engine, id), rebuilt);
}

#[test]
fn test_additive_moves_chain() {
    let mut scene = Scene::new("Chain");
    let id = scene.add_entity(
        SceneEntity::new("Cube")
            .with_position([1.0, 1.0, 1.0])
            .with_command(CommandDescriptor::move_add(0.0, 1.0, [2.0, 0.0, 0.0]))
            .with_command(CommandDescriptor::move_add(1.0, 2.0, [0.0, 3.0, 0.0])),
    );
    let engine = engine_for(&scene);
    let commands = engine.pipeline(id).unwrap().commands();

    assert_eq!(
        commands[0].resolved_target(),
        Some(PropertyValue::Vec3([3.0, 1.0, 1.0]))
    );
    assert_eq!(commands[1].resolved_baseline(), commands[0].resolved_target());
    assert_eq!(
        commands[1].resolved_target(),
        Some(PropertyValue::Vec3([3.0, 4.0, 1.0]))
    );
}

#[test]
fn test_reordering_swaps_dependencies() {
    let add = CommandDescriptor::move_add(0.0, 1.0, [1.0, 0.0, 0.0]);
    let to = CommandDescriptor::move_to(2.0, 3.0, [5.0, 0.0, 0.0]);
    let (add_id, to_id) = (add.id, to.id);

    let mut scene = Scene::new("Reorder");
    let id = scene.add_entity(SceneEntity::new("Cube").with_command(add).with_command(to));
    let mut engine = engine_for(&scene);

    let pipeline = engine.pipeline(id).unwrap();
    assert_eq!(
        pipeline.command(to_id).unwrap().resolved_baseline(),
        Some(PropertyValue::Vec3([1.0, 0.0, 0.0]))
    );

    // Add moves after the absolute move and now chains from its target
    assert!(engine.set_command_time_range(&mut scene, id, add_id, 4.0, 5.0));
    let pipeline = engine.pipeline(id).unwrap();
    assert_eq!(pipeline.commands()[0].id(), to_id);
    assert_eq!(
        pipeline.command(to_id).unwrap().resolved_baseline(),
        Some(PropertyValue::Vec3([0.0, 0.0, 0.0]))
    );
    assert_eq!(
        pipeline.command(add_id).unwrap().resolved_target(),
        Some(PropertyValue::Vec3([6.0, 0.0, 0.0]))
    );
    engine.set_time(5.0, &mut scene);
    assert_eq!(position(&scene, id), [6.0, 0.0, 0.0]);

    // And back: the absolute move moves after the add
    engine.restore_baselines(&mut scene);
    assert!(engine.set_command_time_range(&mut scene, id, to_id, 6.0, 7.0));
    let pipeline = engine.pipeline(id).unwrap();
    assert_eq!(pipeline.commands()[0].id(), add_id);
    assert_eq!(
        pipeline.command(add_id).unwrap().resolved_target(),
        Some(PropertyValue::Vec3([1.0, 0.0, 0.0]))
    );
    assert_eq!(
        pipeline.command(to_id).unwrap().resolved_baseline(),
        Some(PropertyValue::Vec3([1.0, 0.0, 0.0]))
    );
}

#[test]
fn test_message_fires_once_per_recalculation() {
    let mut scene = Scene::new("Messages");
    let id = scene.add_entity(
        SceneEntity::new("Bell").with_command(CommandDescriptor::send_message(1.0, "Ping")),
    );
    let mut engine = engine_for(&scene);

    engine.set_time(0.5, &mut scene);
    assert!(scene.get(id).unwrap().messages.is_empty());

    for time in [1.0, 1.5, 2.0, 0.5, 3.0] {
        engine.set_time(time, &mut scene);
    }
    assert_eq!(scene.get(id).unwrap().messages, vec!["Ping".to_string()]);

    engine.recalculate_all(&scene);
    engine.set_time(1.0, &mut scene);
    assert_eq!(scene.get(id).unwrap().messages.len(), 2);
}

#[test]
fn test_range_boundaries_are_exact() {
    let mut scene = Scene::new("Boundaries");
    let first = scene.add_entity(
        SceneEntity::new("First")
            .with_position([1.0, 2.0, 3.0])
            .with_rotation([10.0, 0.0, 0.0])
            .with_command(CommandDescriptor::move_to(0.0, 1.0, [4.0, 4.0, 4.0]))
            .with_command(CommandDescriptor::rotate_add(0.0, 2.0, [0.0, 90.0, 0.0]))
            .with_command(CommandDescriptor::set_color(1.0, 3.0, [1.0, 0.0, 0.0, 1.0])),
    );
    let second = scene.add_entity(
        SceneEntity::new("Second")
            .with_position([0.3, 0.0, 0.0])
            .with_rotation([0.0, 0.0, 15.0])
            .with_command(CommandDescriptor::move_add(0.5, 1.7, [0.1, 0.2, 0.3]))
            .with_command(CommandDescriptor::rotate_to(0.25, 0.75, [0.0, 0.0, 270.0])),
    );
    let mut engine = engine_for(&scene);

    for id in [first, second] {
        let commands: Vec<_> = engine.pipeline(id).unwrap().commands().to_vec();
        for command in commands {
            let key = command.descriptor().property_key().unwrap();
            let descriptor = command.descriptor();

            engine.set_time(descriptor.start_time(), &mut scene);
            assert_eq!(
                live_value(scene.get(id).unwrap(), key),
                command.resolved_baseline(),
                "{} at start",
                descriptor.display_name()
            );

            engine.set_time(descriptor.end_time(), &mut scene);
            assert_eq!(
                live_value(scene.get(id).unwrap(), key),
                command.resolved_target(),
                "{} at end",
                descriptor.display_name()
            );
        }
    }
}

#[test]
fn test_inverted_range_acts_as_instant() {
    let mut inverted = CommandDescriptor::move_to(3.0, 4.0, [2.0, 2.0, 2.0]);
    inverted.set_end_time(1.0);

    let mut scene = Scene::new("Inverted");
    let id = scene.add_entity(SceneEntity::new("Cube").with_command(inverted));
    assert!(scene.validate().is_err());

    let mut engine = engine_for(&scene);
    engine.set_time(2.0, &mut scene);
    assert_eq!(position(&scene, id), [0.0, 0.0, 0.0]);

    engine.set_time(3.0, &mut scene);
    assert_eq!(position(&scene, id), [2.0, 2.0, 2.0]);
}

#[test]
fn test_color_command_inert_without_color_channel() {
    let mut scene = Scene::new("Markers");
    let id = scene.add_entity(
        SceneEntity::new("Marker")
            .with_color(None)
            .with_command(CommandDescriptor::set_color(0.0, 1.0, [1.0, 0.0, 0.0, 1.0]))
            .with_command(CommandDescriptor::move_to(0.0, 1.0, [1.0, 0.0, 0.0])),
    );
    let mut engine = engine_for(&scene);

    assert_eq!(engine.pipeline(id).unwrap().len(), 1);
    assert_eq!(scene.get(id).unwrap().commands.len(), 2);

    engine.set_time(1.0, &mut scene);
    assert_eq!(position(&scene, id), [1.0, 0.0, 0.0]);
    assert_eq!(scene.get(id).unwrap().color, None);
}

#[test]
fn test_entities_are_independent() {
    let (mut scene, cube) = move_then_add();
    let sphere = scene.add_entity(
        SceneEntity::new("Sphere")
            .with_position([0.0, 0.0, 9.0])
            .with_command(CommandDescriptor::move_add(0.0, 4.0, [0.0, 0.0, -4.0])),
    );
    let mut engine = engine_for(&scene);

    engine.set_time(5.0, &mut scene);
    assert_eq!(position(&scene, cube), [4.0, 2.0, 0.0]);
    assert_eq!(position(&scene, sphere), [0.0, 0.0, 5.0]);

    assert!(engine.unregister_entity(cube));
    engine.set_time(1.0, &mut scene);
    assert_eq!(position(&scene, cube), [4.0, 2.0, 0.0]);
    assert_eq!(position(&scene, sphere), [0.0, 0.0, 8.0]);
}
