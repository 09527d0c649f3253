//! End-to-end tests: generate, install, evaluate, export

use std::fs;

use glam::Vec3;
use rock_builder::procedural::write_obj;
use rock_builder::*;
use tempfile::tempdir;

fn light_params() -> RockParams {
    RockParams {
        viewport_subdivisions: 1,
        render_subdivisions: 2,
        ..Default::default()
    }
}

#[test]
fn test_generate_evaluate_export() {
    let params = light_params();
    let mut generator = RockGenerator::from_params(&params);
    let mut scene = Scene::new();

    let rock = generator
        .generate_one(Vec3::new(0.0, 0.0, 1.0), &params)
        .expect("generate rock");
    let id = RockGenerator::spawn(&mut scene, &rock).expect("spawn rock");

    let mesh = scene
        .evaluate(id, generator.cache(), EvaluationTarget::Viewport)
        .expect("evaluate stack");

    // Bevel may add geometry, subdivision then multiplies by 4
    assert!(mesh.triangle_count() >= rock.mesh.triangle_count() * 4);
    assert_eq!(mesh.triangle_count() % 4, 0);
    for &idx in &mesh.indices {
        assert!((idx as usize) < mesh.vertex_count());
    }
    for p in &mesh.positions {
        assert!(p.iter().all(|c| c.is_finite()));
    }

    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("rock.obj");
    write_obj(&mesh, &path, "Rock", rock.origin).expect("write obj");

    let text = fs::read_to_string(&path).expect("read obj");
    let v_lines = text.lines().filter(|l| l.starts_with("v ")).count();
    let f_lines = text.lines().filter(|l| l.starts_with("f ")).count();
    assert_eq!(v_lines, mesh.vertex_count());
    assert_eq!(f_lines, mesh.triangle_count());
}

#[test]
fn test_render_target_is_finer() {
    let params = light_params();
    let mut generator = RockGenerator::from_params(&params);
    let mut scene = Scene::new();

    let rock = generator.generate_one(Vec3::ZERO, &params).unwrap();
    let id = RockGenerator::spawn(&mut scene, &rock).unwrap();

    let viewport = scene
        .evaluate(id, generator.cache(), EvaluationTarget::Viewport)
        .unwrap();
    let render = scene
        .evaluate(id, generator.cache(), EvaluationTarget::Render)
        .unwrap();

    assert_eq!(render.triangle_count(), viewport.triangle_count() * 4);
}

#[test]
fn test_batch_into_scene_then_update() {
    let params = RockParams {
        rock_count: 4,
        spacing: 3.0,
        ..light_params()
    };
    let mut generator = RockGenerator::from_params(&params);
    let mut scene = Scene::new();

    let rocks = generator
        .generate_batch(Vec3::ZERO, &params)
        .expect("generate batch");
    let ids: Vec<ObjectId> = rocks
        .iter()
        .map(|rock| RockGenerator::spawn(&mut scene, rock).unwrap())
        .collect();
    assert_eq!(scene.len(), 4);

    // Origins of a 2x2 grid
    let locations: Vec<Vec3> = ids
        .iter()
        .map(|id| scene.location(*id).unwrap())
        .collect();
    assert_eq!(
        locations,
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(3.0, 3.0, 0.0),
        ]
    );

    let replaced = generator
        .update_in_place(&mut scene, ids[3], &params)
        .expect("update rock");
    assert_eq!(scene.len(), 4);
    assert_eq!(scene.location(replaced).unwrap(), Vec3::new(3.0, 3.0, 0.0));
    assert!(scene.get(ids[3]).is_none());

    // Every installed rock still evaluates against the shared cache
    for id in scene.ids() {
        scene
            .evaluate(id, generator.cache(), EvaluationTarget::Viewport)
            .unwrap();
    }
}

#[test]
fn test_params_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rocks.toml");

    let params = RockParams {
        rock_count: 3,
        reuse_coarse_texture: true,
        elongation: FloatRange::new(1.1, 1.2),
        ..Default::default()
    };
    fs::write(&path, params.to_toml_string().unwrap()).unwrap();

    let loaded = RockParams::load(&path).unwrap();
    assert_eq!(loaded, params);
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rocks.toml");
    fs::write(&path, "bevel_width = -0.5\n").unwrap();

    assert!(matches!(
        RockParams::load(&path),
        Err(ConfigError::Negative {
            field: "bevel_width",
            ..
        })
    ));
}
