use std::path::Path;

use image::{Rgba, RgbaImage};
use mirror_stage::{
    hex_color, Backdrop, EnvironmentState, FaceSet, NativeFetcher, HeadlessTarget, SceneConfig,
    SceneHandle, FALLBACK_COLOR,
};

const FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

fn write_faces(dir: &Path, extension: &str) {
    for (index, name) in FACES.iter().enumerate() {
        let shade = 40 * index as u8;
        RgbaImage::from_pixel(8, 8, Rgba([shade, 255 - shade, 128, 255]))
            .save(dir.join(format!("{name}.{extension}")))
            .expect("write face");
    }
}

fn mirror_scene(faces: FaceSet) -> SceneHandle<HeadlessTarget> {
    let mut config = SceneConfig::preset("mirror").expect("preset");
    config.environment = Some(faces);
    SceneHandle::initialize(&config, 1280, 720, HeadlessTarget::new(1280, 720))
        .expect("valid scene")
}

#[test]
fn complete_cube_map_becomes_backdrop_and_reflection() {
    let dir = tempfile::tempdir().unwrap();
    write_faces(dir.path(), "png");
    let faces = FaceSet::directory(dir.path(), "png");
    let mut handle = mirror_scene(faces.clone());
    assert_eq!(handle.viewport.camera_config().distance, 3.5);

    handle.tick().unwrap();
    let first = handle.target.last_frame().unwrap().clone();
    assert_eq!(first.backdrop, Backdrop::Color(hex_color(0x333333)));
    assert_eq!(first.reflecting_parts, 0);

    assert!(handle.resolve_environment(pollster::block_on(faces.load(&NativeFetcher))));
    handle.tick().unwrap();
    let frame = handle.target.last_frame().unwrap();
    assert!(matches!(frame.backdrop, Backdrop::Environment(ref cube) if cube.size() == 8));
    assert!(frame.reflecting_parts >= 1);
    assert_eq!(frame.index, 2);
}

#[test]
fn one_bad_face_falls_back_to_grey_and_keeps_animating() {
    let dir = tempfile::tempdir().unwrap();
    write_faces(dir.path(), "png");
    let mut names = FACES.map(|name| format!("{name}.png"));
    names[5] = "negz.jpg".to_string();
    let faces = FaceSet::with_names(
        mirror_stage::environment::FaceBase::Directory(dir.path().to_path_buf()),
        names,
    );
    let mut handle = mirror_scene(faces.clone());

    let result = pollster::block_on(faces.load(&NativeFetcher));
    assert!(result.is_err());
    handle.resolve_environment(result);

    for _ in 0..25 {
        handle.tick().unwrap();
    }
    let frame = handle.target.last_frame().unwrap();
    assert_eq!(frame.backdrop, Backdrop::Color(hex_color(FALLBACK_COLOR)));
    assert_eq!(frame.reflecting_parts, 0);
    assert_eq!(handle.target.frames(), 25);
    assert!(matches!(
        handle.scene.environment.state(),
        EnvironmentState::Failed(_)
    ));
    assert!((handle.scene.subject.transform.rotation.y - 25.0 * 0.005).abs() < 1e-4);
}

#[test]
fn resize_updates_aspect_and_surface() {
    let mut handle = mirror_scene(FaceSet::directory("missing", "jpeg"));
    handle.resize(800, 600);
    handle.tick().unwrap();
    let frame = handle.target.last_frame().unwrap();
    assert_eq!(frame.surface, (800, 600));
    assert!((frame.aspect - 800.0 / 600.0).abs() < 1e-5);
    assert!((handle.viewport.aspect() - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn cube_preset_runs_without_environment() {
    let config = SceneConfig::preset("cube").unwrap();
    let mut handle =
        SceneHandle::initialize(&config, 640, 480, HeadlessTarget::new(640, 480)).unwrap();
    for _ in 0..10 {
        handle.tick().unwrap();
    }
    let frame = handle.target.last_frame().unwrap();
    assert_eq!(frame.backdrop, Backdrop::Color(hex_color(0x202020)));
    assert_eq!(handle.scene.environment.state(), &EnvironmentState::Absent);
    assert_eq!(handle.scene.subject.parts.len(), 1);
}
