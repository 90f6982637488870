use std::time::Instant;

use log::{info, warn};

use rasterite::camera::{Camera, CameraController};
use rasterite::material::Material;
use rasterite::math::{Mat4, Vec3};
use rasterite::mesh::Mesh;
use rasterite::registry::ResourceRegistry;
use rasterite::render::Renderer;
use rasterite::scene::Scene;
use rasterite::settings::{CullMode, RenderMode, Settings};
use rasterite::window::{FpsCounter, Key, Window, WindowEvent, WINDOW_HEIGHT, WINDOW_WIDTH};

fn load_resources(registry: &mut ResourceRegistry) {
    let textures = [
        ("vehicle_diffuse", "resources/vehicle_diffuse.png"),
        ("vehicle_normal", "resources/vehicle_normal.png"),
        ("vehicle_specular", "resources/vehicle_specular.png"),
        ("vehicle_gloss", "resources/vehicle_gloss.png"),
        ("fire_diffuse", "resources/fire_diffuse.png"),
    ];
    for (tag, path) in textures {
        if let Err(e) = registry.load_texture(tag, path) {
            warn!("could not load texture '{}' from {}: {}", tag, path, e);
        }
    }

    registry.add_material(
        "vehicle",
        Material::phong(
            registry.texture("vehicle_diffuse"),
            registry.texture("vehicle_normal"),
            registry.texture("vehicle_specular"),
            registry.texture("vehicle_gloss"),
        ),
    );
    registry.add_material(
        "fire",
        Material::transparent_diffuse(registry.texture("fire_diffuse")),
    );
}

fn load_scene(registry: &ResourceRegistry, scene: &mut Scene) {
    let meshes = [
        ("resources/vehicle.obj", "vehicle", CullMode::Backface),
        ("resources/fire.obj", "fire", CullMode::None),
    ];

    for (path, material_tag, cull_mode) in meshes {
        let Some(material) = registry.material(material_tag) else {
            continue;
        };
        match Mesh::from_file(path, material, cull_mode, Mat4::identity()) {
            Ok(mesh) => {
                info!(
                    "loaded mesh {} ({} vertices, {} triangles)",
                    path,
                    mesh.vertices().len(),
                    mesh.indices().len() / 3
                );
                scene.add_mesh(mesh);
            }
            Err(e) => warn!("could not load mesh {}: {}", path, e),
        }
    }
}

fn print_controls() {
    println!("---------------- Software Rasterizer ----------------");
    println!("Camera:");
    println!("  - RMB + mouse: look around");
    println!("  - RMB + WASD / arrows: move in the ground plane");
    println!("  - LMB + RMB + mouse: pan");
    println!("  - LMB + mouse: walk and turn");
    println!("  - I / O: zoom in / out");
    println!();
    println!("Settings:");
    println!("  - T: toggle transparency");
    println!("  - C: cycle cull mode (mesh-based / none / backface / frontface)");
    println!("  - R: toggle software/hardware rendering");
    println!("  - F: cycle filter mode (hardware only)");
    println!("  - P: print FPS");
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut window = Window::new("Rasterite", WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let mut renderer = Renderer::new(WINDOW_WIDTH, WINDOW_HEIGHT);
    let mut settings = Settings::new();
    let mut camera = Camera::new(
        Vec3::new(-10.0, 5.0, 65.0),
        Vec3::FORWARD,
        WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32,
        60.0,
        0.1,
        1000.0,
    );
    let controller = CameraController::default();

    let mut registry = ResourceRegistry::new();
    load_resources(&mut registry);

    let mut scene = Scene::new();
    load_scene(&registry, &mut scene);

    print_controls();

    let mut fps = FpsCounter::new();
    let mut last_frame = Instant::now();

    'main_loop: loop {
        match window.poll_events() {
            WindowEvent::Quit => break 'main_loop,
            WindowEvent::Resize(width, height) => {
                window.resize(width, height)?;
                renderer.resize(width, height);
                camera.set_aspect_ratio(width as f32 / height as f32);
            }
            WindowEvent::KeyPress(key) => match key {
                Key::F => {
                    settings.toggle_filter_mode();
                    info!("filter mode: {}", settings.filter_mode());
                }
                Key::R => {
                    settings.toggle_render_mode();
                    if settings.render_mode() == RenderMode::Hardware {
                        // A hardware backend would take over here and the
                        // camera would switch to left-handed projection
                        warn!("no hardware backend available, software path keeps rendering");
                    }
                    info!("render mode: {}", settings.render_mode());
                }
                Key::T => {
                    settings.toggle_transparency();
                    info!("transparency: {}", settings.use_transparency());
                }
                Key::C => {
                    settings.toggle_cull_mode();
                    info!("cull mode: {}", settings.cull_mode());
                }
                Key::P => println!("FPS: {:.0}", fps.fps()),
            },
            WindowEvent::None => {}
        }

        let delta_time = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();

        let input = window.input_state();
        controller.update(&mut camera, &input, delta_time);
        scene.update(delta_time);

        renderer.render(&camera, &scene, &settings);
        window.present(renderer.as_bytes())?;

        fps.tick();
    }

    Ok(())
}
