/// Example: Print plane extents and mesh statistics for a config
///
/// Usage: cargo run --example mesh_stats -- mode=crop texture=1920x1080

use std::env;
use std::io;
use tinyplanet_core::{
    Camera, PlanetConfig, ProjectionMode, ProjectionStrategy, ScaleCalculator, TinyPlanetProjection,
};
use tinyplanet_terminal::to_io_error;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = PlanetConfig::parse(&args.join(" ")).map_err(to_io_error)?;

    println!(
        "{:?} texture {}x{} (ratio {:.3})",
        config.mode,
        config.texture_size.width(),
        config.texture_size.height(),
        config.texture_size.ratio()
    );

    let mut calculator = ScaleCalculator::new(config.mode, config.texture_size);
    for viewport_ratio in [0.5, 1.0, 4.0 / 3.0, 16.0 / 9.0, 2.0] {
        calculator.set_viewport_ratio(viewport_ratio).map_err(to_io_error)?;
        let e = calculator.calculate();
        println!(
            "  viewport {:.3}: viewport {:.3}x{:.3} texture {:.3}x{:.3}",
            viewport_ratio, e.viewport_width, e.viewport_height, e.texture_width, e.texture_height
        );
    }

    let camera = Camera::default();
    let mut projection =
        TinyPlanetProjection::from_config(&config, &camera).map_err(to_io_error)?;
    projection.load().map_err(to_io_error)?;
    let frustum = projection.frustum(&camera).map_err(to_io_error)?;
    println!("ortho frustum at aspect {:.3}: {:?}", camera.aspect, frustum);

    for mode in [ProjectionMode::TinyPlanet, ProjectionMode::Perspective] {
        let strategy = mode.create(&config, &camera).map_err(to_io_error)?;
        if let Some(mesh) = strategy.mesh() {
            println!(
                "{:?}: {} points, {} triangles",
                mode,
                mesh.point_count(),
                mesh.triangle_count()
            );
        }
    }

    Ok(())
}
