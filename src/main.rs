use std::path::Path;

use toy_ngin::{
    config::Config,
    objects::{RenderObject, axis::Axis, ground::Ground, wavefront::WavefrontObject},
    resources::load_model,
    world::World,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::load_or_default("assets/config.toml");
    let mut world = World::new(config);

    world.add_render_object(Box::new(|ctx| {
        Box::pin(async move {
            let ground = Ground::new(
                &ctx.device,
                &ctx.queue,
                ctx.format,
                "ground",
                100.0,
                "assets/shaders/ground.vert.wgsl",
                "assets/shaders/ground.frag.wgsl",
            )
            .await?;
            Ok(Box::new(ground) as Box<dyn RenderObject>)
        })
    }));

    world.add_render_object(Box::new(|ctx| {
        Box::pin(async move {
            let axis = Axis::new(
                &ctx.device,
                ctx.format,
                "axis",
                50.0,
                "assets/shaders/flat.vert.wgsl",
                "assets/shaders/flat.frag.wgsl",
            )
            .await?;
            Ok(Box::new(axis) as Box<dyn RenderObject>)
        })
    }));

    world.add_render_object(Box::new(|ctx| {
        Box::pin(async move {
            let cube = WavefrontObject::new(
                &ctx.device,
                &ctx.queue,
                ctx.format,
                "cube",
                Path::new("assets/models"),
                "icosphere.obj",
                "assets/shaders/lighting.vert.wgsl",
                "assets/shaders/lighting.frag.wgsl",
            )
            .await?
            .with_position([5.0, 0.0, -5.0].into())
            .with_scale([8.0, 8.0, 8.0].into());
            Ok(Box::new(cube) as Box<dyn RenderObject>)
        })
    }));

    // Imported scene model; the first run writes the binary cache next to
    // the file and later runs skip the importer entirely.
    world.add_render_object(Box::new(|ctx| {
        Box::pin(async move {
            let mut model = load_model(
                &ctx.device,
                &ctx.queue,
                ctx.format,
                "cube_scene",
                Path::new("assets/models"),
                "cube.glb",
                "",
                "",
            )
            .await?;
            model.set_position([-8.0, 2.0, 5.0].into());
            model.set_scale([2.0, 2.0, 2.0].into());
            Ok(Box::new(model) as Box<dyn RenderObject>)
        })
    }));

    world.run()
}
