//! End-to-end pipeline test: shape → rasterize → pack → layout →
//! upload → draw → destroy → rebuild.
//!
//! Skips quietly when the environment has no GPU adapter or no system
//! fonts, so CI machines without either still pass.

use fontdb::{Database, Family, Query, Source};
use quill_render::{CameraUniform, GpuContext, Renderer};
use quill_text::{FontFace, GlyphRasterizer, ShapingContext, TextRun, TextRunConfig};

fn system_font() -> Option<FontFace> {
    let mut db = Database::new();
    db.load_system_fonts();
    let id = db.query(&Query {
        families: &[Family::SansSerif],
        ..Query::default()
    })?;
    let face = db.face(id)?;
    let bytes = match &face.source {
        Source::File(path) => std::fs::read(path).ok()?,
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    FontFace::from_bytes(bytes, face.index).ok()
}

#[test]
fn test_build_draw_destroy_rebuild_round_trip() {
    let Some(face) = system_font() else { return };
    let Ok(gpu) = pollster::block_on(GpuContext::new()) else { return };

    let mut shaper = ShapingContext::new(face);
    let mut rasterizer = GlyphRasterizer::new();
    let config = TextRunConfig {
        text: "How to render text".into(),
        letter_spacing: 8.0,
        ..Default::default()
    };

    let run = TextRun::build(&mut shaper, &mut rasterizer, &config, 40.0, [20.0, 400.0])
        .expect("run should build");
    assert!(run.glyph_count > 0);

    let renderer = Renderer::new(&gpu);
    renderer.prepare(&gpu, &CameraUniform::orthographic(800.0, 600.0));

    let gpu_run = renderer.text_pipeline().upload(&gpu, &run, [0.0, 0.5, 0.5, 1.0]);
    let target = gpu.create_offscreen_target(800, 600);
    let stats = renderer.render(&gpu, &target, &[&gpu_run]);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.glyph_count, run.glyph_count);

    gpu_run.destroy();

    // Rebuilding from the same configuration is bit-identical.
    let rebuilt = TextRun::build(&mut shaper, &mut rasterizer, &config, 40.0, [20.0, 400.0])
        .expect("rebuild should succeed");
    assert_eq!(rebuilt.vertices, run.vertices);
    assert_eq!(rebuilt.indices, run.indices);
    assert_eq!(rebuilt.atlas.pixels, run.atlas.pixels);
}

#[test]
fn test_multiple_runs_one_frame() {
    let Some(face) = system_font() else { return };
    let Ok(gpu) = pollster::block_on(GpuContext::new()) else { return };

    let mut shaper = ShapingContext::new(face);
    let mut rasterizer = GlyphRasterizer::new();

    let configs = [
        TextRunConfig { text: "Single Texture".into(), ..Default::default() },
        TextRunConfig { text: "How to render text".into(), letter_spacing: 8.0, ..Default::default() },
    ];
    let sizes = [30.0, 40.0];
    let pens = [[20.0, 550.0], [20.0, 400.0]];

    let renderer = Renderer::new(&gpu);
    renderer.prepare(&gpu, &CameraUniform::orthographic(800.0, 600.0));

    let mut gpu_runs = Vec::new();
    for ((config, size), pen) in configs.iter().zip(sizes).zip(pens) {
        let run = TextRun::build(&mut shaper, &mut rasterizer, config, size, pen).unwrap();
        gpu_runs.push(renderer.text_pipeline().upload(&gpu, &run, [0.0, 0.0, 0.0, 1.0]));
    }

    let target = gpu.create_offscreen_target(800, 600);
    let refs: Vec<&quill_render::GpuTextRun> = gpu_runs.iter().collect();
    let stats = renderer.render(&gpu, &target, &refs);
    assert_eq!(stats.draw_calls, 2);

    for gpu_run in gpu_runs {
        gpu_run.destroy();
    }
}
