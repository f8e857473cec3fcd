// Host-side checks that the packed uniform blocks agree with the WGSL programs
// and with the CPU wave field.

use glam::{Vec3, Vec4};
use storm_core::shader::{encode_wave_shape, UniformKind};
use storm_core::wave::{Trig, WaveAxis};
use storm_core::{
    Camera, FrameUniforms, GridSpec, LightState, OceanUniforms, Vignette, WaveParameters,
    WaveTerm, FOAM_THRESHOLD, MAX_LIGHTS, OCEAN_SHADER, RAIN_SHADER, SCENE_SHADER,
};

#[test]
fn uniform_blocks_have_wgsl_compatible_sizes() {
    assert_eq!(std::mem::size_of::<OceanUniforms>(), 192);
    assert_eq!(std::mem::size_of::<FrameUniforms>(), 256);
    assert_eq!(std::mem::size_of::<OceanUniforms>() % 16, 0);
}

#[test]
fn every_declared_uniform_appears_in_the_source() {
    for shader in [&OCEAN_SHADER, &SCENE_SHADER, &RAIN_SHADER] {
        for u in shader.uniforms {
            assert!(
                shader.source.contains(u.name),
                "{} does not mention {}",
                shader.label(),
                u.name
            );
        }
    }
}

#[test]
fn ocean_program_exposes_both_vertex_paths() {
    for entry in ["fn vs_host", "fn vs_displaced", "fn fs_ocean"] {
        assert!(OCEAN_SHADER.source.contains(entry), "missing {entry}");
    }
    assert!(SCENE_SHADER.source.contains("fn vs_main"));
    assert!(RAIN_SHADER.source.contains("fn vs_rain"));
    assert_eq!(OCEAN_SHADER.label(), "ocean_v1");
}

#[test]
fn uniform_table_lookup() {
    let time = OCEAN_SHADER.uniform("time").unwrap();
    assert_eq!(time.kind, UniformKind::F32);
    assert!(time.per_frame);
    assert!(!OCEAN_SHADER.uniform("deepColor").unwrap().per_frame);
    assert!(OCEAN_SHADER.uniform("nope").is_none());
}

#[test]
fn packed_block_mirrors_the_host_wave_field() {
    for vignette in [Vignette::TropicalRain, Vignette::NightStorm, Vignette::CalmSea] {
        let cfg = vignette.config();
        let mut u = OceanUniforms::new(&cfg.waves, &cfg.grid);
        for &t in &[0.0f32, 0.4, 3.7, 42.0] {
            u.set_frame(t, cfg.camera.view_projection());
            for &(x, z) in &[(0.0f32, 0.0f32), (-12.5, 3.0), (30.0, -44.0), (7.25, 7.25)] {
                let host = cfg.waves.height_at(x, z, t);
                let gpu = u.displacement_at(x, z);
                assert!(
                    (host - gpu).abs() < 1e-5,
                    "{}: host {host} vs packed {gpu} at ({x},{z},{t})",
                    cfg.name
                );
            }
        }
        assert_eq!(u.base_height, cfg.grid.base_height);
    }
}

#[test]
fn extra_terms_are_truncated_for_the_gpu() {
    let terms: Vec<WaveTerm> = (0..6)
        .map(|i| WaveTerm::new(0.1, 0.2 + i as f32 * 0.1, 1.0, WaveAxis::X))
        .collect();
    let params = WaveParameters::alternating(terms);
    let u = OceanUniforms::new(&params, &GridSpec::default());
    assert_eq!(u.term_count, 4.0);
    // Foam still scales by every term, so the GPU blend matches surface_color.
    assert!((u.foam[1] - params.total_amplitude()).abs() < 1e-6);
    assert!((u.foam[1] - 0.6).abs() < 1e-6);
}

#[test]
fn foam_settings_come_from_the_host() {
    let cfg = Vignette::NightStorm.config();
    let u = OceanUniforms::new(&cfg.waves, &cfg.grid);
    assert_eq!(u.foam[0], FOAM_THRESHOLD);
    assert_eq!(u.foam[1], cfg.waves.total_amplitude());
    assert!(!OCEAN_SHADER.source.contains("0.35"));
}

#[test]
fn wave_shape_encoding() {
    assert_eq!(encode_wave_shape(WaveAxis::X, Trig::Sin), 0.0);
    assert_eq!(encode_wave_shape(WaveAxis::Z, Trig::Sin), 1.0);
    assert_eq!(encode_wave_shape(WaveAxis::XPlusZ, Trig::Cos), 6.0);
}

#[test]
fn frame_block_caps_lights() {
    let lights: Vec<LightState> = (0..MAX_LIGHTS + 2)
        .map(|i| LightState::orbiting(5.0, i as f32, 0.0, 1.0))
        .collect();
    let u = FrameUniforms::new(&Camera::default(), &lights, Vec3::splat(0.5), Vec4::ONE);
    assert_eq!(u.light_count[0], MAX_LIGHTS as f32);
    assert_eq!(u.light_pos[1][1], 1.0);
    assert_eq!(u.light_pos[1][3], 1.0);
    assert_eq!(u.camera_pos[..3], Camera::default().eye.to_array());
}
