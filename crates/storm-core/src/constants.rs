use glam::Vec3;

// Shared scene and simulation tuning constants used by the core and the native frontend.

// Ocean surface
pub const OCEAN_EXTENT: f32 = 100.0; // world units per side
pub const OCEAN_SEGMENTS: u32 = 50; // grid cells per side
pub const OCEAN_BASE_HEIGHT: f32 = -0.5; // rest height of the surface

// Default swell: 0.5 * sin(0.5 * (x + z) + 2t)
pub const SWELL_AMPLITUDE: f32 = 0.5;
pub const SWELL_SPATIAL_FREQUENCY: f32 = 0.5;
pub const SWELL_PHASE_SPEED: f32 = 2.0; // radians per second
pub const FOAM_THRESHOLD: f32 = 0.35; // crest height (fraction of total amplitude) where foam starts

// Number of wave terms the GPU displacement program evaluates
pub const MAX_GPU_WAVE_TERMS: usize = 4;

// Rain
pub const RAIN_COUNT: usize = 5000;
pub const RAIN_HALF_EXTENT: f32 = 25.0; // drops spawn in [-25, 25] on x and z
pub const RAIN_SPAWN_HEIGHT: f32 = 50.0;
pub const RAIN_GROUND_LEVEL: f32 = 0.0;
pub const RAIN_FALL_SPEED: f32 = 0.1; // world units per reference frame
pub const RAIN_SEED: u64 = 7;

// Frame pacing: particle speeds are expressed per frame at this rate
pub const REFERENCE_FPS: f32 = 60.0;
pub const MAX_DT_EQUIVALENT: f32 = 4.0; // clamp after stalls so rain does not teleport

// Lights
pub const AMBIENT_INTENSITY: f32 = 0.7;
pub const SUN_INTENSITY: f32 = 1.0;
pub const SUN_POSITION: [f32; 3] = [10.0, 10.0, -10.0];
pub const LIGHTNING_FLASH_INTENSITY: f32 = 6.0;
pub const LIGHTNING_PROBABILITY: f32 = 0.01; // per tick
pub const LIGHTNING_DURATION_MS: f32 = 120.0;
pub const FLICKER_SEED: u64 = 1337;
pub const MAX_LIGHTS: usize = 4; // lights packed into the frame uniforms

// Camera
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;
pub const CAMERA_EYE: [f32; 3] = [0.0, 5.0, 15.0];

// Palm trees
pub const TRUNK_HEIGHT: f32 = 8.0;
pub const TRUNK_RADIUS_TOP: f32 = 0.2;
pub const TRUNK_RADIUS_BOTTOM: f32 = 0.5;
pub const LEAF_COUNT: usize = 3;
pub const LEAF_RADIUS: f32 = 1.0;
pub const LEAF_HEIGHT: f32 = 2.0;

// Boat
pub const BOAT_DRAFT: f32 = 0.15; // how far the hull sits below the local surface
pub const BOAT_ROLL_GAIN: f32 = 0.6; // fraction of the surface slope turned into roll/pitch
pub const BOAT_PROBE_DISTANCE: f32 = 0.75; // finite-difference step for the slope probe

// Default palette (linear-ish RGB)
pub const SKY_COLOR: [f32; 3] = [0.529, 0.808, 0.922]; // 0x87CEEB
pub const STORM_SKY_COLOR: [f32; 3] = [0.06, 0.07, 0.10];
pub const SAND_COLOR: [f32; 3] = [0.957, 0.643, 0.376]; // 0xF4A460
pub const OCEAN_DEEP_COLOR: [f32; 3] = [0.0, 0.15, 0.35];
pub const OCEAN_SHALLOW_COLOR: [f32; 3] = [0.118, 0.565, 1.0]; // 0x1E90FF
pub const TRUNK_COLOR: [f32; 3] = [0.545, 0.271, 0.075]; // 0x8B4513
pub const LEAF_COLOR: [f32; 3] = [0.133, 0.545, 0.133]; // 0x228B22
pub const RAIN_COLOR: [f32; 3] = [0.667, 0.667, 0.667]; // 0xAAAAAA
pub const HIGHLIGHT_COLOR: [f32; 3] = [1.0, 0.85, 0.2];
pub const BOAT_COLOR: [f32; 3] = [0.55, 0.35, 0.2];

#[inline]
pub fn sun_position_vec3() -> Vec3 {
    Vec3::from(SUN_POSITION)
}
