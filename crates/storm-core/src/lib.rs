pub mod asset;
pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod lights;
pub mod particles;
pub mod picking;
pub mod scheduler;
pub mod shader;
pub mod wave;

pub use asset::{AssetSlot, ModelHandle};
pub use camera::{Camera, Ray, Viewport};
pub use clock::{Clock, FrameTime, WallClock};
pub use config::{PalmSpec, Vignette, VignetteConfig};
pub use constants::*;
pub use context::{BoatPose, SimulationContext};
pub use error::{AssetLoadFailure, Result, StormError};
pub use lights::{LightMotionController, LightState};
pub use particles::{ParticlePool, RainConfig, RecyclePolicy};
pub use picking::{PickGeometry, PickableObject, PickingController};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use shader::{
    FrameUniforms, OceanUniforms, ShaderAsset, OCEAN_SHADER, RAIN_SHADER, SCENE_SHADER,
};
pub use wave::{GridSpec, OceanGrid, WaveField, WaveParameters, WaveTerm};
