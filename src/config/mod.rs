pub mod traits;
pub mod music;
pub mod evolution;
pub mod fitness;
pub mod render;
pub mod composition;
pub mod manager;
pub mod overrides;

pub use manager::{ConfigManager, AppConfig};
pub use music::{MusicConfig, MAX_CHORD_ROOT};
pub use evolution::{EvolutionConfig, OperatorWeights};
pub use fitness::{FitnessConfig, FitnessWeights};
pub use render::RenderConfig;
pub use composition::CompositionConfig;
pub use overrides::ConfigOverride;
pub use traits::ConfigSection;
