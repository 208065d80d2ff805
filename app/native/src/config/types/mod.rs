//! Configuration types for Arcana.
//!
//! This module provides all configuration types organized by domain.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod animation;
pub mod gesture;
pub mod reading;
pub mod ring;
pub mod root;

// Animation types
pub use animation::{AnimationConfig, EasingType};
// Input types
pub use gesture::{GestureConfig, PointerConfig};
// Reading types
pub use reading::{DEFAULT_IMAGE_BASE_URL, ReadingConfig};
// Ring types
pub use ring::RingConfig;
// Root config types
pub use root::{
    ArcanaConfig, CONFIG_DIR_NAME, ConfigError, config_paths, load_config, load_config_from_path,
};
