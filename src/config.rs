// src/config.rs

use crate::error::{Result, ScoringError};
use crate::types::Config;
use std::fs;
use std::path::Path;
use tracing::info;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents =
            fs::read_to_string(path.as_ref()).map_err(|e| ScoringError::io("reading config", e))?;
        let config: Config =
            serde_yaml::from_str(&contents).map_err(|e| ScoringError::yaml("parsing config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let gesture = &self.gesture;
        if !(gesture.required_duration_secs.is_finite() && gesture.required_duration_secs > 0.0) {
            return Err(ScoringError::invalid_config(
                "gesture.required_duration_secs must be positive",
            ));
        }
        if !(gesture.cooldown_secs.is_finite() && gesture.cooldown_secs > 0.0) {
            return Err(ScoringError::invalid_config(
                "gesture.cooldown_secs must be positive",
            ));
        }
        if gesture.frame_subsampling_factor == 0 {
            return Err(ScoringError::invalid_config(
                "gesture.frame_subsampling_factor must be at least 1",
            ));
        }
        if self.match_info.team_one.trim().is_empty() || self.match_info.team_two.trim().is_empty() {
            return Err(ScoringError::invalid_config("team labels must not be empty"));
        }
        if self.video.max_parallel_videos == 0 {
            return Err(ScoringError::invalid_config(
                "video.max_parallel_videos must be at least 1",
            ));
        }
        let highlights = &self.highlights;
        if !(highlights.clip_duration_secs.is_finite() && highlights.clip_duration_secs > 0.0) {
            return Err(ScoringError::invalid_config(
                "highlights.clip_duration_secs must be positive",
            ));
        }
        if !(highlights.slow_motion_factor.is_finite() && highlights.slow_motion_factor > 0.0) {
            return Err(ScoringError::invalid_config(
                "highlights.slow_motion_factor must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
gesture:
  cooldown_secs: 2.5
match:
  team_one: Red Lions
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gesture.cooldown_secs, 2.5);
        assert_eq!(config.gesture.required_duration_secs, 0.1);
        assert_eq!(config.gesture.frame_subsampling_factor, 5);
        assert_eq!(config.match_info.team_one, "Red Lions");
        assert_eq!(config.match_info.team_two, "Team Orange");
        assert_eq!(config.video.landmark_suffix, "_landmarks.jsonl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.gesture.frame_subsampling_factor = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.cooldown_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.cooldown_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.required_duration_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.match_info.team_two = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.highlights.slow_motion_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let path = std::env::temp_dir().join("gesture_scoring_missing_config.yaml");
        let _ = std::fs::remove_file(&path);
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.gesture.cooldown_secs, 5.0);
    }
}
