use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::filter::coefficients::{NOTCH_A, NOTCH_B};
use crate::filter::iir::DEFAULT_FRAME_BUDGET_US;
use crate::filter::response::{DEFAULT_NUM_POINTS, DEFAULT_PASSBAND_THRESHOLD_DB};
use crate::filter::Coefficients;
use crate::recording::DEFAULT_CHANNELS;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_b")]
    pub b: Vec<f64>,
    #[serde(default = "default_a")]
    pub a: Vec<f64>,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
    #[serde(default = "default_threshold_db")]
    pub passband_threshold_db: f64,
    #[serde(default = "default_budget_us")]
    pub realtime_budget_us: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_channels")]
    pub channels: Vec<usize>,
    #[serde(default)]
    pub spectrum_channel: usize,
    /// Only the leading frames are compared when set
    #[serde(default)]
    pub max_frames: Option<usize>,
    #[serde(default = "default_preview_frames")]
    pub preview_frames: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            b: default_b(),
            a: default_a(),
            num_points: default_num_points(),
            passband_threshold_db: default_threshold_db(),
            realtime_budget_us: default_budget_us(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            channels: default_report_channels(),
            spectrum_channel: 0,
            max_frames: None,
            preview_frames: default_preview_frames(),
        }
    }
}

impl FilterConfig {
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            b: self.b.clone(),
            a: self.a.clone(),
        }
    }
}

fn default_channels() -> usize { DEFAULT_CHANNELS }
fn default_sample_rate() -> f64 { 32000.0 }
fn default_b() -> Vec<f64> { NOTCH_B.to_vec() }
fn default_a() -> Vec<f64> { NOTCH_A.to_vec() }
fn default_num_points() -> usize { DEFAULT_NUM_POINTS }
fn default_threshold_db() -> f64 { DEFAULT_PASSBAND_THRESHOLD_DB }
fn default_budget_us() -> f64 { DEFAULT_FRAME_BUDGET_US }
fn default_report_channels() -> Vec<usize> { vec![0, 64, 128, 192] }
fn default_preview_frames() -> usize { 10 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// Explicit path, then ./neurostat.toml, then the per-user config locations.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("neurostat.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("neurostat").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("neurostat").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn empty_file_uses_deployment_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.recording.channels, 256);
        assert_eq!(cfg.recording.sample_rate, 32000.0);
        assert_eq!(cfg.filter.coefficients(), Coefficients::notch());
        assert_eq!(cfg.filter.num_points, 512);
        assert_eq!(cfg.filter.passband_threshold_db, -3.0);
        assert_eq!(cfg.report.channels, vec![0, 64, 128, 192]);
        assert_eq!(cfg.report.preview_frames, 10);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [recording]
            channels = 64

            [filter]
            b = [1.0]
            a = [1.0, -0.5]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.recording.channels, 64);
        assert_eq!(cfg.recording.sample_rate, 32000.0);
        assert_eq!(cfg.filter.a, vec![1.0, -0.5]);
        assert_eq!(cfg.filter.realtime_budget_us, 1000.0);
        assert_eq!(cfg.report.max_frames, None);
    }

    #[test]
    fn missing_or_invalid_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(&dir.path().join("no-such-config.toml")).is_none());

        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "[recording]\nchannels = \"many\"").unwrap();
        assert!(load_config(bad.path()).is_none());
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nmax_frames = 1000\nchannels = [3]").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.report.max_frames, Some(1000));
        assert_eq!(cfg.report.channels, vec![3]);
    }

    #[test]
    fn explicit_path_wins() {
        let p = Path::new("/tmp/custom.toml");
        assert_eq!(find_config(Some(p)), Some(p.to_path_buf()));
    }
}
