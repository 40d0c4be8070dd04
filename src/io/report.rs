//! Run reports: per-generation fitness table and effective parameters.

use std::path::Path;

use crate::error::{Error, Result};
use crate::ga::{GaConfig, GenerationStats};

/// Renders a `Min / Max / Avg` table, one row per generation.
pub fn render_stats(stats: &[GenerationStats]) -> String {
    let mut out = format!("{:>14}\t{:>14}\t{:>14}\n", "Min", "Max", "Avg");
    for s in stats {
        out.push_str(&format!("{:>14.10}\t{:>14.10}\t{:>14.10}\n", s.min, s.max, s.mean));
    }
    out
}

/// Writes [`render_stats`] output to `path`.
pub fn write_stats(path: impl AsRef<Path>, stats: &[GenerationStats]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_stats(stats)).map_err(|e| Error::io(path, e))
}

/// Writes the effective configuration as pretty JSON.
pub fn write_params(path: impl AsRef<Path>, config: &GaConfig) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(generation: usize, min: f64, max: f64, mean: f64) -> GenerationStats {
        GenerationStats {
            generation,
            min,
            max,
            mean,
            population_size: 10,
            duplicates: 0,
        }
    }

    #[test]
    fn test_render_stats() {
        let text = render_stats(&[stats(0, 5.0, 9.5, 7.25), stats(1, 4.5, 8.0, 6.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').map(str::trim).collect::<Vec<_>>(), ["Min", "Max", "Avg"]);
        assert_eq!(lines[1].split('\t').next().unwrap().trim(), "5.0000000000");
        assert!(lines[2].ends_with("6.0000000000"));
    }

    #[test]
    fn test_write_params_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let config = GaConfig::default().with_population_size(33).with_seed(7);
        write_params(&path, &config).unwrap();

        let loaded = GaConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_write_stats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.txt");
        write_stats(&path, &[stats(0, 1.0, 2.0, 1.5)]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("1.5000000000"));
    }
}
