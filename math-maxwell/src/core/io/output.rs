//! JSON output of intensity maps
//!
//! Undefined values (the scattered intensity inside the scatterer, points
//! that could not be evaluated) are written as `null`.

use std::fs;
use std::path::Path;

use crate::core::error::MaxwellError;
use crate::core::maxwell_solver::IntensityMaps;

/// Write intensity maps as pretty-printed JSON, creating parent directories
pub fn write_intensity_json<P: AsRef<Path>>(path: P, maps: &IntensityMaps) -> Result<(), MaxwellError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(maps).map_err(std::io::Error::other)?;
    fs::write(path, json)?;
    log::debug!("Wrote {} grid points to {}", maps.total.len(), path.display());
    Ok(())
}

/// Read intensity maps written by [`write_intensity_json`]
pub fn read_intensity_json<P: AsRef<Path>>(path: P) -> Result<IntensityMaps, MaxwellError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| MaxwellError::Io(std::io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ClassificationAmbiguity;
    use crate::core::postprocess::{ObservationGrid, PointReport};

    #[test]
    fn test_round_trip_keeps_undefined_values() {
        let maps = IntensityMaps {
            total: vec![1.0, 0.5, 2.0, 1.25],
            scattered: vec![0.1, f64::NAN, f64::NAN, 0.2],
            grid: ObservationGrid::new(2, 2, [-1.0, 1.0], [-1.0, 1.0]).unwrap(),
            report: PointReport {
                ambiguities: vec![ClassificationAmbiguity::OnSurface {
                    index: 2,
                    distance: 0.0,
                }],
                evaluation_errors: Vec::new(),
            },
        };
        let dir = std::env::temp_dir().join(format!("maxwell_output_{}", std::process::id()));
        let path = dir.join("maps.json");
        write_intensity_json(&path, &maps).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("null"));
        let read = read_intensity_json(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(read.total, maps.total);
        assert_eq!(read.scattered[0], 0.1);
        assert!(read.scattered[1].is_nan());
        assert_eq!(read.grid, maps.grid);
        assert_eq!(read.report, maps.report);
    }
}
