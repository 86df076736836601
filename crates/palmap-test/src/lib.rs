//! palmap-test - Regression test framework for palmap
//!
//! Supports three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use palmap_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("pmap");
//! rp.compare_values(3.0, palette.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use palmap_core::{Color, Raster};

/// Build one of the named fixture rasters.
///
/// - `"quad"` - 2x2: red, green / red, blue
/// - `"stripes"` - 8x4: vertical stripes cycling through four colors
/// - `"gradient"` - 16x16: red rises with x, green with y, blue fixed
/// - `"alpha"` - 3x1: opaque red, half-transparent red, transparent
pub fn fixture_raster(name: &str) -> TestResult<Raster> {
    let red = Color::rgb(255, 0, 0);
    let built = match name {
        "quad" => Raster::from_pixels(
            2,
            2,
            vec![red, Color::rgb(0, 255, 0), red, Color::rgb(0, 0, 255)],
        ),
        "stripes" => {
            let colors = [
                red,
                Color::rgb(0, 255, 0),
                Color::rgb(0, 0, 255),
                Color::rgb(255, 255, 0),
            ];
            let pixels = (0..4u32)
                .flat_map(|_| (0..8u32).map(|x| colors[(x % 4) as usize]))
                .collect();
            Raster::from_pixels(8, 4, pixels)
        }
        "gradient" => {
            let pixels = (0..16u32)
                .flat_map(|y| (0..16u32).map(move |x| Color::rgb((x * 16) as u8, (y * 16) as u8, 64)))
                .collect();
            Raster::from_pixels(16, 16, pixels)
        }
        "alpha" => Raster::from_pixels(
            3,
            1,
            vec![red, Color::new(255, 0, 0, 128), Color::TRANSPARENT],
        ),
        _ => {
            return Err(TestError::Fixture {
                name: name.to_string(),
                message: "unknown fixture".to_string(),
            });
        }
    };
    built.map_err(|e| TestError::Fixture {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // palmap-test is at crates/palmap-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Path for a scratch output file under the regout directory
pub fn regout_path(name: &str) -> String {
    format!("{}/{}", regout_dir(), name)
}
