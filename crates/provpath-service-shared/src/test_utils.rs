//! Fixtures for handler tests, backed by the checked-in dataset.

use std::path::PathBuf;
use std::sync::OnceLock;

use provpath_lib::ResolverConfig;

use crate::state::AppState;

/// Directory holding `provinces.json` and `adjacency.json`.
pub const TEST_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data");

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared state over the checked-in dataset, with external routing disabled.
///
/// # Panics
///
/// Panics if the dataset cannot be loaded.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let dir = fixture_data_dir();
            AppState::load(&dir, &ResolverConfig::disabled())
                .unwrap_or_else(|e| panic!("failed to load test dataset from {:?}: {}", dir, e))
        })
        .clone()
}

pub fn fixture_data_dir() -> PathBuf {
    PathBuf::from(TEST_DATA_DIR)
}

/// Region codes and names from the checked-in dataset.
pub mod fixture_regions {
    /// Hà Nội, five neighbors.
    pub const HA_NOI: &str = "01";

    /// Bắc Ninh, adjacent to Hà Nội.
    pub const BAC_NINH: &str = "24";

    /// Phú Thọ, adjacent to Hà Nội.
    pub const PHU_THO: &str = "25";

    /// Đà Nẵng, seven hops from Hà Nội.
    pub const DA_NANG: &str = "48";

    /// Lai Châu, the far north-west end of the longest path.
    pub const LAI_CHAU: &str = "12";

    /// Cà Mau, sixteen hops from Lai Châu.
    pub const CA_MAU: &str = "96";
}

/// Unique request ID for a test.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_data_dir_exists() {
        let dir = fixture_data_dir();
        assert!(dir.join("provinces.json").exists(), "dataset missing in {:?}", dir);
        assert!(dir.join("adjacency.json").exists(), "dataset missing in {:?}", dir);
    }

    #[test]
    fn test_state_contains_fixture_regions() {
        let state = test_state();
        let registry = state.service().registry();

        for code in [
            fixture_regions::HA_NOI,
            fixture_regions::DA_NANG,
            fixture_regions::CA_MAU,
        ] {
            assert!(registry.get_by_code(code).unwrap().is_some(), "missing {}", code);
        }
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
