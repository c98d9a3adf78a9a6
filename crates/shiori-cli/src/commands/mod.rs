pub mod check;
pub mod play;
pub mod saves;

use std::path::Path;

use shiori_engine::DirStore;

/// Open (creating if needed) the save directory.
fn open_store(dir: &Path) -> Result<DirStore, String> {
    DirStore::open(dir).map_err(|e| format!("cannot open save directory {}: {e}", dir.display()))
}
