pub mod check;
pub mod dump;
pub mod link;

use std::path::Path;

use irlink_codec::{UnlinkedUnit, decode_unit};

/// Read and decode one unit file, with the path in any error message.
pub fn load_unit(path: &Path) -> Result<UnlinkedUnit, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    decode_unit(&bytes).map_err(|e| format!("{}: {}", path.display(), e))
}
