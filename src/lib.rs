//! Listen Mode read-along core.
//!
//! Page text and the narration duration go in; a timeline of sentence spans
//! and the currently highlighted sentence come out.

pub mod cache;
pub mod config;
pub mod gate;
pub mod html;
pub mod matcher;
pub mod segmenter;
pub mod session;
pub mod timeline;

use std::fs;
use std::path::Path;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Regenerate the TypeScript declarations consumed by the highlight renderer.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<timeline::Sentence>(out_dir)?;
    export_single_type::<matcher::HighlightWindow>(out_dir)?;
    export_single_type::<matcher::HighlightUpdate>(out_dir)?;
    export_single_type::<gate::PageAccess>(out_dir)?;
    export_single_type::<gate::AudioAccess>(out_dir)?;
    export_single_type::<session::ListenSnapshot>(out_dir)?;
    export_single_type::<config::LogLevel>(out_dir)?;
    Ok(())
}
