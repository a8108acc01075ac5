//! Filename resolution against the remote registry.

use std::path::Path;

use crate::error::{HfError, HfResult};
use crate::listing::RepoListing;
use crate::reference::ModelRef;

/// Resolve the reference's filename in place.
///
/// A reference that already carries a filename is left untouched. Otherwise
/// the repository is listed: with a pattern the first file whose base name
/// contains the pattern (case-insensitive) wins; without one the first GGUF
/// file is taken.
pub async fn resolve_filename(reference: &mut ModelRef, listing: &dyn RepoListing) -> HfResult<()> {
    if reference.filename.is_some() {
        return Ok(());
    }

    let files = listing.list_gguf_files(reference).await?;
    if files.is_empty() {
        return Err(HfError::NoGgufFiles);
    }

    if let Some(pattern) = reference.pattern.clone() {
        let needle = pattern.to_lowercase();
        let matched = files.iter().find(|file| {
            Path::new(&file.path)
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        });

        match matched {
            Some(file) => {
                reference.filename = Some(file.path.clone());
                Ok(())
            }
            None => Err(HfError::PatternNotMatched(pattern)),
        }
    } else {
        reference.filename = Some(files[0].path.clone());
        Ok(())
    }
}
