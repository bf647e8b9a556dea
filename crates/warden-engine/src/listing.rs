//! Listing of sibling records.

use crate::error::Result;
use warden_core::{Category, Listing};
use warden_store::Storage;

/// Names of the leaf records directly below `listing` in `category`.
///
/// Entries that are only folders (such as `acc1/` when `acc1/signing/..`
/// exists) are dropped, so counts match the number of identities.
pub(crate) async fn leaf_names(
    storage: &dyn Storage,
    category: Category,
    listing: &Listing,
) -> Result<Vec<String>> {
    let entries = storage.list(&listing.prefix(category)).await?;
    Ok(entries
        .into_iter()
        .filter(|entry| !entry.ends_with('/'))
        .collect())
}
