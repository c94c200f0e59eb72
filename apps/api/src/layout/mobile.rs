//! Narrow-screen fallback: below the threshold the grid engine is skipped and
//! the catalog is shown as a plain list, with no positions and no dragging.

use serde::Serialize;

use crate::layout::catalog::Catalog;
use crate::layout::types::CardKey;

/// Viewports narrower than this (px) get the list view.
pub const MOBILE_THRESHOLD_PX: u32 = 768;

pub fn is_mobile(viewport_width: u32) -> bool {
    viewport_width < MOBILE_THRESHOLD_PX
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MobileList {
    pub cards: Vec<CardKey>,
}

/// Catalog order, top to bottom.
pub fn mobile_list(catalog: &Catalog) -> MobileList {
    MobileList {
        cards: catalog.keys().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::dimensions::DimensionRegistry;

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(is_mobile(767));
        assert!(!is_mobile(768));
        assert!(is_mobile(0));
    }

    #[test]
    fn test_list_keeps_catalog_order() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::from_visible(["oeeGauge", "jobCard", "speedInfo"], &registry);
        assert_eq!(
            mobile_list(&catalog).cards,
            vec!["oeeGauge", "jobCard", "speedInfo"]
        );
    }
}
