//! In-memory view navigation.
//!
//! The three views form a tagged union rather than string flags, so a details
//! view with no dataset id is unrepresentable and the render boundary matches
//! exhaustively. Navigation never touches the cache.

/// The active view. `Upload` is the initial state; there is no terminal one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Upload,
    Datasets,
    DatasetDetails(String),
}

impl View {
    /// Back navigation: dataset details return to the list; the two top-level
    /// views have nowhere further back to go.
    pub fn back(self) -> View {
        match self {
            View::DatasetDetails(_) => View::Datasets,
            other => other,
        }
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, View::Upload)
    }

    pub fn is_datasets(&self) -> bool {
        matches!(self, View::Datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view_is_upload() {
        assert_eq!(View::default(), View::Upload);
    }

    #[test]
    fn test_details_carries_the_selected_dataset() {
        let view = View::DatasetDetails("d42".to_string());
        match &view {
            View::DatasetDetails(id) => assert_eq!(id, "d42"),
            _ => panic!("expected details view"),
        }
    }

    #[test]
    fn test_back_from_details_returns_to_datasets() {
        assert_eq!(View::DatasetDetails("d1".into()).back(), View::Datasets);
    }

    #[test]
    fn test_back_is_a_no_op_at_top_level() {
        assert_eq!(View::Upload.back(), View::Upload);
        assert_eq!(View::Datasets.back(), View::Datasets);
    }
}
