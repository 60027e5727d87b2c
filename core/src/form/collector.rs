//! Flattens a form's errors into an [`ErrorTree`] with one key per origin.

use super::FormHandle;
use crate::validation::ErrorTree;

/// Key used for errors whose origin is the root form.
pub const GLOBAL_KEY: &str = "global";

/// Walks every error of `form`, nested forms included, and files each message
/// under its origin's path joined with `_`.
pub fn collect_form_errors(form: &dyn FormHandle) -> ErrorTree {
    let mut tree = ErrorTree::new();
    for error in form.errors(true) {
        let key = if error.origin.is_empty() {
            GLOBAL_KEY.to_string()
        } else {
            error.origin.join("_")
        };
        tree.insert_flat(&key, error.message);
    }
    tree
}
