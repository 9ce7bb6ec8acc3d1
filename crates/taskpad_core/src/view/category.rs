//! Category index derived from the live task collection.
//!
//! # Invariants
//! - Preset labels are always listed, first, in configured order.
//! - A dynamic label equal to a preset ignoring ASCII case is never listed.
//! - Dynamic labels keep first-seen order and are otherwise case-sensitive.

use crate::model::task::Task;
use crate::view::engine::CategoryFilter;

/// Labels offered as filter options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    labels: Vec<String>,
}

impl CategoryIndex {
    /// Rebuilds the index from presets and task categories.
    pub fn build(presets: &[String], tasks: &[Task]) -> Self {
        let mut labels: Vec<String> = Vec::with_capacity(presets.len());
        for preset in presets {
            let preset = preset.trim();
            if !preset.is_empty() && !labels.iter().any(|known| known.eq_ignore_ascii_case(preset))
            {
                labels.push(preset.to_string());
            }
        }
        let preset_count = labels.len();

        for label in tasks.iter().filter_map(|task| task.category.as_deref()) {
            let shadowed_by_preset = labels[..preset_count]
                .iter()
                .any(|preset| preset.eq_ignore_ascii_case(label));
            if shadowed_by_preset || labels[preset_count..].iter().any(|known| known == label) {
                continue;
            }
            labels.push(label.to_string());
        }

        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|known| known == label)
    }

    /// Keeps `filter` if its label is still offered, otherwise `All`.
    pub fn resolve(&self, filter: &CategoryFilter) -> CategoryFilter {
        match filter {
            CategoryFilter::Label(label) if self.contains(label) => filter.clone(),
            _ => CategoryFilter::All,
        }
    }
}
