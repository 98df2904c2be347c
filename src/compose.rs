//! Ordered composition of opaque configuration fragments: the HTTP filter
//! chain, stats sinks, and virtual clusters.
//!
//! All four add operations are append-only — there is no removal. Insertion
//! order is preserved exactly in the rendered output and duplicate names are
//! allowed; conflicts between duplicates are the runtime's concern, not this
//! layer's.

use std::collections::HashMap;

use crate::template;

/// One entry in the HTTP filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FilterEntry {
    /// A filter compiled into the runtime, configured by an opaque inline
    /// fragment.
    Native { name: String, typed_config: String },
    /// A host-side bridge filter, selected by platform filter name at
    /// runtime.
    Platform { name: String },
}

impl FilterEntry {
    fn insert(&self) -> String {
        match self {
            FilterEntry::Native { name, typed_config } => {
                template::native_filter_insert(name, typed_config)
            }
            FilterEntry::Platform { name } => template::platform_filter_insert(name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Composer {
    filters: Vec<FilterEntry>,
    stats_sinks: Vec<String>,
    virtual_clusters: Vec<String>,
}

impl Composer {
    pub(crate) fn add_native_filter(&mut self, name: &str, typed_config: &str) {
        self.filters.push(FilterEntry::Native {
            name: name.to_string(),
            typed_config: typed_config.to_string(),
        });
    }

    pub(crate) fn add_platform_filter(&mut self, name: &str) {
        self.filters.push(FilterEntry::Platform {
            name: name.to_string(),
        });
    }

    pub(crate) fn add_stats_sink(&mut self, fragment: &str) {
        self.stats_sinks.push(fragment.to_string());
    }

    pub(crate) fn add_virtual_cluster(&mut self, fragment: &str) {
        self.virtual_clusters.push(fragment.to_string());
    }

    /// Placeholder bindings for the three composed lists.
    ///
    /// The stats-sink section is omitted wholesale when no sink was added,
    /// so an unconfigured document carries no trace of it.
    pub(crate) fn bindings(&self) -> HashMap<&'static str, String> {
        let mut b: HashMap<&'static str, String> = HashMap::new();

        let filters: Vec<String> = self.filters.iter().map(FilterEntry::insert).collect();
        b.insert("custom_filters", filters.join("\n"));

        b.insert(
            "stats_sinks_block",
            if self.stats_sinks.is_empty() {
                String::new()
            } else {
                format!("stats_sinks: [{}]", self.stats_sinks.join(", "))
            },
        );

        b.insert(
            "virtual_clusters",
            format!("[{}]", self.virtual_clusters.join(", ")),
        );

        b
    }
}
