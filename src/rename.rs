//! Fixed header-renaming policy.
//!
//! The campaign export headers on the left are rewritten to the warehouse
//! column names on the right. Matching is exact and case-sensitive; anything
//! not listed passes through unchanged.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use tracing::{info, instrument, warn};

use crate::table::Table;

/// Source header → target header, in display order.
pub const CAMPAIGN_HEADERS: [(&str, &str); 9] = [
    ("Campaign Id", "Campaign__Campaign_Id"),
    ("Campaign Name", "campaign__name"),
    ("Entered", "campaign__campaign_start_date"),
    ("Sent Date", "Date__date"),
    ("Published", "Contacted_Customers"),
    ("Sent", "Msg_Sent"),
    ("Delivered", "Msg_Delivered"),
    ("Unique Opened", "Unique_Open_Count"),
    // kept as delivered upstream even though the target reads like a click metric
    ("Unique Opened %", "Unique_Click_Count"),
];

static CAMPAIGN: Lazy<RenameMap> = Lazy::new(|| RenameMap::from_pairs(CAMPAIGN_HEADERS));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameMap {
    pairs: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
}

impl RenameMap {
    /// The nine-pair campaign mapping used by the pipeline.
    pub fn campaign() -> &'static RenameMap {
        &CAMPAIGN
    }

    /// Build a map from `(source, target)` pairs. A repeated source keeps its
    /// first target.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = RenameMap {
            pairs: Vec::new(),
            lookup: HashMap::new(),
        };
        for (k, v) in pairs {
            let k = k.into();
            if map.lookup.contains_key(&k) {
                continue;
            }
            map.lookup.insert(k.clone(), map.pairs.len());
            map.pairs.push((k, v.into()));
        }
        map
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.lookup
            .get(source)
            .map(|&i| self.pairs[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Relabel every header found in `map`, keeping column positions and row data.
///
/// Returns the relabelled table and the number of headers replaced, which is
/// the size of the intersection between the header set and the map's keys.
#[instrument(level = "info", skip(table, map), fields(cols = table.num_columns()))]
pub fn rename_headers(mut table: Table, map: &RenameMap) -> (Table, usize) {
    let replacements: Vec<(usize, String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(i, name)| map.get(name).map(|to| (i, to.to_string())))
        .collect();

    let renamed = replacements.len();
    for (i, to) in replacements {
        table.relabel(i, to);
    }

    let mut seen = HashSet::with_capacity(table.num_columns());
    for name in table.columns() {
        if !seen.insert(name.as_str()) {
            warn!(column = %name, "renaming produced a duplicate column name");
        }
    }

    info!(renamed, of = map.len(), "renamed headers");
    (table, renamed)
}
