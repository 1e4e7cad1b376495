use anyhow::{anyhow, bail, Context};
use std::collections::BTreeMap;

/// Required consumer count per queue name, as given by `--queue_list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerRequirements {
    required: BTreeMap<String, u64>,
}

impl ConsumerRequirements {
    pub fn get(&self, name: &str) -> Option<u64> {
        self.required.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.required.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

impl FromIterator<(String, u64)> for ConsumerRequirements {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            required: iter.into_iter().collect(),
        }
    }
}

/// Parses `name:count[,name:count...]`.
///
/// Splits each entry on its last `:` so queue names may themselves
/// contain colons.
pub fn parse_queue_list(input: &str) -> anyhow::Result<ConsumerRequirements> {
    let mut required = BTreeMap::new();

    for entry in input.split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }

        let (name, count) = entry.rsplit_once(':').ok_or_else(|| {
            anyhow!("Invalid queue list entry '{}': expected name:count", entry)
        })?;

        let name = name.trim();
        if name.is_empty() {
            bail!("Invalid queue list entry '{}': empty queue name", entry);
        }

        let count = count.trim().parse::<u64>().with_context(|| {
            format!("Invalid consumer count in queue list entry '{}'", entry)
        })?;

        if required.insert(name.to_string(), count).is_some() {
            bail!("Queue '{}' listed more than once", name);
        }
    }

    Ok(ConsumerRequirements { required })
}
