use std::collections::BTreeMap;

/// Single-character class keys mapped to dataset partition names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    entries: BTreeMap<char, String>,
}

impl ClassMap {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, name)| (key, name.into()))
                .collect(),
        }
    }

    pub fn name(&self, key: char) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: char) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.entries.iter().map(|(key, name)| (*key, name.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ClassMap {
    fn default() -> Self {
        Self::new([
            ('1', "boss_button"),
            ('2', "next_level"),
            ('3', "next_stage"),
            ('4', "lvs"),
            ('5', "stages"),
        ])
    }
}
