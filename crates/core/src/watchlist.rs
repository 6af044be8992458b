use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// A named group of tickers shown as a collapsible block in the sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub tickers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub name: String,
    pub path: PathBuf,
}

impl FromStr for SectionSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let Some((name, path)) = s.split_once(':') else {
            bail!("invalid section {s:?}: expected NAME:FILE");
        };
        let (name, path) = (name.trim(), path.trim());
        if name.is_empty() || path.is_empty() {
            bail!("invalid section {s:?}: expected NAME:FILE");
        }
        Ok(Self {
            name: name.to_string(),
            path: PathBuf::from(path),
        })
    }
}

impl SectionSpec {
    pub fn load(&self) -> anyhow::Result<Section> {
        Ok(Section {
            name: self.name.clone(),
            tickers: load_watchlist(&self.path)?,
        })
    }
}

pub fn parse_watchlist(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let ticker = line.split('#').next().unwrap_or("").trim();
            (!ticker.is_empty()).then(|| ticker.to_uppercase())
        })
        .collect()
}

pub fn load_watchlist(path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read watchlist {}", path.display()))?;
    Ok(parse_watchlist(&String::from_utf8_lossy(&bytes)))
}

pub fn merge_tickers<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for t in list {
            let t = t.trim().to_uppercase();
            if !t.is_empty() && seen.insert(t.clone()) {
                out.push(t);
            }
        }
    }
    out
}
