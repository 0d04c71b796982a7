//! Offset pagination for the street listing and its `prev`/`next` links.

use serde::Serialize;

pub const DEFAULT_COUNT: u64 = 20;
pub const MAX_COUNT: u64 = 100;
/// Largest offset the database driver accepts.
pub const MAX_START: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: u64,
    pub count: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            start: 0,
            count: DEFAULT_COUNT,
        }
    }
}

impl PageRequest {
    /// Parse raw query values leniently: anything that is not a positive
    /// integer falls back to the default. `count` is capped at `MAX_COUNT`
    /// and `start` at `MAX_START`.
    pub fn from_query(start: Option<&str>, count: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<u64>().ok());

        let start = parse(start).unwrap_or(0).min(MAX_START);
        let count = parse(count)
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_COUNT)
            .min(MAX_COUNT);

        Self { start, count }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    /// Links for a page that returned `returned` items out of `total`.
    pub fn compute(collection_uri: &str, page: PageRequest, returned: u64, total: u64) -> Self {
        let link = |start: u64, count: u64| format!("{collection_uri}?start={start}&count={count}");
        let PageRequest { start, count } = page;

        let prev = (start > 0).then(|| {
            if start >= count {
                link(start - count, count)
            } else {
                link(0, start)
            }
        });

        let next = (start + returned < total)
            .then(|| link(start + count, count.min(total - start - returned)));

        Self {
            self_link: link(start, count),
            prev,
            next,
        }
    }
}
