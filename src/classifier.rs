//! Partitioning of flattened token paths into output categories

use crate::flatten::FlatTokenMap;
use crate::types::*;

/// Tokens assigned to one category, sorted by path
#[derive(Debug, Clone)]
pub struct CategoryBlock<'a> {
    pub category: &'a Category,
    pub entries: Vec<(&'a str, &'a TokenValue)>,
}

#[derive(Debug, Clone)]
pub struct Classification<'a> {
    /// One block per category, in declaration order (possibly empty)
    pub blocks: Vec<CategoryBlock<'a>>,
    /// Paths that matched no category
    pub uncategorized: Vec<&'a str>,
}

impl<'a> Classification<'a> {
    pub fn categorized_count(&self) -> usize {
        self.blocks.iter().map(|b| b.entries.len()).sum()
    }
}

/// Each path goes to the first category whose prefix covers it
pub fn classify<'a>(flat: &'a FlatTokenMap, categories: &'a [Category]) -> Classification<'a> {
    let mut blocks: Vec<CategoryBlock<'a>> = categories
        .iter()
        .map(|category| CategoryBlock {
            category,
            entries: Vec::new(),
        })
        .collect();
    let mut uncategorized = Vec::new();

    let mut sorted: Vec<(&'a String, &'a TokenValue)> = flat.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    for (path, value) in sorted {
        match categories.iter().position(|c| c.matches(path)) {
            Some(index) => blocks[index].entries.push((path.as_str(), value)),
            None => uncategorized.push(path.as_str()),
        }
    }

    if !uncategorized.is_empty() {
        log::debug!("{} token(s) outside every CSS category", uncategorized.len());
    }

    Classification {
        blocks,
        uncategorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(paths: &[&str]) -> FlatTokenMap {
        paths
            .iter()
            .map(|p| (p.to_string(), TokenValue::Text(p.to_string())))
            .collect()
    }

    #[test]
    fn test_sorted_within_category() {
        let map = flat(&["primitives.colors.white", "primitives.colors.black", "primitives.colors.blue.500"]);
        let categories = default_categories();
        let result = classify(&map, &categories);
        let paths: Vec<_> = result.blocks[0].entries.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            paths,
            vec!["primitives.colors.black", "primitives.colors.blue.500", "primitives.colors.white"]
        );
    }

    #[test]
    fn test_each_path_in_exactly_one_block() {
        let map = flat(&["a.b.c", "a.b", "a.x", "z"]);
        let categories = vec![
            Category::new("a.b", "AB", "Any"),
            Category::new("a", "A", "Any"),
        ];
        let result = classify(&map, &categories);
        assert_eq!(result.blocks[0].entries.len(), 2);
        assert_eq!(result.blocks[1].entries.len(), 1);
        assert_eq!(result.uncategorized, vec!["z"]);
        assert_eq!(result.categorized_count(), 3);
    }

    #[test]
    fn test_prefix_must_end_at_segment_boundary() {
        let map = flat(&["primitives.spaceX.1", "primitives.space.1"]);
        let categories = default_categories();
        let result = classify(&map, &categories);
        let spacing = result.blocks.iter().find(|b| b.category.name == "Spacing").unwrap();
        assert_eq!(spacing.entries.len(), 1);
        assert_eq!(result.uncategorized, vec!["primitives.spaceX.1"]);
    }
}
