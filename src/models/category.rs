use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A stored category. `parent` is a bare id and may dangle once the
/// referenced category has been deleted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: &str, parent: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            parent,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub parent: Option<String>,
}

/// Either an unexpanded parent id or the parent record itself.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ParentRef {
    Id(String),
    Expanded(Box<CategoryNode>),
}

/// A category with its ancestor chain expanded up to some depth.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub parent: Option<ParentRef>,
    pub created_at: DateTime<Utc>,
}

impl CategoryNode {
    /// Number of expanded ancestors above this node.
    pub fn expanded_depth(&self) -> usize {
        match &self.parent {
            Some(ParentRef::Expanded(parent)) => 1 + parent.expanded_depth(),
            _ => 0,
        }
    }
}

/// Treats a blank parent id the same as no parent.
pub fn normalize_parent(parent: Option<String>) -> Option<String> {
    parent
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

/// Expands each category's parent chain `depth` levels up. Ancestors past
/// `depth` stay as bare ids; a parent id with no matching record resolves
/// to no parent.
pub fn resolve_ancestors(categories: &[Category], depth: usize) -> Vec<CategoryNode> {
    let arena: HashMap<&str, &Category> = categories
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();

    categories
        .iter()
        .map(|category| expand(category, &arena, depth))
        .collect()
}

fn expand(
    category: &Category,
    arena: &HashMap<&str, &Category>,
    remaining: usize,
) -> CategoryNode {
    let parent = match &category.parent {
        None => None,
        Some(parent_id) if remaining == 0 => Some(ParentRef::Id(parent_id.clone())),
        Some(parent_id) => arena
            .get(parent_id.as_str())
            .map(|parent| ParentRef::Expanded(Box::new(expand(parent, arena, remaining - 1)))),
    };

    CategoryNode {
        id: category.id.clone(),
        name: category.name.clone(),
        parent,
        created_at: category.created_at,
    }
}

/// Whether giving `id` the parent `new_parent` would put `id` among its own
/// ancestors.
pub fn creates_cycle(categories: &[Category], id: &str, new_parent: Option<&str>) -> bool {
    let parents: HashMap<&str, Option<&str>> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.parent.as_deref()))
        .collect();

    let mut seen = HashSet::new();
    let mut current = new_parent;
    while let Some(ancestor) = current {
        if ancestor == id {
            return true;
        }
        // An existing loop that does not pass through `id`.
        if !seen.insert(ancestor) {
            return false;
        }
        current = parents.get(ancestor).copied().flatten();
    }
    false
}
