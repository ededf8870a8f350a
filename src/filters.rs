use std::collections::HashSet;

use crate::models::Categoria;

/// Case-insensitive substring search over one text field. An empty query keeps every item;
/// whitespace is matched literally.
pub fn search_by<'a, T, F>(items: &'a [T], query: &str, field: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| field(item).to_lowercase().contains(&needle))
        .collect()
}

/// Category screen filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryKind {
    #[default]
    All,
    Insumo,
    NoInsumo,
}

impl CategoryKind {
    /// Parses the screen's select values (`all`, `insumo`, `noInsumo`); anything else is `All`.
    pub fn from_param(value: &str) -> Self {
        match value {
            "insumo" => CategoryKind::Insumo,
            "noInsumo" => CategoryKind::NoInsumo,
            _ => CategoryKind::All,
        }
    }

    fn accepts(self, categoria: &Categoria) -> bool {
        match self {
            CategoryKind::All => true,
            CategoryKind::Insumo => categoria.es_insumo,
            CategoryKind::NoInsumo => !categoria.es_insumo,
        }
    }
}

/// Top-level categories matching `query` and `kind`.
///
/// The API lists sub-categories both nested and flat, so any id that appears as someone's
/// sub-category is dropped from the top level.
pub fn filter_categories<'a>(
    categorias: &'a [Categoria],
    query: &str,
    kind: CategoryKind,
) -> Vec<&'a Categoria> {
    let sub_ids: HashSet<i64> = categorias
        .iter()
        .flat_map(|c| c.sub_categorias.iter().map(|s| s.id))
        .collect();

    search_by(categorias, query, |c| c.denominacion.as_str())
        .into_iter()
        .filter(|c| kind.accepts(c) && !sub_ids.contains(&c.id))
        .collect()
}
