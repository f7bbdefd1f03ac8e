//! Catalog file loading
//!
//! CSV headers are matched case-insensitively against a small alias table, so
//! both `name,description` and the `Product Name,Description` export layout load.

use crate::error::{CatalogError, Result};
use ahash::AHashSet;
use skillmatch_core::{CatalogItem, ItemId};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const NAME_COLUMNS: &[&str] = &["name", "product name", "product_name", "title"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "desc"];
const ID_COLUMNS: &[&str] = &["id", "product id", "product_id"];
const CATEGORY_COLUMNS: &[&str] = &["category", "type"];

/// Column positions resolved from a CSV header row
#[derive(Debug)]
struct Columns {
    name: usize,
    description: usize,
    id: Option<usize>,
    category: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let find = |aliases: &[&str]| normalized.iter().position(|h| aliases.contains(&h.as_str()));
        let missing = |column: &str| CatalogError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        };

        Ok(Self {
            name: find(NAME_COLUMNS).ok_or_else(|| missing("name"))?,
            description: find(DESCRIPTION_COLUMNS).ok_or_else(|| missing("description"))?,
            id: find(ID_COLUMNS),
            category: find(CATEGORY_COLUMNS),
        })
    }
}

/// Loads catalog files into memory
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog, choosing the format from the file extension (`.csv` or `.json`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogItem>> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let items = match extension.as_deref() {
            Some("csv") => Self::load_csv(path)?,
            Some("json") => Self::load_json(path)?,
            _ => return Err(CatalogError::UnsupportedFormat(path.display().to_string())),
        };
        info!("Loaded {} catalog items from {}", items.len(), path.display());
        Ok(items)
    }

    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogItem>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<CatalogItem>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let columns = Columns::resolve(reader.headers()?)?;

        let mut items = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();

            let name = field(columns.name);
            let description = field(columns.description);
            if name.is_empty() || description.is_empty() {
                warn!("Skipping catalog row {}: blank name or description", row);
                continue;
            }

            let id = columns
                .id
                .map(field)
                .filter(|raw| !raw.is_empty())
                .map(parse_id)
                .unwrap_or(ItemId::Integer(row as u64));

            let mut item = CatalogItem::new(id, name, description);
            if let Some(category) = columns.category.map(field).filter(|c| !c.is_empty()) {
                item = item.with_category(category);
            }
            items.push(item);
        }

        check_unique(&items)?;
        Ok(items)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogItem>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON array of catalog items
    pub fn from_json_str(content: &str) -> Result<Vec<CatalogItem>> {
        let parsed: Vec<CatalogItem> = serde_json::from_str(content)?;
        let items: Vec<CatalogItem> = parsed
            .into_iter()
            .filter(|item| {
                let keep = !item.name.trim().is_empty() && !item.description.trim().is_empty();
                if !keep {
                    warn!("Skipping catalog item {}: blank name or description", item.id);
                }
                keep
            })
            .collect();

        check_unique(&items)?;
        Ok(items)
    }
}

fn parse_id(raw: &str) -> ItemId {
    raw.parse::<u64>()
        .map(ItemId::Integer)
        .unwrap_or_else(|_| ItemId::String(raw.to_string()))
}

fn check_unique(items: &[CatalogItem]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(&item.id) {
            return Err(CatalogError::DuplicateId(item.id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PRODUCT_EXPORT: &str = "\
Product Name,Description
Numerical Reasoning,\"Measures the ability to work with numbers, charts and tables\"
Verbal Reasoning,Measures understanding of written information
Leadership Potential Assessment,Assesses leadership potential
";

    #[test]
    fn test_product_export_layout() {
        let items = CatalogLoader::from_csv_reader(PRODUCT_EXPORT.as_bytes()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, ItemId::Integer(0));
        assert_eq!(items[0].name, "Numerical Reasoning");
        assert_eq!(
            items[0].description,
            "Measures the ability to work with numbers, charts and tables"
        );
        assert_eq!(items[2].id, ItemId::Integer(2));
        assert!(items[2].category.is_none());
    }

    #[test]
    fn test_id_and_category_columns() {
        let csv = "ID,Name,Description,Category\n\
                   opq32,OPQ32,Occupational personality questionnaire,Personality\n\
                   17,Verify G+,General ability test,Cognitive Ability Test\n";
        let items = CatalogLoader::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(items[0].id, ItemId::String("opq32".to_string()));
        assert_eq!(items[1].id, ItemId::Integer(17));
        assert_eq!(items[1].category.as_deref(), Some("Cognitive Ability Test"));
    }

    #[test]
    fn test_blank_rows_skipped_with_stable_ids() {
        let csv = "name,description\nA,first\nB,\nC,third\n";
        let items = CatalogLoader::from_csv_reader(csv.as_bytes()).unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![ItemId::Integer(0), ItemId::Integer(2)]);
    }

    #[test]
    fn test_missing_description_column() {
        let err = CatalogLoader::from_csv_reader("name,summary\nA,b\n".as_bytes()).unwrap_err();
        match err {
            CatalogError::MissingColumn { column, available } => {
                assert_eq!(column, "description");
                assert_eq!(available, "name, summary");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ids() {
        let csv = "id,name,description\n1,A,a\n1,B,b\n";
        assert!(matches!(
            CatalogLoader::from_csv_reader(csv.as_bytes()),
            Err(CatalogError::DuplicateId(id)) if id == "1"
        ));
    }

    #[test]
    fn test_json_catalog() {
        let json = r#"[
            {"id": 1, "name": "Numerical Reasoning", "description": "numbers", "category": "Numerical Reasoning"},
            {"id": "sjt", "name": "Situational Judgement", "description": "workplace scenarios"},
            {"id": 3, "name": "Blank", "description": "  "}
        ]"#;
        let items = CatalogLoader::from_json_str(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].id, ItemId::String("sjt".to_string()));
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("products.csv");
        let mut file = std::fs::File::create(&csv_path).unwrap();
        file.write_all(PRODUCT_EXPORT.as_bytes()).unwrap();
        assert_eq!(CatalogLoader::load(&csv_path).unwrap().len(), 3);

        let json_path = dir.path().join("products.JSON");
        std::fs::write(&json_path, r#"[{"id": 1, "name": "A", "description": "a"}]"#).unwrap();
        assert_eq!(CatalogLoader::load(&json_path).unwrap().len(), 1);

        let other = dir.path().join("products.xlsx");
        std::fs::write(&other, "").unwrap();
        assert!(matches!(CatalogLoader::load(&other), Err(CatalogError::UnsupportedFormat(_))));

        assert!(matches!(
            CatalogLoader::load(dir.path().join("missing.csv")),
            Err(CatalogError::Io { .. })
        ));
    }
}
