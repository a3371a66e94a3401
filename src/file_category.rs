/// File categorization by extension.
///
/// A [`CategoryTable`] maps category names to extension lists. From it an
/// [`ExtensionIndex`] is built once per process and used for every lookup;
/// anything it does not know about lands in [`OTHER_CATEGORY`].
///
/// # Examples
///
/// ```
/// use tidyfolder::file_category::{CategoryTable, ExtensionIndex};
///
/// let index = ExtensionIndex::new(&CategoryTable::builtin());
/// assert_eq!(index.classify(".JPG"), "Images");
/// assert_eq!(index.classify(".mp3"), "Music");
/// assert_eq!(index.classify(""), "Other");
/// ```
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Component, Path};

use crate::config::ConfigError;

/// Category for files whose extension matches no configured category.
pub const OTHER_CATEGORY: &str = "Other";

const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &[".png", ".jpg", ".jpeg", ".gif"]),
    (
        "Documents",
        &[".pdf", ".docx", ".txt", ".xlsx", ".xml", ".json"],
    ),
    ("Videos", &[".mp4", ".avi", ".mkv", ".mov"]),
    ("Music", &[".mp3", ".wav"]),
];

/// Validated mapping from category name to its extensions.
///
/// Extensions are stored lower-cased with a leading dot, and no extension
/// belongs to more than one category. Iteration follows definition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: IndexMap<String, Vec<String>>,
}

impl CategoryTable {
    /// The default Images / Documents / Videos / Music table.
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, extensions)| {
                (
                    (*name).to_string(),
                    extensions.iter().map(|ext| (*ext).to_string()).collect(),
                )
            })
            .collect();
        Self { categories }
    }

    /// Builds a table from user configuration.
    ///
    /// Extensions are normalized (trimmed, lower-cased, leading dot added).
    /// Fails on a reserved or unusable category name, an empty extension, or
    /// an extension listed more than once.
    pub fn from_map(map: IndexMap<String, Vec<String>>) -> Result<Self, ConfigError> {
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut categories = IndexMap::with_capacity(map.len());

        for (name, extensions) in map {
            let name = name.trim().to_string();
            if name.eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(ConfigError::ReservedCategory(name));
            }
            if !is_single_component(&name) {
                return Err(ConfigError::InvalidCategoryName(name));
            }

            let mut normalized = Vec::with_capacity(extensions.len());
            for raw in &extensions {
                let extension = normalize_extension(raw)
                    .ok_or_else(|| ConfigError::EmptyExtension(name.clone()))?;
                if let Some(first) = owners.get(&extension) {
                    return Err(ConfigError::DuplicateExtension {
                        extension,
                        first: first.clone(),
                        second: name,
                    });
                }
                owners.insert(extension.clone(), name.clone());
                normalized.push(extension);
            }

            categories.insert(name, normalized);
        }

        Ok(Self { categories })
    }

    /// Configured category names, in definition order. Does not include
    /// [`OTHER_CATEGORY`].
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn extensions(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Reverse lookup from extension to category name.
///
/// Built once from a [`CategoryTable`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ExtensionIndex {
    by_extension: HashMap<String, String>,
}

impl ExtensionIndex {
    pub fn new(table: &CategoryTable) -> Self {
        let by_extension = table
            .categories
            .iter()
            .flat_map(|(category, extensions)| {
                extensions
                    .iter()
                    .map(move |ext| (ext.clone(), category.clone()))
            })
            .collect();
        Self { by_extension }
    }

    /// Maps an extension (leading dot included) to its category.
    ///
    /// Matching is case-insensitive; unknown and empty extensions map to
    /// [`OTHER_CATEGORY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tidyfolder::file_category::{CategoryTable, ExtensionIndex};
    ///
    /// let index = ExtensionIndex::new(&CategoryTable::builtin());
    /// assert_eq!(index.classify(".PDF"), "Documents");
    /// assert_eq!(index.classify(".xyz"), "Other");
    /// ```
    pub fn classify(&self, extension: &str) -> &str {
        if extension.is_empty() {
            return OTHER_CATEGORY;
        }
        self.by_extension
            .get(&extension.to_lowercase())
            .map(String::as_str)
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Classifies a path by its final extension.
    pub fn classify_path(&self, path: &Path) -> &str {
        self.classify(&extension_of(path))
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

/// Returns the final extension of `path` with its leading dot, in its
/// original case, or an empty string when there is none.
///
/// `archive.tar.gz` gives `.gz`; `.bashrc` and `notes.` give `""`.
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy()),
        _ => String::new(),
    }
}

fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}

fn is_single_component(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn builtin_index() -> ExtensionIndex {
        ExtensionIndex::new(&CategoryTable::builtin())
    }

    #[test]
    fn test_builtin_category_order() {
        let table = CategoryTable::builtin();
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["Images", "Documents", "Videos", "Music"]
        );
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_every_builtin_extension_is_case_insensitive() {
        let table = CategoryTable::builtin();
        let index = ExtensionIndex::new(&table);

        for name in table.names() {
            for ext in table.extensions(name).unwrap() {
                assert_eq!(index.classify(ext), name);
                assert_eq!(index.classify(&ext.to_uppercase()), name);
            }
        }
        assert_eq!(index.classify(".JPG"), "Images");
        assert_eq!(index.classify(".jpg"), "Images");
        assert_eq!(index.classify(".Mp3"), "Music");
    }

    #[test]
    fn test_unknown_extensions_go_to_other() {
        let index = builtin_index();
        for ext in ["", ".xyz", ".exe", "jpg", ".jpg.bak", "."] {
            assert_eq!(index.classify(ext), OTHER_CATEGORY, "extension {ext:?}");
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("photo.JPG")), ".JPG");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
        assert_eq!(extension_of(Path::new("README")), "");
        assert_eq!(extension_of(Path::new("notes.")), "");
    }

    #[test]
    fn test_classify_path() {
        let index = builtin_index();
        assert_eq!(index.classify_path(&PathBuf::from("/tmp/video.MKV")), "Videos");
        assert_eq!(index.classify_path(Path::new("Makefile")), OTHER_CATEGORY);
    }

    #[test]
    fn test_from_map_normalizes_extensions() {
        let mut map = IndexMap::new();
        map.insert("Books".to_string(), vec![" EPUB ".to_string(), ".Pdf".to_string()]);
        let table = CategoryTable::from_map(map).unwrap();

        assert_eq!(
            table.extensions("Books").unwrap(),
            &[".epub".to_string(), ".pdf".to_string()]
        );
        let index = ExtensionIndex::new(&table);
        assert_eq!(index.classify(".PDF"), "Books");
        assert_eq!(index.classify(".png"), OTHER_CATEGORY);
    }

    #[test]
    fn test_from_map_rejects_duplicates_within_one_category() {
        let mut map = IndexMap::new();
        map.insert("Images".to_string(), vec!["png".to_string(), ".PNG".to_string()]);
        assert!(matches!(
            CategoryTable::from_map(map),
            Err(ConfigError::DuplicateExtension { .. })
        ));
    }

    #[test]
    fn test_from_map_rejects_bad_names_and_extensions() {
        for bad in ["", "a/b", "..", ".", "x\\y"] {
            let mut map = IndexMap::new();
            map.insert(bad.to_string(), vec![".a".to_string()]);
            assert!(
                matches!(
                    CategoryTable::from_map(map),
                    Err(ConfigError::InvalidCategoryName(_))
                ),
                "name {bad:?} should be rejected"
            );
        }

        let mut map = IndexMap::new();
        map.insert("Blank".to_string(), vec![".".to_string()]);
        assert_eq!(
            CategoryTable::from_map(map),
            Err(ConfigError::EmptyExtension("Blank".to_string()))
        );
    }
}
