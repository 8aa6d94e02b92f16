//! Tests for TreeService loading and browsing

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use wikitree::application::services::TreeService;
use wikitree::application::{ApplicationError, LoadedTree};
use wikitree::config::Settings;
use wikitree::domain::{NodeId, NodeProperties, TreeError};
use wikitree::infrastructure::traits::{FileSystem, RealFileSystem};
use wikitree::util::testing::init_test_setup;

const TREE: &str = r#"
root = "wiki:xwiki"

[properties]
locale = "en"
hierarchyMode = "nestedPages"

[pinned]
"wiki:xwiki" = ["pinned:xwiki:Help.WebHome", "pinned:xwiki:Sandbox.WebHome"]

[documents]
"wiki:xwiki" = [
    "document:xwiki:Main.WebHome",
    "document:xwiki:Blog.WebHome",
    "document:xwiki:XWiki.WebHome",
]
"document:xwiki:Main.WebHome" = [
    "document:xwiki:Main.A",
    "document:xwiki:Main.B",
    "document:xwiki:Main.C",
]
"#;

/// In-memory filesystem for service tests.
#[derive(Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(PathBuf::from("/"))
    }
}

fn service(settings: Settings) -> TreeService {
    let fs = MemoryFileSystem::default().with_file("/wiki/tree.toml", TREE);
    TreeService::new(Arc::new(fs), Arc::new(settings))
}

#[fixture]
fn small_pages() -> Settings {
    init_test_setup();
    Settings {
        page_size: 2,
        ..Settings::default()
    }
}

fn load(service: &TreeService) -> LoadedTree {
    service
        .load(Some(Path::new("/wiki/tree.toml")), &NodeProperties::new())
        .expect("load tree")
}

// ============================================================
// Loading
// ============================================================

#[test]
fn given_real_tree_file_when_loading_then_root_and_children_available() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.toml");
    std::fs::write(&path, TREE).unwrap();
    let service = TreeService::new(Arc::new(RealFileSystem), Arc::new(Settings::default()));

    // Act
    let tree = service.load(Some(path.as_path()), &NodeProperties::new()).unwrap();

    // Assert
    assert_eq!(tree.root, "wiki:xwiki");
    assert_eq!(tree.node.child_count(&tree.root).unwrap(), 5);
}

#[test]
fn given_configured_tree_file_when_loading_without_path_then_uses_config() {
    let settings = Settings {
        tree_file: Some(PathBuf::from("/wiki/tree.toml")),
        ..Settings::default()
    };

    let tree = service(settings).load(None, &NodeProperties::new()).unwrap();

    assert_eq!(tree.root, "wiki:xwiki");
}

#[test]
fn given_no_tree_file_anywhere_when_loading_then_no_tree_file_error() {
    let err = service(Settings::default())
        .load(None, &NodeProperties::new())
        .unwrap_err();
    assert!(matches!(err, ApplicationError::NoTreeFile));
}

#[test]
fn given_missing_path_when_loading_then_not_found_error() {
    let err = service(Settings::default())
        .load(Some(Path::new("/wiki/missing.toml")), &NodeProperties::new())
        .unwrap_err();
    assert!(matches!(err, ApplicationError::TreeFileNotFound(_)));
}

#[test]
fn given_overlapping_sections_when_loading_then_tree_error() {
    let content = r#"
[pinned]
"wiki:xwiki" = ["document:xwiki:Main.WebHome"]
[documents]
"wiki:xwiki" = ["document:xwiki:Main.WebHome"]
"#;
    let fs = MemoryFileSystem::default().with_file("/wiki/bad.toml", content);
    let service = TreeService::new(Arc::new(fs), Arc::new(Settings::default()));

    let err = service
        .load(Some(Path::new("/wiki/bad.toml")), &NodeProperties::new())
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Tree(TreeError::OverlappingIdentifier(_))
    ));
}

#[test]
fn given_properties_in_every_layer_when_loading_then_cli_beats_settings_beats_file() {
    let settings = Settings {
        properties: NodeProperties::new()
            .with("locale", "de")
            .with("showTranslations", "true"),
        ..Settings::default()
    };
    let overrides = NodeProperties::new().with("showTranslations", "false");

    let tree = service(settings)
        .load(Some(Path::new("/wiki/tree.toml")), &overrides)
        .unwrap();

    let props = tree.node.properties();
    assert_eq!(props.get("locale"), Some("de"));
    assert_eq!(props.get("showTranslations"), Some("false"));
    assert_eq!(props.get("hierarchyMode"), Some("nestedPages"));
}

// ============================================================
// Paging
// ============================================================

#[rstest]
#[case(0, vec!["pinned:xwiki:Help.WebHome", "pinned:xwiki:Sandbox.WebHome"], Some(2))]
#[case(2, vec!["document:xwiki:Main.WebHome", "document:xwiki:Blog.WebHome"], Some(4))]
#[case(4, vec!["document:xwiki:XWiki.WebHome"], None)]
#[case(5, vec![], None)]
fn given_page_size_when_paging_root_then_walks_pinned_then_documents(
    small_pages: Settings,
    #[case] offset: usize,
    #[case] expected: Vec<&str>,
    #[case] next: Option<usize>,
) {
    let service = service(small_pages);
    let tree = load(&service);

    let page = service.page(&tree.node, &tree.root, offset, None).unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.children, expected);
    assert_eq!(page.next_offset(), next);
}

#[rstest]
fn given_explicit_limit_when_paging_then_overrides_page_size(small_pages: Settings) {
    let service = service(small_pages);
    let tree = load(&service);

    let page = service.page(&tree.node, &tree.root, 1, Some(10)).unwrap();

    assert_eq!(page.children.len(), 4);
    assert!(!page.has_more());
}

#[rstest]
fn given_unknown_node_when_paging_then_empty_page(small_pages: Settings) {
    let service = service(small_pages);
    let tree = load(&service);

    let page = service
        .page(&tree.node, &NodeId::new("document:xwiki:Nope"), 0, None)
        .unwrap();

    assert_eq!(page.total, 0);
    assert!(page.children.is_empty());
    assert!(!page.has_more());
}

// ============================================================
// Rendering
// ============================================================

#[rstest]
fn given_depth_two_when_rendering_then_shows_first_page_per_level_with_more_marker(
    small_pages: Settings,
) {
    let service = service(small_pages);
    let tree = load(&service);

    let rendered = service
        .render(&tree.node, &tree.root, Some(2))
        .unwrap()
        .to_string();

    assert!(rendered.starts_with("wiki:xwiki"));
    assert!(rendered.contains("pinned:xwiki:Help.WebHome"));
    assert!(rendered.contains("pinned:xwiki:Sandbox.WebHome"));
    assert!(rendered.contains("... 3 more"));
    assert!(!rendered.contains("document:xwiki:Main.A"));
}

#[rstest]
fn given_nested_document_when_rendering_then_lists_its_children(small_pages: Settings) {
    let service = service(small_pages);
    let tree = load(&service);

    let rendered = service
        .render(&tree.node, &NodeId::new("document:xwiki:Main.WebHome"), Some(1))
        .unwrap()
        .to_string();

    assert!(rendered.contains("document:xwiki:Main.A"));
    assert!(rendered.contains("document:xwiki:Main.B"));
    assert!(rendered.contains("... 1 more"));
}

#[test]
fn given_zero_depth_when_rendering_then_only_the_node() {
    let service = service(Settings::default());
    let tree = load(&service);

    let rendered = service.render(&tree.node, &tree.root, Some(0)).unwrap();

    assert_eq!(rendered.to_string().trim(), "wiki:xwiki");
}
