use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::api::{FileEntry, FolderNode, RequestError, SharePointClient};

/// Default limit on concurrent folder fetches
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Anything that can list the immediate children of a folder
#[async_trait]
pub trait FolderSource: Send + Sync {
    async fn folder_contents(&self, folder_id: &str) -> Result<FolderNode, RequestError>;
}

#[async_trait]
impl FolderSource for SharePointClient {
    async fn folder_contents(&self, folder_id: &str) -> Result<FolderNode, RequestError> {
        self.fetch_folder(folder_id).await
    }
}

/// A sub-folder whose fetch failed; its subtree contributed no files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFolder {
    pub folder_id: String,
    pub error: String,
}

/// Result of walking a folder tree
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub root_id: String,
    pub root_name: String,
    pub root_path: String,
    pub files: Vec<FileEntry>,
    pub folders_visited: usize,
    pub failed_folders: Vec<FailedFolder>,
}

impl AggregateReport {
    pub fn is_partial(&self) -> bool {
        !self.failed_folders.is_empty()
    }
}

/// Walks a folder tree and flattens every file found at any depth
///
/// Pending folders sit on an explicit stack; at most `max_concurrent`
/// fetches are outstanding at once. With a limit of one the output is in
/// depth-first pre-order (a folder's own files, then each child subtree in
/// listing order). With a higher limit only the root's own files keep their
/// position at the front.
pub struct FileAggregator<'a, S: FolderSource + ?Sized> {
    source: &'a S,
    max_concurrent: usize,
}

impl<'a, S: FolderSource + ?Sized> FileAggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Collect every file reachable from `root_id`
    ///
    /// A failure fetching the root is returned to the caller. A failure on
    /// any sub-folder is logged and recorded, and that subtree is skipped.
    pub async fn collect_files(&self, root_id: &str) -> Result<AggregateReport, RequestError> {
        if root_id.trim().is_empty() {
            return Err(RequestError::EmptyIdentifier);
        }

        let root = self.source.folder_contents(root_id).await?;

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root_id.to_string());
        visited.insert(root.unique_id.clone());

        let mut report = AggregateReport {
            root_id: root.unique_id.clone(),
            root_name: root.name.clone(),
            root_path: root.server_relative_url.clone(),
            files: Vec::new(),
            folders_visited: 1,
            failed_folders: Vec::new(),
        };

        let mut pending: Vec<String> = Vec::new();
        self.absorb(root, &mut report, &mut visited, &mut pending);

        let source = self.source;
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.max_concurrent {
                let Some(folder_id) = pending.pop() else {
                    break;
                };
                in_flight.push(async move {
                    let result = source.folder_contents(&folder_id).await;
                    (folder_id, result)
                });
            }

            let Some((folder_id, result)) = in_flight.next().await else {
                break;
            };

            match result {
                Ok(node) => {
                    report.folders_visited += 1;
                    self.absorb(node, &mut report, &mut visited, &mut pending);
                }
                Err(e) => {
                    tracing::warn!("Error fetching files from folder {}: {}", folder_id, e);
                    report.failed_folders.push(FailedFolder {
                        folder_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            root = %report.root_path,
            files = report.files.len(),
            folders = report.folders_visited,
            failed = report.failed_folders.len(),
            "folder walk complete"
        );

        Ok(report)
    }

    /// Append a folder's files and queue its unseen children
    fn absorb(
        &self,
        node: FolderNode,
        report: &mut AggregateReport,
        visited: &mut HashSet<String>,
        pending: &mut Vec<String>,
    ) {
        report.files.extend(node.files);

        // Reverse so the first listed child is popped first
        for child in node.folders.into_iter().rev() {
            if visited.insert(child.unique_id.clone()) {
                pending.push(child.unique_id);
            } else {
                tracing::debug!("Skipping already visited folder {}", child.unique_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Author, FolderSummary};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        folders: HashMap<String, (Vec<&'static str>, Vec<&'static str>)>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(tree: &[(&'static str, &[&'static str], &[&'static str])]) -> Self {
            let folders = tree
                .iter()
                .map(|(id, children, files)| (id.to_string(), (children.to_vec(), files.to_vec())))
                .collect();
            Self {
                folders,
                calls: AtomicUsize::new(0),
            }
        }
    }

    fn file(name: &str) -> FileEntry {
        FileEntry {
            unique_id: name.to_string(),
            name: name.to_string(),
            server_relative_url: format!("/lib/{}", name),
            length: 1,
            time_last_modified: String::new(),
            modified_by: Author::default(),
        }
    }

    #[async_trait]
    impl FolderSource for FakeSource {
        async fn folder_contents(&self, folder_id: &str) -> Result<FolderNode, RequestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;

            let (children, files) = self.folders.get(folder_id).ok_or_else(|| RequestError::Status {
                url: format!("fake://{}", folder_id),
                status: reqwest::StatusCode::NOT_FOUND,
                message: "File Not Found.".to_string(),
            })?;

            Ok(FolderNode {
                unique_id: folder_id.to_string(),
                name: folder_id.to_string(),
                server_relative_url: format!("/lib/{}", folder_id),
                folders: children
                    .iter()
                    .map(|c| FolderSummary {
                        unique_id: c.to_string(),
                        name: c.to_string(),
                        server_relative_url: format!("/lib/{}", c),
                        item_count: 0,
                        time_last_modified: None,
                    })
                    .collect(),
                files: files.iter().map(|f| file(f)).collect(),
            })
        }
    }

    fn names(report: &AggregateReport) -> Vec<&str> {
        report.files.iter().map(|f| f.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_sequential_walk_is_depth_first_preorder() {
        let source = FakeSource::new(&[
            ("root", &["a", "b"], &["r1", "r2"]),
            ("a", &["a1"], &["a.txt"]),
            ("a1", &[], &["deep.pdf"]),
            ("b", &[], &["b.txt"]),
        ]);

        let report = FileAggregator::new(&source)
            .with_max_concurrent(1)
            .collect_files("root")
            .await
            .unwrap();

        assert_eq!(names(&report), ["r1", "r2", "a.txt", "deep.pdf", "b.txt"]);
        assert_eq!(report.folders_visited, 4);
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_failed_subfolder_contributes_nothing() {
        let source = FakeSource::new(&[("root", &["x", "y"], &["A"]), ("y", &[], &["B"])]);

        let report = FileAggregator::new(&source).collect_files("root").await.unwrap();

        assert_eq!(names(&report), ["A", "B"]);
        assert_eq!(report.failed_folders.len(), 1);
        assert_eq!(report.failed_folders[0].folder_id, "x");
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_root_failure_propagates() {
        let source = FakeSource::new(&[]);
        let err = FileAggregator::new(&source).collect_files("missing").await.unwrap_err();
        assert!(matches!(err, RequestError::Status { .. }));
    }

    #[tokio::test]
    async fn test_blank_root_id_rejected() {
        let source = FakeSource::new(&[]);
        let err = FileAggregator::new(&source).collect_files(" ").await.unwrap_err();
        assert!(matches!(err, RequestError::EmptyIdentifier));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_is_fetched_once() {
        let source = FakeSource::new(&[
            ("root", &["a"], &["r"]),
            ("a", &["root", "a"], &["x"]),
        ]);

        let report = FileAggregator::new(&source).collect_files("root").await.unwrap();

        assert_eq!(names(&report), ["r", "x"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_folder() {
        let source = FakeSource::new(&[("root", &[], &[])]);
        let report = FileAggregator::new(&source).collect_files("root").await.unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.root_path, "/lib/root");
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let source = FakeSource::new(&[]);
        let aggregator = FileAggregator::new(&source).with_max_concurrent(0);
        assert_eq!(aggregator.max_concurrent, 1);
    }
}
