use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::bill::BillId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    AllInfo,
    Text,
}

/// Raw HTML of previously fetched pages, one file per bill page under
/// `{root}/{congress}/{chamber}_{type}/`.
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, id: &BillId, kind: PageKind) -> PathBuf {
        let dir = format!("{}_{}", id.chamber.slug(), id.bill_type.slug()).replace('-', "_");
        let file = match kind {
            PageKind::AllInfo => format!("{}-all.html", id.number),
            PageKind::Text => format!("{}-txt.html", id.number),
        };
        self.root.join(id.congress.to_string()).join(dir).join(file)
    }

    pub fn load(&self, id: &BillId, kind: PageKind) -> Option<String> {
        let path = self.path_for(id, kind);
        match fs::read_to_string(&path) {
            Ok(html) => {
                debug!("cache hit {}", path.display());
                Some(html)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("could not read cached page {}: {err}", path.display());
                None
            }
        }
    }

    pub fn store(&self, id: &BillId, kind: PageKind, html: &str) {
        let path = self.path_for(id, kind);
        if let Err(err) = write_file(&path, html) {
            warn!("could not cache page {}: {err}", path.display());
        }
    }
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BillType, Chamber};

    #[test]
    fn paths_are_grouped_by_congress_and_type() {
        let cache = PageCache::new("cache");
        let id = BillId::new(117, Chamber::Senate, BillType::JointResolution, 7);
        assert_eq!(
            cache.path_for(&id, PageKind::AllInfo),
            PathBuf::from("cache/117/senate_joint_resolution/7-all.html")
        );
        assert_eq!(
            cache.path_for(&id, PageKind::Text),
            PathBuf::from("cache/117/senate_joint_resolution/7-txt.html")
        );
    }

    #[test]
    fn stored_pages_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let id = BillId::new(117, Chamber::House, BillType::Bill, 1);

        assert_eq!(cache.load(&id, PageKind::AllInfo), None);
        cache.store(&id, PageKind::AllInfo, "<html>cached</html>");
        assert_eq!(
            cache.load(&id, PageKind::AllInfo).as_deref(),
            Some("<html>cached</html>")
        );
        assert_eq!(cache.load(&id, PageKind::Text), None);
    }
}
