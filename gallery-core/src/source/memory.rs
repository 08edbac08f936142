//! src/source/memory.rs
//! ============================================================================
//! # In-Memory Data Source
//!
//! A fully capable data source backed by an in-process store. Used by the
//! demo binary and the test suite; real integrations implement
//! [`DataSource`] against their own backend and own their own state behind
//! the declared interface.

use std::collections::HashMap;

use async_trait::async_trait;
use compact_str::{CompactString, format_compact};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::controller::events::GalleryNotification;
use crate::model::item::{Folder, Id, Item, MediaKind};
use crate::source::data_source::{
    DataSource, SourceCapabilities, SourceContext, SourceError, UploadRequest,
};

#[derive(Debug, Default)]
struct Db {
    folders: Vec<Folder>,
    items: Vec<Item>,
    next_item_id: i64,
    next_folder_id: i64,
}

impl Db {
    fn folder_exists(&self, id: &Id) -> bool {
        self.folders.iter().any(|f| &f.id == id)
    }
}

pub struct MemoryDataSource {
    db: Mutex<Db>,
    /// One-shot failure injection per operation name, for exercising the
    /// rejected-call paths.
    failures: Mutex<HashMap<&'static str, String>>,
    /// Channel for pushing generation notifications back to the host.
    notifier: Mutex<Option<UnboundedSender<GalleryNotification>>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self {
            db: Mutex::new(Db {
                next_item_id: 1,
                next_folder_id: 1,
                ..Db::default()
            }),
            failures: Mutex::new(HashMap::new()),
            notifier: Mutex::new(None),
        }
    }

    /// The demo store: three folders, a handful of placeholder images.
    pub fn seeded() -> Self {
        let source = Self::new();
        {
            let mut db = source.db.lock();
            db.next_folder_id = 103;
            db.next_item_id = 5;
            db.folders = vec![
                Folder::new(100, "Nature"),
                Folder::new(101, "Cities"),
                Folder::new(102, "Abstract"),
            ];
            db.items = vec![
                Item::new(1, "Mountain.jpg", MediaKind::Image)
                    .with_folder(100)
                    .with_urls("thumb://mountain", "media://mountain"),
                Item::new(2, "Ocean.png", MediaKind::Image)
                    .with_folder(100)
                    .with_urls("thumb://ocean", "media://ocean"),
                Item::new(3, "Skyscrapers.webp", MediaKind::Image)
                    .with_folder(101)
                    .with_urls("thumb://sky", "media://sky"),
                Item::new(4, "City Night.png", MediaKind::Image)
                    .with_folder(101)
                    .with_urls("thumb://night", "media://night"),
            ];
        }
        source
    }

    /// Route pushed generation notifications to the given channel.
    pub fn set_notifier(&self, tx: UnboundedSender<GalleryNotification>) {
        *self.notifier.lock() = Some(tx);
    }

    /// Arm a one-shot rejection for the named operation.
    pub fn fail_next(&self, operation: &'static str, message: impl Into<String>) {
        self.failures.lock().insert(operation, message.into());
    }

    fn check_failure(&self, operation: &'static str) -> Result<(), SourceError> {
        match self.failures.lock().remove(operation) {
            Some(message) => Err(SourceError::Rejected(message)),
            None => Ok(()),
        }
    }

    fn media_kind_for(file_name: &str) -> MediaKind {
        let ext = file_name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" => MediaKind::Image,
            "mp4" | "mov" | "mkv" | "avi" | "webm" => MediaKind::Video,
            "mp3" | "wav" | "ogg" | "flac" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    fn insert_item(
        db: &mut Db,
        name: CompactString,
        kind: MediaKind,
        folder: Option<Id>,
    ) -> Item {
        let id = db.next_item_id;
        db.next_item_id += 1;
        let mut item = Item::new(id, name.clone(), kind).with_urls(
            format_compact!("thumb://{name}"),
            format_compact!("media://{name}"),
        );
        item.folder_id = folder;
        db.items.push(item.clone());
        item
    }
}

impl Default for MemoryDataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            load_folders: true,
            create_folder: true,
            rename_folder: true,
            delete_folder: true,
            rename_item: true,
            delete_item: true,
            move_item: true,
            copy_item: true,
            upload_item: true,
            custom_methods: vec![CompactString::const_new("generate_items")],
        }
    }

    async fn load_items(&self, folder: Option<&Id>) -> Result<Vec<Item>, SourceError> {
        self.check_failure("load_items")?;
        let db = self.db.lock();
        let items = match folder {
            Some(folder_id) => db
                .items
                .iter()
                .filter(|i| i.folder_id.as_ref() == Some(folder_id))
                .cloned()
                .collect(),
            None => db.items.clone(),
        };
        debug!(count = items.len(), "load_items");
        Ok(items)
    }

    async fn load_folders(&self) -> Result<Vec<Folder>, SourceError> {
        self.check_failure("load_folders")?;
        Ok(self.db.lock().folders.clone())
    }

    async fn create_folder(&self, name: &str) -> Result<(), SourceError> {
        self.check_failure("create_folder")?;
        let mut db = self.db.lock();
        let id = db.next_folder_id;
        db.next_folder_id += 1;
        db.folders.push(Folder::new(id, name));
        info!(folder = name, "Folder created");
        Ok(())
    }

    async fn rename_folder(
        &self,
        id: &Id,
        new_name: &str,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("rename_folder")?;
        let mut db = self.db.lock();
        match db.folders.iter_mut().find(|f| &f.id == id) {
            Some(folder) => {
                folder.name = new_name.into();
                Ok(())
            }
            None => Err(SourceError::rejected("Folder not found.")),
        }
    }

    async fn delete_folder(&self, id: &Id, _ctx: &SourceContext) -> Result<(), SourceError> {
        self.check_failure("delete_folder")?;
        let mut db = self.db.lock();
        db.folders.retain(|f| &f.id != id);
        db.items.retain(|i| i.folder_id.as_ref() != Some(id));
        Ok(())
    }

    async fn rename_item(
        &self,
        id: &Id,
        new_name: &str,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("rename_item")?;
        let mut db = self.db.lock();
        match db.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => {
                item.name = new_name.into();
                Ok(())
            }
            None => Err(SourceError::rejected("Item not found.")),
        }
    }

    async fn delete_items(&self, ids: &[Id], _ctx: &SourceContext) -> Result<(), SourceError> {
        self.check_failure("delete_items")?;
        let mut db = self.db.lock();
        db.items.retain(|i| !ids.contains(&i.id));
        Ok(())
    }

    async fn move_items(
        &self,
        ids: &[Id],
        dest: &Id,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("move_items")?;
        let mut db = self.db.lock();
        if !db.folder_exists(dest) {
            return Err(SourceError::rejected(
                "Invalid source or destination folder.",
            ));
        }
        for item in db.items.iter_mut().filter(|i| ids.contains(&i.id)) {
            item.folder_id = Some(dest.clone());
        }
        Ok(())
    }

    async fn copy_items(
        &self,
        ids: &[Id],
        dest: &Id,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("copy_items")?;
        let mut db = self.db.lock();
        if !db.folder_exists(dest) {
            return Err(SourceError::rejected(
                "Invalid source or destination folder.",
            ));
        }
        let originals: Vec<Item> = db
            .items
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect();
        for original in originals {
            let name = format_compact!("Copy of {}", original.name);
            let id = db.next_item_id;
            db.next_item_id += 1;
            let mut copy = original;
            copy.id = Id::from(id);
            copy.name = name;
            copy.folder_id = Some(dest.clone());
            db.items.push(copy);
        }
        Ok(())
    }

    async fn upload_item(
        &self,
        upload: UploadRequest,
        folder: Option<&Id>,
        _ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("upload_item")?;
        let mut db = self.db.lock();
        let kind = Self::media_kind_for(&upload.file_name);
        Self::insert_item(&mut db, upload.file_name, kind, folder.cloned());
        Ok(())
    }

    async fn invoke(
        &self,
        method: &str,
        _items: &[Item],
        values: &Map<String, Value>,
        ctx: &SourceContext,
    ) -> Result<(), SourceError> {
        self.check_failure("invoke")?;
        match method {
            "generate_items" => {
                let count = values
                    .get("count")
                    .and_then(Value::as_i64)
                    .unwrap_or(1)
                    .clamp(1, 16) as usize;
                let prompt = values
                    .get("prompt")
                    .and_then(Value::as_str)
                    .unwrap_or("untitled")
                    .to_owned();
                let target = ctx.current_folder.as_ref().map(|f| f.id.clone());
                let generation_id = format_compact!("gen-{}", self.db.lock().next_item_id);

                let notifier = self.notifier.lock().clone();
                if let Some(tx) = notifier {
                    let _ = tx.send(GalleryNotification::TaskStart {
                        generation_id: generation_id.clone(),
                        total_items: count,
                        target_folder_id: target.clone(),
                    });
                    for n in 1..=count {
                        let item = {
                            let mut db = self.db.lock();
                            Self::insert_item(
                                &mut db,
                                format_compact!("{prompt} #{n}"),
                                MediaKind::Image,
                                target.clone(),
                            )
                        };
                        let _ = tx.send(GalleryNotification::TaskProgress {
                            generation_id: generation_id.clone(),
                            item,
                        });
                    }
                    let _ = tx.send(GalleryNotification::TaskEnd {
                        generation_id,
                    });
                } else {
                    // No push channel; create the batch silently and rely on
                    // the host's reconciling reload.
                    let mut db = self.db.lock();
                    for n in 1..=count {
                        Self::insert_item(
                            &mut db,
                            format_compact!("{prompt} #{n}"),
                            MediaKind::Image,
                            target.clone(),
                        );
                    }
                }
                Ok(())
            }
            other => Err(SourceError::rejected(format!(
                "Unknown custom method '{other}'."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_into_same_folder_creates_copy_of_name() {
        let source = MemoryDataSource::seeded();
        let ctx = SourceContext::default();
        source
            .copy_items(&[Id::from(1)], &Id::from(100), &ctx)
            .await
            .unwrap();

        let items = source.load_items(Some(&Id::from(100))).await.unwrap();
        assert_eq!(items.len(), 3);
        let copy = items.iter().find(|i| i.name == "Copy of Mountain.jpg");
        let copy = copy.expect("copy present");
        assert_ne!(copy.id, Id::from(1));
        assert!(items.iter().any(|i| i.name == "Mountain.jpg"));
    }

    #[tokio::test]
    async fn move_to_missing_folder_is_rejected() {
        let source = MemoryDataSource::seeded();
        let err = source
            .move_items(&[Id::from(1)], &Id::from(999), &SourceContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Rejected(_)));
    }

    #[tokio::test]
    async fn fail_next_is_one_shot() {
        let source = MemoryDataSource::seeded();
        source.fail_next("load_items", "boom");
        assert!(source.load_items(None).await.is_err());
        assert!(source.load_items(None).await.is_ok());
    }
}
