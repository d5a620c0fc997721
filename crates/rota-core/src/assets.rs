use crate::item::ImageRef;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Image not found: {0}")]
    NotFound(ImageRef),
    #[error("Failed to decode image {0}: {1}")]
    Decode(ImageRef, String),
}

/// Produces decoded images for references. Called off the animation path; the cache never waits
/// on it during a frame.
pub trait AssetLoader {
    type Image;

    fn load(&self, image: &ImageRef) -> Result<Self::Image, AssetError>;
}

#[derive(Debug, Clone)]
pub enum AssetState<T> {
    Pending,
    Loaded(T),
    Failed,
}

/// Per-reference load state. Every transition to `Loaded` or `Failed` bumps `version`, which the
/// wheel folds into its layout key so a late image triggers a relayout.
#[derive(Debug)]
pub struct AssetCache<T> {
    states: HashMap<ImageRef, AssetState<T>>,
    version: u64,
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            version: 0,
        }
    }
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self, image: &ImageRef) -> Option<&AssetState<T>> {
        self.states.get(image)
    }

    pub fn get(&self, image: &ImageRef) -> Option<&T> {
        match self.states.get(image) {
            Some(AssetState::Loaded(img)) => Some(img),
            _ => None,
        }
    }

    pub fn is_loaded(&self, image: &ImageRef) -> bool {
        self.get(image).is_some()
    }

    /// Marks `image` as pending. Returns `false` if it was already known, so callers schedule
    /// exactly one load per reference.
    pub fn request(&mut self, image: &ImageRef) -> bool {
        if self.states.contains_key(image) {
            return false;
        }
        self.states.insert(image.clone(), AssetState::Pending);
        true
    }

    /// References not seen before, each now marked pending.
    pub fn request_all<'a>(
        &mut self,
        images: impl IntoIterator<Item = &'a ImageRef>,
    ) -> Vec<ImageRef> {
        images
            .into_iter()
            .filter(|r| self.request(r))
            .cloned()
            .collect()
    }

    pub fn complete(&mut self, image: ImageRef, result: Result<T, AssetError>) {
        let state = match result {
            Ok(img) => AssetState::Loaded(img),
            Err(e) => {
                log::warn!("{}", e);
                AssetState::Failed
            }
        };
        self.states.insert(image, state);
        self.version += 1;
    }

    /// Runs a loader synchronously for one pending reference.
    pub fn load_with<L>(&mut self, loader: &L, image: &ImageRef)
    where
        L: AssetLoader<Image = T>,
    {
        let result = loader.load(image);
        self.complete(image.clone(), result);
    }
}
