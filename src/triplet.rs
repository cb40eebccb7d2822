//! Triplet indexing, sampling and batching for metric-learning training
//!
//! Every sketch with a matching photo is an anchor. Its positive is that
//! photo; its negative is a random photo drawn from a different category.

use crate::config::LoaderConfig;
use crate::error::{DatasetError, Result};
use crate::services::{FileFilter, FileTransferService};
use crate::types::{category_of, photo_stem, sketch_photo_key};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One (anchor, positive, negative) sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    /// Sketch path
    pub anchor: PathBuf,
    /// Photo the sketch was drawn from
    pub positive: PathBuf,
    /// Photo from another category
    pub negative: PathBuf,
    pub category: String,
    pub negative_category: String,
}

#[derive(Debug, Clone)]
struct Anchor {
    sketch: PathBuf,
    positive: PathBuf,
    category: usize,
}

/// Photo/sketch index of a prepared split
#[derive(Debug, Clone)]
pub struct TripletIndex {
    categories: Vec<String>,
    photos_by_category: Vec<Vec<PathBuf>>,
    anchors: Vec<Anchor>,
    skipped_sketches: usize,
}

impl TripletIndex {
    /// Index `photo_root` and `sketch_root`, both laid out as `<category>/<file>`
    pub fn build(photo_root: &Path, sketch_root: &Path) -> Result<Self> {
        let span = crate::spans::triplet_index(photo_root, sketch_root);
        let _enter = span.enter();

        let mut photos: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        let mut by_stem: HashMap<(String, String), PathBuf> = HashMap::new();
        for photo in FileTransferService::collect_files(photo_root, &FileFilter::all())? {
            let category = category_of(&photo.relative);
            let file_name = file_name_of(&photo.relative);
            by_stem.insert(
                (category.clone(), photo_stem(&file_name).to_string()),
                photo.path.clone(),
            );
            photos.entry(category).or_default().push(photo.path);
        }

        let categories: Vec<String> = photos.keys().cloned().collect();
        let category_ids: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut anchors = Vec::new();
        let mut skipped_sketches = 0;
        for sketch in FileTransferService::collect_files(sketch_root, &FileFilter::all())? {
            let category = category_of(&sketch.relative);
            let file_name = file_name_of(&sketch.relative);
            let key = (category, sketch_photo_key(&file_name).to_string());

            match (by_stem.get(&key), category_ids.get(key.0.as_str())) {
                (Some(positive), Some(&category)) => anchors.push(Anchor {
                    sketch: sketch.path,
                    positive: positive.clone(),
                    category,
                }),
                _ => {
                    debug!(sketch = %sketch.path.display(), "Sketch has no matching photo");
                    skipped_sketches += 1;
                },
            }
        }

        if skipped_sketches > 0 {
            warn!(
                skipped = skipped_sketches,
                "Skipped sketches without a matching photo"
            );
        }
        info!(
            categories = categories.len(),
            anchors = anchors.len(),
            "Built triplet index"
        );

        Ok(Self {
            categories,
            photos_by_category: photos.into_values().collect(),
            anchors,
            skipped_sketches,
        })
    }

    /// Number of usable anchors
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Category names in sorted order
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Sketches ignored because their photo is missing
    #[must_use]
    pub fn skipped_sketches(&self) -> usize {
        self.skipped_sketches
    }

    /// Number of photos across all categories
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photos_by_category.iter().map(Vec::len).sum()
    }
}

fn file_name_of(rel: &Path) -> String {
    rel.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Draws triplets from an index
#[derive(Debug, Clone, Copy)]
pub struct TripletSampler<'a> {
    index: &'a TripletIndex,
}

impl<'a> TripletSampler<'a> {
    /// Create a sampler; negatives need at least two categories
    pub fn new(index: &'a TripletIndex) -> Result<Self> {
        if index.categories.len() < 2 {
            return Err(DatasetError::InsufficientCategories {
                found: index.categories.len(),
            });
        }
        Ok(Self { index })
    }

    /// Sample the triplet for anchor `anchor_idx`
    ///
    /// Returns `None` when the index is out of range.
    pub fn sample<R: Rng + ?Sized>(&self, anchor_idx: usize, rng: &mut R) -> Option<Triplet> {
        let anchor = self.index.anchors.get(anchor_idx)?;
        let category_count = self.index.categories.len();

        // Uniform over the other categories: draw from n-1 slots and step over our own
        let mut negative_category = rng.gen_range(0..category_count - 1);
        if negative_category >= anchor.category {
            negative_category += 1;
        }

        let negative = self
            .index
            .photos_by_category
            .get(negative_category)?
            .choose(rng)?
            .clone();

        Some(Triplet {
            anchor: anchor.sketch.clone(),
            positive: anchor.positive.clone(),
            negative,
            category: self.index.categories.get(anchor.category)?.clone(),
            negative_category: self.index.categories.get(negative_category)?.clone(),
        })
    }
}

/// Batches triplets epoch by epoch
pub struct TripletLoader<'a> {
    sampler: TripletSampler<'a>,
    config: LoaderConfig,
}

impl<'a> TripletLoader<'a> {
    pub fn new(index: &'a TripletIndex, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        let sampler = TripletSampler::new(index)?;
        Ok(Self { sampler, config })
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Batches per epoch
    #[must_use]
    pub fn len(&self) -> usize {
        let anchors = self.sampler.index.len();
        if self.config.drop_last {
            anchors / self.config.batch_size
        } else {
            anchors.div_ceil(self.config.batch_size)
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the batches of `epoch`
    ///
    /// With a seed, epoch `e` uses `seed + e` so every epoch is reproducible
    /// yet differently shuffled.
    #[must_use]
    pub fn epoch(&self, epoch: u64) -> EpochBatches<'a> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch)),
            None => StdRng::from_entropy(),
        };
        let mut order: Vec<usize> = (0..self.sampler.index.len()).collect();
        if self.config.shuffle {
            order.shuffle(&mut rng);
        }
        debug!(epoch, batches = self.len(), "Starting triplet epoch");

        EpochBatches {
            sampler: self.sampler,
            order,
            cursor: 0,
            batch_size: self.config.batch_size,
            drop_last: self.config.drop_last,
            rng,
        }
    }
}

/// Iterator over the batches of one epoch
pub struct EpochBatches<'a> {
    sampler: TripletSampler<'a>,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    drop_last: bool,
    rng: StdRng,
}

impl Iterator for EpochBatches<'_> {
    type Item = Vec<Triplet>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.order.len().saturating_sub(self.cursor);
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            return None;
        }

        let end = self.cursor + remaining.min(self.batch_size);
        let ids = self.order.get(self.cursor..end)?;
        let batch = ids
            .iter()
            .filter_map(|&idx| self.sampler.sample(idx, &mut self.rng))
            .collect();
        self.cursor = end;
        Some(batch)
    }
}
