//! Shared waveform thumbnail cache
//!
//! Thumbnails are small: one (min, max) pair per display column. Decoding the
//! track to build one is not, so generation runs on a dedicated thread:
//!
//! 1. `request()` returns `Ready` on a hit, otherwise queues the source once
//!    and returns `Pending`
//! 2. The generator thread decodes the track and computes peaks
//! 3. The result arrives on `result_receiver()` (bridged to iced with
//!    `mpsc_subscription`), and the app hands it back through `complete()`
//!
//! Both decks share one cache, so loading the same track twice decodes it once.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use otodecks_core::audio_file::decode_source;
use otodecks_core::{StereoSample, TrackSource};

use super::peaks::generate_peaks;

/// Columns per thumbnail
pub const DEFAULT_THUMBNAIL_COLUMNS: usize = 1000;

/// Thumbnails kept before the least recently used is evicted
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Downsampled waveform of a whole track
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    peaks: Vec<(f32, f32)>,
    duration_seconds: f64,
}

impl Thumbnail {
    pub fn from_frames(frames: &[StereoSample], sample_rate: u32, columns: usize) -> Self {
        Self {
            peaks: generate_peaks(frames, columns),
            duration_seconds: frames.len() as f64 / sample_rate.max(1) as f64,
        }
    }

    pub fn peaks(&self) -> &[(f32, f32)] {
        &self.peaks
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone)]
pub enum ThumbnailLookup {
    Ready(Arc<Thumbnail>),
    /// Generation queued; a [`ThumbnailResult`] will follow
    Pending,
}

/// Completed generation, delivered through the result channel
#[derive(Debug, Clone)]
pub struct ThumbnailResult {
    pub source: TrackSource,
    /// Error message on failure
    pub thumbnail: Result<Arc<Thumbnail>, String>,
}

struct ThumbnailRequest {
    source: TrackSource,
    columns: usize,
}

/// LRU cache of thumbnails with a background generator
pub struct ThumbnailCache {
    capacity: usize,
    columns: usize,
    entries: HashMap<TrackSource, Arc<Thumbnail>>,
    /// Least recently used at the front
    recency: VecDeque<TrackSource>,
    pending: HashSet<TrackSource>,
    request_tx: Sender<ThumbnailRequest>,
    /// Kept so failures to queue can still be reported on the result channel
    result_tx: Sender<ThumbnailResult>,
    result_rx: Arc<Mutex<Receiver<ThumbnailResult>>>,
    _handle: Option<JoinHandle<()>>,
}

impl ThumbnailCache {
    /// Create the cache and spawn its generator thread
    pub fn new(capacity: usize, columns: usize) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<ThumbnailRequest>();
        let (result_tx, result_rx) = mpsc::channel::<ThumbnailResult>();

        let worker_tx = result_tx.clone();
        let handle = thread::Builder::new()
            .name("thumbnail-generator".to_string())
            .spawn(move || generator_thread(request_rx, worker_tx));

        let handle = match handle {
            Ok(handle) => {
                log::info!(
                    "Thumbnail cache started (capacity {}, {} columns)",
                    capacity,
                    columns
                );
                Some(handle)
            }
            Err(e) => {
                log::error!("Failed to spawn thumbnail generator: {}", e);
                None
            }
        };

        Self {
            capacity: capacity.max(1),
            columns: columns.max(1),
            entries: HashMap::new(),
            recency: VecDeque::new(),
            pending: HashSet::new(),
            request_tx,
            result_tx,
            result_rx: Arc::new(Mutex::new(result_rx)),
            _handle: handle,
        }
    }

    /// Look up a thumbnail, queueing generation on a miss
    pub fn request(&mut self, source: &TrackSource) -> ThumbnailLookup {
        if let Some(thumbnail) = self.entries.get(source).cloned() {
            self.touch(source);
            return ThumbnailLookup::Ready(thumbnail);
        }

        if self.pending.insert(source.clone()) {
            log::debug!("Queueing thumbnail for {}", source);
            let request = ThumbnailRequest {
                source: source.clone(),
                columns: self.columns,
            };
            if self.request_tx.send(request).is_err() {
                // Generator is gone; report through the normal path
                let _ = self.result_tx.send(ThumbnailResult {
                    source: source.clone(),
                    thumbnail: Err("thumbnail generator not running".to_string()),
                });
            }
        }

        ThumbnailLookup::Pending
    }

    /// Record a finished generation
    pub fn complete(&mut self, result: &ThumbnailResult) {
        self.pending.remove(&result.source);

        match &result.thumbnail {
            Ok(thumbnail) => self.insert(result.source.clone(), Arc::clone(thumbnail)),
            Err(e) => log::warn!("No thumbnail for {}: {}", result.source, e),
        }
    }

    /// Store a thumbnail directly, evicting the least recently used entry when full
    pub fn insert(&mut self, source: TrackSource, thumbnail: Arc<Thumbnail>) {
        self.entries.insert(source.clone(), thumbnail);
        self.touch(&source);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            log::debug!("Evicting thumbnail for {}", oldest);
            self.entries.remove(&oldest);
        }
    }

    /// Cached thumbnail without updating recency
    pub fn get(&self, source: &TrackSource) -> Option<Arc<Thumbnail>> {
        self.entries.get(source).cloned()
    }

    pub fn is_pending(&self, source: &TrackSource) -> bool {
        self.pending.contains(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Channel carrying completed generations
    pub fn result_receiver(&self) -> Arc<Mutex<Receiver<ThumbnailResult>>> {
        Arc::clone(&self.result_rx)
    }

    fn touch(&mut self, source: &TrackSource) {
        if let Some(index) = self.recency.iter().position(|s| s == source) {
            self.recency.remove(index);
        }
        self.recency.push_back(source.clone());
    }
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_THUMBNAIL_COLUMNS)
    }
}

fn generator_thread(requests: Receiver<ThumbnailRequest>, results: Sender<ThumbnailResult>) {
    // Ends when the cache (and its request sender) is dropped
    while let Ok(request) = requests.recv() {
        let thumbnail = generate_thumbnail(&request.source, request.columns);
        let result = ThumbnailResult {
            source: request.source,
            thumbnail,
        };
        if results.send(result).is_err() {
            break;
        }
    }
    log::debug!("Thumbnail generator stopped");
}

fn generate_thumbnail(source: &TrackSource, columns: usize) -> Result<Arc<Thumbnail>, String> {
    let decoded = decode_source(source).map_err(|e| e.to_string())?;
    let thumbnail = Thumbnail::from_frames(&decoded.frames, decoded.sample_rate, columns);
    log::debug!(
        "Generated {}-column thumbnail for {} ({:.1}s)",
        thumbnail.peaks().len(),
        source.display_name(),
        thumbnail.duration_seconds()
    );
    Ok(Arc::new(thumbnail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::time::Duration;

    /// Local path that does not exist, so a queued generation fails fast
    fn source(name: &str) -> TrackSource {
        TrackSource::from_path(std::env::temp_dir().join(format!("otodecks-absent-{}", name))).unwrap()
    }

    fn thumb(value: f32) -> Arc<Thumbnail> {
        Arc::new(Thumbnail::from_frames(&[StereoSample::mono(value); 8], 8, 4))
    }

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..8000 {
            let value = if i % 2 == 0 { 16000i16 } else { -16000i16 };
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = ThumbnailCache::new(2, 4);
        cache.insert(source("a.wav"), thumb(0.1));
        cache.insert(source("b.wav"), thumb(0.2));

        // Touch a so b becomes the oldest
        assert!(matches!(cache.request(&source("a.wav")), ThumbnailLookup::Ready(_)));
        cache.insert(source("c.wav"), thumb(0.3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&source("a.wav")).is_some());
        assert!(cache.get(&source("b.wav")).is_none());
        assert!(cache.get(&source("c.wav")).is_some());
    }

    #[test]
    fn test_failed_result_clears_pending() {
        let mut cache = ThumbnailCache::new(4, 4);
        let src = source("missing.wav");
        cache.pending.insert(src.clone());

        cache.complete(&ThumbnailResult {
            source: src.clone(),
            thumbnail: Err("boom".to_string()),
        });

        assert!(!cache.is_pending(&src));
        assert!(cache.get(&src).is_none());
    }

    #[test]
    fn test_generates_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.wav");
        write_wav(&path);
        let src = TrackSource::from_path(&path).unwrap();

        let mut cache = ThumbnailCache::new(4, 100);
        assert!(matches!(cache.request(&src), ThumbnailLookup::Pending));
        // Second request while pending does not queue again
        assert!(matches!(cache.request(&src), ThumbnailLookup::Pending));
        assert!(cache.is_pending(&src));

        let receiver = cache.result_receiver();
        let result = receiver
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        assert_eq!(result.source, src);

        cache.complete(&result);
        let thumbnail = cache.get(&src).unwrap();
        assert_eq!(thumbnail.peaks().len(), 100);
        assert!((thumbnail.duration_seconds() - 1.0).abs() < 1e-9);
        assert!(thumbnail.peaks()[0].1 > 0.4);
        assert!(matches!(cache.request(&src), ThumbnailLookup::Ready(_)));

        // Only one generation was queued
        assert!(receiver
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_millis(200))
            .is_err());
    }
}
