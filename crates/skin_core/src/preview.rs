use crate::upload::UploadedImage;
use std::collections::BTreeSet;
use std::fmt;

/// Session-unique handle for the transient preview of an accepted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl PreviewId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PreviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Owner of preview resources. The session acquires exactly one handle per
/// accepted image and releases it when the image is superseded, reset, or the
/// session is dropped.
pub trait PreviewStore {
    fn acquire(&mut self, id: PreviewId, image: &UploadedImage);
    fn release(&mut self, id: PreviewId);
}

impl<P: PreviewStore + ?Sized> PreviewStore for &mut P {
    fn acquire(&mut self, id: PreviewId, image: &UploadedImage) {
        (**self).acquire(id, image);
    }

    fn release(&mut self, id: PreviewId) {
        (**self).release(id);
    }
}

/// Bookkeeping-only store for headless sessions; records every acquire/release.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrackingPreviews {
    live: BTreeSet<PreviewId>,
    acquired: Vec<PreviewId>,
    released: Vec<PreviewId>,
}

impl TrackingPreviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles acquired and not yet released.
    pub fn live(&self) -> impl Iterator<Item = PreviewId> + '_ {
        self.live.iter().copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn acquired(&self) -> &[PreviewId] {
        &self.acquired
    }

    pub fn released(&self) -> &[PreviewId] {
        &self.released
    }
}

impl PreviewStore for TrackingPreviews {
    fn acquire(&mut self, id: PreviewId, _image: &UploadedImage) {
        if !self.live.insert(id) {
            tracing::warn!("{id} acquired twice");
        }
        self.acquired.push(id);
    }

    fn release(&mut self, id: PreviewId) {
        if !self.live.remove(&id) {
            tracing::warn!("{id} released without being live");
        }
        self.released.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{CandidateFile, validate};

    fn image(id: u64) -> UploadedImage {
        validate(
            CandidateFile::new("a.jpg", "image/jpeg", vec![1, 2, 3]),
            PreviewId::new(id),
        )
        .unwrap()
    }

    #[test]
    fn tracking_store_follows_handle_lifetime() {
        let mut store = TrackingPreviews::new();
        store.acquire(PreviewId::new(1), &image(1));
        store.acquire(PreviewId::new(2), &image(2));
        store.release(PreviewId::new(1));

        assert_eq!(store.live().collect::<Vec<_>>(), vec![PreviewId::new(2)]);
        assert_eq!(store.acquired().len(), 2);
        assert_eq!(store.released(), &[PreviewId::new(1)]);
    }

    fn acquire_through<P: PreviewStore>(mut store: P, id: u64) {
        store.acquire(PreviewId::new(id), &image(id));
    }

    #[test]
    fn borrowed_store_forwards_to_owner() {
        let mut store = TrackingPreviews::new();
        acquire_through(&mut store, 3);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn display_names_the_handle() {
        assert_eq!(PreviewId::new(4).to_string(), "preview:4");
    }
}
