//!
//! src/bounded.rs  Andrew Belles  Oct 2025
//!
//! Limits on how much of the selection reaches the playlist.
//! `SelectionLimits` caps the album count (take n) and the running
//! track total (take until a cumulative count) while
//! `Pipeline::attach_tracks` fetches listings. The per-market take of
//! `n_per_country` is the pull loop in `Pipeline::sample_market`
//!

/// Running total of tracks against a target, rounded up to whole albums
#[derive(Debug, Clone, Copy)]
pub struct TrackQuota {
    target: usize,
    taken: usize
}

impl TrackQuota {
    pub fn new(target: usize) -> Self {
        Self { target, taken: 0 }
    }

    pub fn add(&mut self, tracks: usize) {
        self.taken += tracks;
    }

    pub fn is_met(&self) -> bool {
        self.taken >= self.target
    }
}

/// Album and track caps applied while track listings are attached.
/// Zero means no cap
#[derive(Debug, Clone, Copy)]
pub struct SelectionLimits {
    max_albums: Option<usize>,
    tracks: Option<TrackQuota>,
    albums: usize
}

impl SelectionLimits {
    pub fn new(limit_n_albums: usize, limit_n_tracks: usize) -> Self {
        Self {
            max_albums: (limit_n_albums > 0).then_some(limit_n_albums),
            tracks: (limit_n_tracks > 0).then(|| TrackQuota::new(limit_n_tracks)),
            albums: 0
        }
    }

    /// True once no further album may join the selection
    pub fn is_full(&self) -> bool {
        self.max_albums.is_some_and(|max| self.albums >= max)
            || self.tracks.is_some_and(|quota| quota.is_met())
    }

    pub fn admit(&mut self, tracks: usize) {
        self.albums += 1;
        if let Some(quota) = self.tracks.as_mut() {
            quota.add(tracks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sizes of the albums admitted before the limits fill up
    fn admitted(limits: &mut SelectionLimits, sizes: &[usize]) -> Vec<usize> {
        let mut out = Vec::new();
        for &size in sizes {
            if limits.is_full() {
                break;
            }
            limits.admit(size);
            out.push(size);
        }
        out
    }

    #[test]
    fn track_cap_rounds_up_to_whole_album() {
        let mut limits = SelectionLimits::new(0, 7);
        assert_eq!(admitted(&mut limits, &[5, 5, 5]), vec![5, 5]);
    }

    #[test]
    fn exact_track_target_stops_at_that_album() {
        let mut limits = SelectionLimits::new(0, 10);
        assert_eq!(admitted(&mut limits, &[5, 5, 5]), vec![5, 5]);
    }

    #[test]
    fn short_input_is_admitted_whole() {
        let mut limits = SelectionLimits::new(0, 100);
        assert_eq!(admitted(&mut limits, &[2, 3]), vec![2, 3]);
    }

    #[test]
    fn zero_limits_never_fill() {
        let mut limits = SelectionLimits::new(0, 0);
        let sizes = vec![12; 1000];
        assert_eq!(admitted(&mut limits, &sizes).len(), 1000);
    }

    #[test]
    fn album_cap_alone() {
        let mut limits = SelectionLimits::new(2, 0);
        assert_eq!(admitted(&mut limits, &[1, 1, 1, 1]), vec![1, 1]);
    }

    #[test]
    fn album_cap_applies_before_track_cap() {
        let mut limits = SelectionLimits::new(2, 100);
        assert_eq!(admitted(&mut limits, &[5, 5, 5]), vec![5, 5]);

        let mut limits = SelectionLimits::new(10, 7);
        assert_eq!(admitted(&mut limits, &[4, 9, 1]), vec![4, 9]);
    }

    #[test]
    fn quota_counts_tracks() {
        let mut quota = TrackQuota::new(3);
        assert!(!quota.is_met());
        quota.add(2);
        assert!(!quota.is_met());
        quota.add(1);
        assert!(quota.is_met());
    }
}
