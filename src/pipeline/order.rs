use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::types::{OrderMode, TrackDescriptor};

/// Arranges tracks for insertion.
///
/// Name orderings compare case-insensitively and are stable; the descending
/// order uses a reversed comparator so equal names keep their sampled order.
pub fn order_tracks(tracks: &[TrackDescriptor], mode: OrderMode) -> Vec<TrackDescriptor> {
    let mut ordered = tracks.to_vec();

    match mode {
        OrderMode::Insertion => {}
        OrderMode::NameAscending => {
            ordered.sort_by_cached_key(|track| track.display_name.to_uppercase());
        }
        OrderMode::NameDescending => {
            ordered.sort_by(|a, b| {
                b.display_name
                    .to_uppercase()
                    .cmp(&a.display_name.to_uppercase())
            });
        }
        OrderMode::Shuffle => {
            let mut rng = StdRng::from_os_rng();
            ordered.shuffle(&mut rng);
        }
    }

    ordered
}
