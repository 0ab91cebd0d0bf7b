//! Merged, time-ordered note sequence

pub mod note;

pub use note::Note;

use serde::Serialize;

/// All notes of a file, ordered by onset
///
/// Notes with equal onsets keep the order in which they were decoded
/// (track order, then order within the track).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    notes: Vec<Note>,
}

impl Timeline {
    /// Concatenate per-track note lists in decode order and sort by onset
    pub fn merge<I>(tracks: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = Note>,
    {
        let mut notes: Vec<Note> = tracks.into_iter().flatten().collect();
        // sort_by is stable, which keeps decode order on ties
        notes.sort_by(|a, b| a.onset.total_cmp(&b.onset));
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// End of the last sounding note
    pub fn duration(&self) -> f64 {
        self.notes.iter().map(Note::end).fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sorts_by_onset() {
        let a = vec![Note::new(60, 100, 1.0, 0.5), Note::new(62, 100, 3.0, 0.5)];
        let b = vec![Note::new(64, 100, 0.0, 0.5), Note::new(65, 100, 2.0, 0.5)];
        let timeline = Timeline::merge(vec![a, b]);
        let pitches: Vec<u8> = timeline.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![64, 60, 65, 62]);
    }

    #[test]
    fn test_merge_ties_keep_decode_order() {
        let a = vec![Note::new(60, 1, 1.0, 0.5), Note::new(61, 2, 1.0, 0.5)];
        let b = vec![Note::new(70, 3, 0.5, 0.1), Note::new(71, 4, 1.0, 0.5)];
        let c = vec![Note::new(80, 5, 1.0, 0.5)];
        let timeline = Timeline::merge(vec![a, b, c]);
        let pitches: Vec<u8> = timeline.iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![70, 60, 61, 71, 80]);
    }

    #[test]
    fn test_merge_is_non_decreasing() {
        let track: Vec<Note> = [5.0, 0.25, 3.5, 0.25, 9.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &t)| Note::new(i as u8, 64, t, 0.1))
            .collect();
        let timeline = Timeline::merge(vec![track.clone(), track]);
        assert_eq!(timeline.len(), 12);
        assert!(timeline
            .notes()
            .windows(2)
            .all(|w| w[0].onset <= w[1].onset));
    }

    #[test]
    fn test_duration() {
        let timeline = Timeline::merge(vec![vec![
            Note::new(60, 100, 0.0, 4.0),
            Note::new(62, 100, 1.0, 0.5),
        ]]);
        assert_eq!(timeline.duration(), 4.0);
        assert_eq!(Timeline::default().duration(), 0.0);
    }
}
