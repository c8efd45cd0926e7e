use std::fmt;

use formats::{Feature, FeatureCollection};
use foundation::time::Time;
use runtime::{ActivityLog, IntervalTimer, LogEvent};

use crate::markers::MarkerSet;

const LOG_KIND: &str = "playback";

/// Seconds between two revealed features.
pub const PLAYBACK_INTERVAL_S: f64 = 1.0;

/// Which features take part in playback, by `properties.tag`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Tag(String),
}

impl TagFilter {
    /// `"All"` selects everything, any other string is a tag.
    pub fn parse(value: &str) -> Self {
        if value == "All" {
            TagFilter::All
        } else {
            TagFilter::Tag(value.to_string())
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Tag(tag) => feature.tag().as_deref() == Some(tag.as_str()),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFilter::All => f.write_str("All"),
            TagFilter::Tag(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Finished,
}

/// Reveals the filtered features one by one on a fixed interval.
///
/// Time is passed in explicitly: `play(now)` starts the interval and the host
/// calls `tick(now)` from its loop. `pause`, `reset`, `show_all` and
/// `set_filter` drop the interval timer before returning.
#[derive(Debug)]
pub struct PlaybackController {
    features: Vec<Feature>,
    filter: TagFilter,
    filtered: Vec<usize>,
    cursor: usize,
    state: PlaybackState,
    period_s: f64,
    timer: Option<IntervalTimer>,
    markers: MarkerSet,
    log: ActivityLog,
}

impl PlaybackController {
    pub fn new(collection: FeatureCollection) -> Self {
        Self::with_interval(collection, PLAYBACK_INTERVAL_S)
    }

    pub fn with_interval(collection: FeatureCollection, period_s: f64) -> Self {
        let filtered = (0..collection.features.len()).collect();
        Self {
            features: collection.features,
            filter: TagFilter::All,
            filtered,
            cursor: 0,
            state: PlaybackState::Idle,
            period_s,
            timer: None,
            markers: MarkerSet::new(),
            log: ActivityLog::new(),
        }
    }

    /// Swaps the feature source; the current filter is re-applied.
    pub fn set_source(&mut self, collection: FeatureCollection) {
        self.features = collection.features;
        self.apply_filter();
    }

    pub fn set_filter(&mut self, filter: TagFilter) {
        self.filter = filter;
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.filtered = self
            .features
            .iter()
            .enumerate()
            .filter(|(_, f)| self.filter.matches(f))
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
        self.timer = None;
        self.state = PlaybackState::Idle;
        self.markers.clear();
        tracing::debug!(
            filter = %self.filter,
            matched = self.filtered.len(),
            "playback filter applied"
        );
        self.log
            .record(LOG_KIND, format!("Filter changed: {}", self.filter));
    }

    /// Starts revealing from the cursor. A finished run starts over; calling
    /// it while already playing does nothing.
    pub fn play(&mut self, now: Time) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if self.state == PlaybackState::Finished || self.cursor >= self.filtered.len() {
            self.cursor = 0;
            self.markers.clear();
        }
        self.log.record(LOG_KIND, "Playback started");
        if self.filtered.is_empty() {
            self.finish();
            return;
        }
        self.state = PlaybackState::Playing;
        self.timer = Some(IntervalTimer::start(self.period_s, now));
    }

    /// Stops at the current cursor. Only meaningful while playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.timer = None;
        self.state = PlaybackState::Idle;
        self.log.record(LOG_KIND, "Playback paused");
    }

    pub fn reset(&mut self) {
        self.timer = None;
        self.cursor = 0;
        self.state = PlaybackState::Idle;
        self.markers.clear();
        self.log.record(LOG_KIND, "Playback reset");
    }

    pub fn show_all(&mut self) {
        self.timer = None;
        self.cursor = self.filtered.len();
        self.state = PlaybackState::Finished;
        self.refresh_markers();
        self.log.record(LOG_KIND, "All points displayed");
    }

    /// Advances playback to `now`; returns how many features were revealed.
    pub fn tick(&mut self, now: Time) -> usize {
        if self.state != PlaybackState::Playing {
            return 0;
        }
        let Some(timer) = self.timer.as_mut() else {
            return 0;
        };
        let due = timer.poll(now) as usize;
        let revealed = due.min(self.filtered.len() - self.cursor);
        if revealed == 0 {
            return 0;
        }
        self.cursor += revealed;
        self.refresh_markers();
        if self.cursor == self.filtered.len() {
            self.finish();
        }
        revealed
    }

    fn finish(&mut self) {
        self.timer = None;
        self.state = PlaybackState::Finished;
        self.log.record(LOG_KIND, "Playback finished");
    }

    fn refresh_markers(&mut self) {
        let shown = &self.filtered[..self.cursor];
        self.markers
            .rebuild(shown.iter().map(|&i| (i, &self.features[i])));
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_features(&self) -> impl Iterator<Item = &Feature> {
        self.filtered.iter().map(|&i| &self.features[i])
    }

    /// The first `cursor` filtered features, in reveal order.
    pub fn visible_features(&self) -> impl Iterator<Item = &Feature> {
        self.filtered[..self.cursor]
            .iter()
            .map(|&i| &self.features[i])
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// When the next feature is due, while playing.
    pub fn next_reveal_at(&self) -> Option<Time> {
        self.timer.as_ref().map(IntervalTimer::next_due)
    }

    /// Distinct tags in first-seen order, for a filter picker.
    pub fn available_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.features.iter().filter_map(Feature::tag) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    pub fn log(&self) -> &[LogEvent] {
        self.log.events()
    }

    pub fn drain_log(&mut self) -> Vec<LogEvent> {
        self.log.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::{PlaybackController, PlaybackState, TagFilter};
    use formats::FeatureCollection;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;

    fn tagged(tags: &[&str]) -> FeatureCollection {
        let features: Vec<String> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                format!(
                    r#"{{ "type": "Feature", "properties": {{ "tag": "{tag}", "n": {i} }},
                         "geometry": {{ "type": "Point", "coordinates": [{i}, 0] }} }}"#
                )
            })
            .collect();
        let doc = format!(
            r#"{{ "type": "FeatureCollection", "features": [{}] }}"#,
            features.join(",")
        );
        FeatureCollection::from_geojson_str(&doc).expect("parse")
    }

    fn messages(p: &PlaybackController) -> Vec<&str> {
        p.log().iter().map(|e| e.message.as_str()).collect()
    }

    #[test]
    fn filter_play_and_finish() {
        let mut p = PlaybackController::new(tagged(&["A", "A", "B", "A", "B"]));
        assert_eq!(p.available_tags(), vec!["A".to_string(), "B".to_string()]);

        p.set_filter(TagFilter::parse("A"));
        assert_eq!(p.filtered_len(), 3);
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.state(), PlaybackState::Idle);

        p.play(Time(0.0));
        assert_eq!(p.tick(Time(0.5)), 0);
        assert_eq!(p.tick(Time(1.0)), 1);
        assert_eq!(p.cursor(), 1);
        assert_eq!(p.tick(Time(2.0)), 1);
        assert_eq!(p.cursor(), 2);
        assert_eq!(p.state(), PlaybackState::Playing);
        assert_eq!(p.tick(Time(3.0)), 1);
        assert_eq!(p.cursor(), 3);
        assert_eq!(p.state(), PlaybackState::Finished);
        assert_eq!(p.next_reveal_at(), None);
        assert_eq!(p.tick(Time(4.0)), 0);

        let shown: Vec<_> = p
            .visible_features()
            .map(|f| f.properties["n"].as_u64())
            .collect();
        assert_eq!(shown, vec![Some(0), Some(1), Some(3)]);
        assert_eq!(p.markers().len(), 3);
        assert_eq!(
            messages(&p),
            vec!["Filter changed: A", "Playback started", "Playback finished"]
        );
    }

    #[test]
    fn show_all_from_idle() {
        let mut p = PlaybackController::new(tagged(&["A", "A", "B", "A", "B"]));
        p.set_filter(TagFilter::Tag("A".to_string()));
        p.show_all();
        assert_eq!(p.cursor(), 3);
        assert_eq!(p.state(), PlaybackState::Finished);
        assert_eq!(p.markers().len(), 3);
        assert_eq!(
            p.log().last().map(|e| e.message.as_str()),
            Some("All points displayed")
        );
    }

    #[test]
    fn tiny_interval_reveals_everything_in_one_tick() {
        let mut p = PlaybackController::with_interval(tagged(&["A", "B", "A"]), 1e-12);
        p.play(Time(1e6));
        assert_eq!(p.tick(Time(1e6 + 1.0)), 3);
        assert_eq!(p.state(), PlaybackState::Finished);
    }

    #[test]
    fn late_tick_catches_up_without_overshooting() {
        let mut p = PlaybackController::new(tagged(&["A", "B", "C"]));
        p.play(Time(10.0));
        assert_eq!(p.tick(Time(12.0)), 2);
        assert_eq!(p.tick(Time(30.0)), 1);
        assert_eq!(p.cursor(), 3);
        assert_eq!(p.state(), PlaybackState::Finished);
    }

    #[test]
    fn pause_keeps_cursor_and_cancels_timer() {
        let mut p = PlaybackController::new(tagged(&["A", "B", "C"]));
        p.play(Time(0.0));
        p.tick(Time(1.0));
        p.pause();
        assert_eq!(p.state(), PlaybackState::Idle);
        assert_eq!(p.cursor(), 1);
        assert_eq!(p.next_reveal_at(), None);
        assert_eq!(p.tick(Time(5.0)), 0);

        // Resuming continues from the cursor with a fresh interval.
        p.play(Time(5.0));
        assert_eq!(p.next_reveal_at(), Some(Time(6.0)));
        p.play(Time(5.5));
        assert_eq!(p.next_reveal_at(), Some(Time(6.0)));
        assert_eq!(p.tick(Time(6.0)), 1);
        assert_eq!(p.cursor(), 2);
    }

    #[test]
    fn reset_and_filter_change_rewind() {
        let mut p = PlaybackController::new(tagged(&["A", "B", "A"]));
        p.play(Time(0.0));
        p.tick(Time(2.0));
        assert_eq!(p.markers().len(), 2);

        p.reset();
        assert_eq!((p.cursor(), p.state()), (0, PlaybackState::Idle));
        assert!(p.markers().is_empty());

        p.play(Time(3.0));
        p.tick(Time(4.0));
        p.set_filter(TagFilter::parse("B"));
        assert_eq!((p.cursor(), p.state()), (0, PlaybackState::Idle));
        assert_eq!(p.filtered_len(), 1);
        assert!(p.markers().is_empty());
        assert_eq!(p.tick(Time(10.0)), 0);
    }

    #[test]
    fn play_after_finish_starts_over() {
        let mut p = PlaybackController::new(tagged(&["A", "B"]));
        p.show_all();
        p.play(Time(0.0));
        assert_eq!(p.state(), PlaybackState::Playing);
        assert_eq!(p.cursor(), 0);
        assert!(p.markers().is_empty());
    }

    #[test]
    fn empty_selection_finishes_immediately() {
        let mut p = PlaybackController::new(tagged(&["A"]));
        p.set_filter(TagFilter::parse("Z"));
        p.play(Time(0.0));
        assert_eq!(p.state(), PlaybackState::Finished);
        assert_eq!(p.cursor(), 0);
    }

    #[test]
    fn new_source_reapplies_filter() {
        let mut p = PlaybackController::new(tagged(&["A", "B"]));
        p.set_filter(TagFilter::parse("B"));
        p.set_source(tagged(&["B", "B", "C"]));
        assert_eq!(p.filtered_len(), 2);
        assert_eq!(p.filter(), &TagFilter::Tag("B".to_string()));
        assert_eq!(
            p.log().last().map(|e| e.message.as_str()),
            Some("Filter changed: B")
        );
    }
}
