//! Headless runs of the renderer and the playback controller, driven by a
//! manual clock.

use serde::Serialize;

use formats::{FeatureCollection, GeoPoint, PointSet};
use foundation::math::Vec3;
use foundation::time::Time;
use gpu::{ColorMode, HeadlessSurface, PointCloudRenderer, RenderError, RendererConfig};
use layers::{PlaybackController, TagFilter};
use runtime::ManualClock;

const HEADLESS_SIZE: (u32, u32) = (1280, 720);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramingReport {
    pub points: usize,
    pub frames: u64,
    pub target: Vec3,
    pub position: Vec3,
    pub log: Vec<String>,
}

/// Uploads `points`, optionally switches to the altitude gradient, frames the
/// cloud and runs frames until the camera animation settles.
pub fn frame_point_cloud(
    points: PointSet,
    config: &RendererConfig,
    gradient: bool,
) -> Result<FramingReport, RenderError> {
    let mut renderer = PointCloudRenderer::new(config.clone());
    renderer.initialize(
        HeadlessSurface::new(HEADLESS_SIZE.0, HEADLESS_SIZE.1),
        vec![points],
    )?;
    if gradient {
        renderer.set_color_mode(ColorMode::AltitudeGradient, None)?;
    }
    renderer.center_camera()?;

    let mut clock = ManualClock::display_rate();
    let mut frames = 0;
    while renderer.is_animating() {
        clock.queue(1);
        frames += renderer.run(&mut clock);
    }
    // One more frame so the final pose is presented.
    if renderer.run_frame(clock.tick()) {
        frames += 1;
    }

    let report = FramingReport {
        points: renderer.total_points(),
        frames,
        target: renderer.controls().target,
        position: renderer.camera().position,
        log: renderer.log().iter().map(|e| e.message.clone()).collect(),
    };
    renderer.dispose();
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reveal {
    /// Seconds after playback started.
    pub at_s: f64,
    pub id: Option<String>,
    pub tag: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

/// Plays the filtered features to the end in simulated time.
pub fn simulate_playback(
    collection: FeatureCollection,
    filter: TagFilter,
) -> (Vec<Reveal>, Vec<String>) {
    let mut playback = PlaybackController::new(collection);
    playback.set_filter(filter);

    let start = Time::ZERO;
    playback.play(start);

    let mut reveals = Vec::new();
    while let Some(due) = playback.next_reveal_at() {
        let already = playback.cursor();
        playback.tick(due);
        for feature in playback.visible_features().skip(already) {
            let anchor: Option<GeoPoint> = feature.anchor();
            reveals.push(Reveal {
                at_s: due.since(start),
                id: feature.id.clone(),
                tag: feature.tag(),
                lon: anchor.map(|p| p.lon),
                lat: anchor.map(|p| p.lat),
            });
        }
    }

    let log = playback
        .drain_log()
        .into_iter()
        .map(|e| e.message)
        .collect();
    (reveals, log)
}

#[cfg(test)]
mod tests {
    use super::{frame_point_cloud, simulate_playback};
    use formats::{FeatureCollection, PointSet};
    use foundation::math::Vec3;
    use gpu::{RenderError, RendererConfig};
    use layers::TagFilter;
    use pretty_assertions::assert_eq;

    #[test]
    fn framing_settles_on_the_cloud() {
        let points: PointSet = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 4.0, 2.0)]
            .into_iter()
            .collect();
        let report = frame_point_cloud(points, &RendererConfig::default(), true).expect("frame");
        assert_eq!(report.points, 2);
        assert_eq!(report.target, Vec3::new(5.0, 2.0, 1.0));
        assert_eq!(report.position, Vec3::new(5.0, 2.0, 21.0));
        assert!(report.frames >= 90);
        assert_eq!(
            report.log,
            vec![
                "Initialized 3D Viewer.",
                "Altitude coloring enabled",
                "Centered object in 3D Viewer."
            ]
        );
    }

    #[test]
    fn empty_cloud_has_nothing_to_frame() {
        let err = frame_point_cloud(PointSet::new(), &RendererConfig::default(), false)
            .expect_err("empty");
        assert_eq!(err, RenderError::NoGeometryToFrame);
    }

    #[test]
    fn playback_reveals_one_per_second() {
        let fc = FeatureCollection::from_geojson_str(
            r#"{ "type": "FeatureCollection", "features": [
                { "type": "Feature", "id": "a", "properties": { "tag": "A" }, "geometry": { "type": "Point", "coordinates": [1, 1] } },
                { "type": "Feature", "id": "b", "properties": { "tag": "B" }, "geometry": { "type": "Point", "coordinates": [2, 2] } },
                { "type": "Feature", "id": "c", "properties": { "tag": "A" }, "geometry": { "type": "Point", "coordinates": [3, 3] } }
            ] }"#,
        )
        .expect("parse");
        let (reveals, log) = simulate_playback(fc, TagFilter::parse("A"));

        let order: Vec<_> = reveals
            .iter()
            .map(|r| (r.at_s, r.id.as_deref(), r.lon))
            .collect();
        assert_eq!(
            order,
            vec![(1.0, Some("a"), Some(1.0)), (2.0, Some("c"), Some(3.0))]
        );
        assert_eq!(
            log,
            vec!["Filter changed: A", "Playback started", "Playback finished"]
        );
    }
}
