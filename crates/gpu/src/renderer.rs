use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::time::Time;
use formats::PointSet;
use runtime::{ActivityLog, Debouncer, Frame, FrameClock, LogEvent};

use crate::buffers::PointBuffer;
use crate::camera::{Camera3D, OrbitControls};
use crate::color::ColorMode;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::framing::{CameraAnimation, FramingTarget};
use crate::surface::RenderSurface;

const LOG_KIND: &str = "renderer";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Active,
    Disposed,
}

/// Display state, changed only through renderer operations.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub point_size: f64,
    pub color_mode: ColorMode,
    /// Override range; `None` uses each cloud's own z-range.
    pub altitude_range: Option<(f64, f64)>,
    pub per_cloud_z_range: Vec<Option<(f64, f64)>>,
}

/// Draws point clouds on a [`RenderSurface`].
///
/// The host drives it one frame at a time (`run_frame`, or `run` over a
/// [`FrameClock`]); every operation mutates state on the calling thread and
/// the effects reach the surface on the next frame.
pub struct PointCloudRenderer<S: RenderSurface> {
    config: RendererConfig,
    state: RendererState,
    surface: Option<S>,
    buffers: Vec<PointBuffer>,
    render_state: RenderState,
    camera: Camera3D,
    controls: OrbitControls,
    animation: Option<CameraAnimation>,
    resize: Debouncer<(u32, u32)>,
    now: Time,
    frames: u64,
    log: ActivityLog,
}

impl<S: RenderSurface> PointCloudRenderer<S> {
    pub fn new(config: RendererConfig) -> Self {
        let camera = Camera3D::look_at(
            Vec3::new(0.0, 0.0, config.initial_camera_distance),
            Vec3::ZERO,
            config.fov_y_rad(),
            config.near,
            config.far,
        );
        Self {
            render_state: RenderState {
                point_size: config.point_size,
                color_mode: ColorMode::Uniform,
                altitude_range: None,
                per_cloud_z_range: Vec::new(),
            },
            resize: Debouncer::new(config.resize_quiescence_s),
            config,
            state: RendererState::Uninitialized,
            surface: None,
            buffers: Vec::new(),
            camera,
            controls: OrbitControls::new(Vec3::ZERO),
            animation: None,
            now: Time::ZERO,
            frames: 0,
            log: ActivityLog::new(),
        }
    }

    /// Uploads one buffer per point set and makes the renderer active.
    pub fn initialize(
        &mut self,
        mut surface: S,
        point_sets: Vec<PointSet>,
    ) -> Result<(), RenderError> {
        if self.state != RendererState::Uninitialized {
            return Err(RenderError::AlreadyInitialized);
        }

        let (width, height) = surface.size();
        self.camera.set_viewport(width, height);
        self.buffers = point_sets
            .iter()
            .map(|set| PointBuffer::upload(&mut surface, set, self.render_state.point_size))
            .collect();
        self.render_state.per_cloud_z_range =
            self.buffers.iter().map(PointBuffer::z_range).collect();
        self.surface = Some(surface);
        self.state = RendererState::Active;

        tracing::info!(
            clouds = self.buffers.len(),
            points = self.total_points(),
            width,
            height,
            "renderer initialized"
        );
        self.log.record(LOG_KIND, "Initialized 3D Viewer.");
        Ok(())
    }

    /// Returns whether anything changed.
    pub fn update_point_size(&mut self, size: f64) -> Result<bool, RenderError> {
        self.ensure_active("update_point_size")?;
        if size.is_nan() || size <= 0.0 {
            return Err(RenderError::InvalidPointSize { size });
        }
        if size == self.render_state.point_size {
            return Ok(false);
        }
        for buf in &mut self.buffers {
            buf.set_point_size(size);
        }
        self.render_state.point_size = size;
        self.log
            .record(LOG_KIND, format!("Point size changed to {size}"));
        Ok(true)
    }

    /// Switches the color mode and recomputes every color.
    ///
    /// `range` overrides the per-cloud z-range for the altitude gradient; it
    /// must be ordered and inside `±altitude_limit`. A rejected range leaves
    /// the current colors untouched.
    pub fn set_color_mode(
        &mut self,
        mode: ColorMode,
        range: Option<(f64, f64)>,
    ) -> Result<(), RenderError> {
        self.ensure_active("set_color_mode")?;
        if let Some((min, max)) = range {
            let limit = self.config.altitude_limit;
            let within = |v: f64| v.is_finite() && v.abs() <= limit;
            if !(within(min) && within(max) && min <= max) {
                let err = RenderError::InvalidAltitudeRange { min, max, limit };
                tracing::warn!(error = %err, "altitude range rejected");
                self.log.record(LOG_KIND, format!("Ignored altitude range: {err}"));
                return Err(err);
            }
        }

        for buf in &mut self.buffers {
            buf.recolor(mode, range);
        }
        self.render_state.color_mode = mode;
        self.render_state.altitude_range = range;
        tracing::debug!(?mode, ?range, "colors recomputed");
        let message = match mode {
            ColorMode::AltitudeGradient => "Altitude coloring enabled",
            ColorMode::Uniform => "Altitude coloring disabled",
        };
        self.log.record(LOG_KIND, message);
        Ok(())
    }

    /// Starts animating the camera toward the union of all point sets.
    /// A later call replaces a running animation, starting from wherever the
    /// camera is at that moment.
    pub fn center_camera(&mut self) -> Result<(), RenderError> {
        self.ensure_active("center_camera")?;
        let framing = self
            .union_bounds()
            .and_then(|b| FramingTarget::from_bounds(&b, self.config.framing_distance_factor));
        let Some(framing) = framing else {
            tracing::warn!("center_camera with nothing to frame");
            self.log.record(LOG_KIND, "No point clouds found");
            return Err(RenderError::NoGeometryToFrame);
        };

        self.animation = Some(CameraAnimation::new(
            self.controls.target,
            self.camera.position,
            &framing,
            self.config.framing_duration_s,
        ));
        tracing::debug!(
            center = ?framing.center,
            max_dimension = framing.max_dimension,
            "camera framing started"
        );
        self.log.record(LOG_KIND, "Centered object in 3D Viewer.");
        Ok(())
    }

    /// Queues a viewport change; applied once no further resize arrived for
    /// `resize_quiescence_s`.
    pub fn on_resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.ensure_active("on_resize")?;
        self.resize.push((width, height), self.now);
        Ok(())
    }

    /// User orbit input.
    pub fn orbit(&mut self, yaw_rad: f64, pitch_rad: f64) -> Result<(), RenderError> {
        self.ensure_active("orbit")?;
        self.controls.orbit(&mut self.camera, yaw_rad, pitch_rad);
        Ok(())
    }

    /// User zoom input; positive `delta` zooms out.
    pub fn dolly(&mut self, delta: f64) -> Result<(), RenderError> {
        self.ensure_active("dolly")?;
        self.controls.dolly(&mut self.camera, delta);
        Ok(())
    }

    /// Releases every buffer and stops the frame loop. Safe in any state and
    /// safe to repeat. The surface itself belongs to the host, which takes it
    /// back with [`take_surface`](Self::take_surface).
    pub fn dispose(&mut self) {
        if self.state == RendererState::Disposed {
            return;
        }
        let buffers = std::mem::take(&mut self.buffers);
        if let Some(surface) = self.surface.as_mut() {
            for buf in buffers {
                buf.release(surface);
            }
        }
        self.render_state.per_cloud_z_range.clear();
        self.animation = None;
        self.resize.cancel();
        self.log.record(LOG_KIND, "3D Viewer Disposed.");
        self.state = RendererState::Disposed;
        tracing::info!(frames = self.frames, "renderer disposed");
    }

    /// Advances one frame: pending resize, camera animation, dirty buffers,
    /// then present. Returns `false` once the renderer is no longer active.
    pub fn run_frame(&mut self, frame: Frame) -> bool {
        if self.state != RendererState::Active {
            return false;
        }
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.now = frame.time;

        if let Some((width, height)) = self.resize.poll(frame.time) {
            surface.resize(width, height);
            self.camera.set_viewport(width, height);
            tracing::debug!(width, height, "viewport resized");
        }

        if let Some(anim) = self.animation.as_mut() {
            let (target, position) = anim.sample(frame.time);
            self.controls.target = target;
            self.camera.position = position;
            if anim.is_finished(frame.time) {
                self.animation = None;
            }
        }
        self.controls.sync(&mut self.camera);

        for buf in &mut self.buffers {
            buf.flush(surface);
        }
        surface.present(&self.camera.view_proj_matrix());
        self.frames += 1;
        true
    }

    /// Pumps frames until the clock stops or the renderer is disposed.
    /// Returns the number of frames presented.
    pub fn run(&mut self, clock: &mut impl FrameClock) -> u64 {
        let mut presented = 0;
        while let Some(frame) = clock.next_frame() {
            if !self.run_frame(frame) {
                break;
            }
            presented += 1;
        }
        presented
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn buffers(&self) -> &[PointBuffer] {
        &self.buffers
    }

    pub fn point_set_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn total_points(&self) -> usize {
        self.buffers.iter().map(PointBuffer::point_count).sum()
    }

    /// Union over non-empty point sets.
    pub fn union_bounds(&self) -> Option<Aabb3> {
        self.buffers
            .iter()
            .filter_map(PointBuffer::bounds)
            .reduce(|a, b| a.union(&b))
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Hands the surface back to the host. `None` until the renderer has
    /// been disposed, and after the surface was taken once.
    pub fn take_surface(&mut self) -> Option<S> {
        if self.state != RendererState::Disposed {
            return None;
        }
        self.surface.take()
    }

    pub fn log(&self) -> &[LogEvent] {
        self.log.events()
    }

    pub fn drain_log(&mut self) -> Vec<LogEvent> {
        self.log.drain()
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), RenderError> {
        if self.state == RendererState::Active {
            Ok(())
        } else {
            Err(RenderError::NotActive {
                operation,
                state: self.state,
            })
        }
    }
}
