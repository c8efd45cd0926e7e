use std::collections::BTreeMap;

/// Opaque handle to a point buffer living on a [`RenderSurface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// The host drawing surface.
///
/// A wgpu or WebGL host implements this over real GPU buffers; the renderer
/// only ever talks to the surface through these calls, always from the thread
/// that drives the frame loop.
pub trait RenderSurface {
    /// Drawable size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Allocates a buffer holding `point_count` positions and colors.
    fn create_point_buffer(&mut self, positions: &[u8], colors: &[u8], point_count: usize)
    -> BufferId;

    fn write_colors(&mut self, buffer: BufferId, colors: &[u8]);

    fn set_point_size(&mut self, buffer: BufferId, size: f32);

    fn destroy_buffer(&mut self, buffer: BufferId);

    /// Reconfigures the swap chain / drawing buffer.
    fn resize(&mut self, width: u32, height: u32);

    /// Draws every live buffer with the given column-major view-projection.
    fn present(&mut self, view_proj: &[[f32; 4]; 4]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessBuffer {
    pub positions: Vec<u8>,
    pub colors: Vec<u8>,
    pub point_count: usize,
    pub point_size: f32,
}

/// In-memory surface used by tests and the command line tools.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    next_id: u32,
    buffers: BTreeMap<BufferId, HeadlessBuffer>,
    color_uploads: usize,
    resizes: usize,
    presented: u64,
    last_view_proj: Option<[[f32; 4]; 4]>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_id: 0,
            buffers: BTreeMap::new(),
            color_uploads: 0,
            resizes: 0,
            presented: 0,
            last_view_proj: None,
        }
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&HeadlessBuffer> {
        self.buffers.get(&id)
    }

    /// Bytes held by live buffers.
    pub fn resident_bytes(&self) -> usize {
        self.buffers
            .values()
            .map(|b| b.positions.len() + b.colors.len())
            .sum()
    }

    pub fn color_uploads(&self) -> usize {
        self.color_uploads
    }

    pub fn resizes(&self) -> usize {
        self.resizes
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn last_view_proj(&self) -> Option<[[f32; 4]; 4]> {
        self.last_view_proj
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_point_buffer(
        &mut self,
        positions: &[u8],
        colors: &[u8],
        point_count: usize,
    ) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            HeadlessBuffer {
                positions: positions.to_vec(),
                colors: colors.to_vec(),
                point_count,
                point_size: 1.0,
            },
        );
        id
    }

    fn write_colors(&mut self, buffer: BufferId, colors: &[u8]) {
        if let Some(b) = self.buffers.get_mut(&buffer) {
            b.colors.clear();
            b.colors.extend_from_slice(colors);
            self.color_uploads += 1;
        }
    }

    fn set_point_size(&mut self, buffer: BufferId, size: f32) {
        if let Some(b) = self.buffers.get_mut(&buffer) {
            b.point_size = size;
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.resizes += 1;
    }

    fn present(&mut self, view_proj: &[[f32; 4]; 4]) {
        self.presented += 1;
        self.last_view_proj = Some(*view_proj);
    }
}
