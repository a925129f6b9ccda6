use bytemuck::{Pod, Zeroable};

/// Globe and starfield sphere vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GlobeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GlobeVertex {
    pub const NORMAL_OFFSET: u64 = std::mem::offset_of!(GlobeVertex, normal) as u64;
    pub const UV_OFFSET: u64 = std::mem::offset_of!(GlobeVertex, uv) as u64;
}

/// One end of a track line segment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TrackVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl TrackVertex {
    pub const COLOR_OFFSET: u64 = std::mem::offset_of!(TrackVertex, color) as u64;
}

/// A disc sprite drawn at a fixed pixel size. `scale` multiplies the
/// configured marker size; `0` hides the marker.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MarkerInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

impl MarkerInstance {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            scale: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeVertex, MarkerInstance, TrackVertex};

    #[test]
    fn layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<GlobeVertex>(), 32);
        assert_eq!(GlobeVertex::NORMAL_OFFSET, 12);
        assert_eq!(GlobeVertex::UV_OFFSET, 24);
        assert_eq!(std::mem::size_of::<TrackVertex>(), 24);
        assert_eq!(TrackVertex::COLOR_OFFSET, 12);
        assert_eq!(std::mem::size_of::<MarkerInstance>(), 16);
    }

    #[test]
    fn casts_to_bytes() {
        let markers = [MarkerInstance::at([1.0, 2.0, 3.0]); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&markers);
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[12..16], &1.0f32.to_ne_bytes());
    }
}
