#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Something the host draws as one batch of geometry.
pub trait Layer {
    fn id(&self) -> LayerId;

    /// Number of vertices the layer currently hands to the renderer.
    fn vertex_count(&self) -> usize;
}
