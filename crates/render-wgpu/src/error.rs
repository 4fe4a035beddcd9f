/// Errors from the wgpu backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
    #[error("scene setup failed: {0}")]
    Scene(String),
    #[error("post-processing unavailable: {0}")]
    PostProcess(String),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("renderer already released")]
    Released,
}
