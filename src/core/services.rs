//=========================================================================
// Services
//=========================================================================
//
// Capability bundle handed to scenes.
//
// Bundles the narrow interfaces through which scenes reach the external
// subsystems this crate does not own: rendering, assets, UI, events,
// configuration, and the camera. Every accessor may report the
// capability as absent; a scene must treat a missing capability it
// requires as an initialization failure.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::event_bus::EventBus;

//=== Capability Traits ===================================================

/// Opaque handle to a loaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u64);

/// Render device seam.
///
/// Frame bracketing and clear only; drawing itself belongs to the
/// rendering backend behind this trait.
pub trait RenderDevice: Send + Sync {
    /// Opens a frame for recording.
    fn begin_frame(&self);

    /// Submits the recorded frame.
    fn end_frame(&self);

    /// Clears the backbuffer to an RGBA color.
    fn clear(&self, r: f32, g: f32, b: f32, a: f32);
}

/// Asset loading seam.
pub trait AssetLoader: Send + Sync {
    /// Loads the asset at `path`, returning a handle on success.
    fn load(&self, path: &str) -> Option<AssetHandle>;

    /// Releases a previously loaded asset.
    fn unload(&self, handle: AssetHandle);
}

/// UI surface seam. Panels are addressed by name; layout and widgets
/// live behind this trait.
pub trait UiSurface: Send + Sync {
    fn show_panel(&self, name: &str);
    fn hide_panel(&self, name: &str);
}

/// Key/value configuration seam.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Camera control seam.
pub trait CameraController: Send + Sync {
    fn set_position(&self, x: f32, y: f32, z: f32);
    fn look_at(&self, x: f32, y: f32, z: f32);
}

//=== Services ============================================================

/// Capability bundle borrowed by scenes for their active lifetime.
///
/// Built once by the composition root and threaded into the scheduler;
/// scenes clone the `Arc`s they need during `initialize` and must drop
/// them again in `cleanup`, before the scheduler destroys the scene.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use proscenium::core::event_bus::EventBus;
/// # use proscenium::core::services::Services;
/// let bus = Arc::new(EventBus::new());
/// let services = Services::new().with_event_bus(Arc::clone(&bus));
///
/// assert!(services.event_bus().is_some());
/// assert!(services.render_device().is_none());
/// ```
#[derive(Default, Clone)]
pub struct Services {
    render_device: Option<Arc<dyn RenderDevice>>,
    asset_loader: Option<Arc<dyn AssetLoader>>,
    ui_surface: Option<Arc<dyn UiSurface>>,
    event_bus: Option<Arc<EventBus>>,
    config_store: Option<Arc<dyn ConfigStore>>,
    camera: Option<Arc<dyn CameraController>>,
}

impl Services {
    /// Creates an empty bundle; every capability reads as absent.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Builder ----------------------------------------------------------

    pub fn with_render_device(mut self, device: Arc<dyn RenderDevice>) -> Self {
        self.render_device = Some(device);
        self
    }

    pub fn with_asset_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.asset_loader = Some(loader);
        self
    }

    pub fn with_ui_surface(mut self, surface: Arc<dyn UiSurface>) -> Self {
        self.ui_surface = Some(surface);
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn with_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn with_camera(mut self, camera: Arc<dyn CameraController>) -> Self {
        self.camera = Some(camera);
        self
    }

    //--- Accessors --------------------------------------------------------
    //
    // Each returns None when the capability was never provided. Scenes
    // requiring a capability fail their initialize on None.
    //

    pub fn render_device(&self) -> Option<Arc<dyn RenderDevice>> {
        self.render_device.clone()
    }

    pub fn asset_loader(&self) -> Option<Arc<dyn AssetLoader>> {
        self.asset_loader.clone()
    }

    pub fn ui_surface(&self) -> Option<Arc<dyn UiSurface>> {
        self.ui_surface.clone()
    }

    pub fn event_bus(&self) -> Option<Arc<EventBus>> {
        self.event_bus.clone()
    }

    pub fn config_store(&self) -> Option<Arc<dyn ConfigStore>> {
        self.config_store.clone()
    }

    pub fn camera(&self) -> Option<Arc<dyn CameraController>> {
        self.camera.clone()
    }
}

//=========================================================================
// Tests
//=========================================================================
