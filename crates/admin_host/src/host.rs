//! Host service bundle injected into the view runtime and page modules.

use std::rc::Rc;

use crate::{
    AdminConfig, BlobStore, ControlChannel, DownloadSink, ManualScheduler, MemoryBlobStore,
    MemoryControlChannel, MemoryDownloadSink, NoopBlobStore, NoopControlChannel,
    NoopDownloadSink, Scheduler,
};

/// Runtime-selected host service bundle.
///
/// All environment-specific adapter selection happens before this bundle reaches the binder,
/// which keeps page modules independent of browser details.
#[derive(Clone)]
pub struct AdminServices {
    /// Control channel to the device.
    pub channel: Rc<dyn ControlChannel>,
    /// Device file server.
    pub blobs: Rc<dyn BlobStore>,
    /// Client-side download surface.
    pub downloads: Rc<dyn DownloadSink>,
    /// UI-thread timer service.
    pub scheduler: Rc<dyn Scheduler>,
    /// Effective configuration.
    pub config: Rc<AdminConfig>,
}

impl AdminServices {
    /// Bundle for hosts without a device connection: the channel never opens, transfers and
    /// downloads fail with a host error. Timers still run on `scheduler`.
    pub fn offline(config: AdminConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            channel: Rc::new(NoopControlChannel),
            blobs: Rc::new(NoopBlobStore),
            downloads: Rc::new(NoopDownloadSink),
            scheduler,
            config: Rc::new(config),
        }
    }
}

#[derive(Clone, Default)]
/// In-memory host used by native tests: every adapter stays reachable for assertions.
pub struct MemoryHost {
    /// Recording control channel.
    pub channel: MemoryControlChannel,
    /// In-memory device file server.
    pub blobs: MemoryBlobStore,
    /// Captured downloads.
    pub downloads: MemoryDownloadSink,
    /// Virtual-time scheduler.
    pub scheduler: ManualScheduler,
}

impl MemoryHost {
    /// Builds a service bundle backed by this host's adapters.
    pub fn services(&self, config: AdminConfig) -> AdminServices {
        AdminServices {
            channel: Rc::new(self.channel.clone()),
            blobs: Rc::new(self.blobs.clone()),
            downloads: Rc::new(self.downloads.clone()),
            scheduler: Rc::new(self.scheduler.clone()),
            config: Rc::new(config),
        }
    }
}
