//! Routing of requests to registered surfaces.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::wire::RpcRequest;

use super::{DISPATCH_TARGET, DispatchError, ServiceSurface};

/// Name and methods of one registered surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceDescription {
    /// Surface name.
    pub name: &'static str,
    /// Methods it answers.
    pub methods: &'static [&'static str],
}

/// Routes requests to surfaces by name.
#[derive(Default)]
pub struct SurfaceRouter {
    surfaces: Vec<Arc<dyn ServiceSurface>>,
}

impl SurfaceRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `surface`, replacing any surface with the same name.
    pub fn register(&mut self, surface: Arc<dyn ServiceSurface>) {
        self.surfaces
            .retain(|existing| existing.name() != surface.name());
        self.surfaces.push(surface);
    }

    /// Describes the registered surfaces in registration order.
    #[must_use]
    pub fn describe(&self) -> Vec<SurfaceDescription> {
        self.surfaces
            .iter()
            .map(|surface| SurfaceDescription {
                name: surface.name(),
                methods: surface.methods(),
            })
            .collect()
    }

    /// Routes `request` to its surface and returns the reply body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownService`] or
    /// [`DispatchError::UnknownMethod`] for unregistered targets, and any
    /// error the surface raises.
    pub fn route(&self, request: RpcRequest) -> Result<Value, DispatchError> {
        let service = request.service().to_ascii_lowercase();
        let method = request.method().to_ascii_lowercase();
        let surface = self
            .surfaces
            .iter()
            .find(|surface| surface.name() == service)
            .ok_or_else(|| DispatchError::unknown_service(request.service()))?;
        if !surface.methods().contains(&method.as_str()) {
            return Err(DispatchError::unknown_method(surface.name(), method));
        }

        debug!(
            target: DISPATCH_TARGET,
            service = surface.name(),
            method = %method,
            "routing request"
        );
        surface.invoke(&method, request.body)
    }
}
