//! JSON surface.

use serde_json::Value;

use super::Surface;
use crate::view::{CardView, DashboardView};

/// Collects presented views as JSON values.
#[derive(Debug, Default)]
pub struct JsonSurface {
    items: Vec<Value>,
}

impl JsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single presented item, or an array when there are several.
    pub fn into_value(mut self) -> Value {
        if self.items.len() == 1 {
            self.items.remove(0)
        } else {
            Value::Array(self.items)
        }
    }

    fn push<T: serde::Serialize>(&mut self, item: &T) {
        match serde_json::to_value(item) {
            Ok(value) => self.items.push(value),
            Err(e) => tracing::warn!(error = %e, "failed to serialize view"),
        }
    }
}

impl Surface for JsonSurface {
    fn present(&mut self, view: &CardView) {
        self.push(view);
    }

    fn present_dashboard(&mut self, dashboard: &DashboardView) {
        self.push(dashboard);
    }
}
