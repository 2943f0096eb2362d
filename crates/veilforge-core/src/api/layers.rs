use std::path::Path;

use super::shared::{require_carrier, CarrierSource};
use crate::capacity::CapacityReport;
use crate::engine::{self, EngineOptions};
use crate::layers::LayerListing;
use crate::Result;

pub fn prepare() -> InspectApi {
    InspectApi::default()
}

/// Looks into a carrier without a password.
#[derive(Default, Debug)]
pub struct InspectApi {
    carrier: Option<CarrierSource>,
    options: EngineOptions,
}

impl InspectApi {
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_carrier<A: AsRef<Path>>(mut self, carrier: A) -> Result<Self> {
        self.carrier = Some(CarrierSource::from_file(carrier.as_ref())?);
        Ok(self)
    }

    pub fn with_carrier_bytes(mut self, bytes: Vec<u8>, name_hint: Option<&str>) -> Self {
        self.carrier = Some(CarrierSource {
            bytes,
            name_hint: name_hint.map(str::to_string),
        });
        self
    }

    /// all layer slots, malformed ones included
    pub fn list(self) -> Result<LayerListing> {
        let carrier = require_carrier(self.carrier)?;
        engine::layers(&carrier.bytes, carrier.name_hint.as_deref(), &self.options)
    }

    pub fn capacity(self) -> Result<CapacityReport> {
        let carrier = require_carrier(self.carrier)?;
        engine::capacity(&carrier.bytes, carrier.name_hint.as_deref(), &self.options)
    }
}
