//! Per-endpoint descriptors.
//!
//! Endpoints differ only in URL path, API family, envelope shape, and
//! deprecation status, so each is a constant row in this table — no
//! shape-sniffing on URLs or response bodies at runtime.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeShape;
use crate::error::ValidationError;

/// The two remote API families the catalog exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFamily {
    Oqmd,
    Optimade,
}

impl ApiFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Oqmd => "oqmd",
            Self::Optimade => "optimade",
        }
    }
}

impl Display for ApiFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical catalog endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogEndpoint {
    /// Formation-energy phases (`/oqmdapi/formationenergy`).
    Phases,
    /// Crystal structures (`/optimade/structures`).
    Structures,
    /// DFT calculations (`/oqmdapi/calculation`).
    Calculations,
    /// Raw entries (`/oqmdapi/entry`). Broken upstream; kept for callers that
    /// still probe it.
    Entries,
}

impl CatalogEndpoint {
    pub const ALL: [Self; 4] = [Self::Phases, Self::Structures, Self::Calculations, Self::Entries];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phases => "phases",
            Self::Structures => "structures",
            Self::Calculations => "calculations",
            Self::Entries => "entries",
        }
    }

    /// Path segment under the family base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Phases => "formationenergy",
            Self::Structures => "structures",
            Self::Calculations => "calculation",
            Self::Entries => "entry",
        }
    }

    pub const fn family(self) -> ApiFamily {
        match self {
            Self::Structures => ApiFamily::Optimade,
            Self::Phases | Self::Calculations | Self::Entries => ApiFamily::Oqmd,
        }
    }

    /// Where this endpoint keeps its records and whether they need
    /// `attributes` flattening.
    pub const fn shape(self) -> EnvelopeShape {
        match self {
            Self::Phases | Self::Entries => EnvelopeShape {
                records_field: "data",
                flatten_attributes: false,
            },
            Self::Structures => EnvelopeShape {
                records_field: "data",
                flatten_attributes: true,
            },
            Self::Calculations => EnvelopeShape {
                records_field: "results",
                flatten_attributes: false,
            },
        }
    }

    /// Deprecated endpoints still execute but the client attaches a warning
    /// to the result.
    pub const fn deprecated(self) -> bool {
        matches!(self, Self::Entries)
    }
}

impl Display for CatalogEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogEndpoint {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phases" => Ok(Self::Phases),
            "structures" => Ok(Self::Structures),
            "calculations" => Ok(Self::Calculations),
            "entries" => Ok(Self::Entries),
            other => Err(ValidationError::UnknownEndpoint {
                value: other.to_owned(),
            }),
        }
    }
}
