// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Bridge Processing
//!
//! Converts host elements to the portable element schema and rebuilds host
//! elements from it.
//!
//! ## Overview
//!
//! - **Extraction**: [`ExtractionContext`] turns framing members into
//!   [`Beam`]s, curtain walls into [`CurtainGridModel`]s and roofs into
//!   [`Roof`]s.
//! - **Correlation**: every [`Panel`] carries a [`PanelIdentity`] token with
//!   its ordinal index, which [`PanelCorrelationIndex`] uses to type the panels
//!   the host regenerates.
//! - **Reconstruction**: [`ElementReconstructor`] drives a host document
//!   through its mutate / regenerate / query phases.
//! - **Batches**: [`extract_batch`] and [`reconstruct_batch`] isolate failures
//!   per element.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bim_bridge_processing::{extract_batch, reconstruct_batch, ConversionConfig};
//!
//! let config = ConversionConfig::from_env();
//! let schema: Vec<_> = extract_batch(&config, &host_elements)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .flatten()
//!     .collect();
//! let outcomes = reconstruct_batch(&config, &mut document, &schema);
//! ```

pub mod batch;
pub mod beam;
pub mod config;
pub mod context;
pub mod correlation;
pub mod curtain_grid;
pub mod error;
pub mod reconstruct;
pub mod roof;
pub mod schema;

pub use batch::{
    extract_batch, extract_element, reconstruct_batch, ElementFailure, ExtractionOutcome,
    ReconstructionFailure, ReconstructionOutcome,
};
pub use beam::{beam_identity, identity_type_name};
pub use config::ConversionConfig;
pub use context::ExtractionContext;
pub use correlation::{
    Correlation, PanelCorrelationIndex, PanelIdentity, TOKEN_DELIMITER, TOKEN_ESCAPE,
};
pub use curtain_grid::is_attached;
pub use error::{Error, Result};
pub use reconstruct::{ElementReconstructor, Reconstructed, ReconstructionReport};
pub use roof::ROOF_NAME;
pub use schema::{
    Beam, Color, CurtainGridModel, GridLine, Material, MeshElement, Mullion, MullionPlacement,
    Panel, PanelKind, Roof, SchemaElement,
};
