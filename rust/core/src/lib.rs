// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM Bridge Core
//!
//! Host boundary for converting building elements between a parametric host
//! CAD/BIM model and the portable element schema.
//!
//! ## Overview
//!
//! - **Units**: host values are in feet, schema values in meters. [`Xyz`] is the
//!   host-side coordinate and converts exactly once at the boundary.
//! - **Host snapshots**: curves, faces, solids and element snapshots
//!   ([`HostFramingMember`], [`HostWall`], [`HostRoof`]) handed over by the host
//!   integration.
//! - **Mutation barrier**: [`HostDocument`] mutations are queued on a
//!   [`CommandQueue`] and only become visible to derived reads after
//!   [`CommandQueue::flush`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bim_bridge_core::{CommandQueue, GridFamily, HostCommand, Xyz};
//!
//! let mut queue = CommandQueue::new(&mut document);
//! queue.push(HostCommand::AddGridLine {
//!     wall,
//!     family: GridFamily::U,
//!     point: Xyz::new(0.0, 0.0, 10.0),
//! });
//! queue.flush()?;
//! let lines = queue.derived()?.grid_lines(wall, GridFamily::U);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for host snapshots

pub mod commands;
pub mod document;
pub mod elements;
pub mod error;
pub mod host;
pub mod units;

pub use commands::{CommandOutcome, CommandQueue, FlushReport, Ticket};
pub use document::{CommandOutput, DirectShapeCategory, HostCommand, HostDocument};
pub use elements::{
    GridFamily, HostCell, HostCurtainGrid, HostElement, HostFramingMember, HostGridLine,
    HostLevel, HostMaterial, HostMullion, HostPanel, HostRoof, HostWall, MullionTypeParams,
    NamedType, RoofKind, SectionShape, TypeCategory,
};
pub use error::{Error, HostError, Result};
pub use host::{
    arc_segment_count, HostCurve, HostCurveLoop, HostFace, HostId, HostSolid, HostTransform,
    SurfaceKind, FINEST_LEVEL_OF_DETAIL,
};
pub use units::{
    feet_to_meters, meters_to_feet, square_feet_to_square_meters, Xyz, FEET_TO_METERS,
};
