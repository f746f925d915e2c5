// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host mutation and query interface
//!
//! The host only exposes derived geometry (generated grid lines, generated
//! panels, wall orientation) after it has been regenerated. Mutations are
//! therefore never issued directly against a [`HostDocument`]; they go through
//! [`crate::CommandQueue`], which owns the recompute barrier.

use crate::elements::{GridFamily, HostGridLine, HostLevel, NamedType, TypeCategory};
use crate::error::HostError;
use crate::host::{HostCurve, HostId};
use crate::units::Xyz;

/// Built-in category a direct shape is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectShapeCategory {
    CurtainPanel,
    Mullion,
    Roof,
    GenericModel,
}

/// One structural mutation of the host document. Lengths in feet.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    CreateCurtainWall {
        boundary: Vec<HostCurve>,
        base_level: HostId,
        height: f64,
        wall_type: Option<HostId>,
    },
    FlipWall {
        wall: HostId,
    },
    /// Add a grid line passing through `point`
    AddGridLine {
        wall: HostId,
        family: GridFamily,
        point: Xyz,
    },
    /// Remove the grid line segment matching `segment`; the host locates the
    /// owning grid line
    RemoveSegment {
        wall: HostId,
        segment: HostCurve,
    },
    AddMullion {
        grid_line: HostId,
        segment: HostCurve,
        mullion_type: Option<HostId>,
    },
    SetPanelType {
        panel: HostId,
        panel_type: HostId,
    },
    CreateBeam {
        curve: HostCurve,
        symbol: HostId,
        level: HostId,
    },
    SetBeamRotation {
        beam: HostId,
        radians: f64,
    },
    SetBeamZOffset {
        beam: HostId,
        offset: f64,
    },
    /// A tessellated shape that bypasses host families
    CreateDirectShape {
        name: String,
        category: DirectShapeCategory,
        facets: Vec<[Xyz; 3]>,
    },
}

impl HostCommand {
    /// Short command name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::CreateCurtainWall { .. } => "create-curtain-wall",
            HostCommand::FlipWall { .. } => "flip-wall",
            HostCommand::AddGridLine { .. } => "add-grid-line",
            HostCommand::RemoveSegment { .. } => "remove-segment",
            HostCommand::AddMullion { .. } => "add-mullion",
            HostCommand::SetPanelType { .. } => "set-panel-type",
            HostCommand::CreateBeam { .. } => "create-beam",
            HostCommand::SetBeamRotation { .. } => "set-beam-rotation",
            HostCommand::SetBeamZOffset { .. } => "set-beam-z-offset",
            HostCommand::CreateDirectShape { .. } => "create-direct-shape",
        }
    }
}

/// What an accepted command produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutput {
    Created(HostId),
    Modified,
}

impl CommandOutput {
    pub fn created_id(&self) -> Option<HostId> {
        match self {
            CommandOutput::Created(id) => Some(*id),
            CommandOutput::Modified => None,
        }
    }
}

/// A host document that can be mutated and queried
pub trait HostDocument {
    /// Apply one mutation. The effect on derived geometry is only observable
    /// after [`HostDocument::regenerate`].
    fn apply(&mut self, command: &HostCommand) -> Result<CommandOutput, HostError>;

    /// Recompute derived geometry for every mutation applied so far
    fn regenerate(&mut self) -> Result<(), HostError>;

    /// Levels sorted by elevation
    fn levels(&self) -> Vec<HostLevel>;

    fn element_types(&self, category: TypeCategory) -> Vec<NamedType>;

    /// Minimum height over the cross-section of a framing symbol, feet
    fn min_symbol_height(&self, symbol: HostId) -> Option<f64>;

    /// Derived: grid lines generated on a curtain wall
    fn grid_lines(&self, wall: HostId, family: GridFamily) -> Vec<HostGridLine>;

    /// Derived: generated panels in generation order
    fn panel_ids(&self, wall: HostId) -> Vec<HostId>;

    /// Derived: the wall's exterior facing direction
    fn wall_orientation(&self, wall: HostId) -> Option<Xyz>;
}
