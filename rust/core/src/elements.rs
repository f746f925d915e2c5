// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host element snapshots
//!
//! Read-only copies of the host elements the converters consume. The host
//! integration fills these in; the conversion core never queries the host
//! while extracting.

use crate::host::{HostCurve, HostCurveLoop, HostFace, HostId, HostSolid, HostTransform};
use crate::units::Xyz;

/// Grid line family of a gridded assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridFamily {
    U,
    V,
}

/// Standard section shape declared by a framing family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SectionShape {
    IWideFlange,
    IParallelFlange,
    RectangleHss,
    RoundHss,
    NotDefined,
}

impl SectionShape {
    /// Symmetric flanged shapes have an analytic profile
    #[inline]
    pub fn is_flanged(&self) -> bool {
        matches!(self, SectionShape::IWideFlange | SectionShape::IParallelFlange)
    }
}

/// A structural framing member (beam, brace)
#[derive(Debug, Clone, PartialEq)]
pub struct HostFramingMember {
    pub id: HostId,
    pub name: String,
    pub type_name: String,
    pub level_name: Option<String>,
    pub structural_type: String,
    pub section_shape: SectionShape,
    /// Section width parameter, feet
    pub section_width: Option<f64>,
    /// Section height parameter, feet
    pub section_height: Option<f64>,
    pub driving_curve: HostCurve,
    /// Boundary curves of the swept cross-section, in the section's local frame
    pub swept_profile: Option<Vec<HostCurve>>,
    pub solid: Option<HostSolid>,
    /// Negative values are cutbacks
    pub start_extension: f64,
    pub end_extension: f64,
    /// Cross-section rotation, radians
    pub bend_angle: f64,
}

/// Type parameters of a mullion; all lengths in feet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MullionTypeParams {
    pub radius: Option<f64>,
    pub width1: Option<f64>,
    pub width2: Option<f64>,
    pub thickness: Option<f64>,
}

/// A frame member of a gridded assembly
#[derive(Debug, Clone, PartialEq)]
pub struct HostMullion {
    pub id: HostId,
    pub type_name: String,
    pub params: MullionTypeParams,
    pub location_curve: Option<HostCurve>,
    pub transform: HostTransform,
    pub solid: Option<HostSolid>,
}

/// A grid line as reported by the host
#[derive(Debug, Clone, PartialEq)]
pub struct HostGridLine {
    pub id: HostId,
    pub family: GridFamily,
    pub full_curve: HostCurve,
    pub segments: Vec<HostCurve>,
    pub skipped_segments: Vec<HostCurve>,
}

/// One cell of a gridded assembly
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostCell {
    pub planarized_loops: Vec<HostCurveLoop>,
}

/// Host material, reduced to what the schema keeps
#[derive(Debug, Clone, PartialEq)]
pub struct HostMaterial {
    pub name: String,
    pub color: [u8; 3],
    /// 0 (opaque) to 100 (fully transparent)
    pub transparency: i32,
}

/// An infill panel; `material` is `None` when the host could not read it
#[derive(Debug, Clone, PartialEq)]
pub struct HostPanel {
    pub id: HostId,
    pub type_name: String,
    pub material: Option<HostMaterial>,
}

/// Grid topology of a curtain wall. `cells` and `panels` are index aligned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostCurtainGrid {
    pub u_lines: Vec<HostGridLine>,
    pub v_lines: Vec<HostGridLine>,
    pub cells: Vec<HostCell>,
    pub panels: Vec<HostPanel>,
    pub mullions: Vec<HostMullion>,
}

impl HostCurtainGrid {
    pub fn grid_lines(&self) -> impl Iterator<Item = &HostGridLine> {
        self.u_lines.iter().chain(self.v_lines.iter())
    }
}

/// A wall, with its curtain grid if it has one
#[derive(Debug, Clone, PartialEq)]
pub struct HostWall {
    pub id: HostId,
    pub name: String,
    pub type_name: String,
    /// Elevation profile loops of the wall as a basic wall
    pub profile_loops: Vec<HostCurveLoop>,
    pub curtain_grid: Option<HostCurtainGrid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofKind {
    Footprint,
    Extrusion,
}

/// A roof with its faces and layer materials
#[derive(Debug, Clone, PartialEq)]
pub struct HostRoof {
    pub id: HostId,
    pub kind: RoofKind,
    pub bounding_box: (Xyz, Xyz),
    /// Feet
    pub thickness: f64,
    /// Square feet
    pub area: f64,
    pub top_material: Option<HostMaterial>,
    pub bottom_material: Option<HostMaterial>,
    pub faces: Vec<HostFace>,
    /// Host-designated top faces; footprint roofs only
    pub top_faces: Vec<HostFace>,
    /// Host-designated bottom faces; footprint roofs only
    pub bottom_faces: Vec<HostFace>,
    /// Profile sketch curves; extrusion roofs only
    pub profile_curves: Vec<HostCurve>,
    pub sketch_normal: Option<Xyz>,
    /// Base loops of the roof extruded onto its lowest plane
    pub footprint_loops: Vec<HostCurveLoop>,
}

/// Any element the converters accept
#[derive(Debug, Clone, PartialEq)]
pub enum HostElement {
    Framing(HostFramingMember),
    Wall(HostWall),
    Roof(HostRoof),
}

impl HostElement {
    pub fn id(&self) -> HostId {
        match self {
            HostElement::Framing(member) => member.id,
            HostElement::Wall(wall) => wall.id,
            HostElement::Roof(roof) => roof.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostLevel {
    pub id: HostId,
    pub name: String,
    /// Feet
    pub elevation: f64,
}

/// A loadable type (panel type, mullion type, framing symbol, wall type)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedType {
    pub id: HostId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeCategory {
    CurtainWall,
    CurtainPanel,
    Mullion,
    StructuralFraming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flanged_shapes() {
        assert!(SectionShape::IWideFlange.is_flanged());
        assert!(SectionShape::IParallelFlange.is_flanged());
        assert!(!SectionShape::RectangleHss.is_flanged());
        assert!(!SectionShape::NotDefined.is_flanged());
    }

    #[test]
    fn test_grid_lines_chain_u_before_v() {
        let line = |id, family| HostGridLine {
            id: HostId(id),
            family,
            full_curve: HostCurve::line(Xyz::ZERO, Xyz::BASIS_X),
            segments: Vec::new(),
            skipped_segments: Vec::new(),
        };
        let grid = HostCurtainGrid {
            u_lines: vec![line(1, GridFamily::U)],
            v_lines: vec![line(2, GridFamily::V)],
            ..Default::default()
        };
        let ids: Vec<_> = grid.grid_lines().map(|l| l.id).collect();
        assert_eq!(ids, vec![HostId(1), HostId(2)]);
    }
}
