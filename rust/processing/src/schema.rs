// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Portable element schema
//!
//! Value objects in meters, created once at extraction and never mutated
//! afterwards. Every element carries a random v4 id.

use crate::correlation::PanelIdentity;
use crate::error::Result;
use bim_bridge_core::{GridFamily, HostMaterial};
use bim_bridge_geometry::{
    extrude_profile, sweep_profile, Curve, Mesh, Polygon, Profile, Transform,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Minimum alignment between a placed mullion section and its centerline
const MIN_SECTION_ALIGNMENT: f64 = 1e-6;

/// RGBA color, components in 0..1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub color: Color,
}

impl Material {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color,
        }
    }

    /// Default mullion finish
    pub fn aluminum() -> Self {
        Self::new("Aluminum", Color::new(0.64, 0.68, 0.68, 1.0))
    }

    /// Used for panels whose host material cannot be read
    pub fn glass() -> Self {
        Self::new("Glass", Color::new(1.0, 1.0, 1.0, 0.2))
    }

    pub fn steel() -> Self {
        Self::new("Steel", Color::new(0.6, 0.5, 0.5, 1.0))
    }

    /// Host transparency 0..100 becomes alpha 1..0
    pub fn from_host(material: &HostMaterial) -> Self {
        let [r, g, b] = material.color;
        let transparency = f64::from(material.transparency.clamp(0, 100)) / 100.0;
        Self::new(
            material.name.clone(),
            Color::new(
                f64::from(r) / 255.0,
                f64::from(g) / 255.0,
                f64::from(b) / 255.0,
                1.0 - transparency,
            ),
        )
    }
}

/// Panel classification by material transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    Glazed,
    Spandrel,
}

impl PanelKind {
    /// Any transparency makes a panel glazed
    pub fn from_transparency(transparency: i32) -> Self {
        if transparency > 0 {
            PanelKind::Glazed
        } else {
            PanelKind::Spandrel
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::Glazed => "Glazed",
            PanelKind::Spandrel => "Spandrel",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "Glazed" => Ok(PanelKind::Glazed),
            "Spandrel" => Ok(PanelKind::Spandrel),
            _ => Err(()),
        }
    }
}

/// Infill of one grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: Uuid,
    pub name: String,
    pub boundary: Polygon,
    pub material: Material,
    pub identity: PanelIdentity,
}

impl Panel {
    /// Classification recorded in the identity; unclassified panels are glazed
    pub fn kind(&self) -> PanelKind {
        self.identity.kind().unwrap_or(PanelKind::Glazed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MullionPlacement {
    /// Lies on a grid line
    Interior,
    /// Runs along the assembly boundary
    Perimeter,
}

/// Frame member swept along a grid segment or the assembly boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mullion {
    pub id: Uuid,
    pub centerline: Curve,
    /// Section on its local XY plane
    pub profile: Profile,
    pub material: Material,
    /// Placement of the section; perimeter mullions are already offset
    pub transform: Option<Transform>,
    /// Distance from the section's outer edge to its centerline, meters
    pub centerline_offset: f64,
    pub placement: MullionPlacement,
}

impl Mullion {
    /// Section swept along the centerline. A placed section is extruded
    /// straight when it crosses the centerline, otherwise the section is
    /// swept in a frame perpendicular to each centerline segment.
    pub fn solid(&self) -> bim_bridge_geometry::Result<Mesh> {
        if let Some(transform) = &self.transform {
            let direction = self.centerline.direction()?;
            let placed = self.profile.transformed(transform);
            if placed.normal().dot(&direction).abs() > MIN_SECTION_ALIGNMENT {
                return extrude_profile(&placed, direction, self.centerline.length());
            }
        }
        sweep_profile(&self.profile, &self.centerline)
    }
}

/// A grid line with its kept and skipped segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub family: GridFamily,
    pub full_curve: Curve,
    /// Segments carrying a mullion
    pub segments: Vec<Curve>,
    /// Segments whose mullion was removed
    pub skipped_segments: Vec<Curve>,
}

/// Curtain wall: boundary, grid, mullions and panels.
///
/// Panels keep the host cell enumeration order; each also records its
/// position in its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurtainGridModel {
    pub id: Uuid,
    pub name: String,
    pub profile: Profile,
    pub u_grid_lines: Vec<GridLine>,
    pub v_grid_lines: Vec<GridLine>,
    pub interior_mullions: Vec<Mullion>,
    pub perimeter_mullions: Vec<Mullion>,
    pub panels: Vec<Panel>,
}

impl CurtainGridModel {
    pub fn grid_lines(&self) -> impl Iterator<Item = &GridLine> {
        self.u_grid_lines.iter().chain(self.v_grid_lines.iter())
    }

    pub fn skipped_segments(&self) -> impl Iterator<Item = &Curve> {
        self.grid_lines().flat_map(|line| line.skipped_segments.iter())
    }

    pub fn mullions(&self) -> impl Iterator<Item = &Mullion> {
        self.interior_mullions
            .iter()
            .chain(self.perimeter_mullions.iter())
    }

    pub fn glazed_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.kind() == PanelKind::Glazed)
    }

    pub fn spandrel_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.kind() == PanelKind::Spandrel)
    }

    /// Whether reconstruction can rebuild the assembly from its grid. A
    /// single-cell wall has no lines but still lists its panel.
    pub fn has_grid_topology(&self) -> bool {
        !self.u_grid_lines.is_empty() || !self.v_grid_lines.is_empty() || !self.panels.is_empty()
    }
}

/// Structural framing member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub id: Uuid,
    pub curve: Curve,
    /// Section on its local XY plane
    pub profile: Profile,
    pub material: Material,
    /// Cutback at the start, meters
    pub start_setback: f64,
    /// Cutback at the end, meters
    pub end_setback: f64,
    /// Cross-section rotation, degrees
    pub rotation: f64,
    /// `"{name},{type},{level},{structural type}"`
    pub identity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roof {
    pub id: Uuid,
    pub name: String,
    pub envelope: Mesh,
    pub topside: Option<Mesh>,
    pub underside: Option<Mesh>,
    pub outer_perimeter: Option<Polygon>,
    /// Lowest point, meters
    pub elevation: f64,
    /// Highest point, meters
    pub high_point: f64,
    pub thickness: f64,
    /// Square meters
    pub area: f64,
    pub material: Option<Material>,
    pub bottom_material: Option<Material>,
}

/// Mesh kept for visualization only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshElement {
    pub id: Uuid,
    pub name: String,
    pub mesh: Mesh,
    pub material: Option<Material>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SchemaElement {
    Beam(Beam),
    Roof(Roof),
    CurtainWall(CurtainGridModel),
    Mesh(MeshElement),
}

impl SchemaElement {
    pub fn id(&self) -> Uuid {
        match self {
            SchemaElement::Beam(beam) => beam.id,
            SchemaElement::Roof(roof) => roof.id,
            SchemaElement::CurtainWall(wall) => wall.id,
            SchemaElement::Mesh(mesh) => mesh.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaElement::Beam(_) => "beam",
            SchemaElement::Roof(_) => "roof",
            SchemaElement::CurtainWall(_) => "curtain-wall",
            SchemaElement::Mesh(_) => "mesh",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bim_bridge_geometry::{Point3, Vector3};

    #[test]
    fn test_material_from_host_transparency() {
        let host = HostMaterial {
            name: "Glazing".to_string(),
            color: [255, 0, 51],
            transparency: 75,
        };
        let material = Material::from_host(&host);
        assert_eq!(material.name, "Glazing");
        assert_relative_eq!(material.color.red, 1.0);
        assert_relative_eq!(material.color.blue, 0.2);
        assert_relative_eq!(material.color.alpha, 0.25);
    }

    #[test]
    fn test_panel_kind_from_transparency() {
        assert_eq!(PanelKind::from_transparency(100), PanelKind::Glazed);
        assert_eq!(PanelKind::from_transparency(1), PanelKind::Glazed);
        assert_eq!(PanelKind::from_transparency(0), PanelKind::Spandrel);
    }

    #[test]
    fn test_mullion_solid_from_placed_section() {
        let centerline = Curve::line(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 3.0));
        let mullion = Mullion {
            id: Uuid::new_v4(),
            centerline: centerline.clone(),
            profile: Profile::rectangle(0.1, 0.2),
            material: Material::aluminum(),
            transform: Some(Transform::perpendicular_to(Point3::origin(), Vector3::z())),
            centerline_offset: 0.05,
            placement: MullionPlacement::Interior,
        };
        let solid = mullion.solid().unwrap();
        let (min, max) = solid.bounds();
        assert_relative_eq!(max.z - min.z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(max.x - min.x, 0.1, epsilon = 1e-9);

        // A section lying along the centerline is swept instead
        let sideways = Mullion {
            transform: Some(Transform::perpendicular_to(Point3::origin(), Vector3::x())),
            ..mullion
        };
        let swept = sideways.solid().unwrap();
        let (min, max) = swept.bounds();
        assert_relative_eq!(max.z - min.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_element_json_round_trip() {
        let envelope = bim_bridge_geometry::extrude_polygon(
            &Polygon::rectangle(2.0, 2.0),
            0.3,
        )
        .unwrap();
        let element = SchemaElement::Mesh(MeshElement {
            id: Uuid::new_v4(),
            name: "Roof".to_string(),
            mesh: envelope,
            material: Some(Material::steel()),
        });
        let json = element.to_json().unwrap();
        assert!(json.contains("\"type\":\"Mesh\""));
        let back = SchemaElement::from_json(&json).unwrap();
        assert_eq!(back.id(), element.id());
        match back {
            SchemaElement::Mesh(mesh) => {
                assert_eq!(mesh.name, "Roof");
                assert_eq!(mesh.mesh.triangle_count(), 12);
                assert_eq!(mesh.material.map(|m| m.name), Some("Steel".to_string()));
            }
            other => panic!("unexpected element {}", other.kind()),
        }
    }
}
