// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host document and host element fixtures.
//!
//! Curtain walls live in the XZ plane. U grid lines are horizontal (constant
//! Z), V grid lines vertical (constant X). Like a real host, derived geometry
//! (grid line segments, panels, orientation) is only recomputed on
//! `regenerate`, so reads issued before a barrier see the previous state.

#![allow(dead_code)]

use bim_bridge_core::{
    CommandOutput, GridFamily, HostCell, HostCommand, HostCurtainGrid, HostCurve, HostDocument,
    HostError, HostGridLine, HostId, HostLevel, HostMaterial, HostMullion, HostPanel,
    HostTransform, HostWall, MullionTypeParams, NamedType, TypeCategory, Xyz,
};
use rustc_hash::FxHashMap;

const MATCH_TOLERANCE: f64 = 1e-6;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Applied (not yet regenerated) state of one curtain wall
#[derive(Debug, Clone)]
struct MockWall {
    id: HostId,
    x_range: (f64, f64),
    z_range: (f64, f64),
    base_level: HostId,
    height: f64,
    flipped: bool,
    lines: Vec<(HostId, GridFamily, f64)>,
    removed: Vec<HostCurve>,
}

/// What the last regeneration exposed for one wall
#[derive(Debug, Clone, Default)]
struct Derived {
    u_lines: Vec<HostGridLine>,
    v_lines: Vec<HostGridLine>,
    panels: Vec<HostId>,
    orientation: Option<Xyz>,
}

#[derive(Debug, Default)]
pub struct MockDocument {
    pub levels: Vec<HostLevel>,
    pub types: FxHashMap<TypeCategory, Vec<NamedType>>,
    pub symbol_heights: FxHashMap<HostId, f64>,
    /// Report no orientation for walls
    pub hide_orientation: bool,
    /// Every accepted command, in order
    pub applied: Vec<HostCommand>,
    pub rejected: Vec<HostCommand>,
    pub regenerations: usize,
    /// Panel type assignments
    pub panel_types: FxHashMap<HostId, HostId>,
    /// (grid line, segment, mullion type)
    pub mullions: Vec<(HostId, HostCurve, Option<HostId>)>,
    walls: Vec<MockWall>,
    derived: FxHashMap<HostId, Derived>,
    next_id: i64,
}

impl MockDocument {
    /// Levels at 0 and 10 ft, framing, panel, mullion and wall types
    pub fn new() -> Self {
        let mut doc = Self {
            next_id: 1000,
            ..Default::default()
        };
        doc.levels = vec![
            HostLevel {
                id: HostId(1),
                name: "Level 1".to_string(),
                elevation: 0.0,
            },
            HostLevel {
                id: HostId(2),
                name: "Level 2".to_string(),
                elevation: 10.0,
            },
        ];
        doc.add_type(TypeCategory::CurtainPanel, 10, "Vision");
        doc.add_type(TypeCategory::CurtainPanel, 11, "Spandrel");
        doc.add_type(TypeCategory::Mullion, 20, "Rectangular 2.5 x 5");
        doc.add_type(TypeCategory::CurtainWall, 30, "Storefront");
        doc.add_type(TypeCategory::StructuralFraming, 40, "W10x12");
        doc.add_type(TypeCategory::StructuralFraming, 41, "W12x26");
        doc.symbol_heights.insert(HostId(40), 0.83);
        doc.symbol_heights.insert(HostId(41), 1.02);
        doc
    }

    pub fn add_type(&mut self, category: TypeCategory, id: i64, name: &str) {
        self.types.entry(category).or_default().push(NamedType {
            id: HostId(id),
            name: name.to_string(),
        });
    }

    pub fn type_name(&self, category: TypeCategory, id: HostId) -> Option<&str> {
        self.types
            .get(&category)?
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
    }

    pub fn count(&self, name: &str) -> usize {
        self.applied.iter().filter(|c| c.name() == name).count()
    }

    pub fn wall_base(&self, wall: HostId) -> Option<(HostId, f64)> {
        self.wall(wall).map(|w| (w.base_level, w.height))
    }

    fn allocate(&mut self) -> HostId {
        self.next_id += 1;
        HostId(self.next_id)
    }

    fn wall(&self, id: HostId) -> Option<&MockWall> {
        self.walls.iter().find(|w| w.id == id)
    }

    fn wall_mut(&mut self, id: HostId) -> Result<&mut MockWall, HostError> {
        self.walls
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(HostError::UnknownElement(id))
    }

    fn apply_inner(&mut self, command: &HostCommand) -> Result<CommandOutput, HostError> {
        let name = command.name();
        match command {
            HostCommand::CreateCurtainWall {
                boundary,
                base_level,
                height,
                ..
            } => {
                let points: Vec<Xyz> = boundary.iter().map(|c| c.end_point(0)).collect();
                if points.len() < 3 {
                    return Err(HostError::rejected(name, "boundary needs three edges"));
                }
                let range = |f: fn(&Xyz) -> f64| {
                    points
                        .iter()
                        .map(f)
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
                };
                let id = self.allocate();
                self.walls.push(MockWall {
                    id,
                    x_range: range(|p| p.x),
                    z_range: range(|p| p.z),
                    base_level: *base_level,
                    height: *height,
                    flipped: false,
                    lines: Vec::new(),
                    removed: Vec::new(),
                });
                Ok(CommandOutput::Created(id))
            }
            HostCommand::FlipWall { wall } => {
                let wall = self.wall_mut(*wall)?;
                wall.flipped = !wall.flipped;
                Ok(CommandOutput::Modified)
            }
            HostCommand::AddGridLine {
                wall,
                family,
                point,
            } => {
                let id = self.allocate();
                let wall = self.wall_mut(*wall)?;
                let (offset, (lo, hi)) = match family {
                    GridFamily::U => (point.z, wall.z_range),
                    GridFamily::V => (point.x, wall.x_range),
                };
                if offset <= lo + MATCH_TOLERANCE || offset >= hi - MATCH_TOLERANCE {
                    return Err(HostError::rejected(name, "grid line outside the wall"));
                }
                wall.lines.push((id, *family, offset));
                Ok(CommandOutput::Created(id))
            }
            HostCommand::RemoveSegment { wall, segment } => {
                let wall = self.wall_mut(*wall)?;
                let view: &MockWall = wall;
                let exists = view
                    .lines
                    .iter()
                    .flat_map(|&(_, family, offset)| line_segments(view, family, offset))
                    .any(|s| same_segment(&s, segment));
                let already_removed = view.removed.iter().any(|s| same_segment(s, segment));
                if !exists || already_removed {
                    return Err(HostError::rejected(name, "no grid line owns this segment"));
                }
                wall.removed.push(segment.clone());
                Ok(CommandOutput::Modified)
            }
            HostCommand::AddMullion {
                grid_line,
                segment,
                mullion_type,
            } => {
                let known = self
                    .walls
                    .iter()
                    .any(|w| w.lines.iter().any(|(id, _, _)| id == grid_line));
                if !known {
                    return Err(HostError::UnknownElement(*grid_line));
                }
                self.mullions.push((*grid_line, segment.clone(), *mullion_type));
                Ok(CommandOutput::Created(self.allocate()))
            }
            HostCommand::SetPanelType { panel, panel_type } => {
                let known = self.derived.values().any(|d| d.panels.contains(panel));
                if !known {
                    return Err(HostError::UnknownElement(*panel));
                }
                self.panel_types.insert(*panel, *panel_type);
                Ok(CommandOutput::Modified)
            }
            HostCommand::SetBeamRotation { .. } | HostCommand::SetBeamZOffset { .. } => {
                Ok(CommandOutput::Modified)
            }
            HostCommand::CreateBeam { .. } | HostCommand::CreateDirectShape { .. } => {
                Ok(CommandOutput::Created(self.allocate()))
            }
        }
    }
}

impl HostDocument for MockDocument {
    fn apply(&mut self, command: &HostCommand) -> Result<CommandOutput, HostError> {
        let result = self.apply_inner(command);
        match &result {
            Ok(_) => self.applied.push(command.clone()),
            Err(_) => self.rejected.push(command.clone()),
        }
        result
    }

    fn regenerate(&mut self) -> Result<(), HostError> {
        self.regenerations += 1;
        let mut derived = FxHashMap::default();
        let mut next_panel = 500_000;
        for wall in &self.walls {
            let to_host = |family: GridFamily| -> Vec<HostGridLine> {
                let mut lines: Vec<&(HostId, GridFamily, f64)> =
                    wall.lines.iter().filter(|(_, f, _)| *f == family).collect();
                lines.sort_by(|a, b| a.2.total_cmp(&b.2));
                lines
                    .into_iter()
                    .map(|&(id, family, offset)| {
                        let (segments, skipped): (Vec<HostCurve>, Vec<HostCurve>) =
                            line_segments(wall, family, offset)
                            .into_iter()
                            .partition(|s| !wall.removed.iter().any(|r| same_segment(r, s)));
                        HostGridLine {
                            id,
                            family,
                            full_curve: full_curve(wall, family, offset),
                            segments,
                            skipped_segments: skipped,
                        }
                    })
                    .collect()
            };

            let rows = breakpoints(wall.z_range, wall, GridFamily::U).len() - 1;
            let columns = breakpoints(wall.x_range, wall, GridFamily::V).len() - 1;
            let panels = (0..rows * columns)
                .map(|_| {
                    next_panel += 1;
                    HostId(next_panel)
                })
                .collect();

            let orientation = if self.hide_orientation {
                None
            } else if wall.flipped {
                Some(Xyz::new(0.0, 1.0, 0.0))
            } else {
                Some(Xyz::new(0.0, -1.0, 0.0))
            };

            derived.insert(
                wall.id,
                Derived {
                    u_lines: to_host(GridFamily::U),
                    v_lines: to_host(GridFamily::V),
                    panels,
                    orientation,
                },
            );
        }
        self.derived = derived;
        Ok(())
    }

    fn levels(&self) -> Vec<HostLevel> {
        self.levels.clone()
    }

    fn element_types(&self, category: TypeCategory) -> Vec<NamedType> {
        self.types.get(&category).cloned().unwrap_or_default()
    }

    fn min_symbol_height(&self, symbol: HostId) -> Option<f64> {
        self.symbol_heights.get(&symbol).copied()
    }

    fn grid_lines(&self, wall: HostId, family: GridFamily) -> Vec<HostGridLine> {
        self.derived
            .get(&wall)
            .map(|d| match family {
                GridFamily::U => d.u_lines.clone(),
                GridFamily::V => d.v_lines.clone(),
            })
            .unwrap_or_default()
    }

    fn panel_ids(&self, wall: HostId) -> Vec<HostId> {
        self.derived
            .get(&wall)
            .map(|d| d.panels.clone())
            .unwrap_or_default()
    }

    fn wall_orientation(&self, wall: HostId) -> Option<Xyz> {
        self.derived.get(&wall).and_then(|d| d.orientation)
    }
}

/// Sorted range ends plus the offsets of the crossing family
fn breakpoints(range: (f64, f64), wall: &MockWall, crossing: GridFamily) -> Vec<f64> {
    let mut points = vec![range.0, range.1];
    points.extend(
        wall.lines
            .iter()
            .filter(|(_, family, _)| *family == crossing)
            .map(|(_, _, offset)| *offset),
    );
    points.sort_by(f64::total_cmp);
    points
}

fn full_curve(wall: &MockWall, family: GridFamily, offset: f64) -> HostCurve {
    match family {
        GridFamily::U => HostCurve::line(
            Xyz::new(wall.x_range.0, 0.0, offset),
            Xyz::new(wall.x_range.1, 0.0, offset),
        ),
        GridFamily::V => HostCurve::line(
            Xyz::new(offset, 0.0, wall.z_range.0),
            Xyz::new(offset, 0.0, wall.z_range.1),
        ),
    }
}

/// Segments of a line split where the other family crosses it
fn line_segments(wall: &MockWall, family: GridFamily, offset: f64) -> Vec<HostCurve> {
    let (cuts, point): (Vec<f64>, fn(f64, f64) -> Xyz) = match family {
        GridFamily::U => (breakpoints(wall.x_range, wall, GridFamily::V), |t, o| Xyz::new(t, 0.0, o)),
        GridFamily::V => (breakpoints(wall.z_range, wall, GridFamily::U), |t, o| Xyz::new(o, 0.0, t)),
    };
    cuts.windows(2)
        .map(|w| HostCurve::line(point(w[0], offset), point(w[1], offset)))
        .collect()
}

pub fn same_segment(a: &HostCurve, b: &HostCurve) -> bool {
    let (a0, a1) = (a.end_point(0), a.end_point(1));
    let (b0, b1) = (b.end_point(0), b.end_point(1));
    (a0.is_almost_equal_to(&b0, MATCH_TOLERANCE) && a1.is_almost_equal_to(&b1, MATCH_TOLERANCE))
        || (a0.is_almost_equal_to(&b1, MATCH_TOLERANCE) && a1.is_almost_equal_to(&b0, MATCH_TOLERANCE))
}

pub fn rectangle_loop(x0: f64, x1: f64, z0: f64, z1: f64) -> Vec<HostCurve> {
    let p = [
        Xyz::new(x0, 0.0, z0),
        Xyz::new(x1, 0.0, z0),
        Xyz::new(x1, 0.0, z1),
        Xyz::new(x0, 0.0, z1),
    ];
    (0..4).map(|i| HostCurve::line(p[i], p[(i + 1) % 4])).collect()
}

fn mullion(id: i64, curve: HostCurve) -> HostMullion {
    let start = curve.end_point(0);
    HostMullion {
        id: HostId(id),
        type_name: "Rectangular 2.5 x 5".to_string(),
        params: MullionTypeParams {
            radius: None,
            width1: Some(0.1),
            width2: Some(0.1),
            thickness: Some(0.4),
        },
        location_curve: Some(curve),
        transform: HostTransform {
            origin: start,
            ..HostTransform::identity()
        },
        solid: None,
    }
}

/// A `width` x `height` ft curtain wall in the XZ plane with U lines at
/// `u_offsets` (Z) and V lines at `v_offsets` (X), all segments kept.
///
/// Cells and panels are row-major from the bottom left. `panel` gives the
/// type name and material transparency of panel `i`. Every kept segment
/// carries an interior mullion; the four boundary edges carry perimeter
/// mullions.
pub fn rectangular_curtain_wall(
    width: f64,
    height: f64,
    u_offsets: &[f64],
    v_offsets: &[f64],
    panel: impl Fn(usize) -> (&'static str, i32),
) -> HostWall {
    let xs: Vec<f64> = std::iter::once(0.0)
        .chain(v_offsets.iter().copied())
        .chain(std::iter::once(width))
        .collect();
    let zs: Vec<f64> = std::iter::once(0.0)
        .chain(u_offsets.iter().copied())
        .chain(std::iter::once(height))
        .collect();

    let mut next_id = 0;
    let mut id = || {
        next_id += 1;
        next_id
    };

    let u_lines: Vec<HostGridLine> = u_offsets
        .iter()
        .map(|&z| HostGridLine {
            id: HostId(id()),
            family: GridFamily::U,
            full_curve: HostCurve::line(Xyz::new(0.0, 0.0, z), Xyz::new(width, 0.0, z)),
            segments: xs
                .windows(2)
                .map(|w| HostCurve::line(Xyz::new(w[0], 0.0, z), Xyz::new(w[1], 0.0, z)))
                .collect(),
            skipped_segments: Vec::new(),
        })
        .collect();
    let v_lines: Vec<HostGridLine> = v_offsets
        .iter()
        .map(|&x| HostGridLine {
            id: HostId(id()),
            family: GridFamily::V,
            full_curve: HostCurve::line(Xyz::new(x, 0.0, 0.0), Xyz::new(x, 0.0, height)),
            segments: zs
                .windows(2)
                .map(|w| HostCurve::line(Xyz::new(x, 0.0, w[0]), Xyz::new(x, 0.0, w[1])))
                .collect(),
            skipped_segments: Vec::new(),
        })
        .collect();

    let mut cells = Vec::new();
    let mut panels = Vec::new();
    for row in zs.windows(2) {
        for column in xs.windows(2) {
            let index = cells.len();
            cells.push(HostCell {
                planarized_loops: vec![rectangle_loop(column[0], column[1], row[0], row[1])],
            });
            let (type_name, transparency) = panel(index);
            panels.push(HostPanel {
                id: HostId(100 + index as i64),
                type_name: type_name.to_string(),
                material: Some(HostMaterial {
                    name: format!("{} finish", type_name),
                    color: [180, 200, 220],
                    transparency,
                }),
            });
        }
    }

    let mut mullions: Vec<HostMullion> = u_lines
        .iter()
        .chain(v_lines.iter())
        .flat_map(|line| line.segments.iter().cloned())
        .map(|segment| mullion(id() + 200, segment))
        .collect();
    for edge in rectangle_loop(0.0, width, 0.0, height) {
        mullions.push(mullion(id() + 200, edge));
    }

    HostWall {
        id: HostId(7),
        name: "Curtain Wall 1".to_string(),
        type_name: "Storefront".to_string(),
        profile_loops: vec![rectangle_loop(0.0, width, 0.0, height)],
        curtain_grid: Some(HostCurtainGrid {
            u_lines,
            v_lines,
            cells,
            panels,
            mullions,
        }),
    }
}

/// Move segment `segment` of U line `line` to its skipped list and drop the
/// mullion on it
pub fn skip_u_segment(wall: &mut HostWall, line: usize, segment: usize) {
    let Some(grid) = wall.curtain_grid.as_mut() else {
        return;
    };
    let removed = grid.u_lines[line].segments.remove(segment);
    grid.mullions.retain(|m| {
        m.location_curve
            .as_ref()
            .map_or(true, |c| !same_segment(c, &removed))
    });
    grid.u_lines[line].skipped_segments.push(removed);
}
