// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-conversion extraction state
//!
//! Everything one element's extraction needs is held by an
//! [`ExtractionContext`] and passed explicitly; nothing accumulates across
//! elements, so independent elements can be extracted in parallel.

use crate::config::ConversionConfig;
use crate::error::Result;
use crate::schema::SchemaElement;
use bim_bridge_core::HostElement;
use bim_bridge_geometry::{CurveLoopSorter, MeshTessellator, MullionProfileResolver, ProfileExtractor};

#[derive(Debug, Clone)]
pub struct ExtractionContext<'c> {
    pub(crate) config: &'c ConversionConfig,
    pub(crate) tessellator: MeshTessellator,
    pub(crate) resolver: MullionProfileResolver,
    pub(crate) extractor: ProfileExtractor,
    pub(crate) sorter: CurveLoopSorter,
}

impl<'c> ExtractionContext<'c> {
    pub fn new(config: &'c ConversionConfig) -> Self {
        Self {
            config,
            tessellator: config.tessellator(),
            resolver: config.mullion_resolver(),
            extractor: config.profile_extractor(),
            sorter: CurveLoopSorter::new(config.planar_level_of_detail),
        }
    }

    #[inline]
    pub fn config(&self) -> &ConversionConfig {
        self.config
    }

    /// Level of detail for curves crossing into the schema
    #[inline]
    pub(crate) fn curve_level_of_detail(&self) -> f64 {
        self.config.planar_level_of_detail
    }

    /// Convert one host element into its schema elements
    pub fn extract(&self, element: &HostElement) -> Result<Vec<SchemaElement>> {
        match element {
            HostElement::Framing(member) => Ok(vec![SchemaElement::Beam(self.extract_beam(member)?)]),
            HostElement::Wall(wall) => Ok(vec![SchemaElement::CurtainWall(
                self.extract_curtain_wall(wall)?,
            )]),
            HostElement::Roof(roof) => {
                let (roof, visualization) = self.extract_roof(roof)?;
                Ok(vec![SchemaElement::Roof(roof), SchemaElement::Mesh(visualization)])
            }
        }
    }
}
